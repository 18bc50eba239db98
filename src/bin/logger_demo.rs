use userdata::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    let config = LogConfig {
        filter: "debug".to_string(),
        format: LogFormat::Json,
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!(username = "alice", "application debug log");
    info!(workers = 3, "application info log");

    Ok(())
}
