use std::sync::Arc;
use tokio::signal;
use userdata::logger::*;
use userdata::server::*;
use userdata::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
        format: project_settings.log.format,
    };
    logger.reload_from_config(&logger_config)?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    signal::ctrl_c().await?;

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    Ok(())
}
