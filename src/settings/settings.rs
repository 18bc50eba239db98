use crate::domain_model::Currency;
use crate::logger::LogFormat;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub log: Log,
    pub store: Store,
    pub kafka: Kafka,
    #[serde(default)]
    pub consumer: Consumer,
    #[serde(default)]
    pub userdata: Userdata,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    pub dsn: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Kafka {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
    pub workers: usize, // 0 disables consumption
    pub dead_letter_topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Consumer {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for Consumer {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_ms: 100,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Userdata {
    #[serde(default)]
    pub default_currency: Currency,
}

fn default_max_connections() -> u32 {
    10
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Loads the TOML file, then lets `USERDATA__SECTION__KEY` variables override it.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("USERDATA").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_settings_parse() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.kafka.topic, "users");
        assert_eq!(settings.kafka.group_id, "userdata");
        assert_eq!(settings.userdata.default_currency, Currency::Rub);
        assert!(settings.consumer.max_attempts > 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
