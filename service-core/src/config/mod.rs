use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Settings shared by every binary in the workspace.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint; span export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        load_layered(None)
    }
}

/// Load settings from an optional file, then `APP__`-prefixed environment variables.
///
/// Without an explicit path, `configuration.{yaml,toml,json}` in the working
/// directory is used when present.
pub fn load_layered<T: DeserializeOwned>(file: Option<&Path>) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let file_source = match file {
        Some(path) => File::from(path).required(true),
        None => File::with_name("configuration").required(false),
    };

    let config = Cfg::builder()
        .add_source(file_source)
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_common_settings_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "log_level: debug").unwrap();
        writeln!(file, "otlp_endpoint: http://collector:4317").unwrap();

        let config: Config = load_layered(Some(file.path())).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn test_missing_explicit_file_is_a_config_error() {
        let result: Result<Config, AppError> =
            load_layered(Some(Path::new("/nonexistent/access.yaml")));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
