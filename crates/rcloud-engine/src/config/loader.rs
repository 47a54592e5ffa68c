use super::schema::RcloudConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
    #[error("Invalid {field} URL: {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./rcloud.yaml
    /// 2. ~/.rcloud/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<RcloudConfig, ConfigError> {
        let local_config = PathBuf::from("./rcloud.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".rcloud").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(RcloudConfig::default())
    }

    /// An explicit path must exist; only the implicit locations are optional.
    pub async fn load(explicit: Option<&Path>) -> Result<RcloudConfig, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }

    pub async fn load_from(path: &Path) -> Result<RcloudConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<RcloudConfig, ConfigError> {
        if content.trim().is_empty() {
            return Ok(RcloudConfig::default());
        }
        let config: RcloudConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
