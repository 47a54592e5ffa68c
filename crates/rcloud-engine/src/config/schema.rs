use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::site;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RcloudConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub delete_after_download: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
            delete_after_download: false,
            max_retries: default_max_retries(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_retries() -> u32 {
    crate::actions::DEFAULT_MAX_RETRIES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// External WebDriver server. When unset, geckodriver is launched locally.
    #[serde(default)]
    pub webdriver_url: Option<String>,
    #[serde(default)]
    pub geckodriver_path: Option<PathBuf>,
    #[serde(default)]
    pub firefox_path: Option<PathBuf>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub implicit_wait_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: None,
            geckodriver_path: None,
            firefox_path: None,
            port: default_port(),
            implicit_wait_ms: 0,
        }
    }
}

fn default_port() -> u16 {
    4444
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_recordings_url")]
    pub recordings_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            recordings_url: default_recordings_url(),
        }
    }
}

fn default_login_url() -> String {
    site::DEFAULT_LOGIN_URL.to_string()
}

fn default_recordings_url() -> String {
    site::DEFAULT_RECORDINGS_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_login_wait_ms")]
    pub login_wait_ms: u64,
    #[serde(default = "default_catalog_retry_delay_ms")]
    pub catalog_retry_delay_ms: u64,
    #[serde(default = "default_overlay_wait_ms")]
    pub overlay_wait_ms: u64,
    #[serde(default = "default_dialog_wait_ms")]
    pub dialog_wait_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            login_wait_ms: default_login_wait_ms(),
            catalog_retry_delay_ms: default_catalog_retry_delay_ms(),
            overlay_wait_ms: default_overlay_wait_ms(),
            dialog_wait_ms: default_dialog_wait_ms(),
        }
    }
}

impl TimingConfig {
    pub fn login_wait(&self) -> Duration {
        Duration::from_millis(self.login_wait_ms)
    }

    pub fn catalog_retry_delay(&self) -> Duration {
        Duration::from_millis(self.catalog_retry_delay_ms)
    }

    pub fn overlay_wait(&self) -> Duration {
        Duration::from_millis(self.overlay_wait_ms)
    }

    pub fn dialog_wait(&self) -> Duration {
        Duration::from_millis(self.dialog_wait_ms)
    }
}

fn default_login_wait_ms() -> u64 {
    3000
}

fn default_catalog_retry_delay_ms() -> u64 {
    1000
}

fn default_overlay_wait_ms() -> u64 {
    5000
}

fn default_dialog_wait_ms() -> u64 {
    10000
}
