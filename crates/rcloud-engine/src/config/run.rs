use super::loader::ConfigError;
use super::schema::{RcloudConfig, TimingConfig};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    List,
    Download,
    Delete,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::List => "list",
            Command::Download => "download",
            Command::Delete => "delete",
        })
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(Command::List),
            "download" => Ok(Command::Download),
            "delete" => Ok(Command::Delete),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// Username and password. Blank values are asked for interactively.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn clear(&mut self) {
        self.user.clear();
        self.password.clear();
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    pub login: Url,
    pub recordings: Url,
}

/// Values given explicitly on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub user: Option<String>,
    pub password: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub regex: Option<String>,
    pub delete_after_download: bool,
}

/// Everything the core needs for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub command: Command,
    pub regex: Option<Regex>,
    pub credentials: Credentials,
    pub download_dir: PathBuf,
    pub delete_after_download: bool,
    pub max_download_retries: u32,
    pub site: SiteUrls,
    pub timing: TimingConfig,
}

impl RunConfig {
    /// Explicit command-line values win over the file, the file wins over defaults.
    pub fn resolve(
        command: Command,
        overrides: Overrides,
        file: &RcloudConfig,
    ) -> Result<Self, ConfigError> {
        let regex = overrides
            .regex
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(Regex::new)
            .transpose()?;

        let pick = |cli: Option<String>, file: &Option<String>| {
            cli.filter(|v| !v.is_empty())
                .or_else(|| file.clone())
                .unwrap_or_default()
        };

        let credentials = Credentials {
            user: pick(overrides.user, &file.auth.user),
            password: pick(overrides.password, &file.auth.password),
        };

        let download_dir = overrides
            .download_dir
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| file.download.dir.clone());

        let site = SiteUrls {
            login: Url::parse(&file.site.login_url).map_err(|source| {
                ConfigError::InvalidUrl {
                    field: "login",
                    source,
                }
            })?,
            recordings: Url::parse(&file.site.recordings_url).map_err(|source| {
                ConfigError::InvalidUrl {
                    field: "recordings",
                    source,
                }
            })?,
        };

        Ok(Self {
            command,
            regex,
            credentials,
            download_dir,
            delete_after_download: overrides.delete_after_download
                || file.download.delete_after_download,
            max_download_retries: file.download.max_retries,
            site,
            timing: file.timing.clone(),
        })
    }
}
