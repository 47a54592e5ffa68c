pub mod loader;
pub mod run;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use run::{Command, Credentials, Overrides, RunConfig, SiteUrls};
pub use schema::RcloudConfig;
