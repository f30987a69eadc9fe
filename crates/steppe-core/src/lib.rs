pub mod app_config;
pub mod config;
pub mod menu;

pub use app_config::{AppConfig, Environment, StoreBackend, SyncTarget};
pub use config::{load_app_config, load_app_config_from_env};
pub use menu::NormalizedMenuItem;

use thiserror::Error;

/// Missing or invalid static configuration. Always fatal, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
