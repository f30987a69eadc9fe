use steppe_core::ConfigError;
use steppe_db::{DbError, WriteError, WriteStage};
use steppe_iiko::IikoError;
use thiserror::Error;

/// Failure of a sync run. Every variant aborts the run; none is retried.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Iiko(#[from] IikoError),

    #[error("no external menu named '{menu_name}'; available: {available:?}")]
    MenuNotFound {
        menu_name: String,
        available: Vec<String>,
    },

    #[error("no items: {0}")]
    NoItems(String),

    #[error("storage {stage} failed: {source}")]
    Storage {
        stage: WriteStage,
        #[source]
        source: DbError,
    },
}

impl From<WriteError> for SyncError {
    fn from(err: WriteError) -> Self {
        Self::Storage {
            stage: err.stage,
            source: err.source,
        }
    }
}

impl SyncError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Iiko(IikoError::Config(_)) => "config_error",
            Self::Iiko(IikoError::Precondition { .. }) => "precondition_error",
            Self::Iiko(_) => "upstream_error",
            Self::MenuNotFound { .. } => "menu_not_found",
            Self::NoItems(_) => "no_items",
            Self::Storage { .. } => "storage_error",
        }
    }
}
