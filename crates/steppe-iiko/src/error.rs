use thiserror::Error;

/// Errors returned by the iiko client and the menu transformation steps.
#[derive(Debug, Error)]
pub enum IikoError {
    /// Invalid static input, e.g. an empty API credential or base URL.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure, non-2xx status, or a response missing the field the
    /// step depends on. `detail` carries the raw body or transport message.
    #[error("upstream error during {step}: {detail}")]
    Upstream { step: &'static str, detail: String },

    /// An authenticated operation was called before [`crate::IikoClient::authenticate`].
    #[error("{operation} requires an access token; call authenticate first")]
    Precondition { operation: &'static str },

    /// The menu tree does not have the expected category structure.
    #[error("menu tree has unexpected shape: {0}")]
    DataShape(String),
}

impl IikoError {
    pub(crate) fn upstream(step: &'static str, detail: impl Into<String>) -> Self {
        Self::Upstream {
            step,
            detail: detail.into(),
        }
    }
}
