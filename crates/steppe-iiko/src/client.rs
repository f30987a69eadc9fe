//! HTTP client for the iiko Cloud API.
//!
//! Every endpoint is a JSON `POST`. The access token obtained by
//! [`IikoClient::authenticate`] lives on the client for the duration of one
//! run; it is never refreshed and authenticated calls made without it fail
//! with [`IikoError::Precondition`] instead of re-authenticating implicitly.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::{json, Value};

use crate::error::IikoError;

pub const DEFAULT_BASE_URL: &str = "https://api-ru.iiko.services";

/// Short-lived bearer token returned by `/api/1/access_token`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Client for the iiko Cloud API.
///
/// Use [`IikoClient::new`] with the configured base URL; tests point it at a
/// wiremock server the same way.
pub struct IikoClient {
    client: Client,
    base_url: Url,
    token: Option<AccessToken>,
}

impl IikoClient {
    /// Creates an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns [`IikoError::Config`] if `base_url` is not a valid URL or the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, IikoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| IikoError::Config(format!("failed to build HTTP client: {e}")))?;

        // A trailing slash makes Url::join append to the path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| IikoError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Installs a token obtained elsewhere, skipping the exchange call.
    #[must_use]
    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Returns the token held by this client, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Exchanges the static API credential for a bearer token and keeps it on
    /// the client. One call, no retries.
    ///
    /// # Errors
    ///
    /// - [`IikoError::Config`] if `api_key` is empty.
    /// - [`IikoError::Upstream`] on transport failure, non-2xx status, or a
    ///   response without a non-empty `token` field.
    pub async fn authenticate(&mut self, api_key: &str) -> Result<AccessToken, IikoError> {
        const STEP: &str = "access_token";

        if api_key.trim().is_empty() {
            return Err(IikoError::Config("API login must not be empty".to_string()));
        }

        tracing::debug!(step = STEP, "requesting iiko access token");
        let body = self
            .post_json(STEP, "api/1/access_token", &json!({ "apiLogin": api_key }), None)
            .await?;

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| IikoError::upstream(STEP, format!("response has no token: {body}")))?;

        tracing::info!("obtained iiko access token");
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Returns the held token or a precondition error naming `operation`.
    pub(crate) fn require_token(&self, operation: &'static str) -> Result<&AccessToken, IikoError> {
        self.token
            .as_ref()
            .ok_or(IikoError::Precondition { operation })
    }

    fn endpoint(&self, step: &'static str, path: &str) -> Result<Url, IikoError> {
        self.base_url
            .join(path)
            .map_err(|e| IikoError::upstream(step, format!("cannot build URL for {path}: {e}")))
    }

    /// Sends a JSON `POST`, asserts a 2xx status, and parses the body as JSON.
    ///
    /// Non-2xx responses keep their body text in the error detail so the
    /// upstream diagnostic reaches the operator.
    pub(crate) async fn post_json(
        &self,
        step: &'static str,
        path: &str,
        payload: &Value,
        bearer: Option<&AccessToken>,
    ) -> Result<Value, IikoError> {
        let url = self.endpoint(step, path)?;

        let mut request = self.client.post(url.clone()).json(payload);
        if let Some(token) = bearer {
            request = request.bearer_auth(token.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| IikoError::upstream(step, format!("request to {url} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IikoError::upstream(step, format!("reading body from {url} failed: {e}")))?;

        if !status.is_success() {
            tracing::warn!(step, status = status.as_u16(), "iiko returned non-success status");
            return Err(IikoError::upstream(
                step,
                format!("HTTP {} - {text}", status.as_u16()),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| IikoError::upstream(step, format!("invalid JSON ({e}): {text}")))
    }
}
