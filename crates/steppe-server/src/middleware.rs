use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use steppe_core::{AppConfig, Environment};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Webhook bearer-token settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    token: Option<Arc<str>>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("enabled", &self.enabled())
            .finish()
    }
}

impl AuthState {
    /// Builds auth config from `STEPPE_WEBHOOK_TOKEN`.
    ///
    /// In development, a missing token disables auth for local iteration.
    /// In non-development envs, a missing token fails startup.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.webhook_token.as_deref() {
            Some(token) => Ok(Self::with_token(token)),
            None if config.env == Environment::Development => {
                tracing::warn!(
                    "STEPPE_WEBHOOK_TOKEN not set; webhook auth disabled in development environment"
                );
                Ok(Self::disabled())
            }
            None => anyhow::bail!(
                "STEPPE_WEBHOOK_TOKEN is required outside development; set it to the token iiko sends"
            ),
        }
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(Arc::from(token)),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { token: None }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.token.is_some()
    }

    fn allows(&self, presented: &str) -> bool {
        self.token
            .as_deref()
            .is_some_and(|expected| bool::from(presented.as_bytes().ct_eq(expected.as_bytes())))
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => {
            tracing::warn!("rejected webhook call with missing or invalid bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(MiddlewareErrorBody {
                    error: MiddlewareError {
                        code: "unauthorized",
                        message: "missing or invalid bearer token",
                    },
                }),
            )
                .into_response()
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use steppe_core::StoreBackend;

    use super::*;

    fn config(env: Environment, webhook_token: Option<&str>) -> AppConfig {
        AppConfig {
            env,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            log_level: "info".to_string(),
            iiko_base_url: "https://api-ru.iiko.services".to_string(),
            iiko_api_key: None,
            iiko_organization_id: None,
            iiko_menu_name: "Steppe App Menu".to_string(),
            store_backend: StoreBackend::Rest,
            database_url: None,
            supabase_url: None,
            supabase_service_key: None,
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
            http_timeout_secs: 30,
            http_user_agent: "ua".to_string(),
            webhook_token: webhook_token.map(str::to_string),
        }
    }

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_without_token_in_dev() {
        let state = AuthState::from_config(&config(Environment::Development, None))
            .expect("dev should allow a missing token");
        assert!(!state.enabled());
    }

    #[test]
    fn auth_state_requires_token_in_production() {
        assert!(AuthState::from_config(&config(Environment::Production, None)).is_err());
    }

    #[test]
    fn allows_only_the_exact_token() {
        let state = AuthState::from_config(&config(Environment::Production, Some("s3cret")))
            .expect("token configured");
        assert!(state.allows("s3cret"));
        assert!(!state.allows("s3cre"));
        assert!(!state.allows("s3cret-and-more"));
        assert!(!state.allows(""));
    }

    #[test]
    fn debug_does_not_print_token() {
        let state = AuthState::with_token("s3cret");
        assert!(!format!("{state:?}").contains("s3cret"));
    }
}
