//! `POST /webhooks/iiko`: run a sync when iiko reports a menu change.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use steppe_sync::{SyncError, SyncReport};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

const MENU_CHANGED: &str = "menu.changed";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WebhookEvent {
    #[serde(default)]
    event_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum WebhookOutcome {
    Synced { written: u64 },
    Ignored,
}

pub(super) async fn iiko_webhook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<WebhookEvent>, JsonRejection>,
) -> Response {
    let Json(event) = match payload {
        Ok(event) => event,
        Err(rejection) => {
            return ApiError::new(req_id.0, "bad_request", rejection.body_text()).into_response();
        }
    };

    let event_type = event.event_type.unwrap_or_default();
    if event_type != MENU_CHANGED {
        tracing::info!(event_type = %event_type, "ignoring webhook event");
        return (StatusCode::OK, Json(WebhookOutcome::Ignored)).into_response();
    }

    let _guard = state.sync_lock.lock().await;
    tracing::info!(request_id = %req_id.0, "menu change received; starting sync");

    match sync_once(&state).await {
        Ok(report) => (
            StatusCode::OK,
            Json(WebhookOutcome::Synced {
                written: report.written,
            }),
        )
            .into_response(),
        Err(e) => ApiError::new(req_id.0, e.code(), e.to_string()).into_response(),
    }
}

async fn sync_once(state: &AppState) -> Result<SyncReport, SyncError> {
    let target = state.config.sync_target()?;
    let mut client = steppe_sync::client_from_config(&state.config)?;
    steppe_sync::run_sync(&mut client, &target, state.store.as_ref()).await
}
