//! Supabase PostgREST store for `menu_items`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use steppe_core::NormalizedMenuItem;

use crate::store::MenuStore;
use crate::DbError;

const TABLE_PATH: &str = "rest/v1/menu_items";

/// Talks to `/rest/v1/menu_items` with the service-role key.
#[derive(Clone)]
pub struct RestMenuStore {
    client: Client,
    table_url: Url,
    service_key: String,
}

impl std::fmt::Debug for RestMenuStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestMenuStore")
            .field("table_url", &self.table_url.as_str())
            .field("service_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl RestMenuStore {
    /// Creates a store for the project at `supabase_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingConfig`] when the URL or key is blank, and
    /// [`DbError::InvalidConfig`] when the URL does not parse or the HTTP
    /// client cannot be built.
    pub fn new(
        supabase_url: &str,
        service_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DbError> {
        if supabase_url.trim().is_empty() {
            return Err(DbError::MissingConfig("SUPABASE_URL".to_string()));
        }
        if service_key.trim().is_empty() {
            return Err(DbError::MissingConfig("SUPABASE_SERVICE_KEY".to_string()));
        }

        let base = format!("{}/", supabase_url.trim().trim_end_matches('/'));
        let table_url = Url::parse(&base)
            .and_then(|url| url.join(TABLE_PATH))
            .map_err(|e| DbError::InvalidConfig(format!("SUPABASE_URL '{supabase_url}': {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| DbError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            table_url,
            service_key: service_key.trim().to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// Returns the body text of a 2xx response, or [`DbError::Rest`] otherwise.
async fn success_body(response: Response) -> Result<String, DbError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(DbError::Rest {
            status: status.as_u16(),
            body,
        })
    }
}

impl MenuStore for RestMenuStore {
    async fn delete_all(&self) -> Result<(), DbError> {
        // PostgREST refuses a DELETE without a filter; this one matches every row.
        let response = self
            .authorized(self.client.delete(self.table_url.clone()))
            .query(&[("id", "not.is.null")])
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        success_body(response).await?;
        tracing::info!("cleared menu_items via PostgREST");
        Ok(())
    }

    async fn insert_batch(&self, records: &[NormalizedMenuItem]) -> Result<Option<u64>, DbError> {
        let response = self
            .authorized(self.client.post(self.table_url.clone()))
            .header("Prefer", "return=representation")
            .json(records)
            .send()
            .await?;
        let body = success_body(response).await?;

        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(rows)) => Ok(Some(u64::try_from(rows.len()).unwrap_or(u64::MAX))),
            _ => {
                tracing::warn!(body = %body, "PostgREST insert response is not a row list");
                Ok(None)
            }
        }
    }

    async fn ping(&self) -> Result<(), DbError> {
        let response = self
            .authorized(self.client.get(self.table_url.clone()))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        success_body(response).await?;
        Ok(())
    }
}
