//! The destination store seam and its Postgres implementation.

use std::future::Future;

use sqlx::PgPool;
use steppe_core::{AppConfig, NormalizedMenuItem, StoreBackend};

use crate::rest::RestMenuStore;
use crate::{connect_pool_from_config, menu_items, DbError};

/// A table that can be emptied and bulk-filled with menu rows.
///
/// Implementations perform exactly one remote operation per call; the
/// delete-then-insert sequence lives in [`crate::replace_all`].
pub trait MenuStore: Send + Sync {
    /// Removes every row from the destination table.
    fn delete_all(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Inserts `records` as one batch.
    ///
    /// Returns the number of rows the store confirms, or `None` when the
    /// store answered successfully without saying what it inserted.
    fn insert_batch(
        &self,
        records: &[NormalizedMenuItem],
    ) -> impl Future<Output = Result<Option<u64>, DbError>> + Send;

    /// Checks that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Direct Postgres store over a `sqlx` pool.
#[derive(Debug, Clone)]
pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl MenuStore for PgMenuStore {
    async fn delete_all(&self) -> Result<(), DbError> {
        let deleted = menu_items::delete_all_menu_items(&self.pool).await?;
        tracing::info!(deleted, "cleared menu_items");
        Ok(())
    }

    async fn insert_batch(&self, records: &[NormalizedMenuItem]) -> Result<Option<u64>, DbError> {
        let ids = menu_items::insert_menu_items(&self.pool, records).await?;
        Ok(Some(u64::try_from(ids.len()).unwrap_or(u64::MAX)))
    }

    async fn ping(&self) -> Result<(), DbError> {
        crate::ping(&self.pool).await?;
        Ok(())
    }
}

/// The store selected by `STEPPE_STORE_BACKEND`.
#[derive(Debug, Clone)]
pub enum AnyMenuStore {
    Postgres(PgMenuStore),
    Rest(RestMenuStore),
}

impl AnyMenuStore {
    /// Builds the configured store, validating its credentials first.
    ///
    /// The Postgres backend connects eagerly; the PostgREST backend makes no
    /// request until it is used.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingConfig`] when the selected backend's
    /// variables are absent, [`DbError::InvalidConfig`] for an unusable
    /// PostgREST URL, or [`DbError::Sqlx`] if Postgres is unreachable.
    pub async fn from_config(config: &AppConfig) -> Result<Self, DbError> {
        match config.store_backend {
            StoreBackend::Postgres => {
                let pool = connect_pool_from_config(config).await?;
                Ok(Self::Postgres(PgMenuStore::new(pool)))
            }
            StoreBackend::Rest => {
                let url = config.supabase_url.as_deref().unwrap_or_default();
                let key = config.supabase_service_key.as_deref().unwrap_or_default();
                let store = RestMenuStore::new(
                    url,
                    key,
                    config.http_timeout_secs,
                    &config.http_user_agent,
                )?;
                Ok(Self::Rest(store))
            }
        }
    }

    #[must_use]
    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Postgres(_) => StoreBackend::Postgres,
            Self::Rest(_) => StoreBackend::Rest,
        }
    }
}

impl MenuStore for AnyMenuStore {
    async fn delete_all(&self) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.delete_all().await,
            Self::Rest(store) => store.delete_all().await,
        }
    }

    async fn insert_batch(&self, records: &[NormalizedMenuItem]) -> Result<Option<u64>, DbError> {
        match self {
            Self::Postgres(store) => store.insert_batch(records).await,
            Self::Rest(store) => store.insert_batch(records).await,
        }
    }

    async fn ping(&self) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.ping().await,
            Self::Rest(store) => store.ping().await,
        }
    }
}
