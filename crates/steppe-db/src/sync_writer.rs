//! Replace-all write of a normalized menu into a [`MenuStore`].
//!
//! The delete and the insert are two independent store calls. If the insert
//! fails the table stays empty until the next successful run.

use steppe_core::NormalizedMenuItem;
use thiserror::Error;

use crate::store::MenuStore;
use crate::DbError;

/// Which half of the replace-all sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Delete,
    Insert,
}

impl std::fmt::Display for WriteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteStage::Delete => write!(f, "delete"),
            WriteStage::Insert => write!(f, "insert"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{stage} of menu_items failed: {source}")]
pub struct WriteError {
    pub stage: WriteStage,
    #[source]
    pub source: DbError,
}

/// Empties the destination table, then inserts `records` as one batch.
///
/// Returns the number of rows the store confirms. A successful insert that
/// carries no confirmation counts as zero and is logged; so is a confirmed
/// count that differs from `records.len()`. An empty `records` slice still
/// clears the table and skips the insert call.
///
/// # Errors
///
/// Returns [`WriteError`] tagged [`WriteStage::Delete`] if clearing fails
/// (nothing is inserted), or [`WriteStage::Insert`] if the insert fails (the
/// table is left empty).
pub async fn replace_all<S: MenuStore>(
    store: &S,
    records: &[NormalizedMenuItem],
) -> Result<u64, WriteError> {
    store.delete_all().await.map_err(|source| WriteError {
        stage: WriteStage::Delete,
        source,
    })?;

    if records.is_empty() {
        tracing::info!("no menu items to insert; table left empty");
        return Ok(0);
    }

    let confirmed = store
        .insert_batch(records)
        .await
        .map_err(|source| WriteError {
            stage: WriteStage::Insert,
            source,
        })?;

    let expected = u64::try_from(records.len()).unwrap_or(u64::MAX);
    match confirmed {
        Some(written) => {
            if written != expected {
                tracing::warn!(expected, written, "store confirmed a different row count");
            }
            tracing::info!(written, "inserted menu items");
            Ok(written)
        }
        None => {
            tracing::warn!(
                expected,
                "insert succeeded without a row confirmation; reporting 0 written"
            );
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Delete,
        Insert(usize),
    }

    #[derive(Default)]
    struct FakeStore {
        calls: Mutex<Vec<Call>>,
        fail_delete: bool,
        fail_insert: bool,
        confirmation: Option<Option<u64>>,
    }

    impl FakeStore {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MenuStore for FakeStore {
        async fn delete_all(&self) -> Result<(), DbError> {
            self.calls.lock().unwrap().push(Call::Delete);
            if self.fail_delete {
                return Err(DbError::Rest {
                    status: 500,
                    body: "delete refused".to_string(),
                });
            }
            Ok(())
        }

        async fn insert_batch(
            &self,
            records: &[NormalizedMenuItem],
        ) -> Result<Option<u64>, DbError> {
            self.calls.lock().unwrap().push(Call::Insert(records.len()));
            if self.fail_insert {
                return Err(DbError::Rest {
                    status: 409,
                    body: "duplicate key value violates unique constraint".to_string(),
                });
            }
            Ok(self
                .confirmation
                .unwrap_or(Some(records.len() as u64)))
        }

        async fn ping(&self) -> Result<(), DbError> {
            Ok(())
        }
    }

    fn record(id: &str) -> NormalizedMenuItem {
        NormalizedMenuItem {
            iiko_id: id.to_string(),
            name: Some(format!("Item {id}")),
            description: None,
            price: Some(100.0),
            image_id: None,
            categories: vec!["Food".to_string()],
        }
    }

    #[tokio::test]
    async fn deletes_then_inserts_all_records() {
        let store = FakeStore::default();
        let written = replace_all(&store, &[record("1"), record("2")]).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(store.calls(), vec![Call::Delete, Call::Insert(2)]);
    }

    #[tokio::test]
    async fn empty_records_clear_table_and_skip_insert() {
        let store = FakeStore::default();
        let written = replace_all(&store, &[]).await.unwrap();

        assert_eq!(written, 0);
        assert_eq!(store.calls(), vec![Call::Delete]);
    }

    #[tokio::test]
    async fn delete_failure_aborts_before_insert() {
        let store = FakeStore {
            fail_delete: true,
            ..FakeStore::default()
        };
        let err = replace_all(&store, &[record("1")]).await.unwrap_err();

        assert_eq!(err.stage, WriteStage::Delete);
        assert_eq!(store.calls(), vec![Call::Delete]);
    }

    #[tokio::test]
    async fn insert_failure_reports_insert_stage_after_delete() {
        let store = FakeStore {
            fail_insert: true,
            ..FakeStore::default()
        };
        let err = replace_all(&store, &[record("1")]).await.unwrap_err();

        assert_eq!(err.stage, WriteStage::Insert);
        assert!(err.to_string().contains("duplicate key"));
        assert_eq!(store.calls(), vec![Call::Delete, Call::Insert(1)]);
    }

    #[tokio::test]
    async fn missing_confirmation_is_soft_success_with_zero() {
        let store = FakeStore {
            confirmation: Some(None),
            ..FakeStore::default()
        };
        let written = replace_all(&store, &[record("1"), record("2")]).await.unwrap();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn confirmed_count_is_reported_as_is() {
        let store = FakeStore {
            confirmation: Some(Some(1)),
            ..FakeStore::default()
        };
        let written = replace_all(&store, &[record("1"), record("2")]).await.unwrap();
        assert_eq!(written, 1);
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(WriteStage::Delete.to_string(), "delete");
        assert_eq!(WriteStage::Insert.to_string(), "insert");
    }
}
