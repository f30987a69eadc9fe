//! One sync run: authenticate, locate the target menu, normalize its items,
//! and replace the destination table.
//!
//! Every step runs strictly after the previous one and the first failure ends
//! the run. Nothing touches the store until the full normalized set exists.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use steppe_core::{AppConfig, NormalizedMenuItem, SyncTarget};
use steppe_db::{replace_all, MenuStore};
use steppe_iiko::{
    flatten_menu, normalize_item, select_external_menu, ExternalMenu, IikoClient, IikoError,
    MenuTree, Normalized, Organization,
};
use uuid::Uuid;

use crate::error::SyncError;

/// Everything fetched and normalized for one run, before any write.
#[derive(Debug, Clone)]
pub struct MenuSnapshot {
    pub organizations: Vec<Organization>,
    pub menu: ExternalMenu,
    /// Items found in the tree, including the skipped ones.
    pub fetched: usize,
    pub skipped: usize,
    pub records: Vec<NormalizedMenuItem>,
}

impl MenuSnapshot {
    /// Number of normalized records without a resolvable price.
    #[must_use]
    pub fn unpriced(&self) -> usize {
        self.records.iter().filter(|r| !r.is_priced()).count()
    }

    /// `iiko_id` values carried by more than one record, sorted.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<String> {
        duplicate_ids(&self.records)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub organization_id: String,
    pub menu_id: String,
    pub menu_name: String,
    pub fetched: usize,
    pub skipped: usize,
    pub unpriced: usize,
    pub written: u64,
}

/// Builds an unauthenticated iiko client from the configured base URL,
/// timeout, and user agent.
///
/// # Errors
///
/// Returns [`SyncError::Iiko`] if the base URL is unusable.
pub fn client_from_config(config: &AppConfig) -> Result<IikoClient, SyncError> {
    Ok(IikoClient::new(
        &config.iiko_base_url,
        config.http_timeout_secs,
        &config.http_user_agent,
    )?)
}

/// Authenticates and fetches the target menu, then flattens and normalizes it.
///
/// The configured organization missing from the organization list is logged
/// but not fatal; the menu listing for it decides.
///
/// # Errors
///
/// - [`SyncError::Iiko`] for authentication or catalog failures.
/// - [`SyncError::MenuNotFound`] when no external menu has the target name.
/// - [`SyncError::NoItems`] when the menu tree has no category list.
pub async fn fetch_normalized(
    client: &mut IikoClient,
    target: &SyncTarget,
) -> Result<MenuSnapshot, SyncError> {
    client.authenticate(&target.api_key).await?;

    let organizations = client.list_organizations().await?;
    if !organizations
        .iter()
        .any(|org| org.id == target.organization_id)
    {
        tracing::warn!(
            organization_id = %target.organization_id,
            visible = organizations.len(),
            "configured organization is not in the organization list"
        );
    }

    let menus = client.list_external_menus(&target.organization_id).await?;
    let menu = select_external_menu(&menus, &target.menu_name)
        .cloned()
        .ok_or_else(|| SyncError::MenuNotFound {
            menu_name: target.menu_name.clone(),
            available: menus.iter().map(|m| m.name.clone()).collect(),
        })?;
    tracing::info!(menu_id = %menu.id, menu_name = %menu.name, "selected external menu");

    let tree = client
        .fetch_menu_tree(&menu.id, &target.organization_id)
        .await?;
    let (fetched, records) = normalize_tree(&tree)?;
    let skipped = fetched - records.len();

    tracing::info!(fetched, normalized = records.len(), skipped, "normalized menu items");

    let duplicates = duplicate_ids(&records);
    if !duplicates.is_empty() {
        // iiko_id is unique in menu_items, so the insert will reject this batch.
        tracing::warn!(
            count = duplicates.len(),
            ids = ?duplicates,
            "menu lists the same item more than once"
        );
    }

    Ok(MenuSnapshot {
        organizations,
        menu,
        fetched,
        skipped,
        records,
    })
}

/// Flattens and normalizes `tree`, returning the flattened item count and the
/// kept records. A tree without categories is reported as "no items".
fn normalize_tree(tree: &MenuTree) -> Result<(usize, Vec<NormalizedMenuItem>), SyncError> {
    let raw_items = flatten_menu(tree).map_err(|e| match e {
        IikoError::DataShape(reason) => SyncError::NoItems(reason),
        other => SyncError::Iiko(other),
    })?;

    let records = raw_items
        .iter()
        .map(normalize_item)
        .filter_map(Normalized::into_item)
        .collect();
    Ok((raw_items.len(), records))
}

fn duplicate_ids(records: &[NormalizedMenuItem]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for record in records {
        if !seen.insert(record.iiko_id.as_str()) {
            duplicates.insert(record.iiko_id.clone());
        }
    }
    duplicates.into_iter().collect()
}

/// Runs one full sync and replaces the destination table.
///
/// # Errors
///
/// Any [`fetch_normalized`] error (the store is untouched), or
/// [`SyncError::Storage`] if the delete or the insert fails.
pub async fn run_sync<S: MenuStore>(
    client: &mut IikoClient,
    target: &SyncTarget,
    store: &S,
) -> Result<SyncReport, SyncError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    tracing::info!(%run_id, menu_name = %target.menu_name, "menu sync started");

    let snapshot = match fetch_normalized(client, target).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(%run_id, code = e.code(), error = %e, "menu sync failed before write");
            return Err(e);
        }
    };

    let written = match replace_all(store, &snapshot.records).await {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(%run_id, stage = %e.stage, error = %e, "menu sync failed during write");
            return Err(e.into());
        }
    };

    let report = SyncReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        organization_id: target.organization_id.clone(),
        unpriced: snapshot.unpriced(),
        menu_id: snapshot.menu.id,
        menu_name: snapshot.menu.name,
        fetched: snapshot.fetched,
        skipped: snapshot.skipped,
        written,
    };
    tracing::info!(
        %run_id,
        written = report.written,
        skipped = report.skipped,
        unpriced = report.unpriced,
        "menu sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tree(value: serde_json::Value) -> MenuTree {
        serde_json::from_value(value).expect("tree fixture should decode")
    }

    #[test]
    fn normalize_tree_counts_skipped_items() {
        let (fetched, records) = normalize_tree(&tree(json!({
            "itemCategories": [
                { "name": "Food", "items": [ { "name": "no id" }, { "itemId": "2" } ] }
            ]
        })))
        .unwrap();
        assert_eq!(fetched, 2);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn duplicate_ids_reports_items_listed_in_two_categories() {
        let (_, records) = normalize_tree(&tree(json!({
            "itemCategories": [
                { "name": "Drinks", "items": [ { "itemId": "cola" }, { "itemId": "tea" } ] },
                { "name": "Combo", "items": [ { "itemId": "cola" }, { "itemId": "fries" } ] },
                { "name": "Kids", "items": [ { "itemId": "cola" } ] }
            ]
        })))
        .unwrap();
        assert_eq!(duplicate_ids(&records), vec!["cola".to_string()]);
    }

    #[test]
    fn duplicate_ids_empty_for_unique_records() {
        let (_, records) = normalize_tree(&tree(json!({
            "itemCategories": [
                { "name": "Food", "items": [ { "itemId": "1" }, { "itemId": "2" } ] }
            ]
        })))
        .unwrap();
        assert!(duplicate_ids(&records).is_empty());
    }

    #[test]
    fn normalize_tree_without_categories_is_no_items() {
        let err = normalize_tree(&MenuTree::default()).unwrap_err();
        assert!(matches!(err, SyncError::NoItems(_)));
        assert_eq!(err.code(), "no_items");
    }

    #[test]
    fn normalize_tree_with_empty_categories_is_empty() {
        let (fetched, records) = normalize_tree(&tree(json!({ "itemCategories": [] }))).unwrap();
        assert_eq!(fetched, 0);
        assert!(records.is_empty());
    }

    #[test]
    fn snapshot_counts_unpriced_records() {
        let priced = NormalizedMenuItem {
            iiko_id: "1".into(),
            name: None,
            description: None,
            price: Some(1.0),
            image_id: None,
            categories: vec![],
        };
        let unpriced = NormalizedMenuItem {
            iiko_id: "2".into(),
            price: None,
            ..priced.clone()
        };
        let snapshot = MenuSnapshot {
            organizations: vec![],
            menu: ExternalMenu {
                id: "m".into(),
                name: "M".into(),
            },
            fetched: 2,
            skipped: 0,
            records: vec![priced, unpriced],
        };
        assert_eq!(snapshot.unpriced(), 1);
    }
}
