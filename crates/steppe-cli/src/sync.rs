//! `steppe sync` handler.

use steppe_core::{AppConfig, NormalizedMenuItem};
use steppe_db::AnyMenuStore;
use steppe_sync::MenuSnapshot;

const PREVIEW_LIMIT: usize = 5;

/// Runs one sync, or a dry run that stops before the store.
///
/// Configuration for both the upstream and the store is validated before any
/// request is sent.
pub(crate) async fn run_sync_command(
    config: &AppConfig,
    dry_run: bool,
    menu_override: Option<&str>,
) -> anyhow::Result<()> {
    let mut target = config.sync_target()?;
    if let Some(name) = menu_override {
        name.clone_into(&mut target.menu_name);
    }
    let mut client = steppe_sync::client_from_config(config)?;

    if dry_run {
        let snapshot = steppe_sync::fetch_normalized(&mut client, &target).await?;
        print!("{}", format_preview(&snapshot));
        return Ok(());
    }

    let store = AnyMenuStore::from_config(config).await?;
    let report = steppe_sync::run_sync(&mut client, &target, &store).await?;

    println!(
        "synced {} menu items from '{}' ({} skipped without itemId, {} without price)",
        report.written, report.menu_name, report.skipped, report.unpriced
    );
    Ok(())
}

fn format_preview(snapshot: &MenuSnapshot) -> String {
    let mut out = format!(
        "dry-run: menu '{}' ({}) has {} items, {} skipped, {} without price\n",
        snapshot.menu.name,
        snapshot.menu.id,
        snapshot.records.len(),
        snapshot.skipped,
        snapshot.unpriced()
    );
    let duplicates = snapshot.duplicate_ids();
    if !duplicates.is_empty() {
        out.push_str(&format!(
            "  warning: duplicate itemId(s) {}; the insert will be rejected\n",
            duplicates.join(", ")
        ));
    }
    for record in snapshot.records.iter().take(PREVIEW_LIMIT) {
        out.push_str(&preview_line(record));
        out.push('\n');
    }
    if snapshot.records.len() > PREVIEW_LIMIT {
        out.push_str(&format!(
            "  ... and {} more\n",
            snapshot.records.len() - PREVIEW_LIMIT
        ));
    }
    out
}

fn preview_line(record: &NormalizedMenuItem) -> String {
    let price = record
        .price
        .map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
    format!(
        "  {}  {}  {}  [{}]",
        record.iiko_id,
        record.name.as_deref().unwrap_or("(unnamed)"),
        price,
        record.primary_category().unwrap_or("")
    )
}
