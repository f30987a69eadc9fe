//! Database operations for the `menu_items` destination table.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use steppe_core::NormalizedMenuItem;

use crate::DbError;

/// A row from the `menu_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuItemRow {
    pub id: i64,
    pub iiko_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_id: Option<String>,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Deletes every row of `menu_items` unconditionally.
///
/// Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_all_menu_items(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM menu_items").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Inserts `items` in a single multi-row `INSERT ... RETURNING id`.
///
/// Returns the generated ids in insertion order. An empty slice issues no
/// statement. Six parameters are bound per row, so one call is bounded by
/// Postgres' 65535-parameter limit (about ten thousand items).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a unique
/// violation on `iiko_id`. No row of the batch is kept in that case.
pub async fn insert_menu_items(
    pool: &PgPool,
    items: &[NormalizedMenuItem],
) -> Result<Vec<i64>, DbError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "INSERT INTO menu_items (iiko_id, name, description, price, image_id, categories) ",
    );
    builder.push_values(items, |mut row, item| {
        row.push_bind(&item.iiko_id)
            .push_bind(&item.name)
            .push_bind(&item.description)
            .push_bind(item.price)
            .push_bind(&item.image_id)
            .push_bind(&item.categories);
    });
    builder.push(" RETURNING id");

    let ids = builder
        .build_query_scalar::<i64>()
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Lists every row of `menu_items` ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_menu_items(pool: &PgPool) -> Result<Vec<MenuItemRow>, DbError> {
    let rows = sqlx::query_as::<_, MenuItemRow>(
        "SELECT id, iiko_id, name, description, price, image_id, categories, created_at \
         FROM menu_items \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
