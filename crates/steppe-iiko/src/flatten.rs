//! Flattening of the external-menu tree into a single item sequence.

use crate::error::IikoError;
use crate::types::{MenuTree, RawMenuItem};

/// Walks every category of `tree` and returns its items in order, each
/// tagged with the enclosing category's name as `category_name`.
///
/// Categories without an `items` list, or with an empty one, contribute
/// nothing. Mistyped item fields read as absent; an entry is dropped with a
/// warning only when it is not an object or its `itemId` is neither a string
/// nor a number.
///
/// # Errors
///
/// Returns [`IikoError::DataShape`] when the tree has no `itemCategories`
/// list at all, which callers report as "no items" rather than as an empty
/// menu.
pub fn flatten_menu(tree: &MenuTree) -> Result<Vec<RawMenuItem>, IikoError> {
    let categories = tree
        .item_categories
        .as_ref()
        .ok_or_else(|| IikoError::DataShape("menu tree has no 'itemCategories' list".into()))?;

    let mut flat = Vec::new();
    for (category_index, category) in categories.iter().enumerate() {
        let Some(items) = category.items.as_deref() else {
            tracing::debug!(
                category = category.name.as_deref().unwrap_or(""),
                "category has no items list"
            );
            continue;
        };

        for (item_index, value) in items.iter().enumerate() {
            match serde_json::from_value::<RawMenuItem>(value.clone()) {
                Ok(mut item) => {
                    item.category_name.clone_from(&category.name);
                    flat.push(item);
                }
                Err(e) => {
                    tracing::warn!(
                        category_index,
                        item_index,
                        error = %e,
                        "skipping menu item that does not decode"
                    );
                }
            }
        }
    }

    Ok(flat)
}
