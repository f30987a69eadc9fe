//! Normalization of flattened iiko items into [`NormalizedMenuItem`] rows.
//!
//! Price and image resolution are ordered lists of probes, each returning an
//! `Option`; the first probe that yields a value wins. Everything here is
//! pure: the same input always produces the same output.

use serde_json::Value;
use steppe_core::NormalizedMenuItem;

use crate::types::RawMenuItem;

const IMAGE_ID_MARKER: &str = "imageId=";

/// Why an item was left out of the synchronized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingItemId,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingItemId => write!(f, "item has no itemId"),
        }
    }
}

/// Result of normalizing one raw item.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Item(NormalizedMenuItem),
    Skipped(SkipReason),
}

impl Normalized {
    /// Returns the normalized row, discarding the skip reason.
    #[must_use]
    pub fn into_item(self) -> Option<NormalizedMenuItem> {
        match self {
            Normalized::Item(item) => Some(item),
            Normalized::Skipped(_) => None,
        }
    }
}

/// Maps one flattened upstream item onto the destination schema.
///
/// Items without an `itemId` are skipped (and logged), never fatal.
#[must_use]
pub fn normalize_item(raw: &RawMenuItem) -> Normalized {
    let Some(iiko_id) = raw.item_id.clone() else {
        tracing::warn!(
            name = raw.name.as_deref().unwrap_or(""),
            category = raw.category_name.as_deref().unwrap_or(""),
            "skipping menu item without itemId"
        );
        return Normalized::Skipped(SkipReason::MissingItemId);
    };

    Normalized::Item(NormalizedMenuItem {
        iiko_id,
        name: raw.name.clone(),
        description: raw.description.clone(),
        price: resolve_price(raw),
        image_id: resolve_image_id(raw),
        categories: raw.category_name.iter().cloned().collect(),
    })
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// Selects the raw price value, then coerces it. A selected value that is not
/// numeric yields `None`; later probes are not consulted.
fn resolve_price(raw: &RawMenuItem) -> Option<f64> {
    size_price(raw)
        .or_else(|| default_price(raw))
        .or_else(|| top_level_price(raw))
        .and_then(coerce_price)
}

fn size_price(raw: &RawMenuItem) -> Option<&Value> {
    raw.item_sizes
        .first()
        .and_then(|size| size.prices.first())
        .and_then(|entry| entry.price.as_ref())
        .filter(|v| !v.is_null())
}

fn default_price(raw: &RawMenuItem) -> Option<&Value> {
    raw.default_price
        .as_ref()
        .and_then(|p| p.current_price.as_ref())
        .filter(|v| !v.is_null())
}

fn top_level_price(raw: &RawMenuItem) -> Option<&Value> {
    raw.prices
        .first()
        .and_then(|entry| entry.price.as_ref())
        .filter(|v| !v.is_null())
}

fn coerce_price(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

fn resolve_image_id(raw: &RawMenuItem) -> Option<String> {
    raw.button_image_url
        .as_deref()
        .and_then(extract_image_id)
        .or_else(|| {
            raw.item_sizes
                .first()
                .and_then(|size| size.button_image_url.as_deref())
                .and_then(extract_image_id)
        })
        .or_else(|| raw.image_ids.first().filter(|id| !id.is_empty()).cloned())
}

/// Extracts the image id from a button image URL: the text after the last
/// `imageId=`, cut at the first `.`.
///
/// Returns `None` when the URL has no `imageId=` marker or the id is empty.
#[must_use]
pub fn extract_image_id(url: &str) -> Option<String> {
    let start = url.rfind(IMAGE_ID_MARKER)? + IMAGE_ID_MARKER.len();
    let id = url[start..].split('.').next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_owned())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
