//! iiko Cloud API response types.
//!
//! ## Observed shape of `/api/2/menu/by_id`
//!
//! The external-menu endpoint returns a tree:
//! `{ "itemCategories": [ { "name": ..., "items": [ ... ] } ] }`.
//! Item objects are not uniform across menus and POS versions:
//!
//! - Prices appear either per size (`itemSizes[].prices[].price`), as a
//!   `defaultPrice.currentPrice`, or in a flat `prices[]` list. Values have
//!   been seen as JSON numbers and as numeric strings, so they are kept as
//!   raw [`serde_json::Value`] and coerced during normalization.
//! - Images come either as a `buttonImageUrl` carrying an `imageId=` query
//!   parameter (top level or per size) or as a bare `imageIds[]` list.
//! - List fields are sometimes `null` instead of absent; those decode to
//!   empty vectors.
//!
//! Everything except the top-level `itemCategories` list and an item's
//! `itemId` is decoded leniently: a field of the wrong type reads as absent
//! and a bad list entry is dropped on its own. Category items are kept as raw
//! JSON on [`MenuCategory`] and decoded one by one during flattening, so only
//! an unusable `itemId` can cost an item its place in the menu.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An organization the API credential can access.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// An external menu configured for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalMenu {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Full item tree of one external menu.
///
/// `item_categories` is `None` when the field is absent; the flattener treats
/// that as a shape error rather than an empty menu.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuTree {
    #[serde(default, deserialize_with = "lenient_optional_list")]
    pub item_categories: Option<Vec<MenuCategory>>,
}

/// A category of the external menu with its raw item objects.
///
/// A non-string `name` reads as `None`; a non-list `items` reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MenuCategory {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub items: Option<Vec<Value>>,
}

/// A single upstream menu item, every field optional.
///
/// Only `item_id` is strict: a value that is neither a string nor a number
/// fails the decode. Any other field of the wrong type reads as absent.
///
/// `category_name` is not sent by the API; the flattener fills it from the
/// enclosing [`MenuCategory`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMenuItem {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub default_price: Option<DefaultPrice>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub prices: Vec<PriceEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub item_sizes: Vec<ItemSize>,
    #[serde(default, deserialize_with = "lenient")]
    pub button_image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub image_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub product_categories: Vec<NamedRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub parent_group: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultPrice {
    #[serde(default)]
    pub current_price: Option<Value>,
    #[serde(default, deserialize_with = "lenient", rename = "currencyISOCode")]
    pub currency_iso_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PriceEntry {
    #[serde(default)]
    pub price: Option<Value>,
}

/// A size variant of an item (e.g. 250 ml / 400 ml).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSize {
    #[serde(default, deserialize_with = "lenient_list")]
    pub prices: Vec<PriceEntry>,
    #[serde(default, deserialize_with = "lenient")]
    pub button_image_url: Option<String>,
}

/// `{ "name": ... }` reference used for product categories and parent groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Decodes `T`, falling back to its default when the value has the wrong
/// type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decodes a list entry by entry, dropping entries that do not decode. A
/// missing, `null`, or non-list value is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => decode_entries(entries),
        _ => Vec::new(),
    })
}

/// Like [`lenient_list`] but keeps "not a list" distinct as `None`.
fn lenient_optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => Some(decode_entries(entries)),
        _ => None,
    })
}

fn decode_entries<T: DeserializeOwned>(entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
