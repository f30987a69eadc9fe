//! Client and transformation layer for the iiko Cloud API.
//!
//! [`IikoClient`] authenticates and walks organization → external menu →
//! menu tree; [`flatten_menu`] and [`normalize_item`] turn the tree into
//! destination rows.

pub mod catalog;
pub mod client;
pub mod error;
pub mod flatten;
pub mod normalize;
pub mod types;

pub use catalog::select_external_menu;
pub use client::{AccessToken, IikoClient};
pub use error::IikoError;
pub use flatten::flatten_menu;
pub use normalize::{extract_image_id, normalize_item, Normalized, SkipReason};
pub use types::{
    DefaultPrice, ExternalMenu, ItemSize, MenuCategory, MenuTree, NamedRef, Organization,
    PriceEntry, RawMenuItem,
};
