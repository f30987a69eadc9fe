use serde::{Deserialize, Serialize};

/// One row of the destination `menu_items` table, produced from an upstream
/// iiko item by the normalizer.
///
/// Field names match the destination columns so the struct serializes
/// directly into a PostgREST insert payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMenuItem {
    /// Upstream `itemId`; unique key of the destination table.
    pub iiko_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Resolved from size-level, default, then top-level prices. `None` when
    /// nothing numeric was found.
    pub price: Option<f64>,
    /// Image identifier extracted from a button image URL or `imageIds`.
    pub image_id: Option<String>,
    /// Zero or one category name, in source order.
    pub categories: Vec<String>,
}

impl NormalizedMenuItem {
    /// Returns the first category name, if any.
    #[must_use]
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    /// Returns `true` when the item has a price customers can see.
    #[must_use]
    pub fn is_priced(&self) -> bool {
        self.price.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cola() -> NormalizedMenuItem {
        NormalizedMenuItem {
            iiko_id: "1".to_string(),
            name: Some("Cola".to_string()),
            description: None,
            price: Some(150.0),
            image_id: None,
            categories: vec!["Drinks".to_string()],
        }
    }

    #[test]
    fn serializes_with_destination_column_names() {
        let json = serde_json::to_value(cola()).expect("serialize");
        assert_eq!(json["iiko_id"], "1");
        assert_eq!(json["price"], 150.0);
        assert!(json["image_id"].is_null());
        assert_eq!(json["categories"], serde_json::json!(["Drinks"]));
    }

    #[test]
    fn primary_category_and_priced() {
        let item = cola();
        assert_eq!(item.primary_category(), Some("Drinks"));
        assert!(item.is_priced());

        let bare = NormalizedMenuItem {
            price: None,
            categories: vec![],
            ..cola()
        };
        assert_eq!(bare.primary_category(), None);
        assert!(!bare.is_priced());
    }
}
