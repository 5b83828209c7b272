//! Shop visit records and the request bodies that create or extend them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoptrail_core::{Price, VisitId};

/// One purchased product within a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: Price,
}

/// A customer's shopping session in a shop.
///
/// `total` always equals the sum of `items[*].price`: creation checks it and
/// the storage layer appends an item and bumps the total in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: VisitId,
    /// Free-form reference to the shopper (usually their email).
    pub user: String,
    pub shop_id: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    pub total: Price,
}

impl Visit {
    /// Sum of item prices, independent of the stored `total`.
    ///
    /// `None` if the sum is out of range.
    #[must_use]
    pub fn items_total(&self) -> Option<Price> {
        Price::checked_sum(self.items.iter().map(|item| item.price))
    }
}

/// Body of `POST /visits`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewVisit {
    pub user: String,
    pub shop_id: String,
    #[serde(default)]
    pub entered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<NewLineItem>,
    /// Optional; when present it must match the item sum.
    #[serde(default)]
    pub total: Option<Price>,
}

/// Body of `POST /visits/{id}/add-product`, also used for items in [`NewVisit`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewLineItem {
    pub name: String,
    pub price: Price,
}

/// Body of `POST /visits/{id}/exit`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExitVisit {
    #[serde(default)]
    pub exited_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_visit_serializes_camel_case() {
        let visit = Visit {
            id: "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap(),
            user: "a@b.c".to_owned(),
            shop_id: "shop-7".to_owned(),
            entered_at: "2026-02-01T09:30:00Z".parse().unwrap(),
            exited_at: None,
            items: vec![LineItem {
                name: "Apple".to_owned(),
                price: Price::from(10),
            }],
            total: Price::from(10),
        };

        let value = serde_json::to_value(&visit).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "user": "a@b.c",
                "shopId": "shop-7",
                "enteredAt": "2026-02-01T09:30:00Z",
                "exitedAt": null,
                "items": [{"name": "Apple", "price": 10}],
                "total": 10
            })
        );
    }

    #[test]
    fn test_new_visit_defaults() {
        let body: NewVisit = serde_json::from_value(json!({"user": "u", "shopId": "s"})).unwrap();
        assert!(body.items.is_empty());
        assert!(body.total.is_none());
        assert!(body.entered_at.is_none());
    }

    #[test]
    fn test_new_visit_rejects_unknown_fields() {
        let result = serde_json::from_value::<NewVisit>(json!({
            "user": "u",
            "shopId": "s",
            "discount": 5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_line_item_requires_numeric_price() {
        assert!(serde_json::from_value::<NewLineItem>(json!({"name": "Pear", "price": "3"})).is_err());
        assert!(serde_json::from_value::<NewLineItem>(json!({"name": "Pear"})).is_err());
        assert!(serde_json::from_value::<NewLineItem>(json!({"price": 3})).is_err());
        assert!(serde_json::from_value::<NewLineItem>(json!({"name": "Pear", "price": 3.25})).is_ok());
    }
}
