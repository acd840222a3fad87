use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dietary classification of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Veg,
    NonVeg,
}

impl ItemType {
    /// Decodes the integer stored in the `item.type` column.
    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Veg),
            1 => Some(Self::NonVeg),
            _ => None,
        }
    }

    /// Returns the integer persisted in the `item.type` column.
    pub fn as_db(self) -> i64 {
        match self {
            Self::Veg => 0,
            Self::NonVeg => 1,
        }
    }

    /// Returns the canonical wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "VEG",
            Self::NonVeg => "NON_VEG",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable product offered by a restaurant.
///
/// Categories are held as identifiers rather than owned values so the
/// item/category relationship stays acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub item_type: ItemType,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

impl Item {
    /// Returns `true` when the item is listed under the given category.
    pub fn in_category(&self, category_id: &str) -> bool {
        self.category_ids.iter().any(|value| value == category_id)
    }
}

/// Category together with the items grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub items: Vec<Item>,
}

/// Category identity without its items, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
}

/// Restaurant and the full set of items it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub items: Vec<Item>,
}

/// Historical order placed against a single restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

/// One entry of an order, referencing exactly one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: String,
    pub quantity: u32,
    pub price: i64,
}
