//! Food and toy catalog. Pricier items restore more.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Used when an item carries no effectiveness of its own.
pub const DEFAULT_EFFECTIVENESS: u8 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Toys,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Category::Food => "food",
            Category::Toys => "toys",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<u8>,
}

impl Item {
    pub fn effectiveness(&self) -> u8 {
        self.effectiveness.unwrap_or(DEFAULT_EFFECTIVENESS)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub price: u64,
    pub effectiveness: u8,
}

impl CatalogEntry {
    pub fn to_item(&self) -> Item {
        Item {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            effectiveness: Some(self.effectiveness),
        }
    }
}

const fn entry(
    id: &'static str,
    name: &'static str,
    category: Category,
    price: u64,
    effectiveness: u8,
) -> CatalogEntry {
    CatalogEntry {
        id,
        name,
        category,
        price,
        effectiveness,
    }
}

pub const CATALOG: [CatalogEntry; 15] = [
    entry("food5", "Fresh Carrot", Category::Food, 40, 15),
    entry("food4", "Rice Bowl", Category::Food, 50, 20),
    entry("food2", "Fish Snacks", Category::Food, 60, 25),
    entry("food6", "Star Cookie", Category::Food, 70, 30),
    entry("food1", "Premium Bone", Category::Food, 80, 35),
    entry("food7", "Cool Banana", Category::Food, 90, 40),
    entry("food8", "Love Cupcake", Category::Food, 100, 45),
    entry("food9", "Chicken Leg", Category::Food, 110, 50),
    entry("food3", "Meat Feast", Category::Food, 120, 55),
    entry("toy1", "Tennis Ball", Category::Toys, 50, 20),
    entry("toy4", "Yarn Ball", Category::Toys, 65, 28),
    entry("toy6", "Puzzle Buddy", Category::Toys, 75, 33),
    entry("toy2", "Rainbow Cube", Category::Toys, 85, 38),
    entry("toy5", "Cuddle Bear", Category::Toys, 95, 43),
    entry("toy3", "Space Rocket", Category::Toys, 130, 55),
];

pub fn find(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

pub fn in_category(category: Category) -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(move |e| e.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sorted_by_price_within_category() {
        for cat in [Category::Food, Category::Toys] {
            let prices: Vec<u64> = in_category(cat).map(|e| e.price).collect();
            let mut sorted = prices.clone();
            sorted.sort_unstable();
            assert_eq!(prices, sorted);
        }
    }

    #[test]
    fn test_category_display_pads() {
        assert_eq!(format!("{:<5}|", Category::Food), "food |");
    }

    #[test]
    fn test_find() {
        let bone = find("food1").unwrap();
        assert_eq!(bone.name, "Premium Bone");
        assert_eq!(bone.to_item().effectiveness(), 35);
        assert!(find("food42").is_none());
    }

    #[test]
    fn test_default_effectiveness() {
        let item = Item {
            id: "x".into(),
            name: "Mystery".into(),
            category: Category::Food,
            effectiveness: None,
        };
        assert_eq!(item.effectiveness(), DEFAULT_EFFECTIVENESS);
    }
}
