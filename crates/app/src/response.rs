use food_ordering_core::types::{Category, CategorySummary, Item, ItemType};
use serde::Serialize;

/// Item as exposed in listings.
#[derive(Debug, Serialize)]
pub struct ItemList {
    pub id: String,
    pub item_name: String,
    pub item_type: ItemType,
    pub price: i64,
}

impl From<Item> for ItemList {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            item_name: item.name,
            item_type: item.item_type,
            price: item.price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    pub item_list: Vec<ItemList>,
}

impl From<Vec<Item>> for ItemListResponse {
    fn from(items: Vec<Item>) -> Self {
        Self {
            item_list: items.into_iter().map(ItemList::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDetailsResponse {
    pub id: String,
    pub category_name: String,
    pub item_list: Vec<ItemList>,
}

impl From<Category> for CategoryDetailsResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            category_name: category.name,
            item_list: category.items.into_iter().map(ItemList::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub id: String,
    pub category_name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoriesListResponse {
    pub categories: Vec<CategoryListResponse>,
}

impl From<Vec<CategorySummary>> for CategoriesListResponse {
    fn from(categories: Vec<CategorySummary>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|category| CategoryListResponse {
                    id: category.id,
                    category_name: category.name,
                })
                .collect(),
        }
    }
}
