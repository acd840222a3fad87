use std::time::Instant;

use food_ordering_core::{
    catalog::items_in_category,
    popularity::rank_by_popularity,
    types::{Item, Restaurant},
    ErrorCode,
};
use food_ordering_storage::{Database, ItemError, OrderError, RestaurantError};
use thiserror::Error;
use tracing::debug;

use crate::telemetry;

/// Item lookups, category filtering and popularity ranking.
#[derive(Clone)]
pub struct ItemService {
    database: Database,
}

impl ItemService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Returns the restaurant's items filed under `category_id`, sorted
    /// case-insensitively by name.
    pub async fn items_by_category_and_restaurant(
        &self,
        restaurant_id: &str,
        category_id: &str,
    ) -> Result<Vec<Item>, ItemServiceError> {
        let restaurant = self
            .database
            .restaurants()
            .fetch_by_uuid(restaurant_id)
            .await?
            .ok_or(ItemServiceError::RestaurantNotFound)?;

        Ok(items_in_category(restaurant.items, category_id))
    }

    /// Resolves a single item, failing with `INF-001` when no row matches.
    pub async fn item_by_id(&self, item_id: &str) -> Result<Item, ItemServiceError> {
        match self.database.items().fetch_by_uuid(item_id).await? {
            Some(item) => Ok(item),
            None => {
                telemetry::record_item_lookup_miss();
                debug!(stage = "catalog", item = %item_id, "item lookup missed");
                Err(ItemServiceError::ItemNotFound)
            }
        }
    }

    /// Ranks the restaurant's items by how many order lines referenced them.
    ///
    /// Items never ordered are omitted; ties keep first-seen order. The ranking
    /// is cut to `limit` entries before each survivor is re-resolved through
    /// [`ItemService::item_by_id`]; `None` keeps the full ranking.
    pub async fn items_by_popularity(
        &self,
        restaurant: &Restaurant,
        limit: Option<usize>,
    ) -> Result<Vec<Item>, ItemServiceError> {
        let start = Instant::now();
        let orders = self
            .database
            .orders()
            .list_for_restaurant(&restaurant.id)
            .await?;

        let mut ranked = rank_by_popularity(&restaurant.id, &orders);
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        let mut items = Vec::with_capacity(ranked.len());
        for entry in &ranked {
            items.push(self.item_by_id(&entry.item_id).await?);
        }

        telemetry::record_popularity_rank(start.elapsed());
        debug!(
            stage = "popularity",
            restaurant = %restaurant.id,
            orders = orders.len(),
            ranked = items.len(),
            "ranked items by popularity"
        );
        Ok(items)
    }
}

#[derive(Debug, Error)]
pub enum ItemServiceError {
    #[error("{}", ErrorCode::Inf001)]
    ItemNotFound,
    #[error("{}", ErrorCode::Rnf001)]
    RestaurantNotFound,
    #[error("failed to load item: {0}")]
    Item(#[from] ItemError),
    #[error("failed to load restaurant: {0}")]
    Restaurant(#[from] RestaurantError),
    #[error("failed to load orders: {0}")]
    Order(#[from] OrderError),
}

impl ItemServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ItemNotFound => ErrorCode::Inf001,
            Self::RestaurantNotFound => ErrorCode::Rnf001,
            Self::Item(_) | Self::Restaurant(_) | Self::Order(_) => ErrorCode::Gen001,
        }
    }
}
