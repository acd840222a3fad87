use food_ordering_core::{types::Restaurant, ErrorCode};
use food_ordering_storage::{Database, RestaurantError};
use thiserror::Error;

/// Resolves restaurants by identifier.
#[derive(Clone)]
pub struct RestaurantService {
    database: Database,
}

impl RestaurantService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Loads the restaurant and its items, failing with `RNF-002` for a blank
    /// identifier and `RNF-001` when nothing matches.
    pub async fn restaurant_by_id(
        &self,
        restaurant_id: &str,
    ) -> Result<Restaurant, RestaurantServiceError> {
        if restaurant_id.trim().is_empty() {
            return Err(RestaurantServiceError::EmptyId);
        }

        self.database
            .restaurants()
            .fetch_by_uuid(restaurant_id)
            .await?
            .ok_or(RestaurantServiceError::NotFound)
    }
}

#[derive(Debug, Error)]
pub enum RestaurantServiceError {
    #[error("{}", ErrorCode::Rnf002)]
    EmptyId,
    #[error("{}", ErrorCode::Rnf001)]
    NotFound,
    #[error("failed to load restaurant: {0}")]
    Storage(#[from] RestaurantError),
}

impl RestaurantServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyId => ErrorCode::Rnf002,
            Self::NotFound => ErrorCode::Rnf001,
            Self::Storage(_) => ErrorCode::Gen001,
        }
    }
}
