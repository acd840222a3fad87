use food_ordering_core::{
    types::{Category, CategorySummary},
    ErrorCode,
};
use food_ordering_storage::{CategoryError, Database};
use thiserror::Error;

/// Read access to categories and the items filed under them.
#[derive(Clone)]
pub struct CategoryService {
    database: Database,
}

impl CategoryService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Loads a category with its items sorted case-insensitively by name.
    pub async fn category_by_id(
        &self,
        category_id: &str,
    ) -> Result<Category, CategoryServiceError> {
        if category_id.trim().is_empty() {
            return Err(CategoryServiceError::EmptyId);
        }

        self.database
            .categories()
            .fetch_by_uuid(category_id)
            .await?
            .ok_or(CategoryServiceError::NotFound)
    }

    pub async fn all_categories_ordered_by_name(
        &self,
    ) -> Result<Vec<CategorySummary>, CategoryServiceError> {
        Ok(self.database.categories().list_ordered_by_name().await?)
    }
}

#[derive(Debug, Error)]
pub enum CategoryServiceError {
    #[error("{}", ErrorCode::Cnf001)]
    EmptyId,
    #[error("{}", ErrorCode::Cnf002)]
    NotFound,
    #[error("failed to load category: {0}")]
    Storage(#[from] CategoryError),
}

impl CategoryServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyId => ErrorCode::Cnf001,
            Self::NotFound => ErrorCode::Cnf002,
            Self::Storage(_) => ErrorCode::Gen001,
        }
    }
}
