use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use food_ordering_storage::Database;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::categories::CategoryService;
use crate::items::ItemService;
use crate::problem::ErrorResponse;
use crate::response::{CategoriesListResponse, CategoryDetailsResponse, ItemListResponse};
use crate::restaurants::RestaurantService;
use crate::telemetry;

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    items: ItemService,
    categories: CategoryService,
    restaurants: RestaurantService,
    popular_items_limit: usize,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database, popular_items_limit: usize) -> Self {
        Self {
            metrics,
            items: ItemService::new(storage.clone()),
            categories: CategoryService::new(storage.clone()),
            restaurants: RestaurantService::new(storage),
            popular_items_limit,
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn items(&self) -> &ItemService {
        &self.items
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn restaurants(&self) -> &RestaurantService {
        &self.restaurants
    }

    pub fn popular_items_limit(&self) -> usize {
        self.popular_items_limit
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/category", get(all_categories))
        .route("/category/:category_id", get(category_by_id))
        .route("/item/restaurant/:restaurant_id", get(popular_items))
        .route(
            "/restaurant/:restaurant_id/category/:category_id/items",
            get(items_by_category),
        )
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
}

fn record_request<T, E>(endpoint: &'static str, result: &Result<T, E>) {
    telemetry::record_catalog_request(endpoint, result.is_ok());
}

async fn all_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesListResponse>, ErrorResponse> {
    let result = state.categories().all_categories_ordered_by_name().await;
    record_request("categories", &result);
    Ok(Json(result?.into()))
}

async fn category_by_id(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<CategoryDetailsResponse>, ErrorResponse> {
    let result = state.categories().category_by_id(&category_id).await;
    record_request("category", &result);
    Ok(Json(result?.into()))
}

async fn popular_items(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<ItemListResponse>, ErrorResponse> {
    let result = async {
        let restaurant = state.restaurants().restaurant_by_id(&restaurant_id).await?;
        let items = state
            .items()
            .items_by_popularity(&restaurant, Some(state.popular_items_limit()))
            .await?;
        Ok::<_, ErrorResponse>(items)
    }
    .await;
    record_request("popular_items", &result);

    Ok(Json(result?.into()))
}

async fn items_by_category(
    State(state): State<AppState>,
    Path((restaurant_id, category_id)): Path<(String, String)>,
) -> Result<Json<ItemListResponse>, ErrorResponse> {
    let result = state
        .items()
        .items_by_category_and_restaurant(&restaurant_id, &category_id)
        .await;
    record_request("restaurant_category_items", &result);
    Ok(Json(result?.into()))
}
