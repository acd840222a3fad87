use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use food_ordering_core::ErrorCode;
use serde::Serialize;
use tracing::error;

use crate::categories::CategoryServiceError;
use crate::items::ItemServiceError;
use crate::restaurants::RestaurantServiceError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
    root_cause: String,
}

/// JSON error body carrying a fixed `(code, message)` pair.
pub struct ErrorResponse {
    status: StatusCode,
    body: ErrorBody,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(code: ErrorCode, root_cause: S) -> Self {
        Self {
            status: status_for(code),
            body: ErrorBody {
                code: code.code(),
                message: code.message(),
                root_cause: root_cause.into(),
            },
        }
    }

    /// Builds the response for a failure whose details must not reach the client.
    fn internal(detail: &dyn std::fmt::Display) -> Self {
        error!(stage = "catalog", error = %detail, "request failed");
        Self::new(ErrorCode::Gen001, "internal error")
    }

    fn coded(code: ErrorCode, detail: &dyn std::fmt::Display) -> Self {
        if code == ErrorCode::Gen001 {
            Self::internal(detail)
        } else {
            Self::new(code, code.message())
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    if code.is_not_found() {
        return StatusCode::NOT_FOUND;
    }
    match code {
        ErrorCode::Cnf001 | ErrorCode::Rnf002 => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ItemServiceError> for ErrorResponse {
    fn from(err: ItemServiceError) -> Self {
        Self::coded(err.code(), &err)
    }
}

impl From<CategoryServiceError> for ErrorResponse {
    fn from(err: CategoryServiceError) -> Self {
        Self::coded(err.code(), &err)
    }
}

impl From<RestaurantServiceError> for ErrorResponse {
    fn from(err: RestaurantServiceError) -> Self {
        Self::coded(err.code(), &err)
    }
}
