//! REST API endpoints.
//!
//! Axum-based HTTP API for recording runs, browsing run history,
//! and reading season statistics.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::config::MAX_PAGE_SIZE;
use crate::models::RunValidationError;
use crate::storage::StorageError;

pub mod routes;
pub mod state;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        tracing::error!("Storage failure: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl From<RunValidationError> for ApiError {
    fn from(e: RunValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>, default_page_size: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(default_page_size)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Move a page past the end back onto the last page.
    pub fn clamp_to(mut self, total_items: u32) -> Self {
        self.page = self.page.min(total_pages(total_items, self.page_size));
        self
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.page_size
    }
}

/// Number of pages; an empty history still has one page.
pub fn total_pages(total_items: u32, page_size: u32) -> u32 {
    total_items.div_ceil(page_size).max(1)
}

/// Pagination metadata in responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u32) -> Self {
        let total_pages = total_pages(total_items, pagination.page_size);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/users/:owner/runs",
            get(routes::runs::list_runs).post(routes::runs::create_run),
        )
        .route("/api/users/:owner/runs/:id", delete(routes::runs::delete_run))
        .route("/api/users/:owner/seasons", get(routes::runs::list_seasons))
        .route(
            "/api/users/:owner/stats/percentages",
            get(routes::stats::percentages),
        )
        .route("/api/users/:owner/stats/heroes", get(routes::stats::heroes))
        .route("/api/users/:owner/stats/tables", get(routes::stats::tables))
        .route("/api/users/:owner/stats/report", get(routes::stats::report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
