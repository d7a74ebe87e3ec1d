//! HTTP handlers for the dashboard and the JSON API.
//!
//! Each handler validates the query string and delegates to the service
//! layer for business logic.

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use tracing::{info, warn};

use super::dto::{CompareQuery, CompareRequest, HealthResponse};
use super::error::AppError;
use super::render::{self, Notice, PageContent};
use super::state::AppState;
use crate::api::ServiceComparison;
use crate::db::services as db_services;
use crate::services::build_comparison;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = db_services::database_status(state.repository.as_ref()).await;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        connection: state.repository.connection_state(),
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET / and GET /compare
///
/// Renders the dashboard. Validation problems and repository failures are
/// shown as notices on the page, which is always served with status 200.
pub async fn compare_page(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Html<String> {
    let content = match query.parse() {
        CompareRequest::Missing => {
            PageContent::Notices(vec![Notice::Info(render::PROMPT_MESSAGE.to_string())])
        }
        CompareRequest::Invalid(message) => PageContent::Notices(vec![Notice::Warning(message)]),
        CompareRequest::Same(_) => {
            PageContent::Notices(vec![Notice::Warning(render::SAME_IDS_MESSAGE.to_string())])
        }
        CompareRequest::Ready { first, second } => {
            match build_comparison(state.repository.as_ref(), first, second).await {
                Ok(report) => {
                    info!(%first, %second, "Rendered comparison");
                    PageContent::Comparison(Box::new(report))
                }
                Err(e) => {
                    warn!(%first, %second, error = %e, "Comparison failed");
                    PageContent::Notices(Notice::failure(&e))
                }
            }
        }
    };

    Html(render::render_page(&query, &content))
}

// =============================================================================
// JSON API
// =============================================================================

/// GET /v1/compare?service_a=&service_b=
///
/// Same comparison as the dashboard, as JSON.
pub async fn compare_json(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> HandlerResult<ServiceComparison> {
    let (first, second) = match query.parse() {
        CompareRequest::Ready { first, second } => (first, second),
        CompareRequest::Missing => {
            return Err(AppError::BadRequest(
                "Both service_a and service_b are required".to_string(),
            ))
        }
        CompareRequest::Invalid(message) => return Err(AppError::BadRequest(message)),
        CompareRequest::Same(id) => {
            return Err(AppError::BadRequest(format!(
                "service_a and service_b must differ (both are {})",
                id
            )))
        }
    };

    let report = build_comparison(state.repository.as_ref(), first, second).await?;
    Ok(Json(report))
}
