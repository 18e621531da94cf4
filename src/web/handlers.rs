//! HTTP request handlers for API endpoints

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info, warn};

use crate::storage::{Report, Stats};

use super::state::AppState;
use super::types::{CreateReportRequest, ErrorResponse, HealthResponse, ListQuery};

/// Local wall-clock time in ISO-8601, microsecond precision, no offset
pub fn local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn internal_error(e: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Error: {:#}", e))),
    )
        .into_response()
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Create a new report
#[utoipa::path(
    post,
    path = "/reportes/",
    tag = "Reports",
    request_body = CreateReportRequest,
    responses(
        (status = 200, description = "Stored report with its assigned id", body = Report),
        (status = 422, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_report(
    State(state): State<AppState>,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected report body");
            return (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
                .into_response();
        }
    };

    let new_report = request.into_new_report(local_timestamp);
    debug!(
        latitud = new_report.latitud,
        longitud = new_report.longitud,
        timestamp = %new_report.timestamp,
        photo_len = new_report.foto_base64.len(),
        "Received report"
    );

    let id = match state.store.insert(&new_report) {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Failed to store report");
            return internal_error(e);
        }
    };

    match state.store.get(id) {
        Ok(Some(report)) => {
            info!(
                id = report.id,
                tipo_reporte = %report.tipo_reporte,
                "Report stored"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Ok(None) => {
            error!(id = id, "Report vanished right after insert");
            internal_error(anyhow::anyhow!("report {} not found after insert", id))
        }
        Err(e) => {
            error!(error = %e, id = id, "Failed to read back stored report");
            internal_error(e)
        }
    }
}

/// List reports, newest first
#[utoipa::path(
    get,
    path = "/reportes/",
    tag = "Reports",
    params(ListQuery),
    responses(
        (status = 200, description = "Reports ordered by insertion, newest first", body = Vec<Report>),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_reports(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected list query");
            return (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
                .into_response();
        }
    };

    match state.store.list_page(query.limit, query.offset) {
        Ok(reports) => {
            debug!(count = reports.len(), "Listing reports");
            (StatusCode::OK, Json(reports)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list reports");
            internal_error(e)
        }
    }
}

/// Report statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Statistics",
    responses(
        (status = 200, description = "Report count and latest client timestamp", body = Stats),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Response {
    match state.store.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get stats");
            internal_error(e)
        }
    }
}
