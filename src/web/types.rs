//! Request and response types for API endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::NewReport;

/// Body of `POST /reportes/`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateReportRequest {
    /// Latitude (not range-checked)
    #[schema(example = 10.0)]
    pub latitud: f64,
    /// Longitude (not range-checked)
    pub longitud: f64,
    /// Client timestamp; the server's local time is used when absent
    #[schema(example = "2025-03-01T14:05:09.123456")]
    pub timestamp: Option<String>,
    /// Base64-encoded photo
    #[schema(example = "Zm9v")]
    pub foto_base64: String,
    /// Free text description
    pub descripcion: Option<String>,
    /// Report type, "general" when absent
    #[schema(example = "alerta")]
    pub tipo_reporte: Option<String>,
}

impl CreateReportRequest {
    /// Resolve the request into an insertable report, calling `now` only
    /// when the client sent no timestamp (or an empty one)
    pub fn into_new_report(self, now: impl FnOnce() -> String) -> NewReport {
        let timestamp = match self.timestamp {
            Some(ts) if !ts.is_empty() => ts,
            _ => now(),
        };

        NewReport {
            latitud: self.latitud,
            longitud: self.longitud,
            timestamp,
            foto_base64: self.foto_base64,
            descripcion: self.descripcion,
            tipo_reporte: self.tipo_reporte,
        }
    }
}

/// Query parameters for `GET /reportes/`
///
/// Without parameters the full table is returned.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of reports to return
    #[param(example = 100)]
    pub limit: Option<i64>,
    /// Number of reports to skip
    #[param(example = 0)]
    pub offset: Option<i64>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Failed to insert report")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status
    #[schema(example = "ok")]
    pub status: String,
}
