//! Data models for the storage layer

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default value of `tipo_reporte` applied by the schema
pub const DEFAULT_REPORT_TYPE: &str = "general";

/// Fully-formed report ready to be inserted
///
/// The timestamp is already resolved by the caller. A `None` report type
/// leaves the column out of the insert so the schema default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub latitud: f64,
    pub longitud: f64,
    pub timestamp: String,
    pub foto_base64: String,
    pub descripcion: Option<String>,
    pub tipo_reporte: Option<String>,
}

/// Stored report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// Store-assigned id
    #[schema(example = 1)]
    pub id: i64,
    /// Latitude
    #[schema(example = 10.0)]
    pub latitud: f64,
    /// Longitude
    pub longitud: f64,
    /// Client-supplied timestamp
    #[schema(example = "2025-03-01T14:05:09.123456")]
    pub timestamp: String,
    /// Base64-encoded photo
    #[schema(example = "Zm9v")]
    pub foto_base64: String,
    /// Free text description
    pub descripcion: Option<String>,
    /// Report type tag
    #[schema(example = "alerta")]
    pub tipo_reporte: String,
    /// Insertion time assigned by the store
    #[schema(example = "2025-03-01 14:05:09")]
    pub created_at: Option<String>,
}

/// Primary fields shown by the admin listing
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub id: i64,
    pub timestamp: String,
    pub latitud: f64,
    pub longitud: f64,
    pub tipo_reporte: Option<String>,
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportPatch {
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub timestamp: Option<String>,
    pub foto_base64: Option<String>,
    pub descripcion: Option<String>,
    pub tipo_reporte: Option<String>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        self.latitud.is_none()
            && self.longitud.is_none()
            && self.timestamp.is_none()
            && self.foto_base64.is_none()
            && self.descripcion.is_none()
            && self.tipo_reporte.is_none()
    }

    /// Names of the columns this patch touches, in statement order
    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments().into_iter().map(|(col, _)| col).collect()
    }

    /// Column/value pairs for the supplied fields
    pub(super) fn assignments(&self) -> Vec<(&'static str, rusqlite::types::Value)> {
        use rusqlite::types::Value;

        let mut out = Vec::new();
        if let Some(v) = self.latitud {
            out.push(("latitud", Value::Real(v)));
        }
        if let Some(v) = self.longitud {
            out.push(("longitud", Value::Real(v)));
        }
        if let Some(v) = &self.timestamp {
            out.push(("timestamp", Value::Text(v.clone())));
        }
        if let Some(v) = &self.foto_base64 {
            out.push(("foto_base64", Value::Text(v.clone())));
        }
        if let Some(v) = &self.descripcion {
            out.push(("descripcion", Value::Text(v.clone())));
        }
        if let Some(v) = &self.tipo_reporte {
            out.push(("tipo_reporte", Value::Text(v.clone())));
        }
        out
    }
}

/// Aggregate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Stats {
    /// Number of stored reports
    #[schema(example = 42)]
    pub total_reportes: i64,
    /// Client timestamp of the most recently inserted report
    #[schema(example = "2025-03-01T14:05:09.123456")]
    pub ultimo_reporte: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch() {
        let patch = ReportPatch::default();
        assert!(patch.is_empty());
        assert!(patch.columns().is_empty());
    }

    #[test]
    fn test_patch_columns_follow_supplied_fields() {
        let patch = ReportPatch {
            longitud: Some(-74.0),
            descripcion: Some("revisado".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(patch.columns(), vec!["longitud", "descripcion"]);
    }

    #[test]
    fn test_report_serializes_spanish_field_names() {
        let report = Report {
            id: 1,
            latitud: 10.0,
            longitud: -74.0,
            timestamp: "2025-03-01T14:05:09".to_string(),
            foto_base64: "Zm9v".to_string(),
            descripcion: None,
            tipo_reporte: "alerta".to_string(),
            created_at: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["latitud"], 10.0);
        assert_eq!(json["foto_base64"], "Zm9v");
        assert_eq!(json["tipo_reporte"], "alerta");
        assert!(json["descripcion"].is_null());
    }
}
