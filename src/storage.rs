//! Storage layer for reportes-gps
//!
//! This module provides SQLite-based persistence for GPS reports.
//!
//! # Module Structure
//! - `database`: Database location and per-operation connections
//! - `models`: Data types and structures
//! - `schema`: Schema initialization, migrations and the schema descriptor
//! - `operations`: CRUD and aggregate queries

mod database;
mod models;
mod operations;
mod schema;

// Re-export public types
pub use database::{ReportStore, format_bytes};
pub use models::{DEFAULT_REPORT_TYPE, NewReport, Report, ReportPatch, ReportSummary, Stats};
pub use operations::RowValues;
pub use schema::{PHOTO_COLUMN, REPORTS_TABLE, SchemaDescriptor};
