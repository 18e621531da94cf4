//! Report CRUD and aggregate queries

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Row, params, params_from_iter};
use tracing::debug;

use super::database::ReportStore;
use super::models::{DEFAULT_REPORT_TYPE, NewReport, Report, ReportPatch, ReportSummary, Stats};
use super::schema::{REPORTS_TABLE, SchemaDescriptor};

/// Column/value pairs of one row, in schema order
pub type RowValues = Vec<Value>;

const REPORT_COLUMNS: &str =
    "id, latitud, longitud, timestamp, foto_base64, descripcion, tipo_reporte, created_at";

// created_at has one-second resolution; id breaks ties.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

fn map_report(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        latitud: row.get(1)?,
        longitud: row.get(2)?,
        timestamp: row.get(3)?,
        foto_base64: row.get(4)?,
        descripcion: row.get(5)?,
        tipo_reporte: row
            .get::<_, Option<String>>(6)?
            .unwrap_or_else(|| DEFAULT_REPORT_TYPE.to_string()),
        created_at: row.get(7)?,
    })
}

impl ReportStore {
    /// Insert a report and return its assigned id
    pub fn insert(&self, report: &NewReport) -> Result<i64> {
        let conn = self.connect()?;

        let mut columns = vec!["latitud", "longitud", "timestamp", "foto_base64", "descripcion"];
        let mut values = vec![
            Value::Real(report.latitud),
            Value::Real(report.longitud),
            Value::Text(report.timestamp.clone()),
            Value::Text(report.foto_base64.clone()),
            report
                .descripcion
                .clone()
                .map(Value::Text)
                .unwrap_or(Value::Null),
        ];
        if let Some(tipo) = &report.tipo_reporte {
            columns.push("tipo_reporte");
            values.push(Value::Text(tipo.clone()));
        }

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}, created_at) VALUES ({}, CURRENT_TIMESTAMP)",
            REPORTS_TABLE,
            columns.join(", "),
            placeholders.join(", ")
        );

        conn.execute(&sql, params_from_iter(values.iter()))
            .context("Failed to insert report")?;
        let id = conn.last_insert_rowid();

        debug!(
            id = id,
            tipo_reporte = report.tipo_reporte.as_deref().unwrap_or(DEFAULT_REPORT_TYPE),
            photo_len = report.foto_base64.len(),
            "Report inserted"
        );

        Ok(id)
    }

    /// All reports, newest first
    pub fn list_all(&self) -> Result<Vec<Report>> {
        self.list_page(None, None)
    }

    /// Reports in listing order, optionally bounded
    pub fn list_page(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Report>> {
        let conn = self.connect()?;

        // LIMIT -1 means no limit in SQLite
        let sql = format!(
            "SELECT {} FROM {} {} LIMIT ?1 OFFSET ?2",
            REPORT_COLUMNS, REPORTS_TABLE, NEWEST_FIRST
        );
        let mut stmt = conn.prepare(&sql)?;
        let reports = stmt
            .query_map(
                params![limit.unwrap_or(-1), offset.unwrap_or(0).max(0)],
                map_report,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = reports.len(), limit = ?limit, offset = ?offset, "Reports listed");

        Ok(reports)
    }

    /// Single report by id
    pub fn get(&self, id: i64) -> Result<Option<Report>> {
        let conn = self.connect()?;

        let sql = format!("SELECT {} FROM {} WHERE id = ?1", REPORT_COLUMNS, REPORTS_TABLE);
        match conn.query_row(&sql, params![id], map_report) {
            Ok(report) => Ok(Some(report)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply the supplied fields to a report
    ///
    /// Returns the number of rows changed. An empty patch issues no
    /// statement, and an unknown id simply matches zero rows.
    pub fn update(&self, id: i64, patch: &ReportPatch) -> Result<usize> {
        let assignments = patch.assignments();
        if assignments.is_empty() {
            debug!(id = id, "Empty patch, nothing to update");
            return Ok(0);
        }

        let conn = self.connect()?;

        let set_clause: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{} = ?{}", col, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            REPORTS_TABLE,
            set_clause.join(", "),
            assignments.len() + 1
        );

        let mut values: Vec<Value> = assignments.into_iter().map(|(_, v)| v).collect();
        values.push(Value::Integer(id));

        let affected = conn
            .execute(&sql, params_from_iter(values.iter()))
            .context("Failed to update report")?;

        debug!(
            id = id,
            columns = ?patch.columns(),
            affected = affected,
            "Report update attempted"
        );

        Ok(affected)
    }

    /// Overwrite the stored photo payload
    pub fn set_photo(&self, id: i64, foto_base64: String) -> Result<usize> {
        self.update(
            id,
            &ReportPatch {
                foto_base64: Some(foto_base64),
                ..Default::default()
            },
        )
    }

    /// Primary fields of the most recently inserted reports
    pub fn recent(&self, limit: i64) -> Result<Vec<ReportSummary>> {
        let conn = self.connect()?;

        let sql = format!(
            "SELECT id, timestamp, latitud, longitud, tipo_reporte FROM {} ORDER BY id DESC LIMIT ?1",
            REPORTS_TABLE
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(ReportSummary {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    latitud: row.get(2)?,
                    longitud: row.get(3)?,
                    tipo_reporte: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Read the current column layout of the reports table
    pub fn schema(&self) -> Result<SchemaDescriptor> {
        let conn = self.connect()?;
        SchemaDescriptor::load(&conn, REPORTS_TABLE)
    }

    /// Every column of one report; value `i` belongs to the column whose
    /// accessor in `descriptor` is `i`
    pub fn describe(&self, id: i64, descriptor: &SchemaDescriptor) -> Result<Option<RowValues>> {
        let conn = self.connect()?;

        let sql = format!("{} WHERE id = ?1", descriptor.select_sql());
        let result = conn.query_row(&sql, params![id], |row| {
            (0..descriptor.columns().len())
                .map(|accessor| row.get::<_, Value>(accessor))
                .collect::<rusqlite::Result<RowValues>>()
        });

        match result {
            Ok(fields) => Ok(Some(fields)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of stored reports
    pub fn count(&self) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", REPORTS_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Client timestamp of the most recently inserted report
    pub fn latest_timestamp(&self) -> Result<Option<String>> {
        let conn = self.connect()?;

        let sql = format!(
            "SELECT timestamp FROM {} {} LIMIT 1",
            REPORTS_TABLE, NEWEST_FIRST
        );
        match conn.query_row(&sql, [], |row| row.get(0)) {
            Ok(ts) => Ok(Some(ts)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overall statistics
    pub fn stats(&self) -> Result<Stats> {
        Ok(Stats {
            total_reportes: self.count()?,
            ultimo_reporte: self.latest_timestamp()?,
        })
    }
}
