//! Database schema initialization, migrations and introspection

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// The single table holding every report
pub const REPORTS_TABLE: &str = "reportes";

/// Column holding the base64 photo payload
pub const PHOTO_COLUMN: &str = "foto_base64";

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    debug!("Initializing database schema");

    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
            [REPORTS_TABLE],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if table_exists {
        debug!("Reports table already exists, checking schema");
    } else {
        info!("Creating new database schema");
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reportes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            latitud REAL NOT NULL,
            longitud REAL NOT NULL,
            timestamp TEXT NOT NULL,
            foto_base64 TEXT NOT NULL,
            descripcion TEXT,
            tipo_reporte TEXT DEFAULT 'general',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .context("Failed to initialize database schema")?;

    run_migrations(conn)?;

    let descriptor = SchemaDescriptor::load(conn, REPORTS_TABLE)?;
    debug!(
        table = REPORTS_TABLE,
        columns = descriptor.columns().len(),
        "Database schema initialized"
    );

    Ok(())
}

/// Bring tables created by older releases up to the current column set
fn run_migrations(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "descripcion")? {
        info!("Migrating database: adding descripcion column");
        conn.execute("ALTER TABLE reportes ADD COLUMN descripcion TEXT", [])
            .context("Failed to add descripcion column")?;
    }

    if !column_exists(conn, "tipo_reporte")? {
        info!("Migrating database: adding tipo_reporte column");
        conn.execute(
            "ALTER TABLE reportes ADD COLUMN tipo_reporte TEXT DEFAULT 'general'",
            [],
        )
        .context("Failed to add tipo_reporte column")?;
    }

    // ADD COLUMN rejects CURRENT_TIMESTAMP; inserts set created_at explicitly.
    if !column_exists(conn, "created_at")? {
        info!("Migrating database: adding created_at column");
        conn.execute("ALTER TABLE reportes ADD COLUMN created_at TIMESTAMP", [])
            .context("Failed to add created_at column")?;
    }

    Ok(())
}

/// Check if a column exists in the reportes table
fn column_exists(conn: &Connection, column_name: &str) -> Result<bool> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name=?2",
            [REPORTS_TABLE, column_name],
            |row| row.get(0),
        )
        .unwrap_or(false);
    Ok(exists)
}

/// Ordered view of a table's columns, read from SQLite metadata
///
/// Each column's position is its accessor: a row fetched with
/// [`SchemaDescriptor::select_sql`] holds column `i` at index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    table: String,
    columns: Vec<String>,
}

impl SchemaDescriptor {
    /// Read the column list of `table` in declaration order
    pub fn load(conn: &Connection, table: &str) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;

        let columns = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()
            .with_context(|| format!("Failed to read schema of table {}", table))?;

        if columns.is_empty() {
            anyhow::bail!("Table {} does not exist", table);
        }

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    /// Column names, indexed by accessor
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Accessor (row index) of a column
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// `SELECT` listing every column explicitly, in descriptor order
    pub fn select_sql(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        format!("SELECT {} FROM {}", cols.join(", "), quote_ident(&self.table))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
