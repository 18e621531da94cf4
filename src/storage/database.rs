//! Database location and connection lifecycle

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::schema::init_schema;

/// SQLite-backed report store
///
/// Holds only the database path. Every operation opens its own connection
/// and drops it before returning, so nothing is shared between requests and
/// concurrent writers are serialized by SQLite's file locking alone.
#[derive(Debug, Clone)]
pub struct ReportStore {
    db_path: PathBuf,
}

impl ReportStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the database file is present on disk
    pub fn exists(&self) -> bool {
        self.db_path.is_file()
    }

    /// Create the database file and schema if missing. Safe to call again.
    pub fn initialize(&self) -> Result<()> {
        let db_path = self.db_path.display().to_string();
        info!(path = %db_path, "Initializing database");

        if self.exists() {
            let (_, size) = self.db_size();
            info!(path = %db_path, size = %size, "Found existing database file");
        } else {
            info!(path = %db_path, "Creating new database file");
        }

        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            info!(directory = %parent.display(), "Creating database directory");
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = self.connect()?;

        let sqlite_version: String = conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .unwrap_or_else(|_| "unknown".to_string());
        debug!(sqlite_version = %sqlite_version, "SQLite version");

        init_schema(&conn)?;

        let report_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM reportes", [], |row| row.get(0))
            .unwrap_or(0);
        let (size_bytes, size_human) = self.db_size();

        info!(
            path = %db_path,
            size = %size_human,
            size_bytes = size_bytes,
            reports = report_count,
            sqlite_version = %sqlite_version,
            "Database initialized successfully"
        );

        Ok(())
    }

    /// Open a connection scoped to a single operation
    pub(super) fn connect(&self) -> Result<Connection> {
        debug!(path = %self.db_path.display(), "Opening SQLite connection");
        Connection::open(&self.db_path)
            .map_err(|e| {
                error!(path = %self.db_path.display(), error = %e, "Failed to open SQLite database");
                e
            })
            .context("Failed to open SQLite database")
    }

    /// Get database file size
    pub fn db_size(&self) -> (u64, String) {
        match std::fs::metadata(&self.db_path) {
            Ok(metadata) => {
                let size = metadata.len();
                (size, format_bytes(size))
            }
            Err(_) => (0, "0 B".to_string()),
        }
    }
}

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
