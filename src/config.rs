use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================
// Environment variable name constants
// Shared by the service and the admin tool
// ============================================
pub mod env {
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const SERVER_HOST: &str = "SERVER_HOST";
    pub const SERVER_PORT: &str = "SERVER_PORT";
    pub const DATABASE_PATH: &str = "DATABASE_PATH";
    pub const MAP_PAGE_PATH: &str = "MAP_PAGE_PATH";
}

/// Default SQLite file, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "reportes.db";

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show version information
    Version,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "reportes-gps",
    version,
    about = "Geotagged incident report service",
    long_about = "Receives GPS reports with an embedded photo, stores them in SQLite and serves them back as JSON."
)]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Log format: json or pretty
    #[arg(long, env = env::LOG_FORMAT, default_value = "pretty")]
    pub log_format: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = env::LOG_LEVEL, default_value = "info")]
    pub log_level: String,

    /// Address to bind the HTTP server to
    #[arg(long, env = env::SERVER_HOST, default_value = "127.0.0.1")]
    pub host: String,

    /// HTTP server port
    #[arg(long, env = env::SERVER_PORT, default_value = "8000")]
    pub port: u16,

    /// SQLite database file, created on startup if missing
    #[arg(long, env = env::DATABASE_PATH, default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,

    /// HTML file served at /mapa
    #[arg(long, env = env::MAP_PAGE_PATH, default_value = "mapa.html")]
    pub map_page: PathBuf,
}

impl Config {
    pub fn from_args() -> Self {
        Config::parse()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.as_os_str().is_empty() {
            return Err("DATABASE_PATH must not be empty".to_string());
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Command line of the offline admin tool
#[derive(Parser, Debug, Clone)]
#[command(
    name = "reportes-admin",
    version,
    about = "Inspect and edit reports directly in the SQLite store",
    long_about = "Reads and patches the reportes table without going through the HTTP API. Take a backup first."
)]
pub struct AdminArgs {
    /// SQLite database file (must already exist)
    #[arg(long, global = true, env = env::DATABASE_PATH, default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,

    /// Log level for diagnostics written to stderr
    #[arg(long, global = true, env = env::LOG_LEVEL, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AdminCommand {
    /// List the 200 most recent reports
    List,
    /// Show every column of a report
    Show {
        /// Report id
        id: i64,
    },
    /// Patch the supplied fields of a report
    Update(UpdateArgs),
    /// Replace the photo of a report with a local image file
    SetPhoto {
        /// Report id
        id: i64,
        /// Image file to embed
        image: PathBuf,
    },
    /// Copy the database file to <path>.bak
    Backup,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct UpdateArgs {
    /// Report id
    pub id: i64,

    /// New latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// New longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// New report type
    #[arg(long)]
    pub tipo: Option<String>,

    /// New description
    #[arg(long)]
    pub desc: Option<String>,
}
