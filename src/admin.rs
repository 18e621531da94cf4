//! Offline administration of the report store
//!
//! Every command works directly on the SQLite file and skips the checks the
//! HTTP API applies. Output is plain text written to any `io::Write`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rusqlite::types::Value;
use tracing::{debug, info, warn};

use crate::config::{AdminCommand, UpdateArgs};
use crate::error::AdminError;
use crate::storage::{PHOTO_COLUMN, ReportPatch, ReportStore, format_bytes};

/// Rows shown by `list`
pub const LIST_LIMIT: i64 = 200;

/// Suffix appended to the database path by `backup`
pub const BACKUP_SUFFIX: &str = ".bak";

pub struct Admin {
    store: ReportStore,
}

impl Admin {
    /// Attach to an existing database; never creates one
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, AdminError> {
        let store = ReportStore::new(db_path);
        if !store.exists() {
            return Err(AdminError::StorageUnavailable(store.path().to_path_buf()));
        }
        debug!(path = %store.path().display(), "Opened report store");
        Ok(Self { store })
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn run(&self, command: &AdminCommand, out: &mut impl Write) -> Result<(), AdminError> {
        match command {
            AdminCommand::List => self.list(out),
            AdminCommand::Show { id } => self.show(*id, out),
            AdminCommand::Update(args) => self.update(args, out),
            AdminCommand::SetPhoto { id, image } => self.set_photo(*id, image, out),
            AdminCommand::Backup => self.backup(out).map(|_| ()),
        }
    }

    pub fn list(&self, out: &mut impl Write) -> Result<(), AdminError> {
        for r in self.store.recent(LIST_LIMIT)? {
            writeln!(
                out,
                "id={} | {} | lat={:?} lng={:?} | tipo={}",
                r.id,
                r.timestamp,
                r.latitud,
                r.longitud,
                r.tipo_reporte.as_deref().unwrap_or("NULL")
            )?;
        }
        Ok(())
    }

    /// Print every column of a report as the live schema lays it out
    pub fn show(&self, id: i64, out: &mut impl Write) -> Result<(), AdminError> {
        let descriptor = self.store.schema()?;
        let photo = descriptor.index_of(PHOTO_COLUMN);

        match self.store.describe(id, &descriptor)? {
            Some(values) => {
                for (accessor, (column, value)) in
                    descriptor.columns().iter().zip(&values).enumerate()
                {
                    let text = if Some(accessor) == photo {
                        render_photo(value)
                    } else {
                        render_value(value)
                    };
                    writeln!(out, "{}: {}", column, text)?;
                }
            }
            None => writeln!(out, "Report id={} not found", id)?,
        }
        Ok(())
    }

    pub fn update(&self, args: &UpdateArgs, out: &mut impl Write) -> Result<(), AdminError> {
        let patch = ReportPatch {
            latitud: args.lat,
            longitud: args.lng,
            tipo_reporte: args.tipo.clone(),
            descripcion: args.desc.clone(),
            ..Default::default()
        };

        if patch.is_empty() {
            writeln!(out, "Nothing to update.")?;
            return Ok(());
        }

        let affected = self.store.update(args.id, &patch)?;
        if affected == 0 {
            warn!(id = args.id, "Update matched no rows");
        }
        info!(id = args.id, columns = ?patch.columns(), "Report updated");
        writeln!(out, "Updated id={} (rows matched: {})", args.id, affected)?;
        Ok(())
    }

    /// Replace the stored photo with the base64 encoding of `image`
    pub fn set_photo(&self, id: i64, image: &Path, out: &mut impl Write) -> Result<(), AdminError> {
        let bytes = fs::read(image).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AdminError::ImageNotFound(image.to_path_buf()),
            _ => AdminError::Io {
                path: image.to_path_buf(),
                source: e,
            },
        })?;

        let encoded = STANDARD.encode(&bytes);
        let encoded_len = encoded.len();
        let affected = self.store.set_photo(id, encoded)?;
        if affected == 0 {
            warn!(id = id, "Photo update matched no rows");
        }

        info!(id = id, bytes = bytes.len(), image = %image.display(), "Photo replaced");
        writeln!(
            out,
            "Photo updated for id={} (base64 len={}, rows matched: {})",
            id, encoded_len, affected
        )?;
        Ok(())
    }

    /// Byte copy of the database file next to itself
    pub fn backup(&self, out: &mut impl Write) -> Result<PathBuf, AdminError> {
        let source = self.store.path();
        let target = backup_path(source);

        let copied = fs::copy(source, &target).map_err(|e| AdminError::Io {
            path: target.clone(),
            source: e,
        })?;

        info!(from = %source.display(), to = %target.display(), bytes = copied, "Database backed up");
        writeln!(
            out,
            "Copied {} -> {} ({})",
            source.display(),
            target.display(),
            format_bytes(copied)
        )?;
        Ok(target)
    }
}

/// Open the store at `db_path` and run one command
///
/// Failures are printed to `err`; the return value is the process exit code.
pub fn execute(
    db_path: &Path,
    command: &AdminCommand,
    out: &mut impl Write,
    err: &mut impl Write,
) -> i32 {
    let result = Admin::open(db_path).and_then(|admin| admin.run(command, out));
    let _ = out.flush();

    match result {
        Ok(()) => 0,
        Err(e) => {
            debug!(error = ?e, "Admin command failed");
            let _ = writeln!(err, "{}", e);
            e.exit_code()
        }
    }
}

/// `<db path>.bak`
pub fn backup_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Photo column summary: decoded size, never the payload
pub fn render_photo(value: &Value) -> String {
    match value {
        Value::Text(text) => match STANDARD.decode(text) {
            Ok(bytes) => format!(
                "<photo: {} bytes, base64 len={}> (use set-photo to replace)",
                bytes.len(),
                text.len()
            ),
            Err(_) => format!("<photo: invalid base64, len={}>", text.len()),
        },
        other => render_value(other),
    }
}

/// Text form of a column value
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{:?}", f),
        Value::Text(text) => text.clone(),
        Value::Blob(blob) => format!("<blob len={}>", blob.len()),
    }
}
