//! Application state shared by the handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::ReportStore;

/// Application state shared across handlers
///
/// Only immutable configuration lives here; each request opens its own
/// database connection through the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReportStore>,
    pub map_page: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: ReportStore, map_page: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(store),
            map_page: Arc::new(map_page.into()),
        }
    }
}
