//! Shared application state for the API server

use crate::report::ReportEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Recomputes dashboard reports over the loaded tables.
    ///
    /// The engine reads immutable tables behind an `Arc`, so the request
    /// path needs no locking at all.
    pub engine: ReportEngine,
}

impl AppState {
    /// Creates a new application state
    pub fn new(engine: ReportEngine) -> Self {
        AppState { engine }
    }
}
