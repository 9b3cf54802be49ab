//! REST API server exposing the recomputation pipeline

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::{DatasetInfo, DatasetsResponse, ReportQueryParams};
pub use state::AppState;

use std::path::PathBuf;
use std::sync::Arc;

use crate::ingest::{load_source_tables, CsvSources};
use crate::report::ReportEngine;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: "127.0.0.1")
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
    /// Path to the disaster-impact CSV
    pub disasters_csv: PathBuf,
    /// Path to the agricultural-shipments CSV
    pub agriculture_csv: PathBuf,
    /// Path to the data-science salaries CSV
    pub salaries_csv: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            disasters_csv: PathBuf::from("./data/disaster_data.csv"),
            agriculture_csv: PathBuf::from("./data/agriculture_data.csv"),
            salaries_csv: PathBuf::from("./data/data_science_job_salaries.csv"),
        }
    }
}

impl ServerConfig {
    /// The three CSV paths as one ingestion request.
    pub fn sources(&self) -> CsvSources {
        CsvSources {
            disasters: self.disasters_csv.clone(),
            agriculture: self.agriculture_csv.clone(),
            salaries: self.salaries_csv.clone(),
        }
    }
}

/// Runs the API server
///
/// Loads the three source tables once at startup; requests recompute from
/// those tables and never mutate them.
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Returns an error if a source file cannot be loaded or the server fails
/// to start
///
/// # Example
/// ```rust,no_run
/// use agrodash::server::{run_server, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::default();
///     run_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    // Load the source tables
    let tables = load_source_tables(&config.sources())?;
    let engine = ReportEngine::new(Arc::new(tables));

    // Create application state
    let state = Arc::new(AppState::new(engine));

    // Create router
    let app = routes::create_router(state);

    // Build server address
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    // Run server
    axum::serve(listener, app).await?;

    Ok(())
}
