//! Agrodash API Server Binary
//!
//! Run with: `cargo run --bin agrodash-server`

use agrodash::{run_server, ServerConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Note: Tracing is initialized in run_server()
    // Set RUST_LOG environment variable to control log level:
    //   RUST_LOG=debug cargo run --bin agrodash-server

    // Create configuration from environment variables or defaults
    let defaults = ServerConfig::default();
    let host = std::env::var("HOST").unwrap_or(defaults.host);
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);
    let disasters_csv = std::env::var("DISASTER_CSV")
        .map(PathBuf::from)
        .unwrap_or(defaults.disasters_csv);
    let agriculture_csv = std::env::var("AGRICULTURE_CSV")
        .map(PathBuf::from)
        .unwrap_or(defaults.agriculture_csv);
    let salaries_csv = std::env::var("SALARY_CSV")
        .map(PathBuf::from)
        .unwrap_or(defaults.salaries_csv);

    let config = ServerConfig {
        host,
        port,
        disasters_csv,
        agriculture_csv,
        salaries_csv,
    };

    println!("🚀 Starting Agrodash API Server...");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!("   Disasters: {}", config.disasters_csv.display());
    println!("   Agriculture: {}", config.agriculture_csv.display());
    println!("   Salaries: {}", config.salaries_csv.display());
    println!();
    println!(
        "Server will be available at: http://{}:{}",
        config.host, config.port
    );
    println!();
    println!("Available endpoints:");
    println!("  GET  /health                    - Health check");
    println!("  GET  /datasets                  - Describe loaded datasets");
    println!("  GET  /report?start=Y&end=Y      - Recompute dashboard views");
    println!();

    // Run server
    run_server(config).await?;

    Ok(())
}
