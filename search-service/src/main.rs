//! Search Worker Main Entry Point
//!
//! Consumes ticket, session, and operator events from Kafka and indexes them
//! into OpenSearch/Elasticsearch.

use dotenv::dotenv;
use search_service::logging::init_tracing;
use search_service::{AppError, Dependencies, Settings};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing("search-worker");

    info!("Starting search worker");

    let settings = Settings::from_env();

    let mut deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(()) => {
            info!("Search worker completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search worker failed");
            Err(e.into())
        }
    }
}
