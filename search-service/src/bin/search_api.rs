//! Search API Entry Point
//!
//! Serves ticket, session, and operator search over HTTP.

use dotenv::dotenv;
use search_service::api::{create_app, run_server, state::AppState};
use search_service::config::build_search_service;
use search_service::logging::init_tracing;
use search_service::{AppError, Settings};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    init_tracing("search-api");

    let settings = Settings::from_env();

    // Schema failures are fatal: the server must not start without them.
    let service = match build_search_service(&settings).await {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "Failed to initialize search service");
            return Err(e);
        }
    };

    let app = create_app(AppState::new(service, settings.http.request_timeout));

    info!(
        bind_address = %settings.http.bind_address(),
        request_timeout_secs = settings.http.request_timeout.as_secs(),
        "Starting search API"
    );

    run_server(app, &settings.http.bind_address()).await?;

    info!("Search API stopped");
    Ok(())
}
