// Server module - HTTP server setup and routing
pub mod error;
pub mod handlers;
pub mod state;

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use self::state::AppState;
use crate::shutdown::shutdown_signal;
use crate::AppError;

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        .route("/search", get(handlers::search))
        .route("/search/tickets", get(handlers::search_tickets))
        .route("/search/sessions", get(handlers::search_sessions))
        .route("/search/operators", get(handlers::search_operators))
        .route("/search/index/ticket", post(handlers::index_ticket))
        .route("/search/index/session", post(handlers::index_session))
        .route("/search/index/operator", post(handlers::index_operator))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on the specified address until SIGINT or SIGTERM
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("- Search endpoint: http://{}/search", addr);
    info!("- Health endpoint: http://{}/health", addr);

    serve_until(listener, app, shutdown_signal()).await
}

/// Serve on `listener` until `shutdown` resolves, then drain open requests.
pub async fn serve_until<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use search_service_repository::{CollectionNames, InMemoryStore, SearchService};

    #[tokio::test]
    async fn test_server_stops_when_shutdown_resolves() {
        let service = SearchService::new(Arc::new(InMemoryStore::new()), CollectionNames::default())
            .await
            .unwrap();
        let app = create_app(AppState::new(service, Duration::from_secs(5)));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(listener, app, async {
            let _ = stop_rx.await;
        }));

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}
