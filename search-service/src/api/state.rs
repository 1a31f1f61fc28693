// App state for the HTTP server
use std::time::Duration;

use search_service_repository::SearchService;

#[derive(Clone)]
pub struct AppState {
    pub service: SearchService,
    /// Deadline for each store-touching request.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: SearchService, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }
}
