//! Dependency initialization and wiring for the search service.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use search_service_repository::{OpenSearchStore, SearchService};

use crate::config::settings::{Settings, StoreSettings};
use crate::consumer::KafkaConsumer;
use crate::normalizer::EventNormalizer;
use crate::orchestrator::Orchestrator;
use crate::AppError;

/// Connection mode for the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry the connection until it succeeds.
    Retry,
}

impl FromStr for ConnectionMode {
    type Err = String;

    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Ok(Self::FailFast),
            "retry" => Ok(Self::Retry),
            other => Err(format!("unknown connection mode '{}'", other)),
        }
    }
}

/// Container for the worker's initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Build everything the ingest worker needs.
    ///
    /// Fails when Kafka is not configured, when the store cannot be reached
    /// in fail-fast mode, or when a collection schema cannot be ensured.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        settings.kafka.require_configured()?;

        info!(
            store_url = %settings.store.url,
            kafka_brokers = %settings.kafka.brokers,
            kafka_group_id = %settings.kafka.group_id,
            commit_policy = %settings.kafka.commit_policy,
            connection_mode = ?settings.store.connection_mode,
            retry_interval_secs = settings.store.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let service = build_search_service(settings).await?;

        let consumer = KafkaConsumer::new(
            &settings.kafka.brokers,
            &settings.kafka.group_id,
            settings.kafka.topics.clone(),
            settings.kafka.commit_policy,
        )
        .map_err(|e| AppError::config(format!("Failed to create Kafka consumer: {}", e)))?;

        info!("Kafka consumer created");

        let normalizer = EventNormalizer::new(service, settings.kafka.routing.clone());
        let orchestrator = Orchestrator::new(Arc::new(consumer), normalizer);

        Ok(Self { orchestrator })
    }
}

/// Connect to the store and construct the `SearchService`.
///
/// Schema failures are fatal and returned as errors.
pub async fn build_search_service(settings: &Settings) -> Result<SearchService, AppError> {
    let store = connect_to_store(&settings.store).await?;
    info!("Document store connection established");

    let service = SearchService::new(Arc::new(store), settings.collections.clone()).await?;
    info!(collections = ?service.collections(), "Collection schemas ensured");

    Ok(service)
}

/// Connect to the store, retrying according to the connection mode.
pub async fn connect_to_store(settings: &StoreSettings) -> Result<OpenSearchStore, AppError> {
    loop {
        match try_connect_store(settings).await {
            Ok(store) => return Ok(store),
            Err(e) => match settings.connection_mode {
                ConnectionMode::FailFast => {
                    return Err(AppError::config(format!(
                        "Failed to connect to document store: {}",
                        e
                    )));
                }
                ConnectionMode::Retry => {
                    warn!(
                        store_url = %settings.url,
                        error = %e,
                        retry_interval_secs = settings.retry_interval.as_secs(),
                        "Failed to connect to document store, retrying..."
                    );
                    sleep(retry_interval(settings)).await;
                }
            },
        }
    }
}

/// Build a client and check that the store answers.
async fn try_connect_store(settings: &StoreSettings) -> Result<OpenSearchStore, AppError> {
    let store = OpenSearchStore::new(
        &settings.url,
        settings.credentials.clone(),
        settings.skip_tls_verify,
    )
    .map_err(|e| AppError::config(format!("Failed to create store client: {}", e)))?;

    store
        .ping()
        .await
        .map_err(|e| AppError::config(format!("Store ping failed: {}", e)))?;

    Ok(store)
}

fn retry_interval(settings: &StoreSettings) -> Duration {
    settings.retry_interval.max(Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_mode_parse() {
        assert_eq!("fail-fast".parse(), Ok(ConnectionMode::FailFast));
        assert_eq!("FailFast".parse(), Ok(ConnectionMode::FailFast));
        assert_eq!(" retry ".parse(), Ok(ConnectionMode::Retry));
        assert!("sometimes".parse::<ConnectionMode>().is_err());
    }

    #[tokio::test]
    async fn test_fail_fast_on_invalid_url() {
        let settings = StoreSettings {
            url: "not a url".to_string(),
            credentials: None,
            skip_tls_verify: false,
            connection_mode: ConnectionMode::FailFast,
            retry_interval: Duration::from_secs(15),
        };

        let err = connect_to_store(&settings).await.err().unwrap();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
