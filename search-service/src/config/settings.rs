//! Settings read from the environment at startup.
//!
//! Parsing goes through a lookup function so it can be tested without
//! touching the process environment. Blank values count as unset, and
//! unparseable values fall back to their defaults with a warning.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use search_service_repository::{CollectionNames, StoreCredentials};

use crate::config::ConnectionMode;
use crate::consumer::CommitPolicy;
use crate::normalizer::{
    TopicRouting, DEFAULT_OPERATOR_PREFIX, DEFAULT_SESSION_PREFIX, DEFAULT_TICKET_PREFIX,
};
use crate::AppError;

/// Default store URL.
const DEFAULT_STORE_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

const DEFAULT_APP_HOST: &str = "0.0.0.0";
const DEFAULT_APP_PORT: u16 = 8096;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "search-service";

/// Topics subscribed to when `KAFKA_TOPICS` is unset.
pub const DEFAULT_KAFKA_TOPICS: &[&str] = &[
    "psds.session.events",
    "psds.session.created",
    "psds.session.ended",
    "psds.session.operator_joined",
    "psds.operator.assigned",
    "psds.operator.created",
    "psds.operator.updated",
    "psds.ticket.events",
];

/// Document store connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: String,
    pub credentials: Option<StoreCredentials>,
    pub skip_tls_verify: bool,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    /// Deadline applied to each store-touching request.
    pub request_timeout: Duration,
}

impl HttpSettings {
    /// The `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Message bus settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub brokers: String,
    pub group_id: String,
    pub topics: Vec<String>,
    pub routing: TopicRouting,
    pub commit_policy: CommitPolicy,
}

impl KafkaSettings {
    /// Fail unless brokers and topics are configured.
    pub fn require_configured(&self) -> Result<(), AppError> {
        if self.brokers.trim().is_empty() {
            return Err(AppError::config("KAFKA_BROKERS must be set"));
        }
        if self.topics.is_empty() {
            return Err(AppError::config("KAFKA_TOPICS must name at least one topic"));
        }
        Ok(())
    }
}

/// All runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreSettings,
    pub collections: CollectionNames,
    pub http: HttpSettings,
    pub kafka: KafkaSettings,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let url = vars
            .first_non_empty(&["OPENSEARCH_URL", "ELASTICSEARCH_URL"])
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

        let credentials = vars
            .non_empty("ELASTICSEARCH_USERNAME")
            .map(|username| StoreCredentials {
                username,
                password: vars.get("ELASTICSEARCH_PASSWORD").unwrap_or_default(),
            });

        let store = StoreSettings {
            url,
            credentials,
            skip_tls_verify: vars.parsed_bool("ELASTICSEARCH_SKIP_TLS_VERIFY", false),
            connection_mode: vars.parsed("OPENSEARCH_CONNECTION_MODE", ConnectionMode::Retry),
            retry_interval: Duration::from_secs(
                vars.parsed("OPENSEARCH_RETRY_INTERVAL_SECS", DEFAULT_RETRY_INTERVAL_SECS),
            ),
        };

        let defaults = CollectionNames::default();
        let collections = CollectionNames::new(
            vars.non_empty("TICKETS_INDEX").unwrap_or(defaults.tickets),
            vars.non_empty("SESSIONS_INDEX").unwrap_or(defaults.sessions),
            vars.non_empty("OPERATORS_INDEX").unwrap_or(defaults.operators),
        );

        let port = match vars.first_non_empty(&["APP_PORT", "HTTP_PORT"]) {
            Some(raw) => parse_or_default("APP_PORT", &raw, DEFAULT_APP_PORT),
            None => DEFAULT_APP_PORT,
        };
        let http = HttpSettings {
            host: vars
                .non_empty("APP_HOST")
                .unwrap_or_else(|| DEFAULT_APP_HOST.to_string()),
            port,
            request_timeout: Duration::from_secs(
                vars.parsed("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        };

        let topics = match vars.get("KAFKA_TOPICS") {
            Some(raw) => split_list(&raw),
            None => DEFAULT_KAFKA_TOPICS.iter().map(|t| t.to_string()).collect(),
        };
        let kafka = KafkaSettings {
            brokers: split_list(&vars.get("KAFKA_BROKERS").unwrap_or_default()).join(","),
            group_id: vars
                .non_empty("KAFKA_GROUP_ID")
                .unwrap_or_else(|| DEFAULT_KAFKA_GROUP_ID.to_string()),
            topics,
            routing: TopicRouting::new(
                vars.non_empty("KAFKA_TICKET_TOPIC_PREFIX")
                    .unwrap_or_else(|| DEFAULT_TICKET_PREFIX.to_string()),
                vars.non_empty("KAFKA_SESSION_TOPIC_PREFIX")
                    .unwrap_or_else(|| DEFAULT_SESSION_PREFIX.to_string()),
                vars.non_empty("KAFKA_OPERATOR_TOPIC_PREFIX")
                    .unwrap_or_else(|| DEFAULT_OPERATOR_PREFIX.to_string()),
            ),
            commit_policy: vars.parsed("KAFKA_COMMIT_MODE", CommitPolicy::BeforeProcess),
        };

        Self {
            store,
            collections,
            http,
            kafka,
        }
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn first_non_empty(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.non_empty(key))
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.non_empty(key) {
            Some(raw) => parse_or_default(key, &raw, default),
            None => default,
        }
    }

    fn parsed_bool(&self, key: &str, default: bool) -> bool {
        match self.non_empty(key).map(|v| v.to_lowercase()).as_deref() {
            None => default,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => {
                warn!(key, value = other, default, "Invalid boolean, using default");
                default
            }
        }
    }
}

fn parse_or_default<T: FromStr>(key: &str, raw: &str, default: T) -> T {
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = raw, "Invalid value, using default");
            default
        }
    }
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
