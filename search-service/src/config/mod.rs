//! Configuration and dependency initialization.

mod dependencies;
mod settings;

pub use dependencies::{build_search_service, connect_to_store, ConnectionMode, Dependencies};
pub use settings::{
    split_list, HttpSettings, KafkaSettings, Settings, StoreSettings, DEFAULT_KAFKA_TOPICS,
};
