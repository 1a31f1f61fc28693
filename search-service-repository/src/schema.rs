//! Collection schemas and the startup schema check.
//!
//! Each collection declares its field mapping once. Identifiers, statuses, and
//! other enum-like values are `keyword` fields; free-text attributes are `text`,
//! with a parallel `keyword` subfield where exact matching is also needed.

use serde_json::{json, Value};
use tracing::{info, instrument};

use search_service_shared::EntityKind;

use crate::config::CollectionNames;
use crate::errors::SearchServiceError;
use crate::interfaces::DocumentStore;

/// Subfield name used for exact matching on text attributes.
pub const KEYWORD_SUBFIELD: &str = "keyword";

/// Mapping for the tickets collection.
pub fn tickets_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "ticket_id": { "type": "long" },
                "session_id": { "type": "keyword" },
                "client_id": { "type": "keyword" },
                "operator_id": { "type": "keyword" },
                "subject": {
                    "type": "text",
                    "fields": {
                        KEYWORD_SUBFIELD: { "type": "keyword", "ignore_above": 512 }
                    }
                },
                "notes": { "type": "text" },
                "status": { "type": "keyword" }
            }
        }
    })
}

/// Mapping for the sessions collection.
pub fn sessions_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "session_id": { "type": "keyword" },
                "client_id": { "type": "keyword" },
                "pin": { "type": "keyword" },
                "status": { "type": "keyword" }
            }
        }
    })
}

/// Mapping for the operators collection.
pub fn operators_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "user_id": { "type": "keyword" },
                "display_name": {
                    "type": "text",
                    "fields": {
                        KEYWORD_SUBFIELD: { "type": "keyword", "ignore_above": 256 }
                    }
                },
                "region": { "type": "keyword" },
                "role": { "type": "keyword" }
            }
        }
    })
}

/// The mapping declared for an entity family.
pub fn mapping_for(kind: EntityKind) -> Value {
    match kind {
        EntityKind::Ticket => tickets_mapping(),
        EntityKind::Session => sessions_mapping(),
        EntityKind::Operator => operators_mapping(),
    }
}

/// Ensure every collection exists with its declared mapping.
///
/// Idempotent: collections that already exist are left untouched. The first
/// failure aborts and is reported as a schema error for that collection.
#[instrument(skip(store))]
pub async fn ensure_collections(
    store: &dyn DocumentStore,
    collections: &CollectionNames,
) -> Result<(), SearchServiceError> {
    for kind in EntityKind::ALL {
        let collection = collections.for_kind(kind);
        store
            .ensure_collection(collection, &mapping_for(kind))
            .await
            .map_err(|e| SearchServiceError::schema(collection, e))?;

        info!(collection = %collection, kind = %kind, "Collection schema ensured");
    }

    Ok(())
}
