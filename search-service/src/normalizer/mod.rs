//! Event normalizer: turns one inbound bus message into at most one index call.
//!
//! Each message is handled on its own:
//!
//! 1. **Classify**: pick the entity family from the topic or the payload.
//! 2. **Decode**: read the payload into the family's record.
//! 3. **Admit or drop**: apply the family's admission rule.
//! 4. **Upsert**: call the matching `SearchService` index operation.
//!
//! A dropped event is logged and reported as [`Outcome::Dropped`]. Only a
//! failed index call is an error.

mod events;
mod routing;

pub use events::{
    classify, default_session_status, discriminator, parse_payload, AdmissionDrop, EntityEvent,
    STATUS_ACTIVE, STATUS_FINISHED, STATUS_WAITING,
};
pub use routing::{
    TopicRouting, DEFAULT_OPERATOR_PREFIX, DEFAULT_SESSION_PREFIX, DEFAULT_TICKET_PREFIX,
};

use tracing::{error, info, instrument, warn};

use search_service_repository::SearchService;
use search_service_shared::EntityKind;

use crate::errors::IngestError;

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event was indexed under `id`.
    Indexed { kind: EntityKind, id: String },
    /// The event failed admission and was skipped.
    Dropped(AdmissionDrop),
}

/// Normalizes inbound events and indexes the admitted ones.
#[derive(Clone)]
pub struct EventNormalizer {
    service: SearchService,
    routing: TopicRouting,
}

impl EventNormalizer {
    pub fn new(service: SearchService, routing: TopicRouting) -> Self {
        Self { service, routing }
    }

    /// Classify, decode, and admit an event without touching the store.
    pub fn normalize(&self, topic: &str, payload: &[u8]) -> Result<EntityEvent, AdmissionDrop> {
        let fields = parse_payload(payload)?;
        let kind = classify(&self.routing, topic, &fields).ok_or_else(|| {
            AdmissionDrop::UnknownFamily {
                topic: topic.to_string(),
            }
        })?;

        EntityEvent::decode(kind, &fields).admit()
    }

    /// Handle one inbound event end to end.
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn handle(&self, topic: &str, payload: &[u8]) -> Result<Outcome, IngestError> {
        let event = match self.normalize(topic, payload) {
            Ok(event) => event,
            Err(reason) => {
                warn!(topic = %topic, reason = %reason, "Dropping event");
                return Ok(Outcome::Dropped(reason));
            }
        };

        let kind = event.kind();
        let id = event.id();

        let result = match &event {
            EntityEvent::Ticket(ticket) => self.service.index_ticket(ticket).await,
            EntityEvent::Session(session) => self.service.index_session(session).await,
            EntityEvent::Operator(operator) => self.service.index_operator(operator).await,
        };

        if let Err(e) = result {
            error!(topic = %topic, kind = %kind, id = %id, error = %e, "Failed to index event");
            return Err(e.into());
        }

        info!(topic = %topic, kind = %kind, id = %id, "Indexed event");
        Ok(Outcome::Indexed { kind, id })
    }
}
