//! Per-family decoding, status defaulting, and admission of inbound events.

use serde_json::{Map, Value};
use thiserror::Error;

use search_service_repository::FromDocument;
use search_service_shared::{EntityKind, OperatorRecord, SessionRecord, TicketRecord};

use super::routing::TopicRouting;

/// Session status when the event reports the session has ended.
pub const STATUS_FINISHED: &str = "finished";

/// Session status once an operator has joined.
pub const STATUS_ACTIVE: &str = "active";

/// Session status for every other event without an explicit status.
pub const STATUS_WAITING: &str = "waiting";

/// Why an inbound event was skipped instead of indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionDrop {
    #[error("payload is not a JSON object: {0}")]
    Malformed(String),

    #[error("no entity family matches topic '{topic}'")]
    UnknownFamily { topic: String },

    #[error("ticket event has no positive ticket_id")]
    MissingTicketId,

    #[error("event has no session_id")]
    MissingSessionId,

    #[error("session {session_id} has no client_id")]
    MissingClientId { session_id: String },

    #[error("event has no user_id")]
    MissingUserId,

    #[error("operator {user_id} has no display_name, region, or role")]
    MissingOperatorDetails { user_id: String },
}

/// A decoded inbound event, one variant per entity family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent {
    Ticket(TicketRecord),
    Session(SessionRecord),
    Operator(OperatorRecord),
}

impl EntityEvent {
    /// Decode the event fields for the given family.
    ///
    /// Decoding is field by field: absent, null, or mistyped fields are left
    /// empty and left to admission. Session events without a status get one
    /// inferred from the event tag.
    pub fn decode(kind: EntityKind, fields: &Map<String, Value>) -> Self {
        match kind {
            EntityKind::Ticket => Self::Ticket(TicketRecord::from_document(fields)),
            EntityKind::Session => {
                let mut session = SessionRecord::from_document(fields);
                if is_blank(&session.status) {
                    session.status = default_session_status(discriminator(fields)).to_string();
                }
                Self::Session(session)
            }
            EntityKind::Operator => Self::Operator(OperatorRecord::from_document(fields)),
        }
    }

    /// Apply the family's admission rule.
    pub fn admit(self) -> Result<Self, AdmissionDrop> {
        match &self {
            Self::Ticket(ticket) => {
                if ticket.ticket_id <= 0 {
                    return Err(AdmissionDrop::MissingTicketId);
                }
                if is_blank(&ticket.session_id) {
                    return Err(AdmissionDrop::MissingSessionId);
                }
            }
            Self::Session(session) => {
                if is_blank(&session.session_id) {
                    return Err(AdmissionDrop::MissingSessionId);
                }
                if is_blank(&session.client_id) {
                    return Err(AdmissionDrop::MissingClientId {
                        session_id: session.session_id.clone(),
                    });
                }
            }
            Self::Operator(operator) => {
                if is_blank(&operator.user_id) {
                    return Err(AdmissionDrop::MissingUserId);
                }
                if is_blank(&operator.display_name)
                    && is_blank(&operator.region)
                    && is_blank(&operator.role)
                {
                    return Err(AdmissionDrop::MissingOperatorDetails {
                        user_id: operator.user_id.clone(),
                    });
                }
            }
        }
        Ok(self)
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Ticket(_) => EntityKind::Ticket,
            Self::Session(_) => EntityKind::Session,
            Self::Operator(_) => EntityKind::Operator,
        }
    }

    /// The natural key the event will be indexed under.
    pub fn id(&self) -> String {
        match self {
            Self::Ticket(ticket) => ticket.ticket_id.to_string(),
            Self::Session(session) => session.session_id.clone(),
            Self::Operator(operator) => operator.user_id.clone(),
        }
    }
}

/// Parse a payload into a field map.
pub fn parse_payload(payload: &[u8]) -> Result<Map<String, Value>, AdmissionDrop> {
    match serde_json::from_slice::<Value>(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(AdmissionDrop::Malformed(format!(
            "expected object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(AdmissionDrop::Malformed(e.to_string())),
    }
}

/// The event type tag: `event`, falling back to `type`.
pub fn discriminator(fields: &Map<String, Value>) -> &str {
    ["event", "type"]
        .into_iter()
        .filter_map(|key| fields.get(key).and_then(Value::as_str))
        .find(|tag| !tag.trim().is_empty())
        .unwrap_or_default()
}

/// Determine the entity family of an event.
///
/// Tries the topic prefix first, then the type tag prefix, then which natural
/// key the payload carries.
pub fn classify(
    routing: &TopicRouting,
    topic: &str,
    fields: &Map<String, Value>,
) -> Option<EntityKind> {
    if let Some(kind) = routing.route(topic) {
        return Some(kind);
    }

    let tag = discriminator(fields);
    if tag.starts_with("ticket.") {
        return Some(EntityKind::Ticket);
    }
    if tag.starts_with("session.") {
        return Some(EntityKind::Session);
    }
    if tag.starts_with("operator.") {
        return Some(EntityKind::Operator);
    }

    [
        ("ticket_id", EntityKind::Ticket),
        ("session_id", EntityKind::Session),
        ("user_id", EntityKind::Operator),
    ]
    .into_iter()
    .find(|(key, _)| fields.get(*key).is_some_and(|v| !v.is_null()))
    .map(|(_, kind)| kind)
}

/// Status for a session event that carries none.
pub fn default_session_status(tag: &str) -> &'static str {
    match tag {
        "session.ended" | "session.finished" => STATUS_FINISHED,
        "operator_joined" | "session.operator_joined" => STATUS_ACTIVE,
        _ => STATUS_WAITING,
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_payload() {
        assert!(parse_payload(br#"{"event":"ticket.created"}"#).is_ok());
        assert!(matches!(
            parse_payload(b"not json"),
            Err(AdmissionDrop::Malformed(_))
        ));
        assert!(matches!(
            parse_payload(b"[1,2]"),
            Err(AdmissionDrop::Malformed(msg)) if msg.contains("array")
        ));
    }

    #[test]
    fn test_discriminator_falls_back_to_type() {
        assert_eq!(discriminator(&fields(json!({ "event": "a", "type": "b" }))), "a");
        assert_eq!(discriminator(&fields(json!({ "event": "", "type": "b" }))), "b");
        assert_eq!(discriminator(&fields(json!({ "event": 3 }))), "");
    }

    #[test]
    fn test_classify_order() {
        let routing = TopicRouting::default();
        let ticket = fields(json!({ "ticket_id": 7, "session_id": "s1" }));

        // Topic prefix wins over payload shape.
        assert_eq!(
            classify(&routing, "psds.session.events", &ticket),
            Some(EntityKind::Session)
        );
        // Ticket key beats the session key it also carries.
        assert_eq!(classify(&routing, "other", &ticket), Some(EntityKind::Ticket));

        let tagged = fields(json!({ "event": "operator.updated", "session_id": "s1" }));
        assert_eq!(classify(&routing, "other", &tagged), Some(EntityKind::Operator));

        let unknown = fields(json!({ "event": "billing.paid", "ticket_id": null }));
        assert_eq!(classify(&routing, "other", &unknown), None);
    }

    #[test]
    fn test_default_session_status() {
        assert_eq!(default_session_status("session.ended"), STATUS_FINISHED);
        assert_eq!(default_session_status("session.finished"), STATUS_FINISHED);
        assert_eq!(default_session_status("operator_joined"), STATUS_ACTIVE);
        assert_eq!(default_session_status("session.operator_joined"), STATUS_ACTIVE);
        assert_eq!(default_session_status("session.created"), STATUS_WAITING);
        assert_eq!(default_session_status(""), STATUS_WAITING);
    }

    #[test]
    fn test_explicit_session_status_is_kept() {
        let event = EntityEvent::decode(
            EntityKind::Session,
            &fields(json!({
                "event": "session.ended",
                "session_id": "s1",
                "client_id": "c1",
                "status": "archived"
            })),
        );

        match event {
            EntityEvent::Session(session) => assert_eq!(session.status, "archived"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let event = EntityEvent::decode(
            EntityKind::Operator,
            &fields(json!({ "user_id": "u1", "display_name": null, "region": "eu" })),
        );

        assert_eq!(
            event,
            EntityEvent::Operator(OperatorRecord {
                user_id: "u1".to_string(),
                region: "eu".to_string(),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_ticket_admission() {
        let decode = |value| EntityEvent::decode(EntityKind::Ticket, &fields(value));

        assert!(decode(json!({ "ticket_id": 7.0, "session_id": "s1" })).admit().is_ok());
        assert_eq!(
            decode(json!({ "ticket_id": 0, "session_id": "s1" })).admit(),
            Err(AdmissionDrop::MissingTicketId)
        );
        assert_eq!(
            decode(json!({ "ticket_id": -3, "session_id": "s1" })).admit(),
            Err(AdmissionDrop::MissingTicketId)
        );
        assert_eq!(
            decode(json!({ "ticket_id": 7, "session_id": "  " })).admit(),
            Err(AdmissionDrop::MissingSessionId)
        );
    }

    #[test]
    fn test_session_admission() {
        let decode = |value| EntityEvent::decode(EntityKind::Session, &fields(value));

        assert_eq!(
            decode(json!({ "client_id": "c1" })).admit(),
            Err(AdmissionDrop::MissingSessionId)
        );
        assert_eq!(
            decode(json!({ "session_id": "s2", "client_id": "" })).admit(),
            Err(AdmissionDrop::MissingClientId {
                session_id: "s2".to_string()
            })
        );
    }

    #[test]
    fn test_operator_admission() {
        let decode = |value| EntityEvent::decode(EntityKind::Operator, &fields(value));

        assert_eq!(
            decode(json!({ "display_name": "Ada" })).admit(),
            Err(AdmissionDrop::MissingUserId)
        );
        assert_eq!(
            decode(json!({ "user_id": "u1", "role": " " })).admit(),
            Err(AdmissionDrop::MissingOperatorDetails {
                user_id: "u1".to_string()
            })
        );
        assert!(decode(json!({ "user_id": "u1", "role": "lead" })).admit().is_ok());
    }
}
