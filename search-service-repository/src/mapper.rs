//! Result mapper: decodes loosely typed store documents into typed records.
//!
//! Each attribute is extracted on its own. An absent or mistyped field leaves
//! that attribute at its zero value; it never fails the record or the page.

use serde_json::{Map, Value};

use search_service_shared::{OperatorRecord, SessionRecord, TicketRecord};

/// A record that can be decoded from a store document.
pub trait FromDocument: Sized {
    fn from_document(source: &Map<String, Value>) -> Self;
}

/// Read a string field, or an empty string when absent or not a string.
pub fn string_field(source: &Map<String, Value>, field: &str) -> String {
    source
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Read an integer field, or zero when absent or not numeric.
///
/// The store may hand integers back as floating point; integral floats are
/// accepted, fractional ones are not.
pub fn i64_field(source: &Map<String, Value>, field: &str) -> i64 {
    match source.get(field) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
            .unwrap_or_default(),
        _ => 0,
    }
}

impl FromDocument for TicketRecord {
    fn from_document(source: &Map<String, Value>) -> Self {
        Self {
            ticket_id: i64_field(source, "ticket_id"),
            session_id: string_field(source, "session_id"),
            client_id: string_field(source, "client_id"),
            operator_id: string_field(source, "operator_id"),
            subject: string_field(source, "subject"),
            notes: string_field(source, "notes"),
            status: string_field(source, "status"),
        }
    }
}

impl FromDocument for SessionRecord {
    fn from_document(source: &Map<String, Value>) -> Self {
        Self {
            session_id: string_field(source, "session_id"),
            client_id: string_field(source, "client_id"),
            pin: string_field(source, "pin"),
            status: string_field(source, "status"),
        }
    }
}

impl FromDocument for OperatorRecord {
    fn from_document(source: &Map<String, Value>) -> Self {
        Self {
            user_id: string_field(source, "user_id"),
            display_name: string_field(source, "display_name"),
            region: string_field(source, "region"),
            role: string_field(source, "role"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::IndexDocument;
    use serde_json::json;

    fn source(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ticket_id_accepts_float() {
        let doc = source(json!({ "ticket_id": 7.0, "session_id": "s1" }));
        let ticket = TicketRecord::from_document(&doc);

        assert_eq!(ticket.ticket_id, 7);
        assert_eq!(ticket.session_id, "s1");
    }

    #[test]
    fn test_fractional_ticket_id_is_zero() {
        let doc = source(json!({ "ticket_id": 7.5 }));
        assert_eq!(TicketRecord::from_document(&doc).ticket_id, 0);
    }

    #[test]
    fn test_missing_fields_are_zero_values() {
        let doc = source(json!({ "session_id": "s1" }));
        let session = SessionRecord::from_document(&doc);

        assert_eq!(session.session_id, "s1");
        assert_eq!(session.client_id, "");
        assert_eq!(session.pin, "");
        assert_eq!(session.status, "");
    }

    #[test]
    fn test_mistyped_fields_are_zero_values() {
        let doc = source(json!({
            "ticket_id": "seven",
            "session_id": 12,
            "subject": ["not", "a", "string"],
            "status": "open"
        }));
        let ticket = TicketRecord::from_document(&doc);

        assert_eq!(ticket.ticket_id, 0);
        assert_eq!(ticket.session_id, "");
        assert_eq!(ticket.subject, "");
        assert_eq!(ticket.status, "open");
    }

    #[test]
    fn test_empty_document() {
        let operator = OperatorRecord::from_document(&Map::new());
        assert_eq!(operator, OperatorRecord::default());
    }

    #[test]
    fn test_document_round_trip() {
        let operator = OperatorRecord {
            user_id: "u1".to_string(),
            display_name: "Ada".to_string(),
            region: "eu".to_string(),
            role: "lead".to_string(),
        };

        assert_eq!(OperatorRecord::from_document(&operator.to_document()), operator);
    }
}
