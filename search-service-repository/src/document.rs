//! Serialization of typed records into store documents.
//!
//! Every declared field is written on each index call so a re-index replaces
//! the previous document in full.

use serde_json::{json, Map, Value};

use search_service_shared::{EntityKind, OperatorRecord, SessionRecord, TicketRecord};

/// A record that can be written to the store under its natural key.
pub trait IndexDocument {
    /// The entity family, which selects the target collection.
    const KIND: EntityKind;

    /// The natural key used as the document id.
    fn document_id(&self) -> String;

    /// All declared fields as a store document.
    fn to_document(&self) -> Map<String, Value>;
}

/// Build a document map from `(field, value)` pairs.
fn document(fields: impl IntoIterator<Item = (&'static str, Value)>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}

impl IndexDocument for TicketRecord {
    const KIND: EntityKind = EntityKind::Ticket;

    fn document_id(&self) -> String {
        self.ticket_id.to_string()
    }

    fn to_document(&self) -> Map<String, Value> {
        document([
            ("ticket_id", json!(self.ticket_id)),
            ("session_id", json!(self.session_id)),
            ("client_id", json!(self.client_id)),
            ("operator_id", json!(self.operator_id)),
            ("subject", json!(self.subject)),
            ("notes", json!(self.notes)),
            ("status", json!(self.status)),
        ])
    }
}

impl IndexDocument for SessionRecord {
    const KIND: EntityKind = EntityKind::Session;

    fn document_id(&self) -> String {
        self.session_id.clone()
    }

    fn to_document(&self) -> Map<String, Value> {
        document([
            ("session_id", json!(self.session_id)),
            ("client_id", json!(self.client_id)),
            ("pin", json!(self.pin)),
            ("status", json!(self.status)),
        ])
    }
}

impl IndexDocument for OperatorRecord {
    const KIND: EntityKind = EntityKind::Operator;

    fn document_id(&self) -> String {
        self.user_id.clone()
    }

    fn to_document(&self) -> Map<String, Value> {
        document([
            ("user_id", json!(self.user_id)),
            ("display_name", json!(self.display_name)),
            ("region", json!(self.region)),
            ("role", json!(self.role)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_document() {
        let ticket = TicketRecord {
            ticket_id: 42,
            session_id: "s1".to_string(),
            subject: "Card declined".to_string(),
            ..Default::default()
        };

        assert_eq!(ticket.document_id(), "42");

        let doc = ticket.to_document();
        assert_eq!(doc.len(), 7);
        assert_eq!(doc["ticket_id"], 42);
        assert_eq!(doc["subject"], "Card declined");
        // Empty fields are still written so re-indexing overwrites them.
        assert_eq!(doc["notes"], "");
    }

    #[test]
    fn test_session_document() {
        let session = SessionRecord {
            session_id: "s1".to_string(),
            client_id: "c1".to_string(),
            pin: "0042".to_string(),
            status: "active".to_string(),
        };

        assert_eq!(session.document_id(), "s1");
        let doc = session.to_document();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc["pin"], "0042");
    }

    #[test]
    fn test_operator_document() {
        let operator = OperatorRecord {
            user_id: "u1".to_string(),
            region: "eu".to_string(),
            ..Default::default()
        };

        assert_eq!(operator.document_id(), "u1");
        assert_eq!(OperatorRecord::KIND, EntityKind::Operator);
        assert_eq!(operator.to_document()["region"], "eu");
    }
}
