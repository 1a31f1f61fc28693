//! Typed records for the three indexed entity families.
//!
//! Each record is both the input of an index operation and the decoded form of a
//! search hit. Every field defaults to its zero value so a partially populated
//! document still yields a usable record.

use serde::{Deserialize, Serialize};

/// A support ticket.
///
/// The natural key is `ticket_id`, a positive integer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TicketRecord {
    pub ticket_id: i64,
    pub session_id: String,
    pub client_id: String,
    pub operator_id: String,
    /// Free-text subject line.
    pub subject: String,
    /// Free-text operator notes.
    pub notes: String,
    pub status: String,
}

/// A client support session.
///
/// The natural key is `session_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionRecord {
    pub session_id: String,
    pub client_id: String,
    pub pin: String,
    pub status: String,
}

/// An operator profile.
///
/// The natural key is `user_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OperatorRecord {
    pub user_id: String,
    pub display_name: String,
    pub region: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_zero_values() {
        let ticket: TicketRecord =
            serde_json::from_str(r#"{"ticket_id": 7, "session_id": "s1"}"#).unwrap();

        assert_eq!(ticket.ticket_id, 7);
        assert_eq!(ticket.session_id, "s1");
        assert!(ticket.subject.is_empty());
        assert!(ticket.status.is_empty());
    }

    #[test]
    fn test_operator_serializes_all_fields() {
        let operator = OperatorRecord {
            user_id: "u1".to_string(),
            display_name: "Ada".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&operator).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["display_name"], "Ada");
        assert_eq!(json["region"], "");
        assert_eq!(json["role"], "");
    }
}
