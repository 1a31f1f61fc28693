//! The three entity families served by the search service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An indexed entity family.
///
/// The string form is the plural used by the `type` filter of the combined
/// search ("tickets", "sessions", "operators").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    #[serde(rename = "tickets")]
    Ticket,
    #[serde(rename = "sessions")]
    Session,
    #[serde(rename = "operators")]
    Operator,
}

impl EntityKind {
    /// All entity families, in the order the combined search visits them.
    pub const ALL: [EntityKind; 3] = [EntityKind::Ticket, EntityKind::Session, EntityKind::Operator];

    /// Returns the plural name used in type filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Ticket => "tickets",
            EntityKind::Session => "sessions",
            EntityKind::Operator => "operators",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a type filter names no known entity family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntityKindError(pub String);

impl fmt::Display for ParseEntityKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown type '{}': must be one of tickets, sessions, operators",
            self.0
        )
    }
}

impl std::error::Error for ParseEntityKindError {}

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tickets" => Ok(EntityKind::Ticket),
            "sessions" => Ok(EntityKind::Session),
            "operators" => Ok(EntityKind::Operator),
            other => Err(ParseEntityKindError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!("tickets".parse::<EntityKind>(), Ok(EntityKind::Ticket));
        assert_eq!("sessions".parse::<EntityKind>(), Ok(EntityKind::Session));
        assert_eq!("operators".parse::<EntityKind>(), Ok(EntityKind::Operator));
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "users".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, ParseEntityKindError("users".to_string()));
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string().parse::<EntityKind>(), Ok(kind));
        }
    }
}
