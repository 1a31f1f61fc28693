//! Topic-prefix routing of inbound events to entity families.

use search_service_shared::EntityKind;

/// Default topic prefix for ticket events.
pub const DEFAULT_TICKET_PREFIX: &str = "psds.ticket.";

/// Default topic prefix for session events.
pub const DEFAULT_SESSION_PREFIX: &str = "psds.session.";

/// Default topic prefix for operator events.
pub const DEFAULT_OPERATOR_PREFIX: &str = "psds.operator.";

/// Maps topic prefixes to entity families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRouting {
    pub ticket_prefix: String,
    pub session_prefix: String,
    pub operator_prefix: String,
}

impl Default for TopicRouting {
    fn default() -> Self {
        Self {
            ticket_prefix: DEFAULT_TICKET_PREFIX.to_string(),
            session_prefix: DEFAULT_SESSION_PREFIX.to_string(),
            operator_prefix: DEFAULT_OPERATOR_PREFIX.to_string(),
        }
    }
}

impl TopicRouting {
    pub fn new(
        ticket_prefix: impl Into<String>,
        session_prefix: impl Into<String>,
        operator_prefix: impl Into<String>,
    ) -> Self {
        Self {
            ticket_prefix: ticket_prefix.into(),
            session_prefix: session_prefix.into(),
            operator_prefix: operator_prefix.into(),
        }
    }

    /// The entity family whose prefix matches `topic`, if any.
    ///
    /// An empty prefix never matches.
    pub fn route(&self, topic: &str) -> Option<EntityKind> {
        [
            (&self.ticket_prefix, EntityKind::Ticket),
            (&self.session_prefix, EntityKind::Session),
            (&self.operator_prefix, EntityKind::Operator),
        ]
        .into_iter()
        .find(|(prefix, _)| !prefix.is_empty() && topic.starts_with(prefix.as_str()))
        .map(|(_, kind)| kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routing() {
        let routing = TopicRouting::default();

        assert_eq!(routing.route("psds.ticket.events"), Some(EntityKind::Ticket));
        assert_eq!(routing.route("psds.session.ended"), Some(EntityKind::Session));
        assert_eq!(
            routing.route("psds.operator.updated"),
            Some(EntityKind::Operator)
        );
        assert_eq!(routing.route("psds.billing.events"), None);
        assert_eq!(routing.route(""), None);
    }

    #[test]
    fn test_empty_prefix_never_matches() {
        let routing = TopicRouting::new("", "sessions.", "");

        assert_eq!(routing.route("anything"), None);
        assert_eq!(routing.route("sessions.created"), Some(EntityKind::Session));
    }
}
