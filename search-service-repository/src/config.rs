//! Configuration types for the SearchService.

use search_service_shared::EntityKind;

/// Names of the three collections the search service reads and writes.
///
/// Passed to `SearchService` at construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    pub tickets: String,
    pub sessions: String,
    pub operators: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            tickets: "tickets".to_string(),
            sessions: "sessions".to_string(),
            operators: "operators".to_string(),
        }
    }
}

impl CollectionNames {
    /// Create a configuration with custom collection names.
    pub fn new(
        tickets: impl Into<String>,
        sessions: impl Into<String>,
        operators: impl Into<String>,
    ) -> Self {
        Self {
            tickets: tickets.into(),
            sessions: sessions.into(),
            operators: operators.into(),
        }
    }

    /// The collection holding documents of the given entity family.
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Ticket => &self.tickets,
            EntityKind::Session => &self.sessions,
            EntityKind::Operator => &self.operators,
        }
    }
}
