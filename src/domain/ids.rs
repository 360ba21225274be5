use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque position identifier, owned by the execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

impl PositionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PositionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Venue-assigned order identifier.
///
/// Identifiers are monotonically increasing at the venue: a higher id means
/// a more recently created order. `Ord` is derived so callers can use the
/// ordering as the recency tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_ordering_is_numeric() {
        assert!(OrderId(2) > OrderId(1));
        assert!(OrderId(100) > OrderId(99));
    }

    #[test]
    fn position_id_display() {
        let id = PositionId::new("EURUSD-001");
        assert_eq!(id.to_string(), "EURUSD-001");
    }
}
