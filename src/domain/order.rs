use crate::domain::{OrderId, PositionId, Side};
use serde::{Deserialize, Serialize};

/// Suffix appended to a position's id to tag its protective stop order.
const STOP_TAG_SUFFIX: &str = "-SL";

/// Derive the tag that marks an order as the stop order belonging to
/// `position_id`. The venue echoes tags back unchanged, so the tag is the
/// only durable link between a position and its stop across modifications.
pub fn stop_tag(position_id: &PositionId) -> String {
    format!("{position_id}{STOP_TAG_SUFFIX}")
}

/// Protective-order lifecycle status as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Submission requested, not yet on the wire
    PendingSubmit,
    /// On the wire, not yet acknowledged
    Submitted,
    /// Working at the venue
    Accepted,
    /// Some quantity filled, remainder still working
    PartiallyFilled,
    /// Fully filled
    Filled,
    /// Canceled by user or system
    Canceled,
    /// Venue declined the order
    Rejected,
    /// Time-based expiry
    Expired,
}

impl OrderStatus {
    /// Active statuses are the only ones eligible for modification.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OrderStatus::PendingSubmit
                | OrderStatus::Submitted
                | OrderStatus::Accepted
                | OrderStatus::PartiallyFilled
        )
    }

    /// Terminal orders must never be targeted for modification.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

/// The live stop order protecting a position.
///
/// The id changes on every modification — the venue cancels and replaces
/// under the hood — so no holder of a `ProtectiveOrder` may assume the id
/// is still live after any mutation has been requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectiveOrder {
    pub id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub trigger_price: f64,
    pub status: OrderStatus,
    /// Venue tags; contains `stop_tag(position_id)` when this order is a
    /// position's protective stop.
    pub tags: Vec<String>,
}

impl ProtectiveOrder {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when this order carries the stop tag for `position_id`.
    /// Status is deliberately not checked here; callers combine this with
    /// `is_active` so the two predicates stay independently testable.
    pub fn is_stop_for(&self, position_id: &PositionId) -> bool {
        let tag = stop_tag(position_id);
        self.tags.iter().any(|t| *t == tag)
    }
}
