//! Order-reference tracking — re-derives the live protective order for a
//! position from the authoritative order set.
//!
//! A cached order id is a weak, advisory handle: order identity changes on
//! every modification at the venue, so the cache is re-validated on every
//! use and explicitly invalidated at every mutation boundary. The
//! position id is the stable index; the collaborator's order set is the
//! arena.

use crate::domain::{OrderId, PositionId, ProtectiveOrder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OrderLookupError {
    /// The position has no active stop-tagged order. The position is
    /// unprotected; callers must surface this, never swallow it.
    #[error("no active stop order for position {0}")]
    NoActiveStopOrder(PositionId),

    /// More than one simultaneously-active stop order matched. Violates
    /// the one-active-stop invariant; callers must not guess which order
    /// is canonical.
    #[error("ambiguous stop orders for position {position_id}: {order_ids:?}")]
    AmbiguousStopOrder {
        position_id: PositionId,
        order_ids: Vec<OrderId>,
    },
}

/// Advisory handle to a position's live stop order.
///
/// Never trusted across a decision boundary: [`resolve_active_stop`]
/// re-validates it against the authoritative order set, and the trailing
/// state machine invalidates it immediately after every modify request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRef {
    id: Option<OrderId>,
}

impl OrderRef {
    pub fn unknown() -> Self {
        Self { id: None }
    }

    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn is_unknown(&self) -> bool {
        self.id.is_none()
    }

    /// Mark the handle unknown. Called after every modify request and on
    /// observing a terminal status for the referenced order.
    pub fn invalidate(&mut self) {
        self.id = None;
    }

    fn set(&mut self, id: OrderId) {
        self.id = Some(id);
    }
}

/// Resolve the live protective stop for `position_id` against the
/// authoritative order set.
///
/// The cached handle is used only as a fast path: the referenced order
/// must still exist, be active, and carry this position's stop tag. Any
/// failed check discards the cache and falls back to a full scan filtered
/// to the stop-tag and active-status predicate. Venue order ids are
/// monotonically increasing, so the newest matching order is the one with
/// the greatest id; if more than one match is simultaneously active the
/// invariant is already broken and the resolution fails rather than
/// guessing.
///
/// On success the cache is updated to the resolved id.
pub fn resolve_active_stop(
    cache: &mut OrderRef,
    position_id: &PositionId,
    orders: &[ProtectiveOrder],
) -> Result<ProtectiveOrder, OrderLookupError> {
    if let Some(id) = cache.id() {
        if let Some(order) = orders.iter().find(|o| o.id == id) {
            if order.is_active() && order.is_stop_for(position_id) {
                return Ok(order.clone());
            }
        }
        cache.invalidate();
    }

    let matches: Vec<&ProtectiveOrder> = orders
        .iter()
        .filter(|o| o.is_active() && o.is_stop_for(position_id))
        .collect();

    match matches.as_slice() {
        [] => Err(OrderLookupError::NoActiveStopOrder(position_id.clone())),
        [order] => {
            cache.set(order.id);
            Ok((*order).clone())
        }
        _ => {
            let mut order_ids: Vec<OrderId> = matches.iter().map(|o| o.id).collect();
            order_ids.sort();
            Err(OrderLookupError::AmbiguousStopOrder {
                position_id: position_id.clone(),
                order_ids,
            })
        }
    }
}
