//! Trailing-stop state machine.
//!
//! Per position: `Unarmed → Armed → (Updating ⇄ Armed)`; the state is
//! dropped on position close. Arming fires when unrealized profit in pips
//! reaches the activation threshold. Once armed, each tick computes a
//! candidate trigger from the current price and the effective trailing
//! distance, and requests a modification only when the candidate strictly
//! tightens the last known stop — stops may tighten, never loosen.
//!
//! A modify request is assumed to produce a new order identity at the
//! venue, so the cached order handle is set to unknown the moment the
//! request is committed; re-resolution happens lazily on the next armed
//! tick.

use crate::domain::{OrderId, PipDefinition, Position, PositionId, Side};
use crate::domain::ProtectiveOrder;
use crate::tracker::{resolve_active_stop, OrderLookupError, OrderRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Guard against float noise in arming and strict-improvement
/// comparisons; one nano-unit of price, far below any pip size.
const PRICE_EPS: f64 = 1e-9;

/// Trailing-stop configuration for one strategy context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingConfig {
    /// Unrealized profit, in pips, at which trailing arms.
    pub activation_threshold_pips: f64,
    /// Base trailing distance, in pips, fed into the adaptive policy.
    pub trailing_distance_pips: f64,
}

/// Decision produced by one tick of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum TickAction {
    /// Nothing to do: not yet armed, or the candidate does not strictly
    /// tighten the stop.
    Hold,
    /// Request a trigger-price modification against the resolved live
    /// order. The caller issues the request and then calls
    /// [`TrailingState::commit_modify`].
    Modify {
        order_id: OrderId,
        new_trigger_price: f64,
    },
}

/// Per-position trailing state, owned exclusively by this state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingState {
    position_id: PositionId,
    symbol: String,
    side: Side,
    entry_price_snapshot: f64,
    armed: bool,
    last_known_stop_price: Option<f64>,
    /// Advisory handle to the live stop; never trusted across a decision
    /// boundary.
    cached_order: OrderRef,
}

impl TrailingState {
    /// Create state for a newly opened (or first observed) position.
    pub fn new(position: &Position) -> Self {
        Self {
            position_id: position.id.clone(),
            symbol: position.symbol.clone(),
            side: position.side,
            entry_price_snapshot: position.entry_price,
            armed: false,
            last_known_stop_price: None,
            cached_order: OrderRef::unknown(),
        }
    }

    pub fn position_id(&self) -> &PositionId {
        &self.position_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn last_known_stop_price(&self) -> Option<f64> {
        self.last_known_stop_price
    }

    pub fn cached_order(&self) -> &OrderRef {
        &self.cached_order
    }

    /// Early cache invalidation: a terminal status was observed for the
    /// order this state currently points at. Purely an optimization over
    /// the lazy re-validation the next tick performs anyway.
    pub fn note_order_terminal(&mut self, order_id: OrderId) {
        if self.cached_order.id() == Some(order_id) {
            self.cached_order.invalidate();
        }
    }

    /// Evaluate one market-data tick.
    ///
    /// `effective_trail_pips` is the policy-scaled trailing distance for
    /// this tick. Errors are order-identity failures from resolution and
    /// must be escalated by the caller; no modification is requested on an
    /// error tick.
    pub fn on_tick(
        &mut self,
        config: &TrailingConfig,
        pip: &PipDefinition,
        current_price: f64,
        effective_trail_pips: f64,
        orders: &[ProtectiveOrder],
    ) -> Result<TickAction, OrderLookupError> {
        if !self.armed {
            let profit_delta = (current_price - self.entry_price_snapshot) * self.side.sign();
            let profit_pips = pip.price_delta_to_pips(profit_delta);
            if profit_pips + PRICE_EPS < config.activation_threshold_pips {
                return Ok(TickAction::Hold);
            }

            // Arm: last_known_stop_price is initialized from the live
            // order's trigger so the first tightening comparison is
            // meaningful. A failed resolution leaves the state unarmed.
            let stop = resolve_active_stop(&mut self.cached_order, &self.position_id, orders)?;
            self.last_known_stop_price = Some(stop.trigger_price);
            self.armed = true;
            debug!(
                position = %self.position_id,
                profit_pips,
                initial_stop = stop.trigger_price,
                "trailing armed"
            );
            // The arming tick continues into candidate evaluation below.
        }

        let Some(last_stop) = self.last_known_stop_price else {
            return Ok(TickAction::Hold);
        };

        let distance = pip.pips_to_price_delta(effective_trail_pips);
        let raw_candidate = match self.side {
            Side::Long => current_price - distance,
            Side::Short => current_price + distance,
        };
        let candidate = pip.round_to_precision(raw_candidate);

        let improves = match self.side {
            Side::Long => candidate > last_stop + PRICE_EPS,
            Side::Short => candidate < last_stop - PRICE_EPS,
        };
        if !improves {
            return Ok(TickAction::Hold);
        }

        // Re-validate just before requesting: the position may have closed
        // or the order filled between signal computation and submission.
        let stop = resolve_active_stop(&mut self.cached_order, &self.position_id, orders)?;
        Ok(TickAction::Modify {
            order_id: stop.id,
            new_trigger_price: candidate,
        })
    }

    /// Record that a modification was issued for this position.
    ///
    /// Updates `last_known_stop_price` and immediately sets the cached
    /// order handle to unknown: the old identity must never be reused on
    /// the next tick.
    pub fn commit_modify(&mut self, new_trigger_price: f64) {
        self.last_known_stop_price = Some(new_trigger_price);
        self.cached_order.invalidate();
        debug!(
            position = %self.position_id,
            new_trigger_price,
            "stop modification committed, order handle invalidated"
        );
    }
}
