//! Lifecycle manager — owns per-position trailing state and reacts to the
//! collaborator's notifications.
//!
//! Single-threaded and event-driven: notifications arrive in strict order
//! and each is processed to completion before the next. Order
//! modifications are fire-and-forget; confirmation arrives later as an
//! order-status notification, which is why the cached order handle is
//! treated as unknown immediately after each request rather than
//! optimistically updated.

use crate::config::Config;
use crate::domain::{OrderId, Position, PositionId, ProtectiveOrder};
use crate::policy::{self, PolicyError, StopDistances};
use crate::tracker::OrderLookupError;
use crate::trailing::{TickAction, TrailingState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Synchronous interface to the execution/backtesting collaborator.
///
/// `query_orders` is authoritative: it reflects every order ever created
/// for the position, terminal ones included, each with its current
/// status. `modify_order` is fire-and-forget; its outcome is observed
/// later through order-status notifications.
pub trait ExecutionContext {
    fn query_orders(&self, position_id: &PositionId) -> Vec<ProtectiveOrder>;
    fn modify_order(&mut self, order_id: OrderId, new_trigger_price: f64);
    fn current_price(&self, symbol: &str) -> f64;
    fn position_snapshot(&self, position_id: &PositionId) -> Option<Position>;
    fn volatility_measure(&self, symbol: &str, timestamp: DateTime<Utc>) -> Option<f64>;
    fn trend_strength(&self, symbol: &str, timestamp: DateTime<Utc>) -> Option<f64>;
}

/// Escalation emitted to the host's risk-visibility surface.
///
/// These are values, not callbacks: the host decides whether to page,
/// flatten, or reconcile. None of them is retried blindly by this
/// subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskAlert {
    /// No active stop-tagged order exists for an open position. Either a
    /// race with a fill/cancel or an upstream configuration defect; the
    /// position is currently unprotected.
    UnprotectedPosition {
        position_id: PositionId,
        timestamp: DateTime<Utc>,
    },
    /// More than one simultaneously-active stop order matched. The
    /// one-active-stop invariant is broken; no modification was attempted.
    AmbiguousProtection {
        position_id: PositionId,
        order_ids: Vec<OrderId>,
        timestamp: DateTime<Utc>,
    },
    /// The pricing pipeline could not produce distances this tick (e.g.
    /// ATR-scaled mode with no volatility reading). The decision was
    /// skipped; trailing resumes on the next tick.
    PolicyUnavailable {
        position_id: PositionId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl RiskAlert {
    fn from_lookup(err: OrderLookupError, timestamp: DateTime<Utc>) -> Self {
        match err {
            OrderLookupError::NoActiveStopOrder(position_id) => {
                RiskAlert::UnprotectedPosition { position_id, timestamp }
            }
            OrderLookupError::AmbiguousStopOrder { position_id, order_ids } => {
                RiskAlert::AmbiguousProtection { position_id, order_ids, timestamp }
            }
        }
    }
}

/// Protective-order lifecycle manager for one instrument/strategy
/// context.
pub struct StopLifecycleManager {
    config: Config,
    states: HashMap<PositionId, TrailingState>,
}

impl StopLifecycleManager {
    /// `config` must already be validated (the TOML loaders do this).
    pub fn new(config: Config) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Trailing state for a tracked position, if any.
    pub fn state(&self, position_id: &PositionId) -> Option<&TrailingState> {
        self.states.get(position_id)
    }

    pub fn tracked_positions(&self) -> usize {
        self.states.len()
    }

    /// Position opened (or first observed): create its trailing state.
    /// Re-observing a tracked position is a no-op; trailing progress is
    /// never reset by duplicate notifications.
    pub fn on_position_opened(&mut self, position: &Position) {
        self.states
            .entry(position.id.clone())
            .or_insert_with(|| TrailingState::new(position));
    }

    /// Primary trailing-evaluation entry point, invoked per closed bar.
    ///
    /// Returns the risk alerts raised this tick. Order-identity failures
    /// are escalated and skip modification; pricing failures skip the
    /// single decision and trailing continues next bar.
    pub fn on_bar_closed(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        symbol: &str,
        timestamp: DateTime<Utc>,
        price: f64,
    ) -> Vec<RiskAlert> {
        let mut alerts = Vec::new();

        let position_ids: Vec<PositionId> = self
            .states
            .values()
            .filter(|s| s.symbol() == symbol)
            .map(|s| s.position_id().clone())
            .collect();

        for position_id in position_ids {
            // A missing snapshot means the position closed under us; the
            // position-closed notification will dispose the state.
            if ctx.position_snapshot(&position_id).is_none() {
                debug!(position = %position_id, "no position snapshot, skipping tick");
                continue;
            }

            let distances = match self.effective_distances(ctx, symbol, timestamp) {
                Ok(d) => d,
                Err(err) => {
                    warn!(position = %position_id, %err, "pricing unavailable, skipping tick");
                    alerts.push(RiskAlert::PolicyUnavailable {
                        position_id: position_id.clone(),
                        reason: err.to_string(),
                        timestamp,
                    });
                    continue;
                }
            };

            let orders = ctx.query_orders(&position_id);
            let Some(state) = self.states.get_mut(&position_id) else {
                continue;
            };

            match state.on_tick(
                &self.config.trailing,
                &self.config.pip,
                price,
                distances.sl_pips,
                &orders,
            ) {
                Ok(TickAction::Hold) => {}
                Ok(TickAction::Modify { order_id, new_trigger_price }) => {
                    ctx.modify_order(order_id, new_trigger_price);
                    state.commit_modify(new_trigger_price);
                }
                Err(err) => {
                    warn!(position = %position_id, %err, "stop resolution failed");
                    alerts.push(RiskAlert::from_lookup(err, timestamp));
                }
            }
        }

        alerts
    }

    /// Order-status notification. Used only to invalidate cached handles
    /// early when a tracked order goes terminal — an optimization over
    /// the lazy re-validation every tick performs anyway. A `Rejected`
    /// status for a modification lands here too: the handle is dropped
    /// and the next tick re-derives the live order instead of assuming
    /// the requested trigger holds.
    pub fn on_order_event(&mut self, order: &ProtectiveOrder) {
        if !order.is_terminal() {
            return;
        }
        for state in self.states.values_mut() {
            state.note_order_terminal(order.id);
        }
    }

    /// Position closed or flattened: dispose its trailing state.
    pub fn on_position_closed(&mut self, position_id: &PositionId) {
        if self.states.remove(position_id).is_some() {
            debug!(position = %position_id, "trailing state disposed");
        }
    }

    /// Effective trailing distances for this tick: the configured
    /// trailing distance run through the adaptive pipeline.
    fn effective_distances(
        &self,
        ctx: &dyn ExecutionContext,
        symbol: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<StopDistances, PolicyError> {
        policy::evaluate(
            &self.config.policy,
            self.config.trailing.trailing_distance_pips,
            self.config.base.tp_pips,
            ctx.volatility_measure(symbol, timestamp),
            ctx.trend_strength(symbol, timestamp),
            timestamp,
        )
    }

    /// Stop/target distances for initial bracket pricing, run through the
    /// same pipeline with the configured base values. Exposed for the
    /// collaborator that places the entry bracket.
    pub fn entry_distances(
        &self,
        ctx: &dyn ExecutionContext,
        symbol: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<StopDistances, PolicyError> {
        policy::evaluate(
            &self.config.policy,
            self.config.base.sl_pips,
            self.config.base.tp_pips,
            ctx.volatility_measure(symbol, timestamp),
            ctx.trend_strength(symbol, timestamp),
            timestamp,
        )
    }
}
