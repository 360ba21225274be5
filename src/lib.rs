//! trailguard — protective-order lifecycle management.
//!
//! This crate tracks each open position's stop-loss order, recomputes its
//! trigger as the market and market regime evolve, and safely replaces
//! the live order without ever operating on a stale or terminal order
//! handle:
//! - Domain types (ids, sides, protective orders, position snapshots,
//!   pip/price utility)
//! - Adaptive stop policy (fixed or ATR base, regime scaling,
//!   time-of-day scaling)
//! - Order-reference tracker with weak, re-validated handles
//! - Trailing-stop state machine with a strict tighten-only rule
//! - Lifecycle manager reacting to bar/order/position notifications

pub mod config;
pub mod domain;
pub mod manager;
pub mod policy;
pub mod tracker;
pub mod trailing;

pub use config::{Config, ConfigError};
pub use manager::{ExecutionContext, RiskAlert, StopLifecycleManager};
pub use tracker::{OrderLookupError, OrderRef};
pub use trailing::{TickAction, TrailingConfig, TrailingState};
