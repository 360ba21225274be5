//! Regime classification — maps a trend-strength reading (e.g. ADX) to a
//! coarse market-regime tag.
//!
//! The classification is a pure function of the strength value and two
//! thresholds; no regime label is ever persisted, it is recomputed at each
//! decision point.

use crate::policy::MultiplierPair;
use serde::{Deserialize, Serialize};

/// Coarse market regime derived from a trend-strength indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// Strength at or above the trending threshold
    Trending,
    /// Strength at or below the ranging threshold
    Ranging,
    /// Between the two thresholds
    Moderate,
}

/// Thresholds for regime classification. Invariant (validated at config
/// load): `trending > ranging >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    pub trending: f64,
    pub ranging: f64,
}

impl Regime {
    /// Classify a non-negative trend-strength value.
    pub fn classify(strength: f64, thresholds: RegimeThresholds) -> Regime {
        if strength >= thresholds.trending {
            Regime::Trending
        } else if strength <= thresholds.ranging {
            Regime::Ranging
        } else {
            Regime::Moderate
        }
    }

    /// Multiplier pair for this regime.
    ///
    /// `Moderate` always resolves to the neutral pair. Routing through this
    /// table (rather than an `else` branch picking up the ranging pair)
    /// makes that a structural fact: there is no configured pair a Moderate
    /// classification could accidentally inherit.
    pub fn multipliers(self, trending: MultiplierPair, ranging: MultiplierPair) -> MultiplierPair {
        match self {
            Regime::Trending => trending,
            Regime::Ranging => ranging,
            Regime::Moderate => MultiplierPair::NEUTRAL,
        }
    }
}

/// A single-decision-point regime reading: the raw strength value and the
/// classification derived from it. Never persisted beyond the decision —
/// recomputed on demand so a stale label can never leak into a later
/// tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub strength: f64,
    pub regime: Regime,
}

impl RegimeSnapshot {
    pub fn take(strength: f64, thresholds: RegimeThresholds) -> Self {
        Self {
            strength,
            regime: Regime::classify(strength, thresholds),
        }
    }
}
