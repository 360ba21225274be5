//! Adaptive stop policy — computes effective stop-loss and take-profit
//! distances for a position, in pips.
//!
//! The policy is an ordered pipeline; each stage multiplies the previous
//! stage's output:
//!
//! 1. Base — fixed pip values, or ATR-scaled when so configured
//! 2. Regime scaling — multiplier pair selected by [`Regime`]
//! 3. Time-of-day scaling — multiplier pair selected by [`TimeBucket`]
//!
//! Output distances are clamped to a configured floor before conversion
//! to prices. The regime and session stages are independently
//! toggle-able; a disabled stage applies the identity multiplier.

pub mod regime;
pub mod time_bucket;

pub use regime::{Regime, RegimeSnapshot, RegimeThresholds};
pub use time_bucket::{SessionWindow, TimeBucket};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("volatility reading unavailable while base mode is atr-scaled")]
    MissingVolatility,
}

/// A stop-loss/take-profit multiplier pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierPair {
    pub sl: f64,
    pub tp: f64,
}

impl MultiplierPair {
    /// Identity multipliers: the pair applied by disabled stages and by
    /// the `Moderate` regime.
    pub const NEUTRAL: MultiplierPair = MultiplierPair { sl: 1.0, tp: 1.0 };
}

/// Effective distances produced by the pipeline, in pips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopDistances {
    pub sl_pips: f64,
    pub tp_pips: f64,
}

/// How the base stage derives its distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum BaseMode {
    /// Use the caller-supplied base pip values unchanged.
    Fixed,
    /// Scale the current ATR reading (in pips) by per-leg multipliers,
    /// ignoring the caller-supplied base values.
    AtrScaled { sl_multiplier: f64, tp_multiplier: f64 },
}

/// Regime-scaling stage configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeScaling {
    pub enabled: bool,
    pub thresholds: RegimeThresholds,
    pub trending: MultiplierPair,
    pub ranging: MultiplierPair,
}

/// One configured session bucket: its UTC window and multiplier pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionBucket {
    pub window: SessionWindow,
    pub multipliers: MultiplierPair,
}

/// Time-of-day scaling stage configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionScaling {
    pub enabled: bool,
    pub session_a: SessionBucket,
    pub session_b: SessionBucket,
    pub other: MultiplierPair,
}

/// Full pricing-pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopPolicyConfig {
    pub base: BaseMode,
    pub regime: RegimeScaling,
    pub session: SessionScaling,
    /// Floor for both output distances, in pips. Never zero or negative.
    pub min_distance_pips: f64,
}

impl SessionScaling {
    fn pair_for(&self, bucket: TimeBucket) -> MultiplierPair {
        match bucket {
            TimeBucket::SessionA => self.session_a.multipliers,
            TimeBucket::SessionB => self.session_b.multipliers,
            TimeBucket::Other => self.other,
        }
    }
}

/// Run the pipeline with an already-classified regime and bucket.
pub fn compute_distances(
    config: &StopPolicyConfig,
    base_sl_pips: f64,
    base_tp_pips: f64,
    volatility_pips: Option<f64>,
    regime: Regime,
    bucket: TimeBucket,
) -> Result<StopDistances, PolicyError> {
    // Stage 1: base
    let (mut sl, mut tp) = match config.base {
        BaseMode::Fixed => (base_sl_pips, base_tp_pips),
        BaseMode::AtrScaled { sl_multiplier, tp_multiplier } => {
            let atr = volatility_pips.ok_or(PolicyError::MissingVolatility)?;
            (atr * sl_multiplier, atr * tp_multiplier)
        }
    };

    // Stage 2: regime scaling
    if config.regime.enabled {
        let pair = regime.multipliers(config.regime.trending, config.regime.ranging);
        sl *= pair.sl;
        tp *= pair.tp;
    }

    // Stage 3: time-of-day scaling
    if config.session.enabled {
        let pair = config.session.pair_for(bucket);
        sl *= pair.sl;
        tp *= pair.tp;
    }

    Ok(StopDistances {
        sl_pips: sl.max(config.min_distance_pips),
        tp_pips: tp.max(config.min_distance_pips),
    })
}

/// Classify regime and session bucket from raw readings, then run the
/// pipeline.
///
/// A missing trend-strength reading while regime scaling is enabled
/// degrades to neutral multipliers: unlike a missing ATR in atr-scaled
/// mode, the stage has a well-defined identity fallback.
pub fn evaluate(
    config: &StopPolicyConfig,
    base_sl_pips: f64,
    base_tp_pips: f64,
    volatility_pips: Option<f64>,
    trend_strength: Option<f64>,
    timestamp: DateTime<Utc>,
) -> Result<StopDistances, PolicyError> {
    let regime = if config.regime.enabled {
        match trend_strength {
            Some(strength) => RegimeSnapshot::take(strength, config.regime.thresholds).regime,
            None => {
                tracing::debug!("trend strength unavailable, using neutral regime multipliers");
                Regime::Moderate
            }
        }
    } else {
        Regime::Moderate
    };

    let bucket = TimeBucket::classify(
        timestamp,
        config.session.session_a.window,
        config.session.session_b.window,
    );

    compute_distances(config, base_sl_pips, base_tp_pips, volatility_pips, regime, bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> StopPolicyConfig {
        StopPolicyConfig {
            base: BaseMode::Fixed,
            regime: RegimeScaling {
                enabled: true,
                thresholds: RegimeThresholds { trending: 25.0, ranging: 20.0 },
                trending: MultiplierPair { sl: 1.5, tp: 2.0 },
                ranging: MultiplierPair { sl: 0.8, tp: 0.7 },
            },
            session: SessionScaling {
                enabled: true,
                session_a: SessionBucket {
                    window: SessionWindow { start_hour: 7, end_hour: 12 },
                    multipliers: MultiplierPair { sl: 1.2, tp: 1.2 },
                },
                session_b: SessionBucket {
                    window: SessionWindow { start_hour: 12, end_hour: 17 },
                    multipliers: MultiplierPair { sl: 1.0, tp: 1.1 },
                },
                other: MultiplierPair { sl: 0.9, tp: 0.9 },
            },
            min_distance_pips: 5.0,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2024-03-15T{hour:02}:00:00Z"))
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn fixed_base_passthrough_when_stages_disabled() {
        let mut config = base_config();
        config.regime.enabled = false;
        config.session.enabled = false;

        let d = compute_distances(&config, 30.0, 60.0, None, Regime::Trending, TimeBucket::SessionA)
            .unwrap();
        assert_eq!(d.sl_pips, 30.0);
        assert_eq!(d.tp_pips, 60.0);
    }

    #[test]
    fn atr_base_overrides_fixed_values() {
        let mut config = base_config();
        config.regime.enabled = false;
        config.session.enabled = false;
        config.base = BaseMode::AtrScaled { sl_multiplier: 2.0, tp_multiplier: 3.0 };

        let d = compute_distances(&config, 30.0, 60.0, Some(12.0), Regime::Moderate, TimeBucket::Other)
            .unwrap();
        assert_eq!(d.sl_pips, 24.0);
        assert_eq!(d.tp_pips, 36.0);
    }

    #[test]
    fn atr_base_without_reading_is_an_error() {
        let mut config = base_config();
        config.base = BaseMode::AtrScaled { sl_multiplier: 2.0, tp_multiplier: 3.0 };

        let err = compute_distances(&config, 30.0, 60.0, None, Regime::Moderate, TimeBucket::Other)
            .unwrap_err();
        assert_eq!(err, PolicyError::MissingVolatility);
    }

    #[test]
    fn stages_multiply_in_order() {
        let config = base_config();
        // 30 * 1.5 (trending sl) * 1.2 (session A sl) = 54
        // 60 * 2.0 (trending tp) * 1.2 (session A tp) = 144
        let d = compute_distances(&config, 30.0, 60.0, None, Regime::Trending, TimeBucket::SessionA)
            .unwrap();
        assert!((d.sl_pips - 54.0).abs() < 1e-9);
        assert!((d.tp_pips - 144.0).abs() < 1e-9);
    }

    #[test]
    fn moderate_regime_applies_neutral_multipliers() {
        let mut config = base_config();
        config.session.enabled = false;

        // Strength between thresholds: tp multiplier must be 1.0, not the
        // configured ranging 0.7
        let d = evaluate(&config, 30.0, 60.0, None, Some(22.0), at(3)).unwrap();
        assert_eq!(d.sl_pips, 30.0);
        assert_eq!(d.tp_pips, 60.0);
    }

    #[test]
    fn missing_trend_strength_degrades_to_neutral() {
        let mut config = base_config();
        config.session.enabled = false;

        let d = evaluate(&config, 30.0, 60.0, None, None, at(3)).unwrap();
        assert_eq!(d.sl_pips, 30.0);
        assert_eq!(d.tp_pips, 60.0);
    }

    #[test]
    fn floor_clamp_applies() {
        let mut config = base_config();
        config.regime.enabled = false;
        config.session.enabled = false;
        config.min_distance_pips = 8.0;

        let d = compute_distances(&config, 3.0, 4.0, None, Regime::Moderate, TimeBucket::Other)
            .unwrap();
        assert_eq!(d.sl_pips, 8.0);
        assert_eq!(d.tp_pips, 8.0);
    }

    #[test]
    fn session_bucket_selects_pair() {
        let mut config = base_config();
        config.regime.enabled = false;

        // Hour 14 is session B: sl * 1.0, tp * 1.1
        let d = evaluate(&config, 30.0, 60.0, None, None, at(14)).unwrap();
        assert!((d.sl_pips - 30.0).abs() < 1e-9);
        assert!((d.tp_pips - 66.0).abs() < 1e-9);

        // Hour 20 is Other: * 0.9
        let d = evaluate(&config, 30.0, 60.0, None, None, at(20)).unwrap();
        assert!((d.sl_pips - 27.0).abs() < 1e-9);
        assert!((d.tp_pips - 54.0).abs() < 1e-9);
    }
}
