//! Configuration — an immutable value threaded through every call, so
//! multiple instruments/backtests can run with independent settings
//! without interference. Loadable from TOML; fully validated before use.

use crate::domain::{PipDefinition, PipError};
use crate::policy::{
    BaseMode, MultiplierPair, RegimeScaling, RegimeThresholds, SessionBucket, SessionScaling,
    SessionWindow, StopPolicyConfig,
};
use crate::trailing::TrailingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Pip(#[from] PipError),

    #[error("regime thresholds must satisfy trending > ranging >= 0 (trending {trending}, ranging {ranging})")]
    InvalidRegimeThresholds { trending: f64, ranging: f64 },

    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("session hour {hour} out of range (start < 24, end <= 24)")]
    InvalidSessionHour { hour: u32 },
}

/// Base stop/target distances in pips, used when the policy's base mode
/// is `fixed` and for initial bracket pricing by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseDistances {
    pub sl_pips: f64,
    pub tp_pips: f64,
}

/// Complete configuration for one instrument/strategy context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub pip: PipDefinition,
    pub trailing: TrailingConfig,
    pub base: BaseDistances,
    pub policy: StopPolicyConfig,
}

impl Config {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every configured value. Called by the loaders; hosts
    /// constructing a `Config` in code should call this before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pip.validate()?;

        ensure_positive("trailing.activation_threshold_pips", self.trailing.activation_threshold_pips)?;
        ensure_positive("trailing.trailing_distance_pips", self.trailing.trailing_distance_pips)?;
        ensure_positive("base.sl_pips", self.base.sl_pips)?;
        ensure_positive("base.tp_pips", self.base.tp_pips)?;
        ensure_positive("policy.min_distance_pips", self.policy.min_distance_pips)?;

        if let BaseMode::AtrScaled { sl_multiplier, tp_multiplier } = self.policy.base {
            ensure_positive("policy.base.sl_multiplier", sl_multiplier)?;
            ensure_positive("policy.base.tp_multiplier", tp_multiplier)?;
        }

        let RegimeThresholds { trending, ranging } = self.policy.regime.thresholds;
        if !(trending > ranging && ranging >= 0.0) {
            return Err(ConfigError::InvalidRegimeThresholds { trending, ranging });
        }
        ensure_pair("policy.regime.trending", self.policy.regime.trending)?;
        ensure_pair("policy.regime.ranging", self.policy.regime.ranging)?;

        ensure_window(self.policy.session.session_a.window)?;
        ensure_window(self.policy.session.session_b.window)?;
        ensure_pair("policy.session.session_a", self.policy.session.session_a.multipliers)?;
        ensure_pair("policy.session.session_b", self.policy.session.session_b.multipliers)?;
        ensure_pair("policy.session.other", self.policy.session.other)?;

        Ok(())
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

fn ensure_pair(name: &'static str, pair: MultiplierPair) -> Result<(), ConfigError> {
    ensure_positive(name, pair.sl)?;
    ensure_positive(name, pair.tp)
}

fn ensure_window(window: SessionWindow) -> Result<(), ConfigError> {
    if window.start_hour >= 24 {
        return Err(ConfigError::InvalidSessionHour { hour: window.start_hour });
    }
    if window.end_hour > 24 {
        return Err(ConfigError::InvalidSessionHour { hour: window.end_hour });
    }
    Ok(())
}

impl Default for Config {
    /// EUR/USD-style defaults: 20-pip activation, 10-pip trail, 30/60
    /// base distances, regime and session scaling enabled.
    fn default() -> Self {
        Self {
            pip: PipDefinition { pip_size: 0.0001, price_precision: 5 },
            trailing: TrailingConfig {
                activation_threshold_pips: 20.0,
                trailing_distance_pips: 10.0,
            },
            base: BaseDistances { sl_pips: 30.0, tp_pips: 60.0 },
            policy: StopPolicyConfig {
                base: BaseMode::Fixed,
                regime: RegimeScaling {
                    enabled: true,
                    thresholds: RegimeThresholds { trending: 25.0, ranging: 20.0 },
                    trending: MultiplierPair { sl: 1.2, tp: 1.5 },
                    ranging: MultiplierPair { sl: 0.8, tp: 0.7 },
                },
                session: SessionScaling {
                    enabled: true,
                    session_a: SessionBucket {
                        window: SessionWindow { start_hour: 7, end_hour: 12 },
                        multipliers: MultiplierPair { sl: 1.1, tp: 1.1 },
                    },
                    session_b: SessionBucket {
                        window: SessionWindow { start_hour: 12, end_hour: 17 },
                        multipliers: MultiplierPair { sl: 1.0, tp: 1.0 },
                    },
                    other: MultiplierPair { sl: 0.9, tp: 0.9 },
                },
                min_distance_pips: 5.0,
            },
        }
    }
}
