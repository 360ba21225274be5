use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipError {
    #[error("invalid tick definition: pip_size {pip_size} must be positive")]
    InvalidTickDefinition { pip_size: f64 },

    #[error("invalid tick definition: price_precision {precision} exceeds {max}")]
    PrecisionOutOfRange { precision: u32, max: u32 },
}

/// Largest supported decimal precision; beyond this the scale factor loses
/// integer exactness for realistic prices.
const MAX_PRECISION: u32 = 12;

/// Pip definition for one instrument: the conventional quoting increment
/// (which may span several tick sizes) and the venue's price precision.
///
/// Validated at startup via [`PipDefinition::new`] or
/// [`PipDefinition::validate`]; an invalid tick definition is a
/// configuration defect and fatal. Conversion methods assume a validated
/// definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipDefinition {
    pub pip_size: f64,
    pub price_precision: u32,
}

impl PipDefinition {
    pub fn new(pip_size: f64, price_precision: u32) -> Result<Self, PipError> {
        let pip = Self { pip_size, price_precision };
        pip.validate()?;
        Ok(pip)
    }

    pub fn validate(&self) -> Result<(), PipError> {
        if !(self.pip_size > 0.0) || !self.pip_size.is_finite() {
            return Err(PipError::InvalidTickDefinition { pip_size: self.pip_size });
        }
        if self.price_precision > MAX_PRECISION {
            return Err(PipError::PrecisionOutOfRange {
                precision: self.price_precision,
                max: MAX_PRECISION,
            });
        }
        Ok(())
    }

    /// Convert a pip count into a price delta.
    pub fn pips_to_price_delta(&self, pips: f64) -> f64 {
        pips * self.pip_size
    }

    /// Convert a price delta into a pip count.
    pub fn price_delta_to_pips(&self, delta: f64) -> f64 {
        delta / self.pip_size
    }

    /// Round a price to the instrument's precision, half away from zero.
    /// Sub-tick trigger prices are rejected by the venue, so every derived
    /// trigger passes through here before submission.
    pub fn round_to_precision(&self, price: f64) -> f64 {
        let scale = 10_f64.powi(self.price_precision as i32);
        // f64::round is half-away-from-zero, which is the required policy.
        (price * scale).round() / scale
    }
}
