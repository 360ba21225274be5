use crate::domain::{PositionId, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only snapshot of an open position, owned by the execution
/// collaborator. This subsystem consumes side, entry price, open
/// timestamp, and instrument; it never mutates a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Signed profit delta in price units; positive when in profit.
    pub fn profit_delta(&self, current_price: f64) -> f64 {
        (current_price - self.entry_price) * self.side.sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_position(side: Side, entry: f64) -> Position {
        Position {
            id: PositionId::from("P-1"),
            symbol: "EURUSD".into(),
            side,
            entry_price: entry,
            opened_at: DateTime::parse_from_rfc3339("2024-03-15T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn long_profit_delta() {
        let pos = make_position(Side::Long, 1.0900);
        assert!((pos.profit_delta(1.0930) - 0.0030).abs() < 1e-12);
        assert!(pos.profit_delta(1.0880) < 0.0);
    }

    #[test]
    fn short_profit_delta() {
        let pos = make_position(Side::Short, 1.0900);
        assert!((pos.profit_delta(1.0870) - 0.0030).abs() < 1e-12);
        assert!(pos.profit_delta(1.0920) < 0.0);
    }
}
