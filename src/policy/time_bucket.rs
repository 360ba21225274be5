//! Time-of-day bucketing — classifies an event timestamp's UTC hour into
//! one of three configured session buckets.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Session bucket for time-of-day scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBucket {
    /// Primary session A (e.g. London)
    SessionA,
    /// Primary session B (e.g. New York)
    SessionB,
    /// Everything else
    Other,
}

/// Half-open UTC hour window `[start, end)`. A window with `start > end`
/// wraps midnight (e.g. 22..6 covers 22:00–05:59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SessionWindow {
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl TimeBucket {
    /// Classify a timestamp. Session A wins when windows overlap.
    pub fn classify(
        timestamp: DateTime<Utc>,
        session_a: SessionWindow,
        session_b: SessionWindow,
    ) -> TimeBucket {
        let hour = timestamp.hour();
        if session_a.contains(hour) {
            TimeBucket::SessionA
        } else if session_b.contains(hour) {
            TimeBucket::SessionB
        } else {
            TimeBucket::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2024-03-15T{hour:02}:30:00Z"))
            .unwrap()
            .with_timezone(&Utc)
    }

    const LONDON: SessionWindow = SessionWindow { start_hour: 7, end_hour: 12 };
    const NEW_YORK: SessionWindow = SessionWindow { start_hour: 12, end_hour: 17 };

    #[test]
    fn classify_session_a() {
        assert_eq!(TimeBucket::classify(at_hour(7), LONDON, NEW_YORK), TimeBucket::SessionA);
        assert_eq!(TimeBucket::classify(at_hour(11), LONDON, NEW_YORK), TimeBucket::SessionA);
    }

    #[test]
    fn classify_session_b_at_boundary() {
        // end is exclusive: hour 12 belongs to session B, not A
        assert_eq!(TimeBucket::classify(at_hour(12), LONDON, NEW_YORK), TimeBucket::SessionB);
        assert_eq!(TimeBucket::classify(at_hour(16), LONDON, NEW_YORK), TimeBucket::SessionB);
    }

    #[test]
    fn classify_other() {
        assert_eq!(TimeBucket::classify(at_hour(17), LONDON, NEW_YORK), TimeBucket::Other);
        assert_eq!(TimeBucket::classify(at_hour(3), LONDON, NEW_YORK), TimeBucket::Other);
    }

    #[test]
    fn wrapping_window() {
        let asia = SessionWindow { start_hour: 22, end_hour: 6 };
        assert!(asia.contains(23));
        assert!(asia.contains(0));
        assert!(asia.contains(5));
        assert!(!asia.contains(6));
        assert!(!asia.contains(12));
    }

    #[test]
    fn session_a_wins_overlap() {
        let a = SessionWindow { start_hour: 7, end_hour: 13 };
        let b = SessionWindow { start_hour: 12, end_hour: 17 };
        assert_eq!(TimeBucket::classify(at_hour(12), a, b), TimeBucket::SessionA);
    }
}
