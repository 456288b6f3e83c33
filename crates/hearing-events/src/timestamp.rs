//! Simulation Timestamp Types
//!
//! Handles simulation time with both tick-based and wall-clock-second formats.
//!
//! # Example
//!
//! ```
//! use hearing_events::SimTimestamp;
//!
//! let ts = SimTimestamp::new(120, 6.0);
//! assert_eq!(ts.tick, 120);
//! assert_eq!(ts.to_string(), "tick_120+6.00s");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in simulated time.
///
/// The tick counter is the authoritative clock; `seconds` is the same
/// instant expressed in simulated seconds (tick count times the configured
/// tick length) for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Simulation tick at which the event occurred
    pub tick: u64,
    /// Simulated seconds elapsed since activation of the simulation
    pub seconds: f32,
}

impl SimTimestamp {
    pub fn new(tick: u64, seconds: f32) -> Self {
        Self { tick, seconds }
    }

    /// Timestamp for the start of the simulation.
    pub fn zero() -> Self {
        Self {
            tick: 0,
            seconds: 0.0,
        }
    }

    /// Returns the elapsed simulated seconds between two timestamps.
    pub fn seconds_since(&self, earlier: &SimTimestamp) -> f32 {
        self.seconds - earlier.seconds
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick_{}+{:.2}s", self.tick, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let ts = SimTimestamp::new(42, 2.1);
        assert_eq!(ts.to_string(), "tick_42+2.10s");
    }

    #[test]
    fn test_seconds_since() {
        let t1 = SimTimestamp::new(10, 0.5);
        let t2 = SimTimestamp::new(20, 1.0);
        assert!((t2.seconds_since(&t1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_serde_round_trip() {
        let ts = SimTimestamp::new(7, 0.35);
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: SimTimestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }
}
