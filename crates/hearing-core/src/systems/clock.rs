//! Simulation Clock
//!
//! Tick-based time source for both controllers. All periodic work derives
//! its cadence from the tick counter; a "timer" is just a deadline in
//! simulated seconds checked on a later tick.

use bevy_ecs::prelude::*;
use hearing_events::SimTimestamp;

/// Resource: The simulation clock.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    /// Current simulation tick
    pub tick: u64,
    /// Length of one tick in simulated seconds
    pub tick_seconds: f32,
}

impl SimClock {
    pub fn new(tick_seconds: f32) -> Self {
        Self {
            tick: 0,
            tick_seconds,
        }
    }

    /// Current time in simulated seconds.
    pub fn now(&self) -> f32 {
        self.tick as f32 * self.tick_seconds
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// True on ticks that fall on the given interval boundary. An interval
    /// at or below the tick length fires every tick.
    pub fn interval_elapsed(&self, interval_seconds: f32) -> bool {
        let ticks = (interval_seconds / self.tick_seconds).round() as u64;
        if ticks <= 1 {
            return true;
        }
        self.tick % ticks == 0
    }

    /// Current time as a telemetry timestamp.
    pub fn timestamp(&self) -> SimTimestamp {
        SimTimestamp::new(self.tick, self.now())
    }
}

/// System: Advance the clock at the top of each tick.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_tracks_ticks() {
        let mut clock = SimClock::new(0.05);
        assert_eq!(clock.now(), 0.0);

        for _ in 0..8 {
            clock.advance();
        }
        assert!((clock.now() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_interval_elapsed() {
        let mut clock = SimClock::new(0.05);

        // 1s interval = every 20th tick
        clock.tick = 20;
        assert!(clock.interval_elapsed(1.0));
        clock.tick = 21;
        assert!(!clock.interval_elapsed(1.0));

        // Intervals at the tick length fire every tick
        assert!(clock.interval_elapsed(0.05));
        assert!(clock.interval_elapsed(0.01));
    }

    #[test]
    fn test_timestamp() {
        let mut clock = SimClock::new(0.05);
        clock.tick = 10;
        let ts = clock.timestamp();
        assert_eq!(ts.tick, 10);
        assert!((ts.seconds - 0.5).abs() < 1e-6);
    }
}
