use crate::world::World;
use std::time::Duration;

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 60;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fixed-step driver: turns real elapsed time into whole simulation ticks.
///
/// Time is accumulated as `nanoseconds × rate`, so a tick boundary is an exact
/// multiple of `NANOS_PER_SEC` and the carried remainder never drifts, even
/// though 1/60 s is not a whole number of nanoseconds.
#[derive(Debug, Clone)]
pub struct FixedTicker {
    rate: u32,
    scaled: u128,
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}

impl FixedTicker {
    pub fn new(rate: u32) -> Self {
        assert!(rate > 0, "tick rate must be positive");
        Self { rate, scaled: 0 }
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Length of one tick.
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.rate
    }

    /// Add elapsed time and return how many whole ticks are now due.
    pub fn accumulate(&mut self, elapsed: Duration) -> u64 {
        self.scaled += elapsed.as_nanos() * u128::from(self.rate);
        let ticks = self.scaled / NANOS_PER_SEC;
        self.scaled %= NANOS_PER_SEC;
        ticks as u64
    }

    /// Time carried over toward the next tick.
    pub fn carried(&self) -> Duration {
        let nanos = self.scaled / u128::from(self.rate);
        Duration::from_nanos(nanos as u64)
    }

    /// Accumulate `elapsed` and run the due ticks against `world`.
    pub fn drive(&mut self, world: &mut World, elapsed: Duration) -> u64 {
        let ticks = self.accumulate(elapsed);
        if ticks > 0 {
            world.advance(ticks);
        }
        ticks
    }
}
