//! Periodic snapshot schedule driven by elapsed time.

use std::time::Duration;

use tileworld_kernel::World;

use crate::gateway::PersistenceGateway;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub period: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }
}

/// Saves the world at most once per period.
///
/// Time is fed in by the caller, so the schedule is deterministic in tests.
/// Each save snapshots whatever world is passed at that moment.
#[derive(Debug, Clone)]
pub struct Autosaver {
    config: AutosaveConfig,
    since_last: Duration,
    saves: u64,
    failures: u64,
}

impl Autosaver {
    pub fn new(config: AutosaveConfig) -> Self {
        assert!(!config.period.is_zero(), "autosave period must be non-zero");
        Self {
            config,
            since_last: Duration::ZERO,
            saves: 0,
            failures: 0,
        }
    }

    pub fn config(&self) -> AutosaveConfig {
        self.config
    }

    /// Advance the schedule. Returns the save outcome when a save was due.
    ///
    /// Long gaps produce a single save; the leftover time past the last
    /// period boundary carries into the next call.
    pub fn poll<S: KeyValueStore>(
        &mut self,
        elapsed: Duration,
        world: &World,
        gateway: &mut PersistenceGateway<S>,
    ) -> Option<bool> {
        self.since_last += elapsed;
        if self.since_last < self.config.period {
            return None;
        }
        let period = self.config.period.as_nanos();
        let leftover = self.since_last.as_nanos() % period;
        self.since_last = Duration::from_nanos(leftover as u64);
        Some(self.record(gateway.save(world)))
    }

    /// Save now regardless of the schedule, and restart the period.
    pub fn flush<S: KeyValueStore>(
        &mut self,
        world: &World,
        gateway: &mut PersistenceGateway<S>,
    ) -> bool {
        self.since_last = Duration::ZERO;
        self.record(gateway.save(world))
    }

    fn record(&mut self, saved: bool) -> bool {
        if saved {
            self.saves += 1;
        } else {
            self.failures += 1;
        }
        saved
    }

    /// Successful saves so far.
    pub fn saves(&self) -> u64 {
        self.saves
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl Default for Autosaver {
    fn default() -> Self {
        Self::new(AutosaveConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn saves_once_per_period() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let mut saver = Autosaver::default();
        let world = World::new();

        assert_eq!(saver.poll(ms(400), &world, &mut gateway), None);
        assert_eq!(saver.poll(ms(400), &world, &mut gateway), None);
        assert_eq!(saver.poll(ms(400), &world, &mut gateway), Some(true));
        // 200ms carried over from the previous call.
        assert_eq!(saver.poll(ms(700), &world, &mut gateway), None);
        assert_eq!(saver.poll(ms(100), &world, &mut gateway), Some(true));
        assert_eq!(saver.saves(), 2);
    }

    #[test]
    fn long_gap_saves_once() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let mut saver = Autosaver::default();
        let world = World::new();

        assert_eq!(saver.poll(ms(3_500), &world, &mut gateway), Some(true));
        assert_eq!(saver.poll(ms(400), &world, &mut gateway), None);
        assert_eq!(saver.poll(ms(100), &world, &mut gateway), Some(true));
        assert_eq!(saver.saves(), 2);
    }

    #[test]
    fn snapshots_current_world() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let mut saver = Autosaver::default();
        let mut world = World::new();

        world.advance(10);
        saver.poll(ms(1_000), &world, &mut gateway);
        world.advance(5);
        saver.poll(ms(1_000), &world, &mut gateway);

        assert_eq!(gateway.load().map(|w| w.tick()), Some(15));
    }

    #[test]
    fn flush_restarts_period_and_counts_failures() {
        let mut gateway = PersistenceGateway::new(MemoryStore::with_quota(8));
        let mut saver = Autosaver::default();
        let world = World::new();

        assert_eq!(saver.poll(ms(900), &world, &mut gateway), None);
        assert!(!saver.flush(&world, &mut gateway));
        assert_eq!(saver.poll(ms(900), &world, &mut gateway), None);
        assert_eq!(saver.failures(), 1);
        assert_eq!(saver.saves(), 0);
    }
}
