//! # Session Tick Loop
//!
//! Fixed-timestep loop. The tick rate is the only clock the session has.
//!
//! When processing falls behind, the whole backlog collapses into one tick
//! that reports how many budgets it swallowed. Playback uses that count to
//! skip ahead instead of bursting out stale frames.

use std::time::{Duration, Instant};

use simulacra_shared::constants::MAX_TICK_RATE;

/// Timing of one executed tick.
#[derive(Clone, Copy, Debug)]
pub struct TickInfo {
    /// When the tick began.
    pub start: Instant,
    /// Tick budgets that elapsed without a tick of their own.
    pub skipped: u32,
}

/// Fixed-timestep tick loop controller.
pub struct TickLoop {
    /// Target tick duration.
    tick_duration: Duration,
    /// Time of last accumulator update.
    last_tick: Instant,
    /// Time owed to ticks not yet run.
    accumulator: Duration,
    /// Total ticks executed.
    tick_count: u64,
    /// Timing statistics.
    stats: TickStats,
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Ticks that took longer than their budget.
    pub late_ticks: u64,
    /// Budgets collapsed into a later tick.
    pub skipped_ticks: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
}

impl TickStats {
    fn fresh(tick_duration: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: micros(tick_duration),
            late_ticks: 0,
            skipped_ticks: 0,
            total_ticks: 0,
        }
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

fn tick_duration_for(tick_rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(tick_rate.clamp(1, MAX_TICK_RATE)))
}

impl TickLoop {
    /// Creates a tick loop at `tick_rate` Hz, clamped to
    /// `1..=MAX_TICK_RATE`.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_duration = tick_duration_for(tick_rate);
        Self {
            tick_duration,
            last_tick: Instant::now(),
            accumulator: Duration::ZERO,
            tick_count: 0,
            stats: TickStats::fresh(tick_duration),
        }
    }

    /// Changes the rate, clamped as in [`TickLoop::new`]. Time already
    /// owed is kept.
    pub fn set_rate(&mut self, tick_rate: u32) {
        let tick_duration = tick_duration_for(tick_rate);
        if tick_duration != self.tick_duration {
            tracing::debug!(tick_rate, "Tick rate changed");
            self.tick_duration = tick_duration;
        }
    }

    /// Returns true if a tick is due.
    #[must_use]
    pub fn should_tick(&mut self) -> bool {
        let now = Instant::now();
        self.accumulator += now.duration_since(self.last_tick);
        self.last_tick = now;

        self.accumulator >= self.tick_duration
    }

    /// Marks the start of a tick and consumes every whole budget owed.
    #[must_use]
    pub fn begin_tick(&mut self) -> TickInfo {
        let tick_nanos = self.tick_duration.as_nanos().max(1);
        let owed = self.accumulator.as_nanos() / tick_nanos;
        let remainder = self.accumulator.as_nanos() % tick_nanos;
        self.accumulator = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));

        let skipped = u32::try_from(owed.saturating_sub(1)).unwrap_or(u32::MAX);
        self.stats.skipped_ticks += u64::from(skipped);
        self.tick_count += 1;

        TickInfo {
            start: Instant::now(),
            skipped,
        }
    }

    /// Marks the end of a tick and records its duration.
    pub fn end_tick(&mut self, info: TickInfo) {
        let duration = info.start.elapsed();
        let duration_us = micros(duration);

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
        }
    }

    /// Waits until the next tick is due.
    ///
    /// Sleeps for most of the remaining budget and spins the rest.
    pub fn wait_for_next_tick(&self) {
        let deadline = self.tick_duration.saturating_sub(self.accumulator);
        let elapsed = self.last_tick.elapsed();

        if elapsed < deadline {
            let remaining = deadline - elapsed;
            if remaining > Duration::from_micros(1000) {
                std::thread::sleep(remaining - Duration::from_micros(500));
            }
            while self.last_tick.elapsed() < deadline {
                std::hint::spin_loop();
            }
        }
    }

    /// Returns the number of ticks run.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns tick statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns the target tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Resets statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::fresh(self.tick_duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_loop_creation() {
        let tick_loop = TickLoop::new(60);
        assert_eq!(tick_loop.tick_count(), 0);
        assert_eq!(tick_loop.tick_duration(), Duration::from_micros(16666));
    }

    #[test]
    fn test_zero_rate_is_one_hz() {
        assert_eq!(TickLoop::new(0).tick_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_tick_execution() {
        let mut tick_loop = TickLoop::new(1000);
        std::thread::sleep(Duration::from_millis(2));

        assert!(tick_loop.should_tick());
        let info = tick_loop.begin_tick();
        tick_loop.end_tick(info);

        assert_eq!(tick_loop.tick_count(), 1);
        assert_eq!(tick_loop.stats().total_ticks, 1);
    }

    #[test]
    fn test_backlog_collapses_into_one_tick() {
        let mut tick_loop = TickLoop::new(100);
        std::thread::sleep(Duration::from_millis(55));

        assert!(tick_loop.should_tick());
        let info = tick_loop.begin_tick();
        tick_loop.end_tick(info);

        // 55ms at 10ms per tick: one tick run, at least four skipped.
        assert!(info.skipped >= 4, "skipped {}", info.skipped);
        assert_eq!(tick_loop.tick_count(), 1);
        assert_eq!(tick_loop.stats().skipped_ticks, u64::from(info.skipped));
    }

    #[test]
    fn test_begin_without_backlog_skips_nothing() {
        let mut tick_loop = TickLoop::new(1);
        assert_eq!(tick_loop.begin_tick().skipped, 0);
    }

    #[test]
    fn test_rate_is_capped() {
        let mut tick_loop = TickLoop::new(10_000_000);
        assert_eq!(tick_loop.tick_duration(), Duration::from_millis(1));
        tick_loop.set_rate(u32::MAX);
        assert_eq!(tick_loop.tick_duration(), Duration::from_millis(1));
    }

    #[test]
    fn test_set_rate() {
        let mut tick_loop = TickLoop::new(60);
        tick_loop.set_rate(30);
        assert_eq!(tick_loop.tick_duration(), Duration::from_micros(33333));
    }

    #[test]
    fn test_wait_reaches_next_tick() {
        let mut tick_loop = TickLoop::new(200);
        let started = Instant::now();
        tick_loop.wait_for_next_tick();
        assert!(tick_loop.should_tick());
        assert!(started.elapsed() >= Duration::from_millis(4));
    }

    #[test]
    fn test_stats_tracking() {
        let mut tick_loop = TickLoop::new(1000);
        for _ in 0..10 {
            tick_loop.wait_for_next_tick();
            while tick_loop.should_tick() {
                let info = tick_loop.begin_tick();
                std::thread::sleep(Duration::from_micros(50));
                tick_loop.end_tick(info);
            }
        }

        let stats = tick_loop.stats();
        assert!(stats.total_ticks > 0);
        assert!(stats.min_tick_us > 0);
        assert!(stats.min_tick_us <= stats.max_tick_us);

        tick_loop.reset_stats();
        assert_eq!(tick_loop.stats().total_ticks, 0);
    }
}
