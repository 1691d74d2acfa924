// Frame pacer - Decides, once per emulated frame, whether to render or skip
//
// The pacer keeps an absolute deadline for the next frame and advances it by
// a fixed interval every tick. Because the deadline is a `Duration` with
// nanosecond resolution, adding a microsecond interval never truncates, so
// the schedule does not drift over long runs.
//
// When the host falls more than `RESYNC_THRESHOLD` behind (a pause, a
// debugger stop, a suspended laptop), the backlog is dropped instead of being
// replayed as a burst of fast-forwarded frames.

use std::time::Duration;

use super::clock::Clock;
use crate::config::{Region, SkipPolicy};

/// Lag at which the schedule is resynchronized to the current time
pub const RESYNC_THRESHOLD: Duration = Duration::from_millis(500);

/// Auto policy: skip limit while on or ahead of schedule
pub const AUTO_SKIP_LIMIT_AHEAD: u32 = 1;

/// Auto policy: skip limit while behind schedule
pub const AUTO_SKIP_LIMIT_BEHIND: u32 = 10;

/// Offset of the very first deadline from the first tick
const FIRST_DEADLINE_OFFSET: Duration = Duration::from_micros(1);

/// Smallest frame interval the pacer accepts
const MIN_FRAME_INTERVAL: Duration = Duration::from_micros(1);

/// Per-tick outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    /// Emulate, convert and present this frame
    Render,

    /// Emulate this frame without producing a picture
    Skip,
}

impl RenderDecision {
    /// Whether the frame should be drawn
    #[inline]
    pub fn is_render(self) -> bool {
        self == RenderDecision::Render
    }
}

/// Mutable pacing state, touched once per tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacingState {
    /// Deadline of the next frame, established on the first tick
    pub next_deadline: Option<Duration>,

    /// Frames counted since the last render
    pub skip_counter: u32,
}

/// Counters accumulated over the pacer's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingStats {
    /// Ticks that decided to render
    pub rendered: u64,

    /// Ticks that decided to skip
    pub skipped: u64,

    /// Times the schedule was snapped forward after excessive lag
    pub resyncs: u64,
}

/// Frame pacer
pub struct FramePacer<C: Clock> {
    clock: C,
    interval: Duration,
    policy: SkipPolicy,
    state: PacingState,
    stats: PacingStats,
}

impl<C: Clock> FramePacer<C> {
    /// Create a pacer for the given region's frame interval
    ///
    /// # Arguments
    ///
    /// * `clock` - Time source used for measuring and waiting
    /// * `region` - Selects the NTSC or PAL frame interval
    /// * `policy` - Fixed or rate-adaptive frame skipping
    pub fn new(clock: C, region: Region, policy: SkipPolicy) -> Self {
        Self::with_interval(clock, region.frame_interval(), policy)
    }

    /// Create a pacer with a custom frame interval (clamped to at least 1µs)
    pub fn with_interval(clock: C, interval: Duration, policy: SkipPolicy) -> Self {
        Self {
            clock,
            interval: interval.max(MIN_FRAME_INTERVAL),
            policy,
            state: PacingState::default(),
            stats: PacingStats::default(),
        }
    }

    /// Run one tick: decide render/skip, correct lag, wait for the deadline
    /// and schedule the next one.
    ///
    /// The first tick establishes the schedule. Lag correction and the wait
    /// run on every tick, whatever the decision.
    ///
    /// # Returns
    ///
    /// Whether the frame for this tick should be rendered or skipped
    pub fn tick(&mut self) -> RenderDecision {
        let mut now = self.clock.now();

        let first = now + FIRST_DEADLINE_OFFSET;
        let mut deadline = *self.state.next_deadline.get_or_insert(first);

        let behind = deadline < now;
        let limit = self.skip_limit(behind);

        self.state.skip_counter += 1;
        let decision = if self.state.skip_counter >= limit {
            self.state.skip_counter = 0;
            self.stats.rendered += 1;
            RenderDecision::Render
        } else {
            self.stats.skipped += 1;
            RenderDecision::Skip
        };

        if behind {
            let lag = now - deadline;
            if lag >= RESYNC_THRESHOLD {
                log::debug!(
                    "Frame pacer {:.1}ms behind, resynchronizing",
                    lag.as_secs_f64() * 1000.0
                );
                deadline = now;
                self.stats.resyncs += 1;
            }
        }

        // sleep() may return early; re-arm until the deadline has passed
        while deadline > now {
            self.clock.sleep(deadline - now);
            now = self.clock.now();
        }

        self.state.next_deadline = Some(deadline + self.interval);

        log::trace!(
            "tick {:?} (counter {}, limit {})",
            decision,
            self.state.skip_counter,
            limit
        );
        decision
    }

    /// Effective skip limit for this tick
    fn skip_limit(&self, behind: bool) -> u32 {
        match self.policy {
            SkipPolicy::Fixed(n) => n.saturating_add(1),
            SkipPolicy::Auto if behind => AUTO_SKIP_LIMIT_BEHIND,
            SkipPolicy::Auto => AUTO_SKIP_LIMIT_AHEAD,
        }
    }

    /// Forget the schedule; the next tick starts a new one
    pub fn reset(&mut self) {
        self.state = PacingState::default();
    }

    /// Change the region, keeping the current schedule
    pub fn set_region(&mut self, region: Region) {
        self.interval = region.frame_interval();
    }

    /// Target interval between frames
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Deadline of the next frame, if a schedule has been established
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.next_deadline
    }

    /// Current pacing state
    pub fn state(&self) -> &PacingState {
        &self.state
    }

    /// Lifetime counters
    pub fn stats(&self) -> PacingStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ManualClock;

    fn pacer(policy: SkipPolicy) -> (FramePacer<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (FramePacer::new(clock.clone(), Region::Ntsc, policy), clock)
    }

    const NTSC: Duration = Duration::from_micros(16_667);

    #[test]
    fn test_first_tick_establishes_deadline() {
        let (mut pacer, clock) = pacer(SkipPolicy::Auto);
        clock.set(Duration::from_secs(3));

        assert_eq!(pacer.tick(), RenderDecision::Render);

        // Waited out the one-microsecond offset, then scheduled one interval later
        assert_eq!(clock.now(), Duration::from_secs(3) + FIRST_DEADLINE_OFFSET);
        assert_eq!(
            pacer.next_deadline(),
            Some(Duration::from_secs(3) + FIRST_DEADLINE_OFFSET + NTSC)
        );
    }

    #[test]
    fn test_fixed_zero_renders_every_tick() {
        let (mut pacer, _clock) = pacer(SkipPolicy::Fixed(0));
        for _ in 0..50 {
            assert_eq!(pacer.tick(), RenderDecision::Render);
            assert_eq!(pacer.state().skip_counter, 0);
        }
    }

    #[test]
    fn test_fixed_three_renders_one_in_four() {
        let (mut pacer, _clock) = pacer(SkipPolicy::Fixed(3));
        let decisions: Vec<_> = (0..12).map(|_| pacer.tick()).collect();

        let pattern = [
            RenderDecision::Skip,
            RenderDecision::Skip,
            RenderDecision::Skip,
            RenderDecision::Render,
        ];
        for chunk in decisions.chunks(4) {
            assert_eq!(chunk, pattern);
        }
        assert_eq!(pacer.stats().rendered, 3);
        assert_eq!(pacer.stats().skipped, 9);
    }

    #[test]
    fn test_schedule_advances_by_interval() {
        let (mut pacer, clock) = pacer(SkipPolicy::Fixed(0));
        pacer.tick();
        let first = pacer.next_deadline().unwrap();

        for i in 1..=1000u32 {
            pacer.tick();
            assert_eq!(pacer.next_deadline(), Some(first + NTSC * i));
        }
        // The clock was only moved by the pacer's own sleeps
        assert_eq!(clock.now(), first + NTSC * 999);
    }

    #[test]
    fn test_skipped_ticks_still_wait() {
        let (mut pacer, clock) = pacer(SkipPolicy::Fixed(5));
        pacer.tick();
        let before = clock.now();
        assert_eq!(pacer.tick(), RenderDecision::Skip);
        assert_eq!(clock.now() - before, NTSC);
    }

    #[test]
    fn test_small_lag_is_not_resynchronized() {
        let (mut pacer, clock) = pacer(SkipPolicy::Fixed(0));
        pacer.tick();
        let deadline = pacer.next_deadline().unwrap();

        clock.set(deadline + Duration::from_millis(100));
        pacer.tick();

        // Still on the established grid: deadline + one interval
        assert_eq!(pacer.next_deadline(), Some(deadline + NTSC));
        assert_eq!(pacer.stats().resyncs, 0);
    }

    #[test]
    fn test_large_lag_resynchronizes() {
        let (mut pacer, clock) = pacer(SkipPolicy::Fixed(0));
        pacer.tick();

        clock.advance(Duration::from_secs(2));
        let now = clock.now();
        pacer.tick();

        assert_eq!(pacer.next_deadline(), Some(now + NTSC));
        assert_eq!(pacer.stats().resyncs, 1);
    }

    #[test]
    fn test_lag_exactly_at_threshold_resynchronizes() {
        let (mut pacer, clock) = pacer(SkipPolicy::Fixed(0));
        pacer.tick();
        let deadline = pacer.next_deadline().unwrap();

        clock.set(deadline + RESYNC_THRESHOLD);
        pacer.tick();
        assert_eq!(pacer.stats().resyncs, 1);
    }

    #[test]
    fn test_auto_limit_depends_on_schedule() {
        let (pacer, _clock) = pacer(SkipPolicy::Auto);
        assert_eq!(pacer.skip_limit(false), AUTO_SKIP_LIMIT_AHEAD);
        assert_eq!(pacer.skip_limit(true), AUTO_SKIP_LIMIT_BEHIND);
    }

    #[test]
    fn test_fixed_limit_saturates() {
        let (pacer, _clock) = pacer(SkipPolicy::Fixed(u32::MAX));
        assert_eq!(pacer.skip_limit(false), u32::MAX);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let clock = ManualClock::new();
        let pacer = FramePacer::with_interval(clock, Duration::ZERO, SkipPolicy::Auto);
        assert_eq!(pacer.interval(), MIN_FRAME_INTERVAL);
    }

    #[test]
    fn test_reset_clears_schedule() {
        let (mut pacer, _clock) = pacer(SkipPolicy::Fixed(3));
        pacer.tick();
        pacer.tick();
        pacer.reset();
        assert_eq!(pacer.state(), &PacingState::default());
    }

    #[test]
    fn test_set_region_changes_interval() {
        let (mut pacer, _clock) = pacer(SkipPolicy::Auto);
        pacer.set_region(Region::Pal);
        assert_eq!(pacer.interval(), Duration::from_millis(20));
    }
}
