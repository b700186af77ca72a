use crate::core::math::transform::wrap_angle;
use crate::scene::graph::SceneGraph;
use log::info;
use std::f32::consts::PI;
use std::time::Duration;

/// Angle added to the accumulator on every tick.
pub const DEFAULT_STEP: f32 = PI / 36.0;
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(50);
/// Upper bound on ticks released by a single `advance`, so a stalled host does
/// not replay a long backlog in one burst.
const MAX_TICKS_PER_ADVANCE: u32 = 5;

/// What an [`Animator`] sees on each enabled tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Accumulated angle after this tick, in [0, 2π).
    pub angle: f32,
    /// Angle added this tick.
    pub step: f32,
}

/// Moves the animated subjects of one sketch.
pub trait Animator {
    fn animate(&mut self, scene: &mut SceneGraph, tick: Tick);
}

/// Fixed-period accumulator: collects elapsed time and releases whole periods.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    period: Duration,
    accumulator: Duration,
}

impl FixedInterval {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
        }
    }

    /// Adds `delta` and returns how many whole periods are due.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;

        let due = self.accumulator.as_nanos() / self.period.as_nanos();
        let fired = due.min(u128::from(MAX_TICKS_PER_ADVANCE)) as u32;
        if due > u128::from(fired) {
            // Drop the backlog beyond the cap.
            self.accumulator = Duration::ZERO;
        } else {
            self.accumulator -= self.period * fired;
        }
        fired
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Pausable fixed-tick animation clock.
///
/// The interval timer runs for the whole session; `enabled` only gates whether a
/// tick has any effect.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    enabled: bool,
    angle: f32,
    step: f32,
    timer: FixedInterval,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl AnimationDriver {
    /// A disabled driver ticking every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            enabled: false,
            angle: 0.0,
            step: DEFAULT_STEP,
            timer: FixedInterval::new(period),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        info!(
            "Animation {}",
            if self.enabled { "enabled" } else { "paused" }
        );
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn period(&self) -> Duration {
        self.timer.period()
    }

    /// Feeds elapsed host time to the interval timer; returns the number of due ticks.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.timer.advance(delta)
    }

    /// One timer tick. Disabled: nothing changes and `false` is returned.
    /// Enabled: the angle advances (wrapped), the animator runs, and `true`
    /// tells the caller to re-render.
    pub fn tick(&mut self, scene: &mut SceneGraph, animator: &mut dyn Animator) -> bool {
        if !self.enabled {
            return false;
        }

        self.angle = wrap_angle(self.angle + self.step);
        animator.animate(
            scene,
            Tick {
                angle: self.angle,
                step: self.step,
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::camera::Camera;
    use std::f32::consts::TAU;

    struct CountTicks(Vec<Tick>);

    impl Animator for CountTicks {
        fn animate(&mut self, _scene: &mut SceneGraph, tick: Tick) {
            self.0.push(tick);
        }
    }

    #[test]
    fn interval_releases_whole_periods() {
        let mut timer = FixedInterval::new(Duration::from_millis(50));
        assert_eq!(timer.advance(Duration::from_millis(30)), 0);
        assert_eq!(timer.advance(Duration::from_millis(30)), 1);
        assert_eq!(timer.advance(Duration::from_millis(140)), 3);
        assert_eq!(timer.advance(Duration::from_secs(10)), MAX_TICKS_PER_ADVANCE);
        assert_eq!(timer.advance(Duration::from_millis(10)), 0);
    }

    #[test]
    fn huge_backlog_is_capped_not_truncated() {
        // 2^32 + 1 whole periods would wrap to a single tick as u32.
        let mut timer = FixedInterval::new(Duration::from_millis(1));
        let backlog = Duration::from_millis((1u64 << 32) + 1);
        assert_eq!(timer.advance(backlog), MAX_TICKS_PER_ADVANCE);
        assert_eq!(timer.advance(Duration::ZERO), 0);
    }

    #[test]
    fn disabled_ticks_do_nothing() {
        let mut scene = SceneGraph::new(Camera::new(1.0));
        let mut driver = AnimationDriver::default();
        let mut animator = CountTicks(Vec::new());

        for _ in 0..10 {
            assert!(!driver.tick(&mut scene, &mut animator));
        }
        assert!(animator.0.is_empty());
        assert_eq!(driver.angle(), 0.0);
    }

    #[test]
    fn angle_wraps_into_full_turn() {
        let mut scene = SceneGraph::new(Camera::new(1.0));
        let mut driver = AnimationDriver::default();
        let mut animator = CountTicks(Vec::new());
        driver.toggle();

        let mut unwrapped = 0.0f32;
        for _ in 0..80 {
            assert!(driver.tick(&mut scene, &mut animator));
            unwrapped += DEFAULT_STEP;
            assert!((0.0..TAU).contains(&driver.angle()));
        }
        let expected = unwrapped % TAU;
        assert!((driver.angle() - expected).abs() < 1e-4);
        assert_eq!(animator.0.len(), 80);
        assert_eq!(animator.0[0].angle, DEFAULT_STEP);
    }

    #[test]
    fn eight_steps_stay_below_full_turn() {
        let mut scene = SceneGraph::new(Camera::new(1.0));
        let mut driver = AnimationDriver::default();
        driver.set_enabled(true);
        for _ in 0..8 {
            driver.tick(&mut scene, &mut CountTicks(Vec::new()));
        }
        assert!((driver.angle() - 8.0 * DEFAULT_STEP).abs() < 1e-6);
    }
}
