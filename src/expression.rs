//! # Expression State Machine
//!
//! Owns the continuous animation parameters of the face and advances them once
//! per animation tick.
//!
//! ## Sub-machines
//!
//! ### Blink
//! `Open → Closed → Open`. A counter increments every tick; when it reaches the
//! blink interval the eyes close for a fixed number of ticks and the counter
//! restarts. Blinking waits while the face is smiling.
//!
//! ### Smile
//! `Neutral → Rising → Held → Falling → Neutral`, derived from `smile_phase` and
//! the `is_smiling` direction flag. What moves the phase is pluggable through
//! [`SmileDriver`]:
//! - [`TimedSmile`]: a periodic cycle on a tick counter
//! - [`ActivitySmile`]: the day's step count against its rolling average
//!
//! Every update is total. Out-of-range phases are clamped to `[0, 1]` instead
//! of failing.

use crate::config::{ActivityConfig, ExpressionConfig, SmilePolicy};
use crate::ActivitySample;

/// Phases this close to an end snap onto it, absorbing accumulated step error.
const PHASE_EPSILON: f32 = 1e-4;

/// Continuous animation state of the face.
///
/// Created neutral when the face loads and mutated only by [`ExpressionEngine`].
/// The renderer reads it but never writes it.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ExpressionState {
    /// 0 = neutral, 1 = full smile
    pub smile_phase: f32,
    /// Direction of the smile transition: true while rising or holding
    pub is_smiling: bool,
    pub is_blinking: bool,
    pub blink_timer: u32,
    pub smile_timer: u32,
    pub smile_hold_timer: u32,
}

/// Where the smile currently is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmileStage {
    Neutral,
    Rising,
    Held,
    Falling,
}

impl ExpressionState {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn smile_stage(&self) -> SmileStage {
        match (self.is_smiling, self.smile_phase) {
            (true, phase) if phase >= 1.0 => SmileStage::Held,
            (true, _) => SmileStage::Rising,
            (false, phase) if phase > 0.0 => SmileStage::Falling,
            _ => SmileStage::Neutral,
        }
    }

    /// Set the smile phase, clamped to `[0, 1]`.
    pub fn set_smile_phase(&mut self, phase: f32) {
        self.smile_phase = if phase.is_nan() || phase <= PHASE_EPSILON {
            0.0
        } else if phase >= 1.0 - PHASE_EPSILON {
            1.0
        } else {
            phase
        };
    }
}

/// Blink cadence in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlinkTiming {
    pub interval_ticks: u32,
    pub duration_ticks: u32,
}

impl BlinkTiming {
    pub fn advance(&self, state: &mut ExpressionState) {
        state.blink_timer = state.blink_timer.saturating_add(1);

        if state.blink_timer >= self.interval_ticks && !state.is_smiling {
            state.blink_timer = 0;
            state.is_blinking = true;
        } else if state.is_blinking && state.blink_timer >= self.duration_ticks {
            state.is_blinking = false;
        }
    }
}

/// Strategy that moves the smile phase.
///
/// Both hooks receive the shared state by reference; a driver keeps only its
/// own tuning and bookkeeping.
pub trait SmileDriver: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Called once per animation tick.
    fn on_tick(&mut self, state: &mut ExpressionState);

    /// Called when the activity monitor reports. `None` means the data is
    /// not available on this device.
    fn on_activity(&mut self, _state: &mut ExpressionState, _sample: Option<ActivitySample>) {}
}

/// Periodic smile: rise by `step` per tick, hold, then fall by `step` per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedSmile {
    pub interval_ticks: u32,
    pub step: f32,
    pub hold_ticks: u32,
}

impl SmileDriver for TimedSmile {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn on_tick(&mut self, state: &mut ExpressionState) {
        if state.smile_stage() == SmileStage::Neutral {
            state.smile_timer = state.smile_timer.saturating_add(1);
            if state.smile_timer < self.interval_ticks {
                return;
            }
            log::debug!("smile rising after {} ticks", state.smile_timer);
            state.smile_timer = 0;
            state.smile_hold_timer = 0;
            state.is_smiling = true;
        }

        match state.smile_stage() {
            SmileStage::Rising => state.set_smile_phase(state.smile_phase + self.step),
            SmileStage::Held => {
                state.smile_hold_timer = state.smile_hold_timer.saturating_add(1);
                if state.smile_hold_timer >= self.hold_ticks {
                    log::debug!("smile falling");
                    state.smile_hold_timer = 0;
                    state.is_smiling = false;
                }
            }
            SmileStage::Falling => state.set_smile_phase(state.smile_phase - self.step),
            SmileStage::Neutral => {}
        }
    }
}

/// Step-count smile: grows while today's steps beat the daily average.
///
/// The phase only changes when a new step count arrives. Each full bucket of
/// surplus steps adds `phase_per_bucket`; falling back to or below the average
/// resets the face to neutral.
///
/// No timed transition runs under this policy, so `is_smiling` stays false:
/// the eyes stay open and keep blinking while the phase shapes the rest of
/// the face.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivitySmile {
    pub phase_per_bucket: f32,
    pub steps_per_bucket: u32,
    last_steps: Option<u32>,
    reported_unavailable: bool,
}

impl ActivitySmile {
    pub fn new(phase_per_bucket: f32, steps_per_bucket: u32) -> Self {
        Self {
            phase_per_bucket,
            steps_per_bucket: steps_per_bucket.max(1),
            last_steps: None,
            reported_unavailable: false,
        }
    }
}

impl SmileDriver for ActivitySmile {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn on_tick(&mut self, _state: &mut ExpressionState) {}

    fn on_activity(&mut self, state: &mut ExpressionState, sample: Option<ActivitySample>) {
        let Some(sample) = sample else {
            if !self.reported_unavailable {
                log::warn!("Activity data unavailable, smile stays neutral");
                self.reported_unavailable = true;
            }
            self.last_steps = None;
            state.set_smile_phase(0.0);
            return;
        };

        if self.last_steps == Some(sample.steps) {
            return;
        }
        self.last_steps = Some(sample.steps);
        self.reported_unavailable = false;

        if sample.steps > sample.average_steps {
            let buckets = sample.surplus() / self.steps_per_bucket;
            state.set_smile_phase(state.smile_phase + self.phase_per_bucket * buckets as f32);
        } else {
            state.set_smile_phase(0.0);
        }
        log::debug!(
            "activity {} / {} steps, smile phase {:.2}",
            sample.steps,
            sample.average_steps,
            state.smile_phase
        );
    }
}

/// Blink timing plus the active smile strategy.
pub struct ExpressionEngine {
    blink: BlinkTiming,
    smile: Box<dyn SmileDriver>,
}

impl ExpressionEngine {
    pub fn new(blink: BlinkTiming, smile: Box<dyn SmileDriver>) -> Self {
        Self { blink, smile }
    }

    pub fn from_config(expression: &ExpressionConfig, activity: &ActivityConfig) -> Self {
        let blink = BlinkTiming {
            interval_ticks: expression.blink_interval_ticks,
            duration_ticks: expression.blink_duration_ticks,
        };
        let smile: Box<dyn SmileDriver> = match expression.smile_policy {
            SmilePolicy::Timer => Box::new(TimedSmile {
                interval_ticks: expression.smile_interval_ticks,
                step: expression.smile_step,
                hold_ticks: expression.smile_hold_ticks,
            }),
            SmilePolicy::Activity => Box::new(ActivitySmile::new(
                activity.phase_per_bucket,
                activity.steps_per_bucket,
            )),
        };
        Self::new(blink, smile)
    }

    pub fn policy_name(&self) -> &'static str {
        self.smile.name()
    }

    /// Advance one animation tick.
    pub fn tick(&mut self, state: &mut ExpressionState) {
        self.blink.advance(state);
        self.smile.on_tick(state);
    }

    pub fn observe_activity(&mut self, state: &mut ExpressionState, sample: Option<ActivitySample>) {
        self.smile.on_activity(state, sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn timed(interval_ticks: u32, step: f32, hold_ticks: u32) -> ExpressionEngine {
        ExpressionEngine::new(
            BlinkTiming {
                interval_ticks: 10,
                duration_ticks: 3,
            },
            Box::new(TimedSmile {
                interval_ticks,
                step,
                hold_ticks,
            }),
        )
    }

    fn activity() -> ExpressionEngine {
        let config = Config::default();
        let mut expression = config.expression.clone();
        expression.smile_policy = SmilePolicy::Activity;
        ExpressionEngine::from_config(&expression, &config.activity)
    }

    #[test]
    fn test_phase_stays_clamped_under_ticking() {
        let mut engine = timed(5, 0.3, 2);
        let mut state = ExpressionState::neutral();
        for _ in 0..10_000 {
            engine.tick(&mut state);
            assert!((0.0..=1.0).contains(&state.smile_phase));
        }
    }

    #[test]
    fn test_set_smile_phase_clamps() {
        let mut state = ExpressionState::neutral();
        state.set_smile_phase(3.0);
        assert_eq!(state.smile_phase, 1.0);
        state.set_smile_phase(-0.5);
        assert_eq!(state.smile_phase, 0.0);
        state.set_smile_phase(f32::NAN);
        assert_eq!(state.smile_phase, 0.0);
    }

    #[test]
    fn test_smile_rises_to_full_in_bounded_ticks() {
        let step = 0.05;
        let mut engine = timed(4, step, 100);
        let mut state = ExpressionState::neutral();

        for _ in 0..3 {
            engine.tick(&mut state);
            assert!(!state.is_smiling);
            assert_eq!(state.smile_phase, 0.0);
        }

        // Threshold tick starts the rise
        engine.tick(&mut state);
        assert!(state.is_smiling);
        let mut ticks = 1;
        let mut previous = state.smile_phase;
        assert!(previous > 0.0);

        while state.smile_phase < 1.0 {
            engine.tick(&mut state);
            ticks += 1;
            assert!(state.smile_phase > previous, "phase must rise monotonically");
            previous = state.smile_phase;
            assert!(ticks <= 20);
        }
        assert_eq!(ticks, (1.0 / step).ceil() as u32);
        assert_eq!(state.smile_stage(), SmileStage::Held);
    }

    #[test]
    fn test_smile_holds_then_falls_to_neutral() {
        let mut engine = timed(1, 0.5, 3);
        let mut state = ExpressionState::neutral();

        engine.tick(&mut state); // rise to 0.5
        engine.tick(&mut state); // rise to 1.0
        assert_eq!(state.smile_stage(), SmileStage::Held);

        engine.tick(&mut state);
        engine.tick(&mut state);
        assert_eq!(state.smile_stage(), SmileStage::Held);
        engine.tick(&mut state);
        assert!(!state.is_smiling);
        assert_eq!(state.smile_stage(), SmileStage::Falling);
        assert_eq!(state.smile_hold_timer, 0);

        engine.tick(&mut state);
        assert_eq!(state.smile_phase, 0.5);
        engine.tick(&mut state);
        assert_eq!(state.smile_phase, 0.0);
        assert_eq!(state.smile_stage(), SmileStage::Neutral);
    }

    #[test]
    fn test_blink_opens_after_duration() {
        let mut engine = timed(u32::MAX, 0.05, 1);
        let mut state = ExpressionState::neutral();

        for _ in 0..9 {
            engine.tick(&mut state);
            assert!(!state.is_blinking);
        }
        engine.tick(&mut state);
        assert!(state.is_blinking);
        assert_eq!(state.blink_timer, 0);

        engine.tick(&mut state);
        engine.tick(&mut state);
        assert!(state.is_blinking);
        engine.tick(&mut state);
        assert!(!state.is_blinking);
    }

    #[test]
    fn test_blink_waits_for_smile() {
        let mut engine = timed(1, 0.01, 1000);
        let mut state = ExpressionState::neutral();

        for _ in 0..50 {
            engine.tick(&mut state);
            assert!(state.is_smiling);
            assert!(!state.is_blinking);
        }
        assert!(state.blink_timer >= 10);
    }

    #[test]
    fn test_activity_policy_grows_and_resets() {
        let mut engine = activity();
        let mut state = ExpressionState::neutral();
        assert_eq!(engine.policy_name(), "activity");

        engine.observe_activity(&mut state, Some(ActivitySample::new(1030, 1000)));
        assert!((state.smile_phase - 0.3).abs() < 1e-6);
        assert!(!state.is_smiling);

        // Unchanged step count is ignored
        engine.observe_activity(&mut state, Some(ActivitySample::new(1030, 1000)));
        assert!((state.smile_phase - 0.3).abs() < 1e-6);

        engine.observe_activity(&mut state, Some(ActivitySample::new(2000, 1000)));
        assert_eq!(state.smile_phase, 1.0);

        engine.observe_activity(&mut state, Some(ActivitySample::new(900, 1000)));
        assert_eq!(state.smile_phase, 0.0);
        assert!(!state.is_smiling);
    }

    #[test]
    fn test_activity_unavailable_is_neutral() {
        let mut engine = activity();
        let mut state = ExpressionState::neutral();
        engine.observe_activity(&mut state, Some(ActivitySample::new(1500, 1000)));
        engine.observe_activity(&mut state, None);
        assert_eq!(state.smile_phase, 0.0);
        assert!(!state.is_smiling);

        // Ticking never moves the phase under the activity policy
        for _ in 0..1000 {
            engine.tick(&mut state);
        }
        assert_eq!(state.smile_phase, 0.0);
    }

    #[test]
    fn test_activity_smile_keeps_blinking() {
        let config = Config::default();
        let mut engine = activity();
        let mut state = ExpressionState::neutral();
        engine.observe_activity(&mut state, Some(ActivitySample::new(1020, 1000)));
        assert!(state.smile_phase > 0.0);

        let mut blinks = 0;
        for _ in 0..config.expression.blink_interval_ticks * 4 {
            let was_blinking = state.is_blinking;
            engine.tick(&mut state);
            if state.is_blinking && !was_blinking {
                blinks += 1;
            }
        }
        assert_eq!(blinks, 4);
        assert!(!state.is_smiling);
        assert!((state.smile_phase - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_timed_policy_ignores_activity() {
        let mut engine = timed(100, 0.05, 10);
        let mut state = ExpressionState::neutral();
        engine.observe_activity(&mut state, Some(ActivitySample::new(5000, 10)));
        assert_eq!(state, ExpressionState::neutral());
        assert_eq!(engine.policy_name(), "timer");
    }
}
