//! # Face Watch Core Library
//!
//! This library provides the animation and rendering core for an animated analog
//! watch face: a stylized face (eyes, brows, cheeks, mouth, nose) overlaid with
//! clock hands and a battery gauge.
//!
//! ## Design Philosophy
//!
//! ### Everything Is Computed
//! - **No assets**: every visual is derived from numeric parameters every frame
//! - **Pure rendering**: [`renderer::FaceRenderer::render_face`] is a function from
//!   (expression, geometry, clock) to an ordered [`draw::DrawList`]
//! - **Single writer**: all mutable state lives in one [`session::FaceSession`]
//!   and is only touched from the event loop that owns it
//!
//! ### Animation Model
//! The expression engine advances once per animation tick:
//! - **Blink**: a tick counter closes the eyes for a few ticks every ~15 seconds
//! - **Smile**: a continuous `smile_phase` in `[0, 1]` rises, holds and falls,
//!   either on a timer or driven by the day's step count
//! - **Battery**: ticks slow down to a low-power interval when the battery is low
//!   and the watch is not charging
//!
//! ### Data Flow
//! 1. **Events**: animation ticks, minute ticks and battery changes arrive as
//!    [`session::FaceEvent`] messages
//! 2. **Update**: the session advances its [`expression::ExpressionState`]
//! 3. **Render**: the renderer produces draw operations for the face and battery layers
//! 4. **Present**: the draw list is painted onto any `embedded_graphics` target
//!
//! ## Core Types
//!
//! - [`ClockSample`]: hour and minute used to place the hands
//! - [`BatteryState`]: charge percent and charging flag
//! - [`ActivitySample`]: today's step count against the rolling daily average

use chrono::Timelike;

pub mod battery;
pub mod canvas;
pub mod config;
pub mod draw;
pub mod expression;
pub mod geometry;
pub mod palette;
pub mod renderer;
pub mod runtime;
pub mod scheduler;
pub mod session;

/// Wall clock time at minute granularity.
///
/// Sampled at render time and never stored by the session. Values out of
/// range wrap around, so `ClockSample::new(25, 61)` is `01:01`.
///
/// # Example
/// ```
/// use face_watch_lib::ClockSample;
///
/// let quarter_past_three = ClockSample::new(15, 15);
/// assert_eq!(quarter_past_three.hour(), 15);
/// assert_eq!(quarter_past_three.minute(), 15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClockSample {
    hour: u8,
    minute: u8,
}

impl ClockSample {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    /// Sample the local wall clock.
    pub fn now() -> Self {
        Self::from_time(&chrono::Local::now())
    }

    pub fn from_time<T: Timelike>(time: &T) -> Self {
        // chrono guarantees hour < 24 and minute < 60
        Self::new(time.hour() as u8, time.minute() as u8)
    }

    /// Hour of day, 0 to 23.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of hour, 0 to 59.
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

/// Battery charge as reported by the battery monitor.
///
/// # Example
/// ```
/// use face_watch_lib::BatteryState;
///
/// let battery = BatteryState::new(15, false);
/// assert!(battery.is_low(20));
/// assert!(!BatteryState::new(15, true).is_low(20));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryState {
    /// Charge level, 0 to 100
    pub percent: u8,
    /// True while connected to a charger
    pub is_charging: bool,
}

impl BatteryState {
    /// Percent values above 100 are clamped.
    pub fn new(percent: u8, is_charging: bool) -> Self {
        Self {
            percent: percent.min(100),
            is_charging,
        }
    }

    /// True when the charge is at or below `threshold` and no charger is attached.
    pub fn is_low(&self, threshold: u8) -> bool {
        !self.is_charging && self.percent <= threshold
    }
}

impl Default for BatteryState {
    fn default() -> Self {
        Self::new(100, false)
    }
}

/// Step count for today against the rolling daily average.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ActivitySample {
    pub steps: u32,
    pub average_steps: u32,
}

impl ActivitySample {
    pub fn new(steps: u32, average_steps: u32) -> Self {
        Self {
            steps,
            average_steps,
        }
    }

    /// Steps above the average, or zero when at or below it.
    pub fn surplus(&self) -> u32 {
        self.steps.saturating_sub(self.average_steps)
    }
}
