//! # Face Geometry
//!
//! Screen-space helpers shared by the renderer: the face center, angles stored as
//! turn fractions, and polar placement of points around the center.
//!
//! Angles follow watch conventions: a turn fraction of `0.0` points at 12 o'clock
//! and values increase clockwise, so `0.25` is 3 o'clock and `0.5` is 6 o'clock.

use crate::canvas::SurfaceError;
use embedded_graphics::prelude::{Point, Size};
use std::f32::consts::TAU;

/// An angle as a fraction of a full turn, normalized to `[0, 1)`.
///
/// # Example
/// ```
/// use face_watch_lib::geometry::Turn;
///
/// assert_eq!(Turn::from_degrees(-90.0), Turn::new(0.75));
/// assert_eq!(Turn::from_degrees(360.0), Turn::ZERO);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Turn(f32);

impl Turn {
    pub const ZERO: Turn = Turn(0.0);

    pub fn new(fraction: f32) -> Self {
        let wrapped = fraction.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        Turn(if wrapped >= 1.0 { 0.0 } else { wrapped })
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self::new(degrees / 360.0)
    }

    pub fn fraction(self) -> f32 {
        self.0
    }

    pub fn degrees(self) -> f32 {
        self.0 * 360.0
    }

    pub fn radians(self) -> f32 {
        self.0 * TAU
    }

    /// Clockwise distance from `self` to `end`, in `[0, 1)`.
    pub fn sweep_to(self, end: Turn) -> Turn {
        Turn::new(end.0 - self.0)
    }
}

/// Screen layout derived once from the display bounds.
///
/// All face features are positioned as offsets from `center`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub center: Point,
    pub bounds: Size,
}

impl Geometry {
    /// Derive the layout for a display of the given size.
    ///
    /// A zero-sized display has no usable surface and is rejected.
    pub fn from_bounds(bounds: Size) -> Result<Self, SurfaceError> {
        if bounds.width == 0 || bounds.height == 0 {
            return Err(SurfaceError::Empty {
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(Self {
            center: Point::new(bounds.width as i32 / 2, bounds.height as i32 / 2),
            bounds,
        })
    }
}

/// Map `value` out of `max` to a turn fraction.
///
/// Both ends of the range collapse to zero so a hand at `0` and at `max`
/// points at 12 o'clock. A zero `max` also yields zero.
pub fn hand_angle(value: u32, max: u32) -> Turn {
    if max == 0 || value == 0 || value == max {
        return Turn::ZERO;
    }
    Turn::new(value as f32 / max as f32)
}

/// Minute hand position for a clock sample.
pub fn minute_angle(minute: u8) -> Turn {
    hand_angle(u32::from(minute), 60)
}

/// Hour hand position, advancing smoothly with the minutes.
///
/// The dial is divided into 600 steps: 50 per hour plus a proportional
/// share of the current hour.
pub fn hour_angle(hour: u8, minute: u8) -> Turn {
    let hour = u32::from(hour % 12);
    let minute = u32::from(minute);
    hand_angle(hour * 50 + minute * 50 / 60, 600)
}

/// Point at `radius` pixels from `center` along `angle`.
pub fn point_on_circle(center: Point, radius: u32, angle: Turn) -> Point {
    let radians = angle.radians();
    let radius = radius as f32;
    Point::new(
        center.x + (radius * radians.sin()).round() as i32,
        center.y - (radius * radians.cos()).round() as i32,
    )
}

/// Linear interpolation between `from` and `to`.
///
/// Exact at both ends: `lerp(a, b, 0.0) == a` and `lerp(a, b, 1.0) == b`.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    if t <= 0.0 {
        from
    } else if t >= 1.0 {
        to
    } else {
        from + (to - from) * t
    }
}
