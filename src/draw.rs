//! # Draw Operations
//!
//! The renderer's output: an ordered list of vector primitives with fully
//! determined geometry and color. Later operations draw on top of earlier ones.
//!
//! A [`DrawList`] is plain data, so it can be compared, logged, or painted onto
//! any `embedded_graphics` [`DrawTarget`] with [`DrawList::paint`].
//!
//! Arc angles are [`Turn`] fractions measured clockwise from 12 o'clock, and an
//! arc always runs clockwise from `start` to `end`.

use crate::geometry::Turn;
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{
        Arc, Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle,
        Sector, StrokeAlignment,
    },
};

/// A single drawing primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    /// Stroked arc along the circle of `radius` around `center`.
    Arc {
        center: Point,
        radius: u32,
        start: Turn,
        end: Turn,
        width: u32,
        color: Rgb888,
    },
    /// Filled ring segment from `radius` inward by `inset` pixels. An inset at
    /// least as large as the radius fills a pie slice.
    Radial {
        center: Point,
        radius: u32,
        inset: u32,
        start: Turn,
        end: Turn,
        color: Rgb888,
    },
    Line {
        from: Point,
        to: Point,
        width: u32,
        color: Rgb888,
    },
    /// Stroked circle outline.
    Circle {
        center: Point,
        radius: u32,
        width: u32,
        color: Rgb888,
    },
    /// Filled rectangle with rounded corners; a zero radius gives square corners.
    FillRect {
        origin: Point,
        size: Size,
        corner_radius: u32,
        color: Rgb888,
    },
    /// Rectangle outline stroked inside its bounds.
    StrokeRect {
        origin: Point,
        size: Size,
        width: u32,
        color: Rgb888,
    },
}

impl DrawOp {
    pub fn color(&self) -> Rgb888 {
        match *self {
            DrawOp::Arc { color, .. }
            | DrawOp::Radial { color, .. }
            | DrawOp::Line { color, .. }
            | DrawOp::Circle { color, .. }
            | DrawOp::FillRect { color, .. }
            | DrawOp::StrokeRect { color, .. } => color,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, DrawOp::Line { .. })
    }

    /// Paint this operation onto `target`.
    pub fn paint<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        match *self {
            DrawOp::Arc {
                center,
                radius,
                start,
                end,
                width,
                color,
            } => Arc::with_center(center, radius * 2, to_screen(start), sweep(start, end))
                .into_styled(PrimitiveStyle::with_stroke(color, width))
                .draw(target),
            DrawOp::Radial {
                center,
                radius,
                inset,
                start,
                end,
                color,
            } => {
                if inset >= radius {
                    Sector::with_center(center, radius * 2, to_screen(start), sweep(start, end))
                        .into_styled(PrimitiveStyle::with_fill(color))
                        .draw(target)
                } else {
                    // Centered stroke of `inset` width spans radius - inset ..= radius
                    Arc::with_center(center, radius * 2 - inset, to_screen(start), sweep(start, end))
                        .into_styled(PrimitiveStyle::with_stroke(color, inset))
                        .draw(target)
                }
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
            } => Line::new(from, to)
                .into_styled(PrimitiveStyle::with_stroke(color, width))
                .draw(target),
            DrawOp::Circle {
                center,
                radius,
                width,
                color,
            } => Circle::with_center(center, radius * 2)
                .into_styled(PrimitiveStyle::with_stroke(color, width))
                .draw(target),
            DrawOp::FillRect {
                origin,
                size,
                corner_radius,
                color,
            } => {
                // Corners cannot be rounder than half the shorter side
                let radius = corner_radius.min(size.width / 2).min(size.height / 2);
                RoundedRectangle::with_equal_corners(
                    Rectangle::new(origin, size),
                    Size::new(radius, radius),
                )
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(target)
            }
            DrawOp::StrokeRect {
                origin,
                size,
                width,
                color,
            } => Rectangle::new(origin, size)
                .into_styled(
                    PrimitiveStyleBuilder::new()
                        .stroke_color(color)
                        .stroke_width(width)
                        .stroke_alignment(StrokeAlignment::Inside)
                        .build(),
                )
                .draw(target),
        }
    }
}

/// Watch angles start at 12 o'clock; screen angles start at 3 o'clock.
fn to_screen(angle: Turn) -> Angle {
    Angle::from_degrees(angle.degrees() - 90.0)
}

fn sweep(start: Turn, end: Turn) -> Angle {
    Angle::from_degrees(start.sweep_to(end).degrees())
}

/// Ordered sequence of draw operations for one layer or frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Append every operation of `other`, keeping its order.
    pub fn append(&mut self, other: DrawList) {
        self.ops.extend(other.ops);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter()
    }

    /// Paint every operation in order onto `target`.
    pub fn paint<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        for op in &self.ops {
            op.paint(target)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawOp;
    type IntoIter = std::slice::Iter<'a, DrawOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
