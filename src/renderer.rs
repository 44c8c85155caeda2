//! # Procedural Face Rendering
//!
//! This module turns the expression state into draw operations. Nothing is loaded
//! from assets: every feature is an arc, line, circle or rounded rectangle whose
//! geometry is computed from the screen center and the current smile phase.
//!
//! ## Features
//!
//! Each paired feature is drawn once per [`Side`] from a single parameterized
//! routine, mirroring angles and offsets for the left and right halves of the face.
//!
//! | Feature      | Primitives                                   | Moves with smile |
//! |--------------|----------------------------------------------|------------------|
//! | Eye          | radial fills, lid arc, lid tick (or a line)  | closes to an arc |
//! | Lashes       | two short lines                              | yes              |
//! | Cheek        | rounded rectangle                            | lifts slightly   |
//! | Brow         | thick arc                                    | yes              |
//! | Mouth        | main arc plus a thin highlight arc           | widens and lifts |
//! | Nose         | three offset circles                         | no               |
//! | Dark circles | arc under each brow (only when sad)          | no               |
//! | Hands        | shadow line under a colored line             | no               |
//!
//! ## Determinism
//!
//! Rendering is a pure function: the same (state, geometry, clock) always yields
//! the same [`DrawList`]. At `smile_phase == 0` brows and mouth use exactly the
//! neutral spans below, and at `smile_phase == 1` exactly the smile spans.

use crate::{
    config::{Config, HandsConfig},
    draw::{DrawList, DrawOp},
    expression::ExpressionState,
    geometry::{hour_angle, lerp, minute_angle, point_on_circle, Geometry, Turn},
    palette::{CORAL, DARK_GRAY, FROSTED_BLUE, YELLOW},
    BatteryState, ClockSample,
};
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::{Point, Size},
};

/// Clockwise arc span in degrees, with 0° at 12 o'clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSpan {
    pub start: f32,
    pub end: f32,
}

impl ArcSpan {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Interpolate both ends towards `to`.
    pub fn lerp(self, to: ArcSpan, t: f32) -> ArcSpan {
        ArcSpan {
            start: lerp(self.start, to.start, t),
            end: lerp(self.end, to.end, t),
        }
    }

    pub fn start_turn(self) -> Turn {
        Turn::from_degrees(self.start)
    }

    pub fn end_turn(self) -> Turn {
        Turn::from_degrees(self.end)
    }
}

/// Which half of the face a feature belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// -1 for left, +1 for right.
    pub fn sign(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }

    fn pick<T>(self, left: T, right: T) -> T {
        match self {
            Side::Left => left,
            Side::Right => right,
        }
    }
}

pub const BROW_NEUTRAL_LEFT: ArcSpan = ArcSpan::new(40.0, 60.0);
pub const BROW_NEUTRAL_RIGHT: ArcSpan = ArcSpan::new(-60.0, -40.0);
pub const BROW_SMILE_LEFT: ArcSpan = ArcSpan::new(-30.0, -10.0);
pub const BROW_SMILE_RIGHT: ArcSpan = ArcSpan::new(10.0, 30.0);

pub const MOUTH_NEUTRAL: ArcSpan = ArcSpan::new(-230.0, -130.0);
pub const MOUTH_SMILE: ArcSpan = ArcSpan::new(-250.0, -110.0);
// The highlight narrows and slides left as the smile grows
pub const MOUTH_HIGHLIGHT_NEUTRAL: ArcSpan = ArcSpan::new(-185.0, -170.0);
pub const MOUTH_HIGHLIGHT_SMILE: ArcSpan = ArcSpan::new(-215.0, -205.0);

/// Upper half circle used by eye whites and lids.
pub const EYE_LID: ArcSpan = ArcSpan::new(-90.0, 90.0);
/// Lower slice of the pupil circles, which sit above the eye center.
pub const PUPIL: ArcSpan = ArcSpan::new(-255.0, -115.0);

const EYE_RADIUS: u32 = 20;
const PUPIL_OUTER_RADIUS: u32 = 17;
const PUPIL_INNER_RADIUS: u32 = 13;
const PUPIL_RISE: i32 = 20;
const RADIAL_INSET: u32 = 30;
const LID_WIDTH: u32 = 6;
const BLINK_HALF_WIDTH: i32 = 15;

const LASH_WIDTH: u32 = 4;
/// Lash endpoints as (dx, dy) from the eye center: [start, end] for two lashes.
/// Neutral x offsets are mirrored by side; smile offsets are per side.
const LASH_NEUTRAL: [(i32, i32); 4] = [(11, 7), (13, 12), (18, 7), (20, 11)];
const LASH_SMILE_LEFT: [(i32, i32); 4] = [(2, 7), (-7, 20), (-9, 7), (-19, 20)];
const LASH_SMILE_RIGHT: [(i32, i32); 4] = [(8, 7), (-1, 20), (-3, 7), (-13, 20)];

const CHEEK_SIZE: Size = Size::new(35, 20);
const CHEEK_CORNER: u32 = 20;
const CHEEK_LIFT: f32 = 3.0;

const BROW_RADIUS: u32 = 22;
const BROW_WIDTH: u32 = 10;

const MOUTH_RADIUS: u32 = 25;
const MOUTH_WIDTH: u32 = 6;
const MOUTH_HIGHLIGHT_RADIUS: u32 = 32;
const MOUTH_HIGHLIGHT_WIDTH: u32 = 2;
const MOUTH_LIFT: f32 = 3.0;

const NOSE_RADIUS: u32 = 10;
const NOSE_WIDTH: u32 = 5;

const DARK_CIRCLE_RADIUS: u32 = 22;
const DARK_CIRCLE_WIDTH: u32 = 5;

const HAND_SHADOW_WIDTH: u32 = 9;
const HAND_WIDTH: u32 = 5;

const BATTERY_SIZE: Size = Size::new(22, 10);
const BATTERY_CAP_SIZE: Size = Size::new(2, 6);
/// Battery gauge frame: 25x10 placed 31 px from the right edge, 5 px from the top.
const BATTERY_FRAME_SIZE: Size = Size::new(25, 10);
const BATTERY_FRAME_RIGHT: i32 = 31;
const BATTERY_FRAME_TOP: i32 = 5;

/// Truncated pixel offset for a fractional amount.
fn offset(amount: f32, phase: f32) -> i32 {
    (amount * phase) as i32
}

/// Stateless face renderer holding only fixed layout parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRenderer {
    hands: HandsConfig,
    sad_phase: f32,
}

impl FaceRenderer {
    pub fn new(hands: HandsConfig, sad_phase: f32) -> Self {
        Self {
            hands,
            sad_phase: sad_phase.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.hands.clone(), config.expression.sad_phase)
    }

    /// Face layer: features in back-to-front order, then the hands when a
    /// clock sample is given.
    pub fn render_face(
        &self,
        state: &ExpressionState,
        geometry: &Geometry,
        clock: Option<ClockSample>,
    ) -> DrawList {
        let mut list = DrawList::with_capacity(32);
        let phase = state.smile_phase.clamp(0.0, 1.0);

        for side in Side::BOTH {
            eye(&mut list, geometry, state, side);
        }
        for side in Side::BOTH {
            cheek(&mut list, geometry, phase, side);
        }
        if !state.is_blinking {
            for side in Side::BOTH {
                lashes(&mut list, geometry, phase, side);
            }
        }
        for side in Side::BOTH {
            brow(&mut list, geometry, phase, side);
        }
        mouth(&mut list, geometry, phase, self.sad_phase);
        nose(&mut list, geometry);
        if self.sad_phase > 0.0 {
            for side in Side::BOTH {
                dark_circle(&mut list, geometry, self.sad_phase, side);
            }
        }

        if let Some(clock) = clock {
            hand(
                &mut list,
                geometry,
                minute_angle(clock.minute()),
                &self.hands,
                self.hands.minute_length,
                CORAL,
            );
            hand(
                &mut list,
                geometry,
                hour_angle(clock.hour(), clock.minute()),
                &self.hands,
                self.hands.hour_length,
                YELLOW,
            );
        }

        list
    }

    /// Battery layer, drawn above the face in the top-right corner.
    pub fn render_battery(&self, battery: &BatteryState, geometry: &Geometry) -> DrawList {
        let mut list = DrawList::with_capacity(3);
        let frame = Point::new(
            geometry.bounds.width as i32 - BATTERY_FRAME_RIGHT,
            BATTERY_FRAME_TOP,
        );
        let origin = frame
            + Point::new(
                (BATTERY_FRAME_SIZE.width as i32
                    - BATTERY_SIZE.width as i32
                    - BATTERY_CAP_SIZE.width as i32)
                    / 2,
                (BATTERY_FRAME_SIZE.height as i32 - BATTERY_SIZE.height as i32) / 2,
            );

        let percent = u32::from(battery.percent.min(100));
        let fill_width = percent * BATTERY_SIZE.width / 100;
        if fill_width > 2 {
            list.push(DrawOp::FillRect {
                origin: origin + Point::new(1, 1),
                size: Size::new(fill_width - 2, BATTERY_SIZE.height - 2),
                corner_radius: 0,
                color: battery_color(battery.percent),
            });
        }

        list.push(DrawOp::StrokeRect {
            origin,
            size: BATTERY_SIZE,
            width: 2,
            color: DARK_GRAY,
        });
        list.push(DrawOp::FillRect {
            origin: origin + Point::new(BATTERY_SIZE.width as i32, 2),
            size: BATTERY_CAP_SIZE,
            corner_radius: 0,
            color: DARK_GRAY,
        });

        list
    }

    /// Face layer followed by the battery layer.
    pub fn render_frame(
        &self,
        state: &ExpressionState,
        battery: &BatteryState,
        geometry: &Geometry,
        clock: Option<ClockSample>,
    ) -> DrawList {
        let mut frame = self.render_face(state, geometry, clock);
        frame.append(self.render_battery(battery, geometry));
        frame
    }
}

/// Gauge fill color by charge level.
pub fn battery_color(percent: u8) -> Rgb888 {
    match percent {
        70.. => DARK_GRAY,
        40..=69 => YELLOW,
        _ => CORAL,
    }
}

fn eye_center(geometry: &Geometry, side: Side) -> Point {
    let c = geometry.center;
    Point::new(
        c.x + side.sign() * (c.x / 2 - 1),
        c.y - c.y / 4 + 1,
    )
}

fn eye(list: &mut DrawList, geometry: &Geometry, state: &ExpressionState, side: Side) {
    let base = eye_center(geometry, side);

    if state.is_blinking {
        list.push(DrawOp::Line {
            from: base - Point::new(BLINK_HALF_WIDTH, 0),
            to: base + Point::new(BLINK_HALF_WIDTH, 0),
            width: LID_WIDTH,
            color: DARK_GRAY,
        });
        return;
    }

    let lid = DrawOp::Arc {
        center: base,
        radius: EYE_RADIUS,
        start: EYE_LID.start_turn(),
        end: EYE_LID.end_turn(),
        width: LID_WIDTH,
        color: DARK_GRAY,
    };

    if state.is_smiling {
        // Closed, happy eye
        list.push(lid);
        return;
    }

    list.push(DrawOp::Radial {
        center: base,
        radius: EYE_RADIUS,
        inset: RADIAL_INSET,
        start: EYE_LID.start_turn(),
        end: EYE_LID.end_turn(),
        color: FROSTED_BLUE,
    });
    let pupil_center = base - Point::new(0, PUPIL_RISE);
    for (radius, color) in [(PUPIL_OUTER_RADIUS, CORAL), (PUPIL_INNER_RADIUS, YELLOW)] {
        list.push(DrawOp::Radial {
            center: pupil_center,
            radius,
            inset: RADIAL_INSET,
            start: PUPIL.start_turn(),
            end: PUPIL.end_turn(),
            color,
        });
    }
    list.push(lid);
    list.push(DrawOp::Line {
        from: base + Point::new(10 * side.sign(), 0),
        to: base + Point::new(19 * side.sign(), 0),
        width: LID_WIDTH,
        color: DARK_GRAY,
    });
}

fn lashes(list: &mut DrawList, geometry: &Geometry, phase: f32, side: Side) {
    let base = eye_center(geometry, side);
    let smile = side.pick(LASH_SMILE_LEFT, LASH_SMILE_RIGHT);

    let endpoint = |index: usize| {
        let (nx, ny) = LASH_NEUTRAL[index];
        let (sx, sy) = smile[index];
        let x = (1.0 - phase) * (nx * side.sign()) as f32 + phase * sx as f32;
        let y = (1.0 - phase) * ny as f32 + phase * sy as f32;
        base + Point::new(x as i32, y as i32)
    };

    for lash in 0..2 {
        list.push(DrawOp::Line {
            from: endpoint(lash * 2),
            to: endpoint(lash * 2 + 1),
            width: LASH_WIDTH,
            color: DARK_GRAY,
        });
    }
}

fn cheek(list: &mut DrawList, geometry: &Geometry, phase: f32, side: Side) {
    let c = geometry.center;
    let offset_x = side.sign() * (c.x / 2 + side.pick(18, -14));
    list.push(DrawOp::FillRect {
        origin: Point::new(c.x + offset_x, c.y - 5 - offset(CHEEK_LIFT, phase)),
        size: CHEEK_SIZE,
        corner_radius: CHEEK_CORNER,
        color: CORAL,
    });
}

/// Brow spans for one side: (neutral, full smile).
pub fn brow_spans(side: Side) -> (ArcSpan, ArcSpan) {
    side.pick(
        (BROW_NEUTRAL_LEFT, BROW_SMILE_LEFT),
        (BROW_NEUTRAL_RIGHT, BROW_SMILE_RIGHT),
    )
}

fn brow(list: &mut DrawList, geometry: &Geometry, phase: f32, side: Side) {
    let c = geometry.center;
    let corner = Point::new(
        c.x + side.sign() * (c.x / 2 - side.pick(0, 4)) - 20,
        c.y - c.y / 4 + 1 - 35,
    );
    let (neutral, smile) = brow_spans(side);
    let span = neutral.lerp(smile, phase);

    list.push(DrawOp::Arc {
        center: corner + Point::new(BROW_RADIUS as i32, BROW_RADIUS as i32),
        radius: BROW_RADIUS,
        start: span.start_turn(),
        end: span.end_turn(),
        width: BROW_WIDTH,
        color: YELLOW,
    });
}

fn mouth(list: &mut DrawList, geometry: &Geometry, phase: f32, sad_phase: f32) {
    let c = geometry.center;
    let center = Point::new(c.x + 1, c.y + 10 - offset(MOUTH_LIFT, phase));

    let mut span = MOUTH_NEUTRAL.lerp(MOUTH_SMILE, phase);
    if sad_phase > 0.0 {
        span.start += 10.0 * sad_phase;
        span.end -= 60.0 * sad_phase;
    }
    list.push(DrawOp::Arc {
        center,
        radius: MOUTH_RADIUS,
        start: span.start_turn(),
        end: span.end_turn(),
        width: MOUTH_WIDTH,
        color: DARK_GRAY,
    });

    let highlight = MOUTH_HIGHLIGHT_NEUTRAL.lerp(MOUTH_HIGHLIGHT_SMILE, phase);
    list.push(DrawOp::Arc {
        center,
        radius: MOUTH_HIGHLIGHT_RADIUS,
        start: highlight.start_turn(),
        end: highlight.end_turn(),
        width: MOUTH_HIGHLIGHT_WIDTH,
        color: DARK_GRAY,
    });
}

fn nose(list: &mut DrawList, geometry: &Geometry) {
    let c = geometry.center;
    let layers = [
        (Point::new(1, 3), FROSTED_BLUE),
        (Point::new(2, -2), CORAL),
        (Point::zero(), DARK_GRAY),
    ];
    for (shift, color) in layers {
        list.push(DrawOp::Circle {
            center: c + shift,
            radius: NOSE_RADIUS,
            width: NOSE_WIDTH,
            color,
        });
    }
}

fn dark_circle(list: &mut DrawList, geometry: &Geometry, sad_phase: f32, side: Side) {
    let c = geometry.center;
    let corner = Point::new(
        c.x + side.sign() * (c.x / 2 - side.pick(10, 6)) - 24,
        c.y - c.y / 4 - 32,
    );
    let span = side.pick(
        ArcSpan::new(145.0, 145.0 + 25.0 * sad_phase),
        ArcSpan::new(215.0 - 25.0 * sad_phase, 215.0),
    );
    list.push(DrawOp::Arc {
        center: corner + Point::new(DARK_CIRCLE_RADIUS as i32, DARK_CIRCLE_RADIUS as i32),
        radius: DARK_CIRCLE_RADIUS,
        start: span.start_turn(),
        end: span.end_turn(),
        width: DARK_CIRCLE_WIDTH,
        color: DARK_GRAY,
    });
}

fn hand(
    list: &mut DrawList,
    geometry: &Geometry,
    angle: Turn,
    hands: &HandsConfig,
    length: u32,
    color: Rgb888,
) {
    let from = point_on_circle(geometry.center, hands.inner_radius, angle);
    let to = point_on_circle(geometry.center, length, angle);

    list.push(DrawOp::Line {
        from,
        to,
        width: HAND_SHADOW_WIDTH,
        color: DARK_GRAY,
    });
    list.push(DrawOp::Line {
        from,
        to,
        width: HAND_WIDTH,
        color,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> Geometry {
        Geometry::from_bounds(Size::new(144, 168)).unwrap()
    }

    fn renderer() -> FaceRenderer {
        FaceRenderer::from_config(&Config::default())
    }

    fn state(phase: f32, smiling: bool, blinking: bool) -> ExpressionState {
        ExpressionState {
            smile_phase: phase,
            is_smiling: smiling,
            is_blinking: blinking,
            ..ExpressionState::neutral()
        }
    }

    fn arc_span(op: &DrawOp) -> (Turn, Turn) {
        match *op {
            DrawOp::Arc { start, end, .. } => (start, end),
            other => panic!("expected an arc, got {other:?}"),
        }
    }

    fn single<F: FnOnce(&mut DrawList)>(draw: F) -> DrawList {
        let mut list = DrawList::new();
        draw(&mut list);
        list
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = renderer();
        let state = state(0.35, true, false);
        let clock = Some(ClockSample::new(10, 8));
        let first = renderer.render_frame(&state, &BatteryState::new(55, false), &geometry(), clock);
        let second = renderer.render_frame(&state, &BatteryState::new(55, false), &geometry(), clock);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_neutral_phase_matches_neutral_constants() {
        let g = geometry();
        for side in Side::BOTH {
            let list = single(|list| brow(list, &g, 0.0, side));
            let (neutral, _) = brow_spans(side);
            assert_eq!(arc_span(&list.ops()[0]), (neutral.start_turn(), neutral.end_turn()));
        }

        let list = single(|list| mouth(list, &g, 0.0, 0.0));
        assert_eq!(
            arc_span(&list.ops()[0]),
            (MOUTH_NEUTRAL.start_turn(), MOUTH_NEUTRAL.end_turn())
        );
        assert_eq!(
            arc_span(&list.ops()[1]),
            (MOUTH_HIGHLIGHT_NEUTRAL.start_turn(), MOUTH_HIGHLIGHT_NEUTRAL.end_turn())
        );
    }

    #[test]
    fn test_full_smile_matches_smile_constants() {
        let g = geometry();
        for side in Side::BOTH {
            let list = single(|list| brow(list, &g, 1.0, side));
            let (_, smile) = brow_spans(side);
            assert_eq!(arc_span(&list.ops()[0]), (smile.start_turn(), smile.end_turn()));
        }

        let list = single(|list| mouth(list, &g, 1.0, 0.0));
        assert_eq!(
            arc_span(&list.ops()[0]),
            (MOUTH_SMILE.start_turn(), MOUTH_SMILE.end_turn())
        );
        assert_eq!(
            arc_span(&list.ops()[1]),
            (MOUTH_HIGHLIGHT_SMILE.start_turn(), MOUTH_HIGHLIGHT_SMILE.end_turn())
        );
    }

    #[test]
    fn test_mouth_lifts_and_widens_with_smile() {
        let g = geometry();
        let neutral = single(|list| mouth(list, &g, 0.0, 0.0));
        let smiling = single(|list| mouth(list, &g, 1.0, 0.0));

        let (center_neutral, span_neutral) = match neutral.ops()[0] {
            DrawOp::Arc { center, start, end, .. } => (center, start.sweep_to(end)),
            _ => unreachable!(),
        };
        let (center_smile, span_smile) = match smiling.ops()[0] {
            DrawOp::Arc { center, start, end, .. } => (center, start.sweep_to(end)),
            _ => unreachable!(),
        };
        assert!(center_smile.y < center_neutral.y);
        assert!(span_smile > span_neutral);
    }

    #[test]
    fn test_blink_reduces_eye_to_single_line() {
        let g = geometry();
        for phase in [0.0, 0.5, 1.0] {
            for smiling in [false, true] {
                let s = state(phase, smiling, true);
                for side in Side::BOTH {
                    let list = single(|list| eye(list, &g, &s, side));
                    assert_eq!(list.len(), 1);
                    assert!(list.ops()[0].is_line());
                }
            }
        }
    }

    #[test]
    fn test_open_and_smiling_eyes() {
        let g = geometry();
        let open = single(|list| eye(list, &g, &state(0.0, false, false), Side::Left));
        assert_eq!(open.len(), 5);
        assert!(matches!(open.ops()[0], DrawOp::Radial { color, .. } if color == FROSTED_BLUE));

        let happy = single(|list| eye(list, &g, &state(0.4, true, false), Side::Left));
        assert_eq!(happy.len(), 1);
        assert!(matches!(happy.ops()[0], DrawOp::Arc { .. }));
    }

    #[test]
    fn test_step_smile_keeps_eyes_open() {
        use crate::config::SmilePolicy;
        use crate::expression::ExpressionEngine;
        use crate::ActivitySample;

        let mut config = Config::default();
        config.expression.smile_policy = SmilePolicy::Activity;
        let mut engine = ExpressionEngine::from_config(&config.expression, &config.activity);
        let mut state = ExpressionState::neutral();
        engine.observe_activity(&mut state, Some(ActivitySample::new(1020, 1000)));

        let mut blinked = false;
        for _ in 0..config.expression.blink_interval_ticks + 1 {
            engine.tick(&mut state);
            blinked |= state.is_blinking;
        }
        assert!(blinked);
        while state.is_blinking {
            engine.tick(&mut state);
        }

        let g = geometry();
        for side in Side::BOTH {
            let list = single(|list| eye(list, &g, &state, side));
            let radials = list
                .iter()
                .filter(|op| matches!(op, DrawOp::Radial { .. }))
                .count();
            assert_eq!(radials, 3);
        }
    }

    #[test]
    fn test_lid_tick_points_outward() {
        let g = geometry();
        let s = state(0.0, false, false);
        for side in Side::BOTH {
            let list = single(|list| eye(list, &g, &s, side));
            let base = eye_center(&g, side);
            match list.ops()[4] {
                DrawOp::Line { from, to, .. } => {
                    assert_eq!(from, base + Point::new(10 * side.sign(), 0));
                    assert_eq!(to, base + Point::new(19 * side.sign(), 0));
                }
                other => panic!("expected lid tick, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_features_mirror_around_center() {
        let g = geometry();
        let left = eye_center(&g, Side::Left);
        let right = eye_center(&g, Side::Right);
        assert_eq!(left.y, right.y);
        assert_eq!(g.center.x - left.x, right.x - g.center.x);
    }

    #[test]
    fn test_hands_at_three_oclock() {
        let renderer = renderer();
        let g = geometry();
        let face = renderer.render_face(&state(0.0, false, false), &g, Some(ClockSample::new(3, 0)));
        let hands: Vec<_> = face.ops()[face.len() - 4..].to_vec();
        let c = g.center;

        // Minute hand: shadow then coral, pointing at 12
        assert_eq!(
            hands[0],
            DrawOp::Line {
                from: Point::new(c.x, c.y - 20),
                to: Point::new(c.x, c.y - 55),
                width: 9,
                color: DARK_GRAY,
            }
        );
        assert_eq!(hands[1].color(), CORAL);
        // Hour hand: quarter turn
        assert_eq!(
            hands[3],
            DrawOp::Line {
                from: Point::new(c.x + 20, c.y),
                to: Point::new(c.x + 45, c.y),
                width: 5,
                color: YELLOW,
            }
        );
    }

    #[test]
    fn test_no_clock_no_hands() {
        let renderer = renderer();
        let g = geometry();
        let s = state(0.0, false, false);
        let with = renderer.render_face(&s, &g, Some(ClockSample::new(7, 41)));
        let without = renderer.render_face(&s, &g, None);
        assert_eq!(with.len(), without.len() + 4);
    }

    #[test]
    fn test_face_draw_order() {
        let renderer = renderer();
        let face = renderer.render_face(&state(0.0, false, false), &geometry(), None);
        // 2 eyes x 5, 2 cheeks, 2 x 2 lashes, 2 brows, 2 mouth arcs, 3 nose circles
        assert_eq!(face.len(), 10 + 2 + 4 + 2 + 2 + 3);
        assert!(matches!(face.ops()[10], DrawOp::FillRect { color, .. } if color == CORAL));
        assert!(matches!(face.ops().last(), Some(DrawOp::Circle { color, .. }) if *color == DARK_GRAY));
    }

    #[test]
    fn test_sad_phase_adds_dark_circles() {
        let mut config = Config::default();
        config.expression.sad_phase = 0.5;
        let sad = FaceRenderer::from_config(&config);
        let s = state(0.0, false, false);
        let g = geometry();

        let neutral = renderer().render_face(&s, &g, None);
        let face = sad.render_face(&s, &g, None);
        assert_eq!(face.len(), neutral.len() + 2);

        // Sadness narrows the mouth
        let mouth_sad = single(|list| mouth(list, &g, 0.0, 0.5));
        let (start, end) = arc_span(&mouth_sad.ops()[0]);
        assert_eq!(start, Turn::from_degrees(-225.0));
        assert_eq!(end, Turn::from_degrees(-160.0));
    }

    #[test]
    fn test_cheeks_lift_with_smile() {
        let g = geometry();
        let neutral = single(|list| cheek(list, &g, 0.0, Side::Right));
        let smiling = single(|list| cheek(list, &g, 1.0, Side::Right));
        match (neutral.ops()[0], smiling.ops()[0]) {
            (DrawOp::FillRect { origin: a, .. }, DrawOp::FillRect { origin: b, .. }) => {
                assert_eq!(a.x, b.x);
                assert_eq!(a.y - b.y, 3);
            }
            _ => panic!("cheeks are rounded rectangles"),
        }
    }

    #[test]
    fn test_lashes_follow_smile_tables() {
        let g = geometry();
        let base = eye_center(&g, Side::Left);
        let neutral = single(|list| lashes(list, &g, 0.0, Side::Left));
        assert_eq!(
            neutral.ops()[0],
            DrawOp::Line {
                from: base + Point::new(-11, 7),
                to: base + Point::new(-13, 12),
                width: LASH_WIDTH,
                color: DARK_GRAY,
            }
        );
        let smiling = single(|list| lashes(list, &g, 1.0, Side::Left));
        assert_eq!(
            smiling.ops()[1],
            DrawOp::Line {
                from: base + Point::new(-9, 7),
                to: base + Point::new(-19, 20),
                width: LASH_WIDTH,
                color: DARK_GRAY,
            }
        );
    }

    #[test]
    fn test_battery_gauge_levels() {
        let renderer = renderer();
        let g = geometry();

        let full = renderer.render_battery(&BatteryState::new(100, false), &g);
        assert_eq!(full.len(), 3);
        assert_eq!(
            full.ops()[0],
            DrawOp::FillRect {
                origin: Point::new(144 - 31 + 1, 6),
                size: Size::new(20, 8),
                corner_radius: 0,
                color: DARK_GRAY,
            }
        );

        let half = renderer.render_battery(&BatteryState::new(50, true), &g);
        assert_eq!(half.ops()[0].color(), YELLOW);

        let low = renderer.render_battery(&BatteryState::new(30, false), &g);
        assert_eq!(low.ops()[0].color(), CORAL);

        // 22 * 10 / 100 = 2 px is too narrow to fill
        let empty = renderer.render_battery(&BatteryState::new(10, false), &g);
        assert_eq!(empty.len(), 2);
        assert!(matches!(empty.ops()[0], DrawOp::StrokeRect { .. }));
    }

    #[test]
    fn test_battery_color_thresholds() {
        assert_eq!(battery_color(100), DARK_GRAY);
        assert_eq!(battery_color(70), DARK_GRAY);
        assert_eq!(battery_color(69), YELLOW);
        assert_eq!(battery_color(40), YELLOW);
        assert_eq!(battery_color(39), CORAL);
        assert_eq!(battery_color(0), CORAL);
    }
}
