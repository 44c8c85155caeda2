//! # Face Session
//!
//! The single owner of every piece of mutable face state. Clock, battery,
//! activity and animation events arrive as [`FaceEvent`] messages and are handled
//! to completion one at a time, so no locking is needed and a redraw never sees
//! a half-applied update.
//!
//! The session renders in two layers. The face layer holds the features and the
//! hands; the battery layer holds the gauge. Each event reports which layers it
//! made [`Dirty`], and only those are re-rendered.

use crate::{
    canvas::SurfaceError,
    config::Config,
    draw::DrawList,
    expression::{ExpressionEngine, ExpressionState},
    geometry::Geometry,
    renderer::FaceRenderer,
    ActivitySample, BatteryState, ClockSample,
};
use embedded_graphics::prelude::Size;

/// Something the host runtime delivers to the face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceEvent {
    /// The animation timer fired
    AnimationTick,
    /// The wall clock crossed a minute boundary
    ClockTick(ClockSample),
    /// The battery monitor reported a reading
    Battery(BatteryState),
    /// The activity monitor reported; `None` when unsupported
    Activity(Option<ActivitySample>),
    /// The face is being torn down
    Shutdown,
}

/// Layers that need re-rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dirty {
    pub face: bool,
    pub battery: bool,
}

impl Dirty {
    pub const NONE: Dirty = Dirty {
        face: false,
        battery: false,
    };
    pub const FACE: Dirty = Dirty {
        face: true,
        battery: false,
    };
    pub const BATTERY: Dirty = Dirty {
        face: false,
        battery: true,
    };
    pub const ALL: Dirty = Dirty {
        face: true,
        battery: true,
    };

    pub fn any(self) -> bool {
        self.face || self.battery
    }
}

impl std::ops::BitOr for Dirty {
    type Output = Dirty;

    fn bitor(self, other: Dirty) -> Dirty {
        Dirty {
            face: self.face || other.face,
            battery: self.battery || other.battery,
        }
    }
}

/// State of one displayed face, from load to unload.
pub struct FaceSession {
    geometry: Geometry,
    engine: ExpressionEngine,
    renderer: FaceRenderer,
    state: ExpressionState,
    battery: BatteryState,
    face_layer: DrawList,
    battery_layer: DrawList,
}

impl FaceSession {
    /// Load the face for the configured display.
    pub fn new(config: &Config, battery: BatteryState) -> Result<Self, SurfaceError> {
        let geometry =
            Geometry::from_bounds(Size::new(config.display.width, config.display.height))?;
        let engine = ExpressionEngine::from_config(&config.expression, &config.activity);
        log::info!(
            "Face loaded at {}x{}, smile policy {}",
            geometry.bounds.width,
            geometry.bounds.height,
            engine.policy_name()
        );

        Ok(Self {
            geometry,
            engine,
            renderer: FaceRenderer::from_config(config),
            state: ExpressionState::neutral(),
            battery,
            face_layer: DrawList::new(),
            battery_layer: DrawList::new(),
        })
    }

    pub fn state(&self) -> &ExpressionState {
        &self.state
    }

    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Return the expression to neutral, as on a face reload.
    pub fn reset(&mut self) {
        self.state = ExpressionState::neutral();
    }

    /// Apply one event and report which layers changed.
    pub fn handle(&mut self, event: FaceEvent) -> Dirty {
        match event {
            FaceEvent::AnimationTick => {
                self.engine.tick(&mut self.state);
                Dirty::FACE
            }
            FaceEvent::ClockTick(_) => Dirty::FACE,
            FaceEvent::Battery(battery) => {
                if battery == self.battery {
                    return Dirty::NONE;
                }
                log::debug!(
                    "battery {}% -> {}%, charging {}",
                    self.battery.percent,
                    battery.percent,
                    battery.is_charging
                );
                self.battery = battery;
                Dirty::BATTERY
            }
            FaceEvent::Activity(sample) => {
                let before = self.state;
                self.engine.observe_activity(&mut self.state, sample);
                if self.state == before {
                    Dirty::NONE
                } else {
                    Dirty::FACE
                }
            }
            FaceEvent::Shutdown => Dirty::NONE,
        }
    }

    /// Re-render the dirty layers and return the composed frame.
    pub fn redraw(&mut self, dirty: Dirty, clock: ClockSample) -> DrawList {
        if dirty.face {
            self.face_layer = self
                .renderer
                .render_face(&self.state, &self.geometry, Some(clock));
        }
        if dirty.battery {
            self.battery_layer = self.renderer.render_battery(&self.battery, &self.geometry);
        }

        let mut frame = self.face_layer.clone();
        frame.append(self.battery_layer.clone());
        frame
    }
}
