//! # Face Runtime
//!
//! Drives a [`FaceSession`] from a single Tokio event queue. Every producer
//! (the animation timer, the minute ticker, the battery and activity pollers,
//! the shutdown signal) only sends [`FaceEvent`] messages; the loop in
//! [`FaceRuntime::run`] is the only code that touches face state.
//!
//! ## Lifecycle
//! 1. Present a full frame and arm the first animation tick
//! 2. Handle events one at a time, re-arming after each animation tick
//! 3. Present whenever an event dirtied a layer
//! 4. On [`FaceEvent::Shutdown`], cancel the pending timer and hand the surface back

use crate::{
    battery::BatteryMonitor,
    canvas::{DisplaySurface, SurfaceError},
    config::Config,
    scheduler::{AnimationScheduler, TokioTimer},
    session::{Dirty, FaceEvent, FaceSession},
    ActivitySample, BatteryState, ClockSample,
};
use chrono::Timelike;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Event queue depth. Producers wait when the face falls this far behind.
pub const EVENT_QUEUE_SIZE: usize = 64;

pub fn event_queue() -> (mpsc::Sender<FaceEvent>, mpsc::Receiver<FaceEvent>) {
    mpsc::channel(EVENT_QUEUE_SIZE)
}

/// Where the face reads the time for the hands.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> ClockSample;

    /// Time left until the next minute boundary.
    fn until_next_minute(&self) -> Duration {
        Duration::from_secs(60)
    }
}

/// The host's local wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl ClockSource for LocalClock {
    fn now(&self) -> ClockSample {
        ClockSample::now()
    }

    fn until_next_minute(&self) -> Duration {
        let now = chrono::Local::now();
        let elapsed = Duration::new(u64::from(now.second()), now.nanosecond() % 1_000_000_000);
        Duration::from_secs(60).saturating_sub(elapsed)
    }
}

/// A clock stopped at one time.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub ClockSample);

impl ClockSource for FixedClock {
    fn now(&self) -> ClockSample {
        self.0
    }
}

/// Source of daily step counts.
pub trait ActivityMonitor: Send {
    /// `None` when the host has no step data.
    fn sample(&mut self) -> Option<ActivitySample>;
}

/// Host without a step counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoActivity;

impl ActivityMonitor for NoActivity {
    fn sample(&mut self) -> Option<ActivitySample> {
        None
    }
}

/// One loaded face bound to a display surface.
pub struct FaceRuntime<S: DisplaySurface> {
    session: FaceSession,
    scheduler: AnimationScheduler<TokioTimer>,
    sender: mpsc::Sender<FaceEvent>,
    receiver: mpsc::Receiver<FaceEvent>,
    surface: S,
    clock: Arc<dyn ClockSource>,
}

impl<S: DisplaySurface> FaceRuntime<S> {
    pub fn new(
        config: &Config,
        surface: S,
        clock: Arc<dyn ClockSource>,
        battery: BatteryState,
    ) -> Result<Self, SurfaceError> {
        let session = FaceSession::new(config, battery)?;
        let (sender, receiver) = event_queue();
        let scheduler =
            AnimationScheduler::new(TokioTimer::new(sender.clone()), config.animation.clone());

        Ok(Self {
            session,
            scheduler,
            sender,
            receiver,
            surface,
            clock,
        })
    }

    /// A handle producers use to reach this face.
    pub fn sender(&self) -> mpsc::Sender<FaceEvent> {
        self.sender.clone()
    }

    pub fn session(&self) -> &FaceSession {
        &self.session
    }

    /// Run until shutdown, then return the surface.
    pub async fn run(mut self) -> Result<S, SurfaceError> {
        self.present(Dirty::ALL)?;
        self.arm();

        while let Some(event) = self.receiver.recv().await {
            if event == FaceEvent::Shutdown {
                log::info!("Face shutting down");
                break;
            }

            let dirty = self.session.handle(event);
            if event == FaceEvent::AnimationTick {
                self.rearm();
            }
            if dirty.any() {
                self.present(dirty)?;
            }
        }

        self.scheduler.cancel();
        Ok(self.surface)
    }

    fn arm(&mut self) {
        // A stalled scheduler has already logged; minute and battery
        // events still redraw the face
        if let Ok(Some(interval)) = self.scheduler.arm(self.session.battery()) {
            log::debug!("Animation armed at {:?}", interval);
        }
    }

    fn rearm(&mut self) {
        match self.scheduler.fired(self.session.battery()) {
            Ok(Some(interval)) => log::trace!("Animation re-armed at {:?}", interval),
            Ok(None) => {}
            Err(e) => log::debug!("Animation not re-armed: {}", e),
        }
    }

    fn present(&mut self, dirty: Dirty) -> Result<(), SurfaceError> {
        let frame = self.session.redraw(dirty, self.clock.now());
        self.surface.present(&frame).map_err(|e| {
            log::error!("Failed to present frame: {}", e);
            e
        })
    }
}

/// Post a [`FaceEvent::ClockTick`] on every minute boundary.
pub fn spawn_minute_ticks(
    events: mpsc::Sender<FaceEvent>,
    clock: Arc<dyn ClockSource>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(clock.until_next_minute()).await;
            if events.send(FaceEvent::ClockTick(clock.now())).await.is_err() {
                break;
            }
        }
    })
}

/// Poll the battery every `period`, posting a [`FaceEvent::Battery`] when the
/// reading differs from the last one sent.
pub fn spawn_battery_poll<M>(
    events: mpsc::Sender<FaceEvent>,
    mut monitor: M,
    period: Duration,
    initial: BatteryState,
) -> JoinHandle<()>
where
    M: BatteryMonitor + 'static,
{
    tokio::spawn(async move {
        let mut last = initial;
        let mut failing = false;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let battery = match monitor.peek() {
                Ok(battery) => {
                    failing = false;
                    battery
                }
                Err(e) => {
                    if !failing {
                        log::warn!("Battery read failed: {}", e);
                    } else {
                        log::debug!("Battery read still failing: {}", e);
                    }
                    failing = true;
                    continue;
                }
            };

            if battery == last {
                continue;
            }
            last = battery;
            if events.send(FaceEvent::Battery(battery)).await.is_err() {
                break;
            }
        }
    })
}

/// Poll step data every `period`, posting [`FaceEvent::Activity`] on change.
pub fn spawn_activity_poll<A>(
    events: mpsc::Sender<FaceEvent>,
    mut monitor: A,
    period: Duration,
) -> JoinHandle<()>
where
    A: ActivityMonitor + 'static,
{
    tokio::spawn(async move {
        let mut last = None;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let sample = monitor.sample();
            if last == Some(sample) {
                continue;
            }
            last = Some(sample);
            if events.send(FaceEvent::Activity(sample)).await.is_err() {
                break;
            }
        }
    })
}
