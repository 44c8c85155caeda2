//! # Battery-Aware Animation Scheduler
//!
//! Keeps exactly one animation timer armed at a time. Each firing re-arms the
//! next one, choosing the normal or the low-power interval from the latest
//! battery reading.
//!
//! ## Failure policy
//! - If the host refuses a timer, registration is retried once with twice the
//!   interval.
//! - If the retry also fails the scheduler stalls: the face stops animating,
//!   but clock and battery events keep flowing through their own paths.
//! - After [`AnimationScheduler::cancel`] every further arm is a no-op, so a
//!   late callback can never revive a torn-down face.
//!
//! The timer itself sits behind [`TimerHost`]; [`TokioTimer`] is the runtime
//! implementation.

use crate::config::AnimationConfig;
use crate::session::FaceEvent;
use crate::BatteryState;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("no timer runtime is running")]
    NoRuntime,

    #[error("animation event queue is closed")]
    Closed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("animation timer could not be registered at {interval:?} or {retry:?}: {source}")]
    Exhausted {
        interval: Duration,
        retry: Duration,
        #[source]
        source: TimerError,
    },
}

/// Something that can run a one-shot timer.
pub trait TimerHost {
    type Handle;

    /// Arrange for one animation tick after `after`.
    fn register(&mut self, after: Duration) -> Result<Self::Handle, TimerError>;

    /// Stop a pending timer. Cancelling a timer that already fired is harmless.
    fn cancel(&mut self, handle: Self::Handle);
}

/// Tick interval for the given battery reading.
pub fn select_interval(battery: &BatteryState, animation: &AnimationConfig) -> Duration {
    if battery.is_low(animation.low_battery_threshold) {
        animation.low_power_interval()
    } else {
        animation.interval()
    }
}

enum Slot<H> {
    Idle,
    Armed(H),
    Stalled,
    Cancelled,
}

/// Self-re-arming animation timer.
pub struct AnimationScheduler<H: TimerHost> {
    host: H,
    animation: AnimationConfig,
    slot: Slot<H::Handle>,
}

impl<H: TimerHost> AnimationScheduler<H> {
    pub fn new(host: H, animation: AnimationConfig) -> Self {
        Self {
            host,
            animation,
            slot: Slot::Idle,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.slot, Slot::Armed(_))
    }

    pub fn is_stalled(&self) -> bool {
        matches!(self.slot, Slot::Stalled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.slot, Slot::Cancelled)
    }

    /// Arm the next tick if none is pending.
    ///
    /// Returns the interval that was armed, or `None` when nothing needed
    /// arming (already armed, stalled, or cancelled).
    pub fn arm(&mut self, battery: &BatteryState) -> Result<Option<Duration>, ScheduleError> {
        if !matches!(self.slot, Slot::Idle) {
            return Ok(None);
        }

        let interval = select_interval(battery, &self.animation);
        match self.host.register(interval) {
            Ok(handle) => {
                self.slot = Slot::Armed(handle);
                return Ok(Some(interval));
            }
            Err(e) => log::warn!("Animation timer at {:?} failed: {}, retrying", interval, e),
        }

        let retry = interval * 2;
        match self.host.register(retry) {
            Ok(handle) => {
                self.slot = Slot::Armed(handle);
                Ok(Some(retry))
            }
            Err(source) => {
                log::error!("Animation timer retry failed, animation stalled: {}", source);
                self.slot = Slot::Stalled;
                Err(ScheduleError::Exhausted {
                    interval,
                    retry,
                    source,
                })
            }
        }
    }

    /// The pending tick fired: clear it and arm the next one.
    pub fn fired(&mut self, battery: &BatteryState) -> Result<Option<Duration>, ScheduleError> {
        if matches!(self.slot, Slot::Armed(_)) {
            self.slot = Slot::Idle;
        }
        self.arm(battery)
    }

    /// Release the pending timer and refuse all further arming.
    pub fn cancel(&mut self) {
        if let Slot::Armed(handle) = std::mem::replace(&mut self.slot, Slot::Cancelled) {
            self.host.cancel(handle);
        }
    }
}

impl<H: TimerHost> Drop for AnimationScheduler<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timer host that sleeps on the Tokio runtime and posts
/// [`FaceEvent::AnimationTick`] to the face's event queue.
pub struct TokioTimer {
    events: mpsc::Sender<FaceEvent>,
}

impl TokioTimer {
    pub fn new(events: mpsc::Sender<FaceEvent>) -> Self {
        Self { events }
    }
}

impl TimerHost for TokioTimer {
    type Handle = JoinHandle<()>;

    fn register(&mut self, after: Duration) -> Result<Self::Handle, TimerError> {
        if self.events.is_closed() {
            return Err(TimerError::Closed);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;
        let events = self.events.clone();

        Ok(runtime.spawn(async move {
            tokio::time::sleep(after).await;
            // The receiver is gone once the face unloads
            let _ = events.send(FaceEvent::AnimationTick).await;
        }))
    }

    fn cancel(&mut self, handle: Self::Handle) {
        handle.abort();
    }
}
