//! # Face Watch Application Entry Point
//!
//! This binary drives the watch face core against a terminal surface, so the
//! face can be developed and inspected on any host.
//! It supports a single-frame mode (`--stdout`) and a live animated mode.


use anyhow::{anyhow, Context};
use face_watch_lib::{
    battery::{BatteryMonitor, FixedBattery, SysfsBattery, POWER_SUPPLY_ROOT},
    canvas::{Canvas, DisplaySurface, SurfaceError},
    config::Config,
    draw::DrawList,
    runtime::{self, ClockSource, FaceRuntime, LocalClock, NoActivity},
    session::{Dirty, FaceEvent, FaceSession},
    BatteryState,
};
use embedded_graphics::prelude::Size;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How often the battery monitor is polled in live mode.
const BATTERY_POLL: Duration = Duration::from_secs(30);
/// How often step data is polled in live mode.
const ACTIVITY_POLL: Duration = Duration::from_secs(60);

/// Command line options.
#[derive(Debug, Default, PartialEq)]
pub struct Options {
    /// Print a single frame and exit
    pub development_mode: bool,
    /// Fixed battery reading instead of the host battery
    pub battery: Option<BatteryState>,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
}

impl Options {
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--stdout" => options.development_mode = true,
                "--battery" => {
                    let value = args.next().context("--battery needs a value")?;
                    options.battery = Some(parse_battery(&value)?);
                }
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    options.config = Some(PathBuf::from(path));
                }
                other => return Err(anyhow!("unknown argument `{}`", other)),
            }
        }
        Ok(options)
    }
}

/// Parse `PERCENT` or `PERCENT,charging`.
pub fn parse_battery(value: &str) -> anyhow::Result<BatteryState> {
    let (percent, flag) = match value.split_once(',') {
        Some((percent, flag)) => (percent, Some(flag)),
        None => (value, None),
    };
    let percent: u8 = percent
        .trim()
        .parse()
        .with_context(|| format!("invalid battery percent `{}`", percent))?;
    if percent > 100 {
        return Err(anyhow!("battery percent {} is above 100", percent));
    }

    let is_charging = match flag.map(str::trim) {
        None => false,
        Some("charging") => true,
        Some(other) => return Err(anyhow!("unknown battery flag `{}`", other)),
    };
    Ok(BatteryState::new(percent, is_charging))
}

/// Canvas that redraws itself in place on the terminal.
pub struct TerminalSurface {
    canvas: Canvas,
}

impl TerminalSurface {
    pub fn new(size: Size) -> Result<Self, SurfaceError> {
        Ok(Self {
            canvas: Canvas::new(size)?,
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

impl DisplaySurface for TerminalSurface {
    fn present(&mut self, frame: &DrawList) -> Result<(), SurfaceError> {
        self.canvas.present(frame)?;

        let mut out = io::stdout().lock();
        // Cursor home, then overwrite the previous frame
        write!(out, "\x1b[H{}", self.canvas.to_ascii())
            .and_then(|_| out.flush())
            .map_err(|e| SurfaceError::Present(e.to_string()))
    }
}

fn battery_monitor(options: &Options) -> Box<dyn BatteryMonitor> {
    if let Some(battery) = options.battery {
        return Box::new(FixedBattery(battery));
    }
    match SysfsBattery::discover(POWER_SUPPLY_ROOT) {
        Ok(battery) => {
            log::info!("Reading battery from {}", battery.path().display());
            Box::new(battery)
        }
        Err(e) => {
            log::info!("No host battery ({}), assuming a full battery", e);
            Box::new(FixedBattery(BatteryState::default()))
        }
    }
}

/// Render one frame for the current time and print it.
fn render_once(config: &Config, battery: BatteryState) -> anyhow::Result<()> {
    let mut session = FaceSession::new(config, battery)
        .map_err(|e| {
            log::error!("Face could not load: {}", e);
            e
        })
        .context("display size from configuration")?;
    let frame = session.redraw(Dirty::ALL, LocalClock.now());

    let mut canvas = Canvas::new(session.geometry().bounds)
        .map_err(|e| {
            log::error!("Canvas allocation failed: {}", e);
            e
        })
        .context("allocate canvas")?;
    canvas.present(&frame).context("paint frame")?;
    print!("{}", canvas.to_ascii());
    Ok(())
}

async fn run_live(config: Config, mut monitor: Box<dyn BatteryMonitor>) -> anyhow::Result<()> {
    let battery = monitor.peek().unwrap_or_else(|e| {
        log::warn!("Battery read failed: {}, assuming a full battery", e);
        BatteryState::default()
    });
    let surface = TerminalSurface::new(Size::new(config.display.width, config.display.height))
        .map_err(|e| {
            log::error!("Terminal surface unavailable: {}", e);
            e
        })
        .context("allocate terminal surface")?;
    let clock: Arc<dyn ClockSource> = Arc::new(LocalClock);

    let face = FaceRuntime::new(&config, surface, clock.clone(), battery)
        .map_err(|e| {
            log::error!("Face could not load: {}", e);
            e
        })
        .context("load face")?;
    let events = face.sender();

    // Clear the terminal once; frames then redraw from the cursor home
    print!("\x1b[2J");

    let feeders = [
        runtime::spawn_minute_ticks(events.clone(), clock),
        runtime::spawn_battery_poll(events.clone(), monitor, BATTERY_POLL, battery),
        runtime::spawn_activity_poll(events.clone(), NoActivity, ACTIVITY_POLL),
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = events.send(FaceEvent::Shutdown).await;
            }
        }),
    ];

    let result = face.run().await;
    feeders.iter().for_each(|feeder| feeder.abort());
    result.context("face stopped")?;
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse(env::args().skip(1))?;
    let config = match &options.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    let monitor = battery_monitor(&options);

    // Development mode: a single ASCII frame for inspection
    if options.development_mode {
        let mut monitor = monitor;
        let battery = monitor.peek().unwrap_or_default();
        return render_once(&config, battery);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start runtime")?;
    rt.block_on(run_live(config, monitor))
}
