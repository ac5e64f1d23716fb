//! Level monitor task.
//!
//! The sampling half of the control loop: once per sampling period it
//! reads one raw float-switch sample, feeds the debounce window, and runs
//! the hysteresis supervisor.  While the motor is stopped the task blocks
//! on the `MotorRunning` flag instead of sampling, with the same bounded
//! timeout, so the wait itself is the sampling-period timer and the loop
//! never busy-spins.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::config::TankConfig;
use crate::control::debounce::DebounceWindow;
use crate::control::supervisor::TankSupervisor;
use crate::ports::LevelSensePort;
use crate::sync::{ControlContext, StatusFlag};

/// Last debounced verdict, exported for the HTTP status surface.
/// Cleared whenever the motor is not running (no sampling happens then).
static TANK_REPORTING_FULL: AtomicBool = AtomicBool::new(false);

/// Whether the most recent sampling cycle judged the tank full.
pub fn tank_reporting_full() -> bool {
    TANK_REPORTING_FULL.load(Ordering::Relaxed)
}

/// Debounce filter + supervisor, driven once per sampling cycle.
pub struct LevelMonitor<S: LevelSensePort> {
    sensor: S,
    window: DebounceWindow,
    supervisor: TankSupervisor,
    debounce_threshold: u32,
    sample_period: Duration,
    /// Motor flag as observed on the previous cycle, for edge detection.
    prev_motor_running: bool,
    /// Full-count after the previous cycle; log only on change.
    last_logged_count: Option<u32>,
}

impl<S: LevelSensePort> LevelMonitor<S> {
    pub fn new(config: &TankConfig, sensor: S) -> Self {
        Self {
            sensor,
            window: DebounceWindow::new(config.debounce_window),
            supervisor: TankSupervisor::new(config),
            debounce_threshold: config.debounce_threshold,
            sample_period: Duration::from_millis(u64::from(config.sample_period_ms)),
            prev_motor_running: false,
            last_logged_count: None,
        }
    }

    /// Execute one sampling cycle.  Returns the debounced verdict
    /// (`false` while the motor is stopped — no sample is taken then).
    pub fn cycle(&mut self, ctx: &ControlContext) -> bool {
        let motor_running = ctx.flags.is_set(StatusFlag::MotorRunning);

        if motor_running && !self.prev_motor_running {
            // Motor just started: stale samples from the previous run must
            // not count toward this fill cycle.
            info!("level: motor started, clearing debounce history");
            self.window.clear();
            self.supervisor.reset_episode();
            self.last_logged_count = None;
        }
        self.prev_motor_running = motor_running;

        if !motor_running {
            TANK_REPORTING_FULL.store(false, Ordering::Relaxed);
            self.supervisor.evaluate(ctx, false, false);
            return false;
        }

        let raw = match self.sensor.read_level() {
            Ok(v) => v,
            Err(e) => {
                // Not fatal: a missed sample reads as "not full" and the
                // next cycle tries again.
                warn!("level: sensor read failed ({e}), treating as not full");
                false
            }
        };

        let count = self.window.push(raw);
        if self.last_logged_count != Some(count) {
            info!(
                "level: {count}/{} samples report full",
                self.window.size()
            );
            self.last_logged_count = Some(count);
        }

        let is_full = self.window.is_full(self.debounce_threshold);
        TANK_REPORTING_FULL.store(is_full, Ordering::Relaxed);
        self.supervisor.evaluate(ctx, true, is_full);
        is_full
    }

    /// Task entry point: cycle forever at the sampling period.
    pub fn run(mut self, ctx: Arc<ControlContext>) -> ! {
        info!("level: monitor task started");
        loop {
            self.cycle(&ctx);
            if self.prev_motor_running {
                std::thread::sleep(self.sample_period);
            } else {
                // Idle: the bounded flag wait doubles as the period timer
                // and wakes immediately when the motor starts.
                ctx.flags
                    .wait_any(StatusFlag::MotorRunning.mask(), Some(self.sample_period));
            }
        }
    }

    #[cfg(test)]
    pub fn supervisor(&self) -> &TankSupervisor {
        &self.supervisor
    }
}
