//! Hysteresis control state machine.
//!
//! Consumes one debounced level verdict per sampling cycle together with
//! the live `motor-running` flag, and turns *sustained* full evidence into
//! alert and motor-cutoff commands.  Two thresholds give the hysteresis:
//! the alert sounds first (`beep_threshold` consecutive full cycles), the
//! motor is cut one step later (`motor_off_threshold`), so the operator
//! always hears the warning before the pump stops.
//!
//! Command delivery is best-effort: a send that times out is logged and
//! dropped, and because the "delivered" markers are only advanced on a
//! successful send, the next cycle re-attempts the equivalent command for
//! as long as the condition persists.

use std::time::Duration;

use log::{error, info};

use crate::config::TankConfig;
use crate::sync::ControlContext;

/// Per-cycle decision engine owned by the level monitor task.
pub struct TankSupervisor {
    beep_threshold: u32,
    motor_off_threshold: u32,
    send_timeout: Duration,

    /// Unbroken run of debounced-full verdicts while the motor runs.
    consecutive_full: u32,
    /// Whether an alert-on command has been delivered and not yet
    /// countermanded.
    alert_asserted: bool,
    /// Whether motor-off has been delivered for the current full episode.
    motor_off_sent: bool,
}

impl TankSupervisor {
    pub fn new(config: &TankConfig) -> Self {
        Self {
            beep_threshold: config.beep_threshold,
            motor_off_threshold: config.motor_off_threshold,
            send_timeout: Duration::from_millis(u64::from(config.send_timeout_ms)),
            consecutive_full: 0,
            alert_asserted: false,
            motor_off_sent: false,
        }
    }

    /// Forget the current full episode.  Called by the monitor on the
    /// stopped→running edge, alongside clearing the debounce window.
    pub fn reset_episode(&mut self) {
        self.consecutive_full = 0;
        self.motor_off_sent = false;
    }

    /// Run one control cycle.  `motor_running` is the flag published by
    /// the motor task this cycle; `is_full` is the debounced verdict.
    pub fn evaluate(&mut self, ctx: &ControlContext, motor_running: bool, is_full: bool) {
        if !motor_running {
            // Nothing to supervise: the tank cannot overfill with the pump
            // stopped.  Retract a standing alert and forget the episode.
            self.reset_episode();
            if self.alert_asserted {
                self.send_alert(ctx, false);
            }
            return;
        }

        if is_full {
            self.consecutive_full = self.consecutive_full.saturating_add(1);

            if self.consecutive_full >= self.beep_threshold && !self.alert_asserted {
                self.send_alert(ctx, true);
            }
            if self.consecutive_full >= self.motor_off_threshold && !self.motor_off_sent {
                self.send_motor_off(ctx);
            }
        } else {
            self.reset_episode();
            if self.alert_asserted {
                self.send_alert(ctx, false);
            }
        }
    }

    /// Current run length (diagnostics / tests).
    pub fn consecutive_full(&self) -> u32 {
        self.consecutive_full
    }

    /// Whether an alert is currently asserted.
    pub fn alert_asserted(&self) -> bool {
        self.alert_asserted
    }

    // ── Internal ──────────────────────────────────────────────

    fn send_alert(&mut self, ctx: &ControlContext, on: bool) {
        match ctx.alert_cmd.send_timeout(on, self.send_timeout) {
            Ok(()) => {
                info!("supervisor: alert {} requested", if on { "ON" } else { "OFF" });
                self.alert_asserted = on;
            }
            Err(e) => {
                // Dropped, not retried this cycle; alert_asserted keeps its
                // old value so the next cycle re-attempts.
                error!("supervisor: failed to enqueue alert {}: {e}", if on { "ON" } else { "OFF" });
            }
        }
    }

    fn send_motor_off(&mut self, ctx: &ControlContext) {
        match ctx.motor_cmd.send_timeout(false, self.send_timeout) {
            Ok(()) => {
                info!(
                    "supervisor: motor OFF requested after {} consecutive full cycles",
                    self.consecutive_full
                );
                self.motor_off_sent = true;
            }
            Err(e) => {
                error!("supervisor: failed to enqueue motor OFF: {e}");
            }
        }
    }
}
