//! Motor actuator task.
//!
//! Owns the pump relay line outright — no other component may write it.
//! Each loop iteration does two things:
//!
//! 1. Samples the hardware run-sense input and publishes the result to
//!    the `MotorRunning` status flag, so every other task sees the *actual*
//!    motor state rather than the last commanded one.
//! 2. Performs a bounded wait on the motor command mailbox.  A received
//!    command that differs from the sensed state is applied as a direct
//!    level-set (not a toggle — a missed command must not invert the
//!    meaning of every later one); a command matching the sensed state is
//!    ignored.  A receive timeout is the normal idle path and simply loops
//!    back to re-sample the sense input.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::config::TankConfig;
use crate::ports::MotorPort;
use crate::sync::{ControlContext, StatusFlag};

pub struct MotorTask<P: MotorPort> {
    port: P,
    /// Sensed motor state as of the last poll.
    running: bool,
    recv_timeout: Duration,
}

impl<P: MotorPort> MotorTask<P> {
    pub fn new(config: &TankConfig, port: P) -> Self {
        Self {
            port,
            running: false,
            recv_timeout: Duration::from_millis(u64::from(config.recv_timeout_ms)),
        }
    }

    /// One loop iteration: sense + publish, then drain the mailbox once.
    pub fn poll(&mut self, ctx: &ControlContext) {
        let sensed = self.port.sense_running();
        if sensed != self.running {
            self.running = sensed;
            if sensed {
                info!("motor: sense input high, motor is running");
                ctx.flags.set(StatusFlag::MotorRunning);
            } else {
                info!("motor: sense input low, motor has stopped");
                ctx.flags.clear(StatusFlag::MotorRunning);
            }
        }

        // The bounded wait doubles as the loop period.
        if let Some(desired) = ctx.motor_cmd.recv_timeout(self.recv_timeout) {
            if desired == self.running {
                info!(
                    "motor: ignoring request, desired state ({}) == sensed state",
                    on_off(desired)
                );
            } else {
                info!(
                    "motor: obeying request, setting relay {} (sensed {})",
                    on_off(desired),
                    on_off(self.running)
                );
                self.port.set_relay(desired);
            }
        }
    }

    /// Task entry point.
    pub fn run(mut self, ctx: Arc<ControlContext>) -> ! {
        info!("motor: actuator task started");
        loop {
            self.poll(&ctx);
        }
    }

    #[cfg(test)]
    pub fn sensed_running(&self) -> bool {
        self.running
    }
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
