//! Alert (beep) task.
//!
//! Owns the beeper output line.  Commands are a desired boolean state;
//! the task realises "on" as a repeating audible pattern: one burst is
//! emitted when the state turns on, and every mailbox-receive *timeout*
//! while the state is still "on" emits another.  That timeout re-assert
//! is what turns a single "alert on" command into a sustained periodic
//! alarm — the producer never has to re-send.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::config::TankConfig;
use crate::ports::AlertPort;
use crate::sync::ControlContext;

pub struct BeepTask<A: AlertPort> {
    port: A,
    /// Last applied state; used to suppress redundant re-application and
    /// to decide whether a timeout should re-assert the pattern.
    on: bool,
    recv_timeout: Duration,
}

impl<A: AlertPort> BeepTask<A> {
    pub fn new(config: &TankConfig, port: A) -> Self {
        Self {
            port,
            on: false,
            recv_timeout: Duration::from_millis(u64::from(config.recv_timeout_ms)),
        }
    }

    /// One loop iteration: bounded mailbox wait, then act.
    pub fn poll(&mut self, ctx: &ControlContext) {
        match ctx.alert_cmd.recv_timeout(self.recv_timeout) {
            Some(desired) if desired == self.on => {
                debug!("beep: desired state identical to current state");
            }
            Some(true) => {
                info!("beep: alert on");
                self.on = true;
                self.port.burst();
            }
            Some(false) => {
                info!("beep: alert off");
                self.on = false;
                self.port.silence();
            }
            None => {
                // Timed out with no command: keep an active alarm audible.
                if self.on {
                    self.port.burst();
                }
            }
        }
    }

    /// Task entry point.
    pub fn run(mut self, ctx: Arc<ControlContext>) -> ! {
        info!("beep: alert task started");
        loop {
            self.poll(&ctx);
        }
    }

    #[cfg(test)]
    pub fn is_on(&self) -> bool {
        self.on
    }
}
