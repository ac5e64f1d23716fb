//! System configuration parameters
//!
//! All tunable parameters for the tank controller.  Values are loaded from
//! NVS once at startup (falling back to these defaults) and treated as
//! constants for the rest of the process lifetime.

use serde::{Deserialize, Serialize};

use crate::control::debounce::MAX_WINDOW;
use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankConfig {
    // --- Level sampling ---
    /// Sampling period for the level monitor loop (milliseconds)
    pub sample_period_ms: u32,
    /// Float-switch excitation settle time before each read (milliseconds)
    pub sensor_settle_ms: u32,
    /// Debounce window size in samples
    pub debounce_window: usize,
    /// Samples in the window that must read "full" for a full verdict
    pub debounce_threshold: u32,

    // --- Hysteresis thresholds ---
    /// Consecutive debounced-full cycles before the alert sounds
    pub beep_threshold: u32,
    /// Consecutive debounced-full cycles before the motor is cut off.
    /// Must be strictly greater than `beep_threshold` so the alert always
    /// precedes the cutoff.
    pub motor_off_threshold: u32,

    // --- Alert pattern ---
    /// Pulses per audible burst
    pub beep_pulses: u8,
    /// Beeper on-time per pulse (milliseconds)
    pub beep_on_ms: u32,
    /// Beeper off-time between pulses (milliseconds)
    pub beep_off_ms: u32,

    // --- Mailbox timing ---
    /// Bounded wait for enqueueing a command (milliseconds)
    pub send_timeout_ms: u32,
    /// Bounded wait for the actuator tasks' mailbox receive (milliseconds).
    /// This wait doubles as each actuator task's loop period.
    pub recv_timeout_ms: u32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            // Level sampling
            sample_period_ms: 1000, // 1 Hz
            sensor_settle_ms: 500,
            debounce_window: 10,
            debounce_threshold: 4,

            // Hysteresis
            beep_threshold: 4,
            motor_off_threshold: 5,

            // Alert pattern
            beep_pulses: 4,
            beep_on_ms: 150,
            beep_off_ms: 100,

            // Mailboxes
            send_timeout_ms: 1000,
            recv_timeout_ms: 1000,
        }
    }
}

impl TankConfig {
    /// Range-check every field.  Called after NVS load and before save so a
    /// corrupted or maliciously written blob can never put the controller
    /// into a nonsensical operating regime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "sample_period_ms must be non-zero",
            ));
        }
        if self.debounce_window == 0 || self.debounce_window > MAX_WINDOW {
            return Err(ConfigError::ValidationFailed(
                "debounce_window must be 1..=MAX_WINDOW",
            ));
        }
        if self.debounce_threshold == 0 || self.debounce_threshold as usize > self.debounce_window {
            return Err(ConfigError::ValidationFailed(
                "debounce_threshold must be 1..=debounce_window",
            ));
        }
        if self.beep_threshold == 0 {
            return Err(ConfigError::ValidationFailed(
                "beep_threshold must be non-zero",
            ));
        }
        if self.motor_off_threshold <= self.beep_threshold {
            return Err(ConfigError::ValidationFailed(
                "motor_off_threshold must exceed beep_threshold",
            ));
        }
        if self.beep_pulses == 0 {
            return Err(ConfigError::ValidationFailed(
                "beep_pulses must be non-zero",
            ));
        }
        if self.send_timeout_ms == 0 || self.recv_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "mailbox timeouts must be non-zero",
            ));
        }
        Ok(())
    }
}
