//! Port traits — the boundary between control logic and hardware.
//!
//! The task structs in [`control`](crate::control) and
//! [`actuators`](crate::actuators) are generic over these traits, so the
//! whole control loop runs host-side against mocks; the GPIO-backed
//! implementations live in [`adapters::hardware`](crate::adapters::hardware).

use crate::config::TankConfig;
use crate::error::{ConfigError, SensorError};

/// Read-side port: one raw level-switch sample per sampling cycle.
///
/// Implementations handle any excitation pulse / settle delay internally;
/// the caller sees a single blocking read.
pub trait LevelSensePort {
    /// `Ok(true)` = the float switch reports the tank at its full mark.
    fn read_level(&mut self) -> Result<bool, SensorError>;
}

/// Motor relay + run-sense port, exclusively owned by the motor task.
pub trait MotorPort {
    /// Sample the hardware run-sense input.  `true` = motor energised.
    fn sense_running(&mut self) -> bool;

    /// Drive the relay to the given *logical* motor state.  This is a
    /// level-set, not a toggle — any polarity inversion the relay needs is
    /// the implementation's concern.
    fn set_relay(&mut self, on: bool);
}

/// Audible alert output, exclusively owned by the beep task.
pub trait AlertPort {
    /// Emit one pattern burst (a fixed sequence of on/off pulses).
    /// Blocks for the duration of the burst.
    fn burst(&mut self);

    /// Force the output silent.
    fn silence(&mut self);
}

/// Loads and persists system configuration.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<TankConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &TankConfig) -> Result<(), ConfigError>;
}
