//! GPIO-backed implementations of the hardware port traits.
//!
//! This (plus `drivers::hw_init`) is the only place the control code's
//! view of the world meets actual pin levels, and the only place hardware
//! quirks live: the float switch's excitation pulse + settle delay, and
//! the active-low pump relay.

use std::thread;
use std::time::Duration;

use crate::config::TankConfig;
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;
use crate::ports::{AlertPort, LevelSensePort, MotorPort};

// ── Level sensor ──────────────────────────────────────────────

/// Float switch behind an excitation line: the contacts are only powered
/// while a reading is taken, to keep electrolytic corrosion down.
pub struct GpioLevelSensor {
    settle: Duration,
}

impl GpioLevelSensor {
    pub fn new(config: &TankConfig) -> Self {
        Self {
            settle: Duration::from_millis(u64::from(config.sensor_settle_ms)),
        }
    }
}

impl LevelSensePort for GpioLevelSensor {
    fn read_level(&mut self) -> Result<bool, SensorError> {
        hw_init::gpio_write(pins::LEVEL_ENABLE_GPIO, true);
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        let level = hw_init::gpio_read(pins::LEVEL_SENSE_GPIO);
        hw_init::gpio_write(pins::LEVEL_ENABLE_GPIO, false);
        Ok(level)
    }
}

// ── Motor relay + run sense ───────────────────────────────────

/// Pump relay and contactor auxiliary-contact sense input.
pub struct GpioMotor;

impl MotorPort for GpioMotor {
    fn sense_running(&mut self) -> bool {
        hw_init::gpio_read(pins::MOTOR_SENSE_GPIO)
    }

    fn set_relay(&mut self, on: bool) {
        // Active-low relay: logical "run" pulls the coil line LOW.
        hw_init::gpio_write(pins::MOTOR_RELAY_GPIO, !on);
    }
}

// ── Beeper ────────────────────────────────────────────────────

/// Piezo beeper; one burst is a fixed train of on/off pulses.
pub struct GpioAlert {
    pulses: u8,
    on_time: Duration,
    off_time: Duration,
}

impl GpioAlert {
    pub fn new(config: &TankConfig) -> Self {
        Self {
            pulses: config.beep_pulses,
            on_time: Duration::from_millis(u64::from(config.beep_on_ms)),
            off_time: Duration::from_millis(u64::from(config.beep_off_ms)),
        }
    }
}

impl AlertPort for GpioAlert {
    fn burst(&mut self) {
        for _ in 0..self.pulses {
            hw_init::gpio_write(pins::BEEP_GPIO, true);
            thread::sleep(self.on_time);
            hw_init::gpio_write(pins::BEEP_GPIO, false);
            thread::sleep(self.off_time);
        }
    }

    fn silence(&mut self) {
        hw_init::gpio_write(pins::BEEP_GPIO, false);
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    fn instant_config() -> TankConfig {
        TankConfig {
            sensor_settle_ms: 0,
            beep_on_ms: 0,
            beep_off_ms: 0,
            beep_pulses: 2,
            ..TankConfig::default()
        }
    }

    #[test]
    fn level_sensor_reads_sense_pin() {
        let mut sensor = GpioLevelSensor::new(&instant_config());
        hw_init::sim_set_level(pins::LEVEL_SENSE_GPIO, true);
        assert_eq!(sensor.read_level(), Ok(true));
        hw_init::sim_set_level(pins::LEVEL_SENSE_GPIO, false);
        assert_eq!(sensor.read_level(), Ok(false));
        // Excitation line is dropped after the read.
        assert!(!hw_init::gpio_read(pins::LEVEL_ENABLE_GPIO));
    }

    #[test]
    fn relay_mapping_is_active_low() {
        let mut motor = GpioMotor;
        motor.set_relay(true);
        assert!(!hw_init::gpio_read(pins::MOTOR_RELAY_GPIO));
        motor.set_relay(false);
        assert!(hw_init::gpio_read(pins::MOTOR_RELAY_GPIO));
    }

    #[test]
    fn silence_drops_beep_line() {
        let mut alert = GpioAlert::new(&instant_config());
        hw_init::sim_set_level(pins::BEEP_GPIO, true);
        alert.silence();
        assert!(!hw_init::gpio_read(pins::BEEP_GPIO));
    }
}
