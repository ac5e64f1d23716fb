//! Error/status LED driver.
//!
//! Lit during bring-up; extinguished once every task has started, so a
//! board stuck with the LED on failed somewhere in boot.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LED GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    lit: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        Self { lit: false }
    }

    pub fn set(&mut self, lit: bool) {
        hw_init::gpio_write(pins::STATUS_LED_GPIO, lit);
        self.lit = lit;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_tracks_state() {
        let mut led = StatusLed::new();
        led.set(true);
        assert!(led.is_lit());
        assert!(hw_init::gpio_read(pins::STATUS_LED_GPIO));
        led.set(false);
        assert!(!led.is_lit());
    }
}
