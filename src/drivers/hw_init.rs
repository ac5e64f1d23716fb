//! One-shot GPIO initialization and pin-level access helpers.
//!
//! Configures every output and input pin using raw ESP-IDF sys calls,
//! called once from `main()` before any task starts.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: real `gpio_config`/`gpio_set_level`/`gpio_get_level`.
//! On host/test: pin levels live in in-memory atomics so tests can drive
//! inputs and observe outputs.

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot GPIO initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    OutputConfigFailed(i32),
    InputConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutputConfigFailed(rc) => write!(f, "GPIO output config failed (rc={rc})"),
            Self::InputConfigFailed(rc) => write!(f, "GPIO input config failed (rc={rc})"),
        }
    }
}

// ── ESP-IDF implementation ────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_gpio() -> Result<(), HwInitError> {
    use esp_idf_svc::sys::*;

    // The motor relay is active low: drive the line HIGH (contacts in
    // their normal, motor-off position) *before* configuring the pin,
    // otherwise the relay clicks for an instant during boot.
    gpio_write(pins::MOTOR_RELAY_GPIO, true);

    let output_mask = (1u64 << pins::MOTOR_RELAY_GPIO)
        | (1u64 << pins::BEEP_GPIO)
        | (1u64 << pins::STATUS_LED_GPIO)
        | (1u64 << pins::LEVEL_ENABLE_GPIO);

    let out_conf = gpio_config_t {
        pin_bit_mask: output_mask,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: plain FFI struct passed by pointer, called once from the
    // single-threaded init path.
    let ret = unsafe { gpio_config(&out_conf) };
    if ret != ESP_OK {
        return Err(HwInitError::OutputConfigFailed(ret));
    }

    // Re-assert after formal configuration; redundant but harmless.
    gpio_write(pins::MOTOR_RELAY_GPIO, true);

    let input_mask = (1u64 << pins::MOTOR_SENSE_GPIO) | (1u64 << pins::LEVEL_SENSE_GPIO);
    let in_conf = gpio_config_t {
        pin_bit_mask: input_mask,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: as above.
    let ret = unsafe { gpio_config(&in_conf) };
    if ret != ESP_OK {
        return Err(HwInitError::InputConfigFailed(ret));
    }

    log::info!("hw_init: GPIO configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level is thread-safe per ESP-IDF docs.
    unsafe {
        esp_idf_svc::sys::gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is thread-safe per ESP-IDF docs.
    unsafe { esp_idf_svc::sys::gpio_get_level(pin) != 0 }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::AtomicBool;

    pub const PIN_COUNT: usize = 40;

    #[allow(clippy::declare_interior_mutable_const)]
    const LOW: AtomicBool = AtomicBool::new(false);
    pub static LEVELS: [AtomicBool; PIN_COUNT] = [LOW; PIN_COUNT];
}

#[cfg(not(target_os = "espidf"))]
pub fn init_gpio() -> Result<(), HwInitError> {
    gpio_write(pins::MOTOR_RELAY_GPIO, true);
    log::info!("hw_init(sim): GPIO init skipped");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    use core::sync::atomic::Ordering;
    sim::LEVELS[pin as usize % sim::PIN_COUNT].store(high, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    use core::sync::atomic::Ordering;
    sim::LEVELS[pin as usize % sim::PIN_COUNT].load(Ordering::Relaxed)
}

/// Test hook: drive a simulated input pin.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: i32, high: bool) {
    gpio_write(pin, high);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_leaves_relay_line_inactive() {
        init_gpio().unwrap();
        // Active-low relay: HIGH = motor off.
        assert!(gpio_read(pins::MOTOR_RELAY_GPIO));
    }

    #[test]
    fn sim_levels_round_trip() {
        sim_set_level(pins::LEVEL_SENSE_GPIO, true);
        assert!(gpio_read(pins::LEVEL_SENSE_GPIO));
        sim_set_level(pins::LEVEL_SENSE_GPIO, false);
        assert!(!gpio_read(pins::LEVEL_SENSE_GPIO));
    }
}
