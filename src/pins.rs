//! GPIO pin assignments for the TankSentry controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Pump motor relay coil.  The relay is **active low**: the contacts are in
/// their normal (motor-off) position while this line is HIGH, and energise
/// when the line goes LOW.  `hw_init` forces the line HIGH before pin
/// configuration so the relay does not click during boot.
pub const MOTOR_RELAY_GPIO: i32 = 26;

/// Piezo beeper drive transistor (active HIGH).
pub const BEEP_GPIO: i32 = 27;

/// Error/status LED.  Driven HIGH during bring-up, LOW once every task has
/// started successfully.
pub const STATUS_LED_GPIO: i32 = 2;

/// Float-switch excitation line.  Pulsed HIGH for the settle period before
/// each level sample, then dropped — the switch contacts are only powered
/// while a reading is being taken.
pub const LEVEL_ENABLE_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Inputs (internal pull-down)
// ---------------------------------------------------------------------------

/// Motor-running sense input, fed from the pump contactor's auxiliary
/// contact.  HIGH = motor energised.
pub const MOTOR_SENSE_GPIO: i32 = 32;

/// Overhead-tank float switch.  HIGH = water at the full mark.
pub const LEVEL_SENSE_GPIO: i32 = 33;
