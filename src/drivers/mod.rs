//! Hardware initialisation and simple peripheral drivers.

pub mod hw_init;
pub mod status_led;
