//! TankSentry firmware library.
//!
//! Overhead water tank pump controller: debounced float-switch sensing,
//! hysteresis-based full detection, and mailbox-driven motor and alert
//! actuators. Exposes the pure-logic modules for integration testing;
//! all ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod actuators;
pub mod adapters;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod ports;
pub mod sync;
