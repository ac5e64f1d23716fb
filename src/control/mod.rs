//! Tank level sensing and control decisions.
//!
//! Data flow: [`debounce::DebounceWindow`] turns raw float-switch samples
//! into a stable verdict, [`supervisor::TankSupervisor`] turns sustained
//! verdicts into alert/motor-off commands, and [`monitor::LevelMonitor`]
//! is the task loop that drives both once per sampling period.

pub mod debounce;
pub mod monitor;
pub mod supervisor;
