//! Actuator tasks — the exclusive owners of the physical output lines.
//!
//! Each task drains its own single-slot mailbox with a bounded wait and
//! is the sole writer of its hardware line; the bounded wait doubles as
//! the task's loop period.

pub mod beep;
pub mod motor;
