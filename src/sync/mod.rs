//! Task-coordination substrate: status flags, single-slot mailboxes, and
//! the shared control context that bundles them.
//!
//! Every cross-task interaction in the firmware goes through one of these
//! two primitives — no other shared mutable state exists.

pub mod flags;
pub mod mailbox;

use heapless::String;

pub use flags::{StatusFlag, StatusFlags};
pub use mailbox::{Mailbox, SendTimeout};

/// Maximum length of a firmware-upgrade URL accepted over the control
/// surface.
pub const UPDATE_URL_MAX: usize = 128;

/// Firmware-upgrade request payload.
pub type UpdateUrl = String<UPDATE_URL_MAX>;

/// Process-wide shared state, created once in `main` and handed to every
/// task behind an `Arc`.
///
/// Writer discipline: the motor task owns `MotorRunning`, the WiFi manager
/// owns the two network flags; the supervisor and the HTTP control surface
/// are the only producers into `motor_cmd`, the supervisor alone produces
/// into `alert_cmd`, and the HTTP surface alone produces into `update_cmd`.
pub struct ControlContext {
    pub flags: StatusFlags,
    /// Desired motor state: `true` = run, `false` = stop.
    pub motor_cmd: Mailbox<bool>,
    /// Desired alert state: `true` = sound, `false` = silence.
    pub alert_cmd: Mailbox<bool>,
    /// Firmware-upgrade request (download URL).
    pub update_cmd: Mailbox<UpdateUrl>,
}

impl ControlContext {
    pub fn new() -> Self {
        Self {
            flags: StatusFlags::new(),
            motor_cmd: Mailbox::new(),
            alert_cmd: Mailbox::new(),
            update_cmd: Mailbox::new(),
        }
    }
}

impl Default for ControlContext {
    fn default() -> Self {
        Self::new()
    }
}
