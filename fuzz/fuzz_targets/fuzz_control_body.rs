//! Fuzz target: `parse_control_body`
//!
//! Drives arbitrary bytes into the HTTP control-body parser and asserts
//! that it never panics and that every accepted URL fits the fixed-capacity
//! payload type.
//!
//! cargo fuzz run fuzz_control_body

#![no_main]

use libfuzzer_sys::fuzz_target;
use tanksentry::adapters::http::{parse_control_body, ControlRequest};
use tanksentry::sync::UPDATE_URL_MAX;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(request) = parse_control_body(body) {
        match request {
            ControlRequest::Motor(_) => {}
            ControlRequest::FirmwareUpgrade(url) => {
                assert!(!url.is_empty(), "accepted URL must be non-empty");
                assert!(url.len() <= UPDATE_URL_MAX, "URL exceeds payload capacity");
            }
        }
    }
});
