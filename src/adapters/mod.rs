//! Adapters — concrete implementations of the port traits plus the
//! network-facing tasks.
//!
//! | Adapter    | Implements / provides | Connects to                 |
//! |------------|-----------------------|-----------------------------|
//! | `hardware` | LevelSensePort        | float switch GPIO           |
//! |            | MotorPort             | relay + contactor sense     |
//! |            | AlertPort             | piezo beeper GPIO           |
//! | `nvs`      | ConfigPort            | NVS / in-memory store       |
//! | `wifi`     | network status flags  | ESP-IDF WiFi STA            |
//! | `http`     | control surface       | ESP-IDF HTTP server         |
//! | `ota`      | firmware updates      | HTTP client + OTA partition |

pub mod hardware;
pub mod http;
pub mod nvs;
pub mod ota;
pub mod wifi;
