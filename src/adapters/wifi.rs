//! WiFi station-mode manager.
//!
//! Owns the two network status flags: `NetworkConnected` is set while the
//! station is associated with an IP, `NetworkFailed` is raised once bring-up
//! has burned through its initial retry budget. No other task writes either
//! flag.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation backend for host-side tests.
//!
//! ## Reconnection policy
//!
//! On failure the manager retries after an exponential backoff (2 s -> 4 s
//! -> 8 s ... capped at 60 s). It never gives up; `NetworkFailed` marks the
//! budget exhausted but retries continue at the capped interval.

use core::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::sync::{ControlContext, StatusFlag};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    InvalidSsid,
    InvalidPassword,
    ConnectFailed,
    DriverInit,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectFailed => write!(f, "WiFi connection failed"),
            Self::DriverInit => write!(f, "WiFi driver initialisation failed"),
        }
    }
}

impl std::error::Error for WifiError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;
/// Consecutive failed attempts after which `NetworkFailed` is raised.
const FAIL_AFTER_ATTEMPTS: u32 = 5;
/// Liveness poll period while connected.
const POLL_PERIOD: Duration = Duration::from_secs(5);

// ── Credential validation ─────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        // Open network.
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

// ── Manager ───────────────────────────────────────────────────

pub struct WifiManager {
    state: WifiState,
    ssid: heapless::String<32>,
    /// Only the real driver consumes the password; the simulation backend
    /// accepts any credentials.
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    password: heapless::String<64>,
    backoff_secs: u32,
    attempts: u32,
    retry_at: Option<Instant>,
    #[cfg(target_os = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    /// Simulation: remaining connect attempts that should fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
}

impl WifiManager {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> Result<Self, WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let esp_wifi =
            EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(|_| WifiError::DriverInit)?;
        let driver = BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| WifiError::DriverInit)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::try_from(ssid).map_err(|_| WifiError::InvalidSsid)?,
            password: heapless::String::try_from(password)
                .map_err(|_| WifiError::InvalidPassword)?,
            backoff_secs: INITIAL_BACKOFF_SECS,
            attempts: 0,
            retry_at: None,
            driver,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self, WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::try_from(ssid).map_err(|_| WifiError::InvalidSsid)?,
            password: heapless::String::try_from(password)
                .map_err(|_| WifiError::InvalidPassword)?,
            backoff_secs: INITIAL_BACKOFF_SECS,
            attempts: 0,
            retry_at: None,
            sim_failures_left: 0,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Simulation hook: make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures_left = n;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), WifiError> {
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        self.driver
            .set_configuration(&config)
            .map_err(|_| WifiError::ConnectFailed)?;
        self.driver.start().map_err(|_| WifiError::ConnectFailed)?;
        self.driver.connect().map_err(|_| WifiError::ConnectFailed)?;
        self.driver
            .wait_netif_up()
            .map_err(|_| WifiError::ConnectFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), WifiError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            return Err(WifiError::ConnectFailed);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    // ── State machine ─────────────────────────────────────────

    /// One connection attempt, publishing the outcome to the flag set.
    pub fn connect(&mut self, ctx: &ControlContext) -> Result<(), WifiError> {
        info!("wifi: connecting to '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                self.backoff_secs = INITIAL_BACKOFF_SECS;
                self.attempts = 0;
                self.retry_at = None;
                ctx.flags.clear(StatusFlag::NetworkFailed);
                ctx.flags.set(StatusFlag::NetworkConnected);
                info!("wifi: connected");
                Ok(())
            }
            Err(e) => {
                self.attempts += 1;
                error!("wifi: connect attempt {} failed: {}", self.attempts, e);
                if self.attempts == FAIL_AFTER_ATTEMPTS {
                    warn!("wifi: retry budget exhausted, marking network failed");
                    ctx.flags.set(StatusFlag::NetworkFailed);
                }
                self.retry_at =
                    Some(Instant::now() + Duration::from_secs(u64::from(self.backoff_secs)));
                self.state = WifiState::Reconnecting {
                    attempt: self.attempts,
                };
                self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                Err(e)
            }
        }
    }

    /// One step of the connection watchdog.
    pub fn poll(&mut self, ctx: &ControlContext) {
        match self.state {
            WifiState::Disconnected => {
                let _ = self.connect(ctx);
            }
            WifiState::Reconnecting { attempt } => {
                if self.retry_at.is_some_and(|at| Instant::now() < at) {
                    return;
                }
                info!("wifi: reconnect attempt {}", attempt + 1);
                let _ = self.connect(ctx);
            }
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("wifi: connection lost");
                    ctx.flags.clear(StatusFlag::NetworkConnected);
                    self.retry_at = Some(Instant::now());
                    self.state = WifiState::Reconnecting { attempt: 0 };
                }
            }
        }
    }

    /// Task body: drive the state machine forever.
    pub fn run(mut self, ctx: Arc<ControlContext>) -> ! {
        loop {
            self.poll(&ctx);
            thread::sleep(POLL_PERIOD);
        }
    }
}
