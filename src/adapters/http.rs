//! HTTP control surface.
//!
//! Two endpoints on the default port:
//!
//! - `GET /status` reports motor and tank state as JSON.
//! - `POST /control` accepts `motor=on`, `motor=off`, or
//!   `firmware-upgrade=<url>` in the request body. Commands go into the
//!   mailboxes with the bounded send; a full mailbox is a 503, not a wait.
//!
//! Body parsing is pure and lives here so host tests cover it; the server
//! itself only exists on ESP-IDF targets. The server task waits on the
//! network flags and only serves while the station is up.

use core::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::control::monitor::tank_reporting_full;
use crate::sync::{ControlContext, StatusFlag, UpdateUrl};

/// Largest control body the surface accepts.
pub const MAX_BODY_LEN: usize = 160;

// ── Request parsing ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// Desired motor state.
    Motor(bool),
    /// Firmware-upgrade download URL.
    FirmwareUpgrade(UpdateUrl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    EmptyBody,
    UnknownCommand,
    BadMotorState,
    UrlTooLong,
    EmptyUrl,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "empty request body"),
            Self::UnknownCommand => write!(f, "unrecognised control word"),
            Self::BadMotorState => write!(f, "motor state must be 'on' or 'off'"),
            Self::UrlTooLong => write!(f, "firmware URL too long"),
            Self::EmptyUrl => write!(f, "firmware URL missing"),
        }
    }
}

/// Parse a `POST /control` body into a command.
pub fn parse_control_body(body: &str) -> Result<ControlRequest, ParseError> {
    let body = body.trim_end_matches(['\r', '\n']);
    if body.is_empty() {
        return Err(ParseError::EmptyBody);
    }
    if let Some(state) = body.strip_prefix("motor=") {
        return match state {
            "on" => Ok(ControlRequest::Motor(true)),
            "off" => Ok(ControlRequest::Motor(false)),
            _ => Err(ParseError::BadMotorState),
        };
    }
    if let Some(url) = body.strip_prefix("firmware-upgrade=") {
        if url.is_empty() {
            return Err(ParseError::EmptyUrl);
        }
        let url = UpdateUrl::try_from(url).map_err(|_| ParseError::UrlTooLong)?;
        return Ok(ControlRequest::FirmwareUpgrade(url));
    }
    Err(ParseError::UnknownCommand)
}

// ── Status report ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub motor_running: bool,
    pub tank_full: bool,
    pub network_connected: bool,
}

impl StatusReport {
    pub fn snapshot(ctx: &ControlContext) -> Self {
        Self {
            motor_running: ctx.flags.is_set(StatusFlag::MotorRunning),
            tank_full: tank_reporting_full(),
            network_connected: ctx.flags.is_set(StatusFlag::NetworkConnected),
        }
    }
}

/// Route a parsed command into the mailboxes. Returns `Err` with a short
/// reason when the receiving task has not drained its slot in time.
pub fn dispatch(
    ctx: &ControlContext,
    request: ControlRequest,
    send_timeout: Duration,
) -> Result<(), &'static str> {
    match request {
        ControlRequest::Motor(on) => {
            log::info!("http: motor={} requested", if on { "on" } else { "off" });
            ctx.motor_cmd
                .send_timeout(on, send_timeout)
                .map_err(|_| "motor command queue busy")
        }
        ControlRequest::FirmwareUpgrade(url) => {
            log::info!("http: firmware upgrade requested from {}", url);
            ctx.update_cmd
                .send_timeout(url, send_timeout)
                .map_err(|_| "update already in progress")
        }
    }
}

// ── Server task (ESP-IDF only) ────────────────────────────────

#[cfg(target_os = "espidf")]
mod server {
    use std::sync::Arc;
    use std::time::Duration;

    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::http::Method;
    use esp_idf_svc::io::{Read, Write};
    use log::{error, info, warn};

    use super::{parse_control_body, dispatch, StatusReport, MAX_BODY_LEN};
    use crate::config::TankConfig;
    use crate::sync::{ControlContext, StatusFlag};

    fn start(
        ctx: &Arc<ControlContext>,
        send_timeout: Duration,
    ) -> anyhow::Result<EspHttpServer<'static>> {
        let mut server = EspHttpServer::new(&Configuration::default())?;

        let status_ctx = Arc::clone(ctx);
        server.fn_handler("/status", Method::Get, move |req| {
            let report = StatusReport::snapshot(&status_ctx);
            let body = serde_json::to_string(&report)?;
            let mut resp = req.into_response(
                200,
                Some("OK"),
                &[("Content-Type", "application/json")],
            )?;
            resp.write_all(body.as_bytes())?;
            Ok::<(), anyhow::Error>(())
        })?;

        let control_ctx = Arc::clone(ctx);
        server.fn_handler("/control", Method::Post, move |mut req| {
            let mut buf = [0u8; MAX_BODY_LEN];
            let len = req.read(&mut buf)?;
            let Ok(body) = core::str::from_utf8(&buf[..len]) else {
                req.into_status_response(400)?;
                return Ok(());
            };
            match parse_control_body(body) {
                Ok(request) => match dispatch(&control_ctx, request, send_timeout) {
                    Ok(()) => {
                        req.into_ok_response()?;
                    }
                    Err(reason) => {
                        warn!("http: {}", reason);
                        req.into_status_response(503)?;
                    }
                },
                Err(e) => {
                    warn!("http: bad control body: {}", e);
                    req.into_status_response(400)?;
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;

        info!("http: server started");
        Ok(server)
    }

    /// Task body: run the server while the network is up, tear it down on
    /// failure, restart on reconnect.
    pub fn run(ctx: Arc<ControlContext>, config: &TankConfig) -> ! {
        let send_timeout = Duration::from_millis(u64::from(config.send_timeout_ms));
        let mask = StatusFlag::NetworkConnected.mask() | StatusFlag::NetworkFailed.mask();
        let mut server: Option<EspHttpServer<'static>> = None;
        loop {
            let bits = ctx.flags.wait_any(mask, Some(Duration::from_secs(5)));
            let connected = bits & StatusFlag::NetworkConnected.mask() != 0;
            match (&server, connected) {
                (None, true) => match start(&ctx, send_timeout) {
                    Ok(s) => server = Some(s),
                    Err(e) => error!("http: failed to start server: {:#}", e),
                },
                (Some(_), false) => {
                    info!("http: network down, stopping server");
                    server = None;
                }
                _ => {}
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use server::run;

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn parses_motor_on_off() {
        assert_eq!(parse_control_body("motor=on"), Ok(ControlRequest::Motor(true)));
        assert_eq!(parse_control_body("motor=off"), Ok(ControlRequest::Motor(false)));
    }

    #[test]
    fn tolerates_trailing_newline() {
        assert_eq!(parse_control_body("motor=on\n"), Ok(ControlRequest::Motor(true)));
    }

    #[test]
    fn rejects_unknown_motor_state() {
        assert_eq!(parse_control_body("motor=maybe"), Err(ParseError::BadMotorState));
    }

    #[test]
    fn rejects_unknown_command_word() {
        assert_eq!(parse_control_body("pump=on"), Err(ParseError::UnknownCommand));
        assert_eq!(parse_control_body(""), Err(ParseError::EmptyBody));
    }

    #[test]
    fn parses_firmware_upgrade_url() {
        let parsed = parse_control_body("firmware-upgrade=https://192.168.29.76:59443/mc.bin");
        let Ok(ControlRequest::FirmwareUpgrade(url)) = parsed else {
            panic!("expected firmware upgrade, got {:?}", parsed);
        };
        assert_eq!(url.as_str(), "https://192.168.29.76:59443/mc.bin");
    }

    #[test]
    fn rejects_oversized_url() {
        let body = format!("firmware-upgrade=https://host/{}", "x".repeat(200));
        assert_eq!(parse_control_body(&body), Err(ParseError::UrlTooLong));
    }

    #[test]
    fn dispatch_routes_motor_command() {
        let ctx = ControlContext::new();
        dispatch(
            &ctx,
            ControlRequest::Motor(true),
            Duration::from_millis(10),
        )
        .unwrap();
        assert_eq!(ctx.motor_cmd.try_recv(), Some(true));
    }

    #[test]
    fn dispatch_reports_busy_mailbox() {
        let ctx = ControlContext::new();
        let url = UpdateUrl::try_from("http://a/fw.bin").unwrap();
        dispatch(
            &ctx,
            ControlRequest::FirmwareUpgrade(url.clone()),
            Duration::from_millis(10),
        )
        .unwrap();
        // Second request while the first is undrained must not overwrite.
        let err = dispatch(
            &ctx,
            ControlRequest::FirmwareUpgrade(url.clone()),
            Duration::from_millis(10),
        )
        .unwrap_err();
        assert_eq!(err, "update already in progress");
        assert_eq!(ctx.update_cmd.try_recv(), Some(url));
    }

    #[test]
    fn status_snapshot_reflects_flags() {
        let ctx = ControlContext::new();
        ctx.flags.set(StatusFlag::MotorRunning);
        let report = StatusReport::snapshot(&ctx);
        assert!(report.motor_running);
        assert!(!report.network_connected);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"motor_running\":true"));
    }
}
