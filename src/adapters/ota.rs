//! Firmware-update task, backed by the `esp-ota` crate.
//!
//! Drains the update mailbox with a bounded wait, downloads the image over
//! HTTP and streams it straight into the inactive OTA partition, then
//! reboots into the new firmware. A failed update is logged and the task
//! goes back to waiting; the running firmware is untouched because the
//! partition swap only happens after a complete, verified write.

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use crate::config::TankConfig;
use crate::sync::ControlContext;

#[cfg(target_os = "espidf")]
use crate::sync::UpdateUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    HttpConnect,
    HttpStatus(u16),
    Download,
    PartitionWrite,
    Finalize,
    NotSupported,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpConnect => write!(f, "unable to reach firmware server"),
            Self::HttpStatus(code) => write!(f, "firmware server returned HTTP {}", code),
            Self::Download => write!(f, "firmware download interrupted"),
            Self::PartitionWrite => write!(f, "flash write to OTA partition failed"),
            Self::Finalize => write!(f, "image verification or boot-partition swap failed"),
            Self::NotSupported => write!(f, "firmware update unavailable on this target"),
        }
    }
}

impl std::error::Error for UpdateError {}

/// Mark the running image as good so the rollback watchdog does not revert
/// to the previous firmware. Call once early in boot.
#[cfg(target_os = "espidf")]
pub fn check_rollback() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("ota: firmware marked valid, rollback cancelled"),
        Err(e) => warn!("ota: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn check_rollback() {
    info!("ota: rollback check skipped (simulation)");
}

pub struct UpdateTask {
    recv_timeout: Duration,
}

impl UpdateTask {
    pub fn new(config: &TankConfig) -> Self {
        Self {
            recv_timeout: Duration::from_millis(u64::from(config.recv_timeout_ms)),
        }
    }

    /// Task body: wait for an upgrade request, flash it, reboot.
    pub fn run(self, ctx: Arc<ControlContext>) -> ! {
        loop {
            let Some(url) = ctx.update_cmd.recv_timeout(self.recv_timeout) else {
                continue;
            };
            info!("ota: firmware upgrade requested from {}", url);
            match self.perform(&url) {
                Ok(()) => {
                    info!("ota: image flashed, rebooting into new firmware");
                    #[cfg(target_os = "espidf")]
                    esp_ota::restart();
                }
                Err(e) => {
                    error!("ota: update failed: {}", e);
                }
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn perform(&self, url: &UpdateUrl) -> Result<(), UpdateError> {
        use embedded_svc::http::client::{Client as HttpClient, Method};
        use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
        use esp_idf_svc::io::Read;
        use esp_idf_svc::sys::esp_crt_bundle_attach;

        let connection = EspHttpConnection::new(&HttpConfiguration {
            buffer_size: Some(1024),
            timeout: Some(Duration::from_secs(60)),
            crt_bundle_attach: Some(esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| UpdateError::HttpConnect)?;
        let mut client = HttpClient::wrap(connection);

        let request = client
            .request(Method::Get, url.as_str(), &[("accept", "application/octet-stream")])
            .map_err(|_| UpdateError::HttpConnect)?;
        let mut response = request.submit().map_err(|_| UpdateError::HttpConnect)?;
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(UpdateError::HttpStatus(status));
        }

        let mut update = esp_ota::OtaUpdate::begin().map_err(|e| {
            warn!("ota: begin failed: {:?}", e);
            UpdateError::PartitionWrite
        })?;

        let mut buf = [0u8; 4096];
        let mut total: usize = 0;
        loop {
            let n = response.read(&mut buf).map_err(|_| UpdateError::Download)?;
            if n == 0 {
                break;
            }
            update.write(&buf[..n]).map_err(|e| {
                warn!("ota: flash write failed at {} bytes: {:?}", total, e);
                UpdateError::PartitionWrite
            })?;
            total += n;
        }
        info!("ota: {} bytes written, verifying image", total);

        let mut completed = update.finalize().map_err(|e| {
            warn!("ota: finalize failed: {:?}", e);
            UpdateError::Finalize
        })?;
        completed.set_as_boot_partition().map_err(|e| {
            warn!("ota: set_as_boot_partition failed: {:?}", e);
            UpdateError::Finalize
        })?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn perform(&self, url: &crate::sync::UpdateUrl) -> Result<(), UpdateError> {
        warn!("ota: simulation target, ignoring upgrade from {}", url);
        Err(UpdateError::NotSupported)
    }
}
