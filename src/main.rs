//! TankSentry firmware — main entry point.
//!
//! Task layout (all plain `std::thread`s, FreeRTOS tasks under ESP-IDF):
//!
//! ```text
//!   level-monitor ──┬─> alert_cmd  mailbox ──> beep task ──> beeper GPIO
//!                   └─> motor_cmd  mailbox ─┬> motor task ─> relay GPIO
//!   http /control ──────────────────────────┘        │
//!                                                    └─> MotorRunning flag
//!   wifi manager ──> Network* flags ──> http server / status
//!   http /control ──> update_cmd mailbox ──> ota task ──> reboot
//! ```
//!
//! Boot order matters: the relay line is forced to its inactive level
//! before pin configuration, and the status LED stays lit until every
//! task has been spawned.

#![deny(unused_must_use)]

use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use log::{info, warn};

use tanksentry::actuators::beep::BeepTask;
use tanksentry::actuators::motor::MotorTask;
use tanksentry::adapters::hardware::{GpioAlert, GpioLevelSensor, GpioMotor};
use tanksentry::adapters::nvs::NvsStore;
use tanksentry::adapters::ota::{self, UpdateTask};
use tanksentry::adapters::wifi::WifiManager;
use tanksentry::adapters::http;
use tanksentry::config::TankConfig;
use tanksentry::control::monitor::LevelMonitor;
use tanksentry::drivers::hw_init;
use tanksentry::drivers::status_led::StatusLed;
use tanksentry::ports::ConfigPort;
use tanksentry::sync::ControlContext;

// Station credentials are baked in at build time, like the sdkconfig
// values they replace.
const WIFI_SSID: &str = match option_env!("TANKSENTRY_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "tanksentry",
};
const WIFI_PASSWORD: &str = match option_env!("TANKSENTRY_WIFI_PASSWORD") {
    Some(password) => password,
    None => "changeme-8chars",
};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init().context("logger init")?;

    info!("TankSentry v{}", env!("CARGO_PKG_VERSION"));
    ota::check_rollback();

    // ── 2. Hardware bring-up ──────────────────────────────────
    let mut led = StatusLed::new();
    led.set(true);
    hw_init::init_gpio().map_err(|e| anyhow::anyhow!("GPIO init failed: {e}"))?;

    // ── 3. Configuration ──────────────────────────────────────
    let nvs_store = match NvsStore::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS unavailable ({e}), running with defaults and no persistence");
            None
        }
    };
    let config = match nvs_store.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => {
            info!("config loaded from NVS");
            cfg
        }
        Some(Err(e)) => {
            warn!("config load failed ({e}), using defaults");
            TankConfig::default()
        }
        None => TankConfig::default(),
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))?;

    // ── 4. Shared context + peripherals ───────────────────────
    let ctx = Arc::new(ControlContext::new());

    let peripherals =
        esp_idf_svc::hal::peripherals::Peripherals::take().context("peripherals")?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take().context("sysloop")?;
    let nvs_partition =
        esp_idf_svc::nvs::EspDefaultNvsPartition::take().context("nvs partition")?;
    let wifi = WifiManager::new(
        peripherals.modem,
        sysloop,
        nvs_partition,
        WIFI_SSID,
        WIFI_PASSWORD,
    )
    .map_err(|e| anyhow::anyhow!("wifi init failed: {e}"))?;

    // ── 5. Spawn tasks ────────────────────────────────────────
    let beep = BeepTask::new(&config, GpioAlert::new(&config));
    let beep_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("beep".into())
        .stack_size(4096)
        .spawn(move || beep.run(beep_ctx))
        .context("spawn beep task")?;

    let motor = MotorTask::new(&config, GpioMotor);
    let motor_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("motor".into())
        .stack_size(4096)
        .spawn(move || motor.run(motor_ctx))
        .context("spawn motor task")?;

    let monitor = LevelMonitor::new(&config, GpioLevelSensor::new(&config));
    let monitor_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("level-monitor".into())
        .stack_size(6144)
        .spawn(move || monitor.run(monitor_ctx))
        .context("spawn level monitor")?;

    let wifi_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("wifi".into())
        .stack_size(8192)
        .spawn(move || wifi.run(wifi_ctx))
        .context("spawn wifi manager")?;

    let http_ctx = Arc::clone(&ctx);
    let http_config = config.clone();
    thread::Builder::new()
        .name("http".into())
        .stack_size(8192)
        .spawn(move || http::run(http_ctx, &http_config))
        .context("spawn http supervisor")?;

    let update = UpdateTask::new(&config);
    let update_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("ota".into())
        .stack_size(8192)
        .spawn(move || update.run(update_ctx))
        .context("spawn ota task")?;

    // ── 6. Running ────────────────────────────────────────────
    led.set(false);
    info!("all tasks started");

    loop {
        thread::park();
    }
}
