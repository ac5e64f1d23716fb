//! Integration tests: level monitor → mailboxes → actuator tasks.
//!
//! Wires the real monitor, motor, and beep tasks through one shared
//! `ControlContext` with mock hardware ports, and steps them the way the
//! firmware's threads interleave: motor poll (sense + drain), sampling
//! cycle, beep poll.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tanksentry::actuators::beep::BeepTask;
use tanksentry::actuators::motor::MotorTask;
use tanksentry::adapters::http::{dispatch, parse_control_body};
use tanksentry::config::TankConfig;
use tanksentry::control::monitor::LevelMonitor;
use tanksentry::error::SensorError;
use tanksentry::ports::{AlertPort, LevelSensePort, MotorPort};
use tanksentry::sync::{ControlContext, StatusFlag};

// ── Shared-handle mocks ───────────────────────────────────────
//
// The task structs own their ports, so each mock is a cheap handle onto
// state the test also holds.

#[derive(Default)]
struct LevelState {
    full: bool,
}

#[derive(Clone, Default)]
struct SharedLevel(Arc<Mutex<LevelState>>);

impl SharedLevel {
    fn set_full(&self, full: bool) {
        self.0.lock().unwrap().full = full;
    }
}

impl LevelSensePort for SharedLevel {
    fn read_level(&mut self) -> Result<bool, SensorError> {
        Ok(self.0.lock().unwrap().full)
    }
}

#[derive(Default)]
struct MotorState {
    sense: bool,
    relay_writes: Vec<bool>,
}

#[derive(Clone, Default)]
struct SharedMotor(Arc<Mutex<MotorState>>);

impl SharedMotor {
    fn set_sense(&self, running: bool) {
        self.0.lock().unwrap().sense = running;
    }
    fn relay_writes(&self) -> Vec<bool> {
        self.0.lock().unwrap().relay_writes.clone()
    }
}

impl MotorPort for SharedMotor {
    fn sense_running(&mut self) -> bool {
        self.0.lock().unwrap().sense
    }
    fn set_relay(&mut self, on: bool) {
        self.0.lock().unwrap().relay_writes.push(on);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertCall {
    Burst,
    Silence,
}

#[derive(Clone, Default)]
struct SharedAlert(Arc<Mutex<Vec<AlertCall>>>);

impl SharedAlert {
    fn calls(&self) -> Vec<AlertCall> {
        self.0.lock().unwrap().clone()
    }
}

impl AlertPort for SharedAlert {
    fn burst(&mut self) {
        self.0.lock().unwrap().push(AlertCall::Burst);
    }
    fn silence(&mut self) {
        self.0.lock().unwrap().push(AlertCall::Silence);
    }
}

// ── Harness ───────────────────────────────────────────────────

struct Rig {
    ctx: ControlContext,
    level: SharedLevel,
    motor_hw: SharedMotor,
    alert_hw: SharedAlert,
    monitor: LevelMonitor<SharedLevel>,
    motor: MotorTask<SharedMotor>,
    beep: BeepTask<SharedAlert>,
}

impl Rig {
    fn new(config: &TankConfig) -> Self {
        let level = SharedLevel::default();
        let motor_hw = SharedMotor::default();
        let alert_hw = SharedAlert::default();
        Self {
            ctx: ControlContext::new(),
            monitor: LevelMonitor::new(config, level.clone()),
            motor: MotorTask::new(config, motor_hw.clone()),
            beep: BeepTask::new(config, alert_hw.clone()),
            level,
            motor_hw,
            alert_hw,
        }
    }

    /// One full interleaving: motor task first (publishes the running
    /// flag and drains any pending command), then the sampling cycle,
    /// then the beep task.
    fn step(&mut self) {
        self.motor.poll(&self.ctx);
        self.monitor.cycle(&self.ctx);
        self.beep.poll(&self.ctx);
    }
}

/// Millisecond timeouts so the bounded mailbox waits don't slow the suite.
fn quick_config() -> TankConfig {
    TankConfig {
        send_timeout_ms: 10,
        recv_timeout_ms: 1,
        ..TankConfig::default()
    }
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn sustained_full_beeps_then_cuts_the_motor() {
    let mut rig = Rig::new(&quick_config());
    rig.motor_hw.set_sense(true);
    rig.level.set_full(true);

    // Defaults: 4-of-10 debounce, alert after 4 full cycles, cutoff after
    // 5. With every sample reading full, the window crosses its threshold
    // on cycle 4, the alert lands on cycle 7, the cutoff on cycle 8.
    for _ in 0..6 {
        rig.step();
    }
    assert!(rig.alert_hw.calls().is_empty(), "no alert before cycle 7");
    assert!(rig.motor_hw.relay_writes().is_empty());

    rig.step();
    assert_eq!(rig.alert_hw.calls(), vec![AlertCall::Burst]);
    assert!(rig.motor_hw.relay_writes().is_empty(), "alert precedes cutoff");

    rig.step();
    // The cutoff command is drained by the motor poll of the next step.
    rig.step();
    assert_eq!(rig.motor_hw.relay_writes(), vec![false]);
}

#[test]
fn motor_stop_retracts_a_standing_alert() {
    let mut rig = Rig::new(&quick_config());
    rig.motor_hw.set_sense(true);
    rig.level.set_full(true);

    for _ in 0..7 {
        rig.step();
    }
    assert_eq!(rig.alert_hw.calls(), vec![AlertCall::Burst]);

    // Contactor drops out (operator intervention, power cut, cutoff).
    rig.motor_hw.set_sense(false);
    rig.step();
    assert_eq!(
        rig.alert_hw.calls(),
        vec![AlertCall::Burst, AlertCall::Silence]
    );
    assert!(!rig.ctx.flags.is_set(StatusFlag::MotorRunning));
}

#[test]
fn receding_level_retracts_alert_without_cutoff() {
    // Tighter debounce so the verdict can fall back to not-full before
    // the cutoff threshold is reached: 2-of-3 window, alert after 2 full
    // cycles, cutoff after 4.
    let config = TankConfig {
        debounce_window: 3,
        debounce_threshold: 2,
        beep_threshold: 2,
        motor_off_threshold: 4,
        send_timeout_ms: 10,
        recv_timeout_ms: 1,
        ..TankConfig::default()
    };
    let mut rig = Rig::new(&config);
    rig.motor_hw.set_sense(true);
    rig.level.set_full(true);

    // Full verdicts on cycles 2 and 3 put the alert on at cycle 3.
    for _ in 0..3 {
        rig.step();
    }
    assert_eq!(rig.alert_hw.calls(), vec![AlertCall::Burst]);

    // Splash subsides: window [T,T,F] still reads full on cycle 4 (the
    // active alert re-bursts on its poll timeout there), then [T,F,F] on
    // cycle 5 drops below threshold and retracts the alert.
    rig.level.set_full(false);
    rig.step();
    rig.step();
    assert_eq!(rig.alert_hw.calls().last(), Some(&AlertCall::Silence));
    assert!(rig.motor_hw.relay_writes().is_empty(), "no cutoff was issued");
}

#[test]
fn active_alert_rebeeps_on_every_idle_poll() {
    let mut rig = Rig::new(&quick_config());
    rig.motor_hw.set_sense(true);
    rig.level.set_full(true);

    for _ in 0..7 {
        rig.step();
    }
    assert_eq!(rig.alert_hw.calls().len(), 1);

    // No new command arrives; each receive timeout re-asserts the burst.
    rig.beep.poll(&rig.ctx);
    rig.beep.poll(&rig.ctx);
    assert_eq!(
        rig.alert_hw.calls(),
        vec![AlertCall::Burst, AlertCall::Burst, AlertCall::Burst]
    );
}

#[test]
fn http_motor_command_reaches_the_relay() {
    let mut rig = Rig::new(&quick_config());

    let request = parse_control_body("motor=on").unwrap();
    dispatch(&rig.ctx, request, Duration::from_millis(10)).unwrap();

    // Motor is sensed off, so the command level-sets the relay on.
    rig.motor.poll(&rig.ctx);
    assert_eq!(rig.motor_hw.relay_writes(), vec![true]);

    // The contactor closes; the sense input confirms and the flag follows.
    rig.motor_hw.set_sense(true);
    rig.motor.poll(&rig.ctx);
    assert!(rig.ctx.flags.is_set(StatusFlag::MotorRunning));
}

#[test]
fn http_firmware_request_lands_in_update_mailbox() {
    let rig = Rig::new(&quick_config());

    let request = parse_control_body("firmware-upgrade=https://host/fw.bin").unwrap();
    dispatch(&rig.ctx, request, Duration::from_millis(10)).unwrap();

    let url = rig.ctx.update_cmd.try_recv().unwrap();
    assert_eq!(url.as_str(), "https://host/fw.bin");
}

#[test]
fn no_commands_flow_while_motor_is_stopped() {
    let mut rig = Rig::new(&quick_config());
    rig.level.set_full(true);

    // Motor never runs: the monitor takes no samples, so no amount of
    // "full" water can produce an alert or a cutoff.
    for _ in 0..10 {
        rig.step();
    }
    assert!(rig.alert_hw.calls().is_empty());
    assert!(rig.motor_hw.relay_writes().is_empty());
    assert!(!rig.ctx.alert_cmd.is_pending());
    assert!(!rig.ctx.motor_cmd.is_pending());
}
