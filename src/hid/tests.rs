//! Unit tests for the HID personalities.
//!
//! These tests run on the host (not embedded) against a simulated
//! accessory and check the update / change-detect / build cycle of each
//! personality.

use super::joystick::{pack, Joystick, JOYSTICK_REPORT_DESCRIPTOR, JOYSTICK_REPORT_SIZE};
use super::mouse::{apply_deadzone, Mouse, MouseReport, BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT, MOUSE_REPORT_SIZE};
use super::raw::{RawBridge, REPLY_BAD_PARAM, REPLY_ECHO, REPLY_OK, REPLY_TIMEOUT};
use super::{ActivePersonality, Personality, ReportBuffer, MAX_REPORT_SIZE};
use crate::accessory::Accessory;
use crate::decode::{Calibration, DecodeSettings, NormalizedSample, PeripheralId, RawSample};
use crate::error::CommandError;
use crate::settings::{DeviceConfig, Mode};
use crate::testing::{NoDelay, SimAccessory};

const NUNCHUK_IDLE: [u8; 6] = [0x80, 0x80, 0x80, 0x80, 0x80, 0xFF];
/// Sticks centred, triggers released, nothing pressed.
const CLASSIC_IDLE: [u8; 6] = [0xA0, 0x20, 0x10, 0x00, 0xFF, 0xFF];

fn joystick(sim: &mut SimAccessory) -> Joystick<&mut SimAccessory, NoDelay> {
    let accessory = Accessory::new(sim, NoDelay).with_settle_ticks(0);
    Joystick::with_accessory(accessory, DecodeSettings::default())
}

fn mouse<'a>(sim: &'a mut SimAccessory, config: &DeviceConfig) -> Mouse<&'a mut SimAccessory, NoDelay> {
    let accessory = Accessory::new(sim, NoDelay).with_settle_ticks(0);
    Mouse::with_accessory(accessory, DecodeSettings::default(), config)
}

fn build<P: Personality>(p: &mut P) -> ReportBuffer {
    let mut report = [0u8; MAX_REPORT_SIZE];
    assert_eq!(p.build_report(&mut report), p.report_size());
    report
}

/// Update, and build if anything changed.
fn cycle<P: Personality>(p: &mut P) -> Option<ReportBuffer> {
    p.update();
    if p.has_changed() {
        Some(build(p))
    } else {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Joystick
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn joystick_packs_ten_bit_axes() {
    let s = NormalizedSample::new(0x12, 0x34, 0x3FF, 0x000, 0x3FF, 0xA5, 0x5A);
    assert_eq!(pack(&s), [0x12, 0x34, 0xFF, 0x03, 0xF0, 0x3F, 0xA5, 0x5A]);
    let s = NormalizedSample::new(0, 0, 0x000, 0x3FF, 0x000, 0, 0);
    assert_eq!(pack(&s), [0, 0, 0x00, 0xFC, 0x0F, 0x00, 0, 0]);
}

#[test]
fn joystick_neutral_report() {
    assert_eq!(
        pack(&NormalizedSample::NEUTRAL),
        [0x80, 0x80, 0x00, 0x02, 0x08, 0x20, 0x00, 0x00]
    );
}

#[test]
fn joystick_first_update_always_reports() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.present = false;
    let mut joy = joystick(&mut sim);
    joy.update();
    assert!(joy.has_changed());
    let report = build(&mut joy);
    assert_eq!(&report[..JOYSTICK_REPORT_SIZE], &pack(&NormalizedSample::NEUTRAL));
    // Nothing new after that.
    assert_eq!(cycle(&mut joy), None);
}

#[test]
fn joystick_build_is_idempotent() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let mut joy = joystick(&mut sim);
    joy.update();
    joy.update();
    let a = build(&mut joy);
    let b = build(&mut joy);
    assert_eq!(a, b);
    assert!(!joy.has_changed());
}

#[test]
fn joystick_reports_only_on_change() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let mut joy = joystick(&mut sim);
    cycle(&mut joy); // identification tick
    cycle(&mut joy); // first sample
    assert_eq!(cycle(&mut joy), None);

    joy.accessory().registers().bus().set_report([0xFF, 0x80, 0x80, 0x80, 0x80, 0xFE]);
    let report = cycle(&mut joy).expect("stick moved");
    assert_eq!(report[0], 0xFF);
    assert_eq!(report[6], 0x01); // Z
    assert_eq!(cycle(&mut joy), None);
}

#[test]
fn joystick_classic_buttons_in_both_bytes() {
    let mut sim = SimAccessory::new(PeripheralId::ClassicController);
    let mut b = CLASSIC_IDLE;
    b[5] = !0x10; // A
    b[4] = !0x10; // Minus
    sim.set_report(b);
    let mut joy = joystick(&mut sim);
    joy.update();
    joy.update();
    let report = build(&mut joy);
    assert_eq!(report[6], 0x01);
    assert_eq!(report[7], 0x01);
}

#[test]
fn joystick_unplug_reports_neutral_and_recalibrates() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    // Connect with both buttons held: rz parked.
    sim.set_report([0x80, 0x80, 0x80, 0x80, 0xFF, 0xFC]);
    let mut joy = joystick(&mut sim);
    joy.update();
    joy.update();
    assert_eq!(build(&mut joy)[5], (NormalizedSample::AXIS_CENTER >> 4) as u8);

    joy.accessory().registers().bus().present = false;
    joy.update();
    assert_eq!(&build(&mut joy)[..JOYSTICK_REPORT_SIZE], &pack(&NormalizedSample::NEUTRAL));

    // Back, buttons released: rz follows the accelerometer again.
    joy.accessory().registers().bus().present = true;
    joy.accessory().registers().bus().set_report([0x80, 0x80, 0x80, 0x80, 0xFF, 0xC3]);
    joy.update();
    joy.update();
    assert_eq!(build(&mut joy)[5], 0x3F);
}

#[test]
fn joystick_descriptor_is_one_application_collection() {
    let d = JOYSTICK_REPORT_DESCRIPTOR;
    assert_eq!(d[0..2], [0x05, 0x01]);
    assert_eq!(d[d.len() - 1], 0xC0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Reconnect
// ═══════════════════════════════════════════════════════════════════════════

fn tuned_joystick(sim: &mut SimAccessory, settings: DecodeSettings) -> Joystick<&mut SimAccessory, NoDelay> {
    let accessory = Accessory::new(sim, NoDelay).with_settle_ticks(0);
    Joystick::with_accessory(accessory, settings)
}

/// Unplugs the accessory for one tick, then plugs `report` back in.
fn replug(joy: &mut Joystick<&mut SimAccessory, NoDelay>, report: [u8; 6]) {
    joy.accessory().registers().bus().present = false;
    joy.update();
    let sim = joy.accessory().registers().bus();
    sim.present = true;
    sim.set_report(report);
    joy.update(); // identification tick
}

fn rx(report: &ReportBuffer) -> u16 {
    u16::from(report[2]) | (u16::from(report[3] & 0x03) << 8)
}

/// MotionPlus sample with roll and pitch at rest.
fn gyro(yaw: u16) -> [u8; 6] {
    [yaw as u8, 0x00, 0x00, ((yaw >> 8) as u8) << 2 | 0x03, 0x82, 0x82]
}

#[test]
fn reconnect_forgets_classic_slider_toggle() {
    let settings = DecodeSettings { hold_ticks: 2, ..DecodeSettings::default() };
    let mut sim = SimAccessory::new(PeripheralId::ClassicController);
    sim.set_report(CLASSIC_IDLE);
    let mut joy = tuned_joystick(&mut sim, settings);
    joy.update();
    joy.update();
    assert!(!joy.calibration().sliders_enabled());

    // Hold Home until the sliders switch on.
    let mut home = CLASSIC_IDLE;
    home[4] = !0x08;
    joy.accessory().registers().bus().set_report(home);
    joy.update();
    joy.update();
    assert!(joy.calibration().sliders_enabled());

    // Right trigger fully down, Home released.
    let mut trigger = CLASSIC_IDLE;
    trigger[3] = 0x1F;
    replug(&mut joy, trigger);
    joy.update();
    assert!(!joy.calibration().sliders_enabled());

    let fresh = Calibration::new(settings).decode(PeripheralId::ClassicController, &RawSample(trigger));
    assert_eq!(fresh.rz, NormalizedSample::AXIS_CENTER);
    assert_eq!(&build(&mut joy)[..JOYSTICK_REPORT_SIZE], &pack(&fresh));
}

#[test]
fn reconnect_relearns_motion_plus_baseline() {
    let settings = DecodeSettings { baseline_samples: 2, ..DecodeSettings::default() };
    let mut sim = SimAccessory::new(PeripheralId::MotionPlus);
    sim.set_report(gyro(0x2100));
    let mut joy = tuned_joystick(&mut sim, settings);
    joy.update();
    joy.update();
    joy.update();
    // Baseline learnt at yaw 0x100.
    joy.update();
    assert_eq!(rx(&build(&mut joy)), NormalizedSample::AXIS_CENTER);

    // Back at rest: a stale baseline would read 0x100 >> 4 below centre.
    replug(&mut joy, gyro(0x2000));
    joy.update();
    assert_eq!(rx(&build(&mut joy)), NormalizedSample::AXIS_CENTER);
    joy.update();
    assert_eq!(rx(&build(&mut joy)), NormalizedSample::AXIS_CENTER);

    // New baseline is zero.
    joy.accessory().registers().bus().set_report(gyro(0x2100));
    joy.update();
    assert_eq!(rx(&build(&mut joy)), NormalizedSample::AXIS_CENTER + 0x10);
}

// ═══════════════════════════════════════════════════════════════════════════
// Mouse Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn mouse_report_empty() {
    let report = MouseReport::empty();
    assert!(report.is_idle());
}

#[test]
fn mouse_report_serialize() {
    let report = MouseReport { buttons: 0x05, x: -10, y: 20, wheel: -1 };
    let mut buf = [0u8; 4];
    assert_eq!(report.serialize(&mut buf), MOUSE_REPORT_SIZE);
    assert_eq!(buf, [0x05, 0xF6, 0x14, 0xFF]);
}

#[test]
fn mouse_report_serialize_buffer_too_small() {
    let mut small_buf = [0u8; 2];
    assert_eq!(MouseReport::empty().serialize(&mut small_buf), 0);
}

#[test]
fn deadzone_subtracts_toward_zero() {
    assert_eq!(apply_deadzone(10, 10), 0);
    assert_eq!(apply_deadzone(-10, 10), 0);
    assert_eq!(apply_deadzone(11, 10), 1);
    assert_eq!(apply_deadzone(-30, 10), -20);
    assert_eq!(apply_deadzone(5, 0), 5);
}

// ═══════════════════════════════════════════════════════════════════════════
// Mouse Personality
// ═══════════════════════════════════════════════════════════════════════════

fn config(divisor: u8, deadzone: u8) -> DeviceConfig {
    DeviceConfig {
        mode: Mode::Mouse,
        mouse_divisor: divisor,
        mouse_deadzone: deadzone,
        ..DeviceConfig::default()
    }
}

/// Connects and consumes the identification tick and first sample.
fn connected_mouse<'a>(sim: &'a mut SimAccessory, config: &DeviceConfig) -> Mouse<&'a mut SimAccessory, NoDelay> {
    let mut m = mouse(sim, config);
    cycle(&mut m);
    cycle(&mut m);
    m
}

#[test]
fn mouse_motion_is_relative_to_connection_origin() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    // Rest position off-centre.
    sim.set_report([0x90, 0x70, 0x80, 0x80, 0x80, 0xFF]);
    let mut m = connected_mouse(&mut sim, &config(1, 0));
    m.update();
    assert_eq!(m.current(), MouseReport::empty());

    // 30 right, stick 20 up (y is flipped, so pointer moves up).
    m.accessory().registers().bus().set_report([0xAE, 0x84, 0x80, 0x80, 0x80, 0xFF]);
    m.update();
    assert_eq!(m.current(), MouseReport { buttons: 0, x: 30, y: -20, wheel: 0 });
}

#[test]
fn mouse_deadzone_then_divisor() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let mut m = connected_mouse(&mut sim, &config(4, 10));
    m.accessory().registers().bus().set_report([0x80 + 50, 0x80 - 8, 0x80, 0x80, 0x80, 0xFF]);
    m.update();
    // x: (50 - 10) / 4 = 10; y: 8 is inside the deadzone.
    assert_eq!(m.current().x, 10);
    assert_eq!(m.current().y, 0);
}

#[test]
fn mouse_deltas_saturate() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report([0x00, 0x80, 0x80, 0x80, 0x80, 0xFF]);
    let mut m = connected_mouse(&mut sim, &config(1, 0));
    m.accessory().registers().bus().set_report([0xFF, 0x80, 0x80, 0x80, 0x80, 0xFF]);
    m.update();
    assert_eq!(m.current().x, 127);
}

#[test]
fn mouse_final_zero_report_after_motion() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let mut m = connected_mouse(&mut sim, &config(1, 0));
    assert_eq!(cycle(&mut m), None);

    m.accessory().registers().bus().set_report([0x90, 0x80, 0x80, 0x80, 0x80, 0xFF]);
    assert_eq!(cycle(&mut m).map(|r| r[1]), Some(0x10));
    // Held deflection keeps reporting.
    assert_eq!(cycle(&mut m).map(|r| r[1]), Some(0x10));

    m.accessory().registers().bus().set_report(NUNCHUK_IDLE);
    let last = cycle(&mut m).expect("one zero report");
    assert_eq!(&last[..MOUSE_REPORT_SIZE], &[0, 0, 0, 0]);
    assert_eq!(cycle(&mut m), None);
    assert_eq!(cycle(&mut m), None);
}

#[test]
fn mouse_nunchuk_buttons() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let mut m = connected_mouse(&mut sim, &config(1, 0));
    m.accessory().registers().bus().set_report([0x80, 0x80, 0x80, 0x80, 0x80, 0xFC]);
    let report = cycle(&mut m).expect("buttons changed");
    assert_eq!(report[0], BUTTON_LEFT | BUTTON_RIGHT);
    // Held: no repeat.
    assert_eq!(cycle(&mut m), None);
}

#[test]
fn mouse_classic_buttons_and_dpad() {
    let mut sim = SimAccessory::new(PeripheralId::ClassicController);
    sim.set_report(CLASSIC_IDLE);
    let mut m = connected_mouse(&mut sim, &config(4, 10));

    let mut b = CLASSIC_IDLE;
    // B (left), Y (right), Plus (middle), dpad up + right.
    b[5] = !(0x40 | 0x20 | 0x01);
    b[4] = !(0x04 | 0x80);
    m.accessory().registers().bus().set_report(b);
    m.update();
    assert_eq!(
        m.current(),
        MouseReport { buttons: BUTTON_LEFT | BUTTON_RIGHT | BUTTON_MIDDLE, x: 1, y: -1, wheel: 0 }
    );
}

#[test]
fn mouse_classic_right_stick_scrolls_once_per_push() {
    let mut sim = SimAccessory::new(PeripheralId::ClassicController);
    sim.set_report(CLASSIC_IDLE);
    let mut m = connected_mouse(&mut sim, &config(4, 10));

    let mut up = CLASSIC_IDLE;
    up[2] = 0x1F; // RY fully up: 31 - 16 = 15 > 8
    m.accessory().registers().bus().set_report(up);
    m.update();
    assert_eq!(m.current().wheel, 1);
    m.update();
    assert_eq!(m.current().wheel, 0);

    m.accessory().registers().bus().set_report(CLASSIC_IDLE);
    m.update();
    m.accessory().registers().bus().set_report(up);
    m.update();
    assert_eq!(m.current().wheel, 1);
}

#[test]
fn mouse_classic_scroll_inversion() {
    let mut sim = SimAccessory::new(PeripheralId::ClassicController);
    sim.set_report(CLASSIC_IDLE);
    let cfg = DeviceConfig { scroll_joystick_invert: true, ..config(4, 10) };
    let mut m = connected_mouse(&mut sim, &cfg);
    let mut down = CLASSIC_IDLE;
    down[2] = 0x00;
    m.accessory().registers().bus().set_report(down);
    m.update();
    assert_eq!(m.current().wheel, 1);
}

#[test]
fn mouse_nunchuk_tilt_scroll() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let cfg = DeviceConfig {
        scroll_nunchuk_threshold: 100,
        scroll_nunchuk_step: 3,
        ..config(1, 0)
    };
    let mut m = connected_mouse(&mut sim, &cfg);
    // Resting AY is 515; tilting to 0xB0 gives 707.
    m.accessory().registers().bus().set_report([0x80, 0x80, 0x80, 0xB0, 0x80, 0xFF]);
    m.update();
    assert_eq!(m.current().wheel, 3);
    m.update();
    assert_eq!(m.current().wheel, 0);
}

#[test]
fn mouse_nunchuk_scroll_by_c() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let cfg = DeviceConfig {
        scroll_nunchuk_c: true,
        scroll_nunchuk_c_threshold: 20,
        ..config(1, 0)
    };
    let mut m = connected_mouse(&mut sim, &cfg);
    // C held, stick pushed up: scroll instead of moving or clicking.
    m.accessory().registers().bus().set_report([0x80, 0xC0, 0x80, 0x80, 0x80, 0xFD]);
    m.update();
    assert_eq!(m.current(), MouseReport { buttons: 0, x: 0, y: 0, wheel: 1 });
}

#[test]
fn mouse_reconfigure_takes_effect_live() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    sim.set_report(NUNCHUK_IDLE);
    let mut m = connected_mouse(&mut sim, &config(1, 0));
    m.configure(&config(2, 0));
    m.accessory().registers().bus().set_report([0x90, 0x80, 0x80, 0x80, 0x80, 0xFF]);
    m.update();
    assert_eq!(m.current().x, 8);
}

// ═══════════════════════════════════════════════════════════════════════════
// Raw passthrough
// ═══════════════════════════════════════════════════════════════════════════

fn raw_request(bridge: &mut RawBridge<&mut SimAccessory, NoDelay>, request: [u8; 7]) -> [u8; 7] {
    bridge.set_feature_report(&request).unwrap();
    let mut reply = [0u8; 7];
    assert_eq!(bridge.get_feature_report(&mut reply), 7);
    reply
}

#[test]
fn raw_echo() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    assert_eq!(raw_request(&mut bridge, [0x01, 1, 2, 3, 4, 5, 6]), [REPLY_ECHO, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn raw_needs_address_first() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    assert_eq!(raw_request(&mut bridge, [0x20, 0xFE, 0, 0, 0, 0, 0])[0], REPLY_BAD_PARAM);
    assert_eq!(raw_request(&mut bridge, [0x02, 0x80, 0, 0, 0, 0, 0])[0], REPLY_BAD_PARAM);
    assert_eq!(raw_request(&mut bridge, [0x02, 0x52, 0, 0, 0, 0, 0])[..2], [REPLY_OK, 0x52]);
    assert_eq!(bridge.address(), Some(0x52));
}

#[test]
fn raw_read_and_write_registers() {
    let mut sim = SimAccessory::new(PeripheralId::ClassicController);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    raw_request(&mut bridge, [0x02, 0x52, 0, 0, 0, 0, 0]);

    // Read 2 registers from 0xFE: the identity.
    assert_eq!(raw_request(&mut bridge, [0x21, 0xFE, 0, 0, 0, 0, 0]), [0x21, 0x01, 0x01, 0, 0, 0, 0]);

    // Write 3 registers at 0x10, read them back.
    assert_eq!(raw_request(&mut bridge, [0x12, 0x10, 0xAA, 0xBB, 0xCC, 0, 0])[0], REPLY_OK);
    assert_eq!(raw_request(&mut bridge, [0x22, 0x10, 0, 0, 0, 0, 0]), [0x22, 0xAA, 0xBB, 0xCC, 0, 0, 0]);
}

#[test]
fn raw_lengths_that_do_not_fit_are_bad_params() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    raw_request(&mut bridge, [0x02, 0x52, 0, 0, 0, 0, 0]);
    assert_eq!(raw_request(&mut bridge, [0x15, 0x10, 1, 2, 3, 4, 5])[0], REPLY_BAD_PARAM);
    assert_eq!(raw_request(&mut bridge, [0x26, 0x00, 0, 0, 0, 0, 0])[0], REPLY_BAD_PARAM);
    assert_eq!(raw_request(&mut bridge, [0x33, 0x00, 0, 0, 0, 0, 0])[0], REPLY_BAD_PARAM);
}

#[test]
fn raw_absent_target_times_out() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    raw_request(&mut bridge, [0x02, 0x30, 0, 0, 0, 0, 0]);
    assert_eq!(raw_request(&mut bridge, [0x20, 0x00, 0, 0, 0, 0, 0])[0], REPLY_TIMEOUT);
}

#[test]
fn raw_rejects_wrong_feature_length() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    assert_eq!(bridge.set_feature_report(&[0x01, 2, 3]), Err(CommandError::BadLength));
}

#[test]
fn raw_has_no_input_reports() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut bridge = RawBridge::new(&mut sim, NoDelay);
    assert_eq!(cycle(&mut bridge), None);
    assert_eq!(bridge.report_size(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Mode selection
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn personality_follows_configured_mode() {
    for mode in [Mode::Joystick, Mode::Mouse, Mode::Raw] {
        let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
        let cfg = DeviceConfig { mode, ..DeviceConfig::default() };
        let p = ActivePersonality::new(&mut sim, NoDelay, &cfg);
        assert_eq!(p.mode(), mode);
    }
}

#[test]
fn personalities_have_distinct_identities() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let joy = ActivePersonality::new(&mut sim, NoDelay, &DeviceConfig::default());
    let joy_info = joy.device_info();
    assert_eq!(joy.report_size(), JOYSTICK_REPORT_SIZE);

    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mouse = ActivePersonality::new(&mut sim, NoDelay, &config(4, 10));
    assert_eq!(mouse.report_size(), MOUSE_REPORT_SIZE);
    assert_ne!(mouse.device_info().product_id, joy_info.product_id);
}

#[test]
fn only_raw_mode_accepts_feature_reports() {
    let mut sim = SimAccessory::new(PeripheralId::Nunchuk);
    let mut joy = ActivePersonality::new(&mut sim, NoDelay, &DeviceConfig::default());
    assert_eq!(joy.set_feature_report(&[0x01, 0, 0, 0, 0, 0, 0]), Err(CommandError::Unsupported));
}
