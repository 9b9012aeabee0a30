//! Mouse personality (boot protocol compatible report).
//!
//! Layout (4 bytes):
//! ```text
//! Byte 0: Button bitfield
//!         Bit 0 = Left, Bit 1 = Right, Bit 2 = Middle
//! Byte 1: X displacement (signed, -127..127)
//! Byte 2: Y displacement (signed, -127..127)
//! Byte 3: Scroll wheel  (signed, -127..127)
//! ```
//!
//! The stick is read as an offset from where it rested when the accessory
//! was connected. Deadzone and divisor shape that offset into a pointer
//! speed; directional buttons override it with single-step moves.

use embedded_hal::delay::DelayNs;

use super::{DeviceInfo, Personality, ReportBuffer};
use crate::accessory::{Accessory, Poll};
use crate::bus::Bus;
use crate::config::{USB_PID_MOUSE, USB_PRODUCT_MOUSE, USB_VID};
use crate::decode::{classic, nunchuk, Calibration, DecodeSettings, NormalizedSample, PeripheralId};
use crate::settings::DeviceConfig;

/// Mouse report size in bytes.
pub const MOUSE_REPORT_SIZE: usize = 4;

pub const BUTTON_LEFT: u8 = 0x01;
pub const BUTTON_RIGHT: u8 = 0x02;
pub const BUTTON_MIDDLE: u8 = 0x04;

/// Right stick travel (5-bit units from centre) needed to scroll.
pub const STICK_SCROLL_THRESHOLD: i16 = 8;

const DIR_UP: u8 = 0x01;
const DIR_DOWN: u8 = 0x02;
const DIR_RIGHT: u8 = 0x04;
const DIR_LEFT: u8 = 0x08;

/// Standard USB HID boot-protocol mouse report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Relative X movement (signed).
    pub x: i8,
    /// Relative Y movement (signed).
    pub y: i8,
    /// Scroll wheel delta (signed).
    pub wheel: i8,
}

impl MouseReport {
    /// Create an idle (no movement, no buttons) report.
    pub const fn empty() -> Self {
        Self {
            buttons: 0,
            x: 0,
            y: 0,
            wheel: 0,
        }
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (0 if `buf` is too short).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < MOUSE_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.buttons;
        buf[1] = self.x as u8;
        buf[2] = self.y as u8;
        buf[3] = self.wheel as u8;
        MOUSE_REPORT_SIZE
    }

    /// Returns `true` when no buttons are pressed and there is no movement.
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.buttons == 0 && self.x == 0 && self.y == 0 && self.wheel == 0
    }
}

/// Moves `v` toward zero by `deadzone`; anything inside it becomes 0.
pub fn apply_deadzone(v: i16, deadzone: u8) -> i16 {
    let d = i16::from(deadzone);
    if v > d {
        v - d
    } else if v < -d {
        v + d
    } else {
        0
    }
}

fn saturate(v: i16) -> i8 {
    v.clamp(-127, 127) as i8
}

/// One wheel click each time an axis leaves its dead band.
#[derive(Debug, Clone, Copy, Default)]
struct ScrollEdge {
    engaged: bool,
}

impl ScrollEdge {
    fn step(&mut self, value: i16, threshold: i16) -> i16 {
        if value.abs() <= threshold {
            self.engaged = false;
            return 0;
        }
        if self.engaged {
            return 0;
        }
        self.engaged = true;
        value.signum()
    }

    fn release(&mut self) {
        self.engaged = false;
    }
}

/// Gyroscope rate (10-bit, centred) to a stick-like 8-bit position.
fn gyro_to_stick(axis: u16) -> u8 {
    ((i32::from(axis) - i32::from(NormalizedSample::AXIS_CENTER)) / 4 + 128).clamp(0, 255) as u8
}

fn pointer_position(id: PeripheralId, s: &NormalizedSample) -> (u8, u8) {
    match id {
        PeripheralId::MotionPlus => (gyro_to_stick(s.rx), gyro_to_stick(s.rz)),
        _ => (s.x, s.y),
    }
}

pub struct Mouse<B, D> {
    accessory: Accessory<B, D>,
    calibration: Calibration,
    config: DeviceConfig,
    origin: Option<(u8, u8)>,
    stick_scroll: ScrollEdge,
    tilt_scroll: ScrollEdge,
    current: MouseReport,
    reported: MouseReport,
    active: bool,
    was_moving: bool,
}

impl<B: Bus, D: DelayNs> Mouse<B, D> {
    pub fn new(bus: B, delay: D, config: &DeviceConfig) -> Self {
        Self::with_accessory(Accessory::new(bus, delay), DecodeSettings::default(), config)
    }

    pub fn with_accessory(accessory: Accessory<B, D>, settings: DecodeSettings, config: &DeviceConfig) -> Self {
        Self {
            accessory,
            calibration: Calibration::new(settings),
            config: *config,
            origin: None,
            stick_scroll: ScrollEdge::default(),
            tilt_scroll: ScrollEdge::default(),
            current: MouseReport::empty(),
            reported: MouseReport::empty(),
            active: false,
            was_moving: true,
        }
    }

    pub fn accessory(&mut self) -> &mut Accessory<B, D> {
        &mut self.accessory
    }

    /// Report the next build would send.
    pub fn current(&self) -> MouseReport {
        self.current
    }

    fn start_connection(&mut self) {
        self.calibration.reset();
        self.origin = None;
        self.stick_scroll = ScrollEdge::default();
        self.tilt_scroll = ScrollEdge::default();
    }

    fn translate(&mut self, id: PeripheralId, sample: &NormalizedSample) {
        let pointer = pointer_position(id, sample);
        let origin = *self.origin.get_or_insert(pointer);
        let mut dx = i16::from(pointer.0) - i16::from(origin.0);
        let mut dy = i16::from(pointer.1) - i16::from(origin.1);
        let mut buttons = 0u8;
        let mut directional = 0u8;
        let mut wheel = 0i16;

        match id {
            PeripheralId::ClassicController => {
                let b = sample.buttons();
                if b & (classic::BUTTON_A | classic::BUTTON_B) != 0 {
                    buttons |= BUTTON_LEFT;
                }
                if b & (classic::BUTTON_X | classic::BUTTON_Y) != 0 {
                    buttons |= BUTTON_RIGHT;
                }
                if b & classic::BUTTON_PLUS != 0 {
                    buttons |= BUTTON_MIDDLE;
                }
                for (button, dir) in [
                    (classic::BUTTON_UP, DIR_UP),
                    (classic::BUTTON_DOWN, DIR_DOWN),
                    (classic::BUTTON_RIGHT, DIR_RIGHT),
                    (classic::BUTTON_LEFT, DIR_LEFT),
                ] {
                    if b & button != 0 {
                        directional |= dir;
                    }
                }

                let stick = (sample.ry >> 5) as i16 - 16;
                let click = self.stick_scroll.step(stick, STICK_SCROLL_THRESHOLD);
                wheel = if self.config.scroll_joystick_invert { -click } else { click };
            }
            PeripheralId::MotionPlus => {}
            PeripheralId::Nunchuk | PeripheralId::Unknown(_) => {
                if sample.buttons_low & nunchuk::BUTTON_Z != 0 {
                    buttons |= BUTTON_LEFT;
                }
                let c = sample.buttons_low & nunchuk::BUTTON_C != 0;
                let invert = self.config.scroll_nunchuk_invert;

                if c && self.config.scroll_nunchuk_c {
                    let threshold = i16::from(self.config.scroll_nunchuk_c_threshold);
                    let click = self.stick_scroll.step(-dy, threshold);
                    wheel += if invert { -click } else { click };
                    dy = 0;
                } else {
                    if c {
                        buttons |= BUTTON_RIGHT;
                    }
                    self.stick_scroll.release();
                }

                if self.config.scroll_nunchuk_threshold != 0 {
                    let tilt = sample.ry as i16 - NormalizedSample::AXIS_CENTER as i16;
                    let threshold = i16::from(self.config.scroll_nunchuk_threshold);
                    let click = self.tilt_scroll.step(tilt, threshold)
                        * i16::from(self.config.scroll_nunchuk_step);
                    wheel += if invert { -click } else { click };
                }
            }
        }

        dx = apply_deadzone(dx, self.config.mouse_deadzone);
        dy = apply_deadzone(dy, self.config.mouse_deadzone);
        self.active = dx != 0 || dy != 0 || wheel != 0 || directional != 0;

        let divisor = i16::from(self.config.mouse_divisor.max(1));
        dx /= divisor;
        dy /= divisor;

        if directional & DIR_UP != 0 {
            dy = -1;
        }
        if directional & DIR_DOWN != 0 {
            dy = 1;
        }
        if directional & DIR_RIGHT != 0 {
            dx = 1;
        }
        if directional & DIR_LEFT != 0 {
            dx = -1;
        }

        self.current = MouseReport {
            buttons,
            x: saturate(dx),
            y: saturate(dy),
            wheel: saturate(wheel),
        };
    }
}

impl<B: Bus, D: DelayNs> Personality for Mouse<B, D> {
    fn report_size(&self) -> usize {
        MOUSE_REPORT_SIZE
    }

    fn report_descriptor(&self) -> &'static [u8] {
        MOUSE_REPORT_DESCRIPTOR
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            vendor_id: USB_VID,
            product_id: USB_PID_MOUSE,
            product: USB_PRODUCT_MOUSE,
        }
    }

    fn init(&mut self) {
        self.start_connection();
        self.current = MouseReport::empty();
        self.active = false;
        self.was_moving = true;
    }

    fn update(&mut self) {
        match self.accessory.poll() {
            Poll::Sample { id, raw, fresh } => {
                if fresh {
                    self.start_connection();
                }
                let sample = self.calibration.decode(id, &raw);
                self.translate(id, &sample);
            }
            Poll::Settling(_) | Poll::Absent => {
                self.current = MouseReport::empty();
                self.active = false;
            }
        }
    }

    fn has_changed(&mut self) -> bool {
        if self.active {
            self.was_moving = true;
            return true;
        }
        if self.current.buttons != self.reported.buttons || self.current.wheel != self.reported.wheel {
            return true;
        }
        // One zero report once motion stops.
        if self.was_moving {
            self.was_moving = false;
            return true;
        }
        false
    }

    fn build_report(&mut self, report: &mut ReportBuffer) -> usize {
        let n = self.current.serialize(report);
        self.reported = self.current;
        n
    }

    fn configure(&mut self, config: &DeviceConfig) {
        self.config = *config;
    }
}

// USB HID report descriptor for a boot-protocol mouse

/// USB HID Report Descriptor for a standard 3-button mouse with scroll wheel.
pub const MOUSE_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    //
    //   - Buttons (3 bits + 5 padding) -
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    //
    //   - X, Y displacement -
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    //
    //   - Scroll wheel -
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    //
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];
