//! Game controller personality: 5 axes and 16 buttons.
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: X                 (0..255)
//! Byte 1: Y                 (0..255)
//! Byte 2: Rx<7:0>
//! Byte 3: Ry<5:0> Rx<9:8>
//! Byte 4: Rz<3:0> Ry<9:6>
//! Byte 5: pad<1:0> Rz<9:4>
//! Byte 6: Buttons 1-8
//! Byte 7: Buttons 9-16
//! ```

use embedded_hal::delay::DelayNs;

use super::{DeviceInfo, Personality, ReportBuffer};
use crate::accessory::{Accessory, Poll};
use crate::bus::Bus;
use crate::config::{USB_PID_JOYSTICK, USB_PRODUCT_JOYSTICK, USB_VID};
use crate::decode::{Calibration, DecodeSettings, NormalizedSample};

pub const JOYSTICK_REPORT_SIZE: usize = 8;

/// Packs a sample into the report layout above.
pub fn pack(s: &NormalizedSample) -> [u8; JOYSTICK_REPORT_SIZE] {
    [
        s.x,
        s.y,
        s.rx as u8,
        ((s.rx >> 8) as u8) | ((s.ry << 2) as u8),
        ((s.ry >> 6) as u8) | ((s.rz << 4) as u8),
        (s.rz >> 4) as u8,
        s.buttons_low,
        s.buttons_high,
    ]
}

pub struct Joystick<B, D> {
    accessory: Accessory<B, D>,
    calibration: Calibration,
    current: [u8; JOYSTICK_REPORT_SIZE],
    reported: [u8; JOYSTICK_REPORT_SIZE],
    first: bool,
}

impl<B: Bus, D: DelayNs> Joystick<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self::with_accessory(Accessory::new(bus, delay), DecodeSettings::default())
    }

    pub fn with_accessory(accessory: Accessory<B, D>, settings: DecodeSettings) -> Self {
        Self {
            accessory,
            calibration: Calibration::new(settings),
            current: pack(&NormalizedSample::NEUTRAL),
            reported: [0; JOYSTICK_REPORT_SIZE],
            first: true,
        }
    }

    pub fn accessory(&mut self) -> &mut Accessory<B, D> {
        &mut self.accessory
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }
}

impl<B: Bus, D: DelayNs> Personality for Joystick<B, D> {
    fn report_size(&self) -> usize {
        JOYSTICK_REPORT_SIZE
    }

    fn report_descriptor(&self) -> &'static [u8] {
        JOYSTICK_REPORT_DESCRIPTOR
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            vendor_id: USB_VID,
            product_id: USB_PID_JOYSTICK,
            product: USB_PRODUCT_JOYSTICK,
        }
    }

    fn init(&mut self) {
        self.calibration.reset();
        self.current = pack(&NormalizedSample::NEUTRAL);
        self.first = true;
    }

    fn update(&mut self) {
        let sample = match self.accessory.poll() {
            Poll::Sample { id, raw, fresh } => {
                if fresh {
                    self.calibration.reset();
                }
                self.calibration.decode(id, &raw)
            }
            Poll::Settling(_) | Poll::Absent => NormalizedSample::NEUTRAL,
        };
        self.current = pack(&sample);
    }

    fn has_changed(&mut self) -> bool {
        if self.first {
            self.first = false;
            return true;
        }
        self.current != self.reported
    }

    fn build_report(&mut self, report: &mut ReportBuffer) -> usize {
        report[..JOYSTICK_REPORT_SIZE].copy_from_slice(&self.current);
        self.reported = self.current;
        self.first = false;
        JOYSTICK_REPORT_SIZE
    }
}

// USB HID report descriptor

/// X/Y 8-bit, Rx/Ry/Rz 10-bit, 16 buttons. Matches [`pack`].
pub const JOYSTICK_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    //
    //   - X, Y (8 bits each) -
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x00, //     Logical Minimum (0)
    0x26, 0xFF, 0x00, //     Logical Maximum (255)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    //
    //   - Rx, Ry, Rz (10 bits each) + 2 bits padding -
    0x09, 0x33, //     Usage (Rx)
    0x09, 0x34, //     Usage (Ry)
    0x09, 0x35, //     Usage (Rz)
    0x15, 0x00, //     Logical Minimum (0)
    0x26, 0xFF, 0x03, //     Logical Maximum (1023)
    0x75, 0x0A, //     Report Size (10)
    0x95, 0x03, //     Report Count (3)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x75, 0x02, //     Report Size (2)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x03, //     Input (Constant) - padding
    0xC0, //   End Collection (Physical)
    //
    //   - Buttons (16 bits) -
    0x05, 0x09, //   Usage Page (Buttons)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0xC0, // End Collection (Application)
];
