//! Classic controller report layout.
//!
//! ```text
//!        7      6      5      4      3      2      1      0
//! 0    RX<4:3>       LX<5:0>
//! 1    RX<2:1>       LY<5:0>
//! 2    RX<0>  LT<4:3>       RY<4:0>
//! 3    LT<2:0>              RT<4:0>
//! 4    BDR    BDD    BLT    B-     BH     B+     BRT    1
//! 5    BZL    BB     BY     BA     BX     BZR    BDL    BDU
//! ```
//!
//! Button bits are active low. Bytes 4/5 are read as one little-endian
//! word, so the `RAW_*` masks below are bit positions in that word.

use super::{DecodeSettings, NormalizedSample, RawSample};

pub const RAW_RT: u16 = 1 << 1;
pub const RAW_PLUS: u16 = 1 << 2;
pub const RAW_HOME: u16 = 1 << 3;
pub const RAW_MINUS: u16 = 1 << 4;
pub const RAW_LT: u16 = 1 << 5;
pub const RAW_DOWN: u16 = 1 << 6;
pub const RAW_RIGHT: u16 = 1 << 7;
pub const RAW_UP: u16 = 1 << 8;
pub const RAW_LEFT: u16 = 1 << 9;
pub const RAW_ZR: u16 = 1 << 10;
pub const RAW_X: u16 = 1 << 11;
pub const RAW_A: u16 = 1 << 12;
pub const RAW_Y: u16 = 1 << 13;
pub const RAW_B: u16 = 1 << 14;
pub const RAW_ZL: u16 = 1 << 15;

const RAW_BUTTONS: u16 = 0xFFFE;

// Report button bits (low byte, then high byte).
pub const BUTTON_A: u16 = 1 << 0;
pub const BUTTON_B: u16 = 1 << 1;
pub const BUTTON_X: u16 = 1 << 2;
pub const BUTTON_Y: u16 = 1 << 3;
pub const BUTTON_L: u16 = 1 << 4;
pub const BUTTON_R: u16 = 1 << 5;
pub const BUTTON_ZL: u16 = 1 << 6;
pub const BUTTON_ZR: u16 = 1 << 7;
pub const BUTTON_MINUS: u16 = 1 << 8;
pub const BUTTON_PLUS: u16 = 1 << 9;
pub const BUTTON_HOME: u16 = 1 << 10;
pub const BUTTON_UP: u16 = 1 << 11;
pub const BUTTON_DOWN: u16 = 1 << 12;
pub const BUTTON_LEFT: u16 = 1 << 13;
pub const BUTTON_RIGHT: u16 = 1 << 14;

const BUTTON_MAP: [(u16, u16); 15] = [
    (RAW_A, BUTTON_A),
    (RAW_B, BUTTON_B),
    (RAW_X, BUTTON_X),
    (RAW_Y, BUTTON_Y),
    (RAW_LT, BUTTON_L),
    (RAW_RT, BUTTON_R),
    (RAW_ZL, BUTTON_ZL),
    (RAW_ZR, BUTTON_ZR),
    (RAW_MINUS, BUTTON_MINUS),
    (RAW_PLUS, BUTTON_PLUS),
    (RAW_HOME, BUTTON_HOME),
    (RAW_UP, BUTTON_UP),
    (RAW_DOWN, BUTTON_DOWN),
    (RAW_LEFT, BUTTON_LEFT),
    (RAW_RIGHT, BUTTON_RIGHT),
];

/// Trigger difference to `rz` scale (5-bit triggers onto a 10-bit axis).
const SLIDER_SCALE: i16 = 16;

/// Unpacked fields of one classic controller sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Left stick, 6 bits.
    pub lx: u8,
    pub ly: u8,
    /// Right stick, 5 bits.
    pub rx: u8,
    pub ry: u8,
    /// Analog triggers, 5 bits.
    pub lt: u8,
    pub rt: u8,
    /// Pressed buttons as `RAW_*` bits (already inverted).
    pub pressed: u16,
}

impl Frame {
    pub fn parse(raw: &RawSample) -> Self {
        let b = &raw.0;
        Self {
            lx: b[0] & 0x3F,
            ly: b[1] & 0x3F,
            rx: ((b[0] & 0xC0) >> 3) | ((b[1] & 0xC0) >> 5) | (b[2] >> 7),
            ry: b[2] & 0x1F,
            lt: ((b[2] & 0x60) >> 2) | (b[3] >> 5),
            rt: b[3] & 0x1F,
            pressed: !u16::from_le_bytes([b[4], b[5]]) & RAW_BUTTONS,
        }
    }

    pub fn is_pressed(&self, raw_mask: u16) -> bool {
        self.pressed & raw_mask != 0
    }

    /// Report button bits for everything pressed.
    pub fn report_buttons(&self) -> u16 {
        BUTTON_MAP
            .iter()
            .filter(|(raw, _)| self.is_pressed(*raw))
            .fold(0, |acc, (_, bit)| acc | bit)
    }
}

/// Slider toggle state, driven by holding Home.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    seen: bool,
    sliders: bool,
    held_for: u16,
    /// Set once the current hold has toggled (or began at connection).
    hold_consumed: bool,
}

impl Calibration {
    pub fn sliders_enabled(&self) -> bool {
        self.sliders
    }

    fn track_home(&mut self, home: bool, hold_ticks: u16) {
        if !self.seen {
            self.seen = true;
            self.sliders = home;
            self.hold_consumed = home;
            return;
        }
        if !home {
            self.held_for = 0;
            self.hold_consumed = false;
            return;
        }
        if self.hold_consumed {
            return;
        }
        self.held_for = self.held_for.saturating_add(1);
        if self.held_for >= hold_ticks {
            self.sliders = !self.sliders;
            self.hold_consumed = true;
        }
    }
}

/// Left stick on x/y, right stick on rx/ry, trigger difference on rz when
/// the sliders are enabled.
pub fn decode(raw: &RawSample, cal: &mut Calibration, settings: &DecodeSettings) -> NormalizedSample {
    let f = Frame::parse(raw);
    cal.track_home(f.is_pressed(RAW_HOME), settings.hold_ticks);

    let rz = if cal.sliders {
        let diff = i16::from(f.rt) - i16::from(f.lt);
        (NormalizedSample::AXIS_CENTER as i16 + diff * SLIDER_SCALE)
            .clamp(0, NormalizedSample::AXIS_MAX as i16) as u16
    } else {
        NormalizedSample::AXIS_CENTER
    };

    let [buttons_low, buttons_high] = f.report_buttons().to_le_bytes();
    NormalizedSample::new(
        f.lx << 2,
        !(f.ly << 2),
        u16::from(f.rx) << 5,
        u16::from(f.ry) << 5,
        rz,
        buttons_low,
        buttons_high,
    )
}
