//! Nunchuk report layout.
//!
//! ```text
//!        7    6    5    4    3    2    1    0
//! 0    SX<7:0>
//! 1    SY<7:0>
//! 2    AX<9:2>
//! 3    AY<9:2>
//! 4    AZ<9:2>
//! 5    AZ<1:0>   AY<1:0>   AX<1:0>   BC   BZ
//! ```
//!
//! Button bits are active low.

use super::{NormalizedSample, RawSample};

pub const BUTTON_Z: u8 = 0x01;
pub const BUTTON_C: u8 = 0x02;

/// Unpacked fields of one nunchuk sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub sx: u8,
    pub sy: u8,
    pub ax: u16,
    pub ay: u16,
    pub az: u16,
    pub z: bool,
    pub c: bool,
}

impl Frame {
    pub fn parse(raw: &RawSample) -> Self {
        let b = &raw.0;
        Self {
            sx: b[0],
            sy: b[1],
            ax: (u16::from(b[2]) << 2) | u16::from((b[5] >> 2) & 0x03),
            ay: (u16::from(b[3]) << 2) | u16::from((b[5] >> 4) & 0x03),
            az: (u16::from(b[4]) << 2) | u16::from((b[5] >> 6) & 0x03),
            z: b[5] & 0x01 == 0,
            c: b[5] & 0x02 == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    latched: bool,
    rz_disabled: bool,
}

impl Calibration {
    pub fn rz_disabled(&self) -> bool {
        self.rz_disabled
    }
}

/// Stick on x/y (y flipped so down is positive), accelerometer on rx/ry/rz.
///
/// Holding both buttons on the first sample after connection parks `rz`
/// at centre until the next connection.
pub fn decode(raw: &RawSample, cal: &mut Calibration) -> NormalizedSample {
    let f = Frame::parse(raw);
    if !cal.latched {
        cal.latched = true;
        cal.rz_disabled = f.z && f.c;
    }

    let mut buttons = 0;
    if f.z {
        buttons |= BUTTON_Z;
    }
    if f.c {
        buttons |= BUTTON_C;
    }

    let rz = if cal.rz_disabled { NormalizedSample::AXIS_CENTER } else { f.az };
    NormalizedSample::new(f.sx, !f.sy, f.ax, f.ay, rz, buttons, 0)
}
