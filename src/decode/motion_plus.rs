//! MotionPlus (three-axis gyroscope) report layout.
//!
//! ```text
//!        7    6    5    4    3    2    1    0
//! 0    YAW<7:0>
//! 1    ROLL<7:0>
//! 2    PITCH<7:0>
//! 3    YAW<13:8>                     YS   PS
//! 4    ROLL<13:8>                    RS   EX
//! 5    PITCH<13:8>                   1    0
//! ```
//!
//! Readings are 14-bit offset binary. `YS`/`RS`/`PS` are set in slow
//! (high precision) mode; `EX` is set while an extension is plugged in.

use super::{DecodeSettings, NormalizedSample, RawSample};

// Report buttons (high mask).
pub const BUTTON_YAW_FAST: u8 = 0x01;
pub const BUTTON_ROLL_FAST: u8 = 0x02;
pub const BUTTON_PITCH_FAST: u8 = 0x04;
pub const BUTTON_EXTENSION: u8 = 0x08;

/// 14-bit reading to 10-bit axis.
const RESOLUTION_SHIFT: u32 = 4;
const AXIS_SWING: i32 = 511;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub yaw: u16,
    pub roll: u16,
    pub pitch: u16,
    pub yaw_slow: bool,
    pub roll_slow: bool,
    pub pitch_slow: bool,
    pub extension: bool,
}

impl Frame {
    pub fn parse(raw: &RawSample) -> Self {
        let b = &raw.0;
        let reading = |low: u8, high: u8| u16::from(low) | (u16::from(high >> 2) << 8);
        Self {
            yaw: reading(b[0], b[3]),
            roll: reading(b[1], b[4]),
            pitch: reading(b[2], b[5]),
            yaw_slow: b[3] & 0x02 != 0,
            pitch_slow: b[3] & 0x01 != 0,
            roll_slow: b[4] & 0x02 != 0,
            extension: b[4] & 0x01 != 0,
        }
    }

    /// Signed rates, in yaw/roll/pitch order.
    pub fn rates(&self) -> [i16; 3] {
        [signed(self.yaw), signed(self.roll), signed(self.pitch)]
    }
}

/// Offset binary (0x2000 = zero) to two's complement.
fn signed(reading: u16) -> i16 {
    (reading & 0x3FFF) as i16 - 0x2000
}

/// Zero-rate baseline learnt from the first samples of a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    samples: u8,
    sums: [i32; 3],
    baseline: [i16; 3],
}

impl Calibration {
    pub fn is_settled(&self, settings: &DecodeSettings) -> bool {
        self.samples >= settings.baseline_samples
    }

    pub fn baseline(&self) -> [i16; 3] {
        self.baseline
    }

    fn learn(&mut self, rates: [i16; 3], settings: &DecodeSettings) {
        for (sum, rate) in self.sums.iter_mut().zip(rates) {
            *sum += i32::from(rate);
        }
        self.samples += 1;
        if self.samples == settings.baseline_samples {
            let n = i32::from(self.samples);
            for (base, sum) in self.baseline.iter_mut().zip(self.sums) {
                *base = (sum / n) as i16;
            }
        }
    }
}

fn axis(rate: i16, base: i16) -> u16 {
    let delta = (i32::from(rate) - i32::from(base)) >> RESOLUTION_SHIFT;
    (delta.clamp(-AXIS_SWING, AXIS_SWING) + i32::from(NormalizedSample::AXIS_CENTER)) as u16
}

/// Yaw/roll/pitch rates on rx/ry/rz. Axes stay centred until the baseline
/// has been learnt.
pub fn decode(raw: &RawSample, cal: &mut Calibration, settings: &DecodeSettings) -> NormalizedSample {
    let f = Frame::parse(raw);
    let rates = f.rates();

    let [rx, ry, rz] = if cal.is_settled(settings) {
        let base = cal.baseline;
        [axis(rates[0], base[0]), axis(rates[1], base[1]), axis(rates[2], base[2])]
    } else {
        cal.learn(rates, settings);
        [NormalizedSample::AXIS_CENTER; 3]
    };

    let mut buttons = 0;
    if !f.yaw_slow {
        buttons |= BUTTON_YAW_FAST;
    }
    if !f.roll_slow {
        buttons |= BUTTON_ROLL_FAST;
    }
    if !f.pitch_slow {
        buttons |= BUTTON_PITCH_FAST;
    }
    if f.extension {
        buttons |= BUTTON_EXTENSION;
    }

    NormalizedSample::new(
        NormalizedSample::STICK_CENTER,
        NormalizedSample::STICK_CENTER,
        rx,
        ry,
        rz,
        0,
        buttons,
    )
}
