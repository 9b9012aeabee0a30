//! Raw report decoding.
//!
//! Each accessory packs its controls into the same 6-byte block with a
//! different bit layout. The per-type modules unpack that block into a
//! [`NormalizedSample`]; [`Calibration`] carries the per-connection state
//! (first-sample latches, hold counters, gyroscope baseline) and routes a
//! sample to the right decoder.

pub mod classic;
pub mod motion_plus;
pub mod nunchuk;

use crate::config::{BASELINE_SAMPLES, HOLD_TICKS};

/// Size of the report block at register 0x00.
pub const RAW_SAMPLE_LEN: usize = 6;

/// One report block as read from the accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample(pub [u8; RAW_SAMPLE_LEN]);

/// Accessory type, from the big-endian identity at registers 0xFE/0xFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralId {
    Nunchuk,
    ClassicController,
    MotionPlus,
    /// Anything else. Decoded with the nunchuk layout.
    Unknown(u16),
}

impl PeripheralId {
    pub const NUNCHUK: u16 = 0x0000;
    pub const CLASSIC_CONTROLLER: u16 = 0x0101;
    pub const MOTION_PLUS: u16 = 0x0405;

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self::from(u16::from_be_bytes(bytes))
    }

    pub const fn code(self) -> u16 {
        match self {
            PeripheralId::Nunchuk => Self::NUNCHUK,
            PeripheralId::ClassicController => Self::CLASSIC_CONTROLLER,
            PeripheralId::MotionPlus => Self::MOTION_PLUS,
            PeripheralId::Unknown(code) => code,
        }
    }
}

impl From<u16> for PeripheralId {
    fn from(code: u16) -> Self {
        match code {
            Self::NUNCHUK => PeripheralId::Nunchuk,
            Self::CLASSIC_CONTROLLER => PeripheralId::ClassicController,
            Self::MOTION_PLUS => PeripheralId::MotionPlus,
            other => PeripheralId::Unknown(other),
        }
    }
}

/// Accessory-independent view of one sample.
///
/// `x`/`y` are 8-bit, `rx`/`ry`/`rz` 10-bit. Values are always clipped to
/// their width by [`NormalizedSample::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NormalizedSample {
    pub x: u8,
    pub y: u8,
    pub rx: u16,
    pub ry: u16,
    pub rz: u16,
    pub buttons_low: u8,
    pub buttons_high: u8,
}

impl NormalizedSample {
    pub const AXIS_MAX: u16 = 0x3FF;
    pub const AXIS_CENTER: u16 = 0x200;
    pub const STICK_CENTER: u8 = 0x80;

    /// Centred axes, nothing pressed. Reported while no accessory answers.
    pub const NEUTRAL: Self = Self {
        x: Self::STICK_CENTER,
        y: Self::STICK_CENTER,
        rx: Self::AXIS_CENTER,
        ry: Self::AXIS_CENTER,
        rz: Self::AXIS_CENTER,
        buttons_low: 0,
        buttons_high: 0,
    };

    pub const fn new(x: u8, y: u8, rx: u16, ry: u16, rz: u16, buttons_low: u8, buttons_high: u8) -> Self {
        Self {
            x,
            y,
            rx: rx & Self::AXIS_MAX,
            ry: ry & Self::AXIS_MAX,
            rz: rz & Self::AXIS_MAX,
            buttons_low,
            buttons_high,
        }
    }

    /// Both button masks, low byte first.
    pub const fn buttons(&self) -> u16 {
        u16::from_le_bytes([self.buttons_low, self.buttons_high])
    }
}

impl Default for NormalizedSample {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Tunables for the stateful parts of decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeSettings {
    /// Ticks a button must stay held for a hold gesture.
    pub hold_ticks: u16,
    /// Samples averaged into the gyroscope baseline. 0 disables it.
    pub baseline_samples: u8,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            hold_ticks: HOLD_TICKS,
            baseline_samples: BASELINE_SAMPLES,
        }
    }
}

/// Per-connection decode state for every accessory type.
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    settings: DecodeSettings,
    nunchuk: nunchuk::Calibration,
    classic: classic::Calibration,
    motion_plus: motion_plus::Calibration,
}

impl Calibration {
    pub fn new(settings: DecodeSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Forgets everything learned from the previous connection.
    pub fn reset(&mut self) {
        *self = Self::new(self.settings);
    }

    pub fn settings(&self) -> &DecodeSettings {
        &self.settings
    }

    /// Whether the classic controller trigger sliders currently drive `rz`.
    pub fn sliders_enabled(&self) -> bool {
        self.classic.sliders_enabled()
    }

    pub fn decode(&mut self, id: PeripheralId, raw: &RawSample) -> NormalizedSample {
        match id {
            PeripheralId::ClassicController => classic::decode(raw, &mut self.classic, &self.settings),
            PeripheralId::MotionPlus => motion_plus::decode(raw, &mut self.motion_plus, &self.settings),
            PeripheralId::Nunchuk | PeripheralId::Unknown(_) => nunchuk::decode(raw, &mut self.nunchuk),
        }
    }
}
