//! HID personalities.
//!
//! A personality is everything the USB side needs to present one kind of
//! device: report descriptor, report size, identity strings, and the
//! update / change-detect / build cycle the poll loop drives. Exactly one
//! is active; [`ActivePersonality`] picks it from the configured [`Mode`]
//! at startup.

pub mod joystick;
pub mod mouse;
pub mod raw;

#[cfg(test)]
mod tests;

use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::error::CommandError;
use crate::settings::{DeviceConfig, Mode};

use joystick::Joystick;
use mouse::Mouse;
use raw::RawBridge;

/// Largest input report any personality produces.
pub const MAX_REPORT_SIZE: usize = 8;

pub type ReportBuffer = [u8; MAX_REPORT_SIZE];

/// USB identity of a personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub product: &'static str,
}

pub trait Personality {
    /// Input report length; 0 for personalities without input reports.
    fn report_size(&self) -> usize;

    fn report_descriptor(&self) -> &'static [u8];

    fn device_info(&self) -> DeviceInfo;

    /// Resets all per-session state.
    fn init(&mut self);

    /// Polls the accessory once and recomputes the pending report.
    fn update(&mut self);

    /// Whether the last update produced something worth sending.
    fn has_changed(&mut self) -> bool;

    /// Writes exactly [`report_size`](Self::report_size) bytes into `report`
    /// and records them as transmitted.
    fn build_report(&mut self, report: &mut ReportBuffer) -> usize;

    /// Live settings update.
    fn configure(&mut self, _config: &DeviceConfig) {}

    fn set_feature_report(&mut self, _data: &[u8]) -> Result<(), CommandError> {
        Err(CommandError::Unsupported)
    }

    /// Returns the feature report length written to `buf` (0 if none).
    fn get_feature_report(&mut self, _buf: &mut [u8]) -> usize {
        0
    }
}

/// The personality selected at startup.
pub enum ActivePersonality<B, D> {
    Joystick(Joystick<B, D>),
    Mouse(Mouse<B, D>),
    Raw(RawBridge<B, D>),
}

impl<B: Bus, D: DelayNs> ActivePersonality<B, D> {
    pub fn new(bus: B, delay: D, config: &DeviceConfig) -> Self {
        info!("hid: starting as {}", config.mode);
        let mut personality = match config.mode {
            Mode::Joystick => Self::Joystick(Joystick::new(bus, delay)),
            Mode::Mouse => Self::Mouse(Mouse::new(bus, delay, config)),
            Mode::Raw => Self::Raw(RawBridge::new(bus, delay)),
        };
        personality.init();
        personality
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Joystick(_) => Mode::Joystick,
            Self::Mouse(_) => Mode::Mouse,
            Self::Raw(_) => Mode::Raw,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $e:expr) => {
        match $self {
            ActivePersonality::Joystick($p) => $e,
            ActivePersonality::Mouse($p) => $e,
            ActivePersonality::Raw($p) => $e,
        }
    };
}

impl<B: Bus, D: DelayNs> Personality for ActivePersonality<B, D> {
    fn report_size(&self) -> usize {
        dispatch!(self, p => p.report_size())
    }

    fn report_descriptor(&self) -> &'static [u8] {
        dispatch!(self, p => p.report_descriptor())
    }

    fn device_info(&self) -> DeviceInfo {
        dispatch!(self, p => p.device_info())
    }

    fn init(&mut self) {
        dispatch!(self, p => p.init())
    }

    fn update(&mut self) {
        dispatch!(self, p => p.update())
    }

    fn has_changed(&mut self) -> bool {
        dispatch!(self, p => p.has_changed())
    }

    fn build_report(&mut self, report: &mut ReportBuffer) -> usize {
        dispatch!(self, p => p.build_report(report))
    }

    fn configure(&mut self, config: &DeviceConfig) {
        dispatch!(self, p => p.configure(config))
    }

    fn set_feature_report(&mut self, data: &[u8]) -> Result<(), CommandError> {
        dispatch!(self, p => p.set_feature_report(data))
    }

    fn get_feature_report(&mut self, buf: &mut [u8]) -> usize {
        dispatch!(self, p => p.get_feature_report(buf))
    }
}
