//! Persisted device configuration and the vendor command channel.
//!
//! The host changes settings with a command byte plus four parameter bytes.
//! Every accepted command mutates [`DeviceConfig`] and the firmware persists
//! the result; the flash record layout is [`DeviceConfig::serialize`].

use crate::error::CommandError;

/// Which personality the device enumerates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    #[default]
    Joystick = 0,
    Mouse = 1,
    /// Register passthrough over feature reports.
    Raw = 2,
}

impl TryFrom<u8> for Mode {
    type Error = CommandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Joystick),
            1 => Ok(Mode::Mouse),
            2 => Ok(Mode::Raw),
            _ => Err(CommandError::InvalidParameter),
        }
    }
}

pub const SERIAL_LEN: usize = 4;

/// Version byte leading every stored record.
pub const RECORD_VERSION: u8 = 1;

/// Serialized size of [`DeviceConfig`].
pub const RECORD_SIZE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// ASCII alphanumerics, reported as the USB serial number.
    pub serial: [u8; SERIAL_LEN],
    pub mode: Mode,
    /// Pointer deltas are divided by this (never 0).
    pub mouse_divisor: u8,
    /// Stick travel ignored around the origin.
    pub mouse_deadzone: u8,
    pub scroll_joystick_invert: bool,
    pub scroll_nunchuk_invert: bool,
    /// Nunchuk tilt needed to scroll; 0 disables tilt scrolling.
    pub scroll_nunchuk_threshold: u8,
    /// Wheel clicks per tilt scroll event.
    pub scroll_nunchuk_step: u8,
    /// C + stick scrolls instead of moving the pointer.
    pub scroll_nunchuk_c: bool,
    pub scroll_nunchuk_c_threshold: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial: *b"1001",
            mode: Mode::Joystick,
            mouse_divisor: 4,
            mouse_deadzone: 10,
            scroll_joystick_invert: false,
            scroll_nunchuk_invert: false,
            scroll_nunchuk_threshold: 0,
            scroll_nunchuk_step: 1,
            scroll_nunchuk_c: false,
            scroll_nunchuk_c_threshold: 20,
        }
    }
}

impl DeviceConfig {
    /// Serialise into `buf`. Returns the number of bytes written, or 0 if
    /// `buf` is shorter than [`RECORD_SIZE`].
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < RECORD_SIZE {
            return 0;
        }
        buf[0] = RECORD_VERSION;
        buf[1..5].copy_from_slice(&self.serial);
        buf[5] = self.mode as u8;
        buf[6] = self.mouse_divisor;
        buf[7] = self.mouse_deadzone;
        buf[8] = u8::from(self.scroll_joystick_invert);
        buf[9] = u8::from(self.scroll_nunchuk_invert);
        buf[10] = self.scroll_nunchuk_threshold;
        buf[11] = self.scroll_nunchuk_step;
        buf[12] = u8::from(self.scroll_nunchuk_c);
        buf[13] = self.scroll_nunchuk_c_threshold;
        buf[14] = 0; // reserved
        RECORD_SIZE
    }

    /// Parses a stored record.
    ///
    /// Records of another version or length are rejected. Individual bad
    /// fields are repaired instead: an unknown mode becomes joystick, a zero
    /// divisor or step takes the default, a non-alphanumeric serial the
    /// default serial. Callers re-persist when the repaired record differs.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() != RECORD_SIZE || data[0] != RECORD_VERSION {
            return None;
        }
        let defaults = Self::default();
        let mut serial = [0u8; SERIAL_LEN];
        serial.copy_from_slice(&data[1..5]);

        Some(Self {
            serial: if valid_serial(&serial) { serial } else { defaults.serial },
            mode: Mode::try_from(data[5]).unwrap_or(Mode::Joystick),
            mouse_divisor: if data[6] == 0 { defaults.mouse_divisor } else { data[6] },
            mouse_deadzone: data[7],
            scroll_joystick_invert: data[8] != 0,
            scroll_nunchuk_invert: data[9] != 0,
            scroll_nunchuk_threshold: data[10],
            scroll_nunchuk_step: if data[11] == 0 { defaults.scroll_nunchuk_step } else { data[11] },
            scroll_nunchuk_c: data[12] != 0,
            scroll_nunchuk_c_threshold: data[13],
        })
    }

    pub fn serial_str(&self) -> &str {
        core::str::from_utf8(&self.serial).unwrap_or("0000")
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetSerial(serial) => self.serial = serial,
            Command::SetMode(mode) => self.mode = mode,
            Command::SetMouseDivisor(v) => self.mouse_divisor = v,
            Command::SetMouseDeadzone(v) => self.mouse_deadzone = v,
            Command::SetScrollJoystickInvert(v) => self.scroll_joystick_invert = v,
            Command::SetScrollNunchukInvert(v) => self.scroll_nunchuk_invert = v,
            Command::SetScrollNunchukThreshold(v) => self.scroll_nunchuk_threshold = v,
            Command::SetScrollNunchukStep(v) => self.scroll_nunchuk_step = v,
            Command::SetScrollNunchukC(v) => self.scroll_nunchuk_c = v,
            Command::SetScrollNunchukCThreshold(v) => self.scroll_nunchuk_c_threshold = v,
        }
    }
}

fn valid_serial(serial: &[u8; SERIAL_LEN]) -> bool {
    serial.iter().all(u8::is_ascii_alphanumeric)
}

/// A validated configuration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetSerial([u8; SERIAL_LEN]),
    SetMode(Mode),
    SetMouseDivisor(u8),
    SetMouseDeadzone(u8),
    SetScrollJoystickInvert(bool),
    SetScrollNunchukInvert(bool),
    SetScrollNunchukThreshold(u8),
    SetScrollNunchukStep(u8),
    SetScrollNunchukC(bool),
    SetScrollNunchukCThreshold(u8),
}

impl Command {
    pub const SET_SERIAL: u8 = 0x01;
    pub const SET_MODE: u8 = 0x02;
    pub const SET_MOUSE_DIVISOR: u8 = 0x03;
    pub const SET_MOUSE_DEADZONE: u8 = 0x04;
    pub const SET_SCROLL_JOYSTICK_INVERT: u8 = 0x05;
    pub const SET_SCROLL_NUNCHUK_INVERT: u8 = 0x06;
    pub const SET_SCROLL_NUNCHUK_THRESHOLD: u8 = 0x07;
    pub const SET_SCROLL_NUNCHUK_STEP: u8 = 0x08;
    pub const SET_SCROLL_NUNCHUK_C: u8 = 0x09;
    pub const SET_SCROLL_NUNCHUK_C_THRESHOLD: u8 = 0x0A;

    /// Validates `code` with its parameter bytes.
    pub fn parse(code: u8, params: &[u8; 4]) -> Result<Self, CommandError> {
        let p = params[0];
        let command = match code {
            Self::SET_SERIAL => {
                if !valid_serial(params) {
                    return Err(CommandError::InvalidParameter);
                }
                Command::SetSerial(*params)
            }
            Self::SET_MODE => Command::SetMode(Mode::try_from(p)?),
            Self::SET_MOUSE_DIVISOR if p == 0 => return Err(CommandError::InvalidParameter),
            Self::SET_MOUSE_DIVISOR => Command::SetMouseDivisor(p),
            Self::SET_MOUSE_DEADZONE => Command::SetMouseDeadzone(p),
            Self::SET_SCROLL_JOYSTICK_INVERT => Command::SetScrollJoystickInvert(p != 0),
            Self::SET_SCROLL_NUNCHUK_INVERT => Command::SetScrollNunchukInvert(p != 0),
            Self::SET_SCROLL_NUNCHUK_THRESHOLD => Command::SetScrollNunchukThreshold(p),
            Self::SET_SCROLL_NUNCHUK_STEP if p == 0 => return Err(CommandError::InvalidParameter),
            Self::SET_SCROLL_NUNCHUK_STEP => Command::SetScrollNunchukStep(p),
            Self::SET_SCROLL_NUNCHUK_C => Command::SetScrollNunchukC(p != 0),
            Self::SET_SCROLL_NUNCHUK_C_THRESHOLD => Command::SetScrollNunchukCThreshold(p),
            other => return Err(CommandError::UnknownCommand(other)),
        };
        Ok(command)
    }

    pub const fn code(&self) -> u8 {
        match self {
            Command::SetSerial(_) => Self::SET_SERIAL,
            Command::SetMode(_) => Self::SET_MODE,
            Command::SetMouseDivisor(_) => Self::SET_MOUSE_DIVISOR,
            Command::SetMouseDeadzone(_) => Self::SET_MOUSE_DEADZONE,
            Command::SetScrollJoystickInvert(_) => Self::SET_SCROLL_JOYSTICK_INVERT,
            Command::SetScrollNunchukInvert(_) => Self::SET_SCROLL_NUNCHUK_INVERT,
            Command::SetScrollNunchukThreshold(_) => Self::SET_SCROLL_NUNCHUK_THRESHOLD,
            Command::SetScrollNunchukStep(_) => Self::SET_SCROLL_NUNCHUK_STEP,
            Command::SetScrollNunchukC(_) => Self::SET_SCROLL_NUNCHUK_C,
            Command::SetScrollNunchukCThreshold(_) => Self::SET_SCROLL_NUNCHUK_C_THRESHOLD,
        }
    }
}

/// Length of a configuration command sent as a HID output/feature report.
pub const COMMAND_REPORT_LEN: usize = 5;

/// Handles one configuration command.
///
/// On success `config` is updated and the acknowledgement (the echoed
/// command byte) is written to `reply`; the return value is its length.
/// On error nothing changes.
pub fn handle_command(
    config: &mut DeviceConfig,
    code: u8,
    params: &[u8; 4],
    reply: &mut [u8],
) -> Result<usize, CommandError> {
    if reply.is_empty() {
        return Err(CommandError::BadLength);
    }
    let command = Command::parse(code, params).map_err(|e| {
        warn!("config: rejected command {=u8:#x}: {}", code, e);
        e
    })?;
    config.apply(command);
    info!("config: applied {}", command);
    reply[0] = command.code();
    Ok(1)
}

/// Handles a `[command, p0, p1, p2, p3]` report.
pub fn handle_command_report(
    config: &mut DeviceConfig,
    report: &[u8],
    reply: &mut [u8],
) -> Result<usize, CommandError> {
    let [code, p0, p1, p2, p3] = <[u8; COMMAND_REPORT_LEN]>::try_from(report)
        .map_err(|_| CommandError::BadLength)?;
    handle_command(config, code, &[p0, p1, p2, p3], reply)
}
