//! Register passthrough personality.
//!
//! The host drives the bus directly through 7-byte feature reports: it
//! SET_REPORTs a command and GET_REPORTs the result. There are no input
//! reports.
//!
//! ```text
//! Command                   Request                   Result
//! 0x01 echo                 [01, b1..b6]              [00, b1..b6]
//! 0x02 set address          [02, addr, ..]            [F0, addr, ..]
//! 0x10+n-1 write n regs     [cmd, reg, d1..dn, ..]    [F0 | FE | FF, ..]
//! 0x20+n-1 read n regs      [cmd, reg, ..]            [cmd, d1..dn, ..]  or [FE | FF, ..]
//! anything else / bad arg                             [FD, ..]
//! ```

use embedded_hal::delay::DelayNs;

use super::{DeviceInfo, Personality, ReportBuffer};
use crate::accessory::Registers;
use crate::bus::{Bus, MAX_ADDRESS};
use crate::config::{USB_PID_RAW, USB_PRODUCT_RAW, USB_VID};
use crate::error::{BusError, CommandError};

pub const FEATURE_REPORT_SIZE: usize = 7;

/// Data bytes that fit a write request after `[cmd, reg]`.
pub const MAX_WRITE: usize = FEATURE_REPORT_SIZE - 2;
/// Data bytes that fit a read result after the tag.
pub const MAX_READ: usize = FEATURE_REPORT_SIZE - 1;

// Result tags
pub const REPLY_ECHO: u8 = 0x00;
pub const REPLY_OK: u8 = 0xF0;
pub const REPLY_BAD_PARAM: u8 = 0xFD;
pub const REPLY_TIMEOUT: u8 = 0xFE;
pub const REPLY_ERROR: u8 = 0xFF;

/// Decoded passthrough command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawCommand {
    Echo,
    SetAddress,
    /// Write this many registers.
    Write(usize),
    /// Read this many registers.
    Read(usize),
}

impl RawCommand {
    pub const ECHO: u8 = 0x01;
    pub const SET_ADDRESS: u8 = 0x02;
    pub const WRITE_BASE: u8 = 0x10;
    pub const READ_BASE: u8 = 0x20;
}

impl TryFrom<u8> for RawCommand {
    type Error = CommandError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            Self::ECHO => Ok(RawCommand::Echo),
            Self::SET_ADDRESS => Ok(RawCommand::SetAddress),
            0x10..=0x16 => Ok(RawCommand::Write(usize::from(code - Self::WRITE_BASE) + 1)),
            0x20..=0x26 => Ok(RawCommand::Read(usize::from(code - Self::READ_BASE) + 1)),
            other => Err(CommandError::UnknownCommand(other)),
        }
    }
}

/// Bus failures as the host tool reports them: no answer versus anything else.
fn failure_tag(error: BusError) -> u8 {
    match error {
        BusError::AddressNack | BusError::Timeout => REPLY_TIMEOUT,
        _ => REPLY_ERROR,
    }
}

pub struct RawBridge<B, D> {
    registers: Registers<B, D>,
    address: Option<u8>,
    result: [u8; FEATURE_REPORT_SIZE],
}

impl<B: Bus, D: DelayNs> RawBridge<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            registers: Registers::new(bus, delay),
            address: None,
            result: [0; FEATURE_REPORT_SIZE],
        }
    }

    pub fn address(&self) -> Option<u8> {
        self.address
    }

    pub fn registers(&mut self) -> &mut Registers<B, D> {
        &mut self.registers
    }

    fn execute(&mut self, request: &[u8; FEATURE_REPORT_SIZE]) -> [u8; FEATURE_REPORT_SIZE] {
        let mut result = [0u8; FEATURE_REPORT_SIZE];
        let command = match RawCommand::try_from(request[0]) {
            Ok(command) => command,
            Err(_) => {
                result[0] = REPLY_BAD_PARAM;
                return result;
            }
        };

        match command {
            RawCommand::Echo => {
                result = *request;
                result[0] = REPLY_ECHO;
            }
            RawCommand::SetAddress if request[1] > MAX_ADDRESS => result[0] = REPLY_BAD_PARAM,
            RawCommand::SetAddress => {
                self.address = Some(request[1]);
                result[0] = REPLY_OK;
                result[1] = request[1];
            }
            RawCommand::Write(n) | RawCommand::Read(n) if self.address.is_none() || n > limit(command) => {
                result[0] = REPLY_BAD_PARAM;
            }
            RawCommand::Write(n) => {
                let address = self.address.unwrap_or_default();
                result[0] = match self.registers.write(address, request[1], &request[2..2 + n]) {
                    Ok(()) => REPLY_OK,
                    Err(e) => failure_tag(e),
                };
            }
            RawCommand::Read(n) => {
                let address = self.address.unwrap_or_default();
                result[0] = match self.registers.read(address, request[1], &mut result[1..=n]) {
                    Ok(()) => request[0],
                    Err(e) => failure_tag(e),
                };
            }
        }
        result
    }
}

fn limit(command: RawCommand) -> usize {
    match command {
        RawCommand::Write(_) => MAX_WRITE,
        _ => MAX_READ,
    }
}

impl<B: Bus, D: DelayNs> Personality for RawBridge<B, D> {
    fn report_size(&self) -> usize {
        0
    }

    fn report_descriptor(&self) -> &'static [u8] {
        RAW_REPORT_DESCRIPTOR
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            vendor_id: USB_VID,
            product_id: USB_PID_RAW,
            product: USB_PRODUCT_RAW,
        }
    }

    fn init(&mut self) {
        self.address = None;
        self.result = [0; FEATURE_REPORT_SIZE];
    }

    fn update(&mut self) {}

    fn has_changed(&mut self) -> bool {
        false
    }

    fn build_report(&mut self, _report: &mut ReportBuffer) -> usize {
        0
    }

    fn set_feature_report(&mut self, data: &[u8]) -> Result<(), CommandError> {
        let request = <[u8; FEATURE_REPORT_SIZE]>::try_from(data).map_err(|_| CommandError::BadLength)?;
        self.result = self.execute(&request);
        debug!("raw: {} -> {}", request, self.result);
        Ok(())
    }

    fn get_feature_report(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(FEATURE_REPORT_SIZE);
        buf[..n].copy_from_slice(&self.result[..n]);
        n
    }
}

/// Vendor-defined collection with one 7-byte feature report.
pub const RAW_REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, // Usage (Vendor Usage 1)
    0xA1, 0x01, // Collection (Application)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x07, //   Report Count (7)
    0x09, 0x01, //   Usage (Vendor Usage 1)
    0xB2, 0x02, 0x01, //   Feature (Data, Variable, Absolute, Buffered Bytes)
    0xC0, // End Collection
];
