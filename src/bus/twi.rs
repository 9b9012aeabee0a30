//! Status-code driven transaction engine.
//!
//! The engine issues one [`Command`] at a time, spins (bounded) on the
//! controller's ready flag and checks the resulting status code against
//! what the protocol expects next. The codes are the classic TWI set, so
//! a hardware peripheral exposing them and the GPIO
//! [`BitBang`](super::bitbang::BitBang) controller plug in the same way.

use super::{Bus, MAX_ADDRESS};
use crate::error::{BusError, Fault};

/// One bus step for the controller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// START, or repeated START if a transfer is open.
    Start,
    /// Shift out one byte (address or data) and sample the ACK bit.
    Transmit(u8),
    /// Shift in one byte, answering ACK (`true`) or NACK.
    Receive { ack: bool },
    Stop,
    /// Let go of both lines without generating STOP.
    Release,
}

/// A controller with a TWI-style command/status interface.
pub trait TwiHardware {
    /// Begins `command`. Completion is signalled through [`is_ready`](Self::is_ready).
    /// `Stop` and `Release` complete without raising the ready flag.
    fn command(&mut self, command: Command);

    fn is_ready(&mut self) -> bool;

    /// Raw status code of the last completed step.
    fn status(&mut self) -> u8;

    /// Byte shifted in by the last `Receive`.
    fn data(&mut self) -> u8;
}

/// Decoded controller status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Start,
    RepeatedStart,
    AddressWriteAck,
    AddressWriteNack,
    DataWriteAck,
    DataWriteNack,
    ArbitrationLost,
    AddressReadAck,
    AddressReadNack,
    DataReadAck,
    DataReadNack,
    NoInfo,
    BusError,
    Other(u8),
}

impl Status {
    pub const START: u8 = 0x08;
    pub const REPEATED_START: u8 = 0x10;
    pub const ADDRESS_WRITE_ACK: u8 = 0x18;
    pub const ADDRESS_WRITE_NACK: u8 = 0x20;
    pub const DATA_WRITE_ACK: u8 = 0x28;
    pub const DATA_WRITE_NACK: u8 = 0x30;
    pub const ARBITRATION_LOST: u8 = 0x38;
    pub const ADDRESS_READ_ACK: u8 = 0x40;
    pub const ADDRESS_READ_NACK: u8 = 0x48;
    pub const DATA_READ_ACK: u8 = 0x50;
    pub const DATA_READ_NACK: u8 = 0x58;
    pub const NO_INFO: u8 = 0xF8;
    pub const BUS_ERROR: u8 = 0x00;

    pub const fn code(self) -> u8 {
        match self {
            Status::Start => Self::START,
            Status::RepeatedStart => Self::REPEATED_START,
            Status::AddressWriteAck => Self::ADDRESS_WRITE_ACK,
            Status::AddressWriteNack => Self::ADDRESS_WRITE_NACK,
            Status::DataWriteAck => Self::DATA_WRITE_ACK,
            Status::DataWriteNack => Self::DATA_WRITE_NACK,
            Status::ArbitrationLost => Self::ARBITRATION_LOST,
            Status::AddressReadAck => Self::ADDRESS_READ_ACK,
            Status::AddressReadNack => Self::ADDRESS_READ_NACK,
            Status::DataReadAck => Self::DATA_READ_ACK,
            Status::DataReadNack => Self::DATA_READ_NACK,
            Status::NoInfo => Self::NO_INFO,
            Status::BusError => Self::BUS_ERROR,
            Status::Other(code) => code,
        }
    }

    /// Error reported when this status ends a transaction early.
    fn error(self) -> BusError {
        match self {
            Status::AddressWriteNack | Status::AddressReadNack => BusError::AddressNack,
            Status::DataWriteNack => BusError::DataNack,
            Status::ArbitrationLost => BusError::ArbitrationLost,
            _ => BusError::Bus,
        }
    }

    /// Command that returns the bus to idle after this status ended a transaction.
    fn recovery(self) -> Option<Command> {
        match self {
            Status::ArbitrationLost => Some(Command::Release),
            Status::NoInfo => None,
            _ => Some(Command::Stop),
        }
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        match code {
            Self::START => Status::Start,
            Self::REPEATED_START => Status::RepeatedStart,
            Self::ADDRESS_WRITE_ACK => Status::AddressWriteAck,
            Self::ADDRESS_WRITE_NACK => Status::AddressWriteNack,
            Self::DATA_WRITE_ACK => Status::DataWriteAck,
            Self::DATA_WRITE_NACK => Status::DataWriteNack,
            Self::ARBITRATION_LOST => Status::ArbitrationLost,
            Self::ADDRESS_READ_ACK => Status::AddressReadAck,
            Self::ADDRESS_READ_NACK => Status::AddressReadNack,
            Self::DATA_READ_ACK => Status::DataReadAck,
            Self::DATA_READ_NACK => Status::DataReadNack,
            Self::NO_INFO => Status::NoInfo,
            Self::BUS_ERROR => Status::BusError,
            other => Status::Other(other),
        }
    }
}

/// How a single step went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepFailure {
    Timeout,
    Unexpected(Status),
}

/// [`Bus`] implementation over a [`TwiHardware`] controller.
pub struct Twi<H> {
    hw: H,
    spin_limit: u32,
}

impl<H: TwiHardware> Twi<H> {
    /// `spin_limit` bounds the ready-flag polls of every step.
    pub const fn new(hw: H, spin_limit: u32) -> Self {
        Self { hw, spin_limit }
    }

    pub fn hardware(&mut self) -> &mut H {
        &mut self.hw
    }

    fn step(&mut self, command: Command) -> Result<Status, StepFailure> {
        self.hw.command(command);
        for _ in 0..self.spin_limit {
            if self.hw.is_ready() {
                return Ok(Status::from(self.hw.status()));
            }
        }
        Err(StepFailure::Timeout)
    }

    fn expect(&mut self, command: Command, accept: &[Status]) -> Result<(), StepFailure> {
        let status = self.step(command)?;
        if accept.contains(&status) {
            Ok(())
        } else {
            Err(StepFailure::Unexpected(status))
        }
    }

    /// Puts the bus back to idle and turns the failure into a [`Fault`].
    fn abort(&mut self, failure: StepFailure, read: usize) -> Fault {
        let error = match failure {
            StepFailure::Timeout => {
                self.hw.command(Command::Stop);
                BusError::Timeout
            }
            StepFailure::Unexpected(status) => {
                if let Some(command) = status.recovery() {
                    self.hw.command(command);
                }
                status.error()
            }
        };
        debug!("twi: transaction aborted: {}", error);
        Fault { error, read }
    }

    fn write_phase(&mut self, address: u8, data: &[u8]) -> Result<(), StepFailure> {
        self.expect(Command::Start, &[Status::Start, Status::RepeatedStart])?;
        self.expect(Command::Transmit(address << 1), &[Status::AddressWriteAck])?;
        for &byte in data {
            self.expect(Command::Transmit(byte), &[Status::DataWriteAck])?;
        }
        Ok(())
    }

    fn read_phase(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, (StepFailure, usize)> {
        self.expect(Command::Start, &[Status::Start, Status::RepeatedStart])
            .map_err(|f| (f, 0))?;
        self.expect(Command::Transmit((address << 1) | 1), &[Status::AddressReadAck])
            .map_err(|f| (f, 0))?;

        let last = buf.len() - 1;
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.step(Command::Receive { ack: i != last }) {
                Ok(Status::DataReadAck | Status::DataReadNack) => *slot = self.hw.data(),
                Ok(status) => return Err((StepFailure::Unexpected(status), i)),
                Err(failure) => return Err((failure, i)),
            }
        }
        Ok(buf.len())
    }
}

impl<H: TwiHardware> Bus for Twi<H> {
    fn transact(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<usize, Fault> {
        if (write.is_empty() && read.is_empty()) || address > MAX_ADDRESS {
            return Err(BusError::InvalidArgument.into());
        }

        if !write.is_empty() {
            if let Err(failure) = self.write_phase(address, write) {
                return Err(self.abort(failure, 0));
            }
        }

        let count = if read.is_empty() {
            0
        } else {
            match self.read_phase(address, read) {
                Ok(n) => n,
                Err((failure, n)) => return Err(self.abort(failure, n)),
            }
        };

        self.hw.command(Command::Stop);
        Ok(count)
    }
}
