//! Error types for mote2usb.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Every type derives `defmt::Format` when the `defmt` feature is on.

/// Why a single two-wire transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Nothing to write and nothing to read, or an address wider than 7 bits.
    InvalidArgument,
    /// SLA+W or SLA+R was not acknowledged.
    AddressNack,
    /// A written data byte was not acknowledged.
    DataNack,
    /// Another master, or a line stuck low, won arbitration.
    ArbitrationLost,
    /// The controller never raised its ready flag.
    Timeout,
    /// Illegal START/STOP or any other unexpected status code.
    Bus,
}

/// A failed transaction and the number of bytes read before it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fault {
    pub error: BusError,
    /// Bytes already stored in the read buffer (always a prefix).
    pub read: usize,
}

impl From<BusError> for Fault {
    fn from(error: BusError) -> Self {
        Fault { error, read: 0 }
    }
}

/// Rejections at the configuration / feature-report boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Command code not recognised.
    UnknownCommand(u8),
    /// Recognised command, parameter out of range.
    InvalidParameter,
    /// Payload length does not match the command channel.
    BadLength,
    /// The active personality has no handler for this request.
    Unsupported,
}

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A bus transaction failed during normal polling.
    Bus(BusError),
    /// A bus transaction failed during the init / identify handshake.
    Identification(BusError),
    /// A configuration command was rejected.
    Command(CommandError),
    /// Flash read/write/erase failed.
    Storage,
}

// Convenience conversions

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Error::Bus(e)
    }
}

impl From<Fault> for Error {
    fn from(f: Fault) -> Self {
        Error::Bus(f.error)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}
