//! Two-wire bus access.
//!
//! [`Bus`] is the seam between the accessory register protocol and whatever
//! moves bits on the wire. [`twi::Twi`] implements it on top of any
//! status-code driven controller ([`twi::TwiHardware`]), and
//! [`bitbang::BitBang`] is such a controller built from two GPIOs.

pub mod bitbang;
pub mod twi;

pub use crate::error::{BusError, Fault};

/// Largest valid 7-bit target address.
pub const MAX_ADDRESS: u8 = 0x7F;

/// One addressed transaction at a time: an optional write phase followed by
/// an optional read phase, joined by a repeated START.
pub trait Bus {
    /// Writes `write` to `address`, then reads `read.len()` bytes back.
    ///
    /// Returns the number of bytes read. Both slices empty is an
    /// [`BusError::InvalidArgument`] and touches nothing on the wire.
    fn transact(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<usize, Fault>;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.transact(address, data, &mut [])
            .map(|_| ())
            .map_err(|f| f.error)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.transact(address, &[], buf)
            .map(|_| ())
            .map_err(|f| f.error)
    }
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn transact(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<usize, Fault> {
        (**self).transact(address, write, read)
    }
}
