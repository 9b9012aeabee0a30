//! Test doubles shared by the unit tests.

use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::config::{ACCESSORY_ADDRESS, INERTIAL_ACTIVATE_VALUE, INERTIAL_ADDRESS, REG_IDENTITY, REG_INERTIAL_ACTIVATE};
use crate::decode::PeripheralId;
use crate::error::{BusError, Fault};

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// An accessory register file on a simulated bus.
///
/// Writes set the register pointer (first byte) and store any following
/// bytes; reads return registers from the pointer onwards. Every attempted
/// write is logged, answered or not.
pub struct SimAccessory {
    pub present: bool,
    /// Answering on the secondary address until activated.
    pub parked: bool,
    /// Fail this many upcoming transactions with an address NACK.
    pub fail_next: u32,
    pub registers: [u8; 256],
    pub pointer: u8,
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl SimAccessory {
    pub fn new(id: PeripheralId) -> Self {
        let mut sim = Self {
            present: true,
            parked: false,
            fail_next: 0,
            registers: [0; 256],
            pointer: 0,
            writes: Vec::new(),
        };
        sim.set_identity(id);
        sim
    }

    pub fn set_identity(&mut self, id: PeripheralId) {
        let [hi, lo] = id.code().to_be_bytes();
        self.registers[REG_IDENTITY as usize] = hi;
        self.registers[REG_IDENTITY as usize + 1] = lo;
    }

    pub fn set_report(&mut self, report: [u8; 6]) {
        self.registers[..6].copy_from_slice(&report);
    }
}

impl Bus for SimAccessory {
    fn transact(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<usize, Fault> {
        if write.is_empty() && read.is_empty() {
            return Err(BusError::InvalidArgument.into());
        }
        if !write.is_empty() {
            self.writes.push((address, write.to_vec()));
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(BusError::AddressNack.into());
        }
        let home = if self.parked { INERTIAL_ADDRESS } else { ACCESSORY_ADDRESS };
        if !self.present || address != home {
            return Err(BusError::AddressNack.into());
        }

        if let Some((&reg, data)) = write.split_first() {
            if self.parked && reg == REG_INERTIAL_ACTIVATE && data == [INERTIAL_ACTIVATE_VALUE] {
                self.parked = false;
                return Ok(0);
            }
            self.pointer = reg;
            for (i, &byte) in data.iter().enumerate() {
                self.registers[reg.wrapping_add(i as u8) as usize] = byte;
            }
        }
        for (i, slot) in read.iter_mut().enumerate() {
            *slot = self.registers[self.pointer.wrapping_add(i as u8) as usize];
        }
        Ok(read.len())
    }
}
