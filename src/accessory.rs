//! Accessory register protocol and connection state machine.
//!
//! An accessory is a small register file behind the two-wire bus. Before it
//! produces reports it has to be initialised (two register writes) and
//! identified (two-byte identity register). [`Accessory::poll`] runs that
//! handshake whenever nothing is connected, waits out a short settle period
//! and then reads one report block per call. Any bus failure drops back to
//! [`State::Uninitialized`] so a re-plugged (or different) accessory is
//! picked up on the next tick.

use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::config::{
    ACCESSORY_ADDRESS, INERTIAL_ACTIVATE_VALUE, INERTIAL_ADDRESS, INIT_1_VALUE, INIT_2_VALUE,
    INIT_PAUSE_MS, REGISTER_GAP_US, REG_IDENTITY, REG_INERTIAL_ACTIVATE, REG_INIT_1, REG_INIT_2,
    REG_REPORT, SETTLE_TICKS,
};
use crate::decode::{PeripheralId, RawSample, RAW_SAMPLE_LEN};
use crate::error::{BusError, Error};

/// Most data bytes a single register write carries.
pub const MAX_REGISTER_WRITE: usize = 7;

/// Register-level access: every transaction is followed by a fixed gap
/// the accessory needs before it accepts the next one.
pub struct Registers<B, D> {
    bus: B,
    delay: D,
}

impl<B: Bus, D: DelayNs> Registers<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self { bus, delay }
    }

    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Writes `data` starting at register `reg`.
    pub fn write(&mut self, address: u8, reg: u8, data: &[u8]) -> Result<(), BusError> {
        if data.len() > MAX_REGISTER_WRITE {
            return Err(BusError::InvalidArgument);
        }
        let mut frame = [0u8; MAX_REGISTER_WRITE + 1];
        frame[0] = reg;
        frame[1..=data.len()].copy_from_slice(data);

        let result = self.bus.write(address, &frame[..=data.len()]);
        self.delay.delay_us(REGISTER_GAP_US);
        result
    }

    /// Reads `dst.len()` registers starting at `reg`.
    ///
    /// The register pointer is set in its own transaction; these targets
    /// do not cope with a repeated START right after the pointer write.
    pub fn read(&mut self, address: u8, reg: u8, dst: &mut [u8]) -> Result<(), BusError> {
        self.bus.write(address, &[reg])?;
        self.delay.delay_us(REGISTER_GAP_US);
        let result = self.bus.read(address, dst);
        self.delay.delay_us(REGISTER_GAP_US);
        result
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Uninitialized,
    /// Identified; `settle` polls remain before reports are read.
    Active { id: PeripheralId, settle: u16 },
}

/// Inputs to [`State::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The init handshake succeeded.
    Identified { id: PeripheralId, settle: u16 },
    /// One poll went by without a bus failure.
    Tick,
    BusFailure,
}

impl State {
    pub const fn next(self, event: Event) -> State {
        match (self, event) {
            (_, Event::BusFailure) => State::Uninitialized,
            (_, Event::Identified { id, settle }) => State::Active { id, settle },
            (State::Active { id, settle }, Event::Tick) => State::Active {
                id,
                settle: settle.saturating_sub(1),
            },
            (State::Uninitialized, Event::Tick) => State::Uninitialized,
        }
    }

    pub const fn identity(self) -> Option<PeripheralId> {
        match self {
            State::Active { id, .. } => Some(id),
            State::Uninitialized => None,
        }
    }
}

/// Result of one [`Accessory::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    /// Nothing answered (or the accessory just went away).
    Absent,
    /// Identified, still inside the settle period.
    Settling(PeripheralId),
    /// `fresh` is set on the first report of a connection.
    Sample { id: PeripheralId, raw: RawSample, fresh: bool },
}

pub struct Accessory<B, D> {
    registers: Registers<B, D>,
    state: State,
    settle_ticks: u16,
    failures: u16,
    fresh: bool,
}

impl<B: Bus, D: DelayNs> Accessory<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            registers: Registers::new(bus, delay),
            state: State::Uninitialized,
            settle_ticks: SETTLE_TICKS,
            failures: 0,
            fresh: false,
        }
    }

    pub fn with_settle_ticks(mut self, ticks: u16) -> Self {
        self.settle_ticks = ticks;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Consecutive failed polls.
    pub fn failures(&self) -> u16 {
        self.failures
    }

    pub fn registers(&mut self) -> &mut Registers<B, D> {
        &mut self.registers
    }

    pub fn poll(&mut self) -> Poll {
        match self.state {
            State::Uninitialized => match self.identify() {
                Ok(id) => {
                    info!("accessory: identified {} ({=u16:#x})", id, id.code());
                    self.state = self.state.next(Event::Identified { id, settle: self.settle_ticks });
                    self.failures = 0;
                    self.fresh = true;
                    Poll::Settling(id)
                }
                Err(e) => {
                    self.failures = self.failures.saturating_add(1);
                    debug!("accessory: not answering ({} attempts): {}", self.failures, e);
                    Poll::Absent
                }
            },
            State::Active { id, settle } if settle > 0 => {
                self.state = self.state.next(Event::Tick);
                Poll::Settling(id)
            }
            State::Active { id, .. } => match self.read_report() {
                Ok(raw) => {
                    self.failures = 0;
                    Poll::Sample { id, raw, fresh: core::mem::take(&mut self.fresh) }
                }
                Err(e) => {
                    warn!("accessory: lost {}: {}", id, e);
                    self.state = self.state.next(Event::BusFailure);
                    self.failures = self.failures.saturating_add(1);
                    Poll::Absent
                }
            },
        }
    }

    fn identify(&mut self) -> Result<PeripheralId, Error> {
        // Inertial accessories start out on the secondary address. Moving
        // one over fails harmlessly when none is plugged in.
        let _ = self
            .registers
            .write(INERTIAL_ADDRESS, REG_INERTIAL_ACTIVATE, &[INERTIAL_ACTIVATE_VALUE]);

        self.registers
            .write(ACCESSORY_ADDRESS, REG_INIT_1, &[INIT_1_VALUE])
            .map_err(Error::Identification)?;
        self.registers.delay_ms(INIT_PAUSE_MS);
        self.registers
            .write(ACCESSORY_ADDRESS, REG_INIT_2, &[INIT_2_VALUE])
            .map_err(Error::Identification)?;

        let mut id = [0u8; 2];
        self.registers
            .read(ACCESSORY_ADDRESS, REG_IDENTITY, &mut id)
            .map_err(Error::Identification)?;
        Ok(PeripheralId::from_bytes(id))
    }

    fn read_report(&mut self) -> Result<RawSample, Error> {
        let mut raw = [0u8; RAW_SAMPLE_LEN];
        self.registers.read(ACCESSORY_ADDRESS, REG_REPORT, &mut raw)?;
        Ok(RawSample(raw))
    }
}
