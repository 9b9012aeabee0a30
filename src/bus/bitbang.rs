//! GPIO bit-banged two-wire controller.
//!
//! Drives SCL and SDA as open-drain lines: `set_low` pulls the line down,
//! `set_high` releases it to the external pull-up. Every step completes
//! synchronously inside [`TwiHardware::command`] and leaves the TWI status
//! code the [`Twi`](super::twi::Twi) engine expects.
//!
//! ```text
//!        START         bit 7 ... bit 0   ACK         STOP
//! SDA  ‾‾\____ X=====X=====X ... X=====X ‾‾\__ ... ____/‾‾
//! SCL  ‾‾‾‾\__ /‾\_/‾\_/‾\_/ ... /‾\_/ /‾\_  ... __/‾‾‾‾
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::twi::{Command, Status, TwiHardware};

/// Where the controller is inside a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// START sent, next byte is SLA+R/W.
    Addressing,
    Transmitting,
    Receiving,
}

/// Line-level failures inside one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFault {
    /// A target held SCL low past the stretch limit.
    Stretched,
    /// A released SDA read back low.
    ArbitrationLost,
    /// The pin driver itself returned an error.
    Pin,
}

pub struct BitBang<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    half_period_us: u32,
    stretch_limit_us: u32,
    phase: Phase,
    status: u8,
    data: u8,
    ready: bool,
}

impl<SCL, SDA, D> BitBang<SCL, SDA, D>
where
    SCL: InputPin + OutputPin,
    SDA: InputPin + OutputPin,
    D: DelayNs,
{
    /// Both pins must already be configured open-drain with pull-ups and
    /// released (high).
    pub fn new(scl: SCL, sda: SDA, delay: D, half_period_us: u32, stretch_limit_us: u32) -> Self {
        Self {
            scl,
            sda,
            delay,
            half_period_us,
            stretch_limit_us,
            phase: Phase::Idle,
            status: Status::NO_INFO,
            data: 0,
            ready: false,
        }
    }

    fn half(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    fn set_sda(&mut self, high: bool) -> Result<(), LineFault> {
        let result = if high { self.sda.set_high() } else { self.sda.set_low() };
        result.map_err(|_| LineFault::Pin)
    }

    fn sda_is_high(&mut self) -> Result<bool, LineFault> {
        self.sda.is_high().map_err(|_| LineFault::Pin)
    }

    fn pull_scl(&mut self) -> Result<(), LineFault> {
        self.scl.set_low().map_err(|_| LineFault::Pin)
    }

    /// Releases SCL and waits until it actually reads high.
    fn release_scl(&mut self) -> Result<(), LineFault> {
        self.scl.set_high().map_err(|_| LineFault::Pin)?;
        for _ in 0..=self.stretch_limit_us {
            if self.scl.is_high().map_err(|_| LineFault::Pin)? {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(LineFault::Stretched)
    }

    fn release_lines(&mut self) {
        let _ = self.sda.set_high();
        let _ = self.scl.set_high();
        self.phase = Phase::Idle;
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), LineFault> {
        self.set_sda(bit)?;
        self.half();
        self.release_scl()?;
        if bit && !self.sda_is_high()? {
            return Err(LineFault::ArbitrationLost);
        }
        self.half();
        self.pull_scl()
    }

    fn read_bit(&mut self) -> Result<bool, LineFault> {
        self.set_sda(true)?;
        self.half();
        self.release_scl()?;
        let bit = self.sda_is_high()?;
        self.half();
        self.pull_scl()?;
        Ok(bit)
    }

    fn start(&mut self) -> Result<u8, LineFault> {
        let repeated = self.phase != Phase::Idle;
        if repeated {
            self.set_sda(true)?;
            self.half();
        }
        self.release_scl()?;
        self.half();
        if !self.sda_is_high()? {
            return Err(LineFault::ArbitrationLost);
        }
        self.set_sda(false)?;
        self.half();
        self.pull_scl()?;
        self.phase = Phase::Addressing;
        Ok(if repeated { Status::REPEATED_START } else { Status::START })
    }

    fn transmit(&mut self, byte: u8) -> Result<u8, LineFault> {
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 != 0)?;
        }
        let acked = !self.read_bit()?;
        let status = match self.phase {
            Phase::Addressing if byte & 1 == 1 => {
                self.phase = Phase::Receiving;
                if acked { Status::ADDRESS_READ_ACK } else { Status::ADDRESS_READ_NACK }
            }
            Phase::Addressing => {
                self.phase = Phase::Transmitting;
                if acked { Status::ADDRESS_WRITE_ACK } else { Status::ADDRESS_WRITE_NACK }
            }
            _ => {
                if acked { Status::DATA_WRITE_ACK } else { Status::DATA_WRITE_NACK }
            }
        };
        Ok(status)
    }

    fn receive(&mut self, ack: bool) -> Result<u8, LineFault> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit()?);
        }
        self.write_bit(!ack)?;
        self.data = byte;
        Ok(if ack { Status::DATA_READ_ACK } else { Status::DATA_READ_NACK })
    }

    fn stop(&mut self) -> Result<(), LineFault> {
        self.set_sda(false)?;
        self.half();
        self.release_scl()?;
        self.half();
        self.set_sda(true)?;
        self.half();
        Ok(())
    }
}

impl<SCL, SDA, D> TwiHardware for BitBang<SCL, SDA, D>
where
    SCL: InputPin + OutputPin,
    SDA: InputPin + OutputPin,
    D: DelayNs,
{
    fn command(&mut self, command: Command) {
        self.ready = false;
        let outcome = match command {
            Command::Start => self.start(),
            Command::Transmit(byte) => self.transmit(byte),
            Command::Receive { ack } => self.receive(ack),
            Command::Stop => {
                if self.stop().is_err() {
                    self.release_lines();
                }
                self.phase = Phase::Idle;
                self.status = Status::NO_INFO;
                return;
            }
            Command::Release => {
                self.release_lines();
                self.status = Status::NO_INFO;
                return;
            }
        };

        match outcome {
            Ok(status) => {
                self.status = status;
                self.ready = true;
            }
            // Ready stays low; the engine times out and sends STOP.
            Err(LineFault::Stretched) => {}
            Err(LineFault::ArbitrationLost) => {
                self.release_lines();
                self.status = Status::ARBITRATION_LOST;
                self.ready = true;
            }
            Err(LineFault::Pin) => {
                self.status = Status::BUS_ERROR;
                self.ready = true;
            }
        }
    }

    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn status(&mut self) -> u8 {
        self.status
    }

    fn data(&mut self) -> u8 {
        self.data
    }
}

/// Cycles needed to wait at least `ns` nanoseconds at `cpu_mhz`.
pub const fn cycles_for_ns(ns: u32, cpu_mhz: u32) -> u32 {
    let cycles = (ns as u64 * cpu_mhz as u64).div_ceil(1_000);
    if cycles > u32::MAX as u64 {
        u32::MAX
    } else {
        cycles as u32
    }
}

/// Busy-wait delay counted in CPU cycles.
///
/// Bit timing needs single-microsecond steps, finer than a tick-based
/// timer resolves. `spin` must burn at least the cycles it is given
/// (`cortex_m::asm::delay` on the target).
pub struct CycleDelay<S> {
    cpu_mhz: u32,
    spin: S,
}

impl<S: FnMut(u32)> CycleDelay<S> {
    pub const fn new(cpu_mhz: u32, spin: S) -> Self {
        Self { cpu_mhz, spin }
    }
}

impl<S: FnMut(u32)> DelayNs for CycleDelay<S> {
    fn delay_ns(&mut self, ns: u32) {
        (self.spin)(cycles_for_ns(ns, self.cpu_mhz));
    }

    fn delay_us(&mut self, us: u32) {
        (self.spin)(us.saturating_mul(self.cpu_mhz));
    }
}
