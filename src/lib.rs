//! Library interface for mote2usb.
//!
//! Everything that does not touch the nRF52840 lives here: the two-wire
//! bus engine and its GPIO controller, the accessory register protocol,
//! report decoding, the HID personalities, the poll scheduler and the
//! settings/command channel. It is `no_std` and allocation free, and runs
//! on the host for testing.
//!
//! Usage: `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and builds only with `--features embedded`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod accessory;
pub mod bus;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod hid;
pub mod settings;

#[cfg(test)]
mod testing;

pub use error::{BusError, CommandError, Error, Fault};
