//! USB Device subsystem - presents the active personality to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. The device has a single HID interface whose report
//! descriptor and identity come from the personality picked at startup:
//!
//! - Joystick: 8-byte input report
//! - Mouse:    4-byte boot-protocol input report
//! - Raw:      7-byte feature report, no input reports
//!
//! Configuration commands arrive as 5-byte SET_REPORTs on that interface
//! or as vendor control-IN requests on the device.

pub mod hid_device;
