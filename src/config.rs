//! Application-wide constants and compile-time configuration.
//!
//! Bus addresses, register map, timing parameters and USB identity
//! live here so they can be tuned in one place.

// Two-wire bus

/// 7-bit address every supported accessory answers at once initialised.
pub const ACCESSORY_ADDRESS: u8 = 0x52;

/// 7-bit address an inertial (gyroscope) accessory answers at out of reset.
pub const INERTIAL_ADDRESS: u8 = 0x53;

/// Report data register (6 bytes).
pub const REG_REPORT: u8 = 0x00;

/// First init register and the value that disables report scrambling.
pub const REG_INIT_1: u8 = 0xF0;
pub const INIT_1_VALUE: u8 = 0x55;

/// Second init register and its value.
pub const REG_INIT_2: u8 = 0xFB;
pub const INIT_2_VALUE: u8 = 0x00;

/// Identity register pair (0xFE high byte, 0xFF low byte).
pub const REG_IDENTITY: u8 = 0xFE;

/// Register / value moving an inertial accessory onto [`ACCESSORY_ADDRESS`].
pub const REG_INERTIAL_ACTIVATE: u8 = 0xFE;
pub const INERTIAL_ACTIVATE_VALUE: u8 = 0x04;

/// Pause after every register transaction (µs).
pub const REGISTER_GAP_US: u32 = 400;

/// Pause between the two init writes (ms).
pub const INIT_PAUSE_MS: u32 = 10;

/// Half of one SCL period (µs). 5 µs = 100 kHz, which is stable on long
/// accessory cables; 400 kHz is not.
pub const BUS_HALF_PERIOD_US: u32 = 5;

/// Core clock the bit timing is counted in (nRF52840 runs at 64 MHz).
pub const CPU_CLOCK_MHZ: u32 = 64;

/// Ready-flag polls before a bus step is declared timed out.
pub const BUS_SPIN_LIMIT: u32 = 10_000;

/// 1 µs polls a target may hold SCL low (clock stretching).
pub const CLOCK_STRETCH_LIMIT_US: u32 = 1_000;

// Polling

/// Poll timer rate (Hz).
pub const POLL_HZ: u32 = 60;

/// Ticks skipped after identification before the first report read
/// (~1 s; accessories ignore commands right after power-up).
pub const SETTLE_TICKS: u16 = POLL_HZ as u16;

/// Ticks a button must be held for a hold gesture (~3 s).
pub const HOLD_TICKS: u16 = 3 * POLL_HZ as u16;

/// Samples averaged into the gyroscope zero baseline after connection.
pub const BASELINE_SAMPLES: u8 = 10;

// USB

/// USB VID - the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PIDs for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID_JOYSTICK: u16 = 0x0010;
pub const USB_PID_MOUSE: u16 = 0x0011;
pub const USB_PID_RAW: u16 = 0x0012;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "mote2usb";
pub const USB_PRODUCT_JOYSTICK: &str = "Accessory to USB Joystick";
pub const USB_PRODUCT_MOUSE: &str = "Accessory to USB Mouse";
pub const USB_PRODUCT_RAW: &str = "Accessory Register Bridge";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 5;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Logical names only; the concrete pins are picked in `main.rs`.
//
//   Accessory SDA  → P0.26
//   Accessory SCL  → P0.27
//
// Both lines need external pull-ups to the accessory's 3.3 V rail.

// Settings storage

/// Flash page index where settings storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for settings storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;
