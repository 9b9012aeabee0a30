//! mote2usb - two-wire motion accessory to USB HID adapter
//!
//! Target: nRF52840 (Cortex-M4F). No SoftDevice; the whole chip is ours.
//!
//! Architecture (Embassy async, one thread-mode executor):
//!   - USB task: runs the embassy-usb device and answers control requests
//!     (configuration commands, raw-mode feature reports)
//!   - Storage task: writes the settings to flash whenever a command
//!     changed them
//!   - Main loop: polls the accessory at 60 Hz and sends a report whenever
//!     the personality has something new
//!
//! The active personality and the settings are shared between the USB task
//! and the main loop behind thread-mode mutexes. Both run on the same
//! executor, so a lock never has to mask interrupts; USB and the RTC keep
//! running while the bus is bit-banged.

#![no_std]
#![no_main]

mod storage;
mod usb;

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::config::HfclkSource;
use embassy_nrf::gpio::{Flex, OutputDrive, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Duration, Ticker};
use mote2usb::bus::bitbang::{BitBang, CycleDelay};
use mote2usb::bus::twi::Twi;
use mote2usb::config::{BUS_HALF_PERIOD_US, BUS_SPIN_LIMIT, CLOCK_STRETCH_LIMIT_US, CPU_CLOCK_MHZ, POLL_HZ};
use mote2usb::dispatch::Dispatcher;
use mote2usb::hid::{ActivePersonality, ReportBuffer, MAX_REPORT_SIZE};
use mote2usb::settings::DeviceConfig;
use static_cell::StaticCell;
use storage::SettingsStore;
use usb::hid_device::{self, UsbDriver};
use {defmt_rtt as _, panic_probe as _};

/// Bit timing spins on the core clock; the RTC tick is ~30 µs.
type BitDelay = CycleDelay<fn(u32)>;
type AccessoryBus = Twi<BitBang<Flex<'static>, Flex<'static>, BitDelay>>;
type Flash = BlockingAsync<Nvmc<'static>>;

pub type Device = ActivePersonality<AccessoryBus, Delay>;
pub type SharedDevice = Mutex<ThreadModeRawMutex, RefCell<Device>>;
pub type SharedConfig = Mutex<ThreadModeRawMutex, RefCell<DeviceConfig>>;

static DEVICE: StaticCell<SharedDevice> = StaticCell::new();
static SETTINGS: StaticCell<SharedConfig> = StaticCell::new();

/// Releases the line and switches it to open-drain with pull-up.
fn open_drain(mut pin: Flex<'static>) -> Flex<'static> {
    pin.set_high();
    pin.set_as_input_output(Pull::Up, OutputDrive::Standard0Disconnect1);
    pin
}

fn bit_delay() -> BitDelay {
    CycleDelay::new(CPU_CLOCK_MHZ, cortex_m::asm::delay as fn(u32))
}

#[embassy_executor::task]
async fn usb_task(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn storage_task(mut store: SettingsStore<Flash>, settings: &'static SharedConfig) -> ! {
    info!("Storage task started");
    loop {
        hid_device::config_changed().wait().await;
        let config = settings.lock(|c| *c.borrow());
        // A failed write is logged; the running settings stay in effect.
        let _ = store.save(&config).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("mote2usb starting...");

    // USB needs the external crystal.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    // - Settings ---------------------------------------------
    let mut store = SettingsStore::new(BlockingAsync::new(Nvmc::new(p.NVMC)));
    let config = store.load().await;

    // - Accessory bus (P0.27 = SCL, P0.26 = SDA) ---------------
    let scl = open_drain(Flex::new(p.P0_27));
    let sda = open_drain(Flex::new(p.P0_26));
    let bus = Twi::new(
        BitBang::new(scl, sda, bit_delay(), BUS_HALF_PERIOD_US, CLOCK_STRETCH_LIMIT_US),
        BUS_SPIN_LIMIT,
    );

    let device: &'static SharedDevice =
        DEVICE.init(Mutex::new(RefCell::new(ActivePersonality::new(bus, Delay, &config))));
    let settings: &'static SharedConfig = SETTINGS.init(Mutex::new(RefCell::new(config)));

    // - USB --------------------------------------------------
    let usb = hid_device::init(p.USBD, device, settings);
    let mut writer = usb.writer;

    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(storage_task(store, settings));

    // - Poll loop --------------------------------------------
    info!("Polling at {} Hz in {} mode", POLL_HZ, config.mode);
    let mut dispatcher = Dispatcher::new();
    let mut ticker = Ticker::every(Duration::from_hz(u64::from(POLL_HZ)));
    let mut report: ReportBuffer = [0; MAX_REPORT_SIZE];

    loop {
        let pending = device.lock(|d| dispatcher.tick(&mut *d.borrow_mut()));
        if pending {
            writer.ready().await;
            if let Some(n) = device.lock(|d| dispatcher.flush(&mut *d.borrow_mut(), &mut report)) {
                if let Err(e) = writer.write(&report[..n]).await {
                    warn!("USB report write failed: {:?}", e);
                }
            }
        }
        ticker.next().await;
    }
}
