//! USB HID device - one interface for the active personality.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral. Input reports go out through the returned writer; every
//! control request is answered from inside the USB task.

use crate::{SharedConfig, SharedDevice};
use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::{Builder, Config, Handler, UsbDevice};
use mote2usb::config;
use mote2usb::hid::raw::FEATURE_REPORT_SIZE;
use mote2usb::hid::{DeviceInfo, Personality, MAX_REPORT_SIZE};
use mote2usb::settings::{handle_command_report, SERIAL_LEN};
use mote2usb::CommandError;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// Largest input report; also the interrupt endpoint packet size.
const MAX_PACKET_SIZE: usize = MAX_REPORT_SIZE;

pub type ReportWriter = HidWriter<'static, UsbDriver, MAX_PACKET_SIZE>;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_SERIAL: StaticCell<heapless::String<SERIAL_LEN>> = StaticCell::new();
static REPORT_HANDLER: StaticCell<ReportHandler> = StaticCell::new();
static VENDOR_HANDLER: StaticCell<VendorHandler> = StaticCell::new();
static CONFIG_CHANGED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Raised every time a command changed the settings.
///
/// The receiver reads the new values from the shared configuration.
pub fn config_changed() -> &'static Signal<CriticalSectionRawMutex, ()> {
    &CONFIG_CHANGED
}

/// Applies one configuration command and pushes the result to the running
/// personality. Returns the acknowledgement byte.
fn apply_command(device: &SharedDevice, settings: &SharedConfig, report: &[u8]) -> Result<u8, CommandError> {
    let mut reply = [0u8; 1];
    settings.lock(|cell| {
        let mut config = cell.borrow_mut();
        handle_command_report(&mut config, report, &mut reply)?;
        let updated = *config;
        device.lock(|d| d.borrow_mut().configure(&updated));
        Ok::<(), CommandError>(())
    })?;
    CONFIG_CHANGED.signal(());
    Ok(reply[0])
}

/// HID class requests on the interface.
struct ReportHandler {
    device: &'static SharedDevice,
    settings: &'static SharedConfig,
}

impl RequestHandler for ReportHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        match id {
            ReportId::Feature(_) => {
                let n = self.device.lock(|d| d.borrow_mut().get_feature_report(buf));
                (n > 0).then_some(n)
            }
            ReportId::In(_) => {
                let mut report = [0u8; MAX_REPORT_SIZE];
                let n = self.device.lock(|d| d.borrow_mut().build_report(&mut report));
                let n = n.min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                (n > 0).then_some(n)
            }
            ReportId::Out(_) => None,
        }
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let result = match id {
            ReportId::Feature(_) if data.len() == FEATURE_REPORT_SIZE => {
                self.device.lock(|d| d.borrow_mut().set_feature_report(data))
            }
            _ => apply_command(self.device, self.settings, data).map(|_| ()),
        };
        match result {
            Ok(()) => OutResponse::Accepted,
            Err(e) => {
                warn!("SET_REPORT rejected: {}", e);
                OutResponse::Rejected
            }
        }
    }
}

/// Vendor control-IN configuration requests.
///
/// `bRequest` is the command byte; `wValue` and `wIndex` carry the four
/// parameter bytes, little-endian. The data stage echoes the command.
struct VendorHandler {
    device: &'static SharedDevice,
    settings: &'static SharedConfig,
}

impl Handler for VendorHandler {
    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if req.request_type != RequestType::Vendor || req.recipient != Recipient::Device {
            return None;
        }
        let [p0, p1] = req.value.to_le_bytes();
        let [p2, p3] = req.index.to_le_bytes();
        match apply_command(self.device, self.settings, &[req.request, p0, p1, p2, p3]) {
            Ok(ack) => {
                let n = buf.len().min(1);
                if n > 0 {
                    buf[0] = ack;
                }
                Some(InResponse::Accepted(&buf[..n]))
            }
            Err(_) => Some(InResponse::Rejected),
        }
    }
}

/// Build result containing the USB device runner and the report writer.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub writer: ReportWriter,
}

/// Initialise the USB stack with the active personality's identity.
///
/// Must be called exactly once. All static buffers are consumed here.
pub fn init(
    usbd: peripherals::USBD,
    device: &'static SharedDevice,
    settings: &'static SharedConfig,
) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let (info, descriptor): (DeviceInfo, &'static [u8]) = device.lock(|d| {
        let d = d.borrow();
        (d.device_info(), d.report_descriptor())
    });
    let serial = settings.lock(|c| heapless::String::try_from(c.borrow().serial_str()).unwrap_or_default());
    let serial = USB_SERIAL.init(serial);

    // USB device-level configuration.
    let mut usb_config = Config::new(info.vendor_id, info.product_id);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(info.product);
    usb_config.serial_number = Some(serial.as_str());
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(driver, usb_config, config_desc, bos_desc, msos_desc, ctrl_buf);

    let vendor_handler = VENDOR_HANDLER.init(VendorHandler { device, settings });
    builder.handler(vendor_handler);

    let report_handler = REPORT_HANDLER.init(ReportHandler { device, settings });
    let hid_config = HidConfig {
        report_descriptor: descriptor,
        request_handler: Some(report_handler),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: MAX_PACKET_SIZE as u16,
    };
    let writer = HidWriter::new(&mut builder, HID_STATE.init(State::new()), hid_config);

    let device = builder.build();

    info!(
        "USB HID device initialised ({=str}, {=u16:#x}:{=u16:#x})",
        info.product,
        info.vendor_id,
        info.product_id
    );

    UsbHidDevice { device, writer }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles enumeration, suspend/resume, and control requests.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}
