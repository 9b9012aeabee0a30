//! Persistent settings.
//!
//! Uses the nRF52840's internal flash via the `sequential-storage` crate
//! to keep the [`DeviceConfig`] record across power cycles.
//!
//! Storage layout:
//!   - One map item under [`KEY_DEVICE_CONFIG`] holding the versioned
//!     record from `DeviceConfig::serialize`.
//!   - Writes append; `sequential-storage` handles wear levelling and GC
//!     across the reserved pages.

use core::ops::Range;

use defmt::{debug, error, info, warn};
use embedded_storage_async::nor_flash::NorFlash;
use mote2usb::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use mote2usb::settings::{DeviceConfig, RECORD_SIZE};
use mote2usb::Error;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

const KEY_DEVICE_CONFIG: u8 = 0x01;

/// Working buffer for `sequential-storage`: item header, key and record.
const SCRATCH_SIZE: usize = 64;

pub struct SettingsStore<F> {
    flash: F,
}

impl<F: NorFlash> SettingsStore<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    fn range() -> Range<u32> {
        STORAGE_START..STORAGE_END
    }

    /// Reads the stored settings.
    ///
    /// A missing record, or one that needed repairs (bad mode, zero
    /// divisor, unreadable serial), is rewritten with what was loaded so
    /// the next boot finds a clean record.
    pub async fn load(&mut self) -> DeviceConfig {
        let mut buf = [0u8; SCRATCH_SIZE];
        let (config, rewrite) = match fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            Self::range(),
            &mut NoCache::new(),
            &mut buf,
            &KEY_DEVICE_CONFIG,
        )
        .await
        {
            Ok(Some(data)) => match DeviceConfig::deserialize(data) {
                Some(config) => {
                    let mut clean = [0u8; RECORD_SIZE];
                    config.serialize(&mut clean);
                    (config, clean[..] != *data)
                }
                None => {
                    warn!("Settings record unreadable ({} bytes), using defaults", data.len());
                    (DeviceConfig::default(), true)
                }
            },
            Ok(None) => {
                info!("No settings in flash, using defaults");
                (DeviceConfig::default(), true)
            }
            Err(e) => {
                error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                (DeviceConfig::default(), false)
            }
        };

        if rewrite {
            // Logged inside; the loaded values are used either way.
            let _ = self.save(&config).await;
        }
        info!("Settings: mode={} serial={}", config.mode, config.serial_str());
        config
    }

    /// Persists `config`.
    pub async fn save(&mut self, config: &DeviceConfig) -> Result<(), Error> {
        let mut record = [0u8; RECORD_SIZE];
        let len = config.serialize(&mut record);
        let item: &[u8] = &record[..len];
        let mut buf = [0u8; SCRATCH_SIZE];

        match store_item::<u8, &[u8], _>(
            &mut self.flash,
            Self::range(),
            &mut NoCache::new(),
            &mut buf,
            &KEY_DEVICE_CONFIG,
            &item,
        )
        .await
        {
            Ok(()) => {
                debug!("Settings saved ({} bytes)", len);
                Ok(())
            }
            Err(e) => {
                error!("Flash write error: {:?}", defmt::Debug2Format(&e));
                Err(Error::Storage)
            }
        }
    }
}
