//! Settings store
//!
//! Owns the flash page holding the [`ConfigRecord`]. Loading never fails
//! from the caller's point of view: a record that is missing, corrupt or
//! overridden by the reset strap is replaced with the compiled-in defaults,
//! which are written back immediately.
//!
//! Saving erases the page and writes the whole record. The store is the only
//! owner of the page and `save` takes `&mut self`, so nobody can observe the
//! page between erase and write.

use xtreme_hal::flash::{FlashError, PageFlash};

use super::record::{ConfigRecord, RecordError, RECORD_LEN};

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Flash operation failed
    Flash(FlashError),
    /// Page too small for the record
    PageTooSmall,
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

/// How the record returned by [`ConfigStore::load`] came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// The stored record was valid
    Stored,
    /// The stored record was rejected; defaults were restored
    Corrupt(RecordError),
    /// The reset strap asked for defaults
    ResetRequested,
    /// Flash could not be read; defaults are in use
    Unreadable(FlashError),
}

/// Result of [`ConfigStore::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub record: ConfigRecord,
    pub outcome: LoadOutcome,
    /// Writing the defaults back failed (only set when defaults were restored)
    pub persist_error: Option<StoreError>,
}

/// Flash-backed settings store
pub struct ConfigStore<F> {
    flash: F,
    defaults: ConfigRecord,
}

impl<F: PageFlash> ConfigStore<F> {
    /// Create a store over `flash` with the given factory defaults
    pub fn new(flash: F, defaults: ConfigRecord) -> Result<Self, StoreError> {
        if flash.capacity() < RECORD_LEN {
            return Err(StoreError::PageTooSmall);
        }
        Ok(Self { flash, defaults })
    }

    /// Factory defaults this store falls back to
    pub fn defaults(&self) -> &ConfigRecord {
        &self.defaults
    }

    /// Read the stored record, falling back to defaults
    ///
    /// `reset_requested` reflects the boot-time reset strap.
    pub fn load(&mut self, reset_requested: bool) -> Loaded {
        let outcome = if reset_requested {
            LoadOutcome::ResetRequested
        } else {
            match self.read_record() {
                Ok(Ok(record)) => {
                    return Loaded {
                        record,
                        outcome: LoadOutcome::Stored,
                        persist_error: None,
                    }
                }
                Ok(Err(reason)) => LoadOutcome::Corrupt(reason),
                Err(e) => LoadOutcome::Unreadable(e),
            }
        };

        let record = self.defaults.clone();
        let persist_error = self.save(&record).err();
        Loaded {
            record,
            outcome,
            persist_error,
        }
    }

    /// Persist `record`
    pub fn save(&mut self, record: &ConfigRecord) -> Result<(), StoreError> {
        let bytes = record.to_bytes();
        self.flash.erase()?;
        self.flash.write(0, &bytes)?;
        Ok(())
    }

    /// Persist the factory defaults and return them
    pub fn restore_defaults(&mut self) -> Result<ConfigRecord, StoreError> {
        let record = self.defaults.clone();
        self.save(&record)?;
        Ok(record)
    }

    fn read_record(&mut self) -> Result<Result<ConfigRecord, RecordError>, FlashError> {
        let mut bytes = [0u8; RECORD_LEN];
        self.flash.read(0, &mut bytes)?;
        Ok(ConfigRecord::from_bytes(&bytes))
    }

    /// Give the flash back
    pub fn release(self) -> F {
        self.flash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::record::{BootSource, SoundMode};
    use crate::config::testing::RamFlash;
    use heapless::String;
    use proptest::prelude::*;

    fn defaults() -> ConfigRecord {
        let mut record = ConfigRecord::factory();
        record.titles[0] = String::try_from("TOS 2.06").unwrap();
        record
    }

    #[test]
    fn test_blank_flash_loads_defaults_and_persists() {
        let mut store = ConfigStore::new(RamFlash::new(), defaults()).unwrap();
        let loaded = store.load(false);
        assert_eq!(loaded.record, defaults());
        assert!(matches!(
            loaded.outcome,
            LoadOutcome::Corrupt(RecordError::Checksum { .. })
        ));
        assert_eq!(loaded.persist_error, None);

        // Second boot finds the persisted defaults
        let again = store.load(false);
        assert_eq!(again.outcome, LoadOutcome::Stored);
        assert_eq!(again.record, defaults());
    }

    #[test]
    fn test_reset_strap_overrides_valid_record() {
        let mut store = ConfigStore::new(RamFlash::new(), defaults()).unwrap();
        let mut custom = defaults();
        custom.rom_bank = 2;
        store.save(&custom).unwrap();

        let loaded = store.load(true);
        assert_eq!(loaded.outcome, LoadOutcome::ResetRequested);
        assert_eq!(loaded.record, defaults());
        assert_eq!(store.load(false).record, defaults());
    }

    #[test]
    fn test_save_erases_first() {
        let mut store = ConfigStore::new(RamFlash::new(), defaults()).unwrap();
        let mut record = defaults();
        record.sound = SoundMode::Mono;
        store.save(&record).unwrap();
        record.sound = SoundMode::Stereo;
        store.save(&record).unwrap();
        assert_eq!(store.load(false).record.sound, SoundMode::Stereo);

        let flash = store.release();
        assert_eq!(flash.erases, 2);
    }

    #[test]
    fn test_write_failure_reported() {
        let mut flash = RamFlash::new();
        flash.fail_writes = true;
        let mut store = ConfigStore::new(flash, defaults()).unwrap();
        assert_eq!(
            store.save(&defaults()),
            Err(StoreError::Flash(FlashError::Flash))
        );
        let loaded = store.load(false);
        assert_eq!(loaded.record, defaults());
        assert_eq!(
            loaded.persist_error,
            Some(StoreError::Flash(FlashError::Flash))
        );
    }

    fn arb_title() -> impl Strategy<Value = String<16>> {
        proptest::collection::vec(0x20u8..=0x7e, 0..=16).prop_map(|bytes| {
            let mut title = String::new();
            for b in bytes {
                title.push(b as char).unwrap();
            }
            title
        })
    }

    prop_compose! {
        fn arb_record()(
            titles in proptest::array::uniform4(arb_title()),
            rom_bank in 1u8..=4,
            mono in any::<bool>(),
            internal in any::<bool>(),
        ) -> ConfigRecord {
            ConfigRecord {
                titles,
                rom_bank,
                sound: if mono { SoundMode::Mono } else { SoundMode::Stereo },
                boot: if internal { BootSource::Internal } else { BootSource::External },
            }
        }
    }

    proptest! {
        #[test]
        fn prop_save_then_load_roundtrips(record in arb_record()) {
            let mut store = ConfigStore::new(RamFlash::new(), defaults()).unwrap();
            store.save(&record).unwrap();
            let loaded = store.load(false);
            prop_assert_eq!(loaded.outcome, LoadOutcome::Stored);
            prop_assert_eq!(loaded.record, record);
        }

        #[test]
        fn prop_single_byte_flip_yields_defaults(
            record in arb_record(),
            index in 0usize..RECORD_LEN,
            flip in 1u8..=255,
        ) {
            let mut store = ConfigStore::new(RamFlash::new(), defaults()).unwrap();
            store.save(&record).unwrap();

            let mut flash = store.release();
            flash.bytes[index] ^= flip;
            let mut store = ConfigStore::new(flash, defaults()).unwrap();

            let loaded = store.load(false);
            prop_assert!(matches!(loaded.outcome, LoadOutcome::Corrupt(_)));
            prop_assert_eq!(loaded.record, defaults());
        }
    }
}
