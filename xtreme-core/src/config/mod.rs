//! Persisted machine settings
//!
//! - [`record`] - settings record and its flash layout
//! - [`checksum`] - CRC-16/CCITT-FALSE over the serialized record
//! - [`store`] - loading, validating and saving the record in flash

pub mod checksum;
pub mod record;
pub mod store;

pub use checksum::crc16_ccitt;
pub use record::{
    is_title_char, BootSource, ConfigRecord, RecordError, SoundMode, RECORD_LEN, ROM_BANKS,
    TITLE_LEN, TITLE_SLOTS, UNKNOWN_TITLE,
};
pub use store::{ConfigStore, LoadOutcome, Loaded, StoreError};
