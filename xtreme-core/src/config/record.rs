//! Settings record
//!
//! Flash layout (76 bytes, multi-byte fields big-endian):
//!
//! ```text
//! offset  size  field
//!      0  4x17  ROM titles, NUL padded (max 16 characters each)
//!     68     1  active ROM bank (1-4)
//!     69     1  sound mode (0 = stereo, 1 = mono)
//!     70     1  boot source (0 = external, 1 = internal drive)
//!     71     3  reserved, written as 0
//!     74     2  CRC-16/CCITT-FALSE over bytes 0..74
//! ```

use core::ops::RangeInclusive;

use heapless::String;

use super::checksum::crc16_ccitt;

/// Maximum characters in a ROM title
pub const TITLE_LEN: usize = 16;

/// Number of ROM banks (and titles)
pub const TITLE_SLOTS: usize = 4;

/// Valid ROM bank numbers
pub const ROM_BANKS: RangeInclusive<u8> = 1..=4;

/// Serialized record size
pub const RECORD_LEN: usize = 76;

const TITLE_FIELD: usize = TITLE_LEN + 1;
const BANK_OFFSET: usize = TITLE_FIELD * TITLE_SLOTS;
const SOUND_OFFSET: usize = BANK_OFFSET + 1;
const BOOT_OFFSET: usize = SOUND_OFFSET + 1;
const CRC_OFFSET: usize = RECORD_LEN - 2;

/// Title stored for banks nobody has named yet
pub const UNKNOWN_TITLE: &str = "TOS name unknown";

/// Reasons a stored record is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Stored checksum does not match the data
    Checksum { stored: u16, computed: u16 },
    /// Title slot holds something other than printable ASCII
    Title(u8),
    /// ROM bank outside 1-4
    RomBank(u8),
    /// Unknown sound mode value
    Sound(u8),
    /// Unknown boot source value
    Boot(u8),
}

/// Audio output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundMode {
    #[default]
    Stereo,
    Mono,
}

impl SoundMode {
    pub fn toggled(self) -> Self {
        match self {
            SoundMode::Stereo => SoundMode::Mono,
            SoundMode::Mono => SoundMode::Stereo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SoundMode::Stereo => "Stereo",
            SoundMode::Mono => "Mono",
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            SoundMode::Stereo => 0,
            SoundMode::Mono => 1,
        }
    }

    fn from_byte(value: u8) -> Result<Self, RecordError> {
        match value {
            0 => Ok(SoundMode::Stereo),
            1 => Ok(SoundMode::Mono),
            other => Err(RecordError::Sound(other)),
        }
    }
}

/// Floppy drive the machine boots from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootSource {
    #[default]
    Internal,
    External,
}

impl BootSource {
    pub fn toggled(self) -> Self {
        match self {
            BootSource::Internal => BootSource::External,
            BootSource::External => BootSource::Internal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BootSource::Internal => "Intern",
            BootSource::External => "Extern",
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            BootSource::External => 0,
            BootSource::Internal => 1,
        }
    }

    fn from_byte(value: u8) -> Result<Self, RecordError> {
        match value {
            0 => Ok(BootSource::External),
            1 => Ok(BootSource::Internal),
            other => Err(RecordError::Boot(other)),
        }
    }
}

/// User settings kept in flash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRecord {
    /// Display names of the four ROM banks
    pub titles: [String<TITLE_LEN>; TITLE_SLOTS],
    /// Active ROM bank, 1-based
    pub rom_bank: u8,
    pub sound: SoundMode,
    pub boot: BootSource,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self::factory()
    }
}

impl ConfigRecord {
    /// Built-in factory settings
    pub fn factory() -> Self {
        let mut title = String::new();
        // UNKNOWN_TITLE is exactly TITLE_LEN characters
        let _ = title.push_str(UNKNOWN_TITLE);
        Self {
            titles: core::array::from_fn(|_| title.clone()),
            rom_bank: *ROM_BANKS.start(),
            sound: SoundMode::Stereo,
            boot: BootSource::Internal,
        }
    }

    /// Title of the active ROM bank
    pub fn active_title(&self) -> &str {
        self.title(self.rom_bank).unwrap_or(UNKNOWN_TITLE)
    }

    /// Title of a 1-based ROM bank
    pub fn title(&self, bank: u8) -> Option<&str> {
        let slot = usize::from(bank.checked_sub(1)?);
        self.titles.get(slot).map(|t| t.as_str())
    }

    /// Step the ROM bank down, stopping at bank 1
    pub fn previous_bank(&mut self) {
        self.rom_bank = self.rom_bank.saturating_sub(1).max(*ROM_BANKS.start());
    }

    /// Step the ROM bank up, stopping at bank 4
    pub fn next_bank(&mut self) {
        self.rom_bank = self.rom_bank.saturating_add(1).min(*ROM_BANKS.end());
    }

    /// Serialize with a freshly computed checksum
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        for (field, title) in out[..BANK_OFFSET]
            .chunks_exact_mut(TITLE_FIELD)
            .zip(&self.titles)
        {
            field[..title.len()].copy_from_slice(title.as_bytes());
        }
        out[BANK_OFFSET] = self.rom_bank;
        out[SOUND_OFFSET] = self.sound.to_byte();
        out[BOOT_OFFSET] = self.boot.to_byte();

        let crc = crc16_ccitt(&out[..CRC_OFFSET]);
        out[CRC_OFFSET..].copy_from_slice(&crc.to_be_bytes());
        out
    }

    /// Parse and validate a stored record
    pub fn from_bytes(bytes: &[u8; RECORD_LEN]) -> Result<Self, RecordError> {
        let stored = u16::from_be_bytes([bytes[CRC_OFFSET], bytes[CRC_OFFSET + 1]]);
        let computed = crc16_ccitt(&bytes[..CRC_OFFSET]);
        if stored != computed {
            return Err(RecordError::Checksum { stored, computed });
        }

        let mut titles: [String<TITLE_LEN>; TITLE_SLOTS] = Default::default();
        for (slot, (field, title)) in bytes[..BANK_OFFSET]
            .chunks_exact(TITLE_FIELD)
            .zip(titles.iter_mut())
            .enumerate()
        {
            *title = parse_title(field).ok_or(RecordError::Title(slot as u8))?;
        }

        let rom_bank = bytes[BANK_OFFSET];
        if !ROM_BANKS.contains(&rom_bank) {
            return Err(RecordError::RomBank(rom_bank));
        }

        Ok(Self {
            titles,
            rom_bank,
            sound: SoundMode::from_byte(bytes[SOUND_OFFSET])?,
            boot: BootSource::from_byte(bytes[BOOT_OFFSET])?,
        })
    }
}

/// Character allowed in a title
pub fn is_title_char(ch: u8) -> bool {
    (0x20..=0x7e).contains(&ch)
}

fn parse_title(field: &[u8]) -> Option<String<TITLE_LEN>> {
    let len = field.iter().position(|&b| b == 0)?;
    let text = &field[..len];
    if !text.iter().all(|&b| is_title_char(b)) {
        return None;
    }
    let mut title = String::new();
    title.push_str(core::str::from_utf8(text).ok()?).ok()?;
    Some(title)
}
