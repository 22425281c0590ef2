//! Outbound status block
//!
//! In OSD mode the host reads a small record back from the controller:
//!
//! | offset | field |
//! |---|---|
//! | 0 | protocol version (always 0) |
//! | 1 | firmware major |
//! | 2 | firmware minor |
//! | 3 | button mask (left=1, right=2, help=4) |
//!
//! Reads restart at offset 0 on every addressed exchange; bytes past the
//! end read as 0. The button mask is written by the main loop and read from
//! the interrupt, so it is kept in an atomic.

use portable_atomic::{AtomicU8, Ordering};

/// Length of the status record in bytes
pub const STATUS_LEN: usize = 4;

/// Version of the status record layout
pub const PROTOCOL_VERSION: u8 = 0;

/// Status record shared between main loop and interrupt
pub struct StatusBlock {
    fw_major: u8,
    fw_minor: u8,
    buttons: AtomicU8,
}

impl StatusBlock {
    pub const fn new(fw_major: u8, fw_minor: u8) -> Self {
        Self {
            fw_major,
            fw_minor,
            buttons: AtomicU8::new(0),
        }
    }

    /// Publish the current OSD button mask
    pub fn set_buttons(&self, mask: u8) {
        self.buttons.store(mask & 0x0f, Ordering::Relaxed);
    }

    pub fn buttons(&self) -> u8 {
        self.buttons.load(Ordering::Relaxed)
    }

    /// Byte at `offset`, 0 past the end of the record
    pub fn byte(&self, offset: usize) -> u8 {
        match offset {
            0 => PROTOCOL_VERSION,
            1 => self.fw_major,
            2 => self.fw_minor,
            3 => self.buttons(),
            _ => 0,
        }
    }

    /// Reader for the interrupt side
    pub fn reader(&self) -> StatusReader<'_> {
        StatusReader {
            block: self,
            offset: 0,
        }
    }
}

/// Sequential reader over the status block
pub struct StatusReader<'a> {
    block: &'a StatusBlock,
    offset: usize,
}

impl StatusReader<'_> {
    /// Start over at offset 0
    pub fn restart(&mut self) {
        self.offset = 0;
    }

    /// Next byte for the host
    pub fn next_byte(&mut self) -> u8 {
        let byte = self.block.byte(self.offset);
        if self.offset < STATUS_LEN {
            self.offset += 1;
        }
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let block = StatusBlock::new(1, 7);
        block.set_buttons(0x05);
        let mut reader = block.reader();
        let got: Vec<u8> = (0..6).map(|_| reader.next_byte()).collect();
        assert_eq!(got, vec![0, 1, 7, 5, 0, 0]);
    }

    #[test]
    fn test_restart() {
        let block = StatusBlock::new(2, 3);
        let mut reader = block.reader();
        reader.next_byte();
        reader.next_byte();
        reader.restart();
        assert_eq!(reader.next_byte(), PROTOCOL_VERSION);
        assert_eq!(reader.next_byte(), 2);
    }

    #[test]
    fn test_button_mask_limited_to_four_bits() {
        let block = StatusBlock::new(0, 0);
        block.set_buttons(0xf7);
        assert_eq!(block.buttons(), 0x07);
    }
}
