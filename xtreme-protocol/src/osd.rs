//! OSD protocol decoder
//!
//! The host opens a write exchange, sends commands and optionally a text
//! payload, and closes it. Every new exchange puts the decoder back into
//! command mode. Only the two most recent exchanges are honoured; anything
//! older still sitting in the ring is stale and dropped.
//!
//! Command set (command mode only):
//!
//! | pattern | meaning |
//! |---|---|
//! | `01cc_cccc` | column count, clamped to 40 |
//! | `0000_0000` | backlight off |
//! | `0000_0001` | backlight on |
//! | `0000_0010` | text payload follows, starting at row 0 column 0 |
//! | `0001_xxrr` | row count (0-3) |
//! | `0010_hhhh` | double-height mask |
//! | `0011_bbbb` | button feedback mask from the host |
//!
//! Text fills rows left to right, wrapping at the column count, and the
//! decoder returns to command mode after the last row.

use xtreme_display::{DisplayFrame, MAX_COLS};

use crate::ring::{RingConsumer, RxByte};

const CMD_COLUMNS_MASK: u8 = 0xc0;
const CMD_COLUMNS: u8 = 0x40;
const CMD_BACKLIGHT: u8 = 0x00;
const CMD_ROWS: u8 = 0x10;
const CMD_HEIGHTS: u8 = 0x20;
const CMD_BUTTONS: u8 = 0x30;

const BACKLIGHT_OFF: u8 = 0;
const BACKLIGHT_ON: u8 = 1;
const TEXT_START: u8 = 2;

/// Exchanges kept when draining the ring
pub const RECENT_EXCHANGES: u16 = 2;

/// Decoder state for the OSD protocol
#[derive(Debug, Clone, Default)]
pub struct OsdProtocolDecoder {
    /// Text cursor row plus one; 0 means command mode
    row: u8,
    col: u8,
    host_buttons: u8,
}

impl OsdProtocolDecoder {
    pub const fn new() -> Self {
        Self {
            row: 0,
            col: 0,
            host_buttons: 0,
        }
    }

    /// Whether the decoder currently expects commands
    pub fn in_command_mode(&self) -> bool {
        self.row == 0
    }

    /// Button mask last announced by the host
    pub fn host_buttons(&self) -> u8 {
        self.host_buttons
    }

    /// Drain the ring into `frame`, dropping stale exchanges
    ///
    /// Returns the number of bytes decoded and whether older exchanges were
    /// discarded.
    pub fn process<const D: usize, const T: usize>(
        &mut self,
        frame: &mut DisplayFrame,
        consumer: &mut RingConsumer<'_, D, T>,
    ) -> (usize, bool) {
        let drain = consumer.drain_recent(RECENT_EXCHANGES);
        let skipped = drain.skipped_stale();
        if skipped {
            self.row = 0;
        }
        let mut count = 0;
        for rx in drain {
            self.feed(frame, rx);
            count += 1;
        }
        (count, skipped)
    }

    /// Decode one received byte
    pub fn feed(&mut self, frame: &mut DisplayFrame, rx: RxByte) {
        if rx.exchange_start {
            self.row = 0;
        }

        if self.row != 0 {
            self.text(frame, rx.value);
        } else {
            self.command(frame, rx.value);
        }
    }

    fn text(&mut self, frame: &mut DisplayFrame, ch: u8) {
        frame.put(usize::from(self.row - 1), usize::from(self.col), ch);

        self.col += 1;
        if self.col >= frame.cols() {
            self.col = 0;
            self.row += 1;
            if self.row > frame.rows() {
                self.row = 0;
            }
        }
    }

    fn command(&mut self, frame: &mut DisplayFrame, cmd: u8) {
        if cmd & CMD_COLUMNS_MASK == CMD_COLUMNS {
            frame.set_cols((cmd & 0x3f).min(MAX_COLS as u8));
            return;
        }

        match cmd & 0xf0 {
            CMD_BACKLIGHT => match cmd & 0x0f {
                BACKLIGHT_OFF => frame.set_backlight(false),
                BACKLIGHT_ON => frame.set_backlight(true),
                TEXT_START => {
                    self.row = 1;
                    self.col = 0;
                }
                _ => {}
            },
            CMD_ROWS => frame.set_rows(cmd & 0x03),
            CMD_HEIGHTS => frame.set_heights(cmd & 0x0f),
            CMD_BUTTONS => self.host_buttons = cmd & 0x0f,
            _ => {}
        }
    }
}
