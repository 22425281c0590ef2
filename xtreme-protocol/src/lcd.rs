//! HD44780 emulation over a PCF8574 backpack
//!
//! Hosts that expect a plain I2C character LCD write raw expander pin
//! states. The expander drives the LCD in 4-bit mode:
//!
//! ```text
//!  bit   7    6    5    4    3    2    1    0
//!       D7   D6   D5   D4   BL   EN   RW   RS
//! ```
//!
//! A nibble is clocked into the LCD when EN falls after being high with RW
//! low. Two nibbles, high first, make one byte; RS selects the command or
//! data register. The backlight follows BL on every byte written.
//!
//! DDRAM addressing follows the 2-line controller layout: line 0 at
//! 0x00-0x27 and line 1 at 0x40-0x67. A 4-row frame folds columns 20-39 of
//! each line into rows 2 and 3, as 20x4 modules do.

use xtreme_display::DisplayFrame;

use crate::ring::RxByte;

/// Backlight pin
pub const PIN_BL: u8 = 1 << 3;
/// Enable (clock) pin
pub const PIN_EN: u8 = 1 << 2;
/// Read/write pin, high for reads
pub const PIN_RW: u8 = 1 << 1;
/// Register select, high for data
pub const PIN_RS: u8 = 1 << 0;

// Commands are identified by their highest set bit.
const CMD_SET_DDRAM: u8 = 0x80;
const CMD_SET_CGRAM: u8 = 0x40;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SHIFT: u8 = 0x10;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_RETURN_HOME: u8 = 0x02;
const CMD_CLEAR: u8 = 0x01;

/// Entry mode bit selecting address increment
const ENTRY_INCREMENT: u8 = 0x02;

/// Width the frame snaps to when data lands beyond its declared columns
const FALLBACK_COLS: u8 = 16;

/// Byte assembly starts from this sentinel; bit 8 set means two nibbles are in.
const ASSEMBLY_EMPTY: u16 = 1;

/// Decoder state for the emulated controller
#[derive(Debug, Clone)]
pub struct LcdEmulatorDecoder {
    address: u8,
    increment: bool,
    rs: bool,
    assembly: u16,
    strobe: Option<u8>,
}

impl Default for LcdEmulatorDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdEmulatorDecoder {
    pub const fn new() -> Self {
        Self {
            address: 0,
            increment: true,
            rs: false,
            assembly: ASSEMBLY_EMPTY,
            strobe: None,
        }
    }

    /// Current DDRAM address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Entry mode direction last set by the host, true for increment
    pub fn increments(&self) -> bool {
        self.increment
    }

    /// Decode every drained byte into `frame`
    pub fn process<I>(&mut self, frame: &mut DisplayFrame, bytes: I) -> usize
    where
        I: IntoIterator<Item = RxByte>,
    {
        let mut count = 0;
        for rx in bytes {
            self.feed(frame, rx.value);
            count += 1;
        }
        count
    }

    /// Decode one expander pin state
    pub fn feed(&mut self, frame: &mut DisplayFrame, pins: u8) {
        frame.set_backlight(pins & PIN_BL != 0);

        if pins & PIN_EN != 0 {
            // Reads never clock data in
            self.strobe = (pins & PIN_RW == 0).then_some(pins);
        } else if let Some(latched) = self.strobe.take() {
            self.clock_nibble(frame, latched);
        }
    }

    fn clock_nibble(&mut self, frame: &mut DisplayFrame, pins: u8) {
        let rs = pins & PIN_RS != 0;
        if rs != self.rs {
            self.rs = rs;
            self.assembly = ASSEMBLY_EMPTY;
        }

        self.assembly = (self.assembly << 4) | u16::from(pins >> 4);
        if self.assembly & 0x100 != 0 {
            let value = self.assembly as u8;
            self.assembly = ASSEMBLY_EMPTY;
            if rs {
                self.write_data(frame, value);
            } else {
                self.command(frame, value);
            }
        }
    }

    fn command(&mut self, frame: &mut DisplayFrame, cmd: u8) {
        if cmd == 0 {
            return;
        }

        match CMD_SET_DDRAM >> cmd.leading_zeros() {
            CMD_SET_DDRAM => self.address = cmd & 0x7f,
            CMD_SET_CGRAM | CMD_FUNCTION_SET | CMD_SHIFT | CMD_DISPLAY_CONTROL => {}
            CMD_ENTRY_MODE => self.increment = cmd & ENTRY_INCREMENT != 0,
            CMD_RETURN_HOME => self.address = 0,
            CMD_CLEAR => {
                frame.clear();
                self.address = 0;
            }
            _ => {}
        }
    }

    fn write_data(&mut self, frame: &mut DisplayFrame, ch: u8) {
        let address = remap_address(self.address);
        let (row, col) = locate(address, frame.rows());

        frame.put(row, col, ch);

        // Entry mode direction is recorded but the cursor always advances
        self.address = address.wrapping_add(1) & 0x7f;

        if col >= usize::from(frame.cols()) {
            frame.set_cols(FALLBACK_COLS);
        }
    }
}

/// Fold addresses outside the two visible lines back onto them
///
/// The gap after line 0 (0x28-0x3F) continues on line 1, and anything past
/// the end of line 1 (0x68 and up) wraps to the start of line 0.
pub fn remap_address(address: u8) -> u8 {
    match address {
        0x68.. => 0x00,
        0x28..=0x3f => 0x40,
        _ => address,
    }
}

/// Frame position of a remapped DDRAM address
pub fn locate(address: u8, rows: u8) -> (usize, usize) {
    let mut col = usize::from(address & 0x3f);
    let mut row = usize::from(address >> 6);
    if rows == 4 && col >= 20 {
        col -= 20;
        row += 2;
    }
    (row, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Expander writes clocking one nibble (upper half of `nibble_bits`)
    fn strobe(nibble_bits: u8, rs: bool) -> [u8; 2] {
        let base = (nibble_bits & 0xf0) | PIN_BL | if rs { PIN_RS } else { 0 };
        [base | PIN_EN, base]
    }

    fn send(dec: &mut LcdEmulatorDecoder, frame: &mut DisplayFrame, value: u8, rs: bool) {
        for pins in strobe(value, rs).into_iter().chain(strobe(value << 4, rs)) {
            dec.feed(frame, pins);
        }
    }

    fn text(dec: &mut LcdEmulatorDecoder, frame: &mut DisplayFrame, s: &str) {
        for b in s.bytes() {
            send(dec, frame, b, true);
        }
    }

    #[test]
    fn test_data_written_at_address() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        send(&mut dec, &mut frame, 0x80 | 0x42, false);
        text(&mut dec, &mut frame, "OK");
        assert_eq!(&frame.row(1).unwrap()[2..4], b"OK");
        assert_eq!(dec.address(), 0x44);
    }

    #[test]
    fn test_byte_needs_falling_enable() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        let [high, low] = strobe(b'A', true);
        dec.feed(&mut frame, high);
        let [high2, _] = strobe(b'A' << 4, true);
        dec.feed(&mut frame, high2);
        // Second nibble never saw EN fall
        assert!(frame.is_blank());
        dec.feed(&mut frame, low);
        assert!(frame.is_blank());
    }

    #[test]
    fn test_read_strobes_ignored() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        // Busy-flag polling: EN with RW high
        for _ in 0..3 {
            dec.feed(&mut frame, 0xf0 | PIN_BL | PIN_EN | PIN_RW);
            dec.feed(&mut frame, 0xf0 | PIN_BL | PIN_RW);
        }
        text(&mut dec, &mut frame, "x");
        assert_eq!(frame.get(0, 0), Some(b'x'));
    }

    #[test]
    fn test_backlight_tracks_every_byte() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        dec.feed(&mut frame, PIN_BL);
        assert!(frame.backlight());
        dec.feed(&mut frame, 0x00);
        assert!(!frame.backlight());
    }

    #[test]
    fn test_register_change_resyncs_nibbles() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        // A stray command nibble, then a full data byte
        for pins in strobe(0x30, false) {
            dec.feed(&mut frame, pins);
        }
        text(&mut dec, &mut frame, "Z");
        assert_eq!(frame.get(0, 0), Some(b'Z'));
    }

    #[test]
    fn test_entry_mode_only_recorded() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        send(&mut dec, &mut frame, 0x04, false);
        assert!(!dec.increments());
        send(&mut dec, &mut frame, 0x80 | 0x05, false);
        text(&mut dec, &mut frame, "ab");
        assert_eq!(frame.get(0, 5), Some(b'a'));
        assert_eq!(frame.get(0, 6), Some(b'b'));
        assert_eq!(dec.address(), 0x07);

        send(&mut dec, &mut frame, 0x06, false);
        assert!(dec.increments());
    }

    #[test]
    fn test_decrement_mode_does_not_stick_at_line_start() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(40, 2);
        send(&mut dec, &mut frame, 0x04, false);

        send(&mut dec, &mut frame, 0x80 | 0x41, false);
        text(&mut dec, &mut frame, "abcd");
        assert_eq!(&frame.row(1).unwrap()[1..5], b"abcd");
        assert_eq!(frame.get(1, 0), Some(b' '));
        assert_eq!(dec.address(), 0x45);

        send(&mut dec, &mut frame, 0x80 | 0x00, false);
        text(&mut dec, &mut frame, "xy");
        assert_eq!(&frame.row(0).unwrap()[..2], b"xy");
        assert_eq!(dec.address(), 0x02);
    }

    #[test]
    fn test_return_home_and_noop_commands() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(16, 2);
        text(&mut dec, &mut frame, "abc");
        for cmd in [0x28, 0x0c, 0x14, 0x40] {
            send(&mut dec, &mut frame, cmd, false);
        }
        assert_eq!(dec.address(), 3);
        send(&mut dec, &mut frame, 0x02, false);
        assert_eq!(dec.address(), 0);
        assert_eq!(&frame.row(0).unwrap()[..3], b"abc");
    }

    #[test]
    fn test_write_beyond_width_widens_to_sixteen() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(0, 2);
        text(&mut dec, &mut frame, "a");
        assert_eq!(frame.cols(), 16);
    }

    /// Independent statement of the addressing rules
    fn expected_position(address: u8, four_rows: bool) -> (usize, usize) {
        let (row, col) = match address {
            0x00..=0x27 => (0, address as usize),
            0x28..=0x40 => (1, 0),
            0x41..=0x67 => (1, (address - 0x40) as usize),
            _ => (0, 0),
        };
        if four_rows && col >= 20 {
            (row + 2, col - 20)
        } else {
            (row, col)
        }
    }

    #[test]
    fn test_address_sweep() {
        for rows in [2u8, 4] {
            for address in 0x00..=0x7fu8 {
                let mut dec = LcdEmulatorDecoder::new();
                let mut frame = DisplayFrame::new(40, rows);
                send(&mut dec, &mut frame, 0x80 | address, false);
                send(&mut dec, &mut frame, b'#', true);

                let (row, col) = expected_position(address, rows == 4);
                assert_eq!(
                    frame.get(row, col),
                    Some(b'#'),
                    "address {:#04x} rows {}",
                    address,
                    rows
                );
                let hits = (0..4)
                    .flat_map(|r| frame.row(r).unwrap().iter())
                    .filter(|&&c| c == b'#')
                    .count();
                assert_eq!(hits, 1);
            }
        }
    }

    #[test]
    fn test_line_end_continues_on_next_line() {
        let mut dec = LcdEmulatorDecoder::new();
        let mut frame = DisplayFrame::new(40, 2);
        send(&mut dec, &mut frame, 0x80 | 0x27, false);
        text(&mut dec, &mut frame, "xy");
        assert_eq!(frame.get(0, 39), Some(b'x'));
        assert_eq!(frame.get(1, 0), Some(b'y'));

        send(&mut dec, &mut frame, 0x80 | 0x67, false);
        text(&mut dec, &mut frame, "zw");
        assert_eq!(frame.get(1, 39), Some(b'z'));
        assert_eq!(frame.get(0, 0), Some(b'w'));
    }

    proptest! {
        #[test]
        fn prop_clear_blanks_frame_and_homes(prefix in proptest::collection::vec(any::<u8>(), 0..200)) {
            let mut dec = LcdEmulatorDecoder::new();
            let mut frame = DisplayFrame::new(16, 2);
            for pins in prefix {
                dec.feed(&mut frame, pins);
            }
            // One data nibble forces a register change before the command
            for pins in strobe(0x50, true) {
                dec.feed(&mut frame, pins);
            }
            send(&mut dec, &mut frame, 0x01, false);
            prop_assert!(frame.is_blank());
            prop_assert_eq!(dec.address(), 0);
        }
    }
}
