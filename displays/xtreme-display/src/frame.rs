//! Character frame
//!
//! A fixed grid of characters with the geometry a producer declared, a
//! per-row double-height mask and the backlight state. Storage is always the
//! largest supported geometry, so geometry changes never reallocate and any
//! write outside the storage is dropped.

/// Maximum number of character rows
pub const MAX_ROWS: usize = 4;

/// Maximum number of character columns
pub const MAX_COLS: usize = 40;

/// Character grid shared by one display producer
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    text: [[u8; MAX_COLS]; MAX_ROWS],
    cols: u8,
    rows: u8,
    heights: u8,
    backlight: bool,
}

impl Default for DisplayFrame {
    fn default() -> Self {
        Self::new(16, 2)
    }
}

impl core::fmt::Debug for DisplayFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_list();
        for row in &self.text {
            list.entry(&core::str::from_utf8(row).unwrap_or("<binary>"));
        }
        list.finish()?;
        write!(
            f,
            " {}x{} heights={:#x} backlight={}",
            self.cols, self.rows, self.heights, self.backlight
        )
    }
}

impl DisplayFrame {
    /// Create a blank frame with the given geometry and the backlight off
    pub const fn new(cols: u8, rows: u8) -> Self {
        Self {
            text: [[b' '; MAX_COLS]; MAX_ROWS],
            cols: clamp(cols, MAX_COLS as u8),
            rows: clamp(rows, MAX_ROWS as u8),
            heights: 0,
            backlight: false,
        }
    }

    /// Declared number of columns
    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Declare the number of columns (clamped to [`MAX_COLS`])
    pub fn set_cols(&mut self, cols: u8) {
        self.cols = clamp(cols, MAX_COLS as u8);
    }

    /// Declared number of rows
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Declare the number of rows (clamped to [`MAX_ROWS`])
    pub fn set_rows(&mut self, rows: u8) {
        self.rows = clamp(rows, MAX_ROWS as u8);
    }

    /// Double-height mask, bit n set when row n is double height
    pub fn heights(&self) -> u8 {
        self.heights
    }

    pub fn set_heights(&mut self, mask: u8) {
        self.heights = mask & 0x0f;
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    pub fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    /// Store one character
    ///
    /// Returns `false` when the position lies outside the storage; the frame
    /// is left untouched in that case.
    pub fn put(&mut self, row: usize, col: usize, ch: u8) -> bool {
        match self.text.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = ch;
                true
            }
            None => false,
        }
    }

    /// Character at a position, `None` outside the storage
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.text.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Full storage row (all [`MAX_COLS`] characters)
    pub fn row(&self, row: usize) -> Option<&[u8; MAX_COLS]> {
        self.text.get(row)
    }

    /// Replace a row with `text`, padding the rest with spaces
    ///
    /// Text longer than the storage row is truncated.
    pub fn set_line(&mut self, row: usize, text: &[u8]) {
        if let Some(line) = self.text.get_mut(row) {
            let len = text.len().min(MAX_COLS);
            line[..len].copy_from_slice(&text[..len]);
            line[len..].fill(b' ');
        }
    }

    /// Fill the whole storage with spaces
    pub fn clear(&mut self) {
        for line in &mut self.text {
            line.fill(b' ');
        }
    }

    /// Check that every stored character is a space
    pub fn is_blank(&self) -> bool {
        self.text.iter().flatten().all(|&c| c == b' ')
    }
}

const fn clamp(value: u8, max: u8) -> u8 {
    if value > max {
        max
    } else {
        value
    }
}
