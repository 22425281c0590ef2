//! Display compositor
//!
//! Decides which producer owns the physical display on every refresh and
//! forwards only what changed. Precedence, highest first:
//!
//! 1. the configuration session frame, while a session is active
//! 2. a pending notification, until it expires
//! 3. the frame decoded from the host bus
//!
//! The physical display is a 16x2 character LCD; the bus frame is viewed
//! through a two-row window starting at a configurable row.

use crate::backend::{DisplayError, DisplaySink};
use crate::frame::{DisplayFrame, MAX_ROWS};

/// Characters per physical display row
pub const LINE_WIDTH: usize = 16;

/// Rows on the physical display
pub const SINK_ROWS: usize = 2;

type Lines = [[u8; LINE_WIDTH]; SINK_ROWS];

const BLANK_LINES: Lines = [[b' '; LINE_WIDTH]; SINK_ROWS];

/// Short two-line message shown over the bus frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    lines: Lines,
    expires_at_ms: u64,
}

impl Notification {
    /// Build a notification from two lines of text (truncated to the display width)
    pub fn new(line1: &str, line2: &str, expires_at_ms: u64) -> Self {
        let mut lines = BLANK_LINES;
        for (dst, src) in lines.iter_mut().zip([line1, line2]) {
            let len = src.len().min(LINE_WIDTH);
            dst[..len].copy_from_slice(&src.as_bytes()[..len]);
        }
        Self {
            lines,
            expires_at_ms,
        }
    }

    /// Text of one line
    pub fn line(&self, row: usize) -> Option<&[u8; LINE_WIDTH]> {
        self.lines.get(row)
    }

    fn expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Owner of the physical display
pub struct Compositor<S> {
    sink: S,
    shown: [Option<[u8; LINE_WIDTH]>; SINK_ROWS],
    backlight: Option<bool>,
    notification: Option<Notification>,
    bus_first_row: usize,
    notify_ms: u64,
}

impl<S: DisplaySink> Compositor<S> {
    /// Create a compositor
    ///
    /// - `bus_first_row`: bus frame row shown on the first display line
    /// - `notify_ms`: how long notifications stay on screen
    pub fn new(sink: S, bus_first_row: usize, notify_ms: u64) -> Self {
        Self {
            sink,
            shown: [None; SINK_ROWS],
            backlight: None,
            notification: None,
            bus_first_row,
            notify_ms,
        }
    }

    /// Post a notification, replacing any pending one
    pub fn notify(&mut self, line1: &str, line2: &str, now_ms: u64) {
        self.notification = Some(Notification::new(
            line1,
            line2,
            now_ms.saturating_add(self.notify_ms),
        ));
    }

    /// The notification currently on screen, if any
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Bring the display up to date
    ///
    /// `session` is the configuration menu frame while a session is active.
    pub fn refresh(
        &mut self,
        now_ms: u64,
        session: Option<&DisplayFrame>,
        bus: &DisplayFrame,
    ) -> Result<(), DisplayError> {
        if self.notification.as_ref().is_some_and(|n| n.expired(now_ms)) {
            self.notification = None;
        }

        let (lines, backlight) = match (session, &self.notification) {
            (Some(frame), _) => (window(frame, 0), frame.backlight()),
            (None, Some(notification)) => (notification.lines, true),
            (None, None) => (window(bus, self.bus_first_row), bus.backlight()),
        };

        for (row, (line, shown)) in lines.iter().zip(self.shown.iter_mut()).enumerate() {
            if shown.as_ref() != Some(line) {
                self.sink.write_row(row as u8, line)?;
                *shown = Some(*line);
            }
        }

        if self.backlight != Some(backlight) {
            self.sink.set_backlight(backlight)?;
            self.backlight = Some(backlight);
        }

        Ok(())
    }
}

/// Two display lines taken from `frame` starting at `first_row`
fn window(frame: &DisplayFrame, first_row: usize) -> Lines {
    let mut lines = BLANK_LINES;
    for (offset, line) in lines.iter_mut().enumerate() {
        let row = first_row + offset;
        if row >= MAX_ROWS {
            break;
        }
        if let Some(text) = frame.row(row) {
            line.copy_from_slice(&text[..LINE_WIDTH]);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        rows: [[u8; LINE_WIDTH]; SINK_ROWS],
        row_writes: usize,
        backlight: Option<bool>,
        backlight_writes: usize,
    }

    impl DisplaySink for RecordingSink {
        fn write_row(&mut self, row: u8, text: &[u8]) -> Result<(), DisplayError> {
            let dst = self
                .rows
                .get_mut(row as usize)
                .ok_or(DisplayError::InvalidRow)?;
            dst.copy_from_slice(text);
            self.row_writes += 1;
            Ok(())
        }

        fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
            self.backlight = Some(on);
            self.backlight_writes += 1;
            Ok(())
        }
    }

    fn line(text: &str) -> [u8; LINE_WIDTH] {
        let mut out = [b' '; LINE_WIDTH];
        out[..text.len()].copy_from_slice(text.as_bytes());
        out
    }

    fn bus_frame() -> DisplayFrame {
        let mut frame = DisplayFrame::new(16, 3);
        frame.set_line(0, b"header");
        frame.set_line(1, b"DSKA0001.ST");
        frame.set_line(2, b"track 00");
        frame.set_backlight(true);
        frame
    }

    #[test]
    fn test_bus_window_starts_at_configured_row() {
        let mut comp = Compositor::new(RecordingSink::default(), 1, 3000);
        comp.refresh(0, None, &bus_frame()).unwrap();
        assert_eq!(comp.sink().rows[0], line("DSKA0001.ST"));
        assert_eq!(comp.sink().rows[1], line("track 00"));
        assert_eq!(comp.sink().backlight, Some(true));
    }

    #[test]
    fn test_only_changed_rows_written() {
        let mut comp = Compositor::new(RecordingSink::default(), 0, 3000);
        let mut bus = bus_frame();
        comp.refresh(0, None, &bus).unwrap();
        assert_eq!(comp.sink().row_writes, 2);
        assert_eq!(comp.sink().backlight_writes, 1);

        comp.refresh(10, None, &bus).unwrap();
        assert_eq!(comp.sink().row_writes, 2);

        bus.set_line(1, b"DSKA0002.ST");
        comp.refresh(20, None, &bus).unwrap();
        assert_eq!(comp.sink().row_writes, 3);
        assert_eq!(comp.sink().backlight_writes, 1);
    }

    #[test]
    fn test_session_preempts_notification_and_bus() {
        let mut comp = Compositor::new(RecordingSink::default(), 1, 3000);
        let mut session = DisplayFrame::new(16, 2);
        session.set_line(0, b"Atari STe Xtreme");
        session.set_backlight(true);

        comp.notify("> Mono sound", "", 0);
        comp.refresh(0, Some(&session), &bus_frame()).unwrap();
        assert_eq!(comp.sink().rows[0], line("Atari STe Xtreme"));
    }

    #[test]
    fn test_notification_expires_back_to_bus() {
        let mut comp = Compositor::new(RecordingSink::default(), 1, 3000);
        let mut bus = bus_frame();
        bus.set_backlight(false);

        comp.notify("-- RESET --", "", 100);
        comp.refresh(200, None, &bus).unwrap();
        assert_eq!(comp.sink().rows[0], line("-- RESET --"));
        assert_eq!(comp.sink().backlight, Some(true));

        comp.refresh(3099, None, &bus).unwrap();
        assert!(comp.notification().is_some());

        comp.refresh(3100, None, &bus).unwrap();
        assert!(comp.notification().is_none());
        assert_eq!(comp.sink().rows[0], line("DSKA0001.ST"));
        assert_eq!(comp.sink().backlight, Some(false));
    }

    #[test]
    fn test_window_past_storage_is_blank() {
        let mut comp = Compositor::new(RecordingSink::default(), 3, 3000);
        comp.refresh(0, None, &bus_frame()).unwrap();
        assert_eq!(comp.sink().rows[1], [b' '; LINE_WIDTH]);
    }

    #[test]
    fn test_long_notification_truncated() {
        let n = Notification::new("Current ROM 1: TOS 2.06 UK", "x", 0);
        assert_eq!(n.line(0).unwrap(), b"Current ROM 1: T");
    }
}
