//! Serial receive abstraction
//!
//! The keyboard link is polled once per main-loop pass, so the receive side
//! never blocks: it hands out whatever byte is already buffered.

/// Non-blocking serial receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Take one received byte if available
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}
