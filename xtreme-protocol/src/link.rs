//! Interrupt-side bus link
//!
//! Everything the I2C slave interrupt touches, bundled into one owned value
//! that the firmware hands to the interrupt once at start-up.

use xtreme_hal::i2c::SlaveEvent;

use crate::ring::RingProducer;
use crate::status::StatusReader;

/// Producer half of the rings plus the status reader
pub struct BusLink<'a, const D: usize, const T: usize> {
    producer: RingProducer<'a, D, T>,
    status: StatusReader<'a>,
}

impl<'a, const D: usize, const T: usize> BusLink<'a, D, T> {
    pub fn new(producer: RingProducer<'a, D, T>, status: StatusReader<'a>) -> Self {
        Self { producer, status }
    }

    /// React to one slave event
    ///
    /// Returns the byte to put on the bus when the host is reading.
    pub fn on_event(&mut self, event: SlaveEvent) -> Option<u8> {
        match event {
            SlaveEvent::AddressMatched { read } => {
                if !read {
                    self.producer.push_boundary();
                }
                self.status.restart();
                None
            }
            SlaveEvent::ByteReceived(byte) => {
                self.producer.push(byte);
                None
            }
            SlaveEvent::ByteRequested => Some(self.status.next_byte()),
            SlaveEvent::Stop => None,
        }
    }
}
