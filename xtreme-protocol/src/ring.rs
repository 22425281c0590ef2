//! Interrupt-to-main-loop byte rings
//!
//! Two single-producer/single-consumer rings carry everything the I2C slave
//! receives:
//!
//! - [`ByteEventRing`] holds the raw bytes written by the host.
//! - [`TransactionBoundaryRing`] holds, for every addressed write exchange,
//!   the data-ring offset of its first byte.
//!
//! Both use free-running `u16` indices, so capacities must be powers of two
//! dividing 65536. Producer indices are published with `Release` stores and
//! observed with `Acquire` loads. The consumer always snapshots the data
//! producer index *before* the boundary producer index, so every boundary it
//! sees refers to data that already exists or to the very next byte.
//!
//! The producer never looks at the consumer. Callers must drain the rings
//! at least once per half data-ring worth of traffic.

use portable_atomic::{AtomicU16, AtomicU8, Ordering};

/// Data ring capacity used by the firmware
pub const DATA_RING_SIZE: usize = 1024;

/// Boundary ring capacity used by the firmware
pub const BOUNDARY_RING_SIZE: usize = 8;

/// Raw byte ring written from interrupt context
pub struct ByteEventRing<const N: usize> {
    buf: [AtomicU8; N],
    head: AtomicU16,
}

impl<const N: usize> ByteEventRing<N> {
    const VALID: () = assert!(N.is_power_of_two() && N <= 32768);

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;
        Self {
            buf: [const { AtomicU8::new(0) }; N],
            head: AtomicU16::new(0),
        }
    }

    fn slot(&self, index: u16) -> &AtomicU8 {
        &self.buf[index as usize & (N - 1)]
    }
}

impl<const N: usize> Default for ByteEventRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ring of data-ring offsets, one per addressed write exchange
pub struct TransactionBoundaryRing<const N: usize> {
    buf: [AtomicU16; N],
    head: AtomicU16,
}

impl<const N: usize> TransactionBoundaryRing<N> {
    const VALID: () = assert!(N.is_power_of_two() && N <= 32768);

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;
        Self {
            buf: [const { AtomicU16::new(0) }; N],
            head: AtomicU16::new(0),
        }
    }

    fn slot(&self, index: u16) -> &AtomicU16 {
        &self.buf[index as usize & (N - 1)]
    }
}

impl<const N: usize> Default for TransactionBoundaryRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The pair of rings shared between the I2C interrupt and the main loop
pub struct BusRings<const D: usize = DATA_RING_SIZE, const T: usize = BOUNDARY_RING_SIZE> {
    data: ByteEventRing<D>,
    boundaries: TransactionBoundaryRing<T>,
}

impl<const D: usize, const T: usize> Default for BusRings<D, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize, const T: usize> BusRings<D, T> {
    pub const fn new() -> Self {
        Self {
            data: ByteEventRing::new(),
            boundaries: TransactionBoundaryRing::new(),
        }
    }

    /// Split into the interrupt-side producer and the main-loop consumer
    ///
    /// Taking `&mut self` guarantees there is exactly one of each for as long
    /// as the halves live.
    pub fn split(&mut self) -> (RingProducer<'_, D, T>, RingConsumer<'_, D, T>) {
        let rings: &Self = self;
        let data_tail = rings.data.head.load(Ordering::Relaxed);
        let boundary_tail = rings.boundaries.head.load(Ordering::Relaxed);
        (
            RingProducer { rings },
            RingConsumer {
                rings,
                data_tail,
                boundary_tail,
            },
        )
    }
}

/// Interrupt-side writer
pub struct RingProducer<'a, const D: usize, const T: usize> {
    rings: &'a BusRings<D, T>,
}

impl<const D: usize, const T: usize> RingProducer<'_, D, T> {
    /// Append one received byte
    pub fn push(&mut self, byte: u8) {
        let data = &self.rings.data;
        let head = data.head.load(Ordering::Relaxed);
        data.slot(head).store(byte, Ordering::Relaxed);
        data.head.store(head.wrapping_add(1), Ordering::Release);
    }

    /// Mark the start of a new write exchange at the current data offset
    pub fn push_boundary(&mut self) {
        let offset = self.rings.data.head.load(Ordering::Relaxed);
        let boundaries = &self.rings.boundaries;
        let head = boundaries.head.load(Ordering::Relaxed);
        boundaries.slot(head).store(offset, Ordering::Relaxed);
        boundaries.head.store(head.wrapping_add(1), Ordering::Release);
    }
}

/// One drained byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxByte {
    pub value: u8,
    /// This byte is the first of a new addressed exchange
    pub exchange_start: bool,
}

/// Main-loop reader
///
/// The consumer positions are plain fields: nothing on the interrupt side
/// ever reads them.
pub struct RingConsumer<'a, const D: usize, const T: usize> {
    rings: &'a BusRings<D, T>,
    data_tail: u16,
    boundary_tail: u16,
}

impl<'a, const D: usize, const T: usize> RingConsumer<'a, D, T> {
    /// Drain everything received since the previous drain
    pub fn drain(&mut self) -> Drain<'_, 'a, D, T> {
        let (data_head, boundary_head) = self.snapshot();
        self.start_drain(data_head, boundary_head, false)
    }

    /// Drain, keeping only the most recent `exchanges` exchanges
    ///
    /// When at least `exchanges` boundaries are pending, everything before
    /// the `exchanges`-th newest boundary is discarded unread and
    /// [`Drain::skipped_stale`] reports it.
    pub fn drain_recent(&mut self, exchanges: u16) -> Drain<'_, 'a, D, T> {
        let (data_head, boundary_head) = self.snapshot();
        let mut skipped = false;
        if exchanges > 0 && boundary_head.wrapping_sub(self.boundary_tail) >= exchanges {
            self.boundary_tail = boundary_head.wrapping_sub(exchanges);
            self.data_tail = self
                .rings
                .boundaries
                .slot(self.boundary_tail)
                .load(Ordering::Relaxed);
            skipped = true;
        }
        self.start_drain(data_head, boundary_head, skipped)
    }

    /// Number of received bytes not yet drained
    pub fn pending(&self) -> usize {
        let head = self.rings.data.head.load(Ordering::Acquire);
        head.wrapping_sub(self.data_tail) as usize
    }

    fn snapshot(&mut self) -> (u16, u16) {
        // Data first, then boundaries, so a boundary is never seen before
        // the bytes that precede it.
        let data_head = self.rings.data.head.load(Ordering::Acquire);
        let mut boundary_head = self.rings.boundaries.head.load(Ordering::Acquire);

        // Oldest boundary markers are overwritten when the host opens more
        // exchanges than the ring holds between two drains.
        if boundary_head.wrapping_sub(self.boundary_tail) as usize > T {
            self.boundary_tail = boundary_head.wrapping_sub(T as u16);
        }

        // Exchanges opened after the data snapshot are left for the next pass.
        while boundary_head != self.boundary_tail {
            let newest = self
                .rings
                .boundaries
                .slot(boundary_head.wrapping_sub(1))
                .load(Ordering::Relaxed);
            if !is_ahead(newest, data_head) {
                break;
            }
            boundary_head = boundary_head.wrapping_sub(1);
        }
        (data_head, boundary_head)
    }

    fn start_drain(
        &mut self,
        data_head: u16,
        boundary_head: u16,
        skipped: bool,
    ) -> Drain<'_, 'a, D, T> {
        debug_assert!(
            (data_head.wrapping_sub(self.data_tail) as usize) < D / 2,
            "byte ring backlog beyond half capacity"
        );
        Drain {
            data_pos: self.data_tail,
            boundary_pos: self.boundary_tail,
            data_head,
            boundary_head,
            skipped,
            consumer: self,
        }
    }
}

/// Lazy, finite sequence of drained bytes
///
/// Positions are committed when the drain is dropped, so a partially
/// consumed drain resumes where it stopped next time.
pub struct Drain<'c, 'a, const D: usize, const T: usize> {
    consumer: &'c mut RingConsumer<'a, D, T>,
    data_pos: u16,
    boundary_pos: u16,
    data_head: u16,
    boundary_head: u16,
    skipped: bool,
}

impl<const D: usize, const T: usize> Drain<'_, '_, D, T> {
    /// Older exchanges were discarded before this drain started
    pub fn skipped_stale(&self) -> bool {
        self.skipped
    }

    fn boundary_offset(&self, index: u16) -> u16 {
        self.consumer
            .rings
            .boundaries
            .slot(index)
            .load(Ordering::Relaxed)
    }
}

impl<const D: usize, const T: usize> Iterator for Drain<'_, '_, D, T> {
    type Item = RxByte;

    fn next(&mut self) -> Option<RxByte> {
        if self.data_pos == self.data_head {
            return None;
        }

        // Consume every boundary at or behind this byte. Boundaries ahead
        // of it (an exchange opened after our snapshot) stay pending.
        let mut exchange_start = false;
        while self.boundary_pos != self.boundary_head {
            if is_ahead(self.boundary_offset(self.boundary_pos), self.data_pos) {
                break;
            }
            self.boundary_pos = self.boundary_pos.wrapping_add(1);
            exchange_start = true;
        }

        let value = self
            .consumer
            .rings
            .data
            .slot(self.data_pos)
            .load(Ordering::Relaxed);
        self.data_pos = self.data_pos.wrapping_add(1);
        Some(RxByte {
            value,
            exchange_start,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.data_head.wrapping_sub(self.data_pos) as usize;
        (left, Some(left))
    }
}

impl<const D: usize, const T: usize> Drop for Drain<'_, '_, D, T> {
    fn drop(&mut self) {
        self.consumer.data_tail = self.data_pos;
        self.consumer.boundary_tail = self.boundary_pos;
    }
}

/// `offset` lies after `pos` on the free-running index circle
fn is_ahead(offset: u16, pos: u16) -> bool {
    pos.wrapping_sub(offset) >= 0x8000
}
