//! Flash page abstraction
//!
//! The settings record lives in a single erasable flash page. Implementations
//! expose that page as a small address space starting at offset 0; the
//! caller never sees absolute flash addresses.

/// Errors from flash page operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The flash controller reported a failure
    Flash,
    /// Access outside the page
    OutOfBounds,
    /// Offset or length not aligned to the write granularity
    Unaligned,
    /// Readback after write did not match
    Verify,
}

/// One erasable flash page
///
/// Writes must only target erased bytes; callers erase the page first and
/// then write the full record. Offsets are relative to the start of the page.
pub trait PageFlash {
    /// Size of the page in bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError>;

    /// Erase the whole page
    fn erase(&mut self) -> Result<(), FlashError>;

    /// Program `data` starting at `offset`
    ///
    /// Implementations with a write granularity larger than one byte may
    /// reject unaligned requests with [`FlashError::Unaligned`].
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Check that a range lies inside the page
    fn check_bounds(&self, offset: u32, len: usize) -> Result<(), FlashError> {
        let end = (offset as usize).checked_add(len).ok_or(FlashError::OutOfBounds)?;
        if end > self.capacity() {
            return Err(FlashError::OutOfBounds);
        }
        Ok(())
    }
}

impl<T: PageFlash + ?Sized> PageFlash for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        (**self).read(offset, buf)
    }

    fn erase(&mut self) -> Result<(), FlashError> {
        (**self).erase()
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        (**self).write(offset, data)
    }
}
