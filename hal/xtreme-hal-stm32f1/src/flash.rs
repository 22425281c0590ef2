//! Settings page in internal flash
//!
//! STM32F103C8 has 64 KiB of flash in 1 KiB pages. The settings record lives
//! in the last page, which the linker script keeps free of code.

use embassy_stm32::flash::{Blocking, Error as StmFlashError, Flash};
use embassy_stm32::peripherals::FLASH;
use embassy_stm32::Peri;

pub use xtreme_hal::flash::{FlashError, PageFlash};

/// Total flash on STM32F103C8
pub const FLASH_SIZE: u32 = 64 * 1024;

/// Flash page size for STM32F1 medium-density parts
pub const FLASH_PAGE_SIZE: u32 = 1024;

/// Offset of the settings page from the start of flash (0x0800_FC00)
pub const CONFIG_PAGE_OFFSET: u32 = FLASH_SIZE - FLASH_PAGE_SIZE;

/// STM32F1 programs flash a half-word at a time
const WRITE_SIZE: u32 = 2;

/// The settings flash page
pub struct ConfigPage<'d> {
    flash: Flash<'d, Blocking>,
}

impl<'d> ConfigPage<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }
}

impl PageFlash for ConfigPage<'_> {
    fn capacity(&self) -> usize {
        FLASH_PAGE_SIZE as usize
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        self.check_bounds(offset, buf.len())?;
        self.flash
            .blocking_read(CONFIG_PAGE_OFFSET + offset, buf)
            .map_err(convert)
    }

    fn erase(&mut self) -> Result<(), FlashError> {
        self.flash
            .blocking_erase(CONFIG_PAGE_OFFSET, CONFIG_PAGE_OFFSET + FLASH_PAGE_SIZE)
            .map_err(convert)
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        self.check_bounds(offset, data.len())?;
        if offset % WRITE_SIZE != 0 || data.len() as u32 % WRITE_SIZE != 0 {
            return Err(FlashError::Unaligned);
        }
        self.flash
            .blocking_write(CONFIG_PAGE_OFFSET + offset, data)
            .map_err(convert)?;

        // Read back in small chunks; a failed program leaves stale bits
        let mut chunk = [0u8; 16];
        for (index, expected) in data.chunks(chunk.len()).enumerate() {
            let at = CONFIG_PAGE_OFFSET + offset + (index * chunk.len()) as u32;
            let got = &mut chunk[..expected.len()];
            self.flash.blocking_read(at, got).map_err(convert)?;
            if got != expected {
                return Err(FlashError::Verify);
            }
        }
        Ok(())
    }
}

fn convert(e: StmFlashError) -> FlashError {
    match e {
        StmFlashError::Size => FlashError::OutOfBounds,
        StmFlashError::Unaligned => FlashError::Unaligned,
        _ => FlashError::Flash,
    }
}
