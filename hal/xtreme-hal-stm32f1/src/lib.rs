//! STM32F1-specific HAL for the Xtreme firmware
//!
//! This crate provides STM32F1 implementations of the `xtreme-hal` traits
//! for the STM32F103 ("Blue Pill" class) controller board:
//!
//! - [`flash::ConfigPage`] - last 1 KiB flash page holding the settings record
//! - [`i2c::I2cSlave`] - register-level I2C1 slave feeding the bus link
//! - [`uart::KeyboardRx`] - buffered USART receiver for the keyboard link
//! - [`gpio`] - pin wrappers and the strap probe
//!
//! # Features
//!
//! - `stm32f103c8` - Enable support for STM32F103C8T6
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod uart;

// Re-export shared types from xtreme-hal
pub use xtreme_hal::flash::{FlashError, PageFlash};
pub use xtreme_hal::i2c::{BusFault, SlaveEvent};
