//! Xtreme Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the companion controller needs so
//! that the protocol engine, configuration store and menu can be exercised
//! on the host while the firmware plugs in chip-specific implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (xtreme-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  xtreme-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  xtreme-hal-  │
//!             │    stm32f1    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O and strap probing
//! - [`uart::SerialRx`] - Non-blocking serial receive (keyboard link)
//! - [`i2c::SlaveEvent`] - Events of the I2C slave the bus link reacts to
//! - [`flash::PageFlash`] - One erasable flash page holding the settings record

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, PageFlash};
pub use gpio::{pins_connected, InputPin, OutputPin};
pub use i2c::{BusFault, SlaveEvent};
pub use uart::SerialRx;
