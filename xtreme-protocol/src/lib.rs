//! Host bus protocol engine
//!
//! The controller sits on the mainboard's I2C bus as a slave and renders what
//! the host sends. Two wire protocols are understood, selected once at boot:
//!
//! - **LCD emulation**: the host believes it talks to an HD44780 character
//!   LCD behind a PCF8574 I/O expander (address 0x27). Every byte is a
//!   snapshot of the expander pins `D7 D6 D5 D4 BL EN RW RS`.
//! - **OSD protocol**: a compact command set (address 0x10) carrying geometry,
//!   backlight, button feedback and text, with a status block the host reads
//!   back.
//!
//! # Data path
//!
//! ```text
//!  I2C interrupt                         main loop
//! ┌────────────┐   ByteEventRing      ┌──────────────┐   DisplayFrame
//! │  BusLink   │ ───────────────────▶ │   Decoder    │ ─────────────▶
//! │ (producer) │   BoundaryRing       │ (LCD or OSD) │
//! └────────────┘ ───────────────────▶ └──────────────┘
//!       ▲
//!       └── StatusBlock (buttons, firmware version)
//! ```
//!
//! The interrupt side never blocks and never reads consumer state; the main
//! loop owns the consumer positions outright.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod decoder;
pub mod lcd;
pub mod link;
pub mod osd;
pub mod ring;
pub mod status;

pub use decoder::{Decoder, Pass, Protocol, LCD_SLAVE_ADDRESS, OSD_SLAVE_ADDRESS};
pub use lcd::LcdEmulatorDecoder;
pub use link::BusLink;
pub use osd::OsdProtocolDecoder;
pub use ring::{
    BusRings, ByteEventRing, Drain, RingConsumer, RingProducer, RxByte, TransactionBoundaryRing,
    BOUNDARY_RING_SIZE, DATA_RING_SIZE,
};
pub use status::{StatusBlock, StatusReader, STATUS_LEN};
