//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in xtreme-core and xtreme-display:
//!
//! - Character LCD (HD44780 behind a PCF8574 I2C expander)
//! - Atari ST keyboard scan-code decoder and keymap

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod keyboard;
pub mod lcd;
