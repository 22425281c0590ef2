//! Board-agnostic core logic for the companion controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Persisted settings record, checksum and flash store
//! - Configuration menu state machine
//! - Button debouncing with auto-repeat
//! - Keyboard hotkey mapping
//! - Key source traits implemented by the keyboard driver

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod input;
pub mod session;
pub mod traits;
