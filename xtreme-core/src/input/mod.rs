//! Keyboard-derived input handling
//!
//! - [`buttons`] - button bitmask shared by the keyboard driver and the menu
//! - [`debounce`] - press/repeat acceptance for held buttons
//! - [`hotkeys`] - Control+Alternate shortcuts outside the menu

pub mod buttons;
pub mod debounce;
pub mod hotkeys;

pub use buttons::Buttons;
pub use debounce::{ButtonDebouncer, DebounceConfig};
pub use hotkeys::{hotkey, HotkeyAction, LiveOutputs, Notice};
