//! Atari ST keyboard

pub mod ikbd;
pub mod keymap;

pub use ikbd::StKeyboard;
pub use keymap::keyscan_to_ascii;
