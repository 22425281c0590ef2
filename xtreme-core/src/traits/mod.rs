//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the keyboard driver.

pub mod keys;

pub use keys::{KeyMap, KeySample, KeySource};
