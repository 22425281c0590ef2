//! Character display model for the Xtreme controller
//!
//! This crate provides:
//! - [`DisplayFrame`], the character grid every display producer writes into
//! - [`DisplaySink`] trait for the physical output (a 16x2 character LCD)
//! - [`Compositor`], which picks the frame with precedence and pushes only
//!   the rows that changed
//!
//! # Architecture
//!
//! Three producers share one small LCD: the bus decoders (LCD emulation or
//! OSD protocol), timed notifications and the configuration menu. Each owns
//! its own frame; the compositor decides at refresh time which one is shown.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod compositor;
pub mod frame;

// Re-export key types
pub use backend::{DisplayError, DisplaySink};
pub use compositor::{Compositor, Notification, LINE_WIDTH, SINK_ROWS};
pub use frame::{DisplayFrame, MAX_COLS, MAX_ROWS};
