//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and drives the line harness from
//! redraw events.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
