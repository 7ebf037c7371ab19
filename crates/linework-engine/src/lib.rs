//! Linework engine crate.
//!
//! Owns the window runtime, the wgpu context and the line harness that records
//! and replays the per-frame draw stream.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
