//! Paint model shared between the harness and the wgpu backend.

mod color;

pub use color::Color;
