//! GPU rendering subsystem.
//!
//! Replays recorded `scene::FrameCommands` through wgpu. The command stream is
//! first resolved into render passes and draw calls (`plan`), then executed
//! against the resources owned by `LineResources`.
//!
//! Convention: attribute positions are already in clip space; the vertex
//! stage passes them through.

mod lines;
mod plan;

pub use lines::{LineResources, WgpuLineDevice};
