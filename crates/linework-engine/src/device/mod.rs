//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the `LineDevice` seam the harness talks to (handles, program sources)
//! - creating the wgpu Instance/Adapter/Device/Queue and the window surface
//! - acquiring frames and mapping surface errors to frame outcomes
//! - the initialization error taxonomy

mod backend;
mod error;
mod gpu;
mod handle;
mod program;
mod surface;

pub use backend::{LineDevice, PresentOutcome};
pub use error::InitError;
pub use gpu::{Gpu, GpuFrame, GpuInit};
pub use handle::{BufferId, ProgramId, VertexArrayId};
pub use program::ProgramSource;
