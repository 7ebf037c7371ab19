use anyhow::Result;

use crate::scene::{AttributeLayout, FrameCommands};

use super::{BufferId, ProgramId, ProgramSource, VertexArrayId};

/// Result of submitting one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    /// The frame was rendered and queued for presentation.
    Presented,
    /// The surface was unavailable (lost, outdated, timed out); nothing was shown.
    Skipped,
    /// Unrecoverable device condition (commonly OOM); the loop should end.
    Fatal,
}

/// GPU collaborator driven by the line harness.
///
/// Resources are created once, referenced by opaque handles and released
/// explicitly. Per-frame work arrives as a recorded command stream.
pub trait LineDevice {
    /// Creates the vertex input binding object for `layout`.
    fn create_vertex_array(&mut self, layout: AttributeLayout) -> Result<VertexArrayId>;

    /// Loads both stages of `source` and links them against `vertex_array`.
    fn create_program(
        &mut self,
        vertex_array: VertexArrayId,
        source: &ProgramSource,
    ) -> Result<ProgramId>;

    /// Allocates an immutable vertex buffer initialized with `contents`.
    fn create_buffer(&mut self, label: &str, contents: &[u8]) -> Result<BufferId>;

    /// Executes `frame` and presents the result.
    fn submit(&mut self, frame: &FrameCommands) -> PresentOutcome;

    fn delete_buffer(&mut self, id: BufferId);

    fn delete_vertex_array(&mut self, id: VertexArrayId);

    fn delete_program(&mut self, id: ProgramId);

    /// Called last during teardown, after every resource has been released.
    fn shutdown(&mut self);
}
