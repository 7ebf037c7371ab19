use crate::device::{BufferId, ProgramId};
use crate::paint::Color;

use super::AttributeLayout;

/// Renderer-agnostic command for one frame.
///
/// Commands are replayed by a `LineDevice` in recording order. Presentation is
/// not part of the stream; it happens when the device submits the frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LineCmd {
    /// Clears the color target.
    Clear(Color),
    /// Makes a program current for the following draws.
    UseProgram(ProgramId),
    /// Binds a vertex buffer as the attribute source.
    BindBuffer(BufferId),
    /// Enables and configures a generic vertex attribute.
    EnableAttribute(AttributeLayout),
    /// Draws `count` vertices starting at `first` as a line list.
    DrawLines { first: u32, count: u32 },
    /// Disables a generic vertex attribute.
    DisableAttribute { location: u32 },
}
