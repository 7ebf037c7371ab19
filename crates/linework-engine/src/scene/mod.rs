//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - hold the fixed line geometry uploaded at startup
//! - describe how the vertex attribute reads that geometry
//! - record a renderer-agnostic command stream for one frame

mod cmd;
mod layout;
pub mod lines;
mod list;

pub use cmd::LineCmd;
pub use layout::{AttributeFormat, AttributeLayout};
pub use lines::{LineSegment, LineVertex, LINE_SEGMENTS, SEGMENT_COUNT};
pub use list::FrameCommands;
