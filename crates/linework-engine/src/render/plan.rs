use std::ops::Range;

use crate::device::{BufferId, ProgramId};
use crate::paint::Color;
use crate::scene::{AttributeLayout, LineCmd};

/// One resolved line draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub buffer: BufferId,
    pub layout: AttributeLayout,
    pub vertices: Range<u32>,
}

/// One render pass: an optional clear followed by draws.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassPlan {
    /// `None` loads the existing target contents.
    pub clear: Option<Color>,
    pub draws: Vec<DrawCall>,
}

/// Resolves a command stream into render passes.
///
/// Each `Clear` starts a new pass. Bind state (program, buffer, enabled
/// attribute) carries across passes, as it would on an immediate-mode device.
/// Draws missing any of the three are dropped with a warning.
pub fn plan_frame(cmds: &[LineCmd]) -> Vec<PassPlan> {
    let mut passes: Vec<PassPlan> = Vec::new();
    let mut program: Option<ProgramId> = None;
    let mut buffer: Option<BufferId> = None;
    let mut attribute: Option<AttributeLayout> = None;

    for cmd in cmds {
        match *cmd {
            LineCmd::Clear(color) => passes.push(PassPlan {
                clear: Some(color),
                draws: Vec::new(),
            }),
            LineCmd::UseProgram(id) => program = Some(id),
            LineCmd::BindBuffer(id) => buffer = Some(id),
            LineCmd::EnableAttribute(layout) => attribute = Some(layout),
            LineCmd::DisableAttribute { location } => {
                if attribute.is_some_and(|a| a.location == location) {
                    attribute = None;
                }
            }
            LineCmd::DrawLines { first, count } => {
                let (Some(program), Some(buffer), Some(layout)) = (program, buffer, attribute)
                else {
                    log::warn!(
                        "draw skipped: program={program:?} buffer={buffer:?} attribute={attribute:?}"
                    );
                    continue;
                };
                if passes.is_empty() {
                    passes.push(PassPlan::default());
                }
                if let Some(pass) = passes.last_mut() {
                    pass.draws.push(DrawCall {
                        program,
                        buffer,
                        layout,
                        vertices: first..first.saturating_add(count),
                    });
                }
            }
        }
    }

    passes
}
