use super::LineCmd;

/// Recorded command stream for a frame.
///
/// `clear()` keeps the allocation, so a list reused across frames does not
/// allocate once warmed up.
#[derive(Debug, Default, Clone)]
pub struct FrameCommands {
    cmds: Vec<LineCmd>,
}

impl FrameCommands {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: LineCmd) {
        self.cmds.push(cmd);
    }

    /// Commands in recording order.
    #[inline]
    pub fn commands(&self) -> &[LineCmd] {
        &self.cmds
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Number of line draws in the stream.
    #[cfg(test)]
    pub fn draw_count(&self) -> usize {
        self.cmds
            .iter()
            .filter(|c| matches!(c, LineCmd::DrawLines { .. }))
            .count()
    }

    /// Returns true if every enabled attribute is disabled again before the
    /// next enable of the same location and before the end of the stream.
    pub fn attributes_balanced(&self) -> bool {
        let mut enabled: Vec<u32> = Vec::new();
        for cmd in &self.cmds {
            match cmd {
                LineCmd::EnableAttribute(layout) => {
                    if enabled.contains(&layout.location) {
                        return false;
                    }
                    enabled.push(layout.location);
                }
                LineCmd::DisableAttribute { location } => {
                    let Some(pos) = enabled.iter().position(|l| l == location) else {
                        return false;
                    };
                    enabled.swap_remove(pos);
                }
                _ => {}
            }
        }
        enabled.is_empty()
    }
}
