use crate::device::ProgramSource;
use crate::input::Key;
use crate::paint::Color;
use crate::scene::AttributeLayout;

/// Fixed parameters of the line harness.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Framebuffer clear color, applied at the start of every frame.
    pub clear_color: Color,

    /// Key that ends the loop when observed pressed after a frame.
    pub exit_key: Key,

    /// Shader stages linked into the single program.
    pub program: ProgramSource,

    /// How the position attribute reads each line buffer.
    pub attribute: AttributeLayout,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::DARK_BLUE,
            exit_key: Key::Escape,
            program: ProgramSource::default(),
            attribute: AttributeLayout::POSITION_2D,
        }
    }
}
