use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Vertex + fragment WGSL files linked into one program.
///
/// The vertex stage must export `vs_main`, the fragment stage `fs_main`.
/// Files are read when the program is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ProgramSource {
    pub const VERTEX_ENTRY: &'static str = "vs_main";
    pub const FRAGMENT_ENTRY: &'static str = "fs_main";

    /// Directory holding the bundled line shaders.
    pub const SHADER_DIR: &'static str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders");

    pub fn from_paths(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> Self {
        Self {
            vertex: vertex.as_ref().to_path_buf(),
            fragment: fragment.as_ref().to_path_buf(),
        }
    }

    /// Reads one stage's WGSL code.
    pub fn load_stage(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader source {}", path.display()))
    }
}

impl Default for ProgramSource {
    /// Bundled pass-through vertex stage and solid red fragment stage.
    fn default() -> Self {
        let dir = Path::new(Self::SHADER_DIR);
        Self::from_paths(dir.join("line.vert.wgsl"), dir.join("line.frag.wgsl"))
    }
}
