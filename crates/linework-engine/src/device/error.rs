use thiserror::Error;

/// Fatal initialization failures.
///
/// None of these are retried. The binary reports the message on stderr and
/// exits with status -1.
#[derive(Debug, Error)]
pub enum InitError {
    /// The platform event loop / window system could not be started.
    #[error("Failed to initialize the window system: {0}")]
    WindowSystemInit(String),

    /// The window or its presentation surface could not be created.
    #[error(
        "Failed to open a window: {0}. The GPU or driver may not support the requested configuration."
    )]
    WindowCreation(String),

    /// No usable adapter, or the device/queue request was rejected.
    #[error("Failed to initialize the GPU device: {0}")]
    GpuLoader(String),

    /// Shader sources could not be loaded or the program could not be built.
    #[error("Failed to build the shader program: {0}")]
    Program(String),
}

impl InitError {
    pub fn window_system(err: impl Into<anyhow::Error>) -> Self {
        InitError::WindowSystemInit(format!("{:#}", err.into()))
    }

    pub fn window_creation(err: impl Into<anyhow::Error>) -> Self {
        InitError::WindowCreation(format!("{:#}", err.into()))
    }

    pub fn gpu_loader(err: impl Into<anyhow::Error>) -> Self {
        InitError::GpuLoader(format!("{:#}", err.into()))
    }

    pub fn program(err: impl Into<anyhow::Error>) -> Self {
        InitError::Program(format!("{:#}", err.into()))
    }
}
