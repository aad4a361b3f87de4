//! Rendering error types.

use thiserror::Error;
use voxcast_core::VoxcastError;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Buffer creation failed.
    #[error("buffer creation failed: {0}")]
    BufferCreationFailed(String),

    /// Texture creation or upload failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// A draw was issued before the program's snippets were built.
    #[error("program has pending changes and must be built before drawing")]
    ProgramNotBuilt,

    /// The draw call referenced the wrong kind of buffer or out-of-range indices.
    #[error("invalid draw call: {0}")]
    InvalidDrawCall(String),

    /// Reading the render target back to the host failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for VoxcastError {
    fn from(err: RenderError) -> Self {
        VoxcastError::Resource(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_is_resource_error() {
        let err: VoxcastError = RenderError::ProgramNotBuilt.into();
        assert!(matches!(err, VoxcastError::Resource(_)));
        assert!(!err.is_invalid_input());
    }
}
