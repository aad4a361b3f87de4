//! Error types for voxcast.

use thiserror::Error;

/// The main error type for voxcast operations.
#[derive(Error, Debug)]
pub enum VoxcastError {
    /// The volume array has an unsupported rank or a zero-sized axis.
    #[error("invalid volume shape {shape:?}: {reason}")]
    InvalidShape {
        shape: Vec<usize>,
        reason: &'static str,
    },

    /// Data length does not match the product of the shape.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    DataSizeMismatch { expected: usize, actual: usize },

    /// Contrast limits are not a finite `(low, high)` pair.
    #[error("invalid contrast limits: {0}")]
    InvalidContrastLimits(String),

    /// The render method name is not recognized.
    #[error("unknown render method '{0}' (expected one of: mip, iso)")]
    UnknownMethod(String),

    /// The render method name is reserved but has no implementation.
    #[error("render method '{0}' is reserved and not implemented")]
    MethodNotImplemented(String),

    /// The colormap name is not registered.
    #[error("unknown colormap '{0}'")]
    UnknownColorMap(String),

    /// Relative step size is below the minimum or not finite.
    #[error("relative step size must be >= {min}, got {value}")]
    InvalidStepSize { value: f32, min: f32 },

    /// Isosurface threshold is not finite.
    #[error("threshold must be finite, got {0}")]
    InvalidThreshold(f32),

    /// An operation needs volume data that was never set.
    #[error("no volume data has been set")]
    NoData,

    /// A backend resource (texture, buffer, program) could not be created or used.
    #[error("resource error: {0}")]
    Resource(String),

    /// JSON configuration error.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl VoxcastError {
    /// Whether this error was caused by caller input rejected at a setter boundary.
    ///
    /// Invalid-input errors never leave partially applied state behind.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::Resource(_))
    }
}

/// A specialized Result type for voxcast operations.
pub type Result<T> = std::result::Result<T, VoxcastError>;
