//! Core abstractions for voxcast.
//!
//! This crate holds everything about volume ray casting that does not touch a GPU:
//! - [`Volume`] data, [`ContrastLimits`] and normalized [`TextureData`]
//! - the proxy [`CuboidGeometry`] and its [`GeometryCache`]
//! - the ray length computation in [`intersection`]
//! - the per-fragment [`raycast`] kernel for both [`RenderMethod`]s
//! - [`Program`] state and the [`RenderBackend`] trait implemented by renderers

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Voxel counts and indices are converted to f32 texture coordinates everywhere
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Sampling math compares floats against exact sentinels on purpose
#![allow(clippy::float_cmp)]

pub mod backend;
pub mod camera;
pub mod color_maps;
pub mod error;
pub mod geometry;
pub mod intersection;
pub mod method;
pub mod options;
pub mod program;
pub mod raycast;
pub mod shading;
pub mod transform;
pub mod volume;

pub use backend::{DrawCall, RenderBackend};
pub use camera::{Camera, ProjectionMode};
pub use color_maps::{ColorMap, ColorMapRegistry, DEFAULT_COLORMAP};
pub use error::{Result, VoxcastError};
pub use geometry::{CuboidGeometry, CuboidVertex, GeometryCache, GeometryStats, STRIP_INDICES};
pub use intersection::{calculate_steps, StepFunction};
pub use method::RenderMethod;
pub use options::{Interpolation, VolumeOptions, MIN_RELATIVE_STEP_SIZE};
pub use program::{FrameUniforms, Program, Snippets, Uniforms};
pub use raycast::{Fragment, RayCaster, TextureSampler, VolumeSampler};
pub use shading::ShadingParameters;
pub use transform::{SceneTransforms, TransformContext};
pub use volume::{ContrastLimits, GridShape, TextureData, Volume, VolumeShape};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
