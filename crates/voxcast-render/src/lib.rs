//! Rendering backends for voxcast.
//!
//! This crate provides two implementations of [`voxcast_core::RenderBackend`]:
//! - [`SoftwareBackend`], a CPU rasterizer running the ray caster per fragment
//! - [`WgpuBackend`], a headless wgpu pipeline with WGSL ray-cast shaders
//!
//! plus image output for rendered frames.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel and texel counts are small enough for f32 and u32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]

pub mod buffer;
pub mod error;
pub mod raster;
pub mod screenshot;
pub mod shader;
pub mod software;
pub mod volume_render;
pub mod wgpu_backend;

pub use error::{RenderError, RenderResult};
pub use raster::{assemble_strip, FrameBuffer, ScreenTriangle};
pub use screenshot::{save_image, save_to_buffer, ScreenshotError};
pub use shader::{volume_shader, ShaderBuilder};
pub use software::{ResourceEvent, ResourceStats, SoftwareBackend, SoftwareBuffer, SoftwareTexture};
pub use volume_render::VolumeUniforms;
pub use wgpu_backend::{WgpuBackend, WgpuBuffer, WgpuTexture};
