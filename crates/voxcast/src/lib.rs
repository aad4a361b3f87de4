//! voxcast: volume ray casting with maximum-intensity projection and isosurfaces.
//!
//! A [`VolumeVisual`] owns the volume texture, the proxy cuboid geometry and the
//! ray-cast program of one volume, and draws it through any [`RenderBackend`].
//! Two backends ship with the crate: [`SoftwareBackend`] runs the ray caster
//! on the CPU, [`WgpuBackend`] runs WGSL shaders on a GPU.
//!
//! # Quick Start
//!
//! ```
//! use voxcast::*;
//!
//! fn main() -> Result<()> {
//!     let volume = Volume::from_fn(GridShape::new(16, 16, 16), |x, y, z| {
//!         let p = Vec3::new(x as f32, y as f32, z as f32) - Vec3::splat(7.5);
//!         (6.0 - p.length()).max(0.0)
//!     })?;
//!
//!     let mut visual = VolumeVisual::new(
//!         SoftwareBackend::new(64, 64),
//!         &volume,
//!         VolumeOptions::default(),
//!     )?;
//!     visual.set_method_by_name("iso")?;
//!     visual.set_threshold(3.0)?;
//!
//!     let camera = Camera::framing(volume.grid(), 1.0);
//!     visual.draw(&camera.scene_transforms(Mat4::IDENTITY))?;
//!     assert!(visual.backend().framebuffer().coverage() > 0);
//!     Ok(())
//! }
//! ```
//!
//! # Render methods
//!
//! - [`RenderMethod::Mip`] colors each pixel by the largest sample along its ray
//! - [`RenderMethod::Iso`] shades the first crossing of a threshold

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

mod headless;
mod visual;

pub use headless::{fit_camera, render_volume_to_image, render_volume_to_image_gpu, RenderedImage};
pub use visual::VolumeVisual;

// Re-export core types
pub use voxcast_core::{
    calculate_steps, Camera, ColorMap, ColorMapRegistry, ContrastLimits, CuboidVertex, DrawCall,
    Fragment, GeometryStats, GridShape, Interpolation, Mat4, ProjectionMode, Program,
    RenderBackend, RenderMethod, Result, SceneTransforms, TextureData, TransformContext, Vec2,
    Vec3, Vec4, Volume, VolumeOptions, VolumeShape, VoxcastError, DEFAULT_COLORMAP,
    MIN_RELATIVE_STEP_SIZE,
};

// Re-export render types
pub use voxcast_render::{
    save_image, RenderError, ResourceEvent, ResourceStats, SoftwareBackend, WgpuBackend,
};

/// Initializes logging for applications that do not install a logger.
pub fn init_logging() {
    let _ = env_logger::try_init();
    log::info!("voxcast initialized");
}
