//! Headless rendering API.
//!
//! Renders one volume to an RGBA8 image without a window. Useful for tests,
//! batch processing and thumbnails.

use std::path::Path;

use pollster::FutureExt;
use voxcast_core::{Camera, Mat4, RenderBackend, Result, Volume, VolumeOptions, VoxcastError};
use voxcast_render::{SoftwareBackend, WgpuBackend};

use crate::visual::VolumeVisual;

/// An RGBA8 frame, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RenderedImage {
    /// RGBA of pixel `(x, y)`, if in range.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Saves the image as PNG or JPEG, chosen by the file extension.
    pub fn save(&self, filename: impl AsRef<Path>) -> Result<()> {
        voxcast_render::save_image(filename, &self.pixels, self.width, self.height)
            .map_err(|e| VoxcastError::Resource(format!("failed to save image: {e}")))
    }
}

/// A camera framing the whole volume at the given image aspect ratio.
#[must_use]
pub fn fit_camera(volume: &Volume, width: u32, height: u32) -> Camera {
    Camera::framing(volume.grid(), width as f32 / height.max(1) as f32)
}

/// Renders `volume` on the CPU.
///
/// # Example
/// ```
/// use voxcast::*;
///
/// let volume = Volume::filled(GridShape::new(8, 8, 8), 1.0).unwrap();
/// let camera = fit_camera(&volume, 64, 48);
/// let image = render_volume_to_image(&volume, VolumeOptions::default(), &camera, 64, 48).unwrap();
/// assert_eq!(image.pixels.len(), 64 * 48 * 4);
/// ```
pub fn render_volume_to_image(
    volume: &Volume,
    options: VolumeOptions,
    camera: &Camera,
    width: u32,
    height: u32,
) -> Result<RenderedImage> {
    let _ = env_logger::try_init();

    let backend = SoftwareBackend::new(width as usize, height as usize);
    let visual = draw_once(backend, volume, options, camera)?;
    Ok(RenderedImage {
        width,
        height,
        pixels: visual.backend().read_pixels_rgba8(),
    })
}

/// Renders `volume` on the default GPU adapter.
///
/// Fails with a resource error if no adapter is available.
pub fn render_volume_to_image_gpu(
    volume: &Volume,
    options: VolumeOptions,
    camera: &Camera,
    width: u32,
    height: u32,
) -> Result<RenderedImage> {
    let _ = env_logger::try_init();

    let backend = WgpuBackend::new_headless(width, height).block_on()?;
    let visual = draw_once(backend, volume, options, camera)?;
    let pixels = visual.backend().read_pixels()?;
    Ok(RenderedImage {
        width,
        height,
        pixels,
    })
}

fn draw_once<B: RenderBackend>(
    backend: B,
    volume: &Volume,
    options: VolumeOptions,
    camera: &Camera,
) -> Result<VolumeVisual<B>> {
    let mut visual = VolumeVisual::new(backend, volume, options)?;
    visual.draw(&camera.scene_transforms(Mat4::IDENTITY))?;
    Ok(visual)
}
