//! Renders a synthetic volume with both methods and writes PNG files.
//!
//! Run with: `cargo run --example volume_demo -- [options.json]`

use voxcast::*;

fn blobs(n: usize) -> Result<Volume> {
    let centers = [
        Vec3::new(0.3, 0.4, 0.5),
        Vec3::new(0.7, 0.6, 0.4),
        Vec3::new(0.5, 0.5, 0.8),
    ];
    Volume::from_fn(GridShape::new(n, n, n), |x, y, z| {
        let p = Vec3::new(x as f32, y as f32, z as f32) / n as f32;
        centers
            .iter()
            .map(|c| (-(p - *c).length_squared() * 40.0).exp())
            .sum()
    })
}

fn main() -> Result<()> {
    init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| VoxcastError::Resource(format!("cannot read {path}: {e}")))?;
            VolumeOptions::from_json(&json)?
        }
        None => VolumeOptions {
            cmap: "viridis".into(),
            ..VolumeOptions::default()
        },
    };

    let volume = blobs(48)?;
    let (width, height) = (512, 384);
    let mut camera = fit_camera(&volume, width, height);
    camera.orbit(0.6, 0.35);

    let mip = render_volume_to_image(&volume, options.clone(), &camera, width, height)?;
    mip.save("volume_mip.png")?;

    let iso_options = VolumeOptions {
        method: RenderMethod::Iso,
        threshold: Some(0.5),
        ..options
    };
    let iso = render_volume_to_image(&volume, iso_options, &camera, width, height)?;
    iso.save("volume_iso.png")?;

    log::info!("wrote volume_mip.png and volume_iso.png");
    Ok(())
}
