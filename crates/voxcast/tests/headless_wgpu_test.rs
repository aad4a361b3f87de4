//! GPU rendering integration test.
//!
//! Requires a GPU adapter (real or software fallback). Without one the test
//! prints a notice and returns early.

use voxcast::*;

fn adapter_available(result: &Result<RenderedImage>) -> bool {
    match result {
        Err(VoxcastError::Resource(e)) => {
            eprintln!("Skipping headless wgpu test: no GPU adapter available ({e})");
            false
        }
        _ => true,
    }
}

#[test]
fn headless_wgpu_renders() {
    // --- Constant MIP: every covered pixel has the same color ---
    let volume = Volume::filled(GridShape::new(10, 10, 10), 0.5).unwrap();
    let options = VolumeOptions {
        clim: Some((0.0, 1.0)),
        ..VolumeOptions::default()
    };
    let camera = fit_camera(&volume, 64, 64);
    let result = render_volume_to_image_gpu(&volume, options, &camera, 64, 64);
    if !adapter_available(&result) {
        return;
    }
    let image = result.unwrap();
    assert_eq!(image.pixels.len(), 64 * 64 * 4);

    let center = image.pixel(32, 32).unwrap();
    assert_eq!(center[3], 255, "center pixel should be drawn");
    // grays(0.5) stored in RGBA8, allowing for half-float and filtering error.
    assert!((i32::from(center[0]) - 128).abs() <= 2, "{center:?}");
    assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 0]));
    for px in image.pixels.chunks(4).filter(|px| px[3] != 0) {
        assert!((i32::from(px[1]) - i32::from(center[1])).abs() <= 2);
    }

    // --- Isosurface with nothing above the threshold draws nothing ---
    let options = VolumeOptions {
        method: RenderMethod::Iso,
        threshold: Some(0.9),
        clim: Some((0.0, 1.0)),
        ..VolumeOptions::default()
    };
    let image = render_volume_to_image_gpu(&volume, options, &camera, 64, 64).unwrap();
    assert!(image.pixels.iter().all(|&b| b == 0));
}

#[test]
fn headless_wgpu_rejects_oversized_volume() {
    let backend = match pollster::block_on(WgpuBackend::new_headless(16, 16)) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Skipping headless wgpu test: no GPU adapter available ({e})");
            return;
        }
    };

    // The device is created with downlevel limits: 256 texels per 3D axis.
    let volume = Volume::filled(GridShape::new(4, 4, 300), 1.0).unwrap();
    let Err(err) = VolumeVisual::new(backend, &volume, VolumeOptions::default()) else {
        panic!("a 300 texel wide volume should not fit the device");
    };
    assert!(matches!(err, VoxcastError::Resource(_)), "{err}");
    assert!(!err.is_invalid_input());
}
