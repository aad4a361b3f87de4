//! Full renders through the software backend.

use voxcast::*;

const SIZE: usize = 64;

fn render(
    volume: &Volume,
    options: VolumeOptions,
    camera: &Camera,
) -> VolumeVisual<SoftwareBackend> {
    let mut visual = VolumeVisual::new(SoftwareBackend::new(SIZE, SIZE), volume, options).unwrap();
    visual
        .draw(&camera.scene_transforms(Mat4::IDENTITY))
        .unwrap();
    visual
}

#[test]
fn test_constant_mip_is_uniform_from_any_angle() {
    let volume = Volume::filled(GridShape::new(10, 10, 10), 0.5).unwrap();
    let options = VolumeOptions {
        clim: Some((0.0, 1.0)),
        cmap: "viridis".into(),
        ..VolumeOptions::default()
    };
    let expected = ColorMapRegistry::new()
        .get("viridis")
        .unwrap()
        .sample(0.5);

    for (dx, dy) in [(0.0, 0.0), (0.7, 0.3), (-1.9, -0.8), (3.0, 1.2)] {
        let mut camera = Camera::framing(volume.grid(), 1.0);
        camera.orbit(dx, dy);
        let visual = render(&volume, options.clone(), &camera);

        let framebuffer = visual.backend().framebuffer();
        assert!(framebuffer.coverage() > SIZE * SIZE / 10, "orbit ({dx}, {dy})");
        for color in framebuffer.written_pixels() {
            assert!(
                (color - expected).abs().max_element() < 1e-6,
                "orbit ({dx}, {dy}): {color} != {expected}"
            );
        }
    }
}

#[test]
fn test_constant_mip_orthographic() {
    let volume = Volume::filled(GridShape::new(6, 10, 8), 0.5).unwrap();
    let options = VolumeOptions {
        clim: Some((0.0, 1.0)),
        ..VolumeOptions::default()
    };
    let mut camera = Camera::framing(volume.grid(), 1.0);
    camera.projection_mode = ProjectionMode::Orthographic;
    camera.orbit(0.4, 0.2);

    let visual = render(&volume, options, &camera);
    let expected = ColorMapRegistry::new().get("grays").unwrap().sample(0.5);
    let framebuffer = visual.backend().framebuffer();
    assert!(framebuffer.coverage() > 0);
    for color in framebuffer.written_pixels() {
        assert!((color - expected).abs().max_element() < 1e-6);
    }
}

#[test]
fn test_single_voxel_isosurface_is_local() {
    let n = 9;
    let volume = Volume::from_fn(GridShape::new(n, n, n), |x, y, z| {
        if (x, y, z) == (4, 4, 4) {
            1.0
        } else {
            0.0
        }
    })
    .unwrap();
    let options = VolumeOptions {
        method: RenderMethod::Iso,
        threshold: Some(0.5),
        relative_step_size: 0.1,
        ..VolumeOptions::default()
    };
    let camera = Camera::framing(volume.grid(), 1.0);
    let visual = render(&volume, options, &camera);
    let backend = visual.backend();

    let coverage = backend.framebuffer().coverage();
    assert!(coverage > 0, "the voxel must be hit");
    assert!(coverage < SIZE * SIZE / 20, "{coverage} pixels shaded");

    let center = SIZE as f32 / 2.0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            if let Some(color) = backend.pixel(x, y) {
                let d = Vec2::new(x as f32 + 0.5 - center, y as f32 + 0.5 - center).length();
                assert!(d < SIZE as f32 / 8.0, "pixel ({x}, {y}) shaded far from the voxel");
                assert!(color.truncate().max_element() > 0.0);
                assert_eq!(color.w, 1.0);
            }
        }
    }
    assert_eq!(backend.pixel(0, 0), None);
}

#[test]
fn test_isosurface_outside_range_discards_everything() {
    let volume = Volume::filled(GridShape::new(6, 6, 6), 0.2).unwrap();
    let options = VolumeOptions {
        method: RenderMethod::Iso,
        threshold: Some(0.9),
        clim: Some((0.0, 1.0)),
        ..VolumeOptions::default()
    };
    let camera = Camera::framing(volume.grid(), 1.0);
    let visual = render(&volume, options, &camera);
    assert_eq!(visual.backend().framebuffer().coverage(), 0);
    assert!(visual.backend().read_pixels_rgba8().iter().all(|&b| b == 0));
}

#[test]
fn test_mip_shows_bright_core() {
    let n = 12;
    let c = (n as f32 - 1.0) / 2.0;
    let volume = Volume::from_fn(GridShape::new(n, n, n), |x, y, z| {
        let d = Vec3::new(x as f32, y as f32, z as f32).distance(Vec3::splat(c));
        (1.0 - d / c).max(0.0)
    })
    .unwrap();
    let camera = Camera::framing(volume.grid(), 1.0);
    let visual = render(&volume, VolumeOptions::default(), &camera);
    let backend = visual.backend();

    let mid = SIZE / 2;
    let center = backend.pixel(mid, mid).unwrap();
    let edge = backend.pixel(mid + SIZE / 6, mid).unwrap();
    assert!(center.x > edge.x, "center {center} should be brighter than {edge}");
}

#[test]
fn test_headless_image_api() {
    let volume = Volume::filled(GridShape::new(5, 5, 5), 1.0).unwrap();
    let options = VolumeOptions {
        clim: Some((0.0, 1.0)),
        ..VolumeOptions::default()
    };
    let camera = fit_camera(&volume, 40, 30);
    let image = render_volume_to_image(&volume, options, &camera, 40, 30).unwrap();
    assert_eq!(image.pixels.len(), 40 * 30 * 4);
    // Full-intensity grays in the middle, transparent in the corner.
    assert_eq!(image.pixel(20, 15), Some([255, 255, 255, 255]));
    assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(image.pixel(40, 0), None);

    let path = std::env::temp_dir().join("voxcast-end-to-end.png");
    image.save(&path).unwrap();
    assert!(path.exists());
    let _ = std::fs::remove_file(path);
}
