//! A failed upload must not leave stale data drawable.

use voxcast::*;

/// Software backend that can be told to fail texture writes or buffer creation.
struct FlakyBackend {
    inner: SoftwareBackend,
    fail_writes: bool,
    fail_buffers: bool,
}

impl FlakyBackend {
    fn new() -> Self {
        Self {
            inner: SoftwareBackend::new(16, 16),
            fail_writes: false,
            fail_buffers: false,
        }
    }
}

fn refused(what: &str) -> VoxcastError {
    VoxcastError::Resource(format!("{what} refused"))
}

impl RenderBackend for FlakyBackend {
    type Texture = <SoftwareBackend as RenderBackend>::Texture;
    type Buffer = <SoftwareBackend as RenderBackend>::Buffer;

    fn create_texture(
        &mut self,
        shape: GridShape,
        interpolation: Interpolation,
    ) -> Result<Self::Texture> {
        self.inner.create_texture(shape, interpolation)
    }

    fn resize_texture(&mut self, texture: &mut Self::Texture, shape: GridShape) -> Result<()> {
        self.inner.resize_texture(texture, shape)
    }

    fn write_texture(&mut self, texture: &mut Self::Texture, data: &TextureData) -> Result<()> {
        if self.fail_writes {
            return Err(refused("texture write"));
        }
        self.inner.write_texture(texture, data)
    }

    fn set_texture_interpolation(
        &mut self,
        texture: &mut Self::Texture,
        interpolation: Interpolation,
    ) -> Result<()> {
        self.inner.set_texture_interpolation(texture, interpolation)
    }

    fn create_vertex_buffer(&mut self, vertices: &[CuboidVertex]) -> Result<Self::Buffer> {
        if self.fail_buffers {
            return Err(refused("vertex buffer"));
        }
        self.inner.create_vertex_buffer(vertices)
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<Self::Buffer> {
        self.inner.create_index_buffer(indices)
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        self.inner.delete_buffer(buffer);
    }

    fn build_program(&mut self, program: &Program) -> Result<()> {
        self.inner.build_program(program)
    }

    fn draw(&mut self, call: DrawCall<'_, Self::Texture, Self::Buffer>) -> Result<()> {
        self.inner.draw(call)
    }
}

fn scene(shape: GridShape) -> SceneTransforms {
    Camera::framing(shape, 1.0).scene_transforms(Mat4::IDENTITY)
}

#[test]
fn test_failed_write_after_resize_blocks_drawing() {
    let small = GridShape::new(4, 4, 4);
    let large = GridShape::new(8, 4, 4);
    let mut visual = VolumeVisual::new(
        FlakyBackend::new(),
        &Volume::filled(small, 0.5).unwrap(),
        VolumeOptions::default(),
    )
    .unwrap();
    let clim = visual.clim();

    visual.backend_mut().fail_writes = true;
    let err = visual
        .set_data(&Volume::filled(large, 2.0).unwrap(), None)
        .unwrap_err();
    assert!(matches!(err, VoxcastError::Resource(_)));
    assert_eq!(visual.volume_shape(), None);
    assert_eq!(visual.clim(), clim);
    assert!(matches!(visual.draw(&scene(large)), Err(VoxcastError::NoData)));

    // The texture already has the new shape, so the retry only writes.
    visual.backend_mut().fail_writes = false;
    visual
        .set_data(&Volume::filled(large, 2.0).unwrap(), None)
        .unwrap();
    assert_eq!(visual.volume_shape().unwrap().grid, large);
    assert_eq!(visual.backend().inner.stats().texture_resizes, 1);
    visual.draw(&scene(large)).unwrap();
}

#[test]
fn test_failed_geometry_rebuild_blocks_drawing() {
    let small = GridShape::new(3, 3, 3);
    let large = GridShape::new(3, 3, 6);
    let mut visual = VolumeVisual::new(
        FlakyBackend::new(),
        &Volume::filled(small, 1.0).unwrap(),
        VolumeOptions::default(),
    )
    .unwrap();

    visual.backend_mut().fail_buffers = true;
    assert!(visual
        .set_data(&Volume::filled(large, 1.0).unwrap(), None)
        .is_err());
    assert_eq!(visual.volume_shape(), None);
    assert_eq!(visual.backend().inner.stats().live_buffers(), 0);
    assert!(matches!(visual.draw(&scene(large)), Err(VoxcastError::NoData)));

    visual.backend_mut().fail_buffers = false;
    visual
        .set_data(&Volume::filled(large, 1.0).unwrap(), None)
        .unwrap();
    assert_eq!(visual.geometry_rebuilds(), 2);
    visual.draw(&scene(large)).unwrap();
}
