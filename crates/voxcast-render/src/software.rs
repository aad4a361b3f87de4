//! A CPU renderer implementing [`RenderBackend`].
//!
//! Draws run the same ray caster as the GPU shaders, one fragment at a time,
//! over the rasterized proxy cuboid. Useful for headless rendering and for
//! inspecting exactly which resources a visual creates and releases.

use glam::Vec4;
use voxcast_core::{
    CuboidVertex, DrawCall, GridShape, Interpolation, Program, RayCaster, RenderBackend, Result,
    TextureData, TextureSampler,
};

use crate::error::RenderError;
use crate::raster::{assemble_strip, FrameBuffer};

/// A volume texture held in host memory.
#[derive(Debug, Clone)]
pub struct SoftwareTexture {
    sampler: TextureSampler,
}

impl SoftwareTexture {
    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.sampler.shape()
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.sampler.interpolation()
    }
}

#[derive(Debug, Clone)]
enum BufferContents {
    Vertices(Vec<CuboidVertex>),
    Indices(Vec<u32>),
}

/// A vertex or index buffer held in host memory.
#[derive(Debug)]
pub struct SoftwareBuffer {
    id: u64,
    contents: BufferContents,
}

impl SoftwareBuffer {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A resource operation, recorded in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    TextureCreated,
    TextureResized,
    TextureWritten,
    BufferCreated(u64),
    BufferDeleted(u64),
    ProgramBuilt,
    Draw,
}

/// Counters over the backend's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub textures_created: usize,
    pub texture_resizes: usize,
    pub texture_writes: usize,
    pub buffers_created: usize,
    pub buffers_deleted: usize,
    pub programs_built: usize,
    pub draws: usize,
}

impl ResourceStats {
    /// Buffers created and not yet deleted.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers_created - self.buffers_deleted
    }
}

/// CPU backend rendering into a [`FrameBuffer`].
#[derive(Debug)]
pub struct SoftwareBackend {
    framebuffer: FrameBuffer,
    clear_color: Vec4,
    next_buffer_id: u64,
    stats: ResourceStats,
    events: Vec<ResourceEvent>,
}

impl SoftwareBackend {
    /// Creates a backend with a `width x height` transparent target.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height),
            clear_color: Vec4::ZERO,
            next_buffer_id: 0,
            stats: ResourceStats::default(),
            events: Vec::new(),
        }
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    #[must_use]
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.framebuffer.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.framebuffer.height()
    }

    /// The last frame as RGBA8, top-left origin.
    #[must_use]
    pub fn read_pixels_rgba8(&self) -> Vec<u8> {
        self.framebuffer.to_rgba8()
    }

    /// Color written at `(x, y)` by the last draw, if any.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec4> {
        self.framebuffer.written(x, y)
    }

    #[must_use]
    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    #[must_use]
    pub fn events(&self) -> &[ResourceEvent] {
        &self.events
    }

    fn record(&mut self, event: ResourceEvent) {
        self.events.push(event);
    }

    fn new_buffer(&mut self, contents: BufferContents) -> SoftwareBuffer {
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.stats.buffers_created += 1;
        self.record(ResourceEvent::BufferCreated(id));
        SoftwareBuffer { id, contents }
    }
}

impl RenderBackend for SoftwareBackend {
    type Texture = SoftwareTexture;
    type Buffer = SoftwareBuffer;

    fn create_texture(
        &mut self,
        shape: GridShape,
        interpolation: Interpolation,
    ) -> Result<SoftwareTexture> {
        self.stats.textures_created += 1;
        self.record(ResourceEvent::TextureCreated);
        Ok(SoftwareTexture {
            sampler: TextureSampler::new(&TextureData::zeroed(shape), interpolation),
        })
    }

    fn resize_texture(&mut self, texture: &mut SoftwareTexture, shape: GridShape) -> Result<()> {
        let interpolation = texture.interpolation();
        texture.sampler = TextureSampler::new(&TextureData::zeroed(shape), interpolation);
        self.stats.texture_resizes += 1;
        self.record(ResourceEvent::TextureResized);
        Ok(())
    }

    fn write_texture(&mut self, texture: &mut SoftwareTexture, data: &TextureData) -> Result<()> {
        if data.shape() != texture.shape() {
            return Err(RenderError::TextureCreationFailed(format!(
                "texel data is {:?} but texture is {:?}",
                data.shape(),
                texture.shape()
            ))
            .into());
        }
        texture.sampler = TextureSampler::new(data, texture.interpolation());
        self.stats.texture_writes += 1;
        self.record(ResourceEvent::TextureWritten);
        Ok(())
    }

    fn set_texture_interpolation(
        &mut self,
        texture: &mut SoftwareTexture,
        interpolation: Interpolation,
    ) -> Result<()> {
        texture.sampler.set_interpolation(interpolation);
        Ok(())
    }

    fn create_vertex_buffer(&mut self, vertices: &[CuboidVertex]) -> Result<SoftwareBuffer> {
        Ok(self.new_buffer(BufferContents::Vertices(vertices.to_vec())))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<SoftwareBuffer> {
        Ok(self.new_buffer(BufferContents::Indices(indices.to_vec())))
    }

    fn delete_buffer(&mut self, buffer: SoftwareBuffer) {
        self.stats.buffers_deleted += 1;
        self.record(ResourceEvent::BufferDeleted(buffer.id));
    }

    fn build_program(&mut self, program: &Program) -> Result<()> {
        self.stats.programs_built += 1;
        self.record(ResourceEvent::ProgramBuilt);
        log::debug!(
            "built software {} program with colormap '{}'",
            program.method(),
            program.snippets().cmap.name
        );
        Ok(())
    }

    fn draw(&mut self, call: DrawCall<'_, SoftwareTexture, SoftwareBuffer>) -> Result<()> {
        if call.program.needs_build() {
            return Err(RenderError::ProgramNotBuilt.into());
        }
        let BufferContents::Vertices(vertices) = &call.vertex_buffer.contents else {
            return Err(RenderError::InvalidDrawCall("expected a vertex buffer".into()).into());
        };
        let BufferContents::Indices(indices) = &call.index_buffer.contents else {
            return Err(RenderError::InvalidDrawCall("expected an index buffer".into()).into());
        };
        let count = call.index_count as usize;
        let indices = indices.get(..count).ok_or_else(|| {
            RenderError::InvalidDrawCall(format!(
                "index count {count} exceeds buffer of {}",
                indices.len()
            ))
        })?;

        let uniforms = call.program.frame_uniforms()?;
        let triangles = assemble_strip(
            vertices,
            indices,
            uniforms.transform,
            self.framebuffer.width(),
            self.framebuffer.height(),
        );
        let caster = RayCaster::new(call.program, uniforms, &call.texture.sampler);

        self.framebuffer.clear(self.clear_color);
        self.framebuffer
            .rasterize(&triangles, |fragment| caster.shade(fragment));

        self.stats.draws += 1;
        self.record(ResourceEvent::Draw);
        log::trace!(
            "software draw covered {} of {} pixels",
            self.framebuffer.coverage(),
            self.framebuffer.width() * self.framebuffer.height()
        );
        Ok(())
    }
}
