//! The resource boundary between a volume visual and a renderer.

use crate::error::Result;
use crate::geometry::CuboidVertex;
use crate::options::Interpolation;
use crate::program::Program;
use crate::volume::{GridShape, TextureData};

/// Everything a backend needs to issue one volume draw.
#[derive(Debug)]
pub struct DrawCall<'a, T, B> {
    pub program: &'a Program,
    pub texture: &'a T,
    pub vertex_buffer: &'a B,
    pub index_buffer: &'a B,
    /// Number of strip indices to draw.
    pub index_count: u32,
}

/// A renderer that owns volume textures, geometry buffers and a ray-cast program.
///
/// Implementations are driven from a single thread; a visual serializes all
/// calls into its backend.
pub trait RenderBackend {
    /// A 3D RGBA texture.
    type Texture;
    /// A vertex or index buffer.
    type Buffer;

    /// Allocates a texture for a grid of `shape`.
    fn create_texture(&mut self, shape: GridShape, interpolation: Interpolation)
        -> Result<Self::Texture>;

    /// Reallocates `texture` for a new grid shape. Contents are undefined until written.
    fn resize_texture(&mut self, texture: &mut Self::Texture, shape: GridShape) -> Result<()>;

    /// Uploads normalized texels. `data` has the texture's current shape.
    fn write_texture(&mut self, texture: &mut Self::Texture, data: &TextureData) -> Result<()>;

    /// Changes texture filtering.
    fn set_texture_interpolation(
        &mut self,
        texture: &mut Self::Texture,
        interpolation: Interpolation,
    ) -> Result<()>;

    fn create_vertex_buffer(&mut self, vertices: &[CuboidVertex]) -> Result<Self::Buffer>;

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<Self::Buffer>;

    /// Releases a buffer.
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Compiles the program's current snippets.
    fn build_program(&mut self, program: &Program) -> Result<()>;

    /// Draws the strip with `call.program`, which has been built.
    fn draw(&mut self, call: DrawCall<'_, Self::Texture, Self::Buffer>) -> Result<()>;
}
