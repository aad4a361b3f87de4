//! Cuboid proxy geometry for the ray caster.
//!
//! The volume is drawn as a single 14-index triangle strip covering all six
//! faces of a box that spans the voxel grid. Vertex positions sit half a voxel
//! outside the first and last voxel centers so that texture coordinate `0` and
//! `1` land on the outer voxel faces.

use bytemuck::{Pod, Zeroable};

use crate::backend::RenderBackend;
use crate::error::Result;
use crate::volume::GridShape;

/// Strip order over the corner vertices. Back faces come first for the usual
/// viewing directions; the step-count discard culls the near faces.
pub const STRIP_INDICES: [u32; 14] = [2, 0, 6, 4, 5, 0, 1, 2, 3, 6, 7, 5, 3, 1];

/// A cuboid corner: object-space position and matching texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CuboidVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 3],
}

/// Diagnostic memory estimates for the volume resources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryStats {
    /// Texture footprint: voxel count / 1024.
    pub kb_for_texture: f64,
    /// Vertex and index footprint in KB.
    pub kb_for_vertices: f64,
}

/// The eight corners and the strip indices for one grid shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CuboidGeometry {
    pub vertices: [CuboidVertex; 8],
    pub indices: [u32; 14],
}

impl CuboidGeometry {
    /// Builds the proxy cuboid for `shape`.
    #[must_use]
    pub fn new(shape: GridShape) -> Self {
        let (x0, x1) = (-0.5, shape.width as f32 - 0.5);
        let (y0, y1) = (-0.5, shape.height as f32 - 0.5);
        let (z0, z1) = (-0.5, shape.depth as f32 - 0.5);

        // Corner k has x from bit 0, y from bit 1, z from bit 2.
        let vertices = std::array::from_fn(|k| {
            let (bx, by, bz) = (k & 1 != 0, k & 2 != 0, k & 4 != 0);
            let pick = |bit: bool, lo: f32, hi: f32| if bit { hi } else { lo };
            CuboidVertex {
                position: [pick(bx, x0, x1), pick(by, y0, y1), pick(bz, z0, z1)],
                texcoord: [pick(bx, 0.0, 1.0), pick(by, 0.0, 1.0), pick(bz, 0.0, 1.0)],
            }
        });

        Self {
            vertices,
            indices: STRIP_INDICES,
        }
    }

    /// Memory estimates for a volume of `shape` drawn with this geometry.
    #[must_use]
    pub fn stats(&self, shape: GridShape) -> GeometryStats {
        let vertex_bytes = std::mem::size_of_val(&self.vertices);
        let index_bytes = std::mem::size_of_val(&self.indices);
        GeometryStats {
            kb_for_texture: shape.voxel_count() as f64 / 1024.0,
            kb_for_vertices: (vertex_bytes + index_bytes) as f64 / 1024.0,
        }
    }
}

/// GPU-side buffers for the cuboid strip, rebuilt only when the grid shape changes.
#[derive(Debug)]
pub struct GeometryCache<Buf> {
    shape: Option<GridShape>,
    buffers: Option<(Buf, Buf)>,
    stats: Option<GeometryStats>,
    rebuilds: usize,
}

impl<Buf> Default for GeometryCache<Buf> {
    fn default() -> Self {
        Self {
            shape: None,
            buffers: None,
            stats: None,
            rebuilds: 0,
        }
    }
}

impl<Buf> GeometryCache<Buf> {
    /// Ensures the buffers match `shape`. Returns `true` if they were rebuilt.
    ///
    /// Old buffers are released to the backend before new ones are created.
    pub fn ensure<B>(&mut self, backend: &mut B, shape: GridShape) -> Result<bool>
    where
        B: RenderBackend<Buffer = Buf>,
    {
        if self.shape == Some(shape) && self.buffers.is_some() {
            return Ok(false);
        }

        if let Some((vertex_buffer, index_buffer)) = self.buffers.take() {
            backend.delete_buffer(vertex_buffer);
            backend.delete_buffer(index_buffer);
        }
        self.shape = None;

        let geometry = CuboidGeometry::new(shape);
        let vertex_buffer = backend.create_vertex_buffer(&geometry.vertices)?;
        let index_buffer = match backend.create_index_buffer(&geometry.indices) {
            Ok(buffer) => buffer,
            Err(err) => {
                backend.delete_buffer(vertex_buffer);
                return Err(err);
            }
        };

        self.buffers = Some((vertex_buffer, index_buffer));
        self.stats = Some(geometry.stats(shape));
        self.shape = Some(shape);
        self.rebuilds += 1;
        log::debug!(
            "rebuilt volume geometry for {}x{}x{} grid",
            shape.width,
            shape.height,
            shape.depth
        );
        Ok(true)
    }

    /// Vertex and index buffers, if built.
    #[must_use]
    pub fn buffers(&self) -> Option<(&Buf, &Buf)> {
        self.buffers.as_ref().map(|(v, i)| (v, i))
    }

    #[must_use]
    pub fn stats(&self) -> Option<GeometryStats> {
        self.stats
    }

    /// Number of times buffers have been (re)created.
    #[must_use]
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Releases the buffers back to the backend.
    pub fn release<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend<Buffer = Buf>,
    {
        if let Some((vertex_buffer, index_buffer)) = self.buffers.take() {
            backend.delete_buffer(vertex_buffer);
            backend.delete_buffer(index_buffer);
        }
        self.shape = None;
    }
}
