//! GPU buffer and texture creation helpers.

use voxcast_core::{GridShape, Interpolation, TextureData};
use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};

/// Creates a vertex buffer from data.
pub fn create_vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &[T],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates an index buffer from data.
pub fn create_index_buffer(
    device: &wgpu::Device,
    data: &[u32],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Updates a uniform buffer with new data.
pub fn update_uniform_buffer<T: bytemuck::Pod>(
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    data: &T,
) {
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(data));
}

fn extent(shape: GridShape) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: shape.width as u32,
        height: shape.height as u32,
        depth_or_array_layers: shape.depth as u32,
    }
}

/// Fails if any axis of `shape` exceeds `max_dimension` texels.
pub fn check_volume_extent(shape: GridShape, max_dimension: u32) -> RenderResult<()> {
    let axes = [shape.width, shape.height, shape.depth];
    if axes
        .iter()
        .all(|&n| u32::try_from(n).is_ok_and(|n| n <= max_dimension))
    {
        return Ok(());
    }
    Err(RenderError::TextureCreationFailed(format!(
        "volume of {}x{}x{} exceeds the device limit of {max_dimension} texels per axis",
        shape.width, shape.height, shape.depth
    )))
}

/// Allocates an `Rgba16Float` 3D texture for a voxel grid.
///
/// The shape is checked against the device limits first, and any remaining
/// validation error is returned instead of reaching the uncaptured handler.
pub fn create_volume_texture(
    device: &wgpu::Device,
    shape: GridShape,
) -> RenderResult<wgpu::Texture> {
    check_volume_extent(shape, device.limits().max_texture_dimension_3d)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("volume texture"),
        size: extent(shape),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D3,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        texture.destroy();
        return Err(RenderError::TextureCreationFailed(error.to_string()));
    }
    Ok(texture)
}

/// Uploads normalized texels into a texture created by [`create_volume_texture`].
pub fn write_volume_texture(queue: &wgpu::Queue, texture: &wgpu::Texture, data: &TextureData) {
    let shape = data.shape();
    let halves: Vec<u16> = data
        .texels()
        .iter()
        .flat_map(|texel| texel.map(|v| half::f16::from_f32(v).to_bits()))
        .collect();

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(&halves),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            // 4 channels x 2 bytes
            bytes_per_row: Some(shape.width as u32 * 8),
            rows_per_image: Some(shape.height as u32),
        },
        extent(shape),
    );
}

/// Clamp-to-edge sampler with the requested filtering.
pub fn create_volume_sampler(device: &wgpu::Device, interpolation: Interpolation) -> wgpu::Sampler {
    let filter = match interpolation {
        Interpolation::Linear => wgpu::FilterMode::Linear,
        Interpolation::Nearest => wgpu::FilterMode::Nearest,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("volume sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    })
}

/// Colormap texture resolution (number of samples).
pub const COLORMAP_RESOLUTION: u32 = 256;

/// Creates a `COLORMAP_RESOLUTION x 1` lookup texture.
pub fn create_colormap_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    table: &[[u8; 4]],
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: table.len() as u32,
        height: 1,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("colormap texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(table),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(size.width * 4),
            rows_per_image: None,
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Bytes per row of an RGBA8 image, padded for buffer copies.
pub fn aligned_bytes_per_row(width: u32) -> u32 {
    let bytes_per_pixel = 4u32; // RGBA8
    let unaligned = width * bytes_per_pixel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}
