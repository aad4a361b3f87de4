//! GPU-side layout of the volume ray-cast program.

use voxcast_core::{CuboidVertex, FrameUniforms};

/// Uniforms for the volume shaders.
/// Layout must match WGSL `VolumeUniforms` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct VolumeUniforms {
    pub transform: [[f32; 4]; 4],
    pub view_transform: [[f32; 4]; 4],
    pub view_transform_inverse: [[f32; 4]; 4],
    /// Volume extent in xyz.
    pub shape: [f32; 4],
    pub threshold: f32,
    pub relative_step_size: f32,
    /// Padding to 16-byte alignment.
    pub _pad0: f32,
    pub _pad1: f32,
}

impl VolumeUniforms {
    #[must_use]
    pub fn from_frame(frame: &FrameUniforms) -> Self {
        Self {
            transform: frame.transform.to_cols_array_2d(),
            view_transform: frame.view_transform.to_cols_array_2d(),
            view_transform_inverse: frame.view_transform_inverse.to_cols_array_2d(),
            shape: frame.shape.extend(0.0).to_array(),
            threshold: frame.threshold,
            relative_step_size: frame.relative_step_size,
            _pad0: 0.0,
            _pad1: 0.0,
        }
    }
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// Vertex buffer layout of [`CuboidVertex`].
#[must_use]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<CuboidVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Bind group layout: uniforms, volume texture and sampler, colormap texture and sampler.
#[must_use]
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding, dimension| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    };
    let sampler = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("volume bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<VolumeUniforms>() as u64,
                    ),
                },
                count: None,
            },
            texture(1, wgpu::TextureViewDimension::D3),
            sampler(2),
            texture(3, wgpu::TextureViewDimension::D2),
            sampler(4),
        ],
    })
}

/// Render pipeline drawing the cuboid strip with `module`'s `vs_main` and `fs_main`.
///
/// Both faces are rasterized with no depth test; the fragment shader discards
/// near-face fragments itself.
#[must_use]
pub fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("volume pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: Some(wgpu::IndexFormat::Uint32),
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
