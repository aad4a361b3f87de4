//! Headless wgpu implementation of [`RenderBackend`].

use glam::Vec4;
use voxcast_core::{
    CuboidVertex, DrawCall, GridShape, Interpolation, Program, RenderBackend, Result, TextureData,
};

use crate::buffer::{
    aligned_bytes_per_row, create_colormap_texture, create_index_buffer, create_uniform_buffer,
    create_vertex_buffer, create_volume_sampler, create_volume_texture, update_uniform_buffer,
    write_volume_texture, COLORMAP_RESOLUTION,
};
use crate::error::{RenderError, RenderResult};
use crate::shader::volume_shader;
use crate::volume_render::{create_bind_group_layout, create_pipeline, VolumeUniforms};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A volume texture on the GPU.
#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    shape: GridShape,
    interpolation: Interpolation,
}

impl WgpuTexture {
    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

/// A vertex or index buffer on the GPU.
#[derive(Debug)]
pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
    len: u32,
}

/// Renders volumes into an offscreen RGBA8 target.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    width: u32,
    height: u32,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline: Option<wgpu::RenderPipeline>,
    colormap: Option<(wgpu::Texture, wgpu::TextureView)>,
    colormap_sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    clear_color: wgpu::Color,
    live_buffers: usize,
}

impl WgpuBackend {
    /// Creates a backend on the default adapter with a `width x height` target.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("voxcast device (headless)"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("volume render target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("volume readback buffer"),
            size: u64::from(aligned_bytes_per_row(width)) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group_layout = create_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("volume pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let colormap_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("colormap sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = create_uniform_buffer(
            &device,
            &<VolumeUniforms as bytemuck::Zeroable>::zeroed(),
            Some("volume uniforms"),
        );

        Ok(Self {
            device,
            queue,
            width,
            height,
            target,
            target_view,
            readback,
            bind_group_layout,
            pipeline_layout,
            pipeline: None,
            colormap: None,
            colormap_sampler,
            uniform_buffer,
            clear_color: wgpu::Color::TRANSPARENT,
            live_buffers: 0,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = wgpu::Color {
            r: f64::from(color.x),
            g: f64::from(color.y),
            b: f64::from(color.z),
            a: f64::from(color.w),
        };
    }

    /// Buffers created and not yet deleted.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.live_buffers
    }

    /// Copies the render target back to the host as tightly packed RGBA8 rows.
    pub fn read_pixels(&self) -> RenderResult<Vec<u8>> {
        let bytes_per_row = aligned_bytes_per_row(self.width);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("volume readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the poll below.
            let _ = tx.send(result);
        });
        if !self.device.poll(wgpu::Maintain::Wait).is_queue_empty() {
            log::warn!("device poll returned with submissions still pending");
        }
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // Copy data, removing row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * bytes_per_row as usize;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        self.readback.unmap();
        Ok(pixels)
    }

    fn new_buffer(&mut self, buffer: wgpu::Buffer, len: usize) -> WgpuBuffer {
        self.live_buffers += 1;
        WgpuBuffer {
            buffer,
            len: len as u32,
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Texture = WgpuTexture;
    type Buffer = WgpuBuffer;

    fn create_texture(
        &mut self,
        shape: GridShape,
        interpolation: Interpolation,
    ) -> Result<WgpuTexture> {
        let texture = create_volume_texture(&self.device, shape)?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(WgpuTexture {
            texture,
            view,
            sampler: create_volume_sampler(&self.device, interpolation),
            shape,
            interpolation,
        })
    }

    fn resize_texture(&mut self, texture: &mut WgpuTexture, shape: GridShape) -> Result<()> {
        let replacement = create_volume_texture(&self.device, shape)?;
        texture.texture.destroy();
        texture.texture = replacement;
        texture.view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        texture.shape = shape;
        log::debug!(
            "resized volume texture to {}x{}x{}",
            shape.width,
            shape.height,
            shape.depth
        );
        Ok(())
    }

    fn write_texture(&mut self, texture: &mut WgpuTexture, data: &TextureData) -> Result<()> {
        if data.shape() != texture.shape {
            return Err(RenderError::TextureCreationFailed(format!(
                "texel data is {:?} but texture is {:?}",
                data.shape(),
                texture.shape
            ))
            .into());
        }
        write_volume_texture(&self.queue, &texture.texture, data);
        Ok(())
    }

    fn set_texture_interpolation(
        &mut self,
        texture: &mut WgpuTexture,
        interpolation: Interpolation,
    ) -> Result<()> {
        texture.sampler = create_volume_sampler(&self.device, interpolation);
        texture.interpolation = interpolation;
        Ok(())
    }

    fn create_vertex_buffer(&mut self, vertices: &[CuboidVertex]) -> Result<WgpuBuffer> {
        let buffer = create_vertex_buffer(&self.device, vertices, Some("cuboid vertices"));
        Ok(self.new_buffer(buffer, vertices.len()))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<WgpuBuffer> {
        let buffer = create_index_buffer(&self.device, indices, Some("cuboid strip indices"));
        Ok(self.new_buffer(buffer, indices.len()))
    }

    fn delete_buffer(&mut self, buffer: WgpuBuffer) {
        buffer.buffer.destroy();
        self.live_buffers = self.live_buffers.saturating_sub(1);
    }

    fn build_program(&mut self, program: &Program) -> Result<()> {
        let snippets = program.snippets();
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = volume_shader(snippets.method)
            .build_module(&self.device)
            .map(|module| {
                create_pipeline(&self.device, &self.pipeline_layout, &module, TARGET_FORMAT)
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilationFailed(error.to_string()).into());
        }
        let pipeline = pipeline?;

        let table = snippets.cmap.to_rgba8(COLORMAP_RESOLUTION as usize);
        if let Some((old, _)) = self.colormap.take() {
            old.destroy();
        }
        self.colormap = Some(create_colormap_texture(&self.device, &self.queue, &table));
        self.pipeline = Some(pipeline);
        log::debug!(
            "built {} pipeline with colormap '{}'",
            snippets.method,
            snippets.cmap.name
        );
        Ok(())
    }

    fn draw(&mut self, call: DrawCall<'_, WgpuTexture, WgpuBuffer>) -> Result<()> {
        if call.program.needs_build() {
            return Err(RenderError::ProgramNotBuilt.into());
        }
        let (Some(pipeline), Some((_, colormap_view))) = (&self.pipeline, &self.colormap) else {
            return Err(RenderError::ProgramNotBuilt.into());
        };
        if call.index_count > call.index_buffer.len {
            return Err(RenderError::InvalidDrawCall(format!(
                "index count {} exceeds buffer of {}",
                call.index_count, call.index_buffer.len
            ))
            .into());
        }

        let frame = call.program.frame_uniforms()?;
        update_uniform_buffer(
            &self.queue,
            &self.uniform_buffer,
            &VolumeUniforms::from_frame(&frame),
        );

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("volume bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&call.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&call.texture.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(colormap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.colormap_sampler),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("volume draw encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("volume pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, call.vertex_buffer.buffer.slice(..));
            pass.set_index_buffer(call.index_buffer.buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..call.index_count, 0, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
