//! The volume visual: owns a backend's texture, geometry and program.

use voxcast_core::options::{validate_relative_step_size, validate_threshold};
use voxcast_core::{
    ColorMapRegistry, ContrastLimits, DrawCall, GeometryCache, GeometryStats, GridShape,
    Interpolation, Program, RenderBackend, RenderMethod, Result, TextureData, TransformContext,
    Volume, VolumeOptions, VolumeShape, VoxcastError, STRIP_INDICES,
};

/// A ray-cast volume bound to one [`RenderBackend`].
///
/// All setters validate their input before touching any state, so a failed
/// call leaves the visual exactly as it was.
pub struct VolumeVisual<B: RenderBackend> {
    backend: B,
    program: Program,
    colormaps: ColorMapRegistry,
    texture: Option<B::Texture>,
    texture_shape: Option<GridShape>,
    geometry: GeometryCache<B::Buffer>,
    volume_shape: Option<VolumeShape>,
    clim: Option<ContrastLimits>,
    threshold: f32,
    relative_step_size: f32,
    cmap_name: String,
    interpolation: Interpolation,
    dirty: bool,
}

impl<B: RenderBackend> VolumeVisual<B> {
    /// Creates a visual for `volume` using the default colormap registry.
    pub fn new(backend: B, volume: &Volume, options: VolumeOptions) -> Result<Self> {
        Self::with_colormaps(backend, volume, options, ColorMapRegistry::new())
    }

    /// Creates a visual resolving colormap names against `colormaps`.
    pub fn with_colormaps(
        backend: B,
        volume: &Volume,
        options: VolumeOptions,
        colormaps: ColorMapRegistry,
    ) -> Result<Self> {
        options.validate()?;
        let clim = options.contrast_limits()?;
        let cmap = colormaps.resolve(&options.cmap)?;

        let mut program = Program::new(options.method, cmap, options.interpolation);
        program.uniforms_mut().relative_step_size = Some(options.relative_step_size);

        let mut visual = Self {
            backend,
            program,
            colormaps,
            texture: None,
            texture_shape: None,
            geometry: GeometryCache::default(),
            volume_shape: None,
            clim: None,
            threshold: options.threshold.unwrap_or_else(|| volume.mean()),
            relative_step_size: options.relative_step_size,
            cmap_name: options.cmap,
            interpolation: options.interpolation,
            dirty: true,
        };
        visual.set_data(volume, clim)?;
        log::debug!(
            "created {} volume visual for shape {:?}",
            visual.method(),
            volume.shape()
        );
        Ok(visual)
    }

    /// Uploads new data.
    ///
    /// Contrast limits default to the data range on the first upload and are
    /// kept on later uploads unless `clim` overrides them. The texture is
    /// reallocated and the geometry rebuilt only when the grid shape changes.
    pub fn set_data(&mut self, volume: &Volume, clim: Option<ContrastLimits>) -> Result<()> {
        let clim = clim
            .or(self.clim)
            .unwrap_or_else(|| ContrastLimits::from_volume(volume));
        if clim.is_degenerate() {
            log::warn!(
                "contrast limits ({}, {}) are degenerate; all samples map to 0",
                clim.low(),
                clim.high()
            );
        }
        let data = TextureData::from_volume(volume, clim);

        if let Err(err) = self.upload(&data) {
            // The texture may already hold the new shape; stop drawing the old data.
            self.volume_shape = None;
            self.dirty = true;
            log::warn!("volume upload failed, visual holds no data: {err}");
            return Err(err);
        }

        self.program.uniforms_mut().shape = Some(data.shape().extent());
        self.volume_shape = Some(volume.shape());
        self.clim = Some(clim);
        self.dirty = true;
        Ok(())
    }

    /// Sizes the texture for `data`, writes it, and ensures matching geometry.
    fn upload(&mut self, data: &TextureData) -> Result<()> {
        let grid = data.shape();
        match self.texture.as_mut() {
            None => {
                self.texture = Some(self.backend.create_texture(grid, self.interpolation)?);
                self.texture_shape = Some(grid);
            }
            Some(texture) if self.texture_shape != Some(grid) => {
                self.backend.resize_texture(texture, grid)?;
                self.texture_shape = Some(grid);
            }
            Some(_) => {}
        }
        if let Some(texture) = self.texture.as_mut() {
            self.backend.write_texture(texture, data)?;
        }
        self.geometry.ensure(&mut self.backend, grid)?;
        Ok(())
    }

    /// Builds a [`Volume`] from raw samples and uploads it.
    ///
    /// `dims` is `(z, y, x)` or `(z, y, x, channels)`; `clim`, if given, must
    /// be a `(low, high)` pair.
    pub fn set_raw_data(
        &mut self,
        data: Vec<f32>,
        dims: &[usize],
        clim: Option<&[f32]>,
    ) -> Result<()> {
        let clim = clim.map(ContrastLimits::from_slice).transpose()?;
        let volume = Volume::new(data, dims)?;
        self.set_data(&volume, clim)
    }

    #[must_use]
    pub fn clim(&self) -> Option<ContrastLimits> {
        self.clim
    }

    #[must_use]
    pub fn method(&self) -> RenderMethod {
        self.program.method()
    }

    /// Switches the render method. Clears the threshold uniform.
    pub fn set_method(&mut self, method: RenderMethod) {
        if method == self.method() {
            return;
        }
        log::debug!("switching volume method {} -> {method}", self.method());
        self.program.set_method(method);
        self.dirty = true;
    }

    /// Switches the render method by name (`"mip"` or `"iso"`).
    pub fn set_method_by_name(&mut self, name: &str) -> Result<()> {
        let method = name.parse()?;
        self.set_method(method);
        Ok(())
    }

    #[must_use]
    pub fn cmap(&self) -> &str {
        &self.cmap_name
    }

    /// Switches to the colormap registered as `name`.
    pub fn set_cmap(&mut self, name: &str) -> Result<()> {
        let cmap = self.colormaps.resolve(name)?;
        log::debug!("switching volume colormap '{}' -> '{name}'", self.cmap_name);
        self.program.set_colormap(cmap);
        self.cmap_name = name.to_string();
        self.dirty = true;
        Ok(())
    }

    /// Colormaps available to [`set_cmap`](Self::set_cmap).
    pub fn colormaps_mut(&mut self) -> &mut ColorMapRegistry {
        &mut self.colormaps
    }

    /// Isosurface threshold in data units.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, value: f32) -> Result<()> {
        let value = validate_threshold(value)?;
        if !self.method().uses_threshold() {
            log::warn!("threshold {value} has no effect in {} mode", self.method());
        }
        self.threshold = value;
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn relative_step_size(&self) -> f32 {
        self.relative_step_size
    }

    /// Sets the sampling stride relative to one voxel. Must be at least 0.1.
    pub fn set_relative_step_size(&mut self, value: f32) -> Result<()> {
        let value = validate_relative_step_size(value)?;
        self.relative_step_size = value;
        self.program.uniforms_mut().relative_step_size = Some(value);
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) -> Result<()> {
        if let Some(texture) = self.texture.as_mut() {
            self.backend.set_texture_interpolation(texture, interpolation)?;
        }
        self.program.set_interpolation(interpolation);
        self.interpolation = interpolation;
        self.dirty = true;
        Ok(())
    }

    /// Shape of the current data.
    #[must_use]
    pub fn volume_shape(&self) -> Option<VolumeShape> {
        self.volume_shape
    }

    /// Extent along `axis` (0 = x, 1 = y, 2 = z) in voxels.
    #[must_use]
    pub fn bounds(&self, axis: usize) -> Option<(f32, f32)> {
        let extent = self.volume_shape?.grid.extent();
        (axis < 3).then(|| (0.0, extent[axis]))
    }

    /// Memory estimates for the uploaded resources.
    #[must_use]
    pub fn geometry_stats(&self) -> Option<GeometryStats> {
        self.geometry.stats()
    }

    /// How many times the cuboid buffers have been created.
    #[must_use]
    pub fn geometry_rebuilds(&self) -> usize {
        self.geometry.rebuilds()
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Whether state changed since the last [`draw`](Self::draw).
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Uploads per-frame uniforms from `context`, rebuilds the program if its
    /// snippets changed, and draws the cuboid strip.
    pub fn draw(&mut self, context: &impl TransformContext) -> Result<()> {
        let (Some(_), Some(texture), Some((vertex_buffer, index_buffer))) = (
            self.volume_shape,
            self.texture.as_ref(),
            self.geometry.buffers(),
        ) else {
            return Err(VoxcastError::NoData);
        };

        let threshold = if self.program.method().uses_threshold() {
            let clim = self.clim.ok_or(VoxcastError::NoData)?;
            Some(clim.normalize_unclamped(self.threshold))
        } else {
            None
        };

        let uniforms = self.program.uniforms_mut();
        uniforms.transform = Some(context.full_transform());
        uniforms.view_transform = Some(context.visual_to_document());
        uniforms.view_transform_inverse = Some(context.document_to_visual());
        uniforms.threshold = threshold;

        if self.program.needs_build() {
            self.backend.build_program(&self.program)?;
            self.program.mark_built();
            log::debug!("rebuilt {} volume program", self.program.method());
        }

        self.backend.draw(DrawCall {
            program: &self.program,
            texture,
            vertex_buffer,
            index_buffer,
            index_count: STRIP_INDICES.len() as u32,
        })?;
        self.dirty = false;
        Ok(())
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Releases the geometry buffers and returns the backend.
    pub fn into_backend(mut self) -> B {
        self.geometry.release(&mut self.backend);
        self.backend
    }
}
