//! Ray-cast program state: uniform slots and pluggable snippets.
//!
//! A [`Program`] is what a backend compiles and draws with. Uniforms change
//! per frame. Snippets are selected per method and colormap, and changing one
//! marks the program for a rebuild.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::color_maps::ColorMap;
use crate::error::{Result, VoxcastError};
use crate::intersection::{calculate_steps, StepFunction};
use crate::method::RenderMethod;
use crate::options::Interpolation;

/// Named uniform slots. `None` means the slot has not been written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms {
    /// `u_shape`: volume extent as `(x, y, z)`.
    pub shape: Option<Vec3>,
    /// `u_threshold`: normalized isosurface level.
    pub threshold: Option<f32>,
    /// `u_relative_step_size`.
    pub relative_step_size: Option<f32>,
    /// Visual to clip transform.
    pub transform: Option<Mat4>,
    /// Visual to document transform.
    pub view_transform: Option<Mat4>,
    /// Document to visual transform.
    pub view_transform_inverse: Option<Mat4>,
}

/// Pluggable pieces of the ray caster.
#[derive(Debug, Clone)]
pub struct Snippets {
    /// Per-method sampling policy.
    pub method: RenderMethod,
    /// Scalar to color lookup.
    pub cmap: Arc<ColorMap>,
    /// Ray length function.
    pub calculate_steps: StepFunction,
    /// Volume texture filtering.
    pub sample: Interpolation,
}

/// Fully resolved per-frame inputs of the ray caster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub shape: Vec3,
    pub relative_step_size: f32,
    /// Only meaningful for isosurface rendering; zero otherwise.
    pub threshold: f32,
    pub transform: Mat4,
    pub view_transform: Mat4,
    pub view_transform_inverse: Mat4,
}

/// Uniforms and snippets for one volume visual.
#[derive(Debug, Clone)]
pub struct Program {
    uniforms: Uniforms,
    snippets: Snippets,
    needs_build: bool,
}

impl Program {
    pub fn new(method: RenderMethod, cmap: Arc<ColorMap>, sample: Interpolation) -> Self {
        Self {
            uniforms: Uniforms::default(),
            snippets: Snippets {
                method,
                cmap,
                calculate_steps,
                sample,
            },
            needs_build: true,
        }
    }

    #[must_use]
    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }

    #[must_use]
    pub fn snippets(&self) -> &Snippets {
        &self.snippets
    }

    #[must_use]
    pub fn method(&self) -> RenderMethod {
        self.snippets.method
    }

    /// Swaps the method policy; clears the threshold slot.
    pub fn set_method(&mut self, method: RenderMethod) {
        self.snippets.method = method;
        self.uniforms.threshold = None;
        self.needs_build = true;
    }

    pub fn set_colormap(&mut self, cmap: Arc<ColorMap>) {
        self.snippets.cmap = cmap;
        self.needs_build = true;
    }

    pub fn set_interpolation(&mut self, sample: Interpolation) {
        if self.snippets.sample != sample {
            self.snippets.sample = sample;
            self.needs_build = true;
        }
    }

    /// Replaces the ray length function.
    pub fn set_step_function(&mut self, calculate_steps: StepFunction) {
        self.snippets.calculate_steps = calculate_steps;
        self.needs_build = true;
    }

    /// Whether snippets changed since the backend last built this program.
    #[must_use]
    pub fn needs_build(&self) -> bool {
        self.needs_build
    }

    /// Called by a backend once it has compiled the current snippets.
    pub fn mark_built(&mut self) {
        self.needs_build = false;
    }

    /// Collects the per-frame uniforms, failing if a required slot is unset.
    pub fn frame_uniforms(&self) -> Result<FrameUniforms> {
        let missing = |name: &str| VoxcastError::Resource(format!("uniform '{name}' is not set"));
        let u = &self.uniforms;
        let threshold = if self.snippets.method.uses_threshold() {
            u.threshold.ok_or_else(|| missing("u_threshold"))?
        } else {
            0.0
        };
        Ok(FrameUniforms {
            shape: u.shape.ok_or_else(|| missing("u_shape"))?,
            relative_step_size: u
                .relative_step_size
                .ok_or_else(|| missing("u_relative_step_size"))?,
            threshold,
            transform: u.transform.ok_or_else(|| missing("transform"))?,
            view_transform: u.view_transform.ok_or_else(|| missing("viewtransformf"))?,
            view_transform_inverse: u
                .view_transform_inverse
                .ok_or_else(|| missing("viewtransformi"))?,
        })
    }
}
