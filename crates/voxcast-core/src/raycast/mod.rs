//! CPU implementation of the per-fragment ray caster.
//!
//! [`RayCaster::shade`] is a pure function of one fragment's interpolated
//! varyings, so fragments can be evaluated in any order and in parallel.

mod iso;
mod mip;
mod ray_setup;
mod sampler;

use glam::{Vec3, Vec4};

pub use ray_setup::{jitter, RaySetup, MIN_STEPS};
pub use sampler::{intensity, TextureSampler, VolumeSampler};

use crate::color_maps::ColorMap;
use crate::intersection::StepFunction;
use crate::method::RenderMethod;
use crate::program::{FrameUniforms, Program};
use crate::shading::ShadingParameters;

/// Varyings of one fragment on the proxy cuboid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Visual-space position.
    pub position: Vec3,
    /// Texture coordinate on the cuboid surface.
    pub texcoord: Vec3,
}

/// The snippets and uniforms of a built program, bound to a sampler.
pub struct RayCaster<'a, S: ?Sized> {
    sampler: &'a S,
    colormap: &'a ColorMap,
    calculate_steps: StepFunction,
    method: RenderMethod,
    uniforms: FrameUniforms,
    shading: ShadingParameters,
}

impl<'a, S: VolumeSampler + ?Sized> RayCaster<'a, S> {
    #[must_use]
    pub fn new(program: &'a Program, uniforms: FrameUniforms, sampler: &'a S) -> Self {
        let snippets = program.snippets();
        Self {
            sampler,
            colormap: &snippets.cmap,
            calculate_steps: snippets.calculate_steps,
            method: snippets.method,
            uniforms,
            shading: ShadingParameters::default(),
        }
    }

    /// Output color of `fragment`, or `None` if it is discarded.
    #[must_use]
    pub fn shade(&self, fragment: &Fragment) -> Option<Vec4> {
        let ray = RaySetup::new(fragment, &self.uniforms, self.calculate_steps)?;
        match self.method {
            RenderMethod::Mip => Some(mip::cast(self, &ray)),
            RenderMethod::Iso => iso::cast(self, &ray),
        }
    }

    fn value_at(&self, loc: Vec3) -> f32 {
        intensity(self.sampler.sample(loc))
    }

    fn color_at(&self, loc: Vec3) -> Vec4 {
        self.colormap.sample(self.value_at(loc))
    }
}
