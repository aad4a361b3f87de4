//! Volume texture sampling.

use glam::Vec4;

use crate::options::Interpolation;
use crate::volume::{GridShape, TextureData};

/// Something the ray caster can sample at a texture coordinate.
pub trait VolumeSampler {
    /// RGBA at texture coordinate `loc` in `[0, 1]^3`. Out-of-range
    /// coordinates clamp to the edge texels.
    fn sample(&self, loc: glam::Vec3) -> Vec4;
}

/// The scalar the ray caster reduces: green carries intensity for every
/// channel layout.
#[inline]
#[must_use]
pub fn intensity(color: Vec4) -> f32 {
    color.y
}

/// A CPU-side 3D texture with clamp-to-edge addressing.
#[derive(Debug, Clone)]
pub struct TextureSampler {
    shape: GridShape,
    texels: Vec<Vec4>,
    interpolation: Interpolation,
}

impl TextureSampler {
    #[must_use]
    pub fn new(data: &TextureData, interpolation: Interpolation) -> Self {
        Self {
            shape: data.shape(),
            texels: data.texels().iter().map(|&t| Vec4::from(t)).collect(),
            interpolation,
        }
    }

    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    fn texel(&self, x: usize, y: usize, z: usize) -> Vec4 {
        self.texels
            .get(self.shape.flatten_index(x, y, z))
            .copied()
            .unwrap_or(Vec4::ZERO)
    }

    fn sample_nearest(&self, loc: glam::Vec3) -> Vec4 {
        let index = |t: f32, n: usize| ((t * n as f32).floor().max(0.0) as usize).min(n - 1);
        self.texel(
            index(loc.x, self.shape.width),
            index(loc.y, self.shape.height),
            index(loc.z, self.shape.depth),
        )
    }

    fn sample_linear(&self, loc: glam::Vec3) -> Vec4 {
        // Texel centers sit at (i + 0.5) / n.
        let axis = |t: f32, n: usize| {
            let u = t * n as f32 - 0.5;
            let base = u.floor();
            let frac = u - base;
            let clamp = |i: f32| (i.max(0.0) as usize).min(n - 1);
            (clamp(base), clamp(base + 1.0), frac)
        };
        let (x0, x1, fx) = axis(loc.x, self.shape.width);
        let (y0, y1, fy) = axis(loc.y, self.shape.height);
        let (z0, z1, fz) = axis(loc.z, self.shape.depth);

        let mix = |a: Vec4, b: Vec4, t: f32| a + (b - a) * t;
        let plane = |z| {
            let row0 = mix(self.texel(x0, y0, z), self.texel(x1, y0, z), fx);
            let row1 = mix(self.texel(x0, y1, z), self.texel(x1, y1, z), fx);
            mix(row0, row1, fy)
        };
        mix(plane(z0), plane(z1), fz)
    }
}

impl VolumeSampler for TextureSampler {
    fn sample(&self, loc: glam::Vec3) -> Vec4 {
        match self.interpolation {
            Interpolation::Linear => self.sample_linear(loc),
            Interpolation::Nearest => self.sample_nearest(loc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{ContrastLimits, Volume};
    use glam::Vec3;

    fn ramp_sampler(interpolation: Interpolation) -> TextureSampler {
        // Four voxels along x with values 0, 1, 2, 3.
        let volume = Volume::new(vec![0.0, 1.0, 2.0, 3.0], &[1, 1, 4]).unwrap();
        let data = TextureData::from_volume(&volume, ContrastLimits::new(0.0, 3.0).unwrap());
        TextureSampler::new(&data, interpolation)
    }

    #[test]
    fn test_linear_hits_texel_centers() {
        let sampler = ramp_sampler(Interpolation::Linear);
        for i in 0..4 {
            let t = (i as f32 + 0.5) / 4.0;
            let v = intensity(sampler.sample(Vec3::new(t, 0.5, 0.5)));
            assert!((v - i as f32 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_interpolates_between_centers() {
        let sampler = ramp_sampler(Interpolation::Linear);
        let v = intensity(sampler.sample(Vec3::new(0.5, 0.5, 0.5)));
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_to_edge() {
        let sampler = ramp_sampler(Interpolation::Linear);
        assert_eq!(intensity(sampler.sample(Vec3::new(-3.0, 0.5, 0.5))), 0.0);
        assert_eq!(intensity(sampler.sample(Vec3::new(7.0, 0.5, 0.5))), 1.0);
    }

    #[test]
    fn test_nearest() {
        let sampler = ramp_sampler(Interpolation::Nearest);
        let v = intensity(sampler.sample(Vec3::new(0.49, 0.5, 0.5)));
        assert!((v - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(intensity(sampler.sample(Vec3::new(1.0, 0.5, 0.5))), 1.0);
    }

    #[test]
    fn test_constant_field_is_exact() {
        let volume = Volume::filled(GridShape::new(3, 3, 3), 0.5).unwrap();
        let data = TextureData::from_volume(&volume, ContrastLimits::new(0.0, 1.0).unwrap());
        let sampler = TextureSampler::new(&data, Interpolation::Linear);
        for loc in [Vec3::new(0.13, 0.71, 0.42), Vec3::splat(0.999), Vec3::splat(-0.2)] {
            assert_eq!(intensity(sampler.sample(loc)), 0.5);
        }
    }
}
