//! Single-light Blinn-Phong shading for isosurface hits.

use glam::{Vec3, Vec4};

/// Lighting coefficients. The light sits at the camera.
///
/// The WGSL isosurface shader carries the same defaults as constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParameters {
    /// Ambient term, multiplied with the albedo.
    pub ambient: Vec4,
    /// Multiplier on the Lambert term.
    pub diffuse: Vec4,
    /// Specular highlight color.
    pub specular: Vec4,
    /// Specular exponent.
    pub shininess: f32,
}

impl Default for ShadingParameters {
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.2, 0.4, 0.2, 1.0),
            diffuse: Vec4::ONE,
            specular: Vec4::ONE,
            shininess: 40.0,
        }
    }
}

impl ShadingParameters {
    /// Shades `albedo` at a surface with `normal`, seen along `view` and lit along `light`.
    ///
    /// All directions are unit vectors pointing away from the surface. The
    /// output alpha is the albedo alpha.
    #[must_use]
    pub fn blinn_phong(&self, albedo: Vec4, normal: Vec3, view: Vec3, light: Vec3) -> Vec4 {
        let lambert = normal.dot(light).clamp(0.0, 1.0);
        let halfway = (light + view).normalize_or_zero();
        let specular = halfway.dot(normal).max(0.0).powf(self.shininess);

        let lit = albedo * (self.ambient + self.diffuse * lambert) + self.specular * specular;
        lit.truncate().extend(albedo.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_on_light() {
        let shading = ShadingParameters::default();
        let albedo = Vec4::new(0.5, 0.5, 0.5, 1.0);
        let color = shading.blinn_phong(albedo, Vec3::Z, Vec3::Z, Vec3::Z);
        // ambient + full lambert, plus a full specular highlight.
        let expected = Vec3::new(0.5 * 1.2 + 1.0, 0.5 * 1.4 + 1.0, 0.5 * 1.2 + 1.0);
        assert!((color.truncate() - expected).length() < 1e-5);
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn test_grazing_light_is_ambient_only() {
        let shading = ShadingParameters::default();
        let albedo = Vec4::new(1.0, 1.0, 1.0, 0.5);
        let color = shading.blinn_phong(albedo, Vec3::Z, Vec3::X, Vec3::X);
        assert!((color.truncate() - Vec3::new(0.2, 0.4, 0.2)).length() < 1e-5);
        assert_eq!(color.w, 0.5);
    }
}
