//! Per-fragment ray reconstruction.

use glam::{Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

use crate::intersection::StepFunction;
use crate::program::FrameUniforms;

use super::Fragment;

/// Fragments with fewer steps than this are on a near face and are discarded.
pub const MIN_STEPS: u32 = 4;

/// Deterministic hash in `[0, 1)` used to dither the ray start.
#[must_use]
pub fn jitter(co: Vec2) -> f32 {
    let x = co.dot(Vec2::new(12.9898, 78.233)).sin() * 43758.5453;
    x - x.floor()
}

/// The ray a fragment walks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySetup {
    /// Unit view direction in visual space, pointing away from the camera.
    pub view_ray: Vec3,
    /// Plane through the camera, perpendicular to the ray, in texture space.
    pub clip_plane: Vec4,
    /// One sampling stride in texture space, pointing toward the camera.
    pub step: Vec3,
    /// Dithered texture-space origin of the walk.
    pub start: Vec3,
    /// Number of strides to the nearest exit plane.
    pub steps: u32,
}

impl RaySetup {
    /// Builds the ray for `fragment`, or `None` if the fragment is discarded.
    #[must_use]
    pub fn new(
        fragment: &Fragment,
        uniforms: &FrameUniforms,
        calculate_steps: StepFunction,
    ) -> Option<Self> {
        // A second point on the same pixel: one unit toward the viewer in
        // document depth, mapped back into visual space.
        let document = uniforms.view_transform * fragment.position.extend(1.0);
        let nearer = uniforms.view_transform_inverse * (document + Vec4::new(0.0, 0.0, document.w, 0.0));
        if nearer.w == 0.0 {
            return None;
        }
        let camera_point = nearer.xyz() / nearer.w;
        let view_ray = (fragment.position - camera_point).try_normalize()?;

        // Texture coordinates are (position + 0.5) / shape, so a plane through
        // the camera with normal `view_ray` in visual space has normal
        // `view_ray * shape` in texture space.
        let shape = uniforms.shape;
        let camera_tex = (camera_point + Vec3::splat(0.5)) / shape;
        let clip_normal = view_ray * shape;
        let clip_plane = clip_normal.extend(clip_normal.dot(camera_tex));

        let step = -(view_ray / shape) * uniforms.relative_step_size;
        let steps = calculate_steps(fragment.texcoord, step, clip_plane);
        if steps < MIN_STEPS {
            return None;
        }

        let noise = jitter((step.xy() * 10.0 + fragment.texcoord.xy()) * 100.0);
        let start = fragment.texcoord + step * (0.5 - noise);

        Some(Self {
            view_ray,
            clip_plane,
            step,
            start,
            steps,
        })
    }

    /// Texture-space location of sample `index` (which may be fractional).
    #[inline]
    #[must_use]
    pub fn location(&self, index: f32) -> Vec3 {
        self.start + self.step * index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::calculate_steps;
    use crate::transform::{SceneTransforms, TransformContext};
    use glam::Mat4;

    fn uniforms_for(scene: &SceneTransforms, shape: Vec3) -> FrameUniforms {
        FrameUniforms {
            shape,
            relative_step_size: 0.8,
            threshold: 0.0,
            transform: scene.full_transform(),
            view_transform: scene.visual_to_document(),
            view_transform_inverse: scene.document_to_visual(),
        }
    }

    fn scene_looking_down_z(eye_z: f32) -> SceneTransforms {
        let center = Vec3::splat(4.5);
        let eye = Vec3::new(center.x, center.y, eye_z);
        SceneTransforms::new(
            Mat4::IDENTITY,
            Mat4::look_at_rh(eye, center, Vec3::Y),
            Mat4::perspective_rh(0.9, 1.0, 0.05, 100.0),
        )
    }

    #[test]
    fn test_jitter_range() {
        for i in 0..100 {
            let v = jitter(Vec2::new(i as f32 * 1.37, -(i as f32) * 0.61));
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_back_face_fragment_walks_toward_camera() {
        let scene = scene_looking_down_z(30.0);
        let uniforms = uniforms_for(&scene, Vec3::splat(10.0));
        // Center of the far (z = 0) face.
        let fragment = Fragment {
            position: Vec3::new(4.5, 4.5, -0.5),
            texcoord: Vec3::new(0.5, 0.5, 0.0),
        };
        let ray = RaySetup::new(&fragment, &uniforms, calculate_steps).unwrap();
        assert!((ray.view_ray - Vec3::NEG_Z).length() < 1e-3);
        assert!(ray.step.z > 0.0);
        // One stride is 0.08 in texture space; the box is 1 deep.
        assert_eq!(ray.steps, 13);
    }

    #[test]
    fn test_front_face_fragment_is_discarded() {
        let scene = scene_looking_down_z(30.0);
        let uniforms = uniforms_for(&scene, Vec3::splat(10.0));
        let fragment = Fragment {
            position: Vec3::new(4.5, 4.5, 9.5),
            texcoord: Vec3::new(0.5, 0.5, 1.0),
        };
        assert!(RaySetup::new(&fragment, &uniforms, calculate_steps).is_none());
    }

    #[test]
    fn test_camera_inside_volume_truncates_ray() {
        // Eye at z = 4.5 inside a volume spanning [-0.5, 9.5] in visual space.
        let eye_z = 4.5;
        let scene = SceneTransforms::new(
            Mat4::IDENTITY,
            Mat4::look_at_rh(Vec3::new(4.5, 4.5, eye_z), Vec3::new(4.5, 4.5, -10.0), Vec3::Y),
            Mat4::perspective_rh(0.9, 1.0, 0.05, 100.0),
        );
        let uniforms = uniforms_for(&scene, Vec3::splat(10.0));
        let fragment = Fragment {
            position: Vec3::new(4.5, 4.5, -0.5),
            texcoord: Vec3::new(0.5, 0.5, 0.0),
        };
        let ray = RaySetup::new(&fragment, &uniforms, calculate_steps).unwrap();
        // Without the clip plane the walk would span the whole box (13 strides);
        // it must stop near the camera, about half-way.
        assert!(ray.steps >= 6 && ray.steps <= 7, "steps = {}", ray.steps);
    }

    #[test]
    fn test_start_is_within_one_stride() {
        let scene = scene_looking_down_z(30.0);
        let uniforms = uniforms_for(&scene, Vec3::splat(10.0));
        let fragment = Fragment {
            position: Vec3::new(3.0, 6.0, -0.5),
            texcoord: Vec3::new(0.35, 0.65, 0.0),
        };
        let ray = RaySetup::new(&fragment, &uniforms, calculate_steps).unwrap();
        let offset = (ray.start - fragment.texcoord).length();
        assert!(offset <= ray.step.length() * 0.5 + 1e-6);
    }
}
