//! Shaded isosurface.

use glam::{Vec3, Vec4};

use super::{RayCaster, RaySetup, VolumeSampler};

/// Central-difference half-width in voxels.
const GRADIENT_VOXELS: f32 = 1.5;

/// Number of sub-strides tried when backtracking to the crossing.
const REFINE_SUBSTEPS: u8 = 6;

pub(super) fn cast<S: VolumeSampler + ?Sized>(
    caster: &RayCaster<'_, S>,
    ray: &RaySetup,
) -> Option<Vec4> {
    let threshold = caster.uniforms.threshold;
    let gradient_step = Vec3::splat(GRADIENT_VOXELS) / caster.uniforms.shape;

    for iter in (1..=ray.steps).rev() {
        let index = iter as f32;
        if caster.value_at(ray.location(index)) <= threshold {
            continue;
        }
        // Walk back from one stride before this sample in fifths of a stride.
        // The last sub-step lands on the sample itself, so a hit is guaranteed
        // for nearest filtering and for any sampler that is deterministic.
        for i in 0..REFINE_SUBSTEPS {
            let loc = ray.location(index + 1.0 - 0.2 * f32::from(i));
            let val = caster.value_at(loc);
            if val > threshold {
                let albedo = caster.colormap.sample(val);
                return Some(shade(caster, albedo, loc, gradient_step, ray.view_ray));
            }
        }
    }
    None
}

fn shade<S: VolumeSampler + ?Sized>(
    caster: &RayCaster<'_, S>,
    albedo: Vec4,
    loc: Vec3,
    step: Vec3,
    view_ray: Vec3,
) -> Vec4 {
    let view = view_ray.normalize_or_zero();
    let diff = |offset: Vec3| caster.value_at(loc - offset) - caster.value_at(loc + offset);
    let gradient = Vec3::new(
        diff(Vec3::new(step.x, 0.0, 0.0)),
        diff(Vec3::new(0.0, step.y, 0.0)),
        diff(Vec3::new(0.0, 0.0, step.z)),
    );
    // Light and eye share the view direction; orient the normal along it.
    let mut normal = gradient.normalize_or_zero();
    if normal.dot(view) <= 0.0 {
        normal = -normal;
    }
    caster.shading.blinn_phong(albedo, normal, view, view)
}
