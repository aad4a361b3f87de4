//! Maximum-intensity projection.

use glam::Vec4;

use super::{RayCaster, RaySetup, VolumeSampler};

/// Running maximum before any sample is taken.
const INITIAL_MAX: f32 = -99_999.0;

/// Fractional offsets around the best sample, from toward the camera to away.
const REFINE_OFFSETS: [f32; 5] = [0.4, 0.2, 0.0, -0.2, -0.4];

pub(super) fn cast<S: VolumeSampler + ?Sized>(caster: &RayCaster<'_, S>, ray: &RaySetup) -> Vec4 {
    let mut max_val = INITIAL_MAX;
    let mut max_i = 0.0_f32;

    for iter in (1..=ray.steps).rev() {
        let index = iter as f32;
        let val = caster.value_at(ray.location(index));
        // 0/1 selector instead of a branch, matching the shader.
        let select = f32::from(u8::from(val > max_val));
        max_val = select * val + (1.0 - select) * max_val;
        max_i = select * index + (1.0 - select) * max_i;
    }

    REFINE_OFFSETS
        .iter()
        .map(|offset| caster.color_at(ray.location(max_i + offset)))
        .fold(Vec4::ZERO, Vec4::max)
}
