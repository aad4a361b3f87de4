//! Ray length computation against the unit texture cube.
//!
//! Planes are `(normal.xyz, offset)` with `dot(normal, p) = offset`. The step
//! count is the distance, in ray steps, from the entry point to the nearest
//! plane the ray is heading toward.

use glam::{Vec3, Vec4};

/// Bias pushing the cube planes just outside `[0, 1]`.
pub const PLANE_EPSILON: f32 = 0.000_001;

/// Distance reported for a plane the ray can never reach.
pub const UNREACHABLE_DISTANCE: f32 = 999_999.0;

/// Distances at or above this are treated as "no plane hit" and become zero.
pub const MAX_PLAUSIBLE_DISTANCE: f32 = 10_000.0;

/// The six bounding planes of the texture cube.
pub const CUBE_PLANES: [Vec4; 6] = [
    Vec4::new(1.0, 0.0, 0.0, -PLANE_EPSILON),
    Vec4::new(0.0, 1.0, 0.0, -PLANE_EPSILON),
    Vec4::new(0.0, 0.0, 1.0, -PLANE_EPSILON),
    Vec4::new(1.0, 0.0, 0.0, 1.0 + PLANE_EPSILON),
    Vec4::new(0.0, 1.0, 0.0, 1.0 + PLANE_EPSILON),
    Vec4::new(0.0, 0.0, 1.0, 1.0 + PLANE_EPSILON),
];

/// Signature of the step-count function the ray caster calls once per fragment.
pub type StepFunction = fn(Vec3, Vec3, Vec4) -> u32;

/// Distance from `point` to `plane` along `direction`, in multiples of `direction`.
///
/// Returns [`UNREACHABLE_DISTANCE`] when the point is on the plane, the ray is
/// parallel to it, or the plane lies behind the ray.
#[must_use]
pub fn distance_to_plane(point: Vec3, direction: Vec3, plane: Vec4) -> f32 {
    let normal = plane.truncate();
    let numerator = -(normal.dot(point) - plane.w);
    let denominator = normal.dot(direction);
    let reachable = numerator != 0.0 && denominator != 0.0 && numerator * denominator > 0.0;
    if reachable {
        numerator / denominator
    } else {
        UNREACHABLE_DISTANCE
    }
}

/// Number of `ray_step` strides from `entry` to the nearest cube or clip plane.
///
/// Never negative; rays that reach no plane (or produce non-finite distances)
/// yield zero.
#[must_use]
pub fn calculate_steps(entry: Vec3, ray_step: Vec3, clip_plane: Vec4) -> u32 {
    let smallest = CUBE_PLANES
        .iter()
        .chain(std::iter::once(&clip_plane))
        .map(|&plane| distance_to_plane(entry, ray_step, plane))
        .fold(UNREACHABLE_DISTANCE, f32::min);

    if smallest.is_nan() || smallest >= MAX_PLAUSIBLE_DISTANCE {
        return 0;
    }
    // Reachable distances are strictly positive.
    (smallest + 0.5) as u32
}
