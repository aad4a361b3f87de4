//! Triangle-strip rasterization for the software backend.
//!
//! Vertices are transformed to clip space, clipped against the near and far
//! planes, and scan-converted with perspective-correct varyings. There is no
//! depth test and no face culling; later primitives overwrite earlier ones.

use glam::{Mat4, Vec2, Vec3, Vec4};
use rayon::prelude::*;
use voxcast_core::{CuboidVertex, Fragment};

#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    clip: Vec4,
    position: Vec3,
    texcoord: Vec3,
}

impl ClipVertex {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            position: self.position.lerp(other.position, t),
            texcoord: self.texcoord.lerp(other.texcoord, t),
        }
    }
}

/// A screen-space triangle with varyings pre-divided by `w`.
#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle {
    screen: [Vec2; 3],
    inv_w: [f32; 3],
    position_over_w: [Vec3; 3],
    texcoord_over_w: [Vec3; 3],
    min: Vec2,
    max: Vec2,
    area: f32,
}

impl ScreenTriangle {
    fn new(vertices: [ClipVertex; 3], width: usize, height: usize) -> Option<Self> {
        let mut screen = [Vec2::ZERO; 3];
        let mut inv_w = [0.0; 3];
        let mut position_over_w = [Vec3::ZERO; 3];
        let mut texcoord_over_w = [Vec3::ZERO; 3];
        for (i, v) in vertices.iter().enumerate() {
            if v.clip.w <= 0.0 {
                return None;
            }
            let w = 1.0 / v.clip.w;
            let ndc = v.clip.truncate() * w;
            // Pixel coordinates with a top-left origin.
            screen[i] = Vec2::new(
                (ndc.x * 0.5 + 0.5) * width as f32,
                (0.5 - ndc.y * 0.5) * height as f32,
            );
            inv_w[i] = w;
            position_over_w[i] = v.position * w;
            texcoord_over_w[i] = v.texcoord * w;
        }

        let area = edge(screen[0], screen[1], screen[2]);
        if area == 0.0 || !area.is_finite() {
            return None;
        }
        Some(Self {
            screen,
            inv_w,
            position_over_w,
            texcoord_over_w,
            min: screen[0].min(screen[1]).min(screen[2]),
            max: screen[0].max(screen[1]).max(screen[2]),
            area,
        })
    }

    /// The interpolated fragment at pixel center `p`, if `p` is covered.
    fn fragment_at(&self, p: Vec2) -> Option<Fragment> {
        let [a, b, c] = self.screen;
        let b0 = edge(b, c, p) / self.area;
        let b1 = edge(c, a, p) / self.area;
        let b2 = edge(a, b, p) / self.area;
        if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
            return None;
        }

        let weights = [
            b0 * self.inv_w[0],
            b1 * self.inv_w[1],
            b2 * self.inv_w[2],
        ];
        let sum = weights[0] + weights[1] + weights[2];
        if sum <= 0.0 {
            return None;
        }
        let blend = |values: &[Vec3; 3]| {
            (values[0] * weights[0] + values[1] * weights[1] + values[2] * weights[2]) / sum
        };
        Some(Fragment {
            position: blend(&self.position_over_w),
            texcoord: blend(&self.texcoord_over_w),
        })
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Sutherland-Hodgman against the half-space `distance(v) >= 0`.
fn clip_polygon(polygon: &[ClipVertex], distance: impl Fn(&ClipVertex) -> f32) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let (dc, dn) = (distance(&current), distance(&next));
        if dc >= 0.0 {
            out.push(current);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            out.push(current.lerp(next, dc / (dc - dn)));
        }
    }
    out
}

/// Assembles a triangle strip into clipped screen-space triangles, in draw order.
pub fn assemble_strip(
    vertices: &[CuboidVertex],
    indices: &[u32],
    transform: Mat4,
    width: usize,
    height: usize,
) -> Vec<ScreenTriangle> {
    let transformed: Vec<ClipVertex> = vertices
        .iter()
        .map(|v| {
            let position = Vec3::from(v.position);
            ClipVertex {
                clip: transform * position.extend(1.0),
                position,
                texcoord: Vec3::from(v.texcoord),
            }
        })
        .collect();

    let mut triangles = Vec::new();
    for window in indices.windows(3) {
        let corners: Option<Vec<ClipVertex>> = window
            .iter()
            .map(|&i| transformed.get(i as usize).copied())
            .collect();
        let Some(corners) = corners else {
            continue;
        };
        // Depth range is [0, w].
        let polygon = clip_polygon(&corners, |v| v.clip.z);
        let polygon = clip_polygon(&polygon, |v| v.clip.w - v.clip.z);
        if polygon.len() < 3 {
            continue;
        }
        for k in 1..polygon.len() - 1 {
            if let Some(tri) =
                ScreenTriangle::new([polygon[0], polygon[k], polygon[k + 1]], width, height)
            {
                triangles.push(tri);
            }
        }
    }
    triangles
}

/// RGBA float color target with a coverage mask.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<Vec4>,
    covered: Vec<bool>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color: vec![Vec4::ZERO; width * height],
            covered: vec![false; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Vec4) {
        self.color.fill(color);
        self.covered.fill(false);
    }

    /// Color of pixel `(x, y)` if a fragment was written there since the last clear.
    #[must_use]
    pub fn written(&self, x: usize, y: usize) -> Option<Vec4> {
        let i = y * self.width + x;
        (x < self.width && self.covered.get(i).copied()?).then(|| self.color[i])
    }

    /// Colors of all written pixels.
    pub fn written_pixels(&self) -> impl Iterator<Item = Vec4> + '_ {
        self.color
            .iter()
            .zip(&self.covered)
            .filter_map(|(&c, &covered)| covered.then_some(c))
    }

    /// Number of written pixels.
    #[must_use]
    pub fn coverage(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }

    /// The color target clamped and quantized to RGBA8, rows top to bottom.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|c| {
                let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                [q(c.x), q(c.y), q(c.z), q(c.w)]
            })
            .collect()
    }

    /// Runs `shade` for every covered pixel center, rows in parallel.
    pub fn rasterize<F>(&mut self, triangles: &[ScreenTriangle], shade: F)
    where
        F: Fn(&Fragment) -> Option<Vec4> + Sync,
    {
        let width = self.width;
        if width == 0 {
            return;
        }
        self.color
            .par_chunks_mut(width)
            .zip(self.covered.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row, covered))| {
                let py = y as f32 + 0.5;
                for tri in triangles {
                    if py < tri.min.y || py > tri.max.y {
                        continue;
                    }
                    let x0 = tri.min.x.floor().max(0.0) as usize;
                    let x1 = (tri.max.x.ceil().max(0.0) as usize).min(width);
                    for x in x0..x1 {
                        let Some(fragment) = tri.fragment_at(Vec2::new(x as f32 + 0.5, py)) else {
                            continue;
                        };
                        if let Some(color) = shade(&fragment) {
                            row[x] = color;
                            covered[x] = true;
                        }
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use voxcast_core::{Camera, CuboidGeometry, GridShape, TransformContext};

    fn vertex(position: [f32; 3]) -> CuboidVertex {
        CuboidVertex {
            position,
            texcoord: position,
        }
    }

    #[test]
    fn test_full_screen_quad_covers_every_pixel() {
        let vertices = [
            vertex([-1.0, -1.0, 0.5]),
            vertex([1.0, -1.0, 0.5]),
            vertex([-1.0, 1.0, 0.5]),
            vertex([1.0, 1.0, 0.5]),
        ];
        let triangles = assemble_strip(&vertices, &[0, 1, 2, 3], Mat4::IDENTITY, 8, 6);
        assert_eq!(triangles.len(), 2);

        let mut fb = FrameBuffer::new(8, 6);
        fb.rasterize(&triangles, |_| Some(Vec4::ONE));
        assert_eq!(fb.coverage(), 48);
    }

    #[test]
    fn test_varyings_interpolate() {
        let vertices = [
            vertex([-1.0, -1.0, 0.5]),
            vertex([1.0, -1.0, 0.5]),
            vertex([-1.0, 1.0, 0.5]),
            vertex([1.0, 1.0, 0.5]),
        ];
        let triangles = assemble_strip(&vertices, &[0, 1, 2, 3], Mat4::IDENTITY, 4, 4);
        let mut fb = FrameBuffer::new(4, 4);
        fb.rasterize(&triangles, |f| Some(f.texcoord.extend(1.0)));
        // Pixel (0, 0) is the top-left: ndc (-0.75, 0.75).
        let c = fb.written(0, 0).unwrap();
        assert!((c.x + 0.75).abs() < 1e-5 && (c.y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_behind_near_plane_is_clipped() {
        let vertices = [
            vertex([-1.0, -1.0, -0.5]),
            vertex([1.0, -1.0, -0.5]),
            vertex([0.0, 1.0, -0.5]),
        ];
        assert!(assemble_strip(&vertices, &[0, 1, 2], Mat4::IDENTITY, 4, 4).is_empty());
    }

    #[test]
    fn test_discarded_fragments_leave_pixels_untouched() {
        let vertices = [
            vertex([-1.0, -1.0, 0.5]),
            vertex([1.0, -1.0, 0.5]),
            vertex([-1.0, 1.0, 0.5]),
            vertex([1.0, 1.0, 0.5]),
        ];
        let triangles = assemble_strip(&vertices, &[0, 1, 2, 3], Mat4::IDENTITY, 4, 4);
        let mut fb = FrameBuffer::new(4, 4);
        fb.clear(Vec4::new(0.0, 0.0, 1.0, 1.0));
        fb.rasterize(&triangles, |f| (f.texcoord.x > 0.0).then_some(Vec4::ONE));
        assert_eq!(fb.coverage(), 8);
        assert_eq!(fb.written(0, 0), None);
        assert_eq!(fb.to_rgba8()[..4], [0, 0, 255, 255]);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let vertices = [vertex([0.0, 0.0, 0.5])];
        assert!(assemble_strip(&vertices, &[0, 5, 9], Mat4::IDENTITY, 4, 4).is_empty());
    }

    proptest! {
        #[test]
        fn prop_cuboid_fragments_stay_on_the_box(
            depth in 1usize..12, height in 1usize..12, width in 1usize..12,
            dx in -3.1f32..3.1, dy in -1.2f32..1.2,
        ) {
            let shape = GridShape::new(depth, height, width);
            let geometry = CuboidGeometry::new(shape);
            let mut camera = Camera::framing(shape, 1.0);
            camera.orbit(dx, dy);
            let transform = camera.scene_transforms(Mat4::IDENTITY).full_transform();

            let triangles = assemble_strip(&geometry.vertices, &geometry.indices, transform, 24, 24);
            let mut fb = FrameBuffer::new(24, 24);
            let extent = shape.extent();
            fb.rasterize(&triangles, |f| {
                // Position and texcoord are both affine in object space.
                let expected = f.texcoord * extent - Vec3::splat(0.5);
                let error = (f.position - expected).abs().max_element() / extent.max_element();
                Some(f.texcoord.extend(error))
            });

            prop_assert!(fb.coverage() > 0);
            for color in fb.written_pixels() {
                let texcoord = color.truncate();
                prop_assert!(texcoord.min_element() > -1e-3 && texcoord.max_element() < 1.0 + 1e-3);
                prop_assert!(color.w < 1e-3, "position drifted from texcoord by {}", color.w);
            }
        }
    }
}
