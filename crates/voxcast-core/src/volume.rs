//! Volume data, contrast limits, and texel preparation.

use glam::Vec3;

use crate::error::{Result, VoxcastError};

/// The largest supported number of channels on a rank-4 volume.
pub const MAX_CHANNELS: usize = 4;

/// Voxel-grid dimensions in `(z, y, x)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    /// Number of slices (z).
    pub depth: usize,
    /// Number of rows (y).
    pub height: usize,
    /// Number of columns (x).
    pub width: usize,
}

impl GridShape {
    /// Creates a new grid shape from `(z, y, x)` counts.
    pub const fn new(depth: usize, height: usize, width: usize) -> Self {
        Self {
            depth,
            height,
            width,
        }
    }

    /// Total number of voxels, saturating at `usize::MAX`.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.depth
            .saturating_mul(self.height)
            .saturating_mul(self.width)
    }

    fn dims(&self) -> [usize; 3] {
        [self.depth, self.height, self.width]
    }

    /// The shape as an `(x, y, z)` vector, which is how the ray caster consumes it.
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.width as f32, self.height as f32, self.depth as f32)
    }

    /// Flattens a 3D voxel index to a linear index (x fastest).
    #[must_use]
    pub fn flatten_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.width + z * self.width * self.height
    }
}

/// Full volume shape: the voxel grid plus a channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeShape {
    pub grid: GridShape,
    pub channels: usize,
}

impl VolumeShape {
    /// Validates a rank-3 `(z, y, x)` or rank-4 `(z, y, x, c)` shape.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        let invalid = |reason| VoxcastError::InvalidShape {
            shape: dims.to_vec(),
            reason,
        };
        let channels = match dims.len() {
            3 => 1,
            4 => {
                let c = dims[3];
                if c == 0 || c > MAX_CHANNELS {
                    return Err(invalid("trailing channel axis must hold 1 to 4 values"));
                }
                c
            }
            _ => return Err(invalid("volume must be 3D, or 4D with a channel axis")),
        };
        if dims[..3].contains(&0) {
            return Err(invalid("every voxel axis must be non-empty"));
        }
        if dims.iter().try_fold(1usize, |n, &d| n.checked_mul(d)).is_none() {
            return Err(invalid("total value count overflows the address space"));
        }
        Ok(Self {
            grid: GridShape::new(dims[0], dims[1], dims[2]),
            channels,
        })
    }

    /// Number of scalar values in a dense array of this shape.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.grid.voxel_count().saturating_mul(self.channels)
    }
}

/// A dense volume with samples stored z-major, x fastest, channels interleaved.
#[derive(Debug, Clone)]
pub struct Volume {
    shape: VolumeShape,
    data: Vec<f32>,
}

impl Volume {
    /// Creates a volume from a flat array and its `(z, y, x[, c])` dimensions.
    pub fn new(data: Vec<f32>, dims: &[usize]) -> Result<Self> {
        let shape = VolumeShape::from_dims(dims)?;
        if data.len() != shape.value_count() {
            return Err(VoxcastError::DataSizeMismatch {
                expected: shape.value_count(),
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a single-channel volume by evaluating `f(x, y, z)` at every voxel.
    pub fn from_fn(shape: GridShape, mut f: impl FnMut(usize, usize, usize) -> f32) -> Result<Self> {
        let dims = shape.dims();
        VolumeShape::from_dims(&dims)?;
        let mut data = Vec::with_capacity(shape.voxel_count());
        for z in 0..shape.depth {
            for y in 0..shape.height {
                for x in 0..shape.width {
                    data.push(f(x, y, z));
                }
            }
        }
        Self::new(data, &dims)
    }

    /// Creates a single-channel volume filled with `value`.
    pub fn filled(shape: GridShape, value: f32) -> Result<Self> {
        let dims = shape.dims();
        VolumeShape::from_dims(&dims)?;
        Self::new(vec![value; shape.voxel_count()], &dims)
    }

    #[must_use]
    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    #[must_use]
    pub fn grid(&self) -> GridShape {
        self.shape.grid
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Minimum and maximum over finite samples, or `(0, 1)` if there are none.
    #[must_use]
    pub fn data_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &v in &self.data {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if min > max {
            (0.0, 1.0)
        } else {
            (min, max)
        }
    }

    /// Mean over finite samples, or 0 if there are none.
    #[must_use]
    pub fn mean(&self) -> f32 {
        let (sum, count) = self
            .data
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0_usize), |(s, n), &v| (s + f64::from(v), n + 1));
        if count == 0 {
            0.0
        } else {
            (sum / count as f64) as f32
        }
    }
}

/// Contrast limits mapping data values onto the normalized `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastLimits {
    low: f32,
    high: f32,
}

impl ContrastLimits {
    /// Creates contrast limits; both values must be finite.
    pub fn new(low: f32, high: f32) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(VoxcastError::InvalidContrastLimits(format!(
                "limits must be finite, got ({low}, {high})"
            )));
        }
        Ok(Self { low, high })
    }

    /// Parses a two-element `[low, high]` slice.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        match values {
            [low, high] => Self::new(*low, *high),
            _ => Err(VoxcastError::InvalidContrastLimits(format!(
                "expected a (low, high) pair, got {} values",
                values.len()
            ))),
        }
    }

    /// Limits spanning the data range of `volume`.
    #[must_use]
    pub fn from_volume(volume: &Volume) -> Self {
        let (low, high) = volume.data_range();
        Self { low, high }
    }

    #[must_use]
    pub fn low(&self) -> f32 {
        self.low
    }

    #[must_use]
    pub fn high(&self) -> f32 {
        self.high
    }

    /// Whether the range is empty, in which case every value maps to 0.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.high == self.low
    }

    /// Maps `value` through `(v - low) / (high - low)` without clamping.
    #[must_use]
    pub fn normalize_unclamped(&self, value: f32) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.low) / (self.high - self.low)
    }

    /// Maps `value` into `[0, 1]`. Non-finite samples map to 0.
    #[must_use]
    pub fn normalize(&self, value: f32) -> f32 {
        let t = self.normalize_unclamped(value);
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, 1.0)
        }
    }
}

/// Normalized RGBA texels ready for upload to a 3D texture.
#[derive(Debug, Clone)]
pub struct TextureData {
    shape: GridShape,
    texels: Vec<[f32; 4]>,
}

impl TextureData {
    /// Normalizes `volume` with `clim` and expands each voxel to four channels.
    ///
    /// One channel becomes `(L, L, L, 1)`, two become `(L, L, L, A)`,
    /// three become `(R, G, B, 1)` and four are kept as-is.
    #[must_use]
    pub fn from_volume(volume: &Volume, clim: ContrastLimits) -> Self {
        let channels = volume.shape().channels;
        let texels = volume
            .data()
            .chunks_exact(channels)
            .map(|voxel| {
                let n = |i: usize| clim.normalize(voxel[i]);
                match channels {
                    1 => [n(0), n(0), n(0), 1.0],
                    2 => [n(0), n(0), n(0), n(1)],
                    3 => [n(0), n(1), n(2), 1.0],
                    _ => [n(0), n(1), n(2), n(3)],
                }
            })
            .collect();
        Self {
            shape: volume.grid(),
            texels,
        }
    }

    /// Creates zero-filled texture data of the given shape.
    #[must_use]
    pub fn zeroed(shape: GridShape) -> Self {
        Self {
            shape,
            texels: vec![[0.0; 4]; shape.voxel_count()],
        }
    }

    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[must_use]
    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }
}
