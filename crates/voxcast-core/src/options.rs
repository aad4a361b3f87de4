//! Configuration options for a volume visual.

use serde::{Deserialize, Serialize};

use crate::color_maps::DEFAULT_COLORMAP;
use crate::error::{Result, VoxcastError};
use crate::method::RenderMethod;
use crate::volume::ContrastLimits;

/// Default sampling density, as a fraction of a voxel per step.
pub const DEFAULT_RELATIVE_STEP_SIZE: f32 = 0.8;

/// Smallest accepted relative step size.
pub const MIN_RELATIVE_STEP_SIZE: f32 = 0.1;

/// Texture filtering used when sampling the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Trilinear filtering.
    #[default]
    Linear,
    /// Nearest-voxel lookup.
    Nearest,
}

/// Options applied when a volume visual is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeOptions {
    /// Render method.
    pub method: RenderMethod,

    /// Isosurface threshold in data units (`None` = data mean).
    pub threshold: Option<f32>,

    /// Step length relative to one voxel.
    pub relative_step_size: f32,

    /// Colormap name.
    pub cmap: String,

    /// Contrast limits `(low, high)` (`None` = data min/max).
    pub clim: Option<(f32, f32)>,

    /// Volume texture filtering.
    pub interpolation: Interpolation,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            method: RenderMethod::Mip,
            threshold: None,
            relative_step_size: DEFAULT_RELATIVE_STEP_SIZE,
            cmap: DEFAULT_COLORMAP.to_string(),
            clim: None,
            interpolation: Interpolation::Linear,
        }
    }
}

impl VolumeOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the scalar fields with the same rules as the visual's setters.
    pub fn validate(&self) -> Result<()> {
        validate_relative_step_size(self.relative_step_size)?;
        if let Some(threshold) = self.threshold {
            validate_threshold(threshold)?;
        }
        self.contrast_limits()?;
        Ok(())
    }

    /// The configured contrast limits, if any.
    pub fn contrast_limits(&self) -> Result<Option<ContrastLimits>> {
        self.clim
            .map(|(low, high)| ContrastLimits::new(low, high))
            .transpose()
    }
}

/// Rejects step sizes below [`MIN_RELATIVE_STEP_SIZE`] (and NaN).
pub fn validate_relative_step_size(value: f32) -> Result<f32> {
    if value >= MIN_RELATIVE_STEP_SIZE && value.is_finite() {
        Ok(value)
    } else {
        Err(VoxcastError::InvalidStepSize {
            value,
            min: MIN_RELATIVE_STEP_SIZE,
        })
    }
}

/// Rejects non-finite thresholds.
pub fn validate_threshold(value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(VoxcastError::InvalidThreshold(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = VolumeOptions::default();
        assert_eq!(options.method, RenderMethod::Mip);
        assert_eq!(options.relative_step_size, 0.8);
        assert_eq!(options.cmap, "grays");
        assert_eq!(options.threshold, None);
        assert_eq!(options.clim, None);
        assert_eq!(options.interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_step_size_boundary() {
        assert!(validate_relative_step_size(0.05).is_err());
        assert!(validate_relative_step_size(0.1).is_ok());
        assert!(validate_relative_step_size(f32::NAN).is_err());
        assert!(validate_relative_step_size(f32::INFINITY).is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let options = VolumeOptions::from_json(r#"{"method": "iso", "threshold": 0.25}"#).unwrap();
        assert_eq!(options.method, RenderMethod::Iso);
        assert_eq!(options.threshold, Some(0.25));
        assert_eq!(options.cmap, "grays");
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = VolumeOptions::from_json(r#"{"relative_step_size": 0.01}"#).unwrap_err();
        assert!(matches!(err, VoxcastError::InvalidStepSize { .. }));

        let err = VolumeOptions::from_json(r#"{"method": "ray"}"#).unwrap_err();
        assert!(matches!(err, VoxcastError::Config(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let options = VolumeOptions {
            clim: Some((0.0, 2.0)),
            interpolation: Interpolation::Nearest,
            ..VolumeOptions::default()
        };
        let json = options.to_json().unwrap();
        assert_eq!(VolumeOptions::from_json(&json).unwrap(), options);
    }
}
