//! Render method selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxcastError};

/// Method names accepted by validation but without an implementation.
pub const RESERVED_METHODS: &[&str] = &["ray"];

/// How samples along a ray are reduced to a fragment color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMethod {
    /// Maximum-intensity projection.
    #[default]
    Mip,
    /// Shaded isosurface at a threshold.
    Iso,
}

impl RenderMethod {
    /// All implemented methods.
    pub const ALL: [RenderMethod; 2] = [RenderMethod::Mip, RenderMethod::Iso];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMethod::Mip => "mip",
            RenderMethod::Iso => "iso",
        }
    }

    /// Whether the method reads the `u_threshold` uniform.
    #[must_use]
    pub fn uses_threshold(self) -> bool {
        matches!(self, RenderMethod::Iso)
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMethod {
    type Err = VoxcastError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "mip" => Ok(RenderMethod::Mip),
            "iso" => Ok(RenderMethod::Iso),
            _ if RESERVED_METHODS.contains(&name.as_str()) => {
                Err(VoxcastError::MethodNotImplemented(name))
            }
            _ => Err(VoxcastError::UnknownMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_methods() {
        assert_eq!("mip".parse::<RenderMethod>().unwrap(), RenderMethod::Mip);
        assert_eq!("ISO".parse::<RenderMethod>().unwrap(), RenderMethod::Iso);
        for method in RenderMethod::ALL {
            assert_eq!(method.as_str().parse::<RenderMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_reserved_method_rejected() {
        let err = "ray".parse::<RenderMethod>().unwrap_err();
        assert!(matches!(err, VoxcastError::MethodNotImplemented(_)));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = "translucent".parse::<RenderMethod>().unwrap_err();
        assert!(matches!(err, VoxcastError::UnknownMethod(name) if name == "translucent"));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&RenderMethod::Iso).unwrap(), "\"iso\"");
        let method: RenderMethod = serde_json::from_str("\"mip\"").unwrap();
        assert_eq!(method, RenderMethod::Mip);
        assert!(serde_json::from_str::<RenderMethod>("\"ray\"").is_err());
    }
}
