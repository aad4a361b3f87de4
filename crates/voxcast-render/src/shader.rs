//! Shader source assembly.

use voxcast_core::RenderMethod;

use crate::error::{RenderError, RenderResult};

const VOLUME_COMMON: &str = include_str!("shaders/volume_common.wgsl");
const VOLUME_MIP: &str = include_str!("shaders/volume_mip.wgsl");
const VOLUME_ISO: &str = include_str!("shaders/volume_iso.wgsl");

/// Builder for shader modules made of a shared prelude and a fragment body.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    label: Option<String>,
}

impl ShaderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            label: None,
        }
    }

    /// Sets the vertex stage and shared declarations (WGSL).
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment shader source (WGSL).
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the shader module (does not create pipeline).
    pub fn build_module(self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self.combined_source()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(module)
    }

    /// The single WGSL module both stages are compiled from.
    pub fn combined_source(&self) -> RenderResult<String> {
        let vertex = self
            .vertex_source
            .as_ref()
            .ok_or_else(|| RenderError::ShaderCompilationFailed("missing vertex shader".into()))?;

        let fragment = self.fragment_source.as_ref().ok_or_else(|| {
            RenderError::ShaderCompilationFailed("missing fragment shader".into())
        })?;

        if vertex == fragment {
            return Ok(vertex.clone());
        }
        Ok(format!("{vertex}\n\n{fragment}"))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shader builder for the ray caster of `method`.
#[must_use]
pub fn volume_shader(method: RenderMethod) -> ShaderBuilder {
    let fragment = match method {
        RenderMethod::Mip => VOLUME_MIP,
        RenderMethod::Iso => VOLUME_ISO,
    };
    ShaderBuilder::new()
        .with_vertex(VOLUME_COMMON)
        .with_fragment(fragment)
        .with_label(format!("volume {method} shader"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_method_has_both_entry_points() {
        for method in RenderMethod::ALL {
            let source = volume_shader(method).combined_source().unwrap();
            assert!(source.contains("fn vs_main"));
            assert_eq!(source.matches("fn fs_main").count(), 1);
        }
    }

    #[test]
    fn test_iso_shader_reads_threshold() {
        let iso = volume_shader(RenderMethod::Iso).combined_source().unwrap();
        let mip = volume_shader(RenderMethod::Mip).combined_source().unwrap();
        assert!(iso.contains("u.threshold"));
        assert!(!mip.contains("u.threshold"));
    }

    #[test]
    fn test_missing_fragment_is_an_error() {
        let result = ShaderBuilder::new().with_vertex(VOLUME_COMMON).combined_source();
        assert!(matches!(result, Err(RenderError::ShaderCompilationFailed(_))));
    }

    #[test]
    fn test_iso_shader_matches_cpu_shading() {
        let shading = voxcast_core::ShadingParameters::default();
        let vec4 = |name: &str, v: voxcast_core::Vec4| {
            format!(
                "const {name}: vec4<f32> = vec4<f32>({:?}, {:?}, {:?}, {:?});",
                v.x, v.y, v.z, v.w
            )
        };
        for line in [
            vec4("AMBIENT", shading.ambient),
            vec4("DIFFUSE", shading.diffuse),
            vec4("SPECULAR", shading.specular),
            format!("const SHININESS: f32 = {:?};", shading.shininess),
        ] {
            assert!(VOLUME_ISO.contains(&line), "missing `{line}`");
        }
    }
}
