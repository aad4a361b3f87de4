//! Transform context consumed by a draw.

use glam::{Mat4, Vec4};

/// Maps clip coordinates into the document frame: depth is negated so that
/// `+z` points toward the viewer.
pub const CLIP_TO_DOCUMENT: Mat4 = Mat4::from_cols(
    Vec4::X,
    Vec4::Y,
    Vec4::NEG_Z,
    Vec4::W,
);

/// The transforms a volume needs from its host scene.
pub trait TransformContext {
    /// Visual (voxel) space to clip space.
    fn full_transform(&self) -> Mat4;

    /// Visual space to the document frame used to reconstruct view rays.
    fn visual_to_document(&self) -> Mat4;

    /// Document frame back to visual space.
    fn document_to_visual(&self) -> Mat4 {
        self.visual_to_document().inverse()
    }
}

/// Model, view and projection matrices of a simple scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl SceneTransforms {
    #[must_use]
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
        }
    }
}

impl Default for SceneTransforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl TransformContext for SceneTransforms {
    fn full_transform(&self) -> Mat4 {
        self.projection * self.view * self.model
    }

    fn visual_to_document(&self) -> Mat4 {
        CLIP_TO_DOCUMENT * self.full_transform()
    }
}
