use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Drawable area of the render surface, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height is treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Placement of a model in world space.
///
/// Composed as translate then scale, so the scale is applied to the model's
/// local coordinates before the translation moves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl ModelTransform {
    pub fn new(translation: Vec3, scale: Vec3) -> Self {
        Self { translation, scale }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_scale(self.scale)
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// How the viewer reacts to the window being resized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Surface and viewport follow the window size.
    #[default]
    Track,
    /// The window is not resizable and the viewport keeps its initial size.
    Fixed,
}
