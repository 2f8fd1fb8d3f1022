use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use modelview_camera::CameraConfig;
use modelview_common::{ModelTransform, ResizePolicy};
use modelview_frame::FrameSettings;
use serde::{Deserialize, Serialize};

/// Viewer configuration, loaded from YAML. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraSection,
    pub model: ModelConfig,
    pub shaders: ShaderPaths,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resize: ResizePolicy,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "modelview".into(),
            width: 1920,
            height: 1080,
            resize: ResizePolicy::Track,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    pub position: Vec3,
    #[serde(flatten)]
    pub controls: CameraConfig,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            controls: CameraConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub translation: Vec3,
    /// Uniform scale applied to the model.
    pub scale: f32,
}

impl ModelConfig {
    pub fn transform(&self) -> ModelTransform {
        ModelTransform::new(self.translation, Vec3::splat(self.scale))
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/models/sponza/sponza.obj"),
            translation: Vec3::ZERO,
            scale: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub model_vertex: PathBuf,
    pub model_fragment: PathBuf,
    pub light_vertex: PathBuf,
    pub light_fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        let dir = Path::new("assets/shaders");
        Self {
            model_vertex: dir.join("model.vert.wgsl"),
            model_fragment: dir.join("model.frag.wgsl"),
            light_vertex: dir.join("light_cube.vert.wgsl"),
            light_fragment: dir.join("light_cube.frag.wgsl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub near: f32,
    pub far: f32,
    /// Longest frame delta fed to the camera, in seconds.
    pub max_delta: f32,
    /// Draws a flat-colored cube at this position when set.
    pub light: Option<LightConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let frame = FrameSettings::default();
        Self {
            clear_color: frame.clear_color,
            near: frame.near,
            far: frame.far,
            max_delta: frame.max_delta,
            light: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: Vec3,
    pub scale: f32,
    pub color: Vec3,
}

impl LightConfig {
    pub fn transform(&self) -> ModelTransform {
        ModelTransform::new(self.position, Vec3::splat(self.scale))
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.2, 1.0, 2.0),
            scale: 0.2,
            color: Vec3::ONE,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded file.
    pub fn apply_overrides(
        &mut self,
        model: Option<PathBuf>,
        width: Option<u32>,
        height: Option<u32>,
    ) {
        if let Some(model) = model {
            self.model.path = model;
        }
        if let Some(width) = width {
            self.window.width = width;
        }
        if let Some(height) = height {
            self.window.height = height;
        }
    }

    pub fn frame_settings(&self) -> FrameSettings {
        FrameSettings {
            clear_color: self.render.clear_color,
            near: self.render.near,
            far: self.render.far,
            model_transform: self.model.transform(),
            resize: self.window.resize,
            max_delta: self.render.max_delta,
        }
    }
}
