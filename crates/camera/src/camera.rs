use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Directions the keyboard can move the camera in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Construction-time tunables. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub speed: f32,
    pub sprint_multiplier: f32,
    /// Degrees of rotation per pointer unit.
    pub sensitivity: f32,
    /// Degrees of field of view per scroll unit.
    pub scroll_sensitivity: f32,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub pitch_limit: f32,
    pub world_up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sprint_multiplier: 3.0,
            sensitivity: 0.1,
            scroll_sensitivity: 1.0,
            zoom: 45.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
            pitch_limit: 89.0,
            world_up: Vec3::Y,
        }
    }
}

/// Fly camera with position, yaw/pitch orientation and a zoom expressed as
/// the vertical field of view.
///
/// State is private so the basis can never drift from yaw/pitch. Projection
/// is not built here; the frame loop owns aspect ratio and clip planes.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    sprinting: bool,
    config: CameraConfig,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_config(position, CameraConfig::default())
    }

    pub fn with_config(position: Vec3, mut config: CameraConfig) -> Self {
        if config.min_zoom > config.max_zoom {
            tracing::warn!(
                min = config.min_zoom,
                max = config.max_zoom,
                "camera zoom range inverted, swapping bounds"
            );
            std::mem::swap(&mut config.min_zoom, &mut config.max_zoom);
        }
        config.pitch_limit = config.pitch_limit.abs().min(89.0);
        if config.world_up.length_squared() == 0.0 {
            config.world_up = Vec3::Y;
        }
        config.world_up = config.world_up.normalize();

        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: config.world_up,
            right: Vec3::X,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-config.pitch_limit, config.pitch_limit),
            zoom: config.zoom.clamp(config.min_zoom, config.max_zoom),
            sprinting: false,
            config,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn set_sprint(&mut self, sprinting: bool) {
        self.sprinting = sprinting;
    }

    /// Effective speed in world units per second, sprint included.
    pub fn effective_speed(&self) -> f32 {
        if self.sprinting {
            self.config.speed * self.config.sprint_multiplier
        } else {
            self.config.speed
        }
    }

    /// Moves along the current front/right axes. Displacement is linear in `dt`.
    pub fn process_keyboard(&mut self, direction: Movement, dt: f32) {
        let velocity = self.effective_speed() * dt.max(0.0);
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a pointer delta in screen units (positive `dy` is downwards).
    pub fn process_pointer_motion(&mut self, dx: f32, dy: f32) {
        let sensitivity = self.config.sensitivity;
        let limit = self.config.pitch_limit;
        self.yaw += dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-limit, limit);
        self.update_vectors();
    }

    pub fn process_scroll(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta * self.config.scroll_sensitivity)
            .clamp(self.config.min_zoom, self.config.max_zoom);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.config.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
