//! Free-fly camera state machine.
//!
//! # Invariants
//! - front/right/up always form an orthonormal basis derived from yaw and pitch.
//! - Pitch never leaves the configured limit, zoom never leaves its range.
//! - Reading the view matrix never mutates the camera.

mod camera;

pub use camera::{Camera, CameraConfig, Movement};
