use modelview_common::Viewport;
use modelview_shader::{ShaderBackend, ShaderProgram};

/// A per-frame failure at one GPU-issuing call site.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpuError {
    /// The API rejected a command.
    #[error("{call} failed at {file}:{line}: {message}")]
    Api {
        call: &'static str,
        file: &'static str,
        line: u32,
        message: String,
    },
    /// No render target could be acquired for this frame.
    #[error("frame target unavailable: {0}")]
    FrameUnavailable(String),
    /// A frame command was issued outside a begun frame.
    #[error("{0} issued with no frame in flight")]
    NoFrame(&'static str),
    /// The device raised an error outside any checked call.
    #[error("uncaptured device error: {0}")]
    Uncaptured(String),
}

impl GpuError {
    /// Whether the rest of the current frame has to be skipped.
    pub fn aborts_frame(&self) -> bool {
        matches!(self, GpuError::FrameUnavailable(_) | GpuError::NoFrame(_))
    }
}

/// Command-issuing layer the frame loop renders through.
///
/// A frame is always `clear`, then any number of `draw_model`, then
/// `present`. Uniforms are written through the program between `clear` and
/// the draw that uses them.
pub trait GraphicsDevice {
    type Backend: ShaderBackend;
    /// A loaded, drawable model.
    type Model;

    /// Current drawable size, read fresh every frame.
    fn viewport(&self) -> Viewport;

    fn resize(&mut self, viewport: Viewport) -> Result<(), GpuError>;

    /// Begins a frame by clearing color and depth.
    fn clear(&mut self, color: [f32; 4]) -> Result<(), GpuError>;

    /// Draws every sub-mesh of `model` with `program`, which must be active.
    fn draw_model(
        &mut self,
        program: &ShaderProgram<Self::Backend>,
        model: &Self::Model,
    ) -> Result<(), GpuError>;

    /// Submits the frame and hands it to the presentation engine.
    fn present(&mut self) -> Result<(), GpuError>;

    /// Errors no call could return directly, such as failed uniform writes
    /// or uncaptured device errors. Drained once per frame.
    fn take_errors(&mut self) -> Vec<GpuError> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_frame_target_aborts() {
        assert!(GpuError::FrameUnavailable("lost".into()).aborts_frame());
        assert!(GpuError::NoFrame("present").aborts_frame());
        assert!(!GpuError::Uncaptured("oom".into()).aborts_frame());
        let api = GpuError::Api {
            call: "draw_model",
            file: "gpu.rs",
            line: 10,
            message: "bad bind group".into(),
        };
        assert!(!api.aborts_frame());
        assert_eq!(api.to_string(), "draw_model failed at gpu.rs:10: bad bind group");
    }
}
