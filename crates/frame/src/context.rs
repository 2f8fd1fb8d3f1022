use std::time::Duration;

use glam::{Mat4, Vec3};
use modelview_camera::{Camera, Movement};
use modelview_common::{ModelTransform, ResizePolicy, Viewport};
use modelview_input::{InputEvent, KeyState, MouseButton};
use modelview_render::{Diagnostics, GraphicsDevice};
use modelview_shader::ShaderProgram;
use serde::{Deserialize, Serialize};

use crate::state::{FrameState, LoopState};
use crate::uniforms;

/// Per-run rendering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub clear_color: [f32; 4],
    pub near: f32,
    pub far: f32,
    pub model_transform: ModelTransform,
    pub resize: ResizePolicy,
    /// Upper bound on one frame's delta, in seconds.
    pub max_delta: f32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.05, 0.05, 0.05, 1.0],
            near: 0.1,
            far: 1000.0,
            model_transform: ModelTransform::default(),
            resize: ResizePolicy::Track,
            max_delta: 0.1,
        }
    }
}

/// A small flat-colored model marking the light position.
pub struct LightMarker<D: GraphicsDevice> {
    pub program: ShaderProgram<D::Backend>,
    pub model: D::Model,
    pub transform: ModelTransform,
    pub color: Vec3,
}

/// What one call to [`AppContext::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub state: LoopState,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// At least one draw reached the device.
    pub drew: bool,
    /// The windowing layer should grab the pointer.
    pub capture_pointer: bool,
}

impl FrameOutcome {
    fn terminated(delta: f32) -> Self {
        Self {
            state: LoopState::Terminated,
            delta,
            drew: false,
            capture_pointer: false,
        }
    }
}

/// Everything one frame reads and writes, passed explicitly to the loop.
pub struct AppContext<D: GraphicsDevice> {
    camera: Camera,
    settings: FrameSettings,
    model_program: ShaderProgram<D::Backend>,
    model: D::Model,
    light: Option<LightMarker<D>>,
    diagnostics: Diagnostics,
    keys: KeyState,
    frame: FrameState,
    frame_index: u64,
}

impl<D: GraphicsDevice> AppContext<D> {
    pub fn new(
        camera: Camera,
        settings: FrameSettings,
        model_program: ShaderProgram<D::Backend>,
        model: D::Model,
    ) -> Self {
        let frame = FrameState::new(settings.max_delta);
        Self {
            camera,
            settings,
            model_program,
            model,
            light: None,
            diagnostics: Diagnostics::default(),
            keys: KeyState::default(),
            frame,
            frame_index: 0,
        }
    }

    pub fn with_light(mut self, light: LightMarker<D>) -> Self {
        self.light = Some(light);
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &FrameSettings {
        &self.settings
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn keys(&self) -> KeyState {
        self.keys
    }

    pub fn state(&self) -> LoopState {
        self.frame.loop_state()
    }

    /// Frames started so far, including ones cut short by errors.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Perspective projection for `viewport` from the camera's current zoom.
    pub fn projection(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(
            self.camera.zoom().to_radians(),
            viewport.aspect(),
            self.settings.near,
            self.settings.far,
        )
    }

    /// Runs one iteration: timing, input, camera update, then rendering.
    ///
    /// Events after a `Quit` in the same batch are discarded and nothing is
    /// rendered. Once terminated, further calls do nothing.
    pub fn step<I>(&mut self, device: &mut D, now: Duration, events: I) -> FrameOutcome
    where
        I: IntoIterator<Item = InputEvent>,
    {
        if self.frame.is_quit() {
            return FrameOutcome::terminated(0.0);
        }
        let delta = self.frame.advance(now);
        let index = self.frame_index;
        self.frame_index += 1;
        let _span = tracing::trace_span!("frame", index).entered();

        let mut capture_pointer = false;
        for event in events {
            match event {
                InputEvent::Quit => {
                    tracing::info!(frame = index, "quit requested");
                    self.frame.request_quit();
                    break;
                }
                InputEvent::Scroll(amount) => self.camera.process_scroll(amount),
                InputEvent::PointerMotion { dx, dy } => self.camera.process_pointer_motion(dx, dy),
                InputEvent::ButtonDown(MouseButton::Left) => capture_pointer = true,
                InputEvent::ButtonDown(_) => {}
                InputEvent::Keys(keys) => self.keys = keys,
                InputEvent::Resized(viewport) => self.handle_resize(device, viewport, index),
            }
        }
        if self.frame.is_quit() {
            return FrameOutcome {
                capture_pointer,
                ..FrameOutcome::terminated(delta)
            };
        }

        self.apply_keys(delta);
        let drew = self.render(device, index);
        for error in device.take_errors() {
            self.diagnostics.report(index, error);
        }
        FrameOutcome {
            state: LoopState::Running,
            delta,
            drew,
            capture_pointer,
        }
    }

    /// Drives [`step`](Self::step) from `source` until the loop terminates.
    /// Returns the number of frames run.
    pub fn run<S: EventSource>(&mut self, device: &mut D, source: &mut S) -> u64 {
        let mut frames = 0;
        loop {
            let events = source.poll_events();
            let outcome = self.step(device, source.now(), events);
            source.on_outcome(&outcome);
            frames += 1;
            if outcome.state == LoopState::Terminated {
                tracing::info!(frames, errors = self.diagnostics.total(), "frame loop finished");
                return frames;
            }
        }
    }

    fn handle_resize(&mut self, device: &mut D, viewport: Viewport, frame: u64) {
        match self.settings.resize {
            ResizePolicy::Track => {
                tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
                self.diagnostics.check(frame, device.resize(viewport));
            }
            ResizePolicy::Fixed => {
                tracing::trace!(width = viewport.width, height = viewport.height, "resize ignored");
            }
        }
    }

    fn apply_keys(&mut self, delta: f32) {
        let keys = self.keys;
        self.camera.set_sprint(keys.sprint);
        if !keys.is_moving() {
            return;
        }
        for (held, direction) in [
            (keys.forward, Movement::Forward),
            (keys.backward, Movement::Backward),
            (keys.left, Movement::Left),
            (keys.right, Movement::Right),
        ] {
            if held {
                self.camera.process_keyboard(direction, delta);
            }
        }
    }

    fn render(&mut self, device: &mut D, frame: u64) -> bool {
        let viewport = device.viewport();
        if viewport.is_empty() {
            tracing::trace!(frame, "zero-sized viewport, skipping render");
            return false;
        }
        // Nothing can be drawn into a frame that failed to begin.
        if let Err(error) = device.clear(self.settings.clear_color) {
            self.diagnostics.report(frame, error);
            return false;
        }

        let projection = self.projection(viewport);
        let view = self.camera.view_matrix();

        let program = &self.model_program;
        program.use_program();
        program.set_mat4(uniforms::PROJECTION, &projection);
        program.set_mat4(uniforms::VIEW, &view);
        program.set_mat4(uniforms::MODEL, &self.settings.model_transform.matrix());
        let mut drew = match device.draw_model(program, &self.model) {
            Ok(()) => true,
            Err(error) => {
                let abort = error.aborts_frame();
                self.diagnostics.report(frame, error);
                if abort {
                    return false;
                }
                false
            }
        };

        if let Some(light) = &self.light {
            light.program.use_program();
            light.program.set_mat4(uniforms::PROJECTION, &projection);
            light.program.set_mat4(uniforms::VIEW, &view);
            light.program.set_mat4(uniforms::MODEL, &light.transform.matrix());
            light.program.set_vec3(uniforms::COLOR, light.color);
            match device.draw_model(&light.program, &light.model) {
                Ok(()) => drew = true,
                Err(error) => {
                    let abort = error.aborts_frame();
                    self.diagnostics.report(frame, error);
                    if abort {
                        return drew;
                    }
                }
            }
        }

        self.diagnostics.check(frame, device.present());
        drew
    }
}

/// Supplies time and input to [`AppContext::run`].
pub trait EventSource {
    /// Monotonic time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Drains the events gathered since the last call.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    fn on_outcome(&mut self, _outcome: &FrameOutcome) {}
}
