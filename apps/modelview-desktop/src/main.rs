mod config;
mod input;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use modelview_camera::Camera;
use modelview_common::{ResizePolicy, Viewport};
use modelview_frame::{AppContext, LightMarker, LoopState, uniforms};
use modelview_input::InputEvent;
use modelview_render_wgpu::{GpuModel, WgpuDevice};
use modelview_shader::ShaderProgram;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::config::ViewerConfig;
use crate::input::HeldKeys;

#[derive(Parser)]
#[command(name = "modelview-desktop", about = "Real-time 3D model viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// OBJ model to display, overrides the config file
    #[arg(long)]
    model: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

/// GPU-side state, created once the window exists.
struct Scene {
    ctx: AppContext<WgpuDevice>,
    device: WgpuDevice,
}

struct ViewerApp {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    pending: Vec<InputEvent>,
    keys: HeldKeys,
    pointer_captured: bool,
    started: Instant,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            scene: None,
            pending: Vec::new(),
            keys: HeldKeys::default(),
            pointer_captured: false,
            started: Instant::now(),
            error: None,
        }
    }

    fn build_scene(&self, window: Arc<Window>) -> Result<Scene> {
        let size = window.inner_size();
        let device = WgpuDevice::new(
            window,
            Viewport::new(size.width, size.height),
            self.config.window.vsync,
        )
        .context("GPU setup failed")?;

        let shaders = &self.config.shaders;
        let model_program = ShaderProgram::from_files(
            device.backend(),
            "model",
            &shaders.model_vertex,
            &shaders.model_fragment,
            uniforms::model_program_layout(),
        )
        .context("failed to build model shader")?;

        let path = &self.config.model.path;
        let data = modelview_assets::load_obj(path)
            .with_context(|| format!("failed to load model {}", path.display()))?;
        let model = GpuModel::upload(device.gpu(), "model", &data);

        let camera = Camera::with_config(
            self.config.camera.position,
            self.config.camera.controls.clone(),
        );
        let mut ctx = AppContext::new(camera, self.config.frame_settings(), model_program, model);

        if let Some(light) = &self.config.render.light {
            let program = ShaderProgram::from_files(
                device.backend(),
                "light_cube",
                &shaders.light_vertex,
                &shaders.light_fragment,
                uniforms::light_program_layout(),
            )
            .context("failed to build light cube shader")?;
            let cube = GpuModel::upload(device.gpu(), "light_cube", &modelview_assets::cube(1.0));
            ctx = ctx.with_light(LightMarker {
                program,
                model: cube,
                transform: light.transform(),
                color: light.color,
            });
        }

        Ok(Scene { ctx, device })
    }

    fn set_pointer_capture(&mut self, captured: bool) {
        let Some(window) = &self.window else {
            return;
        };
        if captured {
            window.focus_window();
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("pointer grab unavailable: {e}");
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("pointer release failed: {e}");
        }
        window.set_cursor_visible(!captured);
        self.pointer_captured = captured;
        tracing::debug!(captured, "pointer capture changed");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let outcome = {
            let Some(scene) = self.scene.as_mut() else {
                return;
            };
            let events = std::mem::take(&mut self.pending);
            scene
                .ctx
                .step(&mut scene.device, self.started.elapsed(), events)
        };
        if outcome.capture_pointer && !self.pointer_captured {
            self.set_pointer_capture(true);
        }
        if outcome.state == LoopState::Terminated {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(self.config.window.resize == ResizePolicy::Track);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        match self.build_scene(window.clone()) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.window = Some(window);
                self.started = Instant::now();
            }
            Err(e) => {
                tracing::error!("{e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.pending.push(InputEvent::Quit);
                // Minimized or occluded windows may never get another redraw.
                self.redraw(event_loop);
            }
            WindowEvent::Resized(size) => {
                self.pending
                    .push(InputEvent::Resized(Viewport::new(size.width, size.height)));
            }
            WindowEvent::Focused(false) => {
                if self.pointer_captured {
                    self.set_pointer_capture(false);
                }
                if let Some(keys) = self.keys.clear() {
                    self.pending.push(InputEvent::Keys(keys));
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if key == KeyCode::Escape && pressed && self.pointer_captured {
                    self.set_pointer_capture(false);
                }
                if let Some(keys) = self.keys.update(key, pressed) {
                    self.pending.push(InputEvent::Keys(keys));
                }
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => {
                self.pending
                    .push(InputEvent::ButtonDown(input::mouse_button(button)));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.pending
                    .push(InputEvent::Scroll(input::scroll_amount(delta)));
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.pointer_captured {
                self.pending.push(InputEvent::PointerMotion {
                    dx: delta.0 as f32,
                    dy: delta.1 as f32,
                });
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("modelview-desktop starting");

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_overrides(cli.model, cli.width, cli.height);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(error) = app.error.take() {
        return Err(error);
    }
    if let Some(scene) = &app.scene {
        tracing::info!(
            frames = scene.ctx.frame_index(),
            gpu_errors = scene.ctx.diagnostics().total(),
            "viewer closed"
        );
    }
    Ok(())
}
