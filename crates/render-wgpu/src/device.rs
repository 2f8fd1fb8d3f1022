use std::sync::Arc;

use modelview_common::Viewport;
use modelview_render::{GpuError, GraphicsDevice};
use modelview_shader::ShaderProgram;

use crate::backend::WgpuShaderBackend;
use crate::context::GpuContext;
use crate::error::{SetupError, checked};
use crate::model::GpuModel;

struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// Presents to a window surface. Each frame is recorded into one command
/// encoder: a clearing pass, then one loading pass per draw.
pub struct WgpuDevice {
    gpu: Arc<GpuContext>,
    backend: Arc<WgpuShaderBackend>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
    depth: wgpu::TextureView,
    frame: Option<Frame>,
}

impl WgpuDevice {
    /// Opens an adapter and device compatible with `target` and configures
    /// the surface at `size`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: Viewport,
        vsync: bool,
    ) -> Result<Self, SetupError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(SetupError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("modelview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(SetupError::UnsupportedSurface)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let info = adapter.get_info();
        tracing::info!(
            backend = info.backend.to_str(),
            adapter = %info.name,
            ?format,
            "GPU initialized"
        );

        let gpu = Arc::new(GpuContext::new(device, queue, format));
        let depth = gpu.create_depth_texture(config.width, config.height);
        Ok(Self {
            backend: Arc::new(WgpuShaderBackend::new(gpu.clone())),
            gpu,
            surface,
            config,
            viewport: size,
            depth,
            frame: None,
        })
    }

    pub fn gpu(&self) -> &Arc<GpuContext> {
        &self.gpu
    }

    /// Backend to build shader programs for this device with.
    pub fn backend(&self) -> Arc<WgpuShaderBackend> {
        self.backend.clone()
    }

    fn reconfigure(&self) -> Result<(), GpuError> {
        checked(&self.gpu.device, "surface.configure", || {
            self.surface.configure(&self.gpu.device, &self.config);
        })
    }
}

impl GraphicsDevice for WgpuDevice {
    type Backend = WgpuShaderBackend;
    type Model = GpuModel;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), GpuError> {
        self.viewport = viewport;
        // A zero-sized surface cannot be configured; keep the old one until
        // the window is restored.
        if viewport.is_empty() {
            return Ok(());
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        let configured = self.reconfigure();
        self.depth = self.gpu.create_depth_texture(viewport.width, viewport.height);
        configured
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), GpuError> {
        if self.frame.take().is_some() {
            tracing::warn!("previous frame was never presented, dropping it");
        }
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure()?;
                return Err(GpuError::FrameUnavailable("surface lost or outdated".into()));
            }
            Err(e) => return Err(GpuError::FrameUnavailable(e.to_string())),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = &self.gpu.device;
        let depth = &self.depth;
        let [r, g, b, a] = color.map(f64::from);
        let encoder = checked(device, "clear", || {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            encoder
        })?;

        self.frame = Some(Frame {
            surface_texture,
            view,
            encoder,
        });
        Ok(())
    }

    fn draw_model(
        &mut self,
        program: &ShaderProgram<WgpuShaderBackend>,
        model: &GpuModel,
    ) -> Result<(), GpuError> {
        let Some(frame) = self.frame.as_mut() else {
            return Err(GpuError::NoFrame("draw_model"));
        };
        if !program.is_active() {
            return Err(GpuError::Api {
                call: "draw_model",
                file: file!(),
                line: line!(),
                message: format!("{} is not the active program", program.id()),
            });
        }
        let raw = program.raw();
        let depth = &self.depth;
        // The pass ends inside the scope, where deferred pass errors surface.
        checked(&self.gpu.device, "draw_model", || {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(model.label()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&raw.pipeline);
            pass.set_bind_group(0, &raw.uniform_bind_group, &[]);
            model.draw(&mut pass, program.layout().textured);
        })
    }

    fn present(&mut self) -> Result<(), GpuError> {
        let Some(frame) = self.frame.take() else {
            return Err(GpuError::NoFrame("present"));
        };
        let queue = &self.gpu.queue;
        let submitted = checked(&self.gpu.device, "queue.submit", || {
            queue.submit(std::iter::once(frame.encoder.finish()));
        });
        frame.surface_texture.present();
        submitted
    }

    fn take_errors(&mut self) -> Vec<GpuError> {
        self.gpu.take_errors()
    }
}
