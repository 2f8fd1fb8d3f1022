use std::sync::{Arc, Mutex};

use modelview_assets::Vertex;
use modelview_shader::{
    ProgramId, ProgramLayout, ShaderBackend, ShaderStage, UniformLocation, UniformValue,
};

use crate::context::GpuContext;
use crate::error::checked;

/// A shader module that passed WGSL validation.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    warnings: Vec<String>,
}

/// A linked program: render pipeline plus the buffer backing its uniforms.
#[derive(Debug)]
pub struct WgpuProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) uniform_bind_group: wgpu::BindGroup,
    warnings: Vec<String>,
}

/// [`ShaderBackend`] that compiles WGSL stages into modules and links them
/// into render pipelines targeting the surface and depth formats.
#[derive(Debug)]
pub struct WgpuShaderBackend {
    gpu: Arc<GpuContext>,
    active: Mutex<Option<ProgramId>>,
}

impl WgpuShaderBackend {
    pub fn new(gpu: Arc<GpuContext>) -> Self {
        Self {
            gpu,
            active: Mutex::new(None),
        }
    }

    /// Pops the scope pushed before a fallible call, turning an error into
    /// its message.
    fn pop_scope(&self) -> Option<String> {
        pollster::block_on(self.gpu.device.pop_error_scope()).map(|e| e.to_string())
    }
}

fn stage_label(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vertex_stage",
        ShaderStage::Fragment => "fragment_stage",
    }
}

impl ShaderBackend for WgpuShaderBackend {
    type Stage = CompiledStage;
    type Program = WgpuProgram;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<CompiledStage, String> {
        let device = &self.gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(stage_label(stage)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let info = pollster::block_on(module.get_compilation_info());
        let scope_error = self.pop_scope();

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for message in info.messages {
            let text = match message.location {
                Some(at) => format!("{}:{}: {}", at.line_number, at.line_position, message.message),
                None => message.message,
            };
            match message.message_type {
                wgpu::CompilationMessageType::Error => errors.push(text),
                wgpu::CompilationMessageType::Warning => warnings.push(text),
                wgpu::CompilationMessageType::Info => tracing::debug!(stage = %stage, "{text}"),
            }
        }
        if let Some(error) = scope_error {
            if errors.is_empty() {
                errors.push(error);
            }
        }
        if !errors.is_empty() {
            return Err(errors.join("\n"));
        }
        Ok(CompiledStage {
            stage,
            module,
            warnings,
        })
    }

    fn link(
        &self,
        vertex: &CompiledStage,
        fragment: &CompiledStage,
        layout: &ProgramLayout,
    ) -> Result<WgpuProgram, String> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err("stages attached in the wrong slots".into());
        }
        let gpu = &self.gpu;
        let device = &gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: u64::from(layout.uniforms.size()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let mut bind_group_layouts = vec![&uniform_layout];
        if layout.textured {
            bind_group_layouts.push(&gpu.material_layout);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("program_layout"),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("program_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(layout.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: Some(layout.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: GpuContext::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = self.pop_scope() {
            return Err(error);
        }
        let warnings = vertex
            .warnings
            .iter()
            .map(|w| format!("vertex: {w}"))
            .chain(fragment.warnings.iter().map(|w| format!("fragment: {w}")))
            .collect();
        Ok(WgpuProgram {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            warnings,
        })
    }

    fn release_stage(&self, stage: CompiledStage) {
        tracing::trace!(stage = %stage.stage, "releasing shader module");
        drop(stage);
    }

    fn validate(&self, program: &WgpuProgram) -> Option<String> {
        (!program.warnings.is_empty()).then(|| program.warnings.join("\n"))
    }

    fn use_program(&self, id: ProgramId, _program: &WgpuProgram) {
        *self.active.lock().unwrap_or_else(|p| p.into_inner()) = Some(id);
    }

    fn active_program(&self) -> Option<ProgramId> {
        *self.active.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn write_uniform(&self, program: &WgpuProgram, location: UniformLocation, value: &UniformValue) {
        let gpu = &self.gpu;
        let written = checked(&gpu.device, "queue.write_buffer", || {
            gpu.queue.write_buffer(
                &program.uniform_buffer,
                u64::from(location.offset),
                &value.to_bytes(),
            );
        });
        if let Err(error) = written {
            gpu.defer_error(error);
        }
    }
}
