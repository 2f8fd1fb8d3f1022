use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use modelview_render::GpuError;

type ErrorQueue = Arc<Mutex<Vec<GpuError>>>;

/// Device objects shared by the shader backend, model uploads and the
/// presenting device.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Group 1 of textured programs: diffuse texture and its sampler.
    pub material_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    /// Errors nothing could return directly, drained by the device each frame.
    errors: ErrorQueue,
}

impl GpuContext {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let errors = ErrorQueue::default();
        let sink = errors.clone();
        device.on_uncaptured_error(Box::new(move |error| {
            lock(&sink).push(GpuError::Uncaptured(error.to_string()));
        }));

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            surface_format,
            material_layout,
            sampler,
            errors,
        }
    }

    /// Queues an error for the next [`take_errors`](Self::take_errors).
    pub(crate) fn defer_error(&self, error: GpuError) {
        lock(&self.errors).push(error);
    }

    pub fn take_errors(&self) -> Vec<GpuError> {
        std::mem::take(&mut *lock(&self.errors))
    }

    pub(crate) fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn lock(errors: &ErrorQueue) -> MutexGuard<'_, Vec<GpuError>> {
    errors.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("surface_format", &self.surface_format)
            .finish_non_exhaustive()
    }
}
