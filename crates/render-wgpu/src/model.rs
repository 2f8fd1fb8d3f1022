use modelview_assets::{ModelData, TextureData};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;

#[derive(Debug)]
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    /// Index into [`GpuModel::materials`]; always valid.
    material: usize,
}

/// A model resident on the GPU: one vertex/index buffer pair per mesh and
/// one bind group per material. The last material is a plain white fallback
/// used by meshes without a diffuse texture.
#[derive(Debug)]
pub struct GpuModel {
    label: String,
    meshes: Vec<GpuMesh>,
    materials: Vec<wgpu::BindGroup>,
}

impl GpuModel {
    pub fn upload(gpu: &GpuContext, label: &str, data: &ModelData) -> Self {
        let white = TextureData::solid([255; 4]);
        let mut materials: Vec<wgpu::BindGroup> = data
            .materials
            .iter()
            .map(|material| {
                let texture = material.diffuse.as_deref().unwrap_or(&white);
                material_bind_group(gpu, &material.name, texture)
            })
            .collect();
        let fallback = materials.len();
        materials.push(material_bind_group(gpu, "white", &white));

        let meshes = data
            .meshes
            .iter()
            .map(|mesh| {
                let vertex_buffer =
                    gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_vertices", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                let index_buffer =
                    gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_indices", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    material: mesh
                        .material
                        .filter(|&i| i < data.materials.len())
                        .unwrap_or(fallback),
                }
            })
            .collect();

        tracing::debug!(model = label, materials = materials.len(), "model uploaded");
        Self {
            label: label.to_string(),
            meshes,
            materials,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Records indexed draws for every mesh. Group 0 and the pipeline must
    /// already be set; group 1 is bound per mesh when `textured`.
    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>, textured: bool) {
        for mesh in &self.meshes {
            if textured {
                pass.set_bind_group(1, &self.materials[mesh.material], &[]);
            }
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

fn material_bind_group(gpu: &GpuContext, name: &str, texture: &TextureData) -> wgpu::BindGroup {
    let texture = gpu.device.create_texture_with_data(
        &gpu.queue,
        &wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: texture.width,
                height: texture.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texture.rgba,
    );
    let view = texture.create_view(&Default::default());
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(name),
        layout: &gpu.material_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&gpu.sampler),
            },
        ],
    })
}
