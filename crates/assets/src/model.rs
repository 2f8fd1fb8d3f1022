use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinates with the origin at the top-left of the image.
    pub uv: [f32; 2],
}

/// Decoded 8-bit RGBA image, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: color.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    /// `None` renders with a plain white texture.
    pub diffuse: Option<Arc<TextureData>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`].
    pub material: Option<usize>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Axis-aligned bounds over every vertex, `None` for an empty model.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self
            .meshes
            .iter()
            .flat_map(|m| m.vertices.iter())
            .map(|v| Vec3::from_array(v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Material of `mesh`, if it has one and the index is valid.
    pub fn material_of(&self, mesh: &MeshData) -> Option<&MaterialData> {
        mesh.material.and_then(|i| self.materials.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: [x, y, z],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        }
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn bounds_cover_all_meshes() {
        let model = ModelData {
            meshes: vec![
                MeshData {
                    name: "a".into(),
                    vertices: vec![vertex(-1.0, 0.0, 2.0), vertex(0.5, 3.0, 0.0)],
                    indices: vec![],
                    material: None,
                },
                MeshData {
                    name: "b".into(),
                    vertices: vec![vertex(4.0, -2.0, 1.0)],
                    indices: vec![],
                    material: Some(7),
                },
            ],
            materials: vec![],
        };
        let (min, max) = model.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Vec3::new(4.0, 3.0, 2.0));
        assert_eq!(model.vertex_count(), 3);
        assert!(model.material_of(&model.meshes[1]).is_none());
    }

    #[test]
    fn empty_model_has_no_bounds() {
        assert!(ModelData::default().bounds().is_none());
    }
}
