use glam::Vec3;

use crate::model::{MeshData, ModelData, Vertex};

/// Axis-aligned cube centered on the origin with edge length `size`.
///
/// Four vertices per face so every face gets its own normal and a full
/// 0..1 texture square. Triangles wind counter-clockwise seen from outside.
pub fn cube(size: f32) -> ModelData {
    let h = size * 0.5;
    // (outward normal, face-local u axis, face-local v axis)
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (normal + u * su + v * sv) * h;
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [(su + 1.0) * 0.5, (1.0 - sv) * 0.5],
            });
        }
        indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    ModelData {
        meshes: vec![MeshData {
            name: "cube".into(),
            vertices,
            indices,
            material: None,
        }],
        materials: Vec::new(),
    }
}
