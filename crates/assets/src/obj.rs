use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AssetError;
use crate::model::{MaterialData, MeshData, ModelData, TextureData, Vertex};

/// Loads a Wavefront OBJ file and the diffuse textures its MTL references.
///
/// Faces are triangulated and every position/uv/normal combination becomes
/// one vertex. Texture paths resolve relative to the OBJ file. A texture that
/// fails to load is logged and the material falls back to untextured.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options).map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            tracing::warn!(path = %path.display(), "material library not loaded: {e}");
            Vec::new()
        }
    };
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut textures: HashMap<PathBuf, Option<Arc<TextureData>>> = HashMap::new();
    let materials: Vec<MaterialData> = materials
        .into_iter()
        .map(|material| {
            let diffuse = material
                .diffuse_texture
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .and_then(|name| {
                    let texture_path = base.join(name.replace('\\', "/"));
                    textures
                        .entry(texture_path)
                        .or_insert_with_key(|texture_path| match load_texture(texture_path) {
                            Ok(texture) => Some(Arc::new(texture)),
                            Err(e) => {
                                tracing::warn!(material = %material.name, "{e}, using white");
                                None
                            }
                        })
                        .clone()
                });
            MaterialData {
                name: material.name,
                diffuse,
            }
        })
        .collect();

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        let mesh = convert_mesh(model.name, model.mesh, materials.len())?;
        if mesh.indices.is_empty() {
            tracing::debug!(mesh = %mesh.name, "skipping mesh without faces");
            continue;
        }
        meshes.push(mesh);
    }
    if meshes.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }

    let model = ModelData { meshes, materials };
    let (min, max) = model.bounds().unwrap_or_default();
    tracing::info!(
        path = %path.display(),
        meshes = model.meshes.len(),
        materials = model.materials.len(),
        vertices = model.vertex_count(),
        triangles = model.triangle_count(),
        ?min,
        ?max,
        "model loaded"
    );
    Ok(model)
}

/// Decodes an image file into 8-bit RGBA.
pub fn load_texture(path: impl AsRef<Path>) -> Result<TextureData, AssetError> {
    let path = path.as_ref();
    let image = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    tracing::debug!(path = %path.display(), width, height, "texture decoded");
    Ok(TextureData {
        width,
        height,
        rgba: image.into_raw(),
    })
}

fn convert_mesh(
    name: String,
    mesh: tobj::Mesh,
    material_count: usize,
) -> Result<MeshData, AssetError> {
    let count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == count * 3;
    let has_uvs = mesh.texcoords.len() == count * 2;

    let vertices = (0..count)
        .map(|i| {
            let p = &mesh.positions[i * 3..i * 3 + 3];
            let normal = if has_normals {
                let n = &mesh.normals[i * 3..i * 3 + 3];
                [n[0], n[1], n[2]]
            } else {
                [0.0; 3]
            };
            // OBJ puts v = 0 at the bottom of the image.
            let uv = if has_uvs {
                [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0; 2]
            };
            Vertex {
                position: [p[0], p[1], p[2]],
                normal,
                uv,
            }
        })
        .collect();

    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= count) {
        return Err(AssetError::IndexOutOfRange {
            mesh: name,
            index,
            vertices: count,
        });
    }

    let material = match mesh.material_id {
        Some(id) if id >= material_count => {
            tracing::warn!(mesh = %name, material = id, "material index out of range, ignoring");
            None
        }
        other => other,
    };

    Ok(MeshData {
        name,
        vertices,
        indices: mesh.indices,
        material,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const QUAD_OBJ: &str = "mtllib quad.mtl
o quad
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl wood
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    fn write_png(path: &Path) {
        image::RgbaImage::from_pixel(2, 3, image::Rgba([200, 100, 50, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn loads_quad_with_texture() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(dir.path().join("quad.mtl"), "newmtl wood\nKd 1 1 1\nmap_Kd wood.png\n").unwrap();
        write_png(&dir.path().join("wood.png"));

        let model = load_obj(dir.path().join("quad.obj")).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);

        let material = model.material_of(mesh).unwrap();
        assert_eq!(material.name, "wood");
        let texture = material.diffuse.as_ref().unwrap();
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(&texture.rgba[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn missing_texture_falls_back_to_untextured() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(dir.path().join("quad.mtl"), "newmtl wood\nmap_Kd nowhere.png\n").unwrap();

        let model = load_obj(dir.path().join("quad.obj")).unwrap();
        assert_eq!(model.materials.len(), 1);
        assert!(model.materials[0].diffuse.is_none());
    }

    #[test]
    fn missing_material_library_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();

        let model = load_obj(dir.path().join("quad.obj")).unwrap();
        assert!(model.materials.is_empty());
        assert!(model.material_of(&model.meshes[0]).is_none());
    }

    #[test]
    fn shared_texture_is_decoded_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(
            dir.path().join("quad.mtl"),
            "newmtl wood\nmap_Kd tex/wood.png\nnewmtl oak\nmap_Kd tex\\wood.png\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("tex")).unwrap();
        write_png(&dir.path().join("tex/wood.png"));

        let model = load_obj(dir.path().join("quad.obj")).unwrap();
        let a = model.materials[0].diffuse.as_ref().unwrap();
        let b = model.materials[1].diffuse.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_obj(dir.path().join("nope.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
    }

    #[test]
    fn model_without_faces_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("points.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        let err = load_obj(dir.path().join("points.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Empty { .. }));
    }

    #[test]
    fn unreadable_texture_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        fs::write(&bogus, b"not a png").unwrap();
        match load_texture(&bogus).unwrap_err() {
            AssetError::Image { path, .. } => assert_eq!(path, bogus),
            other => panic!("unexpected error: {other}"),
        }
    }
}
