use std::path::PathBuf;

/// Errors from asset import.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load model {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to load texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("model {path} contains no triangles")]
    Empty { path: PathBuf },
    #[error("mesh {mesh}: index {index} out of range for {vertices} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertices: usize,
    },
}
