//! CPU-side model data for the viewer.
//!
//! Models are loaded once at startup into plain vertex/index arrays plus
//! decoded RGBA textures. Nothing here touches the GPU; the render backend
//! uploads a [`ModelData`] as a whole.

mod error;
mod model;
mod obj;
mod primitive;

pub use error::AssetError;
pub use model::{MaterialData, MeshData, ModelData, TextureData, Vertex};
pub use obj::{load_obj, load_texture};
pub use primitive::cube;
