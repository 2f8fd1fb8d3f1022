//! wgpu render backend.
//!
//! A shader program maps onto a render pipeline plus a uniform buffer laid
//! out by its [`UniformBlock`](modelview_shader::UniformBlock). Stage
//! compilation and pipeline creation run inside validation error scopes so
//! failures come back as logs instead of panics.
//!
//! # Invariants
//! - One frame is in flight at most: `clear` opens it, `present` submits it.
//! - Uniform writes are staged on the queue and land before the frame's draws.

mod backend;
mod context;
mod device;
mod error;
mod model;

pub use backend::{CompiledStage, WgpuProgram, WgpuShaderBackend};
pub use context::GpuContext;
pub use device::WgpuDevice;
pub use error::{SetupError, checked};
pub use model::GpuModel;
