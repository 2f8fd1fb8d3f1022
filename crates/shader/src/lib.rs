//! Shader programs built from two independently compiled stages.
//!
//! # Invariants
//! - A [`ShaderProgram`] only exists if both stages compiled and linked.
//! - Intermediate stage objects are released whether linking succeeds or not.
//! - Uniform lookups by unknown name are tolerated and never panic.
//!
//! The GPU API is reached through [`ShaderBackend`], so the lifecycle is the
//! same for the wgpu backend and the in-memory recording backend.

mod backend;
mod error;
mod layout;
mod program;
mod source;

pub use backend::{ProgramId, ShaderBackend};
pub use error::{ShaderError, ShaderStage};
pub use layout::{ProgramLayout, UniformBlock, UniformKind, UniformLocation, UniformValue};
pub use program::ShaderProgram;
pub use source::load_source;
