//! Shared value types used across the viewer crates.

mod types;

pub use types::{ModelTransform, ResizePolicy, Viewport};
