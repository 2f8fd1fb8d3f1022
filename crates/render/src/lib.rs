//! Rendering adapter: renderer-agnostic device interface.
//!
//! # Invariants
//! - Every GPU-issuing call returns a [`GpuError`] naming its call site.
//! - Per-frame errors are reported, never propagated out of the frame.
//!
//! The [`recording`] module provides an in-memory device and shader backend
//! that log every command, for headless runs and tests.

mod device;
mod diagnostics;
pub mod recording;

pub use device::{GpuError, GraphicsDevice};
pub use diagnostics::{Diagnostics, FrameDiagnostic};
