//! Frame loop: timing, input draining, uniform upload, draw submission and
//! presentation, in that order, once per iteration.
//!
//! # Invariants
//! - Input is applied to the camera before anything is rendered.
//! - Commands are issued clear → uniforms → draw → present.
//! - `Terminated` is terminal; no frame is rendered once quit is observed.
//! - Per-frame GPU errors are reported to [`Diagnostics`] and never stop the loop.
//!
//! [`Diagnostics`]: modelview_render::Diagnostics

mod context;
mod state;
pub mod uniforms;

pub use context::{AppContext, EventSource, FrameOutcome, FrameSettings, LightMarker};
pub use state::{FrameState, LoopState};
