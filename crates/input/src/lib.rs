//! Input vocabulary shared by event sources and the frame loop.
//!
//! Windowing layers translate their native events into [`InputEvent`]s. The
//! frame loop never sees raw platform events.

pub mod event;

pub use event::{InputEvent, KeyState, MouseButton};
