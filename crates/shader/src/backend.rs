use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::ShaderStage;
use crate::layout::{ProgramLayout, UniformLocation, UniformValue};

static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique program handle. Zero is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(u32);

impl ProgramId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// Thin command layer over the GPU API used to build and drive programs.
///
/// Error strings returned by `compile_stage` and `link` are the backend's
/// diagnostic log, passed through to the caller untouched.
pub trait ShaderBackend {
    /// A compiled but unlinked stage.
    type Stage;
    /// A linked program plus whatever storage backs its uniforms.
    type Program;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::Stage, String>;

    fn link(
        &self,
        vertex: &Self::Stage,
        fragment: &Self::Stage,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, String>;

    /// Frees a stage object once it is no longer needed.
    fn release_stage(&self, stage: Self::Stage);

    /// Advisory check of a linked program. Returned messages are diagnostics
    /// only and never make program creation fail.
    fn validate(&self, program: &Self::Program) -> Option<String>;

    fn use_program(&self, id: ProgramId, program: &Self::Program);

    fn active_program(&self) -> Option<ProgramId>;

    fn write_uniform(&self, program: &Self::Program, location: UniformLocation, value: &UniformValue);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_non_zero() {
        let a = ProgramId::next();
        let b = ProgramId::next();
        assert_ne!(a, b);
        assert_ne!(a.get(), 0);
        assert!(b.to_string().starts_with("program#"));
    }
}
