use std::fmt;
use std::path::PathBuf;

/// The two programmable stages a program is linked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from building a shader program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read {stage} shader {path}: {source}")]
    Io {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader source is empty")]
    EmptySource { stage: ShaderStage },
    #[error("{stage} shader compilation failed:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program link failed:\n{log}")]
    Link { log: String },
}

impl ShaderError {
    /// The stage at fault, if the error is tied to one.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            ShaderError::Io { stage, .. }
            | ShaderError::EmptySource { stage }
            | ShaderError::Compile { stage, .. } => Some(*stage),
            ShaderError::Link { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_stage() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: "unexpected token".into(),
        };
        assert_eq!(err.stage(), Some(ShaderStage::Fragment));
        assert!(err.to_string().starts_with("fragment shader compilation failed"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn link_error_has_no_stage() {
        let err = ShaderError::Link { log: "mismatch".into() };
        assert_eq!(err.stage(), None);
    }
}
