use std::path::Path;

use crate::error::{ShaderError, ShaderStage};

/// Reads one stage's source text from disk.
///
/// A missing or unreadable file is an error rather than an empty source.
pub fn load_source(stage: ShaderStage, path: impl AsRef<Path>) -> Result<String, ShaderError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(%stage, path = %path.display(), bytes = source.len(), "loaded shader source");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "@vertex fn vs_main() {{}}").unwrap();
        let src = load_source(ShaderStage::Vertex, file.path()).unwrap();
        assert!(src.contains("vs_main"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_source(ShaderStage::Fragment, dir.path().join("nope.wgsl")).unwrap_err();
        assert!(matches!(err, ShaderError::Io { stage: ShaderStage::Fragment, .. }));
        assert!(err.to_string().contains("nope.wgsl"));
    }
}
