use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::backend::{ProgramId, ShaderBackend};
use crate::error::{ShaderError, ShaderStage};
use crate::layout::{ProgramLayout, UniformLocation, UniformValue};
use crate::source::load_source;

/// A linked vertex + fragment program with typed, name-addressed uniforms.
///
/// Holding a `ShaderProgram` means the program compiled and linked: there is
/// no half-built state to check for. GPU resources are freed on drop.
pub struct ShaderProgram<B: ShaderBackend> {
    id: ProgramId,
    label: String,
    backend: Arc<B>,
    raw: B::Program,
    layout: ProgramLayout,
}

impl<B: ShaderBackend> ShaderProgram<B> {
    /// Compiles both stages, links them and releases the stage objects.
    pub fn create(
        backend: Arc<B>,
        label: impl Into<String>,
        vertex_source: &str,
        fragment_source: &str,
        layout: ProgramLayout,
    ) -> Result<Self, ShaderError> {
        let label = label.into();
        let _span = tracing::debug_span!("shader_program", program = %label).entered();

        for (stage, source) in [
            (ShaderStage::Vertex, vertex_source),
            (ShaderStage::Fragment, fragment_source),
        ] {
            if source.trim().is_empty() {
                tracing::error!(%stage, "shader source is empty");
                return Err(ShaderError::EmptySource { stage });
            }
        }

        let vertex = compile(&*backend, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile(&*backend, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                backend.release_stage(vertex);
                return Err(err);
            }
        };

        let linked = backend.link(&vertex, &fragment, &layout);
        backend.release_stage(vertex);
        backend.release_stage(fragment);

        let raw = linked.map_err(|log| {
            tracing::error!("program link failed:\n{log}");
            ShaderError::Link { log }
        })?;

        if let Some(message) = backend.validate(&raw) {
            tracing::warn!("program validation reported:\n{message}");
        }

        let id = ProgramId::next();
        tracing::info!(%id, uniforms = layout.uniforms.len(), "shader program linked");
        Ok(Self {
            id,
            label,
            backend,
            raw,
            layout,
        })
    }

    /// Loads both stage sources from disk, then behaves like [`Self::create`].
    pub fn from_files(
        backend: Arc<B>,
        label: impl Into<String>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        layout: ProgramLayout,
    ) -> Result<Self, ShaderError> {
        let vertex = load_source(ShaderStage::Vertex, vertex_path)?;
        let fragment = load_source(ShaderStage::Fragment, fragment_path)?;
        Self::create(backend, label, &vertex, &fragment, layout)
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    /// The backend's linked program object.
    pub fn raw(&self) -> &B::Program {
        &self.raw
    }

    /// Makes this the program used by subsequent uniform writes and draws.
    pub fn use_program(&self) {
        self.backend.use_program(self.id, &self.raw);
    }

    pub fn is_active(&self) -> bool {
        self.backend.active_program() == Some(self.id)
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.layout.uniforms.location(name)
    }

    // The setters below expect `use_program` to have been called first.
    // Writes still land in this program's own storage when it is inactive.

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        self.set_uniform(name, UniformValue::Mat4(*value));
    }

    /// Writes a value if `name` resolves to a uniform of the same kind.
    /// Returns whether anything was written.
    pub fn set_uniform(&self, name: &str, value: UniformValue) -> bool {
        let Some(location) = self.uniform_location(name) else {
            tracing::trace!(program = %self.id, uniform = name, "uniform not found");
            return false;
        };
        if location.kind != value.kind() {
            tracing::warn!(
                program = %self.id,
                uniform = name,
                declared = ?location.kind,
                given = ?value.kind(),
                "uniform kind mismatch, value dropped"
            );
            return false;
        }
        if !self.is_active() {
            tracing::warn!(program = %self.id, uniform = name, "uniform set on inactive program");
        }
        self.backend.write_uniform(&self.raw, location, &value);
        true
    }
}

impl<B: ShaderBackend> std::fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

fn compile<B: ShaderBackend>(
    backend: &B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::Stage, ShaderError> {
    backend.compile_stage(stage, source).map_err(|log| {
        tracing::error!(%stage, "shader compilation failed:\n{log}");
        ShaderError::Compile { stage, log }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{UniformBlock, UniformKind};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Compile(ShaderStage),
        Link,
        Release(ShaderStage),
        Validate,
        Use(ProgramId),
        Write(u32, UniformValue),
    }

    /// Rejects any source containing "error"; can be told to fail linking.
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<Call>>,
        active: Mutex<Option<ProgramId>>,
        fail_link: bool,
        validation_note: Option<String>,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl ShaderBackend for FakeBackend {
        type Stage = ShaderStage;
        type Program = ();

        fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<ShaderStage, String> {
            self.log(Call::Compile(stage));
            if source.contains("error") {
                Err(format!("0:1: syntax error in {stage} stage"))
            } else {
                Ok(stage)
            }
        }

        fn link(&self, _: &ShaderStage, _: &ShaderStage, _: &ProgramLayout) -> Result<(), String> {
            self.log(Call::Link);
            if self.fail_link {
                Err("entry point mismatch".into())
            } else {
                Ok(())
            }
        }

        fn release_stage(&self, stage: ShaderStage) {
            self.log(Call::Release(stage));
        }

        fn validate(&self, _: &()) -> Option<String> {
            self.log(Call::Validate);
            self.validation_note.clone()
        }

        fn use_program(&self, id: ProgramId, _: &()) {
            self.log(Call::Use(id));
            *self.active.lock().unwrap() = Some(id);
        }

        fn active_program(&self) -> Option<ProgramId> {
            *self.active.lock().unwrap()
        }

        fn write_uniform(&self, _: &(), location: UniformLocation, value: &UniformValue) {
            self.log(Call::Write(location.offset, *value));
        }
    }

    const VS: &str = "@vertex fn vs_main() {}";
    const FS: &str = "@fragment fn fs_main() {}";

    fn layout() -> ProgramLayout {
        ProgramLayout::new(UniformBlock::new([
            ("model", UniformKind::Mat4),
            ("view", UniformKind::Mat4),
            ("projection", UniformKind::Mat4),
            ("color", UniformKind::Vec3),
            ("shininess", UniformKind::Float),
            ("samples", UniformKind::Int),
            ("lit", UniformKind::Bool),
        ]))
    }

    fn program(backend: &Arc<FakeBackend>) -> ShaderProgram<FakeBackend> {
        ShaderProgram::create(backend.clone(), "test", VS, FS, layout()).unwrap()
    }

    #[test]
    fn create_compiles_links_and_releases_stages() {
        let backend = Arc::new(FakeBackend::default());
        let p = program(&backend);
        assert_eq!(p.label(), "test");
        assert_eq!(
            backend.calls(),
            vec![
                Call::Compile(ShaderStage::Vertex),
                Call::Compile(ShaderStage::Fragment),
                Call::Link,
                Call::Release(ShaderStage::Vertex),
                Call::Release(ShaderStage::Fragment),
                Call::Validate,
            ]
        );
    }

    #[test]
    fn invalid_vertex_source_reports_stage() {
        let backend = Arc::new(FakeBackend::default());
        let err = ShaderProgram::create(backend.clone(), "bad", "syntax error (", FS, layout())
            .unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("syntax error"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Fragment was never attempted, nothing was linked.
        assert_eq!(backend.calls(), vec![Call::Compile(ShaderStage::Vertex)]);
    }

    #[test]
    fn invalid_fragment_releases_compiled_vertex() {
        let backend = Arc::new(FakeBackend::default());
        let err = ShaderProgram::create(backend.clone(), "bad", VS, "error", layout()).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Fragment));
        assert_eq!(
            backend.calls(),
            vec![
                Call::Compile(ShaderStage::Vertex),
                Call::Compile(ShaderStage::Fragment),
                Call::Release(ShaderStage::Vertex),
            ]
        );
    }

    #[test]
    fn link_failure_still_releases_stages() {
        let backend = Arc::new(FakeBackend {
            fail_link: true,
            ..FakeBackend::default()
        });
        let err = ShaderProgram::create(backend.clone(), "bad", VS, FS, layout()).unwrap_err();
        assert!(matches!(err, ShaderError::Link { ref log } if log.contains("mismatch")));
        let calls = backend.calls();
        assert!(calls.contains(&Call::Release(ShaderStage::Vertex)));
        assert!(calls.contains(&Call::Release(ShaderStage::Fragment)));
        assert!(!calls.contains(&Call::Validate));
    }

    #[test]
    fn empty_sources_fail_explicitly() {
        let backend = Arc::new(FakeBackend::default());
        let err = ShaderProgram::create(backend.clone(), "empty", "", "", layout()).unwrap_err();
        assert!(matches!(err, ShaderError::EmptySource { stage: ShaderStage::Vertex }));
        let err = ShaderProgram::create(backend.clone(), "empty", VS, "  \n", layout()).unwrap_err();
        assert!(matches!(err, ShaderError::EmptySource { stage: ShaderStage::Fragment }));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn validation_is_advisory() {
        let backend = Arc::new(FakeBackend {
            validation_note: Some("unused varying".into()),
            ..FakeBackend::default()
        });
        assert!(ShaderProgram::create(backend, "noisy", VS, FS, layout()).is_ok());
    }

    #[test]
    fn programs_get_distinct_ids() {
        let backend = Arc::new(FakeBackend::default());
        let a = program(&backend);
        let b = program(&backend);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn use_program_makes_it_active() {
        let backend = Arc::new(FakeBackend::default());
        let a = program(&backend);
        let b = program(&backend);
        a.use_program();
        assert!(a.is_active());
        assert!(!b.is_active());
        b.use_program();
        assert!(!a.is_active());
    }

    #[test]
    fn setters_write_at_declared_offsets() {
        let backend = Arc::new(FakeBackend::default());
        let p = program(&backend);
        p.use_program();
        let before = backend.calls().len();

        p.set_mat4("view", &Mat4::IDENTITY);
        p.set_vec3("color", Vec3::new(1.0, 0.5, 0.0));
        p.set_float("shininess", 32.0);
        p.set_int("samples", 4);
        p.set_bool("lit", true);

        assert_eq!(
            backend.calls()[before..],
            [
                Call::Write(64, UniformValue::Mat4(Mat4::IDENTITY)),
                Call::Write(192, UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.0))),
                Call::Write(204, UniformValue::Float(32.0)),
                Call::Write(208, UniformValue::Int(4)),
                Call::Write(212, UniformValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn unknown_uniform_is_tolerated() {
        let backend = Arc::new(FakeBackend::default());
        let p = program(&backend);
        p.use_program();
        let before = backend.calls().len();
        assert!(p.uniform_location("nope").is_none());
        assert!(!p.set_uniform("nope", UniformValue::Float(1.0)));
        p.set_mat4("nope", &Mat4::IDENTITY);
        assert_eq!(backend.calls().len(), before);
    }

    #[test]
    fn kind_mismatch_is_dropped() {
        let backend = Arc::new(FakeBackend::default());
        let p = program(&backend);
        p.use_program();
        assert!(!p.set_uniform("model", UniformValue::Float(1.0)));
    }

    #[test]
    fn inactive_program_still_writes_its_own_storage() {
        let backend = Arc::new(FakeBackend::default());
        let p = program(&backend);
        assert!(!p.is_active());
        assert!(p.set_uniform("model", UniformValue::Mat4(Mat4::IDENTITY)));
    }

    #[test]
    fn from_files_reads_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vert.wgsl");
        let fs = dir.path().join("a.frag.wgsl");
        std::fs::write(&vs, VS).unwrap();
        std::fs::write(&fs, FS).unwrap();

        let backend = Arc::new(FakeBackend::default());
        let p = ShaderProgram::from_files(backend, "files", &vs, &fs, layout()).unwrap();
        assert_eq!(p.layout().vertex_entry, "vs_main");
    }

    #[test]
    fn from_files_reports_missing_stage() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vert.wgsl");
        std::fs::write(&vs, VS).unwrap();

        let backend = Arc::new(FakeBackend::default());
        let err = ShaderProgram::from_files(backend.clone(), "files", &vs, dir.path().join("missing"), layout())
            .unwrap_err();
        assert!(matches!(err, ShaderError::Io { stage: ShaderStage::Fragment, .. }));
        assert!(backend.calls().is_empty());
    }
}
