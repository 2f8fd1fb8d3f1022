//! In-memory device and shader backend that record every command in order.
//!
//! Shader stages "compile" when they declare their entry point attribute
//! (`@vertex` / `@fragment`) and their braces and parentheses balance, which
//! is enough to exercise the program lifecycle without a GPU.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use modelview_common::Viewport;
use modelview_shader::{
    ProgramId, ProgramLayout, ShaderBackend, ShaderProgram, ShaderStage, UniformLocation,
    UniformValue,
};

use crate::device::{GpuError, GraphicsDevice};

/// One recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CompileStage(ShaderStage),
    Link,
    ReleaseStage(ShaderStage),
    UseProgram(ProgramId),
    SetUniform { name: String, value: UniformValue },
    Clear([f32; 4]),
    Draw { program: ProgramId, model: String },
    Present,
    Resize(Viewport),
}

impl Command {
    pub fn is_draw(&self) -> bool {
        matches!(self, Command::Draw { .. })
    }
}

#[derive(Debug, Default)]
struct CommandLog {
    commands: Mutex<Vec<Command>>,
}

impl CommandLog {
    fn lock(&self) -> MutexGuard<'_, Vec<Command>> {
        self.commands.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, command: Command) {
        self.lock().push(command);
    }
}

/// A "linked" program: remembers its layout so writes can be logged by name.
#[derive(Debug, Clone)]
pub struct RecordedProgram {
    layout: ProgramLayout,
}

impl RecordedProgram {
    fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        let block = &self.layout.uniforms;
        block
            .names()
            .find(|name| block.location(name).is_some_and(|l| l.offset == location.offset))
    }
}

/// Shader backend half of the recording pair.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: Arc<CommandLog>,
    active: Mutex<Option<ProgramId>>,
    link_failure: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every link attempt fails with `log`.
    pub fn failing_link(log: impl Into<String>) -> Self {
        Self {
            link_failure: Some(log.into()),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().clone()
    }
}

impl ShaderBackend for RecordingBackend {
    type Stage = ShaderStage;
    type Program = RecordedProgram;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<ShaderStage, String> {
        self.log.push(Command::CompileStage(stage));
        let attribute = match stage {
            ShaderStage::Vertex => "@vertex",
            ShaderStage::Fragment => "@fragment",
        };
        if !source.contains(attribute) {
            return Err(format!("error: no {attribute} entry point declared"));
        }
        let mut depth: Vec<char> = Vec::new();
        for (line_no, line) in source.lines().enumerate() {
            for c in line.chars() {
                match c {
                    '{' | '(' => depth.push(c),
                    '}' | ')' => {
                        let open = if c == '}' { '{' } else { '(' };
                        if depth.pop() != Some(open) {
                            return Err(format!("error:{}: unexpected `{c}`", line_no + 1));
                        }
                    }
                    _ => {}
                }
            }
        }
        if let Some(open) = depth.last() {
            return Err(format!("error: unclosed `{open}` at end of input"));
        }
        Ok(stage)
    }

    fn link(
        &self,
        vertex: &ShaderStage,
        fragment: &ShaderStage,
        layout: &ProgramLayout,
    ) -> Result<RecordedProgram, String> {
        self.log.push(Command::Link);
        if let Some(log) = &self.link_failure {
            return Err(log.clone());
        }
        if *vertex != ShaderStage::Vertex || *fragment != ShaderStage::Fragment {
            return Err("stages attached in the wrong slots".into());
        }
        Ok(RecordedProgram {
            layout: layout.clone(),
        })
    }

    fn release_stage(&self, stage: ShaderStage) {
        self.log.push(Command::ReleaseStage(stage));
    }

    fn validate(&self, program: &RecordedProgram) -> Option<String> {
        program
            .layout
            .uniforms
            .is_empty()
            .then(|| "program declares no uniforms".to_string())
    }

    fn use_program(&self, id: ProgramId, _program: &RecordedProgram) {
        self.log.push(Command::UseProgram(id));
        *self.active.lock().unwrap_or_else(|p| p.into_inner()) = Some(id);
    }

    fn active_program(&self) -> Option<ProgramId> {
        *self.active.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn write_uniform(
        &self,
        program: &RecordedProgram,
        location: UniformLocation,
        value: &UniformValue,
    ) {
        let name = program.uniform_name(location).unwrap_or("?").to_string();
        self.log.push(Command::SetUniform {
            name,
            value: *value,
        });
    }
}

/// Model stand-in drawn by [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedModel {
    pub name: String,
}

impl RecordedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Device half of the recording pair. Shares one command log with its backend.
#[derive(Debug)]
pub struct RecordingDevice {
    backend: Arc<RecordingBackend>,
    viewport: Viewport,
    in_frame: bool,
    failures: VecDeque<(&'static str, GpuError)>,
    deferred: Vec<GpuError>,
}

impl RecordingDevice {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_backend(viewport, RecordingBackend::new())
    }

    pub fn with_backend(viewport: Viewport, backend: RecordingBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            viewport,
            in_frame: false,
            failures: VecDeque::new(),
            deferred: Vec::new(),
        }
    }

    pub fn backend(&self) -> Arc<RecordingBackend> {
        self.backend.clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.backend.commands()
    }

    /// Makes the next call named `call` (`"resize"`, `"clear"`,
    /// `"draw_model"` or `"present"`) fail with `error` instead of being
    /// recorded.
    pub fn fail_next(&mut self, call: &'static str, error: GpuError) {
        self.failures.push_back((call, error));
    }

    /// Queues an error for the next [`GraphicsDevice::take_errors`].
    pub fn defer_error(&mut self, error: GpuError) {
        self.deferred.push(error);
    }

    fn injected(&mut self, call: &'static str) -> Result<(), GpuError> {
        match self.failures.iter().position(|(c, _)| *c == call) {
            Some(index) => match self.failures.remove(index) {
                Some((_, error)) => Err(error),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    type Backend = RecordingBackend;
    type Model = RecordedModel;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), GpuError> {
        self.viewport = viewport;
        self.injected("resize")?;
        self.backend.log.push(Command::Resize(viewport));
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), GpuError> {
        self.injected("clear")?;
        self.in_frame = true;
        self.backend.log.push(Command::Clear(color));
        Ok(())
    }

    fn draw_model(
        &mut self,
        program: &ShaderProgram<RecordingBackend>,
        model: &RecordedModel,
    ) -> Result<(), GpuError> {
        self.injected("draw_model")?;
        if !self.in_frame {
            return Err(GpuError::NoFrame("draw_model"));
        }
        if !program.is_active() {
            return Err(GpuError::Api {
                call: "draw_model",
                file: file!(),
                line: line!(),
                message: format!("{} is not the active program", program.id()),
            });
        }
        self.backend.log.push(Command::Draw {
            program: program.id(),
            model: model.name.clone(),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), GpuError> {
        if !self.in_frame {
            return Err(GpuError::NoFrame("present"));
        }
        self.in_frame = false;
        self.injected("present")?;
        self.backend.log.push(Command::Present);
        Ok(())
    }

    fn take_errors(&mut self) -> Vec<GpuError> {
        std::mem::take(&mut self.deferred)
    }
}
