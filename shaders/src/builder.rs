use std::fmt;

use gl::Adapter;
use scopeguard::ScopeGuard;

use crate::{FsSource, ShaderProgram, SourceStore, read_info_log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderKind {
    pub fn gl_enum(self) -> gl::GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
            Self::Geometry => gl::GEOMETRY_SHADER,
            Self::TessControl => gl::TESS_CONTROL_SHADER,
            Self::TessEvaluation => gl::TESS_EVALUATION_SHADER,
            Self::Compute => gl::COMPUTE_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
            Self::TessControl => "tessellation control",
            Self::TessEvaluation => "tessellation evaluation",
            Self::Compute => "compute",
        })
    }
}

/// every compile and link diagnostic of a failed build, in stage order.
///
/// each failing stage contributes its info log followed by a newline; a link failure contributes
/// the program info log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    log: String,
}

impl CompileError {
    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn into_log(self) -> String {
        self.log
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.log)
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug)]
struct Stage {
    text: String,
    kind: ShaderKind,
}

/// collects shader stages and compiles them into a [`ShaderProgram`].
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// let gl_api = unsafe { gl::Api::load_from_libgl()? };
/// let program = shaders::ShaderBuilder::new(&gl_api)
///     .and_stage("vertex_default.vert", shaders::ShaderKind::Vertex)
///     .and_stage("fragment_default.frag", shaders::ShaderKind::Fragment)
///     .compile()?;
/// program.use_program();
/// # Ok(())
/// # }
/// ```
pub struct ShaderBuilder<'gl, A: Adapter = gl::Api, S: SourceStore = FsSource> {
    gl_api: &'gl A,
    source: S,
    stages: Vec<Stage>,
}

impl<'gl, A: Adapter> ShaderBuilder<'gl, A> {
    /// loads stages from the `shaders` directory.
    pub fn new(gl_api: &'gl A) -> Self {
        Self::with_source(gl_api, FsSource::default())
    }
}

impl<'gl, A: Adapter, S: SourceStore> ShaderBuilder<'gl, A, S> {
    pub fn with_source(gl_api: &'gl A, source: S) -> Self {
        Self {
            gl_api,
            source,
            stages: Vec::new(),
        }
    }

    /// loads `name` from the source store right away and appends it as a stage of `kind`.
    ///
    /// a source that cannot be loaded is added as empty text and reported by `compile`.
    pub fn add_stage(&mut self, name: &str, kind: ShaderKind) -> &mut Self {
        let text = self.source.load(name);
        self.add_source(text, kind)
    }

    pub fn and_stage(mut self, name: &str, kind: ShaderKind) -> Self {
        self.add_stage(name, kind);
        self
    }

    /// appends already loaded text as a stage of `kind`.
    pub fn add_source(&mut self, text: impl Into<String>, kind: ShaderKind) -> &mut Self {
        self.stages.push(Stage {
            text: text.into(),
            kind,
        });
        self
    }

    pub fn and_source(mut self, text: impl Into<String>, kind: ShaderKind) -> Self {
        self.add_source(text, kind);
        self
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// compiles every stage, then links them if all compiled.
    ///
    /// all stages are compiled even after one fails so that the error carries every diagnostic.
    /// shader objects never outlive this call; on failure no program does either.
    pub fn compile(&self) -> Result<ShaderProgram<'gl, A>, CompileError> {
        let gl_api = self.gl_api;
        let mut errors = String::new();

        let mut created = scopeguard::guard(
            Vec::with_capacity(self.stages.len()),
            |created: Vec<gl::Shader>| {
                for shader in created {
                    unsafe { gl_api.delete_shader(shader) };
                }
            },
        );
        let mut compiled = Vec::with_capacity(self.stages.len());

        for stage in self.stages.iter() {
            let shader = match unsafe { gl_api.create_shader(stage.kind.gl_enum()) } {
                Ok(shader) => shader,
                Err(err) => {
                    errors.push_str(&format!("{err:#}\n"));
                    continue;
                }
            };
            created.push(shader);

            unsafe {
                gl_api.shader_source(shader, &stage.text);
                gl_api.compile_shader(shader);
            }

            let compile_status = unsafe { gl_api.get_shaderiv(shader, gl::COMPILE_STATUS) };
            if compile_status == gl::FALSE as gl::GLint {
                let info_log =
                    read_info_log(|buf| unsafe { gl_api.get_shader_info_log(shader, buf) });
                log::debug!("{} stage failed to compile", stage.kind);
                if info_log.is_empty() {
                    errors.push_str(&format!("{} stage failed to compile", stage.kind));
                } else {
                    errors.push_str(&info_log);
                }
                errors.push('\n');
            } else {
                compiled.push(shader);
            }
        }

        if !errors.is_empty() {
            log::warn!("could not compile shader stages:\n{errors}");
            return Err(CompileError { log: errors });
        }

        let program = match unsafe { gl_api.create_program() } {
            Ok(program) => program,
            Err(err) => {
                return Err(CompileError {
                    log: format!("{err:#}"),
                });
            }
        };
        let program = scopeguard::guard(program, |program| unsafe {
            gl_api.delete_program(program)
        });

        unsafe {
            for &shader in compiled.iter() {
                gl_api.attach_shader(*program, shader);
            }
            gl_api.link_program(*program);
        }

        let link_status = unsafe { gl_api.get_programiv(*program, gl::LINK_STATUS) };
        if link_status == gl::FALSE as gl::GLint {
            let info_log =
                read_info_log(|buf| unsafe { gl_api.get_program_info_log(*program, buf) });
            if info_log.is_empty() {
                errors.push_str("program failed to link");
            } else {
                errors.push_str(&info_log);
            }
            log::warn!("could not link program {program}:\n{errors}", program = *program);
            return Err(CompileError { log: errors });
        }

        unsafe {
            for &shader in compiled.iter() {
                gl_api.detach_shader(*program, shader);
            }
        }

        let program = ScopeGuard::into_inner(program);
        log::debug!(
            "linked program {program} from {} stages",
            self.stages.len()
        );
        Ok(ShaderProgram::from_linked(gl_api, program))
    }
}
