//! recording stand-in for a gl driver (no gpu or context required).
//!
//! compile, link, info log and uniform semantics follow gl closely enough for the pipeline and
//! program code to be exercised end to end:
//! - a shader fails to compile when its source is blank or contains `#error <message>` lines,
//! - a program fails to link when it has nothing attached, when an attached shader did not compile
//!   or when the mock was created with [`MockApi::with_link_error`],
//! - `uniform <type> <name>;` declarations become active uniforms after linking, unless the name is
//!   never referenced again (the compiler would have optimized it out).

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::num::NonZero;

use anyhow::anyhow;
use gl::{Adapter, GLdouble, GLenum, GLfloat, GLint, GLuint, Program, Shader};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AttachShader(GLuint, GLuint),
    CompileShader(GLuint),
    CreateProgram,
    CreateShader(GLenum),
    DeleteProgram(GLuint),
    DeleteShader(GLuint),
    DetachShader(GLuint, GLuint),
    GetProgramInfoLog(GLuint, usize),
    GetProgramiv(GLuint, GLenum),
    GetShaderInfoLog(GLuint, usize),
    GetShaderiv(GLuint, GLenum),
    GetUniformLocation(GLuint, String),
    GetUniformfv(GLuint, GLint),
    LinkProgram(GLuint),
    ProgramUniform {
        program: GLuint,
        location: GLint,
        suffix: &'static str,
        values: Vec<f64>,
    },
    ShaderSource(GLuint),
    UseProgram(GLuint),
}

#[derive(Debug)]
struct MockShader {
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug)]
struct MockUniform {
    name: String,
    value: Vec<f64>,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    // index is the location
    uniforms: Vec<MockUniform>,
}

#[derive(Debug, Default)]
struct State {
    next_id: GLuint,
    shaders: HashMap<GLuint, MockShader>,
    programs: HashMap<GLuint, MockProgram>,
    current_program: GLuint,
    calls: Vec<Call>,
}

impl State {
    fn next_id(&mut self) -> GLuint {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MockApi {
    state: RefCell<State>,
    link_error: Option<String>,
    fail_create_shader: bool,
}

impl MockApi {
    pub fn new() -> Self {
        crate::logger::init(log::LevelFilter::Trace);
        Self::default()
    }

    pub fn with_link_error(log: &str) -> Self {
        Self {
            link_error: Some(log.to_string()),
            ..Self::new()
        }
    }

    pub fn with_failing_create_shader() -> Self {
        Self {
            fail_create_shader: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|call| pred(call)).count()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> Vec<GLuint> {
        let mut ids: Vec<_> = self.state.borrow().programs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().current_program
    }

    pub fn attached(&self, program: GLuint) -> Vec<GLuint> {
        self.state.borrow().programs[&program].attached.clone()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn write_uniform(
        &self,
        program: Program,
        location: GLint,
        suffix: &'static str,
        values: Vec<f64>,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ProgramUniform {
            program: program.get(),
            location,
            suffix,
            values: values.clone(),
        });
        let uniform = state
            .programs
            .get_mut(&program.get())
            .and_then(|p| p.uniforms.get_mut(location as usize))
            .unwrap_or_else(|| panic!("no uniform at {location} in program {program}"));
        uniform.value = values;
    }
}

fn compile_source(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }
    let errors: Vec<String> = source
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let message = line.trim().strip_prefix("#error")?;
            Some(format!("0:{}(1): error: {}", i + 1, message.trim()))
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

fn uniform_declarations(source: &str) -> Vec<&str> {
    source
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("uniform ")?;
            let mut words = rest.trim_end_matches(';').split_whitespace();
            let _ty = words.next()?;
            words.next()
        })
        .collect()
}

fn is_referenced(sources: &[&str], name: &str) -> bool {
    sources
        .iter()
        .flat_map(|source| source.lines())
        .filter(|line| !line.trim().starts_with("uniform "))
        .any(|line| line.contains(name))
}

// gl writes at most buf.len() - 1 bytes plus a terminator and reports the count without it.
fn write_info_log(log: &str, buf: &mut [u8]) -> usize {
    if buf.is_empty() {
        return 0;
    }
    let n = log.len().min(buf.len() - 1);
    buf[..n].copy_from_slice(&log.as_bytes()[..n]);
    buf[n] = 0;
    n
}

impl Adapter for MockApi {
    unsafe fn attach_shader(&self, program: Program, shader: Shader) {
        self.record(Call::AttachShader(program.get(), shader.get()));
        let mut state = self.state.borrow_mut();
        assert!(state.shaders.contains_key(&shader.get()), "attaching deleted shader");
        state
            .programs
            .get_mut(&program.get())
            .expect("attaching to deleted program")
            .attached
            .push(shader.get());
    }

    unsafe fn compile_shader(&self, shader: Shader) {
        self.record(Call::CompileShader(shader.get()));
        let mut state = self.state.borrow_mut();
        let shader = state.shaders.get_mut(&shader.get()).expect("compiling deleted shader");
        match compile_source(&shader.source) {
            Ok(()) => {
                shader.compiled = true;
                shader.log.clear();
            }
            Err(log) => {
                shader.compiled = false;
                shader.log = log;
            }
        }
    }

    unsafe fn create_program(&self) -> anyhow::Result<Program> {
        self.record(Call::CreateProgram);
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.programs.insert(id, MockProgram::default());
        Ok(NonZero::new(id).expect("ids start at 1"))
    }

    unsafe fn create_shader(&self, r#type: GLenum) -> anyhow::Result<Shader> {
        self.record(Call::CreateShader(r#type));
        if self.fail_create_shader {
            return Err(anyhow!("could not create shader (type 0x{:x})", r#type));
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.shaders.insert(
            id,
            MockShader {
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(NonZero::new(id).expect("ids start at 1"))
    }

    unsafe fn delete_program(&self, program: Program) {
        self.record(Call::DeleteProgram(program.get()));
        let mut state = self.state.borrow_mut();
        assert!(
            state.programs.remove(&program.get()).is_some(),
            "program {program} deleted twice"
        );
        if state.current_program == program.get() {
            state.current_program = 0;
        }
    }

    unsafe fn delete_shader(&self, shader: Shader) {
        self.record(Call::DeleteShader(shader.get()));
        assert!(
            self.state.borrow_mut().shaders.remove(&shader.get()).is_some(),
            "shader {shader} deleted twice"
        );
    }

    unsafe fn detach_shader(&self, program: Program, shader: Shader) {
        self.record(Call::DetachShader(program.get(), shader.get()));
        let mut state = self.state.borrow_mut();
        let program = state
            .programs
            .get_mut(&program.get())
            .expect("detaching from deleted program");
        program.attached.retain(|&id| id != shader.get());
    }

    unsafe fn get_program_info_log(&self, program: Program, buf: &mut [u8]) -> usize {
        self.record(Call::GetProgramInfoLog(program.get(), buf.len()));
        write_info_log(&self.state.borrow().programs[&program.get()].log, buf)
    }

    unsafe fn get_programiv(&self, program: Program, pname: GLenum) -> GLint {
        self.record(Call::GetProgramiv(program.get(), pname));
        let state = self.state.borrow();
        let program = &state.programs[&program.get()];
        match pname {
            gl::LINK_STATUS => program.linked as GLint,
            gl::INFO_LOG_LENGTH => program.log.len() as GLint,
            gl::ATTACHED_SHADERS => program.attached.len() as GLint,
            other => panic!("unsupported program parameter 0x{other:x}"),
        }
    }

    unsafe fn get_shader_info_log(&self, shader: Shader, buf: &mut [u8]) -> usize {
        self.record(Call::GetShaderInfoLog(shader.get(), buf.len()));
        write_info_log(&self.state.borrow().shaders[&shader.get()].log, buf)
    }

    unsafe fn get_shaderiv(&self, shader: Shader, pname: GLenum) -> GLint {
        self.record(Call::GetShaderiv(shader.get(), pname));
        let state = self.state.borrow();
        let shader = &state.shaders[&shader.get()];
        match pname {
            gl::COMPILE_STATUS => shader.compiled as GLint,
            gl::INFO_LOG_LENGTH => shader.log.len() as GLint,
            other => panic!("unsupported shader parameter 0x{other:x}"),
        }
    }

    unsafe fn get_uniform_location(&self, program: Program, name: &CStr) -> Option<GLint> {
        let name = name.to_str().expect("uniform names are ascii");
        self.record(Call::GetUniformLocation(program.get(), name.to_string()));
        let state = self.state.borrow();
        let program = state.programs.get(&program.get())?;
        if !program.linked {
            return None;
        }
        program
            .uniforms
            .iter()
            .position(|uniform| uniform.name == name)
            .map(|location| location as GLint)
    }

    unsafe fn get_uniformfv(&self, program: Program, location: GLint, params: &mut [GLfloat]) {
        self.record(Call::GetUniformfv(program.get(), location));
        let state = self.state.borrow();
        let uniform = &state.programs[&program.get()].uniforms[location as usize];
        for (param, value) in params.iter_mut().zip(&uniform.value) {
            *param = *value as GLfloat;
        }
    }

    unsafe fn link_program(&self, program: Program) {
        self.record(Call::LinkProgram(program.get()));
        let mut state = self.state.borrow_mut();
        let State {
            shaders, programs, ..
        } = &mut *state;
        let program = programs.get_mut(&program.get()).expect("linking deleted program");

        let attached: Vec<&MockShader> = program.attached.iter().map(|id| &shaders[id]).collect();
        let result = if let Some(log) = &self.link_error {
            Err(log.clone())
        } else if attached.is_empty() {
            Err("error: no shaders attached to the program".to_string())
        } else if attached.iter().any(|shader| !shader.compiled) {
            Err("error: linking with uncompiled/unspecialized shader".to_string())
        } else {
            Ok(())
        };

        program.uniforms.clear();
        match result {
            Ok(()) => {
                let sources: Vec<&str> = attached.iter().map(|s| s.source.as_str()).collect();
                for name in sources.iter().flat_map(|&source| uniform_declarations(source)) {
                    let known = program.uniforms.iter().any(|u| u.name == name);
                    if !known && is_referenced(&sources, name) {
                        program.uniforms.push(MockUniform {
                            name: name.to_string(),
                            value: Vec::new(),
                        });
                    }
                }
                program.linked = true;
                program.log.clear();
            }
            Err(log) => {
                program.linked = false;
                program.log = log;
            }
        }
    }

    unsafe fn program_uniform_1f(&self, program: Program, location: GLint, v0: GLfloat) {
        self.write_uniform(program, location, "1f", vec![v0.into()]);
    }

    unsafe fn program_uniform_2f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
    ) {
        self.write_uniform(program, location, "2f", vec![v0.into(), v1.into()]);
    }

    unsafe fn program_uniform_3f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
    ) {
        self.write_uniform(program, location, "3f", vec![v0.into(), v1.into(), v2.into()]);
    }

    unsafe fn program_uniform_4f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
        v3: GLfloat,
    ) {
        let values = vec![v0.into(), v1.into(), v2.into(), v3.into()];
        self.write_uniform(program, location, "4f", values);
    }

    unsafe fn program_uniform_1i(&self, program: Program, location: GLint, v0: GLint) {
        self.write_uniform(program, location, "1i", vec![v0.into()]);
    }

    unsafe fn program_uniform_2i(&self, program: Program, location: GLint, v0: GLint, v1: GLint) {
        self.write_uniform(program, location, "2i", vec![v0.into(), v1.into()]);
    }

    unsafe fn program_uniform_3i(
        &self,
        program: Program,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
    ) {
        self.write_uniform(program, location, "3i", vec![v0.into(), v1.into(), v2.into()]);
    }

    unsafe fn program_uniform_4i(
        &self,
        program: Program,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
        v3: GLint,
    ) {
        let values = vec![v0.into(), v1.into(), v2.into(), v3.into()];
        self.write_uniform(program, location, "4i", values);
    }

    unsafe fn program_uniform_1ui(&self, program: Program, location: GLint, v0: GLuint) {
        self.write_uniform(program, location, "1ui", vec![v0.into()]);
    }

    unsafe fn program_uniform_2ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
    ) {
        self.write_uniform(program, location, "2ui", vec![v0.into(), v1.into()]);
    }

    unsafe fn program_uniform_3ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
    ) {
        self.write_uniform(program, location, "3ui", vec![v0.into(), v1.into(), v2.into()]);
    }

    unsafe fn program_uniform_4ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
        v3: GLuint,
    ) {
        let values = vec![v0.into(), v1.into(), v2.into(), v3.into()];
        self.write_uniform(program, location, "4ui", values);
    }

    unsafe fn program_uniform_1d(&self, program: Program, location: GLint, v0: GLdouble) {
        self.write_uniform(program, location, "1d", vec![v0]);
    }

    unsafe fn program_uniform_2d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
    ) {
        self.write_uniform(program, location, "2d", vec![v0, v1]);
    }

    unsafe fn program_uniform_3d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
    ) {
        self.write_uniform(program, location, "3d", vec![v0, v1, v2]);
    }

    unsafe fn program_uniform_4d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
        v3: GLdouble,
    ) {
        self.write_uniform(program, location, "4d", vec![v0, v1, v2, v3]);
    }

    unsafe fn shader_source(&self, shader: Shader, source: &str) {
        self.record(Call::ShaderSource(shader.get()));
        self.state
            .borrow_mut()
            .shaders
            .get_mut(&shader.get())
            .expect("sourcing deleted shader")
            .source = source.to_string();
    }

    unsafe fn use_program(&self, program: Option<Program>) {
        let id = program.map_or(0, |p| p.get());
        self.record(Call::UseProgram(id));
        let mut state = self.state.borrow_mut();
        if id != 0 {
            assert!(
                state.programs.get(&id).is_some_and(|p| p.linked),
                "using program {id} that is not linked"
            );
        }
        state.current_program = id;
    }
}
