use std::ffi::{CStr, c_char, c_void};
use std::num::NonZero;

use anyhow::Context as _;
use dynlib::DynLib;

use crate::adapter::{Adapter, Program, Shader};
use crate::libgl::*;

macro_rules! trace_call {
    ($($arg:tt)*) => {
        if cfg!(all(feature = "debug", debug_assertions)) {
            log::trace!($($arg)*);
        }
    };
}

pub struct Api {
    lib: Lib,
    // NOTE: keeps libGL mapped for as long as function pointers resolved from it are alive.
    _dynlib: Option<DynLib>,
}

impl Api {
    pub unsafe fn load_with<F>(get_proc_address: F) -> anyhow::Result<Self>
    where
        F: FnMut(*const c_char) -> *mut c_void,
    {
        Ok(Self {
            lib: unsafe { Lib::load_with(get_proc_address) }.context("could not load gl")?,
            _dynlib: None,
        })
    }

    /// resolves functions through glXGetProcAddressARB from the system libGL.
    pub unsafe fn load_from_libgl() -> anyhow::Result<Self> {
        let dynlib = DynLib::open_any(&[c"libGL.so.1", c"libGL.so"])?;

        // NOTE: glx returns a non-null pointer for any name, including ones the driver does not
        // implement; calling those is undefined. this is only sound with a 4.5+ context current.
        let get_proc_address = dynlib
            .lookup::<unsafe extern "C" fn(*const GLubyte) -> *mut c_void>(
                c"glXGetProcAddressARB",
            )?;
        let lib = unsafe {
            Lib::load_with(|procname| get_proc_address(procname as *const GLubyte))
        }
        .context("could not load gl from libGL")?;

        Ok(Self {
            lib,
            _dynlib: Some(dynlib),
        })
    }
}

// dmat4, the largest value a single uniform location holds.
const MAX_UNIFORM_COMPONENTS: usize = 16;

/// splits shader text into pieces of at most `max_len` bytes.
///
/// glShaderSource takes GLint lengths and concatenates the strings it is given, so text longer than
/// GLint::MAX goes in as several strings. empty text is still one (empty) string.
fn source_chunks(source: &[u8], max_len: usize) -> Vec<&[u8]> {
    if source.is_empty() {
        return vec![source];
    }
    source.chunks(max_len).collect()
}

unsafe fn info_log(
    get_info_log: unsafe extern "C" fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
    object: GLuint,
    buf: &mut [u8],
) -> usize {
    if buf.is_empty() {
        return 0;
    }
    let buf_size = buf.len().min(GLsizei::MAX as usize) as GLsizei;
    let mut len: GLsizei = 0;
    unsafe { get_info_log(object, buf_size, &mut len, buf.as_mut_ptr() as *mut GLchar) };
    len.max(0) as usize
}

impl Adapter for Api {
    #[inline]
    unsafe fn attach_shader(&self, program: Program, shader: Shader) {
        trace_call!("glAttachShader({program}, {shader})");
        unsafe { (self.lib.glAttachShader)(program.get(), shader.get()) };
    }

    #[inline]
    unsafe fn compile_shader(&self, shader: Shader) {
        trace_call!("glCompileShader({shader})");
        unsafe { (self.lib.glCompileShader)(shader.get()) };
    }

    #[inline]
    unsafe fn create_program(&self) -> anyhow::Result<Program> {
        let program = unsafe { (self.lib.glCreateProgram)() };
        trace_call!("glCreateProgram() -> {program}");
        NonZero::new(program).context("could not create program")
    }

    #[inline]
    unsafe fn create_shader(&self, r#type: GLenum) -> anyhow::Result<Shader> {
        let shader = unsafe { (self.lib.glCreateShader)(r#type) };
        trace_call!("glCreateShader(0x{:x}) -> {shader}", r#type);
        NonZero::new(shader)
            .with_context(|| format!("could not create shader (type 0x{:x})", r#type))
    }

    #[inline]
    unsafe fn delete_program(&self, program: Program) {
        trace_call!("glDeleteProgram({program})");
        unsafe { (self.lib.glDeleteProgram)(program.get()) };
    }

    #[inline]
    unsafe fn delete_shader(&self, shader: Shader) {
        trace_call!("glDeleteShader({shader})");
        unsafe { (self.lib.glDeleteShader)(shader.get()) };
    }

    #[inline]
    unsafe fn detach_shader(&self, program: Program, shader: Shader) {
        trace_call!("glDetachShader({program}, {shader})");
        unsafe { (self.lib.glDetachShader)(program.get(), shader.get()) };
    }

    #[inline]
    unsafe fn get_program_info_log(&self, program: Program, buf: &mut [u8]) -> usize {
        trace_call!("glGetProgramInfoLog({program}, {})", buf.len());
        unsafe { info_log(self.lib.glGetProgramInfoLog, program.get(), buf) }
    }

    #[inline]
    unsafe fn get_programiv(&self, program: Program, pname: GLenum) -> GLint {
        let mut param: GLint = 0;
        unsafe { (self.lib.glGetProgramiv)(program.get(), pname, &mut param) };
        trace_call!("glGetProgramiv({program}, 0x{pname:x}) -> {param}");
        param
    }

    #[inline]
    unsafe fn get_shader_info_log(&self, shader: Shader, buf: &mut [u8]) -> usize {
        trace_call!("glGetShaderInfoLog({shader}, {})", buf.len());
        unsafe { info_log(self.lib.glGetShaderInfoLog, shader.get(), buf) }
    }

    #[inline]
    unsafe fn get_shaderiv(&self, shader: Shader, pname: GLenum) -> GLint {
        let mut param: GLint = 0;
        unsafe { (self.lib.glGetShaderiv)(shader.get(), pname, &mut param) };
        trace_call!("glGetShaderiv({shader}, 0x{pname:x}) -> {param}");
        param
    }

    #[inline]
    unsafe fn get_uniform_location(&self, program: Program, name: &CStr) -> Option<GLint> {
        let ret = unsafe { (self.lib.glGetUniformLocation)(program.get(), name.as_ptr()) };
        trace_call!("glGetUniformLocation({program}, {name:?}) -> {ret}");
        (ret != -1).then_some(ret)
    }

    #[inline]
    unsafe fn get_uniformfv(&self, program: Program, location: GLint, params: &mut [GLfloat]) {
        if let Some(get_n_uniformfv) = self.lib.glGetnUniformfv {
            trace_call!("glGetnUniformfv({program}, {location}, {})", params.len());
            let buf_size = size_of_val(params).min(GLsizei::MAX as usize) as GLsizei;
            unsafe { get_n_uniformfv(program.get(), location, buf_size, params.as_mut_ptr()) };
            return;
        }

        // NOTE: glGetUniformfv writes the whole value, which may be larger than `params`.
        let mut value = [0.0; MAX_UNIFORM_COMPONENTS];
        unsafe { (self.lib.glGetUniformfv)(program.get(), location, value.as_mut_ptr()) };
        trace_call!("glGetUniformfv({program}, {location}) -> {value:?}");
        let n = params.len().min(value.len());
        params[..n].copy_from_slice(&value[..n]);
    }

    #[inline]
    unsafe fn link_program(&self, program: Program) {
        trace_call!("glLinkProgram({program})");
        unsafe { (self.lib.glLinkProgram)(program.get()) };
    }

    #[inline]
    unsafe fn program_uniform_1f(&self, program: Program, location: GLint, v0: GLfloat) {
        trace_call!("glProgramUniform1f({program}, {location}, {v0})");
        unsafe { (self.lib.glProgramUniform1f)(program.get(), location, v0) };
    }

    #[inline]
    unsafe fn program_uniform_2f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
    ) {
        trace_call!("glProgramUniform2f({program}, {location}, {v0}, {v1})");
        unsafe { (self.lib.glProgramUniform2f)(program.get(), location, v0, v1) };
    }

    #[inline]
    unsafe fn program_uniform_3f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
    ) {
        trace_call!("glProgramUniform3f({program}, {location}, {v0}, {v1}, {v2})");
        unsafe { (self.lib.glProgramUniform3f)(program.get(), location, v0, v1, v2) };
    }

    #[inline]
    unsafe fn program_uniform_4f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
        v3: GLfloat,
    ) {
        trace_call!("glProgramUniform4f({program}, {location}, {v0}, {v1}, {v2}, {v3})");
        unsafe { (self.lib.glProgramUniform4f)(program.get(), location, v0, v1, v2, v3) };
    }

    #[inline]
    unsafe fn program_uniform_1i(&self, program: Program, location: GLint, v0: GLint) {
        trace_call!("glProgramUniform1i({program}, {location}, {v0})");
        unsafe { (self.lib.glProgramUniform1i)(program.get(), location, v0) };
    }

    #[inline]
    unsafe fn program_uniform_2i(&self, program: Program, location: GLint, v0: GLint, v1: GLint) {
        trace_call!("glProgramUniform2i({program}, {location}, {v0}, {v1})");
        unsafe { (self.lib.glProgramUniform2i)(program.get(), location, v0, v1) };
    }

    #[inline]
    unsafe fn program_uniform_3i(
        &self,
        program: Program,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
    ) {
        trace_call!("glProgramUniform3i({program}, {location}, {v0}, {v1}, {v2})");
        unsafe { (self.lib.glProgramUniform3i)(program.get(), location, v0, v1, v2) };
    }

    #[inline]
    unsafe fn program_uniform_4i(
        &self,
        program: Program,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
        v3: GLint,
    ) {
        trace_call!("glProgramUniform4i({program}, {location}, {v0}, {v1}, {v2}, {v3})");
        unsafe { (self.lib.glProgramUniform4i)(program.get(), location, v0, v1, v2, v3) };
    }

    #[inline]
    unsafe fn program_uniform_1ui(&self, program: Program, location: GLint, v0: GLuint) {
        trace_call!("glProgramUniform1ui({program}, {location}, {v0})");
        unsafe { (self.lib.glProgramUniform1ui)(program.get(), location, v0) };
    }

    #[inline]
    unsafe fn program_uniform_2ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
    ) {
        trace_call!("glProgramUniform2ui({program}, {location}, {v0}, {v1})");
        unsafe { (self.lib.glProgramUniform2ui)(program.get(), location, v0, v1) };
    }

    #[inline]
    unsafe fn program_uniform_3ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
    ) {
        trace_call!("glProgramUniform3ui({program}, {location}, {v0}, {v1}, {v2})");
        unsafe { (self.lib.glProgramUniform3ui)(program.get(), location, v0, v1, v2) };
    }

    #[inline]
    unsafe fn program_uniform_4ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
        v3: GLuint,
    ) {
        trace_call!("glProgramUniform4ui({program}, {location}, {v0}, {v1}, {v2}, {v3})");
        unsafe { (self.lib.glProgramUniform4ui)(program.get(), location, v0, v1, v2, v3) };
    }

    #[inline]
    unsafe fn program_uniform_1d(&self, program: Program, location: GLint, v0: GLdouble) {
        trace_call!("glProgramUniform1d({program}, {location}, {v0})");
        unsafe { (self.lib.glProgramUniform1d)(program.get(), location, v0) };
    }

    #[inline]
    unsafe fn program_uniform_2d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
    ) {
        trace_call!("glProgramUniform2d({program}, {location}, {v0}, {v1})");
        unsafe { (self.lib.glProgramUniform2d)(program.get(), location, v0, v1) };
    }

    #[inline]
    unsafe fn program_uniform_3d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
    ) {
        trace_call!("glProgramUniform3d({program}, {location}, {v0}, {v1}, {v2})");
        unsafe { (self.lib.glProgramUniform3d)(program.get(), location, v0, v1, v2) };
    }

    #[inline]
    unsafe fn program_uniform_4d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
        v3: GLdouble,
    ) {
        trace_call!("glProgramUniform4d({program}, {location}, {v0}, {v1}, {v2}, {v3})");
        unsafe { (self.lib.glProgramUniform4d)(program.get(), location, v0, v1, v2, v3) };
    }

    #[inline]
    unsafe fn shader_source(&self, shader: Shader, source: &str) {
        let chunks = source_chunks(source.as_bytes(), GLint::MAX as usize);
        trace_call!(
            "glShaderSource({shader}, {}, <{} bytes>)",
            chunks.len(),
            source.len()
        );
        let strings: Vec<*const GLchar> = chunks
            .iter()
            .map(|chunk| chunk.as_ptr() as *const GLchar)
            .collect();
        let lengths: Vec<GLint> = chunks.iter().map(|chunk| chunk.len() as GLint).collect();
        unsafe {
            (self.lib.glShaderSource)(
                shader.get(),
                chunks.len() as GLsizei,
                strings.as_ptr(),
                lengths.as_ptr(),
            )
        };
    }

    #[inline]
    unsafe fn use_program(&self, program: Option<Program>) {
        trace_call!("glUseProgram({program:?})");
        unsafe { (self.lib.glUseProgram)(program.map_or_else(|| 0, |v| v.get())) };
    }
}
