use std::ffi::CStr;
use std::num::NonZero;

use crate::libgl::{GLdouble, GLenum, GLfloat, GLint, GLuint};

pub type Program = NonZero<GLuint>;
pub type Shader = NonZero<GLuint>;

// NOTE: methods mirror gl entry points 1:1 (getshaderiv stays get_shaderiv) with the exception of
// things that can be rustified, like strings and output buffers.
//
// everything here is unsafe because the context the objects belong to must be current on the
// calling thread.
pub trait Adapter {
    unsafe fn attach_shader(&self, program: Program, shader: Shader);
    unsafe fn compile_shader(&self, shader: Shader);
    unsafe fn create_program(&self) -> anyhow::Result<Program>;
    unsafe fn create_shader(&self, r#type: GLenum) -> anyhow::Result<Shader>;
    unsafe fn delete_program(&self, program: Program);
    unsafe fn delete_shader(&self, shader: Shader);
    unsafe fn detach_shader(&self, program: Program, shader: Shader);
    /// writes a nul-terminated prefix of the log into `buf` and returns its length without the
    /// terminator, exactly like glGetProgramInfoLog.
    unsafe fn get_program_info_log(&self, program: Program, buf: &mut [u8]) -> usize;
    unsafe fn get_programiv(&self, program: Program, pname: GLenum) -> GLint;
    /// see [`Adapter::get_program_info_log`].
    unsafe fn get_shader_info_log(&self, shader: Shader, buf: &mut [u8]) -> usize;
    unsafe fn get_shaderiv(&self, shader: Shader, pname: GLenum) -> GLint;
    unsafe fn get_uniform_location(&self, program: Program, name: &CStr) -> Option<GLint>;
    /// reads at most `params.len()` components.
    unsafe fn get_uniformfv(&self, program: Program, location: GLint, params: &mut [GLfloat]);
    unsafe fn link_program(&self, program: Program);
    unsafe fn program_uniform_1f(&self, program: Program, location: GLint, v0: GLfloat);
    unsafe fn program_uniform_2f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
    );
    unsafe fn program_uniform_3f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
    );
    unsafe fn program_uniform_4f(
        &self,
        program: Program,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
        v3: GLfloat,
    );
    unsafe fn program_uniform_1i(&self, program: Program, location: GLint, v0: GLint);
    unsafe fn program_uniform_2i(&self, program: Program, location: GLint, v0: GLint, v1: GLint);
    unsafe fn program_uniform_3i(
        &self,
        program: Program,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
    );
    unsafe fn program_uniform_4i(
        &self,
        program: Program,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
        v3: GLint,
    );
    unsafe fn program_uniform_1ui(&self, program: Program, location: GLint, v0: GLuint);
    unsafe fn program_uniform_2ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
    );
    unsafe fn program_uniform_3ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
    );
    unsafe fn program_uniform_4ui(
        &self,
        program: Program,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
        v3: GLuint,
    );
    unsafe fn program_uniform_1d(&self, program: Program, location: GLint, v0: GLdouble);
    unsafe fn program_uniform_2d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
    );
    unsafe fn program_uniform_3d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
    );
    unsafe fn program_uniform_4d(
        &self,
        program: Program,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
        v3: GLdouble,
    );
    unsafe fn shader_source(&self, shader: Shader, source: &str);
    unsafe fn use_program(&self, program: Option<Program>);
}
