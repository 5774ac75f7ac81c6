#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{CStr, c_char, c_double, c_float, c_int, c_uchar, c_uint, c_void};
use std::mem::{size_of, transmute_copy};

use anyhow::anyhow;

// https://registry.khronos.org/OpenGL/api/GL/glcorearb.h

pub type GLboolean = c_uchar;
pub type GLchar = c_char;
pub type GLdouble = c_double;
pub type GLenum = c_uint;
pub type GLfloat = c_float;
pub type GLint = c_int;
pub type GLsizei = c_int;
pub type GLubyte = c_uchar;
pub type GLuint = c_uint;

pub const FALSE: GLboolean = 0;

pub const COMPILE_STATUS: GLenum = 0x8B81;
pub const LINK_STATUS: GLenum = 0x8B82;
pub const INFO_LOG_LENGTH: GLenum = 0x8B84;
pub const ATTACHED_SHADERS: GLenum = 0x8B85;

pub const FRAGMENT_SHADER: GLenum = 0x8B30;
pub const VERTEX_SHADER: GLenum = 0x8B31;
pub const GEOMETRY_SHADER: GLenum = 0x8DD9;
pub const TESS_EVALUATION_SHADER: GLenum = 0x8E87;
pub const TESS_CONTROL_SHADER: GLenum = 0x8E88;
pub const COMPUTE_SHADER: GLenum = 0x91B9;

/// function table for the part of gl 4.6 core that shader compilation and program management
/// need.
pub struct Lib {
    // 2.0
    pub glAttachShader: unsafe extern "C" fn(program: GLuint, shader: GLuint),
    pub glCompileShader: unsafe extern "C" fn(shader: GLuint),
    pub glCreateProgram: unsafe extern "C" fn() -> GLuint,
    pub glCreateShader: unsafe extern "C" fn(r#type: GLenum) -> GLuint,
    pub glDeleteProgram: unsafe extern "C" fn(program: GLuint),
    pub glDeleteShader: unsafe extern "C" fn(shader: GLuint),
    pub glDetachShader: unsafe extern "C" fn(program: GLuint, shader: GLuint),
    pub glGetProgramInfoLog: unsafe extern "C" fn(
        program: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ),
    pub glGetProgramiv: unsafe extern "C" fn(program: GLuint, pname: GLenum, params: *mut GLint),
    pub glGetShaderInfoLog: unsafe extern "C" fn(
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ),
    pub glGetShaderiv: unsafe extern "C" fn(shader: GLuint, pname: GLenum, params: *mut GLint),
    pub glGetUniformLocation:
        unsafe extern "C" fn(program: GLuint, name: *const GLchar) -> GLint,
    pub glGetUniformfv:
        unsafe extern "C" fn(program: GLuint, location: GLint, params: *mut GLfloat),
    pub glLinkProgram: unsafe extern "C" fn(program: GLuint),
    pub glShaderSource: unsafe extern "C" fn(
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    ),
    pub glUseProgram: unsafe extern "C" fn(program: GLuint),

    // 4.1
    pub glProgramUniform1f: unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLfloat),
    pub glProgramUniform2f:
        unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLfloat, v1: GLfloat),
    pub glProgramUniform3f: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
    ),
    pub glProgramUniform4f: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLfloat,
        v1: GLfloat,
        v2: GLfloat,
        v3: GLfloat,
    ),
    pub glProgramUniform1i: unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLint),
    pub glProgramUniform2i:
        unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLint, v1: GLint),
    pub glProgramUniform3i:
        unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLint, v1: GLint, v2: GLint),
    pub glProgramUniform4i: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLint,
        v1: GLint,
        v2: GLint,
        v3: GLint,
    ),
    pub glProgramUniform1ui: unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLuint),
    pub glProgramUniform2ui:
        unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLuint, v1: GLuint),
    pub glProgramUniform3ui: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
    ),
    pub glProgramUniform4ui: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLuint,
        v1: GLuint,
        v2: GLuint,
        v3: GLuint,
    ),
    pub glProgramUniform1d: unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLdouble),
    pub glProgramUniform2d:
        unsafe extern "C" fn(program: GLuint, location: GLint, v0: GLdouble, v1: GLdouble),
    pub glProgramUniform3d: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
    ),
    pub glProgramUniform4d: unsafe extern "C" fn(
        program: GLuint,
        location: GLint,
        v0: GLdouble,
        v1: GLdouble,
        v2: GLdouble,
        v3: GLdouble,
    ),

    // 4.5, optional
    pub glGetnUniformfv: Option<
        unsafe extern "C" fn(
            program: GLuint,
            location: GLint,
            buf_size: GLsizei,
            params: *mut GLfloat,
        ),
    >,
}

unsafe fn lookup<F: Copy>(
    get_proc_address: &mut impl FnMut(*const c_char) -> *mut c_void,
    name: &CStr,
) -> anyhow::Result<F> {
    assert_eq!(size_of::<F>(), size_of::<*mut c_void>());

    let addr = get_proc_address(name.as_ptr());
    if addr.is_null() {
        return Err(anyhow!("could not load {name:?}"));
    }
    Ok(unsafe { transmute_copy(&addr) })
}

unsafe fn lookup_optional<F: Copy>(
    get_proc_address: &mut impl FnMut(*const c_char) -> *mut c_void,
    name: &CStr,
) -> Option<F> {
    match unsafe { lookup(get_proc_address, name) } {
        Ok(f) => Some(f),
        Err(err) => {
            log::debug!("{err}, continuing without it");
            None
        }
    }
}

impl Lib {
    /// the context that `get_proc_address` resolves against must be current on the calling
    /// thread.
    pub unsafe fn load_with<F>(mut get_proc_address: F) -> anyhow::Result<Self>
    where
        F: FnMut(*const c_char) -> *mut c_void,
    {
        let f = &mut get_proc_address;
        unsafe {
            Ok(Self {
                // 2.0
                glAttachShader: lookup(f, c"glAttachShader")?,
                glCompileShader: lookup(f, c"glCompileShader")?,
                glCreateProgram: lookup(f, c"glCreateProgram")?,
                glCreateShader: lookup(f, c"glCreateShader")?,
                glDeleteProgram: lookup(f, c"glDeleteProgram")?,
                glDeleteShader: lookup(f, c"glDeleteShader")?,
                glDetachShader: lookup(f, c"glDetachShader")?,
                glGetProgramInfoLog: lookup(f, c"glGetProgramInfoLog")?,
                glGetProgramiv: lookup(f, c"glGetProgramiv")?,
                glGetShaderInfoLog: lookup(f, c"glGetShaderInfoLog")?,
                glGetShaderiv: lookup(f, c"glGetShaderiv")?,
                glGetUniformLocation: lookup(f, c"glGetUniformLocation")?,
                glGetUniformfv: lookup(f, c"glGetUniformfv")?,
                glLinkProgram: lookup(f, c"glLinkProgram")?,
                glShaderSource: lookup(f, c"glShaderSource")?,
                glUseProgram: lookup(f, c"glUseProgram")?,

                // 4.1
                glProgramUniform1f: lookup(f, c"glProgramUniform1f")?,
                glProgramUniform2f: lookup(f, c"glProgramUniform2f")?,
                glProgramUniform3f: lookup(f, c"glProgramUniform3f")?,
                glProgramUniform4f: lookup(f, c"glProgramUniform4f")?,
                glProgramUniform1i: lookup(f, c"glProgramUniform1i")?,
                glProgramUniform2i: lookup(f, c"glProgramUniform2i")?,
                glProgramUniform3i: lookup(f, c"glProgramUniform3i")?,
                glProgramUniform4i: lookup(f, c"glProgramUniform4i")?,
                glProgramUniform1ui: lookup(f, c"glProgramUniform1ui")?,
                glProgramUniform2ui: lookup(f, c"glProgramUniform2ui")?,
                glProgramUniform3ui: lookup(f, c"glProgramUniform3ui")?,
                glProgramUniform4ui: lookup(f, c"glProgramUniform4ui")?,
                glProgramUniform1d: lookup(f, c"glProgramUniform1d")?,
                glProgramUniform2d: lookup(f, c"glProgramUniform2d")?,
                glProgramUniform3d: lookup(f, c"glProgramUniform3d")?,
                glProgramUniform4d: lookup(f, c"glProgramUniform4d")?,

                // 4.5, optional
                glGetnUniformfv: lookup_optional(f, c"glGetnUniformfv"),
            })
        }
    }
}
