use std::ffi::CString;
use std::fmt;

use gl::Adapter;

use crate::UniformValue;

/// a linked gl program, owned.
///
/// id 0 means "no program": it is what [`Default`] gives you and what is left behind by
/// `std::mem::take`. the program is deleted when a valid value is dropped or overwritten.
pub struct ShaderProgram<'gl, A: Adapter = gl::Api> {
    handle: Option<(&'gl A, gl::Program)>,
}

impl<A: Adapter> Default for ShaderProgram<'_, A> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<A: Adapter> fmt::Debug for ShaderProgram<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram").field("id", &self.id()).finish()
    }
}

impl<'gl, A: Adapter> ShaderProgram<'gl, A> {
    pub(crate) fn from_linked(gl_api: &'gl A, program: gl::Program) -> Self {
        Self {
            handle: Some((gl_api, program)),
        }
    }

    #[inline]
    pub fn id(&self) -> gl::GLuint {
        self.handle.map_or(0, |(_, program)| program.get())
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.handle.is_some()
    }

    /// makes this the current program for subsequent draw calls. does nothing if invalid.
    pub fn use_program(&self) {
        if let Some((gl_api, program)) = self.handle {
            unsafe { gl_api.use_program(Some(program)) };
        }
    }

    fn uniform_location(&self, name: &str) -> Option<(&'gl A, gl::Program, gl::GLint)> {
        let (gl_api, program) = self.handle?;
        let Ok(c_name) = CString::new(name) else {
            log::warn!("uniform name {name:?} contains a nul byte");
            return None;
        };
        let location = unsafe { gl_api.get_uniform_location(program, &c_name) }?;
        Some((gl_api, program, location))
    }

    /// writes `value` to the uniform called `name`.
    ///
    /// returns false, without writing anything, if the program is invalid or has no active uniform
    /// with that name. uniforms the shader compiler optimized out are not active, so this is a
    /// normal outcome rather than an error.
    ///
    /// the write goes to this program regardless of which program is currently in use.
    pub fn set_uniform<V: UniformValue>(&self, name: &str, value: V) -> bool {
        let Some((gl_api, program, location)) = self.uniform_location(name) else {
            return false;
        };
        log::trace!(
            "setting uniform {name:?} ({}) at location {location} of program {program}",
            std::any::type_name::<V>()
        );
        unsafe { value.write(gl_api, program, location) };
        true
    }

    /// reads the first `N` components of a float uniform back from the driver.
    pub fn get_uniform_f32<const N: usize>(&self, name: &str) -> Option<[f32; N]> {
        let (gl_api, program, location) = self.uniform_location(name)?;
        let mut out = [0.0; N];
        unsafe { gl_api.get_uniformfv(program, location, &mut out) };
        Some(out)
    }
}

impl<A: Adapter> Drop for ShaderProgram<'_, A> {
    fn drop(&mut self) {
        if let Some((gl_api, program)) = self.handle.take() {
            log::debug!("deleting program {program}");
            unsafe { gl_api.delete_program(program) };
        }
    }
}
