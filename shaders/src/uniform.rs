use gl::{Adapter, GLint, Program};

mod sealed {
    pub trait Sealed {}
}

/// a value that can be written to a uniform: a scalar, or a 2/3/4 component tuple or array of one
/// of `f32`, `i32`, `bool`, `u32`, `f64`.
///
/// `bool` is written as an integer (0 or 1). mixed component types, other scalar types and more
/// than 4 components do not implement this trait, so they are rejected at compile time.
///
/// NOTE: unsuffixed float literals default to `f64`; write `1.0_f32` for `float`/`vecN` uniforms.
pub trait UniformValue: sealed::Sealed + Copy {
    #[doc(hidden)]
    unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint);
}

macro_rules! impl_uniform_value {
    ($ty:ty, |$v:ident| $to_gl:expr, $one:ident, $two:ident, $three:ident, $four:ident) => {
        impl sealed::Sealed for $ty {}
        impl UniformValue for $ty {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let to_gl = |$v: $ty| $to_gl;
                unsafe { gl_api.$one(program, location, to_gl(self)) };
            }
        }

        impl sealed::Sealed for ($ty, $ty) {}
        impl UniformValue for ($ty, $ty) {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let to_gl = |$v: $ty| $to_gl;
                let (v0, v1) = self;
                unsafe { gl_api.$two(program, location, to_gl(v0), to_gl(v1)) };
            }
        }

        impl sealed::Sealed for ($ty, $ty, $ty) {}
        impl UniformValue for ($ty, $ty, $ty) {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let to_gl = |$v: $ty| $to_gl;
                let (v0, v1, v2) = self;
                unsafe { gl_api.$three(program, location, to_gl(v0), to_gl(v1), to_gl(v2)) };
            }
        }

        impl sealed::Sealed for ($ty, $ty, $ty, $ty) {}
        impl UniformValue for ($ty, $ty, $ty, $ty) {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let to_gl = |$v: $ty| $to_gl;
                let (v0, v1, v2, v3) = self;
                unsafe {
                    gl_api.$four(program, location, to_gl(v0), to_gl(v1), to_gl(v2), to_gl(v3))
                };
            }
        }

        impl sealed::Sealed for [$ty; 2] {}
        impl UniformValue for [$ty; 2] {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let [v0, v1] = self;
                unsafe { (v0, v1).write(gl_api, program, location) };
            }
        }

        impl sealed::Sealed for [$ty; 3] {}
        impl UniformValue for [$ty; 3] {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let [v0, v1, v2] = self;
                unsafe { (v0, v1, v2).write(gl_api, program, location) };
            }
        }

        impl sealed::Sealed for [$ty; 4] {}
        impl UniformValue for [$ty; 4] {
            unsafe fn write<A: Adapter>(self, gl_api: &A, program: Program, location: GLint) {
                let [v0, v1, v2, v3] = self;
                unsafe { (v0, v1, v2, v3).write(gl_api, program, location) };
            }
        }
    };
}

impl_uniform_value!(
    f32,
    |v| v,
    program_uniform_1f,
    program_uniform_2f,
    program_uniform_3f,
    program_uniform_4f
);
impl_uniform_value!(
    i32,
    |v| v,
    program_uniform_1i,
    program_uniform_2i,
    program_uniform_3i,
    program_uniform_4i
);
impl_uniform_value!(
    bool,
    |v| gl::GLint::from(v),
    program_uniform_1i,
    program_uniform_2i,
    program_uniform_3i,
    program_uniform_4i
);
impl_uniform_value!(
    u32,
    |v| v,
    program_uniform_1ui,
    program_uniform_2ui,
    program_uniform_3ui,
    program_uniform_4ui
);
impl_uniform_value!(
    f64,
    |v| v,
    program_uniform_1d,
    program_uniform_2d,
    program_uniform_3d,
    program_uniform_4d
);
