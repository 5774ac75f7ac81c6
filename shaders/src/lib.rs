//! compiles glsl stages into linked gl programs and owns them.
//!
//! stages are loaded by name from a [`SourceStore`], compiled and linked by [`ShaderBuilder`].
//! every compile and link diagnostic of a failed build ends up in one [`CompileError`]. a
//! successful build hands out a move-only [`ShaderProgram`] that deletes the gl program when it
//! goes away.

mod builder;
mod infolog;
pub mod logger;
#[cfg(test)]
mod mock;
mod program;
mod source;
mod uniform;

pub use builder::{CompileError, ShaderBuilder, ShaderKind};
pub use infolog::{INITIAL_INFO_LOG_CAPACITY, read_info_log};
pub use program::ShaderProgram;
pub use source::{DEFAULT_SHADER_DIR, FsSource, MemorySource, READ_CHUNK_SIZE, SourceStore};
pub use uniform::UniformValue;
