mod adapter;
mod api;
mod libgl;

pub use adapter::*;
pub use api::Api;
pub use libgl::*;
