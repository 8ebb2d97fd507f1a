// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{create_depth_texture, EguiFrame, SceneRenderer, SceneUniform};
pub use gpu_init::{GpuContext, GpuInitError};
