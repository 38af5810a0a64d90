// VIEW: Rendering and graphics
pub mod gpu_init;
pub mod model_gpu;
pub mod programs;
pub mod render;

pub use gpu_init::{GpuContext, GpuError};
pub use model_gpu::ModelResource;
pub use programs::{ProgramTable, ShaderProgram};
pub use render::{Renderer, SceneUniforms, UiFrame};
