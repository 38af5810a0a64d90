// MODEL: Viewer data loaded from disk and animated on the CPU
pub mod error;
pub mod material;
pub mod mesh;
pub mod motion;
pub mod texture;

pub use error::AssetError;
pub use material::{Lighting, MappingMode, Material};
pub use mesh::{MeshData, ModelInfo};
pub use motion::Motion;
pub use texture::{TextureImage, TextureVariant};
