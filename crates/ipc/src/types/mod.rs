//! Parameter set definitions consumed by the scene.

mod camera;
mod lighting;
mod material;
mod textures;

pub use camera::*;
pub use lighting::*;
pub use material::*;
pub use textures::*;
