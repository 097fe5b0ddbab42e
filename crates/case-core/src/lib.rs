pub mod autofit;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod lighting;
pub mod loader;
pub mod scene;
pub mod session;
pub mod texture;
pub mod viewport;

pub use autofit::*;
pub use bounds::*;
pub use camera::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use lighting::*;
pub use loader::*;
pub use scene::*;
pub use session::*;
pub use texture::*;
pub use viewport::*;
