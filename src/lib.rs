pub mod audio;
pub mod camera;
pub mod cinematic;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod math;
pub mod player;
pub mod renderer;
pub mod scene;
pub mod scenes;
pub mod texture;
pub mod timeline;
pub mod traits;

pub use cinematic::Cinematic;
pub use config::Config;
pub use error::{CinematicError, Result};
pub use timeline::{SceneWeights, Timeline};
