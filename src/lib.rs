//! A small WGPU engine, and the simulation for three first-person demos built on it: a wizard
//! shooting at a snake, a night-time car race, and a wizard fighting a dragon.

pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
mod graphics;
mod gui;
pub mod input;
pub mod lighting;
pub mod lin_alg;
mod meshes;
pub mod sim;
mod system;
mod texture;
pub mod types;
mod window;

pub use camera::Camera;
pub use input::InputsCommanded;
pub use lighting::{Lighting, PointLight, ShadowCaster, Sun};
pub use system::{run, COLOR_FORMAT, DEPTH_FORMAT};
pub use types::{EngineUpdates, Entity, InputSettings, Mesh, Scene, TextureSource, UiSettings};
