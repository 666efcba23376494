//! ember-scene
//!
//! A small real-time rendering demo built on wgpu: three textured entities lit
//! by two directional lights, an additive particle emitter and a fly camera
//! driven by mouse and keyboard. Simulation state lives on the CPU and is
//! turned into a frame plan each frame, which keeps it testable without a GPU.
//!
//! High-level modules
//! - `camera`: fly camera, its controls and the view/projection uniform
//! - `config`: the scene description and its stock defaults
//! - `context`: window, device, queue, surface and depth target
//! - `data_structures`: meshes, materials, entities, particles and textures
//! - `error`: typed load and start-up failures
//! - `flow`: the winit event loop and frame timing
//! - `game`: scene orchestration, update and input handling
//! - `pipelines`: render pipelines for lit entities and particles
//! - `render`: frame plans and the renderer that executes them
//! - `resources`: asset lookup and OBJ / image loading
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod game;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use config::GameConfig;
pub use game::Game;
pub use winit::keyboard::KeyCode;
