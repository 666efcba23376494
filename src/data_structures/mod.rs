//! Engine data structures: meshes, materials, textures, entities and particles.
//!
//! - `model` contains mesh and material definitions backed by GPU resources
//! - `texture` contains the GPU texture wrapper and sampler helpers
//! - `entity` holds an entity's transform and its mesh/material handles
//! - `particle` is the CPU-side particle pool of the emitter

pub mod entity;
pub mod model;
pub mod particle;
pub mod texture;
