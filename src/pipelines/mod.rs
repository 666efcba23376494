//! Render pipelines of the scene.
//!
//! - `basic` draws the textured, lit entities (opaque, depth write on)
//! - `particle` draws the emitter (additive blending, depth write off)
//! - `light` holds the directional lights uniform shared by `basic`

pub mod basic;
pub mod light;
pub mod particle;
