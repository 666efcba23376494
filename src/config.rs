//! Everything the demo scene is built from.
//!
//! [`GameConfig::default`] describes the stock scene: three lit entities,
//! one particle emitter and a fly camera looking down +z.

use std::path::PathBuf;

use cgmath::Vector3;

use crate::{
    camera::CameraConfig,
    data_structures::{entity::Motion, particle::EmitterConfig},
    pipelines::light::DirectionalLight,
    resources::AssetPaths,
};

/// One entity to place at start-up. `mesh` and `material` name entries of
/// [`GameConfig::meshes`] and [`GameConfig::materials`].
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDesc {
    pub mesh: String,
    pub material: String,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub motion: Motion,
}

impl EntityDesc {
    pub fn new(mesh: &str, material: &str) -> Self {
        Self {
            mesh: mesh.to_string(),
            material: material.to_string(),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            motion: Motion::Static,
        }
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn moving(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Show FPS and frame time in the title bar.
    pub show_stats: bool,
    pub clear_colour: wgpu::Color,
    pub asset_roots: Vec<PathBuf>,
    /// Mesh name to OBJ file, relative to an asset root.
    pub meshes: Vec<(String, String)>,
    /// Material name to texture file, relative to an asset root.
    pub materials: Vec<(String, String)>,
    pub particle_texture: String,
    pub entities: Vec<EntityDesc>,
    pub emitter: EmitterConfig,
    pub lights: [DirectionalLight; 2],
    pub camera: CameraConfig,
}

impl GameConfig {
    pub fn asset_paths(&self) -> AssetPaths {
        AssetPaths::new(self.asset_roots.clone())
    }
}

fn named(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, file)| (name.to_string(), file.to_string()))
        .collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Ember Scene".to_string(),
            width: 1280,
            height: 720,
            show_stats: true,
            clear_colour: wgpu::Color {
                r: 0.4,
                g: 0.6,
                b: 0.75,
                a: 0.0,
            },
            asset_roots: AssetPaths::default_roots(),
            meshes: named(&[
                ("sphere", "models/sphere.obj"),
                ("cube", "models/cube.obj"),
                ("helix", "models/helix.obj"),
            ]),
            materials: named(&[
                ("rock", "textures/MossRock.png"),
                ("wood", "textures/TreeBark.png"),
            ]),
            particle_texture: "textures/particle.png".to_string(),
            entities: vec![
                EntityDesc::new("sphere", "wood")
                    .at(Vector3::new(1.5, 0.0, 0.0))
                    .moving(Motion::Spin {
                        rate: Vector3::new(0.0, 0.1, 0.0),
                    }),
                EntityDesc::new("cube", "rock")
                    .at(Vector3::new(-1.5, 0.0, 0.0))
                    .scaled(Vector3::new(1.5, 1.5, 1.0))
                    .moving(Motion::Bob {
                        base_y: 0.0,
                        amplitude: 1.0,
                    }),
                EntityDesc::new("helix", "rock")
                    .at(Vector3::new(0.0, -1.5, 0.0))
                    .rotated(Vector3::new(0.0, 0.0, 1.0))
                    .moving(Motion::Pulse),
            ],
            emitter: EmitterConfig::default(),
            lights: [
                DirectionalLight::new([0.1, 0.1, 0.1, 1.0], [1.0, 0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
                DirectionalLight::new([0.1, 0.1, 0.1, 1.0], [1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 1.0]),
            ],
            camera: CameraConfig::default(),
        }
    }
}
