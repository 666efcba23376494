use cgmath::{Matrix4, Vector3};
use ember_scene::{
    config::GameConfig,
    data_structures::{
        model::{MaterialId, MeshId},
        particle::EmitterConfig,
    },
    game::{Game, SceneHandles},
};

pub(crate) const EPSILON: f32 = 1e-5;

/// Handles for every mesh and material the default scene names.
pub(crate) fn default_handles() -> SceneHandles {
    let config = GameConfig::default();
    let mut handles = SceneHandles::default();
    for (i, (name, _)) in config.meshes.iter().enumerate() {
        handles.meshes.insert(name.clone(), MeshId(i));
    }
    for (i, (name, _)) in config.materials.iter().enumerate() {
        handles.materials.insert(name.clone(), MaterialId(i));
    }
    handles
}

pub(crate) fn initialized_game() -> Game {
    let mut game = Game::new(GameConfig::default());
    game.init(&default_handles(), 1280, 720)
        .expect("default scene initializes");
    game
}

/// A game that has run one short frame and is ready to draw.
pub(crate) fn running_game() -> Game {
    let mut game = initialized_game();
    game.update(0.016, 0.016);
    game
}

/// Default emitter settings with a custom pool size, rate and lifetime.
pub(crate) fn emitter_config(max_particles: usize, per_second: f32, lifetime: f32) -> EmitterConfig {
    EmitterConfig {
        max_particles,
        particles_per_second: per_second,
        particle_lifetime: lifetime,
        ..Default::default()
    }
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn assert_vec_close(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual.x - expected.x).abs() < EPSILON
            && (actual.y - expected.y).abs() < EPSILON
            && (actual.z - expected.z).abs() < EPSILON,
        "expected {expected:?}, got {actual:?}"
    );
}

/// Compares two matrices bit for bit.
pub(crate) fn bits(matrix: Matrix4<f32>) -> [[u32; 4]; 4] {
    let columns: [[f32; 4]; 4] = matrix.into();
    columns.map(|column| column.map(f32::to_bits))
}
