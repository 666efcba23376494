use std::f32::consts::FRAC_PI_2;

use ember_scene::{
    KeyCode,
    camera::CameraUniform,
    config::GameConfig,
    error::InitializationError,
    game::{Game, Lifecycle, MouseButtons},
    render::Draw,
};

use crate::common::test_utils::{
    assert_close, default_handles, initialized_game, running_game,
};

mod common;

fn step_name(draw: &Draw) -> &'static str {
    match draw {
        Draw::Clear(_) => "clear",
        Draw::Entity { .. } => "entity",
        Draw::ParticleStates => "particle states",
        Draw::Particles { .. } => "particles",
        Draw::ResetStates => "reset states",
        Draw::Present => "present",
    }
}

const LEFT: MouseButtons = MouseButtons {
    left: true,
    right: false,
    middle: false,
};

#[test]
fn nothing_is_drawn_before_init() {
    let mut game = Game::new(GameConfig::default());
    game.update(0.016, 0.016);
    assert_eq!(game.lifecycle(), Lifecycle::Uninitialized);
    assert!(game.draw().is_none());
    assert!(game.camera().is_none());
}

#[test]
fn first_update_starts_the_game() {
    let mut game = initialized_game();
    assert_eq!(game.lifecycle(), Lifecycle::Initialized);
    assert!(game.draw().is_none());

    game.update(0.016, 0.016);
    assert_eq!(game.lifecycle(), Lifecycle::Running);
    assert!(game.draw().is_some());
}

#[test]
fn frame_plan_keeps_draw_order() {
    let game = running_game();
    let plan = game.draw().unwrap();
    let steps: Vec<_> = plan.draws.iter().map(step_name).collect();
    assert_eq!(
        steps,
        [
            "clear",
            "entity",
            "entity",
            "entity",
            "particle states",
            "particles",
            "reset states",
            "present",
        ]
    );
    assert_eq!(plan.draws[0], Draw::Clear(game.config().clear_colour));
    assert_eq!(plan.entity_count(), game.entities().len());
}

#[test]
fn entities_draw_with_their_handles() {
    let game = running_game();
    let handles = default_handles();
    let plan = game.draw().unwrap();

    let drawn: Vec<_> = plan
        .draws
        .iter()
        .filter_map(|draw| match draw {
            Draw::Entity {
                index,
                mesh,
                material,
                uniform,
            } => Some((*index, *mesh, *material, *uniform)),
            _ => None,
        })
        .collect();
    assert_eq!(drawn[0].1, handles.meshes["sphere"]);
    assert_eq!(drawn[0].2, handles.materials["wood"]);
    assert_eq!(drawn[1].1, handles.meshes["cube"]);
    assert_eq!(drawn[2].2, handles.materials["rock"]);
    for (index, _, _, uniform) in drawn {
        assert_eq!(uniform, game.entities()[index].to_uniform());
    }
}

#[test]
fn particles_in_plan_match_live_count() {
    let mut game = initialized_game();
    game.update(1.0, 1.0);
    assert_eq!(game.emitter().unwrap().live_count(), 100);

    let plan = game.draw().unwrap();
    let instances = plan
        .draws
        .iter()
        .find_map(|draw| match draw {
            Draw::Particles { instances } => Some(instances.len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(instances, 100);
}

#[test]
fn escape_requests_shutdown() {
    let mut game = running_game();
    game.on_key(KeyCode::Escape, true);
    assert!(!game.should_exit());

    game.update(0.016, 0.032);
    assert!(game.should_exit());
    assert_eq!(game.lifecycle(), Lifecycle::ShuttingDown);
    assert!(game.draw().is_none());

    game.on_key(KeyCode::Escape, false);
    game.update(0.016, 0.048);
    assert!(game.draw().is_none());
}

#[test]
fn resize_applies_before_next_draw() {
    let mut game = running_game();
    game.on_resize(800, 600);

    let camera = game.camera().unwrap();
    assert_close(camera.aspect(), 800.0 / 600.0);
    let plan = game.draw().unwrap();
    assert_eq!(plan.camera, CameraUniform::from_camera(camera));
}

#[test]
fn unknown_mesh_fails_init() {
    let mut handles = default_handles();
    handles.meshes.remove("helix");

    let mut game = Game::new(GameConfig::default());
    let result = game.init(&handles, 1280, 720);
    assert!(matches!(result, Err(InitializationError::UnknownMesh(name)) if name == "helix"));
    assert_eq!(game.lifecycle(), Lifecycle::Uninitialized);
}

#[test]
fn unknown_material_fails_init() {
    let mut handles = default_handles();
    handles.materials.remove("wood");

    let mut game = Game::new(GameConfig::default());
    let result = game.init(&handles, 1280, 720);
    assert!(matches!(result, Err(InitializationError::UnknownMaterial(name)) if name == "wood"));
}

#[test]
fn second_init_is_rejected() {
    let mut game = initialized_game();
    let result = game.init(&default_handles(), 1280, 720);
    assert!(matches!(result, Err(InitializationError::AlreadyInitialized)));
}

#[test]
fn left_drag_turns_the_camera() {
    let mut game = running_game();
    game.on_mouse_down(LEFT, 100.0, 100.0);
    game.on_mouse_move(LEFT, 110.0, 96.0);
    let camera = game.camera().unwrap();
    assert_close(camera.yaw().0, 0.05);
    assert_close(camera.pitch().0, -0.02);

    // Moving without a button only tracks the cursor
    game.on_mouse_up(MouseButtons::default(), 110.0, 96.0);
    game.on_mouse_move(MouseButtons::default(), 300.0, 300.0);
    assert_close(game.camera().unwrap().yaw().0, 0.05);
}

#[test]
fn wheel_dollies_the_camera() {
    let mut game = running_game();
    let before = game.camera().unwrap().position().z;
    game.on_mouse_wheel(1.0, 0.0, 0.0);
    assert_close(game.camera().unwrap().position().z, before + 0.5);
}

#[test]
fn update_animates_the_scene() {
    let mut game = initialized_game();
    game.update(0.016, FRAC_PI_2);

    let cube = &game.entities()[1];
    assert_close(cube.position().y, 1.0);
    assert_close(cube.world_matrix().w.y, 1.0);
    let helix = &game.entities()[2];
    assert_close(helix.scale().x, 2.0);
}

#[test]
fn lights_come_from_the_config() {
    let game = initialized_game();
    assert_eq!(game.lights(), Some(&GameConfig::default().lights));
}
