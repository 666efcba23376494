//! The demo itself: scene state, the per-frame update and input handling.
//!
//! `Game` owns everything that changes from frame to frame on the CPU. It
//! never touches the GPU; [`Game::draw`] only describes the frame and the
//! [`crate::render::Renderer`] carries it out.
//!
//! # Lifecycle
//!
//! 1. [`Game::init`] builds the scene once the renderer has loaded its assets
//! 2. [`Game::update`] runs every frame; the first call starts the game
//! 3. [`Game::draw`] describes the frame while the game is running
//! 4. Holding Escape during an update requests shutdown; no frame is drawn after

use std::collections::HashMap;

use winit::keyboard::KeyCode;

use crate::{
    camera::{Camera, CameraUniform},
    config::GameConfig,
    data_structures::{
        entity::Entity,
        model::{MaterialId, MeshId},
        particle::Emitter,
    },
    error::InitializationError,
    pipelines::light::DirectionalLight,
    render::{Draw, FramePlan},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Running,
    ShuttingDown,
}

/// Arena handles of every loaded mesh and material, by configured name.
#[derive(Clone, Debug, Default)]
pub struct SceneHandles {
    pub meshes: HashMap<String, MeshId>,
    pub materials: HashMap<String, MaterialId>,
}

/// Mouse buttons held while a mouse event arrived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

#[derive(Debug)]
struct Scene {
    camera: Camera,
    entities: Vec<Entity>,
    emitter: Emitter,
    lights: [DirectionalLight; 2],
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    lifecycle: Lifecycle,
    scene: Option<Scene>,
    prev_mouse: (f32, f32),
    escape_held: bool,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Uninitialized,
            scene: None,
            prev_mouse: (0.0, 0.0),
            escape_held: false,
        }
    }

    /// Builds the camera, emitter, entities and lights.
    ///
    /// Entity mesh and material names are looked up in `handles`; a name that
    /// was never loaded fails the whole initialization.
    pub fn init(
        &mut self,
        handles: &SceneHandles,
        width: u32,
        height: u32,
    ) -> Result<(), InitializationError> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(InitializationError::AlreadyInitialized);
        }

        let mut entities = Vec::with_capacity(self.config.entities.len());
        for desc in &self.config.entities {
            let mesh = *handles
                .meshes
                .get(&desc.mesh)
                .ok_or_else(|| InitializationError::UnknownMesh(desc.mesh.clone()))?;
            let material = *handles
                .materials
                .get(&desc.material)
                .ok_or_else(|| InitializationError::UnknownMaterial(desc.material.clone()))?;

            let mut entity = Entity::new(mesh, material).with_motion(desc.motion);
            entity.set_position(desc.position);
            entity.set_rotation(desc.rotation);
            entity.set_scale(desc.scale);
            entity.finalize_matrix();
            entities.push(entity);
        }

        self.scene = Some(Scene {
            camera: Camera::new(&self.config.camera, width, height),
            entities,
            emitter: Emitter::new(self.config.emitter.clone()),
            lights: self.config.lights,
        });
        self.lifecycle = Lifecycle::Initialized;
        log::info!(
            "Scene initialized with {} entities at {width}x{height}",
            self.config.entities.len()
        );
        Ok(())
    }

    /// Advances the simulation by `delta_time` seconds; `total_time` is the
    /// time since start-up.
    pub fn update(&mut self, delta_time: f32, total_time: f32) {
        match self.lifecycle {
            Lifecycle::Uninitialized | Lifecycle::ShuttingDown => return,
            Lifecycle::Initialized => self.lifecycle = Lifecycle::Running,
            Lifecycle::Running => (),
        }
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        scene.emitter.update(delta_time);
        for entity in &mut scene.entities {
            entity.apply_motion(delta_time, total_time);
            entity.finalize_matrix();
        }
        scene.camera.update(delta_time);

        if self.escape_held {
            log::info!("Escape pressed, shutting down");
            self.lifecycle = Lifecycle::ShuttingDown;
        }
    }

    /// Describes the next frame, or `None` when nothing may be drawn.
    pub fn draw(&self) -> Option<FramePlan> {
        if self.lifecycle != Lifecycle::Running {
            return None;
        }
        let scene = self.scene.as_ref()?;

        let mut plan = FramePlan::new(CameraUniform::from_camera(&scene.camera));
        plan.push(Draw::Clear(self.config.clear_colour));
        for (index, entity) in scene.entities.iter().enumerate() {
            plan.push(Draw::Entity {
                index,
                mesh: entity.mesh(),
                material: entity.material(),
                uniform: entity.to_uniform(),
            });
        }
        plan.push(Draw::ParticleStates);
        let mut instances = Vec::with_capacity(scene.emitter.live_count());
        scene.emitter.write_instances(&mut instances);
        plan.push(Draw::Particles { instances });
        plan.push(Draw::ResetStates);
        plan.push(Draw::Present);
        Some(plan)
    }

    /// Call after the surface has been rebuilt for the new size.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.camera.set_projection_mat(width, height);
        }
    }

    pub fn on_mouse_down(&mut self, _buttons: MouseButtons, x: f32, y: f32) {
        self.prev_mouse = (x, y);
    }

    pub fn on_mouse_up(&mut self, _buttons: MouseButtons, x: f32, y: f32) {
        self.prev_mouse = (x, y);
    }

    /// Dragging with the left button turns the camera by the cursor delta.
    pub fn on_mouse_move(&mut self, buttons: MouseButtons, x: f32, y: f32) {
        let (prev_x, prev_y) = self.prev_mouse;
        if buttons.left && (x != prev_x || y != prev_y) {
            if let Some(scene) = self.scene.as_mut() {
                scene.camera.rotate_camera(x - prev_x, y - prev_y);
            }
        }
        self.prev_mouse = (x, y);
    }

    /// `wheel_delta` is in notches, positive away from the user.
    pub fn on_mouse_wheel(&mut self, wheel_delta: f32, _x: f32, _y: f32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.camera.dolly(wheel_delta);
        }
    }

    pub fn on_key(&mut self, key: KeyCode, pressed: bool) {
        if key == KeyCode::Escape {
            self.escape_held = pressed;
            return;
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.camera.handle_key(key, pressed);
        }
    }

    pub fn should_exit(&self) -> bool {
        self.lifecycle == Lifecycle::ShuttingDown
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.scene.as_ref().map(|scene| &scene.camera)
    }

    pub fn entities(&self) -> &[Entity] {
        self.scene
            .as_ref()
            .map_or(&[][..], |scene| scene.entities.as_slice())
    }

    pub fn emitter(&self) -> Option<&Emitter> {
        self.scene.as_ref().map(|scene| &scene.emitter)
    }

    pub fn lights(&self) -> Option<&[DirectionalLight; 2]> {
        self.scene.as_ref().map(|scene| &scene.lights)
    }
}
