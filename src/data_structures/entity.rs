//! Scene entities: a mesh/material pair with a local transform.
//!
//! Setters only touch the local fields. The world matrix is rebuilt on
//! [`Entity::finalize_matrix`] and is stale until then.

use cgmath::{Matrix, Matrix4, Rad, SquareMatrix, Vector3};

use crate::data_structures::model::{MaterialId, MeshId};

/// Per-frame animation the demo applies to an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    Static,
    /// Adds `rate * dt` (radians per second per axis) to the rotation.
    Spin { rate: Vector3<f32> },
    /// Sets the y position to `base_y + amplitude * sin(total_time)`.
    Bob { base_y: f32, amplitude: f32 },
    /// Sets a uniform scale of `sin(total_time) + 1`.
    Pulse,
}

#[derive(Clone, Debug)]
pub struct Entity {
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    scale: Vector3<f32>,
    world: Matrix4<f32>,
    mesh: MeshId,
    material: MaterialId,
    motion: Motion,
}

impl Entity {
    /// Identity transform and an identity world matrix.
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            world: Matrix4::identity(),
            mesh,
            material,
            motion: Motion::Static,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    /// Euler angles in radians: roll about z, then pitch about x, then yaw about y.
    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// The world matrix as of the last [`finalize_matrix`](Self::finalize_matrix).
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    /// Rebuilds the world matrix from scale, then rotation, then translation.
    pub fn finalize_matrix(&mut self) {
        let rotation = Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        self.world = Matrix4::from_translation(self.position)
            * rotation
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
    }

    /// Advances the entity's [`Motion`]. Does not finalize.
    pub fn apply_motion(&mut self, delta_time: f32, total_time: f32) {
        match self.motion {
            Motion::Static => (),
            Motion::Spin { rate } => self.rotation += rate * delta_time,
            Motion::Bob { base_y, amplitude } => {
                self.position.y = base_y + amplitude * total_time.sin();
            }
            Motion::Pulse => {
                let s = total_time.sin() + 1.0;
                self.scale = Vector3::new(s, s, s);
            }
        }
    }

    /// World and normal matrices in the column-major layout WGSL reads.
    pub fn to_uniform(&self) -> EntityUniform {
        // A zero scale (Pulse passes through it) has no inverse.
        let normal = self
            .world
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(self.world);
        EntityUniform {
            world: self.world.into(),
            normal: normal.into(),
        }
    }
}

/**
 * The per-entity data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityUniform {
    pub world: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}
