//! Particle emitter: a fixed-size ring buffer of particles.
//!
//! Live particles occupy `live` consecutive slots starting at `first_alive`
//! (wrapping). All particles share one lifetime, so ages decrease from the
//! front of the ring to the back and the oldest particle is always the one
//! at `first_alive`. Retiring and recycling therefore only ever touch the
//! front of the ring.

use cgmath::Vector3;

use crate::data_structures::model;

/// Emission and appearance settings of an [`Emitter`].
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterConfig {
    pub max_particles: usize,
    pub particles_per_second: f32,
    /// Seconds a particle stays alive.
    pub particle_lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],
    pub start_velocity: Vector3<f32>,
    /// World position new particles are spawned at.
    pub start_position: Vector3<f32>,
    pub start_acceleration: Vector3<f32>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            particles_per_second: 100.0,
            particle_lifetime: 5.0,
            start_size: 0.1,
            end_size: 5.0,
            start_color: [1.0, 0.1, 0.1, 0.2],
            end_color: [1.0, 0.6, 0.1, 0.0],
            start_velocity: Vector3::new(-2.0, 2.0, 0.0),
            start_position: Vector3::new(2.0, 0.0, 0.0),
            start_acceleration: Vector3::new(0.0, -1.0, 0.0),
        }
    }
}

/// Spawn state of one particle. Everything drawn is derived from `age`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Spawn sequence number, unique per emitter.
    pub id: u64,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub acceleration: Vector3<f32>,
    pub age: f32,
}

impl Particle {
    fn dead() -> Self {
        Self {
            id: 0,
            position: Vector3::new(0.0, 0.0, 0.0),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            acceleration: Vector3::new(0.0, 0.0, 0.0),
            age: 0.0,
        }
    }

    /// Position after `age` seconds of constant acceleration.
    pub fn current_position(&self) -> Vector3<f32> {
        self.position + self.velocity * self.age + self.acceleration * (0.5 * self.age * self.age)
    }
}

#[derive(Debug)]
pub struct Emitter {
    config: EmitterConfig,
    particles: Vec<Particle>,
    first_alive: usize,
    live: usize,
    spawn_counter: f32,
    next_id: u64,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            particles: vec![Particle::dead(); config.max_particles],
            config,
            first_alive: 0,
            live: 0,
            spawn_counter: 0.0,
            next_id: 0,
        }
    }

    /// Ages and retires particles, then spawns at the configured rate.
    pub fn update(&mut self, delta_time: f32) {
        let capacity = self.particles.len();
        for i in 0..self.live {
            self.particles[(self.first_alive + i) % capacity].age += delta_time;
        }
        while self.live > 0 && self.particles[self.first_alive].age >= self.config.particle_lifetime {
            self.first_alive = (self.first_alive + 1) % capacity;
            self.live -= 1;
        }

        self.spawn_counter += self.config.particles_per_second.max(0.0) * delta_time;
        let whole = self.spawn_counter.floor();
        if whole >= 1.0 {
            self.emit(whole as usize);
            self.spawn_counter -= whole;
        }
    }

    /// Spawns `count` particles immediately, recycling the oldest ones once
    /// the pool is full.
    pub fn emit(&mut self, count: usize) {
        // Anything past one pool's worth would be recycled within this call
        let skipped = count.saturating_sub(self.particles.len());
        self.next_id += skipped as u64;
        for _ in 0..count - skipped {
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let capacity = self.particles.len();
        if capacity == 0 {
            return;
        }
        let slot = if self.live < capacity {
            let slot = (self.first_alive + self.live) % capacity;
            self.live += 1;
            slot
        } else {
            let slot = self.first_alive;
            self.first_alive = (self.first_alive + 1) % capacity;
            slot
        };

        self.particles[slot] = Particle {
            id: self.next_id,
            position: self.config.start_position,
            velocity: self.config.start_velocity,
            acceleration: self.config.start_acceleration,
            age: 0.0,
        };
        self.next_id += 1;
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Fraction of the spawn counter carried into the next update.
    pub fn spawn_counter(&self) -> f32 {
        self.spawn_counter
    }

    /// Live particles, oldest first.
    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        let capacity = self.particles.len();
        (0..self.live).map(move |i| &self.particles[(self.first_alive + i) % capacity])
    }

    /// Interpolation parameter `clamp(age / lifetime, 0, 1)`.
    pub fn lifetime_fraction(&self, age: f32) -> f32 {
        let lifetime = self.config.particle_lifetime;
        if lifetime <= 0.0 {
            return 1.0;
        }
        (age / lifetime).clamp(0.0, 1.0)
    }

    pub fn to_raw(&self, particle: &Particle) -> ParticleRaw {
        let t = self.lifetime_fraction(particle.age);
        let size = lerp(self.config.start_size, self.config.end_size, t);
        let mut color = [0.0; 4];
        for (i, c) in color.iter_mut().enumerate() {
            *c = lerp(self.config.start_color[i], self.config.end_color[i], t);
        }
        ParticleRaw {
            position: particle.current_position().into(),
            size,
            color,
        }
    }

    /// Replaces the contents of `out` with instance data for every live
    /// particle, oldest first.
    pub fn write_instances(&self, out: &mut Vec<ParticleRaw>) {
        out.clear();
        out.extend(self.live_particles().map(|p| self.to_raw(p)));
    }
}

fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/**
 * Instance data of one particle. The vertex shader expands it into a
 * camera-facing quad.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleRaw {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl model::Vertex for ParticleRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ParticleRaw>() as wgpu::BufferAddress,
            // One quad per instance, the corners come from the vertex index
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
