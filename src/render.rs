//! Frame composition and execution.
//!
//! [`crate::game::Game::draw`] describes a frame as a [`FramePlan`]: an ordered
//! list of [`Draw`] steps that carries every value the GPU needs. The
//! [`Renderer`] owns all GPU resources and replays the plan into one render
//! pass. Keeping the plan free of GPU handles lets the frame order be checked
//! without a device.
//!
//! # Key types
//!
//! - [`Draw`] is one step of a frame
//! - [`FramePlan`] is the whole frame, camera included
//! - [`Renderer`] loads meshes, materials and pipelines and executes plans
//!

use std::{collections::HashMap, iter};

use crate::{
    camera::{CameraResources, CameraUniform},
    config::GameConfig,
    context::Context,
    data_structures::{
        entity::EntityUniform,
        model::{self, Material, MaterialId, Mesh, MeshId},
        particle::ParticleRaw,
        texture,
    },
    error::InitializationError,
    game::SceneHandles,
    pipelines::{
        basic::{
            self, CAMERA_GROUP, ENTITY_GROUP, EntityResources, LIGHT_GROUP, MATERIAL_GROUP,
        },
        light::LightResources,
        particle::{self, ParticleResources, VERTICES_PER_PARTICLE},
    },
    resources::{self, texture::texture_layout},
};

/// One step of a frame.
///
/// # Variants
///
/// - `Clear` clears colour and depth, every frame starts with it
/// - `Entity` draws one opaque entity with its material
/// - `ParticleStates` switches to additive blending and read-only depth
/// - `Particles` draws all live particles in one instanced call
/// - `ResetStates` returns to the default opaque states
/// - `Present` hands the finished frame to the window
///
#[derive(Clone, Debug, PartialEq)]
pub enum Draw {
    Clear(wgpu::Color),
    Entity {
        index: usize,
        mesh: MeshId,
        material: MaterialId,
        uniform: EntityUniform,
    },
    ParticleStates,
    Particles { instances: Vec<ParticleRaw> },
    ResetStates,
    Present,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub camera: CameraUniform,
    pub draws: Vec<Draw>,
}

impl FramePlan {
    pub fn new(camera: CameraUniform) -> Self {
        Self {
            camera,
            draws: Vec::new(),
        }
    }

    pub fn push(&mut self, draw: Draw) {
        self.draws.push(draw);
    }

    /// Number of entity draws in the plan.
    pub fn entity_count(&self) -> usize {
        self.draws
            .iter()
            .filter(|draw| matches!(draw, Draw::Entity { .. }))
            .count()
    }
}

/// Owner of every GPU-resident resource of the scene.
#[derive(Debug)]
pub struct Renderer {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    entities: Vec<EntityResources>,
    entity_layout: wgpu::BindGroupLayout,
    camera: CameraResources,
    lights: LightResources,
    particles: ParticleResources,
}

impl Renderer {
    /// Loads every mesh and texture `config` names and builds the pipelines.
    ///
    /// Returns the renderer together with the name-to-handle tables the game
    /// needs to build its entities.
    pub async fn load(
        ctx: &Context,
        config: &GameConfig,
    ) -> Result<(Self, SceneHandles), InitializationError> {
        let device = &ctx.device;
        let paths = config.asset_paths();

        let texture_layout = texture_layout(device);
        let entity_layout = basic::mk_entity_bind_group_layout(device);
        let camera = CameraResources::new(device);
        let lights = LightResources::new(device, config.lights);

        log::info!("Loading {} meshes", config.meshes.len());
        let loaded_meshes = futures::future::try_join_all(
            config
                .meshes
                .iter()
                .map(|(_, file)| resources::load_mesh(&paths, file, device)),
        )
        .await?;

        log::info!("Loading {} materials", config.materials.len());
        let (textures, sprite) = futures::future::try_join(
            futures::future::try_join_all(
                config
                    .materials
                    .iter()
                    .map(|(_, file)| resources::load_texture(&paths, file, device, &ctx.queue)),
            ),
            resources::load_texture(&paths, &config.particle_texture, device, &ctx.queue),
        )
        .await?;

        let basic_pipeline = basic::mk_basic_pipeline(
            device,
            ctx.config.format,
            &texture_layout,
            &camera.bind_group_layout,
            &lights.bind_group_layout,
            &entity_layout,
        );
        let material_sampler = texture::create_anisotropic_sampler(device);

        let handles = SceneHandles {
            meshes: index_by_name(&config.meshes, MeshId),
            materials: index_by_name(&config.materials, MaterialId),
        };
        let meshes: Vec<Mesh> = config
            .meshes
            .iter()
            .zip(loaded_meshes)
            .map(|((name, _), mut mesh)| {
                mesh.name = name.clone();
                mesh
            })
            .collect();
        let materials: Vec<Material> = config
            .materials
            .iter()
            .zip(&textures)
            .map(|((name, _), texture)| {
                Material::new(
                    device,
                    name,
                    basic_pipeline.clone(),
                    texture,
                    &material_sampler,
                    &texture_layout,
                )
            })
            .collect();

        let particle_pipeline = particle::mk_particle_pipeline(
            device,
            ctx.config.format,
            &texture_layout,
            &camera.bind_group_layout,
        );
        let sprite_bind_group = model::texture_bind_group(
            device,
            "particle_bind_group",
            &sprite,
            &texture::create_default_sampler(device),
            &texture_layout,
        );
        let particles = ParticleResources::new(
            device,
            particle_pipeline,
            sprite_bind_group,
            config.emitter.max_particles,
        );

        log::info!(
            "Renderer ready: meshes {:?}, materials {:?}",
            meshes.iter().map(|mesh| mesh.name.as_str()).collect::<Vec<_>>(),
            materials
                .iter()
                .map(|material| material.name.as_str())
                .collect::<Vec<_>>()
        );
        Ok((
            Self {
                meshes,
                materials,
                entities: Vec::new(),
                entity_layout,
                camera,
                lights,
                particles,
            },
            handles,
        ))
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    /// Replays `plan` into one render pass on the current surface texture.
    pub fn execute(&mut self, ctx: &Context, plan: &FramePlan) -> Result<(), wgpu::SurfaceError> {
        self.camera.write(&ctx.queue, plan.camera);

        // Every entity owns a uniform buffer, created the first time it is drawn
        let entity_slots = plan
            .draws
            .iter()
            .filter_map(|draw| match draw {
                Draw::Entity { index, .. } => Some(index + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        while self.entities.len() < entity_slots {
            self.entities.push(EntityResources::new(
                &ctx.device,
                &self.entity_layout,
                EntityUniform::default(),
            ));
        }

        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut output = Some(output);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        let mut render_pass: Option<wgpu::RenderPass<'static>> = None;

        for draw in &plan.draws {
            match draw {
                Draw::Clear(colour) => {
                    render_pass = Some(
                        encoder
                            .begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("Render Pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Clear(*colour),
                                        store: wgpu::StoreOp::Store,
                                    },
                                })],
                                depth_stencil_attachment: Some(
                                    wgpu::RenderPassDepthStencilAttachment {
                                        view: &ctx.depth_texture.view,
                                        depth_ops: Some(wgpu::Operations {
                                            load: wgpu::LoadOp::Clear(1.0),
                                            store: wgpu::StoreOp::Store,
                                        }),
                                        stencil_ops: None,
                                    },
                                ),
                                occlusion_query_set: None,
                                timestamp_writes: None,
                            })
                            .forget_lifetime(),
                    );
                }
                Draw::Entity {
                    index,
                    mesh,
                    material,
                    uniform,
                } => {
                    let Some(pass) = render_pass.as_mut() else {
                        log::warn!("entity {index} drawn before the frame was cleared");
                        continue;
                    };
                    let (Some(mesh), Some(material)) = (self.mesh(*mesh), self.material(*material))
                    else {
                        log::warn!("entity {index} references a mesh or material that was never loaded");
                        continue;
                    };
                    self.prepare_material(&ctx.queue, pass, *index, material, *uniform);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
                }
                Draw::ParticleStates => {
                    if let Some(pass) = render_pass.as_mut() {
                        pass.set_pipeline(&self.particles.pipeline);
                        pass.set_bind_group(0, &self.particles.bind_group, &[]);
                        pass.set_bind_group(1, &self.camera.bind_group, &[]);
                    }
                }
                Draw::Particles { instances } => {
                    let count = self.particles.write(&ctx.queue, instances);
                    if count == 0 {
                        continue;
                    }
                    if let Some(pass) = render_pass.as_mut() {
                        pass.set_vertex_buffer(0, self.particles.instance_buffer.slice(..));
                        pass.draw(0..VERTICES_PER_PARTICLE, 0..count);
                    }
                }
                // Pipeline state does not outlive a pass
                Draw::ResetStates => render_pass = None,
                Draw::Present => {
                    drop(render_pass.take());
                    ctx.queue.submit(iter::once(encoder.finish()));
                    if let Some(output) = output.take() {
                        output.present();
                    }
                    return Ok(());
                }
            }
        }

        drop(render_pass);
        ctx.queue.submit(iter::once(encoder.finish()));
        Ok(())
    }

    /**
     * Writes the entity's matrices and binds everything the basic shader reads: the
     * material's pipeline and texture, the camera and the lights.
     */
    fn prepare_material(
        &self,
        queue: &wgpu::Queue,
        render_pass: &mut wgpu::RenderPass<'_>,
        index: usize,
        material: &Material,
        uniform: EntityUniform,
    ) {
        let entity = &self.entities[index];
        entity.write(queue, uniform);
        render_pass.set_pipeline(&material.pipeline);
        render_pass.set_bind_group(MATERIAL_GROUP, &material.bind_group, &[]);
        render_pass.set_bind_group(CAMERA_GROUP, &self.camera.bind_group, &[]);
        render_pass.set_bind_group(LIGHT_GROUP, &self.lights.bind_group, &[]);
        render_pass.set_bind_group(ENTITY_GROUP, &entity.bind_group, &[]);
    }
}

/// Maps each configured name to the handle of its position in the arena.
fn index_by_name<I: Copy>(
    names: &[(String, String)],
    make: impl Fn(usize) -> I,
) -> HashMap<String, I> {
    names
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.clone(), make(i)))
        .collect()
}
