use crate::{
    data_structures::{model::Vertex, particle::ParticleRaw},
    pipelines::basic::{DepthMode, mk_render_pipeline},
};

/// Particles are depth tested against the scene but never occlude each other.
pub const PARTICLE_DEPTH: DepthMode = DepthMode::ReadOnly;

/// Source and destination are summed, so overlapping particles brighten
/// each other instead of sorting by depth.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Vertices per particle quad (two triangles, no index buffer).
pub const VERTICES_PER_PARTICLE: u32 = 6;

/**
 * Particles are depth-tested against the opaque geometry but never write
 * depth themselves, otherwise a particle drawn first would hide the ones
 * behind it.
 */
pub fn mk_particle_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    texture_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Pipeline Layout"),
        bind_group_layouts: &[texture_bind_group_layout, camera_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Particle Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particle.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(ADDITIVE_BLENDING),
        Some(PARTICLE_DEPTH),
        None,
        &[ParticleRaw::desc()],
        shader,
    )
}

/// Instance buffer sized for the emitter's whole pool plus the sprite
/// texture binding.
#[derive(Debug)]
pub struct ParticleResources {
    pub pipeline: wgpu::RenderPipeline,
    pub instance_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl ParticleResources {
    pub fn new(
        device: &wgpu::Device,
        pipeline: wgpu::RenderPipeline,
        bind_group: wgpu::BindGroup,
        capacity: usize,
    ) -> Self {
        let size = (capacity.max(1) * std::mem::size_of::<ParticleRaw>()) as wgpu::BufferAddress;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Instance Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            pipeline,
            instance_buffer,
            bind_group,
            capacity,
        }
    }

    /// Uploads the live particles and returns how many instances to draw.
    /// Anything past the buffer's capacity is dropped.
    pub fn write(&self, queue: &wgpu::Queue, instances: &[ParticleRaw]) -> u32 {
        let instances = &instances[..instances.len().min(self.capacity)];
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        instances.len() as u32
    }
}
