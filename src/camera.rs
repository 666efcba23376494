//! Fly camera: yaw/pitch orientation, held-key movement and the
//! view/projection uniform shared by every pipeline.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3};
use wgpu::util::DeviceExt;
use winit::keyboard::KeyCode;

/// cgmath produces OpenGL clip space (z in -1..1), wgpu expects 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Pitch never reaches the poles, otherwise the view flips.
pub const PITCH_LIMIT: Deg<f32> = Deg(89.0);

/// Start-up parameters of the camera.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of mouse travel.
    pub sensitivity: f32,
    /// Units per wheel notch.
    pub dolly_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, -5.0),
            yaw: Deg(0.0),
            pitch: Deg(0.0),
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
            speed: 3.0,
            sensitivity: 0.005,
            dolly_step: 0.5,
        }
    }
}

/// Movement keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fast: bool,
}

#[derive(Debug)]
pub struct Camera {
    position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
    aspect: f32,
    speed: f32,
    sensitivity: f32,
    dolly_step: f32,
    keys: MoveKeys,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: config.position,
            yaw: config.yaw.into(),
            pitch: Rad::from(config.pitch),
            fovy: config.fovy.into(),
            znear: config.znear,
            zfar: config.zfar,
            aspect: 1.0,
            speed: config.speed,
            sensitivity: config.sensitivity,
            dolly_step: config.dolly_step,
            keys: MoveKeys::default(),
            view: Matrix4::from_scale(1.0),
            projection: Matrix4::from_scale(1.0),
        };
        camera.clamp_pitch();
        camera.set_projection_mat(width, height);
        camera.recompute_view();
        camera
    }

    /// Integrates held-key movement and rebuilds the view matrix.
    pub fn update(&mut self, delta_time: f32) {
        let mut step = self.speed * delta_time;
        if self.keys.fast {
            step *= 3.0;
        }
        let forward = self.forward();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = Vector3::unit_y();

        if self.keys.forward {
            self.position += forward * step;
        }
        if self.keys.backward {
            self.position -= forward * step;
        }
        if self.keys.right {
            self.position += right * step;
        }
        if self.keys.left {
            self.position -= right * step;
        }
        if self.keys.up {
            self.position += up * step;
        }
        if self.keys.down {
            self.position -= up * step;
        }

        self.recompute_view();
    }

    /// Turns the camera by a mouse delta in pixels.
    pub fn rotate_camera(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += Rad(delta_x * self.sensitivity);
        self.pitch += Rad(delta_y * self.sensitivity);
        self.clamp_pitch();
    }

    /// Rebuilds the projection for a new output size. Zero-sized surfaces
    /// (minimised windows) keep the previous projection.
    pub fn set_projection_mat(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.projection = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    /// Moves along the viewing direction, positive is forward.
    pub fn dolly(&mut self, notches: f32) {
        self.position += self.forward() * (notches * self.dolly_step);
        self.recompute_view();
    }

    /// Returns whether the key is one the camera reacts to.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let slot = match key {
            KeyCode::KeyW | KeyCode::ArrowUp => &mut self.keys.forward,
            KeyCode::KeyS | KeyCode::ArrowDown => &mut self.keys.backward,
            KeyCode::KeyA | KeyCode::ArrowLeft => &mut self.keys.left,
            KeyCode::KeyD | KeyCode::ArrowRight => &mut self.keys.right,
            KeyCode::Space => &mut self.keys.up,
            KeyCode::KeyX => &mut self.keys.down,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => &mut self.keys.fast,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    /// Unit vector the camera looks along. Positive pitch looks down,
    /// positive yaw turns to the right of the screen.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        Vector3::new(-sin_yaw * cos_pitch, -sin_pitch, cos_yaw * cos_pitch).normalize()
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn yaw(&self) -> Rad<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Rad<f32> {
        self.pitch
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn keys(&self) -> MoveKeys {
        self.keys
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    fn clamp_pitch(&mut self) {
        let limit = Rad::from(PITCH_LIMIT).0;
        self.pitch = Rad(self.pitch.0.clamp(-limit, limit));
    }

    fn recompute_view(&mut self) {
        self.view = Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y());
    }
}

/// View and projection as the shaders see them.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view: Matrix4::identity().into(),
            projection: Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn from_camera(camera: &Camera) -> Self {
        let mut uniform = Self::new();
        uniform.update_view_proj(camera);
        uniform
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view = camera.view_matrix().into();
        self.projection = camera.projection_matrix().into();
        self.position = camera.position().to_homogeneous().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: uniform buffer and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: CameraUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}
