//! Application event loop.
//!
//! [`App`] drives a [`Game`] from winit: window events are translated into
//! the game's input hooks and every redraw runs one update followed by one
//! draw.
//!
//! # Lifecycle Flow
//!
//! 1. `resumed` creates the window, the GPU context and the renderer, then
//!    initializes the game
//! 2. Window events are forwarded to the game (`on_key`, `on_mouse_*`,
//!    `on_resize`)
//! 3. Each `RedrawRequested` advances the [`FrameClock`], updates the game
//!    and executes its frame plan
//! 4. The loop exits on close, on an Escape quit request or when start-up
//!    fails

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    config::GameConfig,
    context::Context,
    error::InitializationError,
    game::{Game, MouseButtons},
    render::Renderer,
};

/// Shortest frame time handed to the game.
pub const MIN_FRAME_TIME: Duration = Duration::from_micros(100);
/// Longest frame time handed to the game, so a stall does not teleport
/// the scene.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

const PIXELS_PER_NOTCH: f32 = 120.0;

/// Frame timing and the once-per-second statistics of the title bar.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    stats_start: Instant,
    frames_since_stats: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            stats_start: now,
            frames_since_stats: 0,
        }
    }

    /// Returns `(delta_time, total_time)` in seconds for the frame that is
    /// about to run.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = clamp_frame_time(now.duration_since(self.last));
        self.last = now;
        self.frames_since_stats += 1;
        (dt.as_secs_f32(), now.duration_since(self.start).as_secs_f32())
    }

    /// Frames per second and milliseconds per frame, once at least a second
    /// has passed since the last report.
    pub fn stats(&mut self) -> Option<(u32, f32)> {
        let elapsed = self.stats_start.elapsed();
        if elapsed < Duration::from_secs(1) || self.frames_since_stats == 0 {
            return None;
        }
        let fps = (self.frames_since_stats as f32 / elapsed.as_secs_f32()).round() as u32;
        let frame_ms = elapsed.as_secs_f32() * 1000.0 / self.frames_since_stats as f32;
        self.stats_start = Instant::now();
        self.frames_since_stats = 0;
        Some((fps, frame_ms))
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn clamp_frame_time(dt: Duration) -> Duration {
    dt.clamp(MIN_FRAME_TIME, MAX_FRAME_TIME)
}

/// Wheel movement in notches. Touchpads report pixels, 120 of which make
/// one notch.
pub fn wheel_notches(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_NOTCH,
    }
}

/// Title bar text with frame statistics appended.
pub fn stats_title(title: &str, width: u32, height: u32, fps: u32, frame_ms: f32) -> String {
    format!("{title}    Width: {width}    Height: {height}    FPS: {fps}    Frame Time: {frame_ms:.3}ms")
}

/// GPU-side state, only present once the window exists.
#[derive(Debug)]
struct AppState {
    ctx: Context,
    renderer: Renderer,
}

impl AppState {
    async fn new(window: Arc<Window>, game: &mut Game) -> Result<Self, InitializationError> {
        let ctx = Context::new(window).await?;
        let (renderer, handles) = Renderer::load(&ctx, game.config()).await?;
        let (width, height) = ctx.size();
        game.init(&handles, width, height)?;
        Ok(Self { ctx, renderer })
    }

    fn resize(&mut self, game: &mut Game, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            game.on_resize(width, height);
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState>,
    game: Game,
    clock: FrameClock,
    buttons: MouseButtons,
    cursor: (f32, f32),
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: GameConfig) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            state: None,
            game: Game::new(config),
            clock: FrameClock::new(),
            buttons: MouseButtons::default(),
            cursor: (0.0, 0.0),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: InitializationError) {
        log::error!("Initialization failed: {error}");
        self.error = Some(error.into());
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let (delta_time, total_time) = self.clock.tick();
        self.game.update(delta_time, total_time);
        if self.game.should_exit() {
            event_loop.exit();
            return;
        }

        if let Some(plan) = self.game.draw() {
            match state.renderer.execute(&state.ctx, &plan) {
                Ok(()) => (),
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("Surface lost or outdated, reconfiguring");
                    let size = state.ctx.window.inner_size();
                    state.resize(&mut self.game, size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            }
        }

        let config = self.game.config();
        if config.show_stats {
            if let Some((fps, frame_ms)) = self.clock.stats() {
                let (width, height) = state.ctx.size();
                state
                    .ctx
                    .window
                    .set_title(&stats_title(&config.title, width, height, fps, frame_ms));
            }
        }
        state.ctx.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let config = self.game.config();
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match self
            .async_runtime
            .block_on(AppState::new(window, &mut self.game))
        {
            Ok(state) => {
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.clock = FrameClock::new();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(&mut self.game, size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.game
                        .on_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let pressed = button_state.is_pressed();
                match button {
                    MouseButton::Left => self.buttons.left = pressed,
                    MouseButton::Right => self.buttons.right = pressed,
                    MouseButton::Middle => self.buttons.middle = pressed,
                    _ => (),
                }
                let (x, y) = self.cursor;
                if pressed {
                    self.game.on_mouse_down(self.buttons, x, y);
                } else {
                    self.game.on_mouse_up(self.buttons, x, y);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                self.game
                    .on_mouse_move(self.buttons, self.cursor.0, self.cursor.1);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.game
                    .on_mouse_wheel(wheel_notches(delta), self.cursor.0, self.cursor.1);
            }
            _ => {}
        }
    }
}

/// Opens the window and runs the demo until it is closed.
///
/// Start-up failures end the event loop and are returned here.
pub fn run(config: GameConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
    {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_time_is_clamped() {
        assert_eq!(clamp_frame_time(Duration::ZERO), MIN_FRAME_TIME);
        assert_eq!(clamp_frame_time(Duration::from_secs(3)), MAX_FRAME_TIME);
        let typical = Duration::from_micros(16_667);
        assert_eq!(clamp_frame_time(typical), typical);
    }

    #[test]
    fn first_tick_is_at_least_the_minimum() {
        let mut clock = FrameClock::new();
        let (dt, total) = clock.tick();
        assert!(dt >= MIN_FRAME_TIME.as_secs_f32());
        assert!(total >= 0.0);
    }

    #[test]
    fn stats_wait_for_a_full_second() {
        let mut clock = FrameClock::new();
        clock.tick();
        assert_eq!(clock.stats(), None);
    }

    #[test]
    fn wheel_lines_pass_through() {
        assert_eq!(wheel_notches(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
    }

    #[test]
    fn wheel_pixels_become_notches() {
        let delta = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(30.0, 240.0));
        assert_eq!(wheel_notches(delta), 2.0);
        let delta = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, -60.0));
        assert_eq!(wheel_notches(delta), -0.5);
    }

    #[test]
    fn stats_title_lists_size_and_rate() {
        let title = stats_title("Ember Scene", 1280, 720, 60, 16.6667);
        assert_eq!(
            title,
            "Ember Scene    Width: 1280    Height: 720    FPS: 60    Frame Time: 16.667ms"
        );
    }
}
