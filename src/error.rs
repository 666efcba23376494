//! Typed failures for asset loading and start-up.
//!
//! Anything that goes wrong before the first frame is fatal: the event loop
//! exits and [`crate::flow::run`] hands the error back to `main`.

use std::path::PathBuf;

use thiserror::Error;

/// A file the scene depends on could not be turned into a GPU resource.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("asset `{name}` not found (tried: {tried:?})")]
    NotFound { name: String, tried: Vec<PathBuf> },
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model {path:?}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to decode image {path:?}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("model {path:?} contains no triangles")]
    EmptyMesh { path: PathBuf },
}

/// The demo could not reach a renderable state.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("could not create the window")]
    Window(#[from] winit::error::OsError),
    #[error("could not create a surface for the window")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("could not open the graphics device")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the surface reports no supported texture format")]
    UnsupportedSurface,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("entity references unknown mesh `{0}`")]
    UnknownMesh(String),
    #[error("entity references unknown material `{0}`")]
    UnknownMaterial(String),
    #[error("the game was already initialized")]
    AlreadyInitialized,
}
