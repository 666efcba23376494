use std::path::{Path, PathBuf};

use crate::{
    data_structures::{model, texture::Texture},
    error::LoadError,
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 *
 * Every asset is looked up by name in an ordered list of roots; the first root that
 * contains the file wins. Running from the crate directory, running the binary
 * directly and running tests all start in different working directories, so the
 * default roots cover each of them.
 */
pub mod mesh;
pub mod texture;

#[derive(Clone, Debug)]
pub struct AssetPaths {
    roots: Vec<PathBuf>,
}

impl AssetPaths {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// `./assets`, then `assets/` next to the executable, then the copy
    /// `build.rs` placed in `OUT_DIR`.
    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = vec![PathBuf::from("assets")];
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(exe_dir.join("assets"));
        }
        roots.push(PathBuf::from(env!("EMBER_BUILD_ASSETS")));
        roots
    }

    /// Returns the first existing `root/name`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, LoadError> {
        let mut tried = Vec::with_capacity(self.roots.len());
        for candidate in self.roots.iter().map(|root| root.join(name)) {
            if candidate.is_file() {
                if !tried.is_empty() {
                    log::debug!("{name} resolved to fallback {candidate:?} after {tried:?}");
                }
                return Ok(candidate);
            }
            tried.push(candidate);
        }
        Err(LoadError::NotFound {
            name: name.to_string(),
            tried,
        })
    }
}

pub async fn load_string(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn load_binary(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads an OBJ file into a single mesh.
pub async fn load_mesh(
    paths: &AssetPaths,
    file_name: &str,
    device: &wgpu::Device,
) -> Result<model::Mesh, LoadError> {
    let path = paths.resolve(file_name)?;
    let obj_text = load_string(&path).await?;
    let models = mesh::parse_obj(&obj_text)
        .await
        .map_err(|source| LoadError::Model {
            path: path.clone(),
            source,
        })?;
    let (vertices, indices) = mesh::merge_models(&models);
    if indices.is_empty() {
        return Err(LoadError::EmptyMesh { path });
    }
    log::info!(
        "Loaded {file_name}: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );
    Ok(mesh::upload(device, file_name, &vertices, &indices))
}

pub async fn load_texture(
    paths: &AssetPaths,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<Texture, LoadError> {
    let path = paths.resolve(file_name)?;
    let data = load_binary(&path).await?;
    Texture::from_bytes(device, queue, &data, file_name)
        .map_err(|source| LoadError::Image { path, source })
}
