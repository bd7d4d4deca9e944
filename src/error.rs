use std::path::PathBuf;

use thiserror::Error;

/// Failures loading meshes and textures from disk. These are never fatal: callers log them and
/// substitute a fallback.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to load OBJ: {0}")]
    Obj(#[from] obj::ObjError),
    #[error("OBJ {} contains no triangles", .0.display())]
    EmptyMesh(PathBuf),
}

/// Failures reading a demo's RON config. Also non-fatal; the defaults are used instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
