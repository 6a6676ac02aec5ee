//! Error types for skyline_asset

use thiserror::Error;

/// Main error type for asset operations
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GLTF decode error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ decode error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;
