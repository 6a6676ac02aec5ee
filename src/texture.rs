//! Texture decoding
//!
//! Turns raw image bytes into RGBA8 [`Texture`] values. Container format is
//! guessed from the byte signature, so every extension the classifier accepts
//! (jpg/png/webp/bmp/tga/tiff/exr/hdr) decodes through the same path.

use crate::error::AssetError;
use crate::scene::Texture;

/// Decodes texture files into RGBA8
#[derive(Debug, Default, Clone)]
pub struct TextureDecoder;

impl TextureDecoder {
    /// Create a new texture decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a texture from raw bytes
    pub fn decode(&self, name: Option<String>, data: &[u8]) -> Result<Texture, AssetError> {
        let image = image::load_from_memory(data)?;
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!(
            "decoded texture {:?} ({width}x{height}, {} bytes raw)",
            name,
            data.len()
        );

        Ok(Texture {
            name,
            width,
            height,
            data: rgba.into_raw(),
            srgb: true,
        })
    }
}
