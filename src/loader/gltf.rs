//! GLTF/GLB model decoding
//!
//! Parsing is delegated to the `gltf` crate; this module converts the parsed
//! document into the crate's [`Model`] representation. Both text `.gltf` and
//! binary `.glb` containers are handled by `gltf::import_slice`.

use crate::error::AssetError;
use crate::scene::{AlphaMode, Material, Mesh, Model, TextureSlot, Transform, Vertex};

use super::generate_smooth_normals;

/// Decode a GLTF or GLB asset from raw bytes
pub fn decode(path: &str, data: &[u8]) -> Result<Model, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(data)?;

    log::debug!(
        "parsed gltf '{path}' with {} meshes and {} materials",
        document.meshes().len(),
        document.materials().len()
    );

    let materials: Vec<Material> = document.materials().map(convert_material).collect();

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping non-triangle primitive ({:?}) in '{path}'",
                    primitive.mode()
                );
                continue;
            }

            let reader = primitive.reader(|buffer| {
                buffers.get(buffer.index()).map(|data| data.0.as_slice())
            });

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| {
                    AssetError::InvalidData(format!("mesh in '{path}' is missing positions"))
                })?
                .collect();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(iter) => iter.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(iter) => iter.collect(),
                None => generate_smooth_normals(&positions, &indices),
            };

            let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(iter) => iter.into_f32().collect(),
                None => vec![[0.0, 0.0]; positions.len()],
            };

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, &position)| Vertex {
                    position,
                    normal: normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
                    uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();

            meshes.push(Mesh::new(
                mesh.name().map(|s| s.to_string()),
                vertices,
                indices,
                primitive.material().index(),
            ));
        }
    }

    Ok(Model {
        name: None,
        meshes,
        materials,
        transform: Transform::default(),
    })
}

fn convert_material(material: gltf::Material<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();

    let mut out = Material {
        name: material.name().map(|s| s.to_string()),
        base_color_factor: pbr.base_color_factor(),
        metallic_factor: pbr.metallic_factor(),
        roughness_factor: pbr.roughness_factor(),
        emissive_factor: material.emissive_factor(),
        alpha_mode: match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        },
        alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
        double_sided: material.double_sided(),
        ..Default::default()
    };

    if let Some(info) = pbr.base_color_texture() {
        out.assign_texture(TextureSlot::BaseColor, info.texture().index());
    }
    if let Some(info) = pbr.metallic_roughness_texture() {
        out.assign_texture(TextureSlot::MetallicRoughness, info.texture().index());
    }
    if let Some(normal) = material.normal_texture() {
        out.assign_texture(TextureSlot::Normal, normal.texture().index());
    }
    if let Some(occlusion) = material.occlusion_texture() {
        out.assign_texture(TextureSlot::Occlusion, occlusion.texture().index());
    }
    if let Some(emissive) = material.emissive_texture() {
        out.assign_texture(TextureSlot::Emissive, emissive.texture().index());
    }

    out
}
