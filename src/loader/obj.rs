//! OBJ model decoding with MTL sidecar support
//!
//! Parsing is delegated to the `tobj` crate. Before decoding, the loader
//! probes the source for a sibling `.mtl` file with the same base name; when
//! present its material definitions are bound to the geometry. A missing or
//! unreadable sidecar is an expected variant, not an error: meshes without a
//! material fall back to [`Material::neutral`] so they are always renderable.

use std::io::Cursor;
use std::path::Path;

use ahash::AHashMap;

use crate::error::AssetError;
use crate::scene::{Material, Mesh, Model, Transform, Vertex};
use crate::source::AssetSource;

use super::generate_smooth_normals;

/// Decode an OBJ asset, resolving its MTL sidecar through `source`
pub async fn decode(
    source: &dyn AssetSource,
    path: &str,
    data: &[u8],
) -> Result<Model, AssetError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| AssetError::InvalidData(format!("'{path}' is not valid UTF-8 OBJ text")))?;

    let mtl_bytes = fetch_sidecar(source, path).await;

    let (obj_models, obj_materials) = tobj::load_obj_buf(
        &mut Cursor::new(text),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_mtl_path| match &mtl_bytes {
            Some(bytes) => tobj::load_mtl_buf(&mut Cursor::new(bytes.as_slice())),
            None => Ok((Vec::new(), AHashMap::new())),
        },
    )?;

    let mut materials: Vec<Material> = match obj_materials {
        Ok(parsed) => parsed.iter().map(convert_material).collect(),
        Err(err) => {
            log::warn!("failed to decode MTL sidecar for '{path}': {err}");
            Vec::new()
        }
    };

    // Lazily appended fallback shared by every unmaterialed mesh
    let mut neutral_index: Option<usize> = None;

    let meshes = obj_models
        .into_iter()
        .map(|obj_model| {
            let mesh = obj_model.mesh;

            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            let indices = mesh.indices;

            let normals: Vec<[f32; 3]> = if mesh.normals.is_empty() {
                generate_smooth_normals(&positions, &indices)
            } else {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect()
            };

            let uvs: Vec<[f32; 2]> = if mesh.texcoords.is_empty() {
                vec![[0.0, 0.0]; positions.len()]
            } else {
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|t| [t[0], t[1]])
                    .collect()
            };

            let vertices: Vec<Vertex> = positions
                .iter()
                .enumerate()
                .map(|(i, &position)| Vertex {
                    position,
                    normal: normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
                    uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();

            let material_index = match mesh.material_id.filter(|&id| id < materials.len()) {
                Some(id) => id,
                None => *neutral_index.get_or_insert_with(|| {
                    materials.push(Material::neutral());
                    materials.len() - 1
                }),
            };

            Mesh::new(
                Some(obj_model.name),
                vertices,
                indices,
                Some(material_index),
            )
        })
        .collect();

    Ok(Model {
        name: None,
        meshes,
        materials,
        transform: Transform::default(),
    })
}

/// Probe for and fetch the `.mtl` sibling of an OBJ path
async fn fetch_sidecar(source: &dyn AssetSource, obj_path: &str) -> Option<Vec<u8>> {
    let mtl_path = Path::new(obj_path)
        .with_extension("mtl")
        .to_string_lossy()
        .into_owned();

    if !source.exists(&mtl_path).await {
        log::debug!("no MTL sidecar at '{mtl_path}', using neutral fallback material");
        return None;
    }

    match source.fetch(&mtl_path, &|_, _| {}).await {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::warn!("MTL sidecar '{mtl_path}' exists but could not be read: {err}");
            None
        }
    }
}

fn convert_material(mtl: &tobj::Material) -> Material {
    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
    let alpha = mtl.dissolve.unwrap_or(1.0);

    // Phong shininess mapped onto a rough PBR equivalent
    let roughness = mtl
        .shininess
        .map(|s| (1.0 - (s / 900.0)).clamp(0.04, 1.0))
        .unwrap_or(0.5);

    Material {
        name: Some(mtl.name.clone()),
        base_color_factor: [diffuse[0], diffuse[1], diffuse[2], alpha],
        metallic_factor: 0.0,
        roughness_factor: roughness,
        ..Default::default()
    }
}
