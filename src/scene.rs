//! Decoded scene asset types
//!
//! This module provides the in-memory representation of loaded models and
//! textures. Meshes own their data outright, so cloning a [`Model`] produces
//! a fully independent copy that callers may reposition or rescale without
//! touching the cached original.

use glam::{Quat, Vec3};

/// A vertex with position, normal, and UV data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// 3D position
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [0.0, 0.0],
        }
    }
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// How to handle transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Texture slots a material may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    BaseColor,
    MetallicRoughness,
    Normal,
    Occlusion,
    Emissive,
}

impl TextureSlot {
    fn label(&self) -> &'static str {
        match self {
            Self::BaseColor => "base color",
            Self::MetallicRoughness => "metallic-roughness",
            Self::Normal => "normal",
            Self::Occlusion => "occlusion",
            Self::Emissive => "emissive",
        }
    }
}

/// A texture-unit budget for trimming optional material slots
///
/// The removal order is configuration, not a guaranteed optimal packing:
/// slots are dropped in the listed priority order until the material fits.
#[derive(Debug, Clone)]
pub struct TextureBudget {
    /// Maximum number of texture units a material may occupy
    pub max_units: usize,
    /// Optional slots, listed in the order they should be sacrificed
    pub optional_priority: Vec<TextureSlot>,
}

impl Default for TextureBudget {
    fn default() -> Self {
        Self {
            max_units: 4,
            optional_priority: vec![
                TextureSlot::Occlusion,
                TextureSlot::Emissive,
                TextureSlot::Normal,
                TextureSlot::MetallicRoughness,
            ],
        }
    }
}

/// Material properties for PBR rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Optional name of the material
    pub name: Option<String>,
    /// Base color factor (RGBA)
    pub base_color_factor: [f32; 4],
    /// Metallic factor
    pub metallic_factor: f32,
    /// Roughness factor
    pub roughness_factor: f32,
    /// Base color texture index
    pub base_color_texture: Option<usize>,
    /// Metallic-roughness texture (B: metallic, G: roughness)
    pub metallic_roughness_texture: Option<usize>,
    /// Normal map texture index
    pub normal_texture: Option<usize>,
    /// Occlusion texture index
    pub occlusion_texture: Option<usize>,
    /// Emissive texture index
    pub emissive_texture: Option<usize>,
    /// Emissive factor (RGB)
    pub emissive_factor: [f32; 3],
    /// Alpha mode
    pub alpha_mode: AlphaMode,
    /// Alpha cutoff for masked blending
    pub alpha_cutoff: f32,
    /// Whether the material is double-sided
    pub double_sided: bool,
    /// Whether the material is unlit (accepts only the base-color slot)
    pub unlit: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            base_color_texture: None,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            unlit: false,
        }
    }
}

impl Material {
    /// The fallback material bound to OBJ meshes with no MTL definition.
    ///
    /// Fixed neutral gray with mid roughness/metalness so the mesh is always
    /// renderable.
    pub fn neutral() -> Self {
        Self {
            name: Some("neutral".to_string()),
            base_color_factor: [0.8, 0.8, 0.8, 1.0],
            metallic_factor: 0.5,
            roughness_factor: 0.5,
            ..Default::default()
        }
    }

    /// Assign a texture index to a slot, if the material variant supports it.
    ///
    /// Unlit materials only accept the base-color slot; unsupported
    /// assignments are skipped with a diagnostic and return `false`.
    pub fn assign_texture(&mut self, slot: TextureSlot, index: usize) -> bool {
        if self.unlit && slot != TextureSlot::BaseColor {
            log::warn!(
                "material {:?} is unlit and has no {} slot, skipping texture {index}",
                self.name,
                slot.label()
            );
            return false;
        }

        *self.slot_mut(slot) = Some(index);
        true
    }

    /// Clear a texture slot, returning the index it held
    pub fn clear_texture(&mut self, slot: TextureSlot) -> Option<usize> {
        self.slot_mut(slot).take()
    }

    /// Number of texture units this material currently occupies
    pub fn texture_unit_count(&self) -> usize {
        [
            self.base_color_texture,
            self.metallic_roughness_texture,
            self.normal_texture,
            self.occlusion_texture,
            self.emissive_texture,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }

    /// Drop optional texture slots, in the budget's priority order, until the
    /// material fits within `budget.max_units`.
    pub fn trim_to_budget(&mut self, budget: &TextureBudget) {
        for &slot in &budget.optional_priority {
            if self.texture_unit_count() <= budget.max_units {
                break;
            }
            if let Some(index) = self.clear_texture(slot) {
                log::debug!(
                    "dropped {} texture {index} from material {:?} to fit {} units",
                    slot.label(),
                    self.name,
                    budget.max_units
                );
            }
        }

        if self.texture_unit_count() > budget.max_units {
            log::warn!(
                "material {:?} still exceeds texture budget ({} > {})",
                self.name,
                self.texture_unit_count(),
                budget.max_units
            );
        }
    }

    fn slot_mut(&mut self, slot: TextureSlot) -> &mut Option<usize> {
        match slot {
            TextureSlot::BaseColor => &mut self.base_color_texture,
            TextureSlot::MetallicRoughness => &mut self.metallic_roughness_texture,
            TextureSlot::Normal => &mut self.normal_texture,
            TextureSlot::Occlusion => &mut self.occlusion_texture,
            TextureSlot::Emissive => &mut self.emissive_texture,
        }
    }
}

/// A 3D mesh with vertex data and material index
///
/// Mesh data is owned, not shared, so `Clone` yields a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Optional name of the mesh
    pub name: Option<String>,
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Index of the material used by this mesh
    pub material_index: Option<usize>,
    /// Whether this mesh casts shadows
    pub cast_shadow: bool,
    /// Whether this mesh receives shadows
    pub receive_shadow: bool,
}

impl Mesh {
    /// Create a new mesh with the given data
    pub fn new(
        name: Option<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material_index: Option<usize>,
    ) -> Self {
        Self {
            name,
            vertices,
            indices,
            material_index,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    /// Number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounding box over the mesh's vertex positions
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some((min, max))
    }
}

/// Spatial transform (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Represents a loaded 3D model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Optional name of the model
    pub name: Option<String>,
    /// List of meshes in the model
    pub meshes: Vec<Mesh>,
    /// List of materials used by the meshes
    pub materials: Vec<Material>,
    /// Root transform, mutated by callers for scene placement
    pub transform: Transform,
}

impl Model {
    /// Total triangle count across all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Axis-aligned bounding box over all meshes, in model space
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut boxes = self.meshes.iter().filter_map(Mesh::bounding_box);
        let first = boxes.next()?;
        Some(boxes.fold(first, |(min, max), (bmin, bmax)| {
            (min.min(bmin), max.max(bmax))
        }))
    }

    /// Post-load normalization applied once before a model enters the cache.
    ///
    /// Recenters the model horizontally (X/Z) at the origin, leaves vertical
    /// placement untouched, and flags every mesh as both shadow caster and
    /// receiver. Every cached entry and every clone derived from it is
    /// pre-normalized.
    pub fn normalize_for_scene(&mut self) {
        if let Some((min, max)) = self.bounding_box() {
            let center = (min + max) * 0.5;
            self.transform.translation.x -= center.x;
            self.transform.translation.z -= center.z;
        }

        for mesh in &mut self.meshes {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        }
    }
}

/// A decoded texture, stored as RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Optional name of the texture
    pub name: Option<String>,
    /// Width of the texture in pixels
    pub width: u32,
    /// Height of the texture in pixels
    pub height: u32,
    /// Raw RGBA8 texture data
    pub data: Vec<u8>,
    /// Whether the texture uses sRGB color space
    pub srgb: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh(offset: f32) -> Mesh {
        let vertices = vec![
            Vertex::new([offset - 0.5, 0.0, -0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([offset + 0.5, 0.0, -0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([offset + 0.5, 1.0, 0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([offset - 0.5, 1.0, 0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
        ];
        Mesh::new(None, vertices, vec![0, 1, 2, 2, 3, 0], None)
    }

    #[test]
    fn test_normalize_recenters_horizontally_only() {
        let mut model = Model {
            name: None,
            meshes: vec![quad_mesh(10.0)],
            materials: Vec::new(),
            transform: Transform::default(),
        };

        model.normalize_for_scene();

        assert_eq!(model.transform.translation.x, -10.0);
        assert_eq!(model.transform.translation.z, 0.0);
        // Vertical placement is left untouched
        assert_eq!(model.transform.translation.y, 0.0);
        assert!(model.meshes[0].cast_shadow);
        assert!(model.meshes[0].receive_shadow);
    }

    #[test]
    fn test_model_clone_is_deep() {
        let mut model = Model {
            name: None,
            meshes: vec![quad_mesh(0.0)],
            materials: vec![Material::neutral()],
            transform: Transform::default(),
        };

        let mut copy = model.clone();
        copy.transform.translation = Vec3::new(5.0, 0.0, 5.0);
        copy.meshes[0].vertices[0].position = [99.0, 99.0, 99.0];

        assert_eq!(model.transform.translation, Vec3::ZERO);
        assert_eq!(model.meshes[0].vertices[0].position[0], -0.5);

        model.meshes[0].cast_shadow = true;
        assert!(!copy.meshes[0].cast_shadow);
    }

    #[test]
    fn test_unlit_material_rejects_roughness_map() {
        let mut material = Material {
            unlit: true,
            ..Default::default()
        };

        assert!(material.assign_texture(TextureSlot::BaseColor, 0));
        assert!(!material.assign_texture(TextureSlot::MetallicRoughness, 1));
        assert!(material.metallic_roughness_texture.is_none());
    }

    #[test]
    fn test_trim_to_budget_drops_in_priority_order() {
        let mut material = Material::default();
        for (i, slot) in [
            TextureSlot::BaseColor,
            TextureSlot::MetallicRoughness,
            TextureSlot::Normal,
            TextureSlot::Occlusion,
            TextureSlot::Emissive,
        ]
        .into_iter()
        .enumerate()
        {
            material.assign_texture(slot, i);
        }

        let budget = TextureBudget {
            max_units: 3,
            ..Default::default()
        };
        material.trim_to_budget(&budget);

        assert_eq!(material.texture_unit_count(), 3);
        // Occlusion and emissive go first per the default priority order
        assert!(material.occlusion_texture.is_none());
        assert!(material.emissive_texture.is_none());
        assert!(material.normal_texture.is_some());
        assert!(material.base_color_texture.is_some());
    }
}
