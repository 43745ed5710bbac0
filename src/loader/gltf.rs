//! glTF 2.0 import.
//!
//! Both `.glb` containers and `.gltf` documents with embedded (`data:`) buffers are
//! supported. Node names and transforms are kept, so that viewers can look up the
//! sub-objects they re-material by the names given in the modelling tool.

use crate::color::{self, Color};
use crate::error::AssetError;
use crate::procedural::RenderMesh;
use crate::resource::{MapSlot, PhysicalMaterial, TextureBinding, TextureImage};
use crate::scene::{Object, SceneNode};
use gltf::mesh::util::ReadIndices;
use glamx::{Quat, Vec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Imports the default scene of a glTF asset.
///
/// The returned root node is named after `url` and holds one child per root node of
/// the scene. Each primitive gets its own material initialized from the file's
/// metallic-roughness parameters and base color texture.
pub fn load_gltf(url: &str, bytes: &[u8]) -> Result<SceneNode, AssetError> {
    let (document, buffers, images) = gltf::import_slice(bytes)
        .map_err(|e| AssetError::Parse(format!("{}: {}", url, e)))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::Parse(format!("{}: the file contains no scene", url)))?;

    let mut importer = Importer {
        buffers: &buffers,
        images: &images,
        textures: vec![None; images.len()],
        num_primitives: 0,
    };

    let root = SceneNode::new(url, None);
    for node in scene.nodes() {
        root.add_child(importer.node(&node));
    }

    if importer.num_primitives == 0 {
        return Err(AssetError::Parse(format!(
            "{}: no triangle geometry found",
            url
        )));
    }

    log::info!(
        "Imported {} ({} primitives, {} images)",
        url,
        importer.num_primitives,
        images.len()
    );

    Ok(root)
}

struct Importer<'a> {
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    textures: Vec<Option<Arc<TextureImage>>>,
    num_primitives: usize,
}

impl Importer<'_> {
    fn node(&mut self, node: &gltf::Node) -> SceneNode {
        let name = node
            .name()
            .or_else(|| node.mesh().and_then(|m| m.name()))
            .unwrap_or("");
        let result = SceneNode::new(name, None);

        let (translation, rotation, scale) = node.transform().decomposed();
        result.set_position(Vec3::from(translation));
        result.set_rotation(Quat::from_array(rotation));
        result.set_scale(Vec3::from(scale));

        if let Some(mesh) = node.mesh() {
            let mut primitives: Vec<_> = mesh
                .primitives()
                .filter_map(|p| self.primitive(&p))
                .collect();

            if primitives.len() == 1 {
                let (mesh, material) = primitives.remove(0);
                result.set_object(Some(Object::new(Rc::new(mesh), material)));
            } else {
                for (i, (mesh, material)) in primitives.into_iter().enumerate() {
                    let _ = result.add_mesh(&format!("{}_{}", name, i), mesh, material);
                }
            }
        }

        for child in node.children() {
            result.add_child(self.node(&child));
        }

        result
    }

    fn primitive(
        &mut self,
        primitive: &gltf::Primitive,
    ) -> Option<(RenderMesh, Rc<RefCell<PhysicalMaterial>>)> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive ({:?}).", primitive.mode());
            return None;
        }

        let reader = primitive.reader(|b| self.buffers.get(b.index()).map(|bb| bb.0.as_slice()));
        let coords: Vec<Vec3> = reader.read_positions()?.map(Vec3::from).collect();
        let normals: Option<Vec<Vec3>> = reader
            .read_normals()
            .map(|it| it.map(Vec3::from).collect());
        let uvs: Option<Vec<Vec2>> = reader
            .read_tex_coords(0)
            .map(|t| t.into_f32().map(Vec2::from).collect());

        let flat: Vec<u32> = match reader.read_indices() {
            Some(ReadIndices::U8(it)) => it.map(|v| v as u32).collect(),
            Some(ReadIndices::U16(it)) => it.map(|v| v as u32).collect(),
            Some(ReadIndices::U32(it)) => it.collect(),
            None => (0..coords.len() as u32).collect(),
        };
        let indices = flat
            .chunks_exact(3)
            .filter(|t| t.iter().all(|i| (*i as usize) < coords.len()))
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        let mut mesh = RenderMesh::new(coords, normals, uvs, Some(indices));
        mesh.complete();

        self.num_primitives += 1;
        let material = self.material(&primitive.material());
        Some((mesh, Rc::new(RefCell::new(material))))
    }

    fn material(&mut self, material: &gltf::Material) -> PhysicalMaterial {
        let pbr = material.pbr_metallic_roughness();
        let [r, g, b, a] = pbr.base_color_factor();

        let mut result = PhysicalMaterial::new()
            .with_color(color::linear_to_srgb(Color::new(r, g, b, a)))
            .with_roughness(pbr.roughness_factor())
            .with_metalness(pbr.metallic_factor());

        if material.alpha_mode() == gltf::material::AlphaMode::Blend {
            result = result.with_opacity(a);
        }

        if let Some(info) = pbr.base_color_texture() {
            let index = info.texture().source().index();
            if let Some(image) = self.image(index) {
                result.set_map(MapSlot::Base, Some(TextureBinding::new(image)));
            }
        }

        result
    }

    fn image(&mut self, index: usize) -> Option<Arc<TextureImage>> {
        if let Some(Some(cached)) = self.textures.get(index) {
            return Some(cached.clone());
        }

        let data = self.images.get(index)?;
        let pixels = match rgba_pixels(data) {
            Some(pixels) => pixels,
            None => {
                log::warn!("Unsupported embedded image format {:?}.", data.format);
                return None;
            }
        };

        match TextureImage::from_rgba(data.width, data.height, pixels) {
            Ok(image) => {
                self.textures[index] = Some(image.clone());
                Some(image)
            }
            Err(e) => {
                log::warn!("Ignoring embedded image {}: {}", index, e);
                None
            }
        }
    }
}

fn rgba_pixels(data: &gltf::image::Data) -> Option<Vec<u8>> {
    use gltf::image::Format;

    match data.format {
        Format::R8G8B8A8 => Some(data.pixels.clone()),
        Format::R8G8B8 => Some(
            data.pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
        ),
        Format::R8 => Some(data.pixels.iter().flat_map(|v| [*v, *v, *v, 255]).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle in the XY plane, shared by the `body` and `legs` nodes.
    const SOFA: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Sofa", "children": [1, 2], "translation": [0.0, 1.0, 0.0] },
            { "name": "body", "mesh": 0, "scale": [2.0, 2.0, 2.0] },
            { "name": "legs", "mesh": 0 }
        ],
        "meshes": [{
            "name": "Triangle",
            "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }]
        }],
        "materials": [{
            "pbrMetallicRoughness": {
                "baseColorFactor": [1.0, 0.0, 0.0, 1.0],
                "metallicFactor": 0.5,
                "roughnessFactor": 0.25
            }
        }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    #[test]
    fn named_nodes_are_kept() {
        let root = load_gltf("sofa.gltf", SOFA.as_bytes()).unwrap();
        assert_eq!(root.name(), "sofa.gltf");

        let sofa = root.find_by_name("Sofa").unwrap();
        assert_eq!(sofa.position(), Vec3::new(0.0, 1.0, 0.0));
        assert!(!sofa.data().has_object());

        let body = root.find_by_name("body").unwrap();
        assert!(body.data().has_object());
        assert_eq!(body.scale(), Vec3::splat(2.0));
        assert!(root.find_by_name("legs").is_some());
    }

    #[test]
    fn primitives_get_file_materials() {
        let root = load_gltf("sofa.gltf", SOFA.as_bytes()).unwrap();
        let body = root.find_by_name("body").unwrap();
        let material = body.material().unwrap();
        let material = material.borrow();

        assert_eq!(material.roughness, 0.25);
        assert_eq!(material.metalness, 0.5);
        assert!((material.color.r - 1.0).abs() < 1.0e-5);
        assert_eq!(material.color.g, 0.0);

        let legs = root.find_by_name("legs").unwrap().material().unwrap();
        assert!(!Rc::ptr_eq(&legs, &body.material().unwrap()));
    }

    #[test]
    fn imported_mesh_is_complete() {
        let root = load_gltf("sofa.gltf", SOFA.as_bytes()).unwrap();
        let body = root.find_by_name("body").unwrap();
        let data = body.data();
        let mesh = data.object().unwrap().mesh();

        assert_eq!(mesh.num_triangles(), 1);
        assert!(mesh.has_normals());
        assert!(mesh.has_uvs());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            load_gltf("broken.glb", b"definitely not gltf"),
            Err(AssetError::Parse(_))
        ));
    }
}
