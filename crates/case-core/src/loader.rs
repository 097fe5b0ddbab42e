//! glTF/GLB import into a [`SceneGraph`].

use crate::error::ViewerError;
use crate::scene::{Material, Mesh, Node, Primitive, SceneGraph};
use glam::Mat4;
use gltf::mesh::Mode;

/// Parse a binary (or embedded-JSON) glTF into a scene graph.
///
/// Materials keep their glTF indices; one extra default material is appended
/// for primitives that reference none.
pub fn load_scene_glb(bytes: &[u8]) -> Result<SceneGraph, ViewerError> {
    // Buffers only; embedded images are left undecoded.
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;

    let mut materials: Vec<Material> = document
        .materials()
        .map(|m| Material {
            name: m.name().map(str::to_owned),
            base_color: m.pbr_metallic_roughness().base_color_factor(),
            ..Default::default()
        })
        .collect();
    let default_material = materials.len();
    materials.push(Material {
        name: Some("default".to_owned()),
        ..Default::default()
    });

    let mut meshes = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let mut primitives = Vec::new();
        for prim in mesh.primitives() {
            let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or(ViewerError::MissingAttribute {
                    mesh: mesh.index(),
                    primitive: prim.index(),
                    attribute: "POSITION",
                })?
                .collect();
            let normals = reader.read_normals().map(|it| it.collect());
            let uvs = reader.read_tex_coords(0).map(|tc| tc.into_f32().collect());
            let indices: Vec<u32> = match reader.read_indices() {
                Some(ix) => ix.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let Some(indices) = triangulate(prim.mode(), indices) else {
                log::warn!(
                    "[assets] mesh {} primitive {}: skipping non-triangle mode {:?}",
                    mesh.index(),
                    prim.index(),
                    prim.mode()
                );
                continue;
            };
            let material = prim.material().index().unwrap_or(default_material);
            primitives.push(Primitive::new(
                positions,
                normals,
                uvs,
                Some(indices),
                material,
            ));
        }
        meshes.push(Mesh {
            name: mesh.name().map(str::to_owned),
            primitives,
        });
    }

    let nodes: Vec<Node> = document
        .nodes()
        .map(|n| Node {
            name: n.name().map(str::to_owned),
            transform: Mat4::from_cols_array_2d(&n.transform().matrix()),
            mesh: n.mesh().map(|m| m.index()),
            children: n.children().map(|c| c.index()).collect(),
        })
        .collect();

    let roots: Vec<usize> = match document
        .default_scene()
        .or_else(|| document.scenes().next())
    {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => {
            let mut has_parent = vec![false; nodes.len()];
            for n in &nodes {
                for &c in &n.children {
                    if let Some(flag) = has_parent.get_mut(c) {
                        *flag = true;
                    }
                }
            }
            (0..nodes.len()).filter(|&i| !has_parent[i]).collect()
        }
    };

    let scene = SceneGraph::new(nodes, roots, meshes, materials);
    if !scene.has_geometry() {
        return Err(ViewerError::EmptyScene);
    }
    log::info!(
        "[assets] model loaded: nodes={} meshes={} materials={}",
        scene.nodes.len(),
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}

/// Convert strip/fan index streams to a triangle list. Returns `None` for
/// point and line modes.
fn triangulate(mode: Mode, indices: Vec<u32>) -> Option<Vec<u32>> {
    match mode {
        Mode::Triangles => Some(indices),
        Mode::TriangleStrip => Some(
            indices
                .windows(3)
                .enumerate()
                .flat_map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect(),
        ),
        Mode::TriangleFan => Some(
            indices
                .windows(2)
                .skip(1)
                .flat_map(|w| [indices[0], w[0], w[1]])
                .collect(),
        ),
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => None,
    }
}
