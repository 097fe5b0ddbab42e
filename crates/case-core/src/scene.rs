//! In-memory object graph consumed by the renderer.
//!
//! A [`SceneGraph`] is produced once per loaded model and carries a unique
//! [`SceneId`] so that one-shot passes (texture assignment, measurement) can
//! tell a fresh asset instance from the one they already processed.

use crate::bounds::Aabb;
use crate::texture::TextureImage;
use glam::{Mat4, Vec3};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    fn next() -> Self {
        SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: Option<String>,
    pub base_color: [f32; 4],
    pub map: Option<Arc<TextureImage>>,
    /// Set whenever bindings must be re-uploaded; the renderer clears it.
    pub needs_update: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            map: None,
            needs_update: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: usize,
}

impl Primitive {
    /// Build a primitive, filling in whatever optional attributes the source
    /// lacked: sequential indices, zero UVs, and area-weighted vertex normals.
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        uvs: Option<Vec<[f32; 2]>>,
        indices: Option<Vec<u32>>,
        material: usize,
    ) -> Self {
        let n = positions.len();
        let indices = indices.unwrap_or_else(|| (0..n as u32).collect());
        let uvs = match uvs {
            Some(uv) if uv.len() == n => uv,
            _ => vec![[0.0, 0.0]; n],
        };
        let normals = match normals {
            Some(nr) if nr.len() == n => nr,
            _ => generate_normals(&positions, &indices),
        };
        Self {
            positions,
            normals,
            uvs,
            indices,
            material,
        }
    }

    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|p| Vec3::from(*p)))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn generate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Mat4,
    pub mesh: Option<usize>,
    pub children: SmallVec<[usize; 4]>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            transform: Mat4::IDENTITY,
            mesh: None,
            children: SmallVec::new(),
        }
    }
}

/// A mesh reachable from the roots together with its world transform.
#[derive(Clone, Copy, Debug)]
pub struct MeshInstance {
    pub node: usize,
    pub mesh: usize,
    pub world: Mat4,
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    id: SceneId,
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl SceneGraph {
    pub fn new(
        nodes: Vec<Node>,
        roots: Vec<usize>,
        meshes: Vec<Mesh>,
        materials: Vec<Material>,
    ) -> Self {
        Self {
            id: SceneId::next(),
            nodes,
            roots,
            meshes,
            materials,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Depth-first walk from the roots, parents before children. The closure
    /// receives the node index, node, and composed world transform. A node
    /// reachable twice (malformed input) is visited only once.
    pub fn traverse(&self, mut f: impl FnMut(usize, &Node, &Mat4)) {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&r| (r, Mat4::IDENTITY))
            .collect();
        while let Some((idx, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            if std::mem::replace(&mut visited[idx], true) {
                continue;
            }
            let world = parent * node.transform;
            f(idx, node, &world);
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        self.traverse(|idx, node, world| {
            if let Some(mesh) = node.mesh.filter(|&m| m < self.meshes.len()) {
                out.push(MeshInstance {
                    node: idx,
                    mesh,
                    world: *world,
                });
            }
        });
        out
    }

    /// Model-space bounds of every primitive reachable from the roots.
    pub fn bounds(&self) -> Aabb {
        self.mesh_instances()
            .iter()
            .flat_map(|inst| {
                self.meshes[inst.mesh]
                    .primitives
                    .iter()
                    .map(move |p| p.local_bounds().transformed(&inst.world))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }

    /// Indices of materials used by at least one reachable primitive, sorted
    /// and deduplicated.
    pub fn reachable_materials(&self) -> Vec<usize> {
        let mut mats: Vec<usize> = self
            .mesh_instances()
            .iter()
            .flat_map(|inst| self.meshes[inst.mesh].primitives.iter().map(|p| p.material))
            .filter(|&m| m < self.materials.len())
            .collect();
        mats.sort_unstable();
        mats.dedup();
        mats
    }

    pub fn has_geometry(&self) -> bool {
        self.mesh_instances()
            .iter()
            .any(|inst| !self.meshes[inst.mesh].primitives.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(material: usize) -> Primitive {
        Primitive::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            None,
            Some(vec![0, 1, 2, 0, 2, 3]),
            material,
        )
    }

    #[test]
    fn missing_normals_face_the_winding() {
        let p = quad(0);
        for n in &p.normals {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(p.uvs.len(), 4);
        assert_eq!(p.triangle_count(), 2);
    }

    #[test]
    fn traverse_composes_parent_first() {
        let child = Node {
            transform: Mat4::from_translation(Vec3::X),
            mesh: Some(0),
            ..Default::default()
        };
        let mut root = Node {
            transform: Mat4::from_translation(Vec3::Y),
            ..Default::default()
        };
        root.children.push(1);
        let scene = SceneGraph::new(
            vec![root, child],
            vec![0],
            vec![Mesh {
                name: None,
                primitives: vec![quad(0)],
            }],
            vec![Material::default()],
        );
        let inst = scene.mesh_instances();
        assert_eq!(inst.len(), 1);
        assert_eq!(inst[0].world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn cyclic_children_do_not_loop() {
        let mut a = Node::default();
        a.children.push(1);
        let mut b = Node::default();
        b.children.push(0);
        let scene = SceneGraph::new(vec![a, b], vec![0], vec![], vec![]);
        let mut count = 0;
        scene.traverse(|_, _, _| count += 1);
        assert_eq!(count, 2);
        assert!(!scene.has_geometry());
    }
}
