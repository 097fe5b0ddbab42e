use case_core::{SceneGraph, SceneId};
use glam::{Mat3, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
    pub(crate) uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(crate) struct GpuPrimitive {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) material: usize,
}

/// GPU copy of one scene instance, node transforms baked into the vertices.
pub(crate) struct ModelGpu {
    pub(crate) scene: SceneId,
    pub(crate) primitives: Vec<GpuPrimitive>,
}

pub(crate) fn upload_scene(device: &wgpu::Device, scene: &SceneGraph) -> ModelGpu {
    let mut primitives = Vec::new();
    for inst in scene.mesh_instances() {
        let normal_m = Mat3::from_mat4(inst.world).inverse().transpose();
        for prim in &scene.meshes[inst.mesh].primitives {
            let vertices: Vec<Vertex> = prim
                .positions
                .iter()
                .zip(&prim.normals)
                .zip(&prim.uvs)
                .map(|((p, n), uv)| Vertex {
                    position: inst.world.transform_point3(Vec3::from(*p)).to_array(),
                    normal: (normal_m * Vec3::from(*n)).normalize_or_zero().to_array(),
                    uv: *uv,
                })
                .collect();
            let indices = valid_triangles(&prim.indices, vertices.len());
            if indices.is_empty() {
                continue;
            }
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vb"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_ib"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            primitives.push(GpuPrimitive {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
                material: prim.material,
            });
        }
    }
    log::info!(
        "[gpu] uploaded scene {:?}: {} primitive(s)",
        scene.id(),
        primitives.len()
    );
    ModelGpu {
        scene: scene.id(),
        primitives,
    }
}

// Drops triangles that reference vertices past the end of the buffer.
fn valid_triangles(indices: &[u32], vertex_count: usize) -> Vec<u32> {
    indices
        .chunks_exact(3)
        .filter(|t| t.iter().all(|&i| (i as usize) < vertex_count))
        .flatten()
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_triangles_are_dropped() {
        assert_eq!(valid_triangles(&[0, 1, 2, 0, 2, 9, 1], 3), vec![0, 1, 2]);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }
}
