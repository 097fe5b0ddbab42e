use case_core::{Lighting, Material, SceneGraph, TextureId};
use fnv::FnvHashMap;
use glam::Mat4;
use wgpu::util::DeviceExt;

mod helpers;
mod mesh;

use helpers::GpuTexture;
use mesh::ModelGpu;

pub static MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
}

impl FrameUniforms {
    fn new(view_proj: Mat4, model: Mat4, lighting: &Lighting) -> Self {
        let a = lighting.ambient;
        let d = lighting.directional;
        let dir = d.to_light();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            ambient: [
                a.color[0] * a.intensity,
                a.color[1] * a.intensity,
                a.color[2] * a.intensity,
                0.0,
            ],
            light_dir: [dir.x, dir.y, dir.z, 0.0],
            light_color: [
                d.color[0] * d.intensity,
                d.color[1] * d.intensity,
                d.color[2] * d.intensity,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MaterialUniforms {
    base_color: [f32; 4],
}

struct MaterialGpu {
    _uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// What to draw this frame.
pub struct FrameView<'l> {
    pub view_proj: Mat4,
    pub model: Mat4,
    pub lighting: &'l Lighting,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    material_bgl: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bg: wgpu::BindGroup,
    depth: GpuTexture,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    textures: FnvHashMap<TextureId, GpuTexture>,
    materials: Vec<MaterialGpu>,
    model: Option<ModelGpu>,
    clear_color: wgpu::Color,
    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'a>,
        width: u32,
        height: u32,
        clear_linear: [f32; 3],
    ) -> anyhow::Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {}x{} format={:?}", width, height, format);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_WGSL.into()),
        });
        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let material_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[&frame_bgl, &material_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[mesh::Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: helpers::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                &Lighting::default(),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bg"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("color_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let depth = helpers::create_depth_texture(&device, width, height);
        let white = helpers::create_white_texture(&device, &queue);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            material_bgl,
            frame_buffer,
            frame_bg,
            depth,
            sampler,
            white,
            textures: FnvHashMap::default(),
            materials: Vec::new(),
            model: None,
            clear_color: wgpu::Color {
                r: clear_linear[0] as f64,
                g: clear_linear[1] as f64,
                b: clear_linear[2] as f64,
                a: 1.0,
            },
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth = helpers::create_depth_texture(&self.device, width, height);
        }
    }

    /// Reconfigure after the surface was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Upload geometry for a scene instance. Re-uploading the same instance
    /// is skipped.
    pub fn upload_scene(&mut self, scene: &SceneGraph) {
        if self.model.as_ref().map(|m| m.scene) == Some(scene.id()) {
            return;
        }
        self.model = Some(mesh::upload_scene(&self.device, scene));
        self.materials.clear();
    }

    pub fn clear_model(&mut self) {
        self.model = None;
        self.materials.clear();
        self.textures.clear();
    }

    /// Rebuild bindings for materials flagged `needs_update` (and any not yet
    /// built), then clear the flags.
    pub fn sync_materials(&mut self, scene: &mut SceneGraph) {
        let mut rebuilt = 0usize;
        for (i, mat) in scene.materials.iter_mut().enumerate() {
            if !mat.needs_update && i < self.materials.len() {
                continue;
            }
            let view = match &mat.map {
                Some(img) => {
                    let device = &self.device;
                    let queue = &self.queue;
                    &self
                        .textures
                        .entry(img.id())
                        .or_insert_with(|| helpers::upload_texture_image(device, queue, img))
                        .view
                }
                None => &self.white.view,
            };
            let uniform_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("material_uniforms"),
                    contents: bytemuck::bytes_of(&MaterialUniforms {
                        base_color: mat.base_color,
                    }),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("material_bg"),
                layout: &self.material_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            let gpu = MaterialGpu {
                _uniform_buffer: uniform_buffer,
                bind_group,
            };
            if i < self.materials.len() {
                self.materials[i] = gpu;
            } else {
                self.materials.push(gpu);
            }
            mat.needs_update = false;
            rebuilt += 1;
        }
        self.materials.truncate(scene.materials.len());
        if rebuilt > 0 {
            let dropped = prune_textures(&mut self.textures, &scene.materials);
            log::debug!(
                "[gpu] rebuilt {} material binding(s), dropped {} texture(s)",
                rebuilt,
                dropped
            );
        }
    }

    /// Draw one frame. Without a model only the clear color is shown.
    pub fn render(&mut self, view: &FrameView) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(view.view_proj, view.model, view.lighting)),
        );
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(model) = &self.model {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.frame_bg, &[]);
                for prim in &model.primitives {
                    let Some(mat) = self.materials.get(prim.material) else {
                        continue;
                    };
                    rpass.set_bind_group(1, &mat.bind_group, &[]);
                    rpass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                    rpass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..prim.index_count, 0, 0..1);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

// Evicts cached textures that no material maps any more.
fn prune_textures<V>(cache: &mut FnvHashMap<TextureId, V>, materials: &[Material]) -> usize {
    let before = cache.len();
    cache.retain(|id, _| {
        materials
            .iter()
            .any(|m| m.map.as_ref().is_some_and(|t| t.id() == *id))
    });
    before - cache.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_core::TextureImage;
    use std::sync::Arc;

    #[test]
    fn unreferenced_textures_are_evicted() {
        let old = Arc::new(TextureImage::new(1, 1, vec![0; 4]));
        let current = Arc::new(TextureImage::new(1, 1, vec![255; 4]));
        let mut cache: FnvHashMap<TextureId, ()> = FnvHashMap::default();
        cache.insert(old.id(), ());
        cache.insert(current.id(), ());

        let materials = vec![
            Material {
                map: Some(Arc::clone(&current)),
                ..Default::default()
            },
            Material::default(),
        ];
        assert_eq!(prune_textures(&mut cache, &materials), 1);
        assert!(cache.contains_key(&current.id()));
        assert!(!cache.contains_key(&old.id()));

        assert_eq!(prune_textures(&mut cache, &materials), 0);
        assert_eq!(prune_textures(&mut cache, &[]), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn frame_uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 176);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 16);
    }

    #[test]
    fn frame_uniforms_scale_light_colors_by_intensity() {
        let u = FrameUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &Lighting::default());
        assert!((u.ambient[0] - 1.2).abs() < 1e-6);
        assert!((u.light_color[1] - 1.0).abs() < 1e-6);
        let len = (u.light_dir[0].powi(2) + u.light_dir[1].powi(2) + u.light_dir[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }
}
