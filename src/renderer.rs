use anyhow::{bail, Result};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::core::{GpuContext, RenderTarget};
use crate::geometry::{Geometry, Vertex};
use crate::material::{Material, Side};
use crate::math::Color;
use crate::scene::{GeometryId, LightItem, MaterialId, NodeId, Scene, TextureId};
use crate::texture::TextureData;

pub const MAX_LIGHTS: usize = 4;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Frame/node uniforms and the shared vertex stage
pub const PRELUDE: &str = include_str!("shaders/prelude.wgsl");
const STANDARD_SHADER: &str = include_str!("shaders/standard.wgsl");
const BASIC_SHADER: &str = include_str!("shaders/basic.wgsl");
const BLIT_SHADER: &str = include_str!("shaders/blit.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
struct PointLightRaw {
    position: [f32; 4],
    color: [f32; 4],
}

/// Camera and lights, bound at group 0
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    camera_position: [f32; 4],
    light_count: u32,
    _pad: [u32; 3],
    lights: [PointLightRaw; MAX_LIGHTS],
}

impl FrameUniform {
    pub fn new(camera: &PerspectiveCamera, lights: &[LightItem]) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!("{} point lights in scene, only {} are used", lights.len(), MAX_LIGHTS);
        }

        let mut raw = [PointLightRaw::default(); MAX_LIGHTS];
        for (slot, item) in raw.iter_mut().zip(lights) {
            slot.position = item.position.extend(1.0).to_array();
            let [r, g, b] = item.light.color.to_array();
            slot.color = [r, g, b, item.light.intensity];
        }

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            light_count: lights.len().min(MAX_LIGHTS) as u32,
            _pad: [0; 3],
            lights: raw,
        }
    }

    pub fn light_count(&self) -> u32 {
        self.light_count
    }
}

/// Model and normal matrices, bound at group 1
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct NodeUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl NodeUniform {
    pub fn new(world: Mat4) -> Self {
        let normal = if world.determinant().abs() > f32::EPSILON {
            world.inverse().transpose()
        } else {
            world
        };
        Self {
            model: world.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct StandardParams {
    color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct BasicParams {
    color: [f32; 4],
}

/// Drawing buffer for a logical viewport: its size times the pixel ratio
pub fn drawing_buffer_size(viewport: (u32, u32), pixel_ratio: f32) -> (u32, u32) {
    let width = (viewport.0 as f32 * pixel_ratio).round() as u32;
    let height = (viewport.1 as f32 * pixel_ratio).round() as u32;
    (width.max(1), height.max(1))
}

/// Where the scene pass draws for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// Attachment size; the viewport always covers all of it
    pub buffer: (u32, u32),
    /// Draw into an offscreen buffer, then scale it over the whole target
    pub resample: bool,
}

/// Pick the drawing buffer for `target`.
///
/// A buffer within a pixel of the target (rounding) draws straight into it.
/// Anything else is drawn offscreen, capped at `max_dimension`, and stretched
/// to fill the target, so the pixel ratio changes resolution but never the
/// area covered.
pub fn plan_frame(viewport: (u32, u32), pixel_ratio: f32, target: (u32, u32), max_dimension: u32) -> FramePlan {
    let target = (target.0.max(1), target.1.max(1));
    let (width, height) = drawing_buffer_size(viewport, pixel_ratio);

    if width.abs_diff(target.0) <= 1 && height.abs_diff(target.1) <= 1 {
        return FramePlan {
            buffer: target,
            resample: false,
        };
    }

    let max_dimension = max_dimension.max(1);
    FramePlan {
        buffer: (width.min(max_dimension), height.min(max_dimension)),
        resample: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PipelineKey {
    Standard(Side),
    Basic { side: Side, wireframe: bool },
    Shader(MaterialId, Side),
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    edges: Option<(wgpu::Buffer, u32)>,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct GpuNode {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    map: Option<TextureId>,
}

struct DepthTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

struct BlitPipeline {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

struct OffscreenTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

struct Layouts {
    frame: wgpu::BindGroupLayout,
    node: wgpu::BindGroupLayout,
    standard: wgpu::BindGroupLayout,
    uniform_only: wgpu::BindGroupLayout,
}

struct DrawCall {
    pipeline: PipelineKey,
    geometry: GeometryId,
    node: NodeId,
    material: MaterialId,
    wireframe: bool,
}

/// Draws a [`Scene`] through a [`PerspectiveCamera`].
///
/// GPU buffers, textures and pipelines are created the first time a scene
/// object is drawn and cached by id; uniforms are rewritten every frame.
pub struct Renderer {
    gpu: GpuContext,
    format: wgpu::TextureFormat,
    clear_color: Color,
    clear_alpha: f32,
    pixel_ratio: f32,
    viewport: (u32, u32),
    layouts: Layouts,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    depth: Option<DepthTarget>,
    blit: Option<BlitPipeline>,
    offscreen: Option<OffscreenTarget>,
    meshes: HashMap<GeometryId, GpuMesh>,
    textures: HashMap<TextureId, GpuTexture>,
    nodes: HashMap<NodeId, GpuNode>,
    materials: HashMap<MaterialId, GpuMaterial>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    disposed: bool,
}

impl Renderer {
    pub fn new(gpu: GpuContext, format: wgpu::TextureFormat) -> Self {
        let device = gpu.device();
        let layouts = Self::create_layouts(device);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = Self::upload_texture(&gpu, &TextureData::solid("white", [255, 255, 255, 255]));

        Self {
            gpu,
            format,
            clear_color: Color::BLACK,
            clear_alpha: 1.0,
            pixel_ratio: 1.0,
            viewport: (1, 1),
            layouts,
            frame_buffer,
            frame_bind_group,
            sampler,
            white,
            depth: None,
            blit: None,
            offscreen: None,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            nodes: HashMap::new(),
            materials: HashMap::new(),
            pipelines: HashMap::new(),
            disposed: false,
        }
    }

    pub fn set_clear_color(&mut self, color: Color, alpha: f32) {
        self.clear_color = color;
        self.clear_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
    }

    /// Logical viewport size; the drawing buffer is this times the pixel ratio
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every cached GPU resource; later renders fail
    pub fn dispose(&mut self) {
        self.meshes.clear();
        self.textures.clear();
        self.nodes.clear();
        self.materials.clear();
        self.pipelines.clear();
        self.depth = None;
        self.offscreen = None;
        self.blit = None;
        self.disposed = true;
    }

    pub fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera, target: &RenderTarget) -> Result<()> {
        if self.disposed {
            bail!("Renderer used after dispose");
        }

        let max_dimension = self.gpu.device().limits().max_texture_dimension_2d;
        let plan = plan_frame(self.viewport, self.pixel_ratio, (target.width, target.height), max_dimension);
        if plan.resample {
            self.ensure_offscreen(plan.buffer);
        }
        self.ensure_depth(plan.buffer.0, plan.buffer.1);

        let lights = scene.point_lights();
        let frame = FrameUniform::new(camera, &lights);
        self.gpu
            .queue()
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        let mut calls = Vec::new();
        for item in scene.draw_list() {
            let material = scene.material(item.material);
            let wireframe = material.wireframe();

            self.ensure_mesh(item.geometry, scene.geometry(item.geometry), wireframe);
            self.write_node(item.node, item.world);
            self.write_material(item.material, material, scene)?;
            let pipeline = self.ensure_pipeline(item.material, material)?;

            calls.push(DrawCall {
                pipeline,
                geometry: item.geometry,
                node: item.node,
                material: item.material,
                wireframe,
            });
        }

        let (buffer_width, buffer_height) = plan.buffer;

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let color_view = match (&self.offscreen, plan.resample) {
                (Some(offscreen), true) => &offscreen.view,
                _ => target.view,
            };
            let depth_view = self.depth.as_ref().map(|depth| &depth.view);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu(self.clear_alpha)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: depth_view.map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_viewport(0.0, 0.0, buffer_width as f32, buffer_height as f32, 0.0, 1.0);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for call in &calls {
                let (Some(pipeline), Some(mesh), Some(node), Some(material)) = (
                    self.pipelines.get(&call.pipeline),
                    self.meshes.get(&call.geometry),
                    self.nodes.get(&call.node),
                    self.materials.get(&call.material),
                ) else {
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &node.bind_group, &[]);
                render_pass.set_bind_group(2, &material.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));

                match (&mesh.edges, call.wireframe) {
                    (Some((edges, count)), true) => {
                        render_pass.set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..*count, 0, 0..1);
                    }
                    _ => {
                        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                    }
                }
            }
        }

        if plan.resample {
            self.resample(&mut encoder, target.view);
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn ensure_offscreen(&mut self, size: (u32, u32)) {
        if self.offscreen.as_ref().is_some_and(|offscreen| offscreen.size == size) {
            return;
        }
        if self.blit.is_none() {
            self.blit = Some(Self::create_blit(self.gpu.device(), self.format));
        }
        let Some(blit) = &self.blit else {
            return;
        };

        let device = self.gpu.device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Drawing Buffer"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &blit.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("blit_bind_group"),
        });

        log::debug!("Drawing buffer is {}x{}", size.0, size.1);
        self.offscreen = Some(OffscreenTarget {
            _texture: texture,
            view,
            bind_group,
            size,
        });
    }

    /// Stretch the offscreen drawing buffer over the whole target
    fn resample(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let (Some(blit), Some(offscreen)) = (&self.blit, &self.offscreen) else {
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu(self.clear_alpha)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&blit.pipeline);
        render_pass.set_bind_group(0, &offscreen.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    fn create_blit(device: &wgpu::Device, format: wgpu::TextureFormat) -> BlitPipeline {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("blit_bind_group_layout"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        BlitPipeline { pipeline, layout }
    }

    fn ensure_depth(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if self.depth.as_ref().is_some_and(|depth| depth.size == size) {
            return;
        }

        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthTarget { view, size });
    }

    fn ensure_mesh(&mut self, id: GeometryId, geometry: &Geometry, wireframe: bool) {
        let device = self.gpu.device();
        let mesh = self.meshes.entry(id).or_insert_with(|| {
            let vertices = geometry.vertices();
            let indices = geometry.triangle_indices();
            log::debug!("Uploading geometry {:?}: {} vertices", id, vertices.len());

            GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: indices.len() as u32,
                edges: None,
            }
        });

        if wireframe && mesh.edges.is_none() {
            let edges = geometry.edge_indices();
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Edge Index Buffer"),
                contents: bytemuck::cast_slice(&edges),
                usage: wgpu::BufferUsages::INDEX,
            });
            mesh.edges = Some((buffer, edges.len() as u32));
        }
    }

    fn write_node(&mut self, id: NodeId, world: Mat4) {
        let device = self.gpu.device();
        let layout = &self.layouts.node;
        let node = self.nodes.entry(id).or_insert_with(|| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Node Uniform Buffer"),
                size: std::mem::size_of::<NodeUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some("node_bind_group"),
            });
            GpuNode { buffer, bind_group }
        });

        self.gpu
            .queue()
            .write_buffer(&node.buffer, 0, bytemuck::cast_slice(&[NodeUniform::new(world)]));
    }

    fn write_material(&mut self, id: MaterialId, material: &Material, scene: &Scene) -> Result<()> {
        let bytes = match material {
            Material::Standard(standard) => {
                let [r, g, b] = standard.color.to_array();
                let has_map = if standard.map.is_some() { 1.0 } else { 0.0 };
                bytemuck::bytes_of(&StandardParams {
                    color: [r, g, b, 1.0],
                    params: [standard.metalness, standard.roughness, has_map, 0.0],
                })
                .to_vec()
            }
            Material::Basic(basic) => {
                let [r, g, b] = basic.color.to_array();
                bytemuck::bytes_of(&BasicParams { color: [r, g, b, 1.0] }).to_vec()
            }
            Material::Shader(shader) => {
                shader.validate()?;
                shader.uniforms.to_bytes()
            }
        };

        let map = match material {
            Material::Standard(standard) => standard.map,
            _ => None,
        };
        if let Some(texture) = map {
            if !self.textures.contains_key(&texture) {
                let uploaded = Self::upload_texture(&self.gpu, scene.texture(texture));
                self.textures.insert(texture, uploaded);
            }
        }

        let stale = self
            .materials
            .get(&id)
            .is_some_and(|cached| cached.map != map || cached.buffer.size() != bytes.len() as u64);
        if stale || !self.materials.contains_key(&id) {
            let created = self.create_material(material, map, bytes.len() as u64);
            self.materials.insert(id, created);
        }

        if let Some(cached) = self.materials.get(&id) {
            self.gpu.queue().write_buffer(&cached.buffer, 0, &bytes);
        }
        Ok(())
    }

    fn create_material(&self, material: &Material, map: Option<TextureId>, size: u64) -> GpuMaterial {
        let device = self.gpu.device();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Material Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = match material {
            Material::Standard(_) => {
                let texture = map
                    .and_then(|id| self.textures.get(&id))
                    .unwrap_or(&self.white);
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &self.layouts.standard,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                    label: Some("standard_material_bind_group"),
                })
            }
            Material::Basic(_) | Material::Shader(_) => {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &self.layouts.uniform_only,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some("material_bind_group"),
                })
            }
        };

        GpuMaterial { buffer, bind_group, map }
    }

    fn ensure_pipeline(&mut self, id: MaterialId, material: &Material) -> Result<PipelineKey> {
        let key = match material {
            Material::Standard(standard) => PipelineKey::Standard(standard.side),
            Material::Basic(basic) => PipelineKey::Basic {
                side: basic.side,
                wireframe: basic.wireframe,
            },
            Material::Shader(shader) => PipelineKey::Shader(id, shader.side),
        };

        if self.pipelines.contains_key(&key) {
            return Ok(key);
        }

        let pipeline = match material {
            Material::Standard(standard) => self.create_pipeline(
                "Standard Pipeline",
                format!("{}\n{}", PRELUDE, STANDARD_SHADER),
                &self.layouts.standard,
                standard.side,
                wgpu::PrimitiveTopology::TriangleList,
            )?,
            Material::Basic(basic) => {
                let topology = if basic.wireframe {
                    wgpu::PrimitiveTopology::LineList
                } else {
                    wgpu::PrimitiveTopology::TriangleList
                };
                self.create_pipeline(
                    "Basic Pipeline",
                    format!("{}\n{}", PRELUDE, BASIC_SHADER),
                    &self.layouts.uniform_only,
                    basic.side,
                    topology,
                )?
            }
            Material::Shader(shader) => self.create_pipeline(
                "Shader Material Pipeline",
                shader.source.compose(PRELUDE),
                &self.layouts.uniform_only,
                shader.side,
                wgpu::PrimitiveTopology::TriangleList,
            )?,
        };

        log::debug!("Created pipeline {:?}", key);
        self.pipelines.insert(key, pipeline);
        Ok(key)
    }

    fn create_pipeline(
        &self,
        label: &str,
        source: String,
        material_layout: &wgpu::BindGroupLayout,
        side: Side,
        topology: wgpu::PrimitiveTopology,
    ) -> Result<wgpu::RenderPipeline> {
        let device = self.gpu.device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&self.layouts.frame, &self.layouts.node, material_layout],
            push_constant_ranges: &[],
        });

        let cull_mode = match topology {
            wgpu::PrimitiveTopology::TriangleList => side.cull_mode(),
            _ => None,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            bail!("{} failed to build: {}", label, error);
        }
        Ok(pipeline)
    }

    fn upload_texture(gpu: &GpuContext, data: &TextureData) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(data.name.as_str()),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue().write_texture(
            texture.as_image_copy(),
            &data.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        GpuTexture {
            _texture: texture,
            view,
        }
    }

    fn create_layouts(device: &wgpu::Device) -> Layouts {
        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        Layouts {
            frame: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0, both)],
                label: Some("frame_bind_group_layout"),
            }),
            node: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0, both)],
                label: Some("node_bind_group_layout"),
            }),
            standard: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
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
                label: Some("standard_bind_group_layout"),
            }),
            uniform_only: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0, both)],
                label: Some("material_bind_group_layout"),
            }),
        }
    }
}
