use crate::shaders;
use bytemuck::{Pod, Zeroable};
use geoview_common::{Rgb, Rotation, ViewportSize};
use geoview_geometry::SurfaceGeometry;
use geoview_render::{
    BackendError, Camera, GeometryHandle, MaterialDesc, MaterialHandle, NodeId, RenderBackend,
    SceneEnvironment,
};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct NodeUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_count: u32,
}

impl GpuGeometry {
    fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.edge_buffer.destroy();
    }
}

struct GpuNode {
    geometry: GeometryHandle,
    material: MaterialHandle,
    rotation: Rotation,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct LineBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

fn scale(color: Rgb, intensity: f32) -> [f32; 4] {
    let [r, g, b] = color.to_linear();
    [r * intensity, g * intensity, b * intensity, 1.0]
}

/// wgpu-backed implementation of [`RenderBackend`].
///
/// Owns the device and queue; the host keeps the surface and passes the
/// frame's texture view to `render_frame`.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    mesh_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    depth_texture: wgpu::TextureView,
    environment: SceneEnvironment,
    lines: Option<LineBuffer>,
    geometries: BTreeMap<GeometryHandle, GpuGeometry>,
    materials: BTreeMap<MaterialHandle, MaterialDesc>,
    nodes: BTreeMap<NodeId, GpuNode>,
    next_id: u64,
    released: bool,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: ViewportSize,
    ) -> Self {
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = uniform_layout(&device, "scene_bind_group_layout");
        let node_layout = uniform_layout(&device, "node_bind_group_layout");

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &node_layout],
            push_constant_ranges: &[],
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pipeline_layout"),
            bind_group_layouts: &[&scene_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
            ],
        }];
        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x4,
            ],
        }];

        let mesh_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "mesh_pipeline",
                layout: &mesh_layout,
                shader: &mesh_shader,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                format: surface_format,
            },
        );
        let wire_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "wire_pipeline",
                layout: &mesh_layout,
                shader: &mesh_shader,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                format: surface_format,
            },
        );
        let line_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "line_pipeline",
                layout: &line_layout,
                shader: &line_shader,
                vs_entry: "vs_line",
                fs_entry: "fs_line",
                buffers: &line_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                format: surface_format,
            },
        );

        let size = size.sanitized();
        let depth_texture = create_depth_texture(&device, size.width, size.height);

        Self {
            device,
            queue,
            surface_format,
            mesh_pipeline,
            wire_pipeline,
            line_pipeline,
            scene_buffer,
            scene_bind_group,
            node_layout,
            depth_texture,
            environment: SceneEnvironment::default(),
            lines: None,
            geometries: BTreeMap::new(),
            materials: BTreeMap::new(),
            nodes: BTreeMap::new(),
            next_id: 0,
            released: false,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_live(&self) -> Result<(), BackendError> {
        if self.released {
            return Err(BackendError::Released);
        }
        Ok(())
    }

    fn write_scene_uniforms(&self, camera: &Camera) {
        let lights = &self.environment.lights;
        let dir = lights.directional.direction();
        let uniforms = SceneUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            ambient: scale(lights.ambient.color, lights.ambient.intensity),
            light_dir: [dir.x, dir.y, dir.z, 0.0],
            light_color: scale(lights.directional.color, lights.directional.intensity),
        };
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn write_node_uniforms(&self, node: &GpuNode) {
        let Some(material) = self.materials.get(&node.material) else {
            return;
        };
        let uniforms = NodeUniforms {
            model: node.rotation.to_matrix().to_cols_array_2d(),
            color: scale(material.color, 1.0),
        };
        self.queue
            .write_buffer(&node.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

impl RenderBackend for WgpuBackend {
    type Target = wgpu::TextureView;

    fn configure_scene(&mut self, env: &SceneEnvironment) -> Result<(), BackendError> {
        self.ensure_live()?;
        let verts: Vec<LineVertex> = env
            .decoration_lines()
            .into_iter()
            .map(|(p, c)| {
                let [r, g, b] = c.to_linear();
                LineVertex {
                    position: p.to_array(),
                    color: [r, g, b, 1.0],
                }
            })
            .collect();
        if let Some(old) = self.lines.take() {
            old.buffer.destroy();
        }
        if !verts.is_empty() {
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("decoration_vertex_buffer"),
                    contents: bytemuck::cast_slice(&verts),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            self.lines = Some(LineBuffer {
                buffer,
                vertex_count: verts.len() as u32,
            });
        }
        self.environment = *env;
        Ok(())
    }

    fn create_geometry(&mut self, geometry: &SurfaceGeometry) -> Result<GeometryHandle, BackendError> {
        self.ensure_live()?;
        if geometry.is_empty() || !geometry.is_valid() {
            return Err(BackendError::InvalidGeometry(format!(
                "{} vertices, {} indices",
                geometry.vertex_count(),
                geometry.indices.len()
            )));
        }
        let vertices: Vec<Vertex> = geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .map(|(p, n)| Vertex {
                position: *p,
                normal: *n,
            })
            .collect();
        let edges = geometry.edge_indices();

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_index_buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let edge_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_edge_buffer"),
                contents: bytemuck::cast_slice(&edges),
                usage: wgpu::BufferUsages::INDEX,
            });

        let handle = GeometryHandle(self.next());
        self.geometries.insert(
            handle,
            GpuGeometry {
                vertex_buffer,
                index_buffer,
                index_count: geometry.indices.len() as u32,
                edge_buffer,
                edge_count: edges.len() as u32,
            },
        );
        tracing::debug!(?handle, vertices = vertices.len(), "uploaded geometry");
        Ok(handle)
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, BackendError> {
        self.ensure_live()?;
        let handle = MaterialHandle(self.next());
        self.materials.insert(handle, *desc);
        Ok(handle)
    }

    fn update_material(&mut self, handle: MaterialHandle, desc: &MaterialDesc) -> Result<(), BackendError> {
        let slot = self
            .materials
            .get_mut(&handle)
            .ok_or(BackendError::UnknownMaterial(handle))?;
        *slot = *desc;
        Ok(())
    }

    fn add_to_scene(&mut self, geometry: GeometryHandle, material: MaterialHandle) -> Result<NodeId, BackendError> {
        self.ensure_live()?;
        if !self.geometries.contains_key(&geometry) {
            return Err(BackendError::UnknownGeometry(geometry));
        }
        if !self.materials.contains_key(&material) {
            return Err(BackendError::UnknownMaterial(material));
        }
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("node_uniforms"),
            size: std::mem::size_of::<NodeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("node_bind_group"),
            layout: &self.node_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let node = NodeId(self.next());
        self.nodes.insert(
            node,
            GpuNode {
                geometry,
                material,
                rotation: Rotation::ZERO,
                uniform_buffer,
                bind_group,
            },
        );
        Ok(node)
    }

    fn set_node_rotation(&mut self, node: NodeId, rotation: Rotation) -> Result<(), BackendError> {
        let record = self
            .nodes
            .get_mut(&node)
            .ok_or(BackendError::UnknownNode(node))?;
        record.rotation = rotation;
        Ok(())
    }

    fn remove_from_scene(&mut self, node: NodeId) -> Result<(), BackendError> {
        let record = self
            .nodes
            .remove(&node)
            .ok_or(BackendError::UnknownNode(node))?;
        record.uniform_buffer.destroy();
        Ok(())
    }

    fn dispose_geometry(&mut self, handle: GeometryHandle) -> Result<(), BackendError> {
        let geometry = self
            .geometries
            .remove(&handle)
            .ok_or(BackendError::UnknownGeometry(handle))?;
        geometry.destroy();
        tracing::debug!(?handle, "disposed geometry");
        Ok(())
    }

    fn dispose_material(&mut self, handle: MaterialHandle) -> Result<(), BackendError> {
        self.materials
            .remove(&handle)
            .map(|_| ())
            .ok_or(BackendError::UnknownMaterial(handle))
    }

    fn resize(&mut self, size: ViewportSize) {
        if self.released {
            return;
        }
        let size = size.sanitized();
        self.depth_texture = create_depth_texture(&self.device, size.width, size.height);
    }

    /// Render one frame: decorations, then every live scene node.
    fn render_frame(&mut self, target: &wgpu::TextureView, camera: &Camera) -> Result<(), BackendError> {
        self.ensure_live()?;
        self.write_scene_uniforms(camera);
        for node in self.nodes.values() {
            self.write_node_uniforms(node);
        }

        let [r, g, b] = self.environment.background.to_linear();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.scene_bind_group, &[]);

            if let Some(lines) = &self.lines {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, lines.buffer.slice(..));
                pass.draw(0..lines.vertex_count, 0..1);
            }

            for node in self.nodes.values() {
                let (Some(geometry), Some(material)) = (
                    self.geometries.get(&node.geometry),
                    self.materials.get(&node.material),
                ) else {
                    continue;
                };
                let (pipeline, indices, count) = if material.wireframe {
                    (&self.wire_pipeline, &geometry.edge_buffer, geometry.edge_count)
                } else {
                    (&self.mesh_pipeline, &geometry.index_buffer, geometry.index_count)
                };
                if count == 0 {
                    continue;
                }
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &node.bind_group, &[]);
                pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        for (_, node) in std::mem::take(&mut self.nodes) {
            node.uniform_buffer.destroy();
        }
        for (_, geometry) in std::mem::take(&mut self.geometries) {
            geometry.destroy();
        }
        self.materials.clear();
        if let Some(lines) = self.lines.take() {
            lines.buffer.destroy();
        }
        self.scene_buffer.destroy();
        self.released = true;
        tracing::debug!("wgpu backend released");
    }
}

impl Drop for WgpuBackend {
    fn drop(&mut self) {
        self.release();
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

struct PipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vs_entry: &'a str,
    fs_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    format: wgpu::TextureFormat,
}

fn create_pipeline(device: &wgpu::Device, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some(desc.vs_entry),
            compilation_options: Default::default(),
            buffers: desc.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some(desc.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        // Flat shapes are visible from both sides.
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
