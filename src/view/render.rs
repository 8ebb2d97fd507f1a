use std::collections::BTreeMap;

use wgpu::util::DeviceExt;
use wgpu::*;

use crate::model::{Camera, ObjectId, Scene};
use crate::utils::{Mesh, MeshBuffer, Vertex};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Per-frame values shared by every draw
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub sun_dir: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_params: [f32; 4],
}

impl SceneUniform {
    pub fn new(scene: &Scene, camera: &Camera) -> Self {
        let sun = scene.light.direction();
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            sun_dir: [sun.x, sun.y, sun.z, scene.light.intensity],
            fog_color: scene.fog.color.to_array4(),
            fog_params: [scene.fog.near, scene.fog.far, scene.light.ambient, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
}

/// Tessellated egui output ready to be drawn over the scene
pub struct EguiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

struct GpuObject {
    mesh: MeshBuffer,
    buffer: Buffer,
    bind_group: BindGroup,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_layout_entry(visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Mirrors the scene graph on the GPU and draws it
pub struct SceneRenderer {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,
    pipeline: RenderPipeline,
    scene_buffer: Buffer,
    scene_bind_group: BindGroup,
    object_layout: BindGroupLayout,
    objects: BTreeMap<ObjectId, GpuObject>,
    clear_color: wgpu::Color,
    _depth_texture: Texture,
    depth_view: TextureView,
    egui_renderer: egui_wgpu::Renderer,
}

impl SceneRenderer {
    pub fn new(
        device: &Device,
        format: TextureFormat,
        alpha_mode: CompositeAlphaMode,
        width: u32,
        height: u32,
    ) -> Self {
        let scene_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("scene_uniform"),
            size: std::mem::size_of::<SceneUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[uniform_layout_entry(ShaderStages::VERTEX_FRAGMENT)],
        });
        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_layout_entry(ShaderStages::VERTEX)],
        });

        let scene_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_layout,
            entries: &[BindGroupEntry { binding: 0, resource: scene_buffer.as_entire_binding() }],
        });

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &[
                        VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                        VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                        VertexAttribute { offset: 24, shader_location: 2, format: VertexFormat::Float32x4 },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: Some(Face::Back),
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            alpha_mode,
            width,
            height,
            pipeline,
            scene_buffer,
            scene_bind_group,
            object_layout,
            objects: BTreeMap::new(),
            clear_color: wgpu::Color::BLACK,
            _depth_texture: depth_texture,
            depth_view,
            egui_renderer,
        }
    }

    /// Recreate size-dependent targets. The surface itself is reconfigured by the caller.
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        let (texture, view) = create_depth_texture(device, width, height);
        self._depth_texture = texture;
        self.depth_view = view;
        tracing::debug!(width, height, "render targets resized");
    }

    /// Bring GPU objects in line with the scene: upload new ones, drop removed
    /// ones and refresh every transform.
    pub fn sync(&mut self, device: &Device, queue: &Queue, scene: &Scene, camera: &Camera) {
        self.objects.retain(|id, _| scene.contains(*id));

        for (id, object) in scene.iter() {
            let model = ObjectUniform { model: object.transform.matrix().to_cols_array_2d() };
            match self.objects.get(&id) {
                Some(gpu) => queue.write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&model)),
                None => {
                    let mesh = Mesh::from_visual(&object.visual).upload(device);
                    let buffer = device.create_buffer_init(&util::BufferInitDescriptor {
                        label: Some("object_uniform"),
                        contents: bytemuck::bytes_of(&model),
                        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                    });
                    let bind_group = device.create_bind_group(&BindGroupDescriptor {
                        label: Some("object_bind_group"),
                        layout: &self.object_layout,
                        entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
                    });
                    tracing::trace!(?id, indices = mesh.index_count, "uploaded scene object");
                    self.objects.insert(id, GpuObject { mesh, buffer, bind_group });
                }
            }
        }

        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&SceneUniform::new(scene, camera)));
        self.clear_color = clear_color(scene);
    }

    /// Draw the synced scene, then the egui overlay if one is given
    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        egui_frame: Option<EguiFrame>,
    ) -> Result<(), SurfaceError> {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                surface.configure(device, &self.surface_config());
                surface.get_current_texture()?
            }
            Err(e) => return Err(e),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.scene_bind_group, &[]);

            for object in self.objects.values() {
                if object.mesh.index_count == 0 {
                    continue;
                }
                rp.set_bind_group(1, &object.bind_group, &[]);
                rp.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(object.mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..object.mesh.index_count, 0, 0..1);
            }
        }

        if let Some(egui_frame) = egui_frame {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: egui_frame.pixels_per_point,
            };

            for (id, image_delta) in &egui_frame.textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &egui_frame.primitives, &screen_descriptor);

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &egui_frame.primitives, &screen_descriptor);
            }

            for id in &egui_frame.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }
}

fn clear_color(scene: &Scene) -> wgpu::Color {
    let [r, g, b] = scene.sky.0;
    wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    #[test]
    fn scene_uniform_layout() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64);
    }

    #[test]
    fn scene_uniform_carries_fog_and_light() {
        let scene = Scene::new();
        let camera = Camera::new(800, 600, &CameraConfig::default());
        let u = SceneUniform::new(&scene, &camera);

        assert_eq!(u.fog_params, [5.0, 120.0, 0.35, 0.0]);
        assert_eq!(u.fog_color, scene.sky.to_array4());
        let dir = glam::Vec3::new(u.sun_dir[0], u.sun_dir[1], u.sun_dir[2]);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y > dir.x);
        assert_eq!(u.sun_dir[3], 1.0);
        assert_eq!(u.eye, [0.0, 3.0, -7.0, 1.0]);
    }

    #[test]
    fn clear_color_is_the_sky() {
        let scene = Scene::new();
        let c = clear_color(&scene);
        assert_eq!(c.r, scene.sky.0[0] as f64);
        assert_eq!(c.a, 1.0);
    }
}
