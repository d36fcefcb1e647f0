use std::collections::BTreeMap;

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::layer::uniforms::{UniformValue, VIEWPORT_SIZE};
use crate::layer::DrawRequest;
use crate::model::{DiscGeometry, ShaderLibrary};
use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    premul_alpha_blend, shader_location, uniform_min_binding_size, vertex_format, DiscVertex,
};
use super::uniforms::DiscUniforms;

/// Executes [`DrawRequest`]s with wgpu.
///
/// Owns the pipeline for the current shader variant, the covering-triangle
/// vertex buffer, the uniform buffer, and one vertex buffer per bound
/// instance attribute. The pipeline is rebuilt only when the variant, target
/// format, or set of bound attributes changes.
pub struct DiscRenderer {
    library: ShaderLibrary,

    pipeline_key: Option<PipelineKey>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    uniform_ubo: Option<wgpu::Buffer>,

    geometry_vbo: Option<wgpu::Buffer>,
    instance_vbos: BTreeMap<String, InstanceVbo>,

    warned_light_overflow: bool,
    warned_unbindable: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct PipelineKey {
    format: wgpu::TextureFormat,
    variant: &'static str,
    attributes: Vec<(u32, wgpu::VertexFormat, u64)>,
}

struct InstanceVbo {
    buffer: wgpu::Buffer,
    capacity: usize, // bytes
}

/// A request buffer resolved to a shader location and vertex format.
struct Binding<'r> {
    name: &'r str,
    location: u32,
    format: wgpu::VertexFormat,
    stride: u64,
    bytes: &'r [u8],
}

impl Default for DiscRenderer {
    fn default() -> Self {
        Self::new(ShaderLibrary::builtin())
    }
}

impl DiscRenderer {
    pub fn new(library: ShaderLibrary) -> Self {
        Self {
            library,
            pipeline_key: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            uniform_ubo: None,
            geometry_vbo: None,
            instance_vbos: BTreeMap::new(),
            warned_light_overflow: false,
            warned_unbindable: false,
        }
    }

    #[inline]
    pub fn library(&self) -> &ShaderLibrary {
        &self.library
    }

    /// Uploads the request's buffers and uniforms and records one instanced draw.
    ///
    /// A request with zero instances records nothing.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        request: &DrawRequest<'_>,
    ) -> Result<()> {
        if request.is_empty() {
            return Ok(());
        }

        let bindings = resolve_bindings(request, &mut self.warned_unbindable);

        self.ensure_pipeline(ctx, request.model.variant(), &bindings)?;
        self.ensure_static_buffers(ctx, request.model.geometry());
        self.ensure_bindings(ctx);
        self.write_uniforms(ctx, request);

        self.instance_vbos
            .retain(|name, _| bindings.iter().any(|b| b.name == name.as_str()));
        for binding in &bindings {
            self.upload_instances(ctx, binding);
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(bind_group) = self.bind_group.as_ref() else { return Ok(()) };
        let Some(geometry_vbo) = self.geometry_vbo.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pointdisc disc pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, geometry_vbo.slice(..));
        for (slot, binding) in bindings.iter().enumerate() {
            let Some(vbo) = self.instance_vbos.get(binding.name) else { continue };
            rpass.set_vertex_buffer(slot as u32 + 1, vbo.buffer.slice(..binding.bytes.len() as u64));
        }
        rpass.draw(0..request.vertex_count, 0..request.instance_count);

        Ok(())
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(
        &mut self,
        ctx: &RenderCtx<'_>,
        variant: &'static str,
        bindings: &[Binding<'_>],
    ) -> Result<()> {
        let key = PipelineKey {
            format: ctx.target_format,
            variant,
            attributes: bindings.iter().map(|b| (b.location, b.format, b.stride)).collect(),
        };
        if self.pipeline_key.as_ref() == Some(&key) && self.pipeline.is_some() {
            return Ok(());
        }

        let source = self.library.assemble(variant)?;
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pointdisc disc shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("pointdisc disc bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(uniform_min_binding_size()),
                    },
                    count: None,
                }],
            });

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("pointdisc disc pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let instance_attrs: Vec<[wgpu::VertexAttribute; 1]> = bindings
            .iter()
            .map(|b| {
                [wgpu::VertexAttribute {
                    format: b.format,
                    offset: 0,
                    shader_location: b.location,
                }]
            })
            .collect();

        let mut buffers = vec![DiscVertex::layout()];
        buffers.extend(bindings.iter().zip(&instance_attrs).map(|(b, attrs)| {
            wgpu::VertexBufferLayout {
                array_stride: b.stride,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: attrs,
            }
        }));

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pointdisc disc pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "disc pipeline built: variant `{variant}`, {} instance attributes",
            bindings.len()
        );

        self.pipeline_key = Some(key);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
        self.uniform_ubo = None;
        Ok(())
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.uniform_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let uniform_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pointdisc disc ubo"),
            size: std::mem::size_of::<DiscUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pointdisc disc bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_ubo.as_entire_binding(),
            }],
        });

        self.uniform_ubo = Some(uniform_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>, geometry: &DiscGeometry) {
        if self.geometry_vbo.is_some() {
            return;
        }

        let vertices = geometry.vertices.map(|pos| DiscVertex { pos });
        self.geometry_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pointdisc disc geometry vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }

    fn write_uniforms(&mut self, ctx: &RenderCtx<'_>, request: &DrawRequest<'_>) {
        let Some(ubo) = self.uniform_ubo.as_ref() else { return };

        let mut set = request.uniforms.clone();
        if let Some(size) = ctx.viewport.size_uniform() {
            set.set_default(VIEWPORT_SIZE, UniformValue::Vec2(size));
        }

        let uniforms = DiscUniforms::pack(&set, &mut self.warned_light_overflow);
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));
    }

    fn upload_instances(&mut self, ctx: &RenderCtx<'_>, binding: &Binding<'_>) {
        let required = binding.bytes.len();
        let grow = self
            .instance_vbos
            .get(binding.name)
            .is_none_or(|vbo| vbo.capacity < required);

        if grow {
            let instances = (required as u64 / binding.stride).max(1) as usize;
            let capacity = instances.next_power_of_two().max(64) * binding.stride as usize;
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("pointdisc disc instance vbo"),
                size: capacity as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.instance_vbos
                .insert(binding.name.to_owned(), InstanceVbo { buffer, capacity });
        }

        if let Some(vbo) = self.instance_vbos.get(binding.name) {
            ctx.queue.write_buffer(&vbo.buffer, 0, binding.bytes);
        }
    }
}

/// Maps request buffers to shader inputs, skipping any the shaders do not know.
fn resolve_bindings<'r>(request: &'r DrawRequest<'_>, warned: &mut bool) -> Vec<Binding<'r>> {
    let mut out = Vec::with_capacity(request.buffers.len());
    for b in &request.buffers {
        let location = shader_location(b.name);
        let format = vertex_format(b.element_type, b.size);
        let (Some(location), Some(format)) = (location, format) else {
            if !*warned {
                log::warn!("attribute `{}` has no shader input; not bound", b.name);
                *warned = true;
            }
            continue;
        };
        out.push(Binding {
            name: b.name,
            location,
            format,
            stride: b.stride() as u64,
            bytes: b.data.as_bytes(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{AccessorSet, Color, Position};
    use crate::device::{GpuInit, HeadlessGpu};
    use crate::layer::{LayerConfig, PointCloudLayer, UniformSet};
    use crate::coords::Viewport;
    use crate::precision::CoordinateSystem;

    type Rec = ([f64; 2], [u8; 3]);

    const SIZE: u32 = 64;
    const ORIGIN: [f64; 2] = [-122.419_415_5, 37.774_929_1];

    /// Alpha byte of pixel `(x, y)` in a tightly packed RGBA8 image.
    fn alpha_at(pixels: &[u8], x: u32, y: u32) -> u8 {
        pixels[((y * SIZE + x) * 4 + 3) as usize]
    }

    fn layer(high_precision: bool) -> PointCloudLayer<Rec> {
        let accessors =
            AccessorSet::new(|r: &Rec| Position::from(r.0)).with_color(|r: &Rec| Color::from(r.1));
        let config = LayerConfig {
            high_precision_requested: high_precision,
            coordinate_system: CoordinateSystem::Geographic,
            ..LayerConfig::default()
        };
        PointCloudLayer::new(config, accessors).with_data(vec![(ORIGIN, [255, 0, 0])])
    }

    #[test]
    fn renders_disc_and_discards_triangle_corners() {
        let Ok(gpu) = HeadlessGpu::new_blocking(GpuInit::default()) else {
            log::warn!("no GPU adapter; skipping offscreen render");
            return;
        };
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let ctx = RenderCtx::new(
            gpu.device(),
            gpu.queue(),
            format,
            Viewport::from_texture_size(SIZE, SIZE),
        );

        // Identity projection with the point at the origin: the disc is
        // centered in the target with the default 10 px radius.
        let mut globals = UniformSet::new();
        globals.set(crate::layer::uniforms::COORDINATE_ORIGIN, UniformValue::DVec2(ORIGIN));

        let mut renderer = DiscRenderer::default();
        for high_precision in [false, true] {
            let target_tex = gpu.create_color_target(SIZE, SIZE, format);
            let mut layer = layer(high_precision);

            let mut encoder = gpu.device().create_command_encoder(&Default::default());
            let mut target = RenderTarget::new(&mut encoder, &target_tex.view);
            layer.render(&ctx, &mut target, &mut renderer, &globals).unwrap();
            gpu.queue().submit(std::iter::once(encoder.finish()));

            let expected = if high_precision { 4 } else { 3 };
            assert_eq!(renderer.instance_vbos.len(), expected);

            let pixels = gpu.read_color_target(&target_tex).unwrap();
            let center = SIZE / 2;
            assert_eq!(alpha_at(&pixels, center, center), 255, "disc center, hp={high_precision}");
            // 15.5 px along +x: inside the covering triangle, outside the disc.
            assert_eq!(alpha_at(&pixels, center + 15, center), 0, "triangle corner, hp={high_precision}");
            assert_eq!(alpha_at(&pixels, 0, 0), 0, "background, hp={high_precision}");
        }
    }

    #[test]
    fn unknown_attributes_are_skipped() {
        use crate::attributes::{ElementType, InstanceBuffer};
        use crate::layer::BoundBuffer;
        use crate::model::ModelBuilder;
        use crate::precision::PrecisionMode;

        let model = ModelBuilder::new(PrecisionMode::Standard).build();
        let data = InstanceBuffer::Float32(vec![0.0; 3]);
        let mut request = DrawRequest {
            model: &model,
            topology: model.geometry().topology,
            vertex_count: 3,
            instance_count: 1,
            buffers: Vec::new(),
            uniforms: UniformSet::new(),
        };
        request.buffers.push(BoundBuffer {
            name: "custom",
            size: 3,
            element_type: ElementType::Float32,
            data: &data,
        });

        let mut warned = false;
        assert!(resolve_bindings(&request, &mut warned).is_empty());
        assert!(warned);
    }
}
