use bytemuck::{Pod, Zeroable};
use cardkit::compose::{Frame, Quad};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

/// Scene lighting: an ambient term plus one point light.
pub const AMBIENT_INTENSITY: f32 = 0.8;
pub const POINT_LIGHT_POS: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const POINT_LIGHT_INTENSITY: f32 = 1.0;

/// Quads drawn per frame are bounded by this many uniform slots.
pub const MAX_QUADS: usize = 16;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadUniform {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: lit flag, y: roughness, z: metalness, w: ambient
    pub material: [f32; 4],
    /// xyz: light position, w: light intensity
    pub light: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<QuadUniform>() == 176);

impl QuadUniform {
    pub fn new(quad: &Quad, group: Mat4, view_proj: Mat4) -> Self {
        let model = group
            * Mat4::from_translation(quad.center)
            * Mat4::from_scale(Vec3::new(quad.size.x, quad.size.y, 1.0));
        let material = match quad.material {
            Some(m) => {
                let m = m.clamped();
                [1.0, m.roughness, m.metalness, AMBIENT_INTENSITY]
            }
            None => [0.0, 0.0, 0.0, 0.0],
        };
        Self {
            mvp: (view_proj * model).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: quad.color.to_linear(),
            material,
            light: POINT_LIGHT_POS.extend(POINT_LIGHT_INTENSITY).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Vertex {
    corner: [f32; 2],
    uv: [f32; 2],
}

/// Unit quad centered at the origin, two triangles, V flipped for images.
const UNIT_QUAD: [Vertex; 6] = [
    Vertex { corner: [-0.5, -0.5], uv: [0.0, 1.0] },
    Vertex { corner: [0.5, -0.5], uv: [1.0, 1.0] },
    Vertex { corner: [0.5, 0.5], uv: [1.0, 0.0] },
    Vertex { corner: [-0.5, -0.5], uv: [0.0, 1.0] },
    Vertex { corner: [0.5, 0.5], uv: [1.0, 0.0] },
    Vertex { corner: [-0.5, 0.5], uv: [0.0, 0.0] },
];

pub struct CardPipeline {
    pub pipeline: wgpu::RenderPipeline,
    quad_vb: wgpu::Buffer,
    ubo: wgpu::Buffer,
    ubo_bind: wgpu::BindGroup,
    /// Byte distance between consecutive uniform slots.
    stride: u64,
}

impl CardPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<QuadUniform>() as u64;
        let stride = size.div_ceil(align) * align;

        let ubo_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Card Quad UBO Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size),
                },
                count: None,
            }],
        });

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Card Quad UBO"),
            size: stride * MAX_QUADS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let ubo_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Card Quad UBO BindGroup"),
            layout: &ubo_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: wgpu::BufferSize::new(size),
                }),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/card.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/card.wgsl").into()),
        });

        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Quad VB"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let vbuf_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    shader_location: 1,
                    offset: 8,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Card PipelineLayout"),
            bind_group_layouts: &[&ubo_layout, texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Card Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[vbuf_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Quads are seen from both sides while the card turns.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            quad_vb,
            ubo,
            ubo_bind,
            stride,
        }
    }

    /// Writes one uniform slot per quad of `frame`, in draw order. Returns
    /// how many slots were filled.
    pub fn upload(&self, queue: &wgpu::Queue, frame: &Frame, view_proj: Mat4) -> usize {
        let mut bytes = Vec::with_capacity((self.stride as usize) * MAX_QUADS);
        let mut count = 0;
        for quad in frame.quads().take(MAX_QUADS) {
            let u = QuadUniform::new(quad, frame.transform, view_proj);
            bytes.extend_from_slice(bytemuck::bytes_of(&u));
            bytes.resize((count + 1) * self.stride as usize, 0);
            count += 1;
        }
        if frame.quads().count() > MAX_QUADS {
            log::warn!("Frame has more than {MAX_QUADS} quads; extra quads are skipped.");
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.ubo, 0, &bytes);
        }
        count
    }

    pub fn begin<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
    }

    /// Draws the quad whose uniforms were written to `slot`.
    pub fn draw_quad<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        slot: usize,
        texture: &'a wgpu::BindGroup,
    ) {
        let offset = (slot as u64 * self.stride) as u32;
        rpass.set_bind_group(0, &self.ubo_bind, &[offset]);
        rpass.set_bind_group(1, texture, &[]);
        rpass.draw(0..UNIT_QUAD.len() as u32, 0..1);
    }
}
