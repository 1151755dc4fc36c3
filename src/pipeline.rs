use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Device, RenderPipeline};

use crate::backend::{Primitive, ShapeUniforms, VertexLayout};
use crate::projection::Projection;

/// Uniforms shared by every draw in a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub projection: [f32; 16],
}

impl Globals {
    pub fn new(projection: &Projection) -> Self {
        Self {
            projection: projection.to_cols_array(),
        }
    }
}

pub fn create_globals_bind_group_layout(device: &Device) -> BindGroupLayout {
    uniform_bind_group_layout(device, "globals_bind_group_layout", wgpu::ShaderStages::VERTEX)
}

pub fn create_shape_bind_group_layout(device: &Device) -> BindGroupLayout {
    uniform_bind_group_layout(device, "shape_bind_group_layout", wgpu::ShaderStages::FRAGMENT)
}

fn uniform_bind_group_layout(
    device: &Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

pub fn create_texture_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        label: Some("texture_bind_group_layout"),
    })
}

/// Creates the globals uniform buffer and its bind group.
pub fn create_globals(
    device: &Device,
    layout: &BindGroupLayout,
    projection: &Projection,
) -> (wgpu::Buffer, BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("globals_buffer"),
        contents: bytemuck::cast_slice(&[Globals::new(projection)]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("globals_bind_group"),
    });
    (buffer, bind_group)
}

/// Creates a per-shape uniform buffer and its bind group.
pub fn create_shape_uniforms(device: &Device, layout: &BindGroupLayout) -> (wgpu::Buffer, BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("shape_uniform_buffer"),
        size: std::mem::size_of::<ShapeUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("shape_bind_group"),
    });
    (buffer, bind_group)
}

/// One pipeline per primitive and vertex layout combination.
pub struct ShapePipelines {
    lines: RenderPipeline,
    triangles: RenderPipeline,
    textured_lines: RenderPipeline,
    textured_triangles: RenderPipeline,
}

impl ShapePipelines {
    pub fn new(
        device: &Device,
        format: wgpu::TextureFormat,
        bind_group_layouts: &[&BindGroupLayout; 3],
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shape_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("./shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape_pipeline_layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let create = |primitive, layout| {
            create_shape_pipeline(device, &shader, &pipeline_layout, format, primitive, layout)
        };

        Self {
            lines: create(Primitive::Lines, VertexLayout::Position),
            triangles: create(Primitive::Triangles, VertexLayout::Position),
            textured_lines: create(Primitive::Lines, VertexLayout::PositionTexCoord),
            textured_triangles: create(Primitive::Triangles, VertexLayout::PositionTexCoord),
        }
    }

    pub fn get(&self, primitive: Primitive, layout: VertexLayout) -> &RenderPipeline {
        match (primitive, layout) {
            (Primitive::Lines, VertexLayout::Position) => &self.lines,
            (Primitive::Triangles, VertexLayout::Position) => &self.triangles,
            (Primitive::Lines, VertexLayout::PositionTexCoord) => &self.textured_lines,
            (Primitive::Triangles, VertexLayout::PositionTexCoord) => &self.textured_triangles,
        }
    }
}

fn create_shape_pipeline(
    device: &Device,
    shader: &wgpu::ShaderModule,
    pipeline_layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    primitive: Primitive,
    layout: VertexLayout,
) -> RenderPipeline {
    let topology = match primitive {
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shape_pipeline"),
        layout: Some(pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(layout.entry_point()),
            compilation_options: Default::default(),
            buffers: &[layout.desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
