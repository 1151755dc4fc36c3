use crate::backend::VertexLayout;

/// Per-shape GPU resources: a vertex buffer sized for the shape's geometry and a uniform buffer
/// holding its color.
#[derive(Debug)]
pub struct GpuBuffer {
    pub(super) vertices: wgpu::Buffer,
    pub(super) uniforms: wgpu::Buffer,
    pub(super) bind_group: wgpu::BindGroup,
    pub(super) layout: VertexLayout,
    pub(super) capacity: usize,
}

impl GpuBuffer {
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// State held between `begin_frame` and `end_frame`.
///
/// Field order matters: the pass must drop before the encoder.
pub(super) struct ActiveFrame {
    pub(super) pass: wgpu::RenderPass<'static>,
    pub(super) encoder: wgpu::CommandEncoder,
    pub(super) output: Option<wgpu::SurfaceTexture>,
}
