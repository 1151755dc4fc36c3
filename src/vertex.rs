use crate::backend::VertexLayout;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEXTURED_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

impl VertexLayout {
    /// The wgpu buffer layout matching how shapes pack their points.
    pub(crate) fn desc(self) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match self {
            VertexLayout::Position => &POSITION_ATTRIBUTES,
            VertexLayout::PositionTexCoord => &TEXTURED_ATTRIBUTES,
        };
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    /// Vertex shader entry point for this layout.
    pub(crate) fn entry_point(self) -> &'static str {
        match self {
            VertexLayout::Position => "vs_main",
            VertexLayout::PositionTexCoord => "vs_textured",
        }
    }
}
