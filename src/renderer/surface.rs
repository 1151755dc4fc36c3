use super::*;

impl Renderer<'_> {
    pub fn size(&self) -> (u32, u32) {
        self.physical_size
    }

    /// Reconfigures the surface, or reallocates the offscreen target, for a new size.
    ///
    /// Zero-sized dimensions are clamped to one pixel. The projection is owned by the
    /// scheduler and passed in each frame, so it is not touched here.
    pub fn resize(&mut self, new_physical_size: (u32, u32)) {
        let size = (new_physical_size.0.max(1), new_physical_size.1.max(1));
        self.physical_size = size;
        self.config.width = size.0;
        self.config.height = size.1;

        match &self.surface {
            Some(surface) => surface.configure(&self.device, &self.config),
            None => self.recreate_offscreen_target(),
        }
        tracing::debug!(width = size.0, height = size.1, "Resized render target");
    }

    /// Reconfigures the surface with its current settings, after it was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.resize(self.physical_size);
    }

    pub(super) fn recreate_offscreen_target(&mut self) {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen_target"),
            size: wgpu::Extent3d {
                width: self.physical_size.0,
                height: self.physical_size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: self.config.usage,
            view_formats: &[],
        });
        self.offscreen_target = Some(texture);
    }
}
