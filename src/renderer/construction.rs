use super::*;

fn device_descriptor() -> wgpu::DeviceDescriptor<'static> {
    wgpu::DeviceDescriptor {
        label: Some("oscscene_device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: Default::default(),
        trace: Default::default(),
    }
}

impl<'a> Renderer<'a> {
    /// Creates a renderer presenting to `window`.
    pub async fn new(
        window: impl Into<SurfaceTarget<'a>>,
        physical_size: (u32, u32),
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let size = (physical_size.0.max(1), physical_size.1.max(1));

        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|error| RenderError::Adapter(error.to_string()))?;

        let (device, queue) = adapter.request_device(&device_descriptor()).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        tracing::debug!(?format, adapter = ?adapter.get_info().name, "Configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.0,
            height: size.1,
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        Ok(Self::build_from_device(
            instance,
            Some(surface),
            device,
            queue,
            config,
            size,
        ))
    }

    /// Creates a renderer without a window. Frames are drawn into an offscreen texture.
    ///
    /// Fails when no GPU adapter is available, which lets tests skip on machines without one.
    pub async fn try_new_headless(physical_size: (u32, u32)) -> Result<Self, RenderError> {
        let size = (physical_size.0.max(1), physical_size.1.max(1));

        let instance = wgpu::Instance::new(&InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|error| RenderError::Adapter(error.to_string()))?;

        let (device, queue) = adapter.request_device(&device_descriptor()).await?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.0,
            height: size.1,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: CompositeAlphaMode::Opaque,
            view_formats: vec![],
        };

        let mut renderer = Self::build_from_device(instance, None, device, queue, config, size);
        renderer.recreate_offscreen_target();
        Ok(renderer)
    }

    /// Shared constructor for [`Self::new`] and [`Self::try_new_headless`].
    fn build_from_device(
        instance: wgpu::Instance,
        surface: Option<wgpu::Surface<'a>>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        physical_size: (u32, u32),
    ) -> Self {
        let globals_layout = create_globals_bind_group_layout(&device);
        let shape_bind_group_layout = create_shape_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);

        let pipelines = ShapePipelines::new(
            &device,
            config.format,
            &[
                &globals_layout,
                &shape_bind_group_layout,
                &texture_bind_group_layout,
            ],
        );

        let projection = Projection::orthographic(physical_size.0, physical_size.1);
        let (globals_buffer, globals_bind_group) =
            create_globals(&device, &globals_layout, &projection);

        let sampler = create_sampler(&device);
        let (default_texture, default_texture_bind_group) = TextureUploader {
            device: &device,
            queue: &queue,
            layout: &texture_bind_group_layout,
            sampler: &sampler,
        }
        .default_bind_group();

        Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            physical_size,
            pipelines,
            globals_buffer,
            globals_bind_group,
            shape_bind_group_layout,
            texture_bind_group_layout,
            sampler,
            _default_texture: default_texture,
            default_texture_bind_group,
            offscreen_target: None,
            frame: None,
            frames_presented: 0,
        }
    }
}
