//! The wgpu engine: sole owner of the device, the surface and the pipeline.
//!
//! [`Engine`] is the only type in the crate that issues GPU calls. It is built
//! once per process from a window, and hands out uniform and vertex buffers to
//! the scene through the [`Backend`] trait.

use std::{
    borrow::Cow,
    iter,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use winit::window::Window;

use crate::{
    backend::{Backend, EngineId, GLOBAL_GROUP, MODEL_GROUP, Renderable, check_binding},
    data_structures::buffer::{BoundUniformBuffer, VertexBufferInfo},
    error::{EngineError, InitError, StateError},
    pipelines::basic::{self, BASIC_SHADER},
    render::RenderPassFactory,
};

/// Set while an engine holds the GPU; at most one per process.
static ENGINE_ACQUIRED: AtomicBool = AtomicBool::new(false);

/// A claim on the process-wide engine slot.
///
/// Dropping an uncommitted claim frees the slot again, so a failed
/// initialization can be retried. A committed claim holds the slot for the
/// rest of the process.
#[derive(Debug)]
pub struct EngineLatch {
    committed: bool,
}

impl EngineLatch {
    pub fn claim() -> Result<Self, InitError> {
        ENGINE_ACQUIRED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| InitError::AlreadyInitialized)?;
        Ok(Self { committed: false })
    }

    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for EngineLatch {
    fn drop(&mut self) {
        if !self.committed {
            ENGINE_ACQUIRED.store(false, Ordering::Release);
        }
    }
}

/// Startup configuration of the window and the engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub title: String,
    /// Logical size of the drawable.
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
    /// WGSL source with `vs_main`/`fs_main` entry points.
    pub shader: Cow<'static, str>,
    pub backends: wgpu::Backends,
    /// Stop the frame loop after this many frames. `None` runs until the window closes.
    pub frame_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "body-ngin".to_string(),
            width: 640,
            height: 640,
            clear_colour: wgpu::Color::BLACK,
            shader: Cow::Borrowed(BASIC_SHADER),
            backends: wgpu::Backends::PRIMARY,
            frame_limit: None,
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: wgpu::Color) -> Self {
        self.clear_colour = clear_colour;
        self
    }

    pub fn with_shader(mut self, shader: impl Into<Cow<'static, str>>) -> Self {
        self.shader = shader.into();
        self
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

#[derive(Debug)]
pub struct Engine {
    id: EngineId,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    /// Indexed by bind group.
    uniform_layouts: [wgpu::BindGroupLayout; 2],
    pass_factory: RenderPassFactory,
    clear_colour: wgpu::Color,
}

impl Engine {
    /// Acquires adapter, device and surface and builds the shared pipeline.
    ///
    /// Fails with [`InitError::AlreadyInitialized`] if another engine already
    /// exists in this process.
    pub async fn new(window: Arc<Window>, settings: &EngineConfig) -> Result<Self, EngineError> {
        let latch = EngineLatch::claim()?;
        let engine = Self::acquire(window, settings).await?;
        latch.commit();
        Ok(engine)
    }

    async fn acquire(window: Arc<Window>, settings: &EngineConfig) -> Result<Self, EngineError> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: settings.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| InitError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| InitError::NoAdapter(e.to_string()))?;
        log::info!("adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("body-ngin device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| InitError::NoDevice(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The bundled shader writes sRGB colors as-is; prefer an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(InitError::UnsupportedSurface)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_layouts = [
            basic::uniform_layout(&device, "global_bind_group_layout"),
            basic::uniform_layout(&device, "model_bind_group_layout"),
        ];
        let pipeline = basic::mk_basic_pipeline(
            &device,
            config.format,
            &[&uniform_layouts[0], &uniform_layouts[1]],
            &settings.shader,
        );

        let pass_factory =
            RenderPassFactory::new(&device, config.width, config.height, settings.clear_colour);

        let id = EngineId::next();
        log::info!(
            "engine {} ready: {}x{} {:?}",
            id,
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            id,
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_layouts,
            pass_factory,
            clear_colour: settings.clear_colour,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }

    /// Reconfigures the surface and rebuilds the depth attachment.
    ///
    /// Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.pass_factory = RenderPassFactory::new(&self.device, width, height, self.clear_colour);
        log::debug!("surface resized to {}x{}", width, height);
    }

    /// Reconfigures the surface at its current size after it was lost.
    pub fn reconfigure(&mut self) {
        let size = self.window.inner_size();
        self.resize(size.width, size.height);
    }

    fn uniform_layout(&self, group: u32, binding: u32) -> Result<&wgpu::BindGroupLayout, StateError> {
        check_binding(group, binding)?;
        Ok(&self.uniform_layouts[group as usize])
    }
}

impl Backend for Engine {
    type Uniform = BoundUniformBuffer;
    type Vertices = VertexBufferInfo;

    fn id(&self) -> EngineId {
        self.id
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn create_uniform(
        &self,
        size_in_floats: usize,
        group: u32,
        binding: u32,
    ) -> Result<BoundUniformBuffer, EngineError> {
        let layout = self.uniform_layout(group, binding)?;
        log::debug!("uniform of {} floats at group {}", size_in_floats, group);
        Ok(BoundUniformBuffer::new(
            &self.device,
            &self.queue,
            layout,
            group,
            binding,
            size_in_floats,
        ))
    }

    fn create_vertex_buffer_info(&self, raw_values: &[f32]) -> Result<VertexBufferInfo, EngineError> {
        Ok(VertexBufferInfo::new(&self.device, raw_values, None))
    }

    fn create_indexed_vertex_buffer_info(
        &self,
        raw_values: &[f32],
        indices: &[u16],
    ) -> Result<VertexBufferInfo, EngineError> {
        Ok(VertexBufferInfo::new(&self.device, raw_values, Some(indices)))
    }

    fn do_render_pass(
        &self,
        global: &BoundUniformBuffer,
        renderables: &[&Renderable<Self>],
    ) -> Result<(), EngineError> {
        let frame = self.pass_factory.acquire(&self.surface)?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = self.pass_factory.begin(&mut encoder, &frame.view);
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(GLOBAL_GROUP, &global.bind_group, &[]);

            for renderable in renderables {
                let vertices = &renderable.vertex_info;
                if vertices.draw_count() == 0 {
                    log::warn!("you attempted to render a body without vertices");
                    continue;
                }
                render_pass.set_bind_group(MODEL_GROUP, &renderable.model_uniform.bind_group, &[]);
                render_pass.set_vertex_buffer(0, vertices.buffer.slice(..));
                match &vertices.indices {
                    Some(indices) => {
                        render_pass
                            .set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint16);
                        render_pass.draw_indexed(0..indices.index_count, 0, 0..1);
                    }
                    None => render_pass.draw(0..vertices.vertex_count, 0..1),
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
