//! Application event loop.
//!
//! [`run`] opens a window, acquires the [`Engine`], lets the caller populate a
//! [`World`] and then drives [`Show::frame`] from winit's redraw requests:
//!
//! 1. `RedrawRequested` arrives
//! 2. the world runs one frame cycle with the elapsed time
//! 3. the next redraw is requested, unless the frame limit was reached
//!
//! A lost or outdated surface is reconfigured and the frame skipped. Any other
//! error ends the loop and is returned from [`run`]. While the window is
//! minimised no redraw is requested; the next `Resized` restarts the loop.

use std::sync::Arc;

use anyhow::Context as _;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    engine::{Engine, EngineConfig},
    error::EngineError,
    world::{FrameContext, Show, World},
};

pub struct App<P, U> {
    async_runtime: tokio::runtime::Runtime,
    config: EngineConfig,
    // Both are taken once the window exists.
    populate: Option<P>,
    before_update: Option<U>,
    show: Option<Show<Engine, U>>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl<P, U> App<P, U>
where
    P: FnOnce(&mut World<Engine>) -> anyhow::Result<()>,
    U: FnMut(&mut FrameContext<'_, Engine>),
{
    fn new(
        async_runtime: tokio::runtime::Runtime,
        config: EngineConfig,
        populate: P,
        before_update: U,
    ) -> Self {
        Self {
            async_runtime,
            config,
            populate: Some(populate),
            before_update: Some(before_update),
            show: None,
            last_time: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Show<Engine, U>> {
        let (populate, before_update) = match (self.populate.take(), self.before_update.take()) {
            (Some(populate), Some(before_update)) => (populate, before_update),
            _ => anyhow::bail!("the application was already initialised"),
        };

        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create the window")?,
        );

        let engine = self
            .async_runtime
            .block_on(Engine::new(window.clone(), &self.config))?;
        let mut world = World::new(engine)?;
        populate(&mut world)?;
        let show = world.show(before_update)?;

        window.request_redraw();
        Ok(show)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl<P, U> ApplicationHandler for App<P, U>
where
    P: FnOnce(&mut World<Engine>) -> anyhow::Result<()>,
    U: FnMut(&mut FrameContext<'_, Engine>),
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.show.is_some() || self.error.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(show) => {
                self.last_time = Instant::now();
                self.show = Some(show);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let show = match &mut self.show {
            Some(show) => show,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let engine = show.world_mut().engine_mut();
                engine.resize(size.width, size.height);
                // restarts the loop after a minimise parked it
                if is_drawable(size) {
                    engine.window().request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match show.frame(dt) {
                    Ok(()) => {
                        let frames = show.world().frames();
                        if self.config.frame_limit.is_some_and(|limit| frames >= limit) {
                            log::info!("frame limit of {} reached", frames);
                            event_loop.exit();
                            return;
                        }
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(EngineError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => show.world_mut().engine_mut().reconfigure(),
                    Err(EngineError::Surface(wgpu::SurfaceError::Timeout)) => {
                        log::warn!("timed out acquiring the next frame");
                    }
                    Err(e) => {
                        self.fail(event_loop, e.into());
                        return;
                    }
                }
                let window = show.world().engine().window();
                // a minimised window waits for the next `Resized`
                if is_drawable(window.inner_size()) {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Whether a surface of `size` can be drawn to.
fn is_drawable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

/// Opens a window and runs the frame loop until the window is closed or
/// `config.frame_limit` frames were drawn.
///
/// `populate` runs once after the engine is up and registers the initial
/// bodies. `before_update` runs at the start of every frame.
pub fn run<P, U>(config: EngineConfig, populate: P, before_update: U) -> anyhow::Result<()>
where
    P: FnOnce(&mut World<Engine>) -> anyhow::Result<()>,
    U: FnMut(&mut FrameContext<'_, Engine>),
{
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<()> = EventLoop::new()?;

    let async_runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(async_runtime, config, populate, before_update);

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimised_windows_are_not_redrawn() {
        assert!(!is_drawable(PhysicalSize::new(0, 0)));
        assert!(!is_drawable(PhysicalSize::new(800, 0)));
        assert!(!is_drawable(PhysicalSize::new(0, 600)));
        assert!(is_drawable(PhysicalSize::new(1, 1)));
    }
}
