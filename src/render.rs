//! Render pass configuration.
//!
//! [`RenderPassFactory`] owns the depth attachment, allocated once for the
//! surface size it was built with. Every frame it re-fetches the swap chain's
//! current texture for the color attachment and reuses the depth attachment.
//!
//! Both attachments are cleared on load and stored: color to the configured
//! clear colour (black by default), depth to 1.0.

use crate::data_structures::texture::Texture;

pub const DEPTH_CLEAR: f32 = 1.0;

/// The drawable of the current frame. Present it after submission.
pub struct FrameTarget {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl FrameTarget {
    pub fn present(self) {
        self.surface_texture.present();
    }
}

#[derive(Debug)]
pub struct RenderPassFactory {
    depth_texture: Texture,
    clear_colour: wgpu::Color,
}

impl RenderPassFactory {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, clear_colour: wgpu::Color) -> Self {
        Self {
            depth_texture: Texture::create_depth_texture(device, [width, height], "depth_texture"),
            clear_colour,
        }
    }

    /// Fetches the swap chain's current drawable.
    pub fn acquire(&self, surface: &wgpu::Surface) -> Result<FrameTarget, wgpu::SurfaceError> {
        let surface_texture = surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(FrameTarget {
            surface_texture,
            view,
        })
    }

    pub fn color_ops(&self) -> wgpu::Operations<wgpu::Color> {
        wgpu::Operations {
            load: wgpu::LoadOp::Clear(self.clear_colour),
            store: wgpu::StoreOp::Store,
        }
    }

    pub fn depth_ops() -> wgpu::Operations<f32> {
        wgpu::Operations {
            load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
            store: wgpu::StoreOp::Store,
        }
    }

    /// Begins the frame's pass on `encoder`, drawing into `view`.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Body Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: self.color_ops(),
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(Self::depth_ops()),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }
}
