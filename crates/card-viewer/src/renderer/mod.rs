//! Owns the GPU context, the depth target, the card pipeline and the egui
//! renderer, and draws one composed card frame per call.

pub mod context;
pub mod pipelines;
pub mod targets;
pub mod textures;

use self::{
    context::GfxContext, pipelines::card::CardPipeline, targets::Targets,
    textures::TextureRegistry,
};
use crate::camera::Camera;
use cardkit::{Frame, ResourceCache};
use std::sync::Arc;
use winit::window::Window;

/// Background behind the card.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub card: CardPipeline,
    pub textures: TextureRegistry,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, cache: &ResourceCache) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;

        let targets = Targets::new(&gfx.device, gfx.size);
        let textures = TextureRegistry::new(&gfx.device, &gfx.queue, cache.fallback());
        let card = CardPipeline::new(
            &gfx.device,
            gfx.config.format,
            targets.depth_fmt,
            textures.layout(),
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            card,
            textures,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Draws the quads of `frame` into `swap_view`. Labels are left to the UI pass.
    pub fn render(
        &mut self,
        swap_view: &wgpu::TextureView,
        frame: &Frame,
        camera: &Camera,
        cache: &ResourceCache,
    ) {
        self.textures.sync(
            &self.gfx.device,
            &self.gfx.queue,
            cache,
            frame.quads().filter_map(|q| q.texture.as_ref()),
        );
        let slots = self.card.upload(&self.gfx.queue, frame, camera.view_proj());

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Card Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Card Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.card.begin(&mut pass);
            for (slot, quad) in frame.quads().take(slots).enumerate() {
                let bind = self.textures.bind_group(quad.texture.as_ref());
                self.card.draw_quad(&mut pass, slot, bind);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
