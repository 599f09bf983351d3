use crate::{
    assets::FsLoader, camera::Camera, config::Config, input::PointerBridge, renderer::Renderer,
    ui,
};
use anyhow::Result;
use cardkit::{
    CardViewer, Catalog, Frame, FrameClock, LoadMode, ResourceCache, ResourceLoadFailure,
    Selection, Viewport,
};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub viewer: CardViewer,
    pub cache: ResourceCache,
    pub pointer: PointerBridge,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    clock: FrameClock,
    /// Last composed frame; cursor hit tests run against it.
    frame: Frame,
    selections: Receiver<Selection>,
    failures: Receiver<ResourceLoadFailure>,
    last_failure: Option<String>,
    hint: Option<String>,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config, catalog: Catalog) -> Result<Self> {
        let mode = if config.inline_loads {
            LoadMode::Inline
        } else {
            LoadMode::Background
        };
        let cache = ResourceCache::new(Arc::new(FsLoader::new(&config.assets)), mode);
        let failures = cache.failures();

        let renderer = Renderer::new(window.clone(), &cache).await?;
        cache.set_max_dimension(renderer.gfx.device.limits().max_texture_dimension_2d);
        let size = renderer.gfx.size;
        let camera = Camera::new(size.width.max(1) as f32 / size.height.max(1) as f32);

        let mut viewer = CardViewer::new(catalog);
        let selections = viewer.subscribe();
        viewer.preload(&cache);
        let frame = viewer.frame();
        window.set_title(&window_title(&viewer));

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            camera,
            viewer,
            cache,
            pointer: PointerBridge::new(),
            egui_ctx,
            egui_state,
            clock: FrameClock::start(),
            frame,
            selections,
            failures,
            last_failure: None,
            hint: config.hint.clone(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_viewport(new_size.width, new_size.height);
        }
    }

    /// Returns true when the event was fully handled here.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            // The pointer is over UI, not over the card.
            for e in self.pointer.leave() {
                self.viewer.handle(e);
            }
            return true;
        }

        let size = window.inner_size();
        let viewport = Viewport::new(size.width as f32, size.height as f32);
        for e in self
            .pointer
            .handle_event(event, viewport, &self.frame, &self.camera)
        {
            self.viewer.handle(e);
        }

        false
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.viewer.tick(self.clock.elapsed());
        self.frame = self.viewer.frame();

        if self.selections.try_iter().last().is_some() {
            window.set_title(&window_title(&self.viewer));
        }
        if let Some(failure) = self.failures.try_iter().last() {
            self.last_failure = Some(failure.to_string());
        }

        let surface_tex = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = surface_tex
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render(&swap_view, &self.frame, &self.camera, &self.cache);

        let size = self.renderer.gfx.size;
        let viewport = Viewport::new(size.width as f32, size.height as f32);
        let selection = self.viewer.selection();
        let item = self.viewer.active_item();

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        ui::draw_labels(&self.egui_ctx, &self.frame, &self.camera, viewport);
        ui::draw_hud(
            &self.egui_ctx,
            &ui::HudInfo {
                name: &item.name,
                index: selection.active_index,
                count: self.viewer.catalog().len(),
                hovered: selection.hovered,
                hint: self.hint.as_deref(),
                loading: !self.cache.is_settled(),
                failed: self.cache.failed_count(),
                last_failure: self.last_failure.as_deref(),
            },
        );

        let egui_output = self.egui_ctx.end_frame();
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        surface_tex.present();

        Ok(())
    }
}

fn window_title(viewer: &CardViewer) -> String {
    let item = viewer.active_item();
    format!("{} - Mastery {}%", item.name, item.level)
}
