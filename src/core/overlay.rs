use winit::event::WindowEvent;
use winit::window::Window;

use super::clock::FrameTime;
use super::gpu_context::GpuContext;
use super::timer::Throttled;

const FPS_UPDATE_INTERVAL: f32 = 0.5;

/// What the user asked for through the overlay this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    TogglePause,
    Restart,
}

/// Averages frame rate over short windows
#[derive(Debug, Clone)]
pub struct FpsMeter {
    frames: u32,
    elapsed: f32,
    throttle: Throttled,
    fps: f32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            elapsed: 0.0,
            throttle: Throttled::new(FPS_UPDATE_INTERVAL),
            fps: 0.0,
        }
    }

    pub fn tick(&mut self, delta: f32) -> f32 {
        self.frames += 1;
        self.elapsed += delta;

        if self.throttle.try_tick(delta) && self.elapsed > 0.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
        self.fps
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbers shown in the overlay
#[derive(Debug, Clone, Copy)]
pub struct OverlayStats {
    pub fps: f32,
    pub time: FrameTime,
    pub total_frames: Option<u32>,
    pub playing: bool,
}

/// egui HUD drawn over the sketch in the preview window
pub struct Overlay {
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(window: &Window, gpu: &GpuContext, format: wgpu::TextureFormat) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(gpu.device(), format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Draw the HUD on top of `view` and collect button presses
    pub fn paint(
        &mut self,
        window: &Window,
        gpu: &GpuContext,
        view: &wgpu::TextureView,
        size: (u32, u32),
        stats: &OverlayStats,
    ) -> Vec<OverlayAction> {
        let mut actions = Vec::new();
        let raw_input = self.egui_state.take_egui_input(window);

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Sketch")
                .title_bar(true)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .default_width(180.0)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", stats.fps))
                            .size(18.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.separator();
                    ui.label(format!("Time: {:.2} s", stats.time.time));
                    match stats.total_frames {
                        Some(total) => ui.label(format!("Frame: {} / {}", stats.time.frame, total)),
                        None => ui.label(format!("Frame: {}", stats.time.frame)),
                    };
                    ui.label(format!("Playhead: {:.3}", stats.time.playhead));
                    ui.separator();
                    ui.horizontal(|ui| {
                        let label = if stats.playing { "Pause" } else { "Play" };
                        if ui.button(label).clicked() {
                            actions.push(OverlayAction::TogglePause);
                        }
                        if ui.button("Restart").clicked() {
                            actions.push(OverlayAction::Restart);
                        }
                    });
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(gpu.device(), gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.0, size.1],
            pixels_per_point: window.scale_factor() as f32,
        };

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui Encoder"),
            });

        let user_buffers = self.egui_renderer.update_buffers(
            gpu.device(),
            gpu.queue(),
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        gpu.queue()
            .submit(user_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        actions
    }
}
