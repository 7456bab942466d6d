use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use super::capture::{export_file_name, export_timestamp, FrameCapture, EXPORT_FORMAT};
use super::clock::{Clock, LoopClock};
use super::gpu_context::GpuContext;
use super::input_adapter::WinitController;
use super::overlay::{FpsMeter, Overlay, OverlayAction, OverlayStats};
use super::sketch::{RenderTarget, ResizeProps, Sketch, SketchContext};
use super::surface::WindowSurface;
use super::timer::FramePacer;
use crate::settings::{SketchSettings, PREVIEW_MAX_SIZE};

/// Builds a sketch once the GPU is ready
pub type SketchFactory = Box<dyn Fn(SketchContext) -> Result<Box<dyn Sketch>>>;

/// How to run one sketch
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub name: String,
    pub settings: SketchSettings,
    pub assets: PathBuf,
    pub seed: u64,
    pub show_ui: bool,
}

/// Render every frame of the sketch offscreen and write numbered PNGs
pub fn run_export(options: &RunOptions, dir: &Path, factory: &SketchFactory) -> Result<Vec<PathBuf>> {
    let gpu = pollster::block_on(GpuContext::new())?;
    let (width, height) = options.settings.export_size();

    let mut sketch = factory(SketchContext {
        gpu: gpu.clone(),
        format: EXPORT_FORMAT,
        settings: options.settings.clone(),
        assets: options.assets.clone(),
        seed: options.seed,
    })?;

    sketch.resize(&ResizeProps {
        pixel_ratio: 1.0,
        viewport_width: width,
        viewport_height: height,
        scale_factor: 1.0,
    });

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let capture = FrameCapture::new(&gpu, width, height);
    let clock = LoopClock::from_settings(&options.settings);
    let total = options.settings.export_frame_count();
    let stamp = export_timestamp();

    log::info!("Exporting {} frame(s) of '{}' at {}x{}", total, options.name, width, height);

    let mut paths = Vec::with_capacity(total as usize);
    for index in 0..total {
        let time = clock.export_frame(index, total);
        sketch.render(&capture.target(), &time)?;

        let path = dir.join(export_file_name(&options.name, &stamp, index));
        capture.save_png(&gpu, &path)?;
        log::debug!("Wrote {}", path.display());
        paths.push(path);
    }

    sketch.unload();
    log::info!("Export finished: {} file(s) in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Open a preview window and run the sketch until it is closed
pub fn run_preview(options: RunOptions, factory: SketchFactory) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(options, factory);
    event_loop.run_app(&mut app).context("Event loop error")?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Preview {
    window: Arc<Window>,
    gpu: GpuContext,
    surface: WindowSurface,
    sketch: Box<dyn Sketch>,
    overlay: Option<Overlay>,
    props: ResizeProps,
}

struct App {
    options: RunOptions,
    factory: SketchFactory,
    preview: Option<Preview>,
    input: WinitController,
    clock: LoopClock,
    frame_clock: Clock,
    pace_clock: Clock,
    pacer: FramePacer,
    fps: FpsMeter,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(options: RunOptions, factory: SketchFactory) -> Self {
        let clock = LoopClock::from_settings(&options.settings);
        let pacer = FramePacer::new(options.settings.fps);
        Self {
            options,
            factory,
            preview: None,
            input: WinitController::new(),
            clock,
            frame_clock: Clock::new(),
            pace_clock: Clock::new(),
            pacer,
            fps: FpsMeter::new(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Preview> {
        let (width, height) = self.options.settings.fit_window_size(PREVIEW_MAX_SIZE);
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(format!("sketch: {}", self.options.name))
                    .with_inner_size(winit::dpi::LogicalSize::new(width, height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let (gpu, surface) = pollster::block_on(GpuContext::new_with_window(window.clone()))?;
        let size = window.inner_size();
        let surface = WindowSurface::new(&gpu, surface, size.width, size.height)?;

        let mut sketch = (self.factory)(SketchContext {
            gpu: gpu.clone(),
            format: surface.format(),
            settings: self.options.settings.clone(),
            assets: self.options.assets.clone(),
            seed: self.options.seed,
        })?;

        let props = self.resize_props(&window);
        sketch.resize(&props);

        let overlay = self
            .options
            .show_ui
            .then(|| Overlay::new(&window, &gpu, surface.format()));

        log::info!("Previewing '{}'", self.options.name);
        Ok(Preview {
            window,
            gpu,
            surface,
            sketch,
            overlay,
            props,
        })
    }

    fn resize_props(&self, window: &Window) -> ResizeProps {
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        ResizeProps {
            pixel_ratio: self.options.settings.pixel_ratio.unwrap_or(scale as f32),
            viewport_width: logical.width.round() as u32,
            viewport_height: logical.height.round() as u32,
            scale_factor: scale as f32,
        }
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut preview) = self.preview.take() {
            preview.sketch.unload();
        }
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<()> {
        let delta = self.frame_clock.tick();
        let fps = self.fps.tick(delta);

        let Some(preview) = self.preview.as_mut() else {
            return Ok(());
        };

        preview.sketch.input(&self.input, &preview.props);
        self.input.reset_deltas();

        let advance = if self.options.settings.animate { delta } else { 0.0 };
        let time = self.clock.advance(advance);

        let Some(frame) = preview.surface.acquire(&preview.gpu)? else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = preview.surface.size();

        preview.sketch.render(&RenderTarget { view: &view, width, height }, &time)?;

        if let Some(overlay) = preview.overlay.as_mut() {
            let stats = OverlayStats {
                fps,
                time,
                total_frames: self.options.settings.total_frames(),
                playing: self.clock.is_playing(),
            };
            for action in overlay.paint(&preview.window, &preview.gpu, &view, (width, height), &stats) {
                match action {
                    OverlayAction::TogglePause => self.clock.toggle(),
                    OverlayAction::Restart => self.clock.restart(),
                }
            }
        }

        frame.present();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.preview.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(preview) => {
                self.frame_clock.reset();
                self.pace_clock.reset();
                self.preview = Some(preview);
            }
            Err(e) => {
                log::error!("Failed to start sketch: {:#}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(preview) = self.preview.as_mut() {
            if let Some(overlay) = preview.overlay.as_mut() {
                if overlay.handle_event(&preview.window, &event) {
                    self.input.process_consumed_event(&event);
                    return;
                }
            }
        }

        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.stop(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        repeat: false,
                        ..
                    },
                ..
            } => self.clock.toggle(),
            WindowEvent::Resized(size) => {
                let props = self
                    .preview
                    .as_ref()
                    .map(|preview| self.resize_props(&preview.window));
                if let (Some(preview), Some(props)) = (self.preview.as_mut(), props) {
                    preview.surface.resize(&preview.gpu, size.width, size.height);
                    preview.props = props;
                    preview.sketch.resize(&props);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    log::error!("Render error: {:#}", e);
                    self.error = Some(e);
                    self.stop(event_loop);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(preview) = &self.preview else {
            return;
        };

        let delta = self.pace_clock.tick();
        if self.pacer.tick(delta) {
            preview.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + self.pacer.time_until_next()));
    }
}
