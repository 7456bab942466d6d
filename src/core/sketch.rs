use anyhow::Result;
use std::path::PathBuf;

use super::clock::FrameTime;
use super::controller::Controller;
use super::gpu_context::GpuContext;
use crate::settings::SketchSettings;

/// Everything a sketch needs at setup
#[derive(Clone)]
pub struct SketchContext {
    pub gpu: GpuContext,
    /// Format of the textures the sketch will render into
    pub format: wgpu::TextureFormat,
    pub settings: SketchSettings,
    /// Directory textures are loaded from
    pub assets: PathBuf,
    pub seed: u64,
}

/// Size of the canvas in logical pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeProps {
    /// Drawing buffer pixels per logical pixel
    pub pixel_ratio: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Window pixels per logical pixel; pointer deltas arrive in these
    pub scale_factor: f32,
}

impl ResizeProps {
    pub fn aspect(&self) -> f32 {
        self.viewport_width.max(1) as f32 / self.viewport_height.max(1) as f32
    }

    /// Physical size of the drawing buffer
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            (self.viewport_width as f32 * self.pixel_ratio).round() as u32,
            (self.viewport_height as f32 * self.pixel_ratio).round() as u32,
        )
    }

    /// Physical size of the surface the canvas is shown on
    pub fn surface_size(&self) -> (u32, u32) {
        (
            (self.viewport_width as f32 * self.scale_factor).round() as u32,
            (self.viewport_height as f32 * self.scale_factor).round() as u32,
        )
    }
}

/// Color attachment a frame is drawn into
pub struct RenderTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// A self-contained animated script: built once, then resized and rendered
/// until it is unloaded.
pub trait Sketch {
    /// Called before the first frame and whenever the canvas changes size
    fn resize(&mut self, props: &ResizeProps);

    /// Pointer and key state for the coming frame
    fn input(&mut self, _controller: &dyn Controller, _props: &ResizeProps) {}

    fn render(&mut self, target: &RenderTarget, time: &FrameTime) -> Result<()>;

    /// Release the renderer and controls; no frames follow
    fn unload(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_applies_ratio() {
        let props = ResizeProps {
            pixel_ratio: 2.0,
            viewport_width: 640,
            viewport_height: 360,
            scale_factor: 2.0,
        };
        assert_eq!(props.buffer_size(), (1280, 720));
        assert!((props.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_of_empty_viewport() {
        let props = ResizeProps {
            pixel_ratio: 1.0,
            viewport_width: 0,
            viewport_height: 0,
            scale_factor: 1.0,
        };
        assert_eq!(props.aspect(), 1.0);
    }

    #[test]
    fn test_surface_size_ignores_pixel_ratio() {
        let props = ResizeProps {
            pixel_ratio: 1.0,
            viewport_width: 800,
            viewport_height: 800,
            scale_factor: 2.0,
        };
        assert_eq!(props.buffer_size(), (800, 800));
        assert_eq!(props.surface_size(), (1600, 1600));
    }
}
