use anyhow::{anyhow, Context, Result};
use wgpu::{Surface, SurfaceConfiguration, SurfaceTexture, TextureFormat};

use super::gpu_context::GpuContext;

/// Window surface plus its configuration
///
/// Prefers a non-sRGB format: sketch colors are written to the screen as-is.
pub struct WindowSurface {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

impl WindowSurface {
    pub fn new(gpu: &GpuContext, surface: Surface<'static>, width: u32, height: u32) -> Result<Self> {
        let surface_caps = surface.get_capabilities(gpu.adapter());
        let format = pick_format(&surface_caps.formats).context("Surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(gpu.device(), &config);
        log::info!("Surface configured: {:?} {}x{}", format, config.width, config.height);

        Ok(Self { surface, config })
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    /// Dimensions in physical pixels
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(gpu.device(), &self.config);
    }

    /// Next frame to draw into, or `None` when this frame should be skipped
    pub fn acquire(&mut self, gpu: &GpuContext) -> Result<Option<SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(gpu.device(), &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                Ok(None)
            }
            Err(e) => Err(anyhow!("Failed to acquire surface texture: {:?}", e)),
        }
    }
}

fn pick_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_linear_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_format(&formats), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_format(&[]), None);
    }
}
