use anyhow::{Context, Result};
use std::path::Path;

use super::gpu_context::GpuContext;
use super::sketch::RenderTarget;

/// Offscreen color format used for exports
pub const EXPORT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Rows copied out of a texture must be padded to 256 bytes
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drop the per-row padding of a texture readback
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_row: u32) -> Vec<u8> {
    let row = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded_row as usize).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row.min(chunk.len())]);
    }
    pixels
}

/// Timestamp shared by every frame of one export
pub fn export_timestamp() -> String {
    chrono::Local::now().format("%Y.%m.%d-%H.%M.%S").to_string()
}

/// `<sketch>-<timestamp>-<frame>.png`, frame zero-padded to four digits
pub fn export_file_name(sketch: &str, timestamp: &str, frame: u32) -> String {
    format!("{}-{}-{:04}.png", sketch, timestamp, frame)
}

/// Offscreen render target that can be read back as PNG
pub struct FrameCapture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row: u32,
}

impl FrameCapture {
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Export Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: EXPORT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_row = padded_bytes_per_row(width);
        let buffer = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Export Readback Buffer"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            buffer,
            width,
            height,
            padded_row,
        }
    }

    pub fn target(&self) -> RenderTarget<'_> {
        RenderTarget {
            view: &self.view,
            width: self.width,
            height: self.height,
        }
    }

    /// Tightly packed RGBA8 pixels of the last rendered frame
    pub fn read_pixels(&self, gpu: &GpuContext) -> Result<Vec<u8>> {
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Export Copy Encoder"),
            });

        encoder.copy_texture_to_buffer(
            self.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let data = gpu.read_buffer(&self.buffer)?;
        Ok(unpad_rows(&data, self.width, self.height, self.padded_row))
    }

    pub fn save_png(&self, gpu: &GpuContext, path: &Path) -> Result<()> {
        let pixels = self.read_pixels(gpu)?;
        let image = image::RgbaImage::from_raw(self.width, self.height, pixels)
            .context("Readback size does not match the export dimensions")?;
        image
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
