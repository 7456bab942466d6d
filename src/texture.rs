use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Decoded RGBA8 image waiting to be uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn from_rgba(name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            bail!(
                "Texture '{}' is {}x{} but has {} bytes (expected {})",
                name,
                width,
                height,
                pixels.len(),
                expected
            );
        }
        Ok(Self {
            name: name.to_string(),
            width,
            height,
            pixels,
        })
    }

    /// 1x1 texture of a single color
    pub fn solid(name: &str, rgba: [u8; 4]) -> Self {
        Self {
            name: name.to_string(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }
}

/// Loads image files relative to an asset directory
#[derive(Debug, Clone)]
pub struct TextureLoader {
    base: PathBuf,
}

impl TextureLoader {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    pub fn try_load(&self, name: &str) -> Result<TextureData> {
        let path = self.path(name);
        let image = image::open(&path)
            .with_context(|| format!("Failed to load texture: {}", path.display()))?;

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);

        TextureData::from_rgba(name, width, height, rgba.into_raw())
    }

    /// Load a texture, substituting plain white when the file is unusable.
    ///
    /// The sketch keeps rendering with an untextured surface instead of
    /// aborting.
    pub fn load(&self, name: &str) -> TextureData {
        match self.try_load(name) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{:#}; using a blank texture", e);
                TextureData::solid(name, [255, 255, 255, 255])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_size() {
        assert!(TextureData::from_rgba("ok", 2, 2, vec![0; 16]).is_ok());
        assert!(TextureData::from_rgba("short", 2, 2, vec![0; 15]).is_err());
        assert!(TextureData::from_rgba("empty", 0, 2, vec![]).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_white() {
        let loader = TextureLoader::new("definitely/not/a/real/dir");
        assert!(loader.try_load("earth.jpg").is_err());

        let texture = loader.load("earth.jpg");
        assert_eq!(texture.name, "earth.jpg");
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.pixels, vec![255, 255, 255, 255]);
    }

    #[test]
    fn test_loads_png_from_disk() {
        let dir = std::env::temp_dir().join(format!("sketch-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        image.save(dir.join("tile.png")).unwrap();

        let texture = TextureLoader::new(&dir).try_load("tile.png").unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(&texture.pixels[0..4], &[10, 20, 30, 255]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
