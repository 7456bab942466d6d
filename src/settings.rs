use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const MM_PER_INCH: f32 = 25.4;

/// Largest logical preview window; bigger outputs are scaled down to fit
pub const PREVIEW_MAX_SIZE: (f64, f64) = (1280.0, 800.0);

/// Rendering context a sketch asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContextKind {
    #[default]
    #[serde(rename = "webgl")]
    WebGl,
    #[serde(rename = "2d")]
    TwoD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Named paper formats, stored portrait in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[serde(rename = "A3", alias = "a3")]
    A3,
    #[serde(rename = "A4", alias = "a4")]
    A4,
    #[serde(rename = "A5", alias = "a5")]
    A5,
    #[serde(rename = "letter")]
    Letter,
    #[serde(rename = "legal")]
    Legal,
}

impl PaperSize {
    pub fn millimetres(&self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
        }
    }
}

/// Output dimensions: explicit pixels or a paper format
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimensions {
    Pixels([u32; 2]),
    Paper(PaperSize),
}

/// Per-sketch configuration, overridable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SketchSettings {
    pub animate: bool,
    pub context: ContextKind,
    /// `None` fills the preview window
    pub dimensions: Option<Dimensions>,
    pub orientation: Option<Orientation>,
    pub pixels_per_inch: f32,
    /// Loop length in seconds
    pub duration: Option<f32>,
    pub fps: f32,
    /// `None` follows the window's scale factor
    pub pixel_ratio: Option<f32>,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            animate: false,
            context: ContextKind::WebGl,
            dimensions: None,
            orientation: None,
            pixels_per_inch: 72.0,
            duration: None,
            fps: 24.0,
            pixel_ratio: None,
            looping: true,
        }
    }
}

impl SketchSettings {
    /// Read a JSON settings file and overlay it on these defaults
    pub fn with_file(&self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let overrides: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        self.merge_json(&overrides)
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Overlay the keys of a JSON object; unnamed keys keep their current value
    pub fn merge_json(&self, overrides: &serde_json::Value) -> Result<Self> {
        let Some(entries) = overrides.as_object() else {
            bail!("Settings overrides must be a JSON object");
        };

        let mut merged = serde_json::to_value(self)?;
        if let Some(base) = merged.as_object_mut() {
            for (key, value) in entries {
                if !base.contains_key(key) {
                    log::warn!("Ignoring unknown setting '{}'", key);
                    continue;
                }
                base.insert(key.clone(), value.clone());
            }
        }

        let settings: SketchSettings =
            serde_json::from_value(merged).context("Failed to apply settings overrides")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.context == ContextKind::TwoD {
            bail!("The 2d context is not supported; use \"webgl\"");
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("fps must be positive, got {}", self.fps);
        }
        if !(self.pixels_per_inch.is_finite() && self.pixels_per_inch > 0.0) {
            bail!("pixelsPerInch must be positive, got {}", self.pixels_per_inch);
        }
        if let Some(duration) = self.duration {
            if !(duration.is_finite() && duration > 0.0) {
                bail!("duration must be positive, got {}", duration);
            }
        }
        if let Some(ratio) = self.pixel_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                bail!("pixelRatio must be positive, got {}", ratio);
            }
        }
        if let Some(Dimensions::Pixels([w, h])) = self.dimensions {
            if w == 0 || h == 0 {
                bail!("dimensions must be non-zero, got [{}, {}]", w, h);
            }
        }
        Ok(())
    }

    /// Output size in pixels, or `None` when the sketch fills the window
    pub fn output_size(&self) -> Option<(u32, u32)> {
        let (width, height) = match self.dimensions? {
            Dimensions::Pixels([w, h]) => (w, h),
            Dimensions::Paper(paper) => {
                let (w, h) = paper.millimetres();
                let to_px = |mm: f32| (mm / MM_PER_INCH * self.pixels_per_inch).round() as u32;
                (to_px(w), to_px(h))
            }
        };

        Some(match self.orientation {
            Some(Orientation::Landscape) => (width.max(height), width.min(height)),
            Some(Orientation::Portrait) => (width.min(height), width.max(height)),
            None => (width, height),
        })
    }

    /// Number of frames in one loop, when a duration is set
    pub fn total_frames(&self) -> Option<u32> {
        self.duration
            .map(|duration| ((duration * self.fps).ceil() as u32).max(1))
    }

    /// Frames written by an export: the whole loop, or one still
    pub fn export_frame_count(&self) -> u32 {
        if !self.animate {
            return 1;
        }
        self.total_frames().unwrap_or(1)
    }

    /// Offscreen size for exports; window-filling sketches use the preview size
    pub fn export_size(&self) -> (u32, u32) {
        self.output_size()
            .unwrap_or((PREVIEW_MAX_SIZE.0 as u32, PREVIEW_MAX_SIZE.1 as u32))
    }

    /// Logical window size keeping the output aspect within `max`
    pub fn fit_window_size(&self, max: (f64, f64)) -> (f64, f64) {
        match self.output_size() {
            Some((w, h)) => {
                let (w, h) = (w as f64, h as f64);
                let scale = (max.0 / w).min(max.1 / h).min(1.0);
                ((w * scale).round(), (h * scale).round())
            }
            None => max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = SketchSettings::default();
        assert_eq!(settings.fps, 24.0);
        assert_eq!(settings.pixels_per_inch, 72.0);
        assert!(settings.looping);
        assert!(!settings.animate);
        assert_eq!(settings.output_size(), None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_a4_landscape_at_300_ppi() {
        let settings = SketchSettings {
            dimensions: Some(Dimensions::Paper(PaperSize::A4)),
            orientation: Some(Orientation::Landscape),
            pixels_per_inch: 300.0,
            ..Default::default()
        };
        assert_eq!(settings.output_size(), Some((3508, 2480)));
    }

    #[test]
    fn test_portrait_swaps_pixels() {
        let settings = SketchSettings {
            dimensions: Some(Dimensions::Pixels([1920, 1080])),
            orientation: Some(Orientation::Portrait),
            ..Default::default()
        };
        assert_eq!(settings.output_size(), Some((1080, 1920)));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let settings: SketchSettings = serde_json::from_value(json!({
            "animate": true,
            "dimensions": "A4",
            "pixelsPerInch": 300,
            "loop": false,
            "context": "webgl"
        }))
        .unwrap();

        assert!(settings.animate);
        assert!(!settings.looping);
        assert_eq!(settings.dimensions, Some(Dimensions::Paper(PaperSize::A4)));
        assert_eq!(settings.fps, 24.0);
    }

    #[test]
    fn test_2d_context_rejected() {
        let err = SketchSettings::default()
            .merge_json(&json!({ "context": "2d" }))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("2d"));
    }

    #[test]
    fn test_total_frames_rounds_up() {
        let settings = SketchSettings {
            animate: true,
            duration: Some(5.0),
            fps: 30.0,
            ..Default::default()
        };
        assert_eq!(settings.total_frames(), Some(150));

        let settings = SketchSettings {
            duration: Some(1.01),
            fps: 24.0,
            ..settings
        };
        assert_eq!(settings.total_frames(), Some(25));
    }

    #[test]
    fn test_still_exports_one_frame() {
        let settings = SketchSettings {
            animate: false,
            duration: Some(5.0),
            ..Default::default()
        };
        assert_eq!(settings.export_frame_count(), 1);
    }

    #[test]
    fn test_fit_window_keeps_aspect() {
        let settings = SketchSettings {
            dimensions: Some(Dimensions::Pixels([1080, 1080])),
            ..Default::default()
        };
        assert_eq!(settings.fit_window_size(PREVIEW_MAX_SIZE), (800.0, 800.0));

        let small = SketchSettings {
            dimensions: Some(Dimensions::Pixels([300, 200])),
            ..Default::default()
        };
        assert_eq!(small.fit_window_size(PREVIEW_MAX_SIZE), (300.0, 200.0));
    }
}
