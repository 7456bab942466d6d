use canvas_sketches::settings::{Dimensions, Orientation, PaperSize, SketchSettings, PREVIEW_MAX_SIZE};
use serde_json::json;
use std::path::PathBuf;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("canvas-sketches-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

#[cfg(test)]
mod settings_tests {
    use super::*;

    #[test]
    fn test_file_overrides_selected_keys() {
        let path = temp_file("loop.json", r#"{ "duration": 2, "fps": 60, "loop": false }"#);
        let settings = SketchSettings::default().with_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.duration, Some(2.0));
        assert_eq!(settings.fps, 60.0);
        assert!(!settings.looping);
        assert_eq!(settings.pixels_per_inch, 72.0);
        assert_eq!(settings.total_frames(), Some(120));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("canvas-sketches-does-not-exist.json");
        assert!(SketchSettings::default().with_file(&path).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_file("broken.json", "{ fps: ");
        let result = SketchSettings::default().with_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_paper_dimensions_from_json() {
        let settings = SketchSettings::default()
            .merge_json(&json!({ "dimensions": "A4", "orientation": "portrait", "pixelsPerInch": 300 }))
            .unwrap();
        assert_eq!(settings.dimensions, Some(Dimensions::Paper(PaperSize::A4)));
        assert_eq!(settings.orientation, Some(Orientation::Portrait));
        assert_eq!(settings.output_size(), Some((2480, 3508)));
    }

    #[test]
    fn test_rejects_2d_context() {
        let result = SketchSettings::default().merge_json(&json!({ "context": "2d" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_window_fit_keeps_aspect() {
        let settings = SketchSettings {
            dimensions: Some(Dimensions::Pixels([1080, 1080])),
            ..Default::default()
        };
        assert_eq!(settings.fit_window_size(PREVIEW_MAX_SIZE), (800.0, 800.0));
        assert_eq!(SketchSettings::default().fit_window_size(PREVIEW_MAX_SIZE), PREVIEW_MAX_SIZE);
    }

    #[test]
    fn test_still_exports_one_frame() {
        let settings = SketchSettings {
            duration: Some(3.0),
            ..Default::default()
        };
        assert_eq!(settings.export_frame_count(), 1);
        assert_eq!(settings.export_size(), (1280, 800));
    }
}
