use canvas_sketches::material::ShaderMaterial;
use canvas_sketches::math::Color;
use canvas_sketches::sketches::polka::{dot_points, POINTS_UNIFORM, POINT_COUNT_DEFINE};
use canvas_sketches::uniforms::{UniformBag, UniformSlot};
use glam::Vec3;

#[cfg(test)]
mod uniform_tests {
    use super::*;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_polka_layout_matches_wgsl_struct() {
        // struct Material { color: vec3<f32>, time: f32, points: array<vec4<f32>, N> }
        let bag = UniformBag::new()
            .with("color", Color::rgb(1.0, 0.0, 0.0))
            .unwrap()
            .with("time", 0.5_f32)
            .unwrap()
            .with("points", dot_points())
            .unwrap();

        let (slots, size) = bag.layout();
        assert_eq!(slots[0], UniformSlot { offset: 0, size: 12 });
        assert_eq!(slots[1], UniformSlot { offset: 12, size: 4 });
        assert_eq!(slots[2], UniformSlot { offset: 16, size: 42 * 16 });
        assert_eq!(size, 16 + 42 * 16);

        let data = floats(&bag.to_bytes());
        assert_eq!(&data[..4], &[1.0, 0.0, 0.0, 0.5]);
        assert_eq!(data[7], 0.0, "array padding lane");
    }

    #[test]
    fn test_set_keeps_layout() {
        let mut bag = UniformBag::new().with("time", 0.0_f32).unwrap();
        bag.set("time", 2.0_f32).unwrap();
        assert_eq!(floats(&bag.to_bytes())[0], 2.0);
        assert_eq!(bag.to_bytes().len(), 16);
    }

    #[test]
    fn test_set_rejects_wrong_kind_and_unknown_name() {
        let mut bag = UniformBag::new().with("time", 0.0_f32).unwrap();
        assert!(bag.set("time", Vec3::ONE).is_err());
        assert!(bag.set("speed", 1.0_f32).is_err());
    }

    #[test]
    fn test_array_length_is_fixed_after_declare() {
        let mut bag = UniformBag::new().with("points", vec![Vec3::X, Vec3::Y]).unwrap();
        assert!(bag.set("points", vec![Vec3::Z]).is_err());
        assert!(bag.set("points", vec![Vec3::Z, Vec3::X]).is_ok());
    }

    #[test]
    fn test_empty_array_is_rejected() {
        assert!(UniformBag::new().with("points", Vec::<Vec3>::new()).is_err());
    }

    #[test]
    fn test_point_array_define_in_composed_source() {
        let material = ShaderMaterial::new("fn body() {}")
            .point_array(POINTS_UNIFORM, POINT_COUNT_DEFINE, dot_points())
            .unwrap();
        material.validate().unwrap();

        let text = material.source.compose("// prelude");
        assert!(text.starts_with("const POINT_COUNT: u32 = 42u;\n"));
        assert!(text.find("// prelude").unwrap() < text.find("fn body").unwrap());
    }
}
