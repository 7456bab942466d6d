pub mod camera;
pub mod cli;
pub mod controls;
pub mod core;
pub mod geometry;
pub mod material;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sketches;
pub mod texture;
pub mod uniforms;

pub use scene::Scene;
pub use settings::SketchSettings;
pub use sketches::SketchKind;
