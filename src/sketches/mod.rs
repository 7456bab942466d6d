pub mod dots;
pub mod earth;
pub mod polka;

use anyhow::Result;
use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::core::{Controller, RenderTarget, ResizeProps, Sketch, SketchContext};
use crate::math::Color;
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::settings::SketchSettings;

/// Every sketch frames its subject with the same lens
pub const CAMERA_FOV: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SketchKind {
    /// Textured earth and moon lit by a point light
    Earth,
    /// Red sphere dotted with black circles
    Dots,
    /// Polka-dot shader sphere turning once per loop
    Polka,
}

impl SketchKind {
    pub const ALL: [SketchKind; 3] = [SketchKind::Earth, SketchKind::Dots, SketchKind::Polka];

    pub fn name(self) -> &'static str {
        match self {
            SketchKind::Earth => "earth",
            SketchKind::Dots => "dots",
            SketchKind::Polka => "polka",
        }
    }

    pub fn settings(self) -> SketchSettings {
        match self {
            SketchKind::Earth => earth::settings(),
            SketchKind::Dots => dots::settings(),
            SketchKind::Polka => polka::settings(),
        }
    }

    pub fn create(self, context: SketchContext) -> Result<Box<dyn Sketch>> {
        Ok(match self {
            SketchKind::Earth => Box::new(earth::Earth::new(&context)?),
            SketchKind::Dots => Box::new(dots::Dots::new(&context)?),
            SketchKind::Polka => Box::new(polka::Polka::new(&context)?),
        })
    }
}

/// Camera at `position` looking at the origin
pub fn camera_at(position: Vec3) -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(CAMERA_FOV, 1.0, CAMERA_NEAR, CAMERA_FAR);
    camera.position = position;
    camera.look_at(Vec3::ZERO);
    camera
}

/// Renderer, camera and orbit controls; the part every sketch shares
pub struct Stage {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub renderer: Renderer,
}

impl Stage {
    pub fn new(context: &SketchContext, camera: PerspectiveCamera, clear_color: Color) -> Self {
        let mut renderer = Renderer::new(context.gpu.clone(), context.format);
        renderer.set_clear_color(clear_color, 1.0);
        let controls = OrbitControls::new(&camera);

        Self {
            camera,
            controls,
            renderer,
        }
    }

    pub fn resize(&mut self, props: &ResizeProps) {
        self.renderer.set_pixel_ratio(props.pixel_ratio);
        self.renderer.set_size(props.viewport_width, props.viewport_height);
        self.camera.aspect = props.aspect();
        self.camera.update_projection_matrix();
    }

    pub fn input(&mut self, controller: &dyn Controller, props: &ResizeProps) {
        let (_, height) = props.surface_size();
        self.controls.handle_input(controller, height as f32, &self.camera);
    }

    pub fn render(&mut self, scene: &Scene, target: &RenderTarget) -> Result<()> {
        self.controls.update(&mut self.camera);
        self.renderer.render(scene, &self.camera, target)
    }

    pub fn unload(&mut self) {
        self.controls.dispose();
        self.renderer.dispose();
    }
}
