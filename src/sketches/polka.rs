use std::f32::consts::TAU;

use anyhow::Result;
use glam::Vec3;

use super::{camera_at, Stage};
use crate::core::{Controller, FrameTime, RenderTarget, ResizeProps, Sketch, SketchContext};
use crate::geometry;
use crate::material::ShaderMaterial;
use crate::math::{unique_points, Color};
use crate::scene::{MaterialId, Node, NodeId, Scene};
use crate::settings::{Dimensions, SketchSettings};

const POLKA_SHADER: &str = include_str!("../shaders/polka.wgsl");

pub const POINTS_UNIFORM: &str = "points";
pub const POINT_COUNT_DEFINE: &str = "POINT_COUNT";

pub fn settings() -> SketchSettings {
    SketchSettings {
        animate: true,
        dimensions: Some(Dimensions::Pixels([1080, 1080])),
        duration: Some(5.0),
        fps: 30.0,
        ..Default::default()
    }
}

/// Dot centres: the distinct vertices of a once-subdivided icosahedron
pub fn dot_points() -> Vec<Vec3> {
    unique_points(geometry::icosahedron(1.0, 1).points())
}

pub struct PolkaScene {
    pub scene: Scene,
    pub sphere: NodeId,
    pub material: MaterialId,
}

impl PolkaScene {
    pub fn build() -> Result<Self> {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(geometry::sphere(1.0, 32, 16));

        let shader = ShaderMaterial::new(POLKA_SHADER)
            .uniform("color", Color::parse("red")?)?
            .uniform("time", 0.0_f32)?
            .point_array(POINTS_UNIFORM, POINT_COUNT_DEFINE, dot_points())?;
        shader.validate()?;

        let material = scene.add_material(shader);
        let sphere = scene.add(Node::mesh("sphere", geometry, material));

        Ok(Self {
            scene,
            sphere,
            material,
        })
    }

    /// One full turn per loop
    pub fn animate(&mut self, time: f32, playhead: f32) -> Result<()> {
        self.scene.node_mut(self.sphere).transform.rotation.y = playhead * TAU;
        if let Some(shader) = self.scene.material_mut(self.material).as_shader_mut() {
            shader.set_uniform("time", time)?;
        }
        Ok(())
    }
}

pub struct Polka {
    stage: Stage,
    world: PolkaScene,
}

impl Polka {
    pub fn new(context: &SketchContext) -> Result<Self> {
        let world = PolkaScene::build()?;
        let stage = Stage::new(context, camera_at(Vec3::new(0.0, 0.0, -4.0)), Color::parse("#fff")?);
        Ok(Self { stage, world })
    }
}

impl Sketch for Polka {
    fn resize(&mut self, props: &ResizeProps) {
        self.stage.resize(props);
    }

    fn input(&mut self, controller: &dyn Controller, props: &ResizeProps) {
        self.stage.input(controller, props);
    }

    fn render(&mut self, target: &RenderTarget, time: &FrameTime) -> Result<()> {
        self.world.animate(time.time, time.playhead)?;
        self.stage.render(&self.world.scene, target)
    }

    fn unload(&mut self) {
        self.stage.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::uniforms::UniformValue;

    #[test]
    fn test_point_count_define_matches_array() {
        let world = PolkaScene::build().unwrap();
        let Material::Shader(shader) = world.scene.material(world.material) else {
            panic!("expected a shader material");
        };
        assert_eq!(shader.source.define_value(POINT_COUNT_DEFINE), Some(42));
        match shader.uniforms.get(POINTS_UNIFORM) {
            Some(UniformValue::Vec3Array(points)) => assert_eq!(points.len(), 42),
            other => panic!("unexpected uniform: {:?}", other),
        }
    }

    #[test]
    fn test_half_loop_is_half_turn() {
        let mut world = PolkaScene::build().unwrap();
        world.animate(2.5, 0.5).unwrap();
        let rotation = world.scene.node(world.sphere).transform.rotation.y;
        assert!((rotation - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_loop_frame_count() {
        assert_eq!(settings().total_frames(), Some(150));
        assert_eq!(settings().output_size(), Some((1080, 1080)));
    }
}
