use anyhow::Result;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{camera_at, Stage};
use crate::core::{Controller, FrameTime, RenderTarget, ResizeProps, Sketch, SketchContext};
use crate::geometry;
use crate::material::{BasicMaterial, ShaderMaterial, Side};
use crate::math::{unique_points, Color};
use crate::scene::{MaterialId, Node, NodeId, Scene};
use crate::settings::SketchSettings;

const SOLID_SHADER: &str = include_str!("../shaders/solid.wgsl");

pub fn settings() -> SketchSettings {
    SketchSettings {
        animate: true,
        ..Default::default()
    }
}

/// Red sphere with a black circle at every icosahedron vertex
pub struct DotsScene {
    pub scene: Scene,
    pub sphere: NodeId,
    pub sphere_material: MaterialId,
    pub circles: Vec<NodeId>,
}

impl DotsScene {
    pub fn build(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scene = Scene::new();

        let sphere_geometry = scene.add_geometry(geometry::sphere(1.0, 32, 16));
        let sphere_material = scene.add_material(
            ShaderMaterial::new(SOLID_SHADER)
                .uniform("color", Color::parse("red")?)?
                .uniform("time", 0.0_f32)?,
        );
        let sphere = scene.add(Node::mesh("sphere", sphere_geometry, sphere_material));

        let points = unique_points(geometry::icosahedron(1.0, 1).points());
        let circle = scene.add_geometry(geometry::circle(1.0, 32));
        let black = scene.add_material(BasicMaterial {
            color: Color::parse("black")?,
            side: Side::Back,
            wireframe: false,
        });

        let mut circles = Vec::with_capacity(points.len());
        for point in points {
            let mut node = Node::mesh("circle", circle, black).at(point);
            node.transform.set_scalar(0.075 * rng.random::<f32>() + 0.075);
            let id = scene.add(node);
            scene.look_at(id, Vec3::ZERO);
            circles.push(id);
        }

        Ok(Self {
            scene,
            sphere,
            sphere_material,
            circles,
        })
    }

    pub fn set_time(&mut self, time: f32) -> Result<()> {
        if let Some(shader) = self.scene.material_mut(self.sphere_material).as_shader_mut() {
            shader.set_uniform("time", time)?;
        }
        Ok(())
    }
}

pub struct Dots {
    stage: Stage,
    world: DotsScene,
}

impl Dots {
    pub fn new(context: &SketchContext) -> Result<Self> {
        let world = DotsScene::build(context.seed)?;
        let stage = Stage::new(context, camera_at(Vec3::new(0.0, 0.0, -4.0)), Color::BLACK);
        Ok(Self { stage, world })
    }
}

impl Sketch for Dots {
    fn resize(&mut self, props: &ResizeProps) {
        self.stage.resize(props);
    }

    fn input(&mut self, controller: &dyn Controller, props: &ResizeProps) {
        self.stage.input(controller, props);
    }

    fn render(&mut self, target: &RenderTarget, time: &FrameTime) -> Result<()> {
        self.world.set_time(time.time)?;
        self.stage.render(&self.world.scene, target)
    }

    fn unload(&mut self) {
        self.stage.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;
    use crate::uniforms::UniformValue;

    #[test]
    fn test_one_circle_per_unique_vertex() {
        let world = DotsScene::build(7).unwrap();
        assert_eq!(world.circles.len(), 42);
        assert_eq!(world.scene.draw_list().len(), 43);
    }

    #[test]
    fn test_circle_scale_range() {
        let world = DotsScene::build(1).unwrap();
        for &id in &world.circles {
            let scale = world.scene.node(id).transform.scale;
            assert!(scale.x >= 0.075 && scale.x < 0.15);
            assert_eq!(scale.x, scale.y);
            assert_eq!(scale.x, scale.z);
        }
    }

    #[test]
    fn test_seed_reproduces_layout() {
        let a = DotsScene::build(42).unwrap();
        let b = DotsScene::build(42).unwrap();
        let scales = |w: &DotsScene| -> Vec<f32> {
            w.circles.iter().map(|&id| w.scene.node(id).transform.scale.x).collect()
        };
        assert_eq!(scales(&a), scales(&b));
    }

    #[test]
    fn test_circles_face_origin() {
        let world = DotsScene::build(3).unwrap();
        for &id in &world.circles {
            let node = world.scene.node(id);
            let facing = node.transform.quaternion() * Vec3::Z;
            let inward = -node.transform.position.normalize();
            assert!(facing.dot(inward) > 0.999);
            assert!(matches!(node.kind, NodeKind::Mesh { .. }));
        }
    }

    #[test]
    fn test_time_uniform_updates() {
        let mut world = DotsScene::build(0).unwrap();
        world.set_time(1.5).unwrap();
        let shader = world.scene.material_mut(world.sphere_material).as_shader_mut().unwrap();
        assert_eq!(shader.uniforms.get("time"), Some(&UniformValue::Float(1.5)));
    }
}
