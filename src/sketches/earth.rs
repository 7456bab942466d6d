use anyhow::Result;
use glam::Vec3;

use super::{camera_at, Stage};
use crate::core::{Controller, FrameTime, RenderTarget, ResizeProps, Sketch, SketchContext};
use crate::geometry;
use crate::material::StandardMaterial;
use crate::math::Color;
use crate::scene::{Node, NodeId, Scene};
use crate::settings::{Dimensions, Orientation, PaperSize, SketchSettings};
use crate::texture::{TextureData, TextureLoader};

pub const EARTH_TEXTURE: &str = "earth.jpg";
pub const MOON_TEXTURE: &str = "moon.jpg";

const EARTH_SPIN: f32 = 0.15;
const MOON_SPIN: f32 = 0.075;
const MOON_ORBIT: f32 = 0.5;

pub fn settings() -> SketchSettings {
    SketchSettings {
        animate: true,
        dimensions: Some(Dimensions::Paper(PaperSize::A4)),
        orientation: Some(Orientation::Landscape),
        pixels_per_inch: 300.0,
        ..Default::default()
    }
}

/// Earth, orbiting moon and the light between them
pub struct EarthScene {
    pub scene: Scene,
    pub earth: NodeId,
    pub moon: NodeId,
    pub moon_group: NodeId,
    pub light: NodeId,
}

impl EarthScene {
    pub fn build(earth_map: TextureData, moon_map: TextureData) -> Self {
        let mut scene = Scene::new();
        let sphere = scene.add_geometry(geometry::sphere(1.0, 32, 16));

        let earth_texture = scene.add_texture(earth_map);
        let earth_material = scene.add_material(StandardMaterial {
            map: Some(earth_texture),
            roughness: 1.0,
            metalness: 0.0,
            ..Default::default()
        });
        let earth = scene.add(Node::mesh("earth", sphere, earth_material));

        let moon_texture = scene.add_texture(moon_map);
        let moon_material = scene.add_material(StandardMaterial {
            map: Some(moon_texture),
            roughness: 1.0,
            metalness: 0.0,
            ..Default::default()
        });
        let moon_group = scene.add(Node::group("moon group"));
        let mut moon = Node::mesh("moon", sphere, moon_material).at(Vec3::new(1.5, 1.0, 0.0));
        moon.transform.set_scalar(0.25);
        let moon = scene.add_child(moon_group, moon);

        let light = scene.add(Node::point_light("light", Color::WHITE, 2.0).at(Vec3::new(2.0, 2.0, 2.0)));
        scene.add_point_light_helper(light, 0.15);

        Self {
            scene,
            earth,
            moon,
            moon_group,
            light,
        }
    }

    /// Pose for `time` seconds into the sketch
    pub fn animate(&mut self, time: f32) {
        self.scene.node_mut(self.earth).transform.rotation.y = time * EARTH_SPIN;
        self.scene.node_mut(self.moon).transform.rotation.y = time * MOON_SPIN;
        self.scene.node_mut(self.moon_group).transform.rotation.y = time * MOON_ORBIT;
    }
}

pub struct Earth {
    stage: Stage,
    world: EarthScene,
}

impl Earth {
    pub fn new(context: &SketchContext) -> Result<Self> {
        let loader = TextureLoader::new(&context.assets);
        let world = EarthScene::build(loader.load(EARTH_TEXTURE), loader.load(MOON_TEXTURE));
        let stage = Stage::new(context, camera_at(Vec3::new(3.0, 3.0, -5.0)), Color::BLACK);

        Ok(Self { stage, world })
    }
}

impl Sketch for Earth {
    fn resize(&mut self, props: &ResizeProps) {
        self.stage.resize(props);
    }

    fn input(&mut self, controller: &dyn Controller, props: &ResizeProps) {
        self.stage.input(controller, props);
    }

    fn render(&mut self, target: &RenderTarget, time: &FrameTime) -> Result<()> {
        self.world.animate(time.time);
        self.stage.render(&self.world.scene, target)
    }

    fn unload(&mut self) {
        self.stage.unload();
    }
}
