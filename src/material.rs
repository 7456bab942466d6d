use anyhow::{bail, Result};
use glam::Vec3;

use crate::math::Color;
use crate::scene::TextureId;
use crate::uniforms::{ShaderSource, UniformBag, UniformValue};

/// Which faces of a mesh are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// Lit material: base color times an optional texture, diffuse from point lights
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub map: Option<TextureId>,
    pub roughness: f32,
    pub metalness: f32,
    pub side: Side,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            roughness: 1.0,
            metalness: 0.0,
            side: Side::Front,
        }
    }
}

/// Unlit flat color
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicMaterial {
    pub color: Color,
    pub side: Side,
    pub wireframe: bool,
}

/// User WGSL with a uniform bag bound at group 2.
///
/// Array uniforms are tied to the define that sizes them in the shader text,
/// so the element count uploaded always matches the compiled array length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderMaterial {
    pub source: ShaderSource,
    pub uniforms: UniformBag,
    pub side: Side,
    array_defines: Vec<(String, String)>,
}

impl ShaderMaterial {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            source: ShaderSource::new(body),
            ..Default::default()
        }
    }

    pub fn uniform(mut self, name: &str, value: impl Into<UniformValue>) -> Result<Self> {
        self.uniforms.declare(name, value)?;
        Ok(self)
    }

    /// Declare a point array uniform and the define carrying its length
    pub fn point_array(mut self, uniform: &str, define: &str, points: Vec<Vec3>) -> Result<Self> {
        self.source = self.source.define(define, points.len() as u32);
        self.uniforms.declare(uniform, points)?;
        self.array_defines.push((uniform.to_string(), define.to_string()));
        Ok(self)
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        self.uniforms.set(name, value)
    }

    /// Check every array uniform against the define baked into the source
    pub fn validate(&self) -> Result<()> {
        for (uniform, define) in &self.array_defines {
            let baked = match self.source.define_value(define) {
                Some(value) => value as usize,
                None => bail!("Define '{}' for uniform '{}' is missing", define, uniform),
            };
            match self.uniforms.get(uniform) {
                Some(UniformValue::Vec3Array(points)) if points.len() == baked => {}
                Some(UniformValue::Vec3Array(points)) => bail!(
                    "Uniform '{}' has {} elements but {} = {}",
                    uniform,
                    points.len(),
                    define,
                    baked
                ),
                _ => bail!("Uniform '{}' is not a point array", uniform),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Basic(BasicMaterial),
    Shader(ShaderMaterial),
}

impl Material {
    pub fn side(&self) -> Side {
        match self {
            Material::Standard(m) => m.side,
            Material::Basic(m) => m.side,
            Material::Shader(m) => m.side,
        }
    }

    pub fn wireframe(&self) -> bool {
        matches!(self, Material::Basic(BasicMaterial { wireframe: true, .. }))
    }

    pub fn as_shader_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match self {
            Material::Shader(m) => Some(m),
            _ => None,
        }
    }
}

impl From<StandardMaterial> for Material {
    fn from(material: StandardMaterial) -> Self {
        Material::Standard(material)
    }
}

impl From<BasicMaterial> for Material {
    fn from(material: BasicMaterial) -> Self {
        Material::Basic(material)
    }
}

impl From<ShaderMaterial> for Material {
    fn from(material: ShaderMaterial) -> Self {
        Material::Shader(material)
    }
}
