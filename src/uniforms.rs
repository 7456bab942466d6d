//! Named shader uniforms packed with WGSL uniform address-space layout.
//!
//! A [`UniformBag`] is declared once when a material is built and its layout
//! is frozen from then on: values can be replaced every frame, but a value may
//! not change kind and an array may not change length. The WGSL struct that
//! receives the bytes must declare the members in insertion order.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3, Vec4};

use crate::math::Color;

/// wgpu's default `max_uniform_buffer_binding_size`
pub const MAX_UNIFORM_BUFFER_SIZE: usize = 64 * 1024;

/// Largest array the default uniform binding can hold at 16 bytes per element
pub const MAX_UNIFORM_ARRAY_LEN: usize = MAX_UNIFORM_BUFFER_SIZE / 16;

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Color(Color),
    Mat4(Mat4),
    /// Packed as `array<vec4<f32>, N>` with w = 0
    Vec3Array(Vec<Vec3>),
}

impl UniformValue {
    /// (alignment, size) in bytes
    pub fn layout(&self) -> (usize, usize) {
        match self {
            UniformValue::Float(_) => (4, 4),
            UniformValue::Vec3(_) | UniformValue::Color(_) => (16, 12),
            UniformValue::Vec4(_) => (16, 16),
            UniformValue::Mat4(_) => (16, 64),
            UniformValue::Vec3Array(points) => (16, 16 * points.len()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "f32",
            UniformValue::Vec3(_) => "vec3<f32>",
            UniformValue::Vec4(_) => "vec4<f32>",
            UniformValue::Color(_) => "vec3<f32> (color)",
            UniformValue::Mat4(_) => "mat4x4<f32>",
            UniformValue::Vec3Array(_) => "array<vec4<f32>>",
        }
    }

    fn same_kind(&self, other: &UniformValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn write(&self, out: &mut [u8]) {
        let floats: Vec<f32> = match self {
            UniformValue::Float(v) => vec![*v],
            UniformValue::Vec3(v) => v.to_array().to_vec(),
            UniformValue::Vec4(v) => v.to_array().to_vec(),
            UniformValue::Color(c) => c.to_array().to_vec(),
            UniformValue::Mat4(m) => m.to_cols_array().to_vec(),
            UniformValue::Vec3Array(points) => points
                .iter()
                .flat_map(|p| [p.x, p.y, p.z, 0.0])
                .collect(),
        };
        out[..floats.len() * 4].copy_from_slice(bytemuck::cast_slice(&floats));
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Color> for UniformValue {
    fn from(value: Color) -> Self {
        UniformValue::Color(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

impl From<Vec<Vec3>> for UniformValue {
    fn from(value: Vec<Vec3>) -> Self {
        UniformValue::Vec3Array(value)
    }
}

/// Byte placement of one uniform inside the packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBag {
    entries: Vec<(String, UniformValue)>,
}

impl UniformBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a uniform; declaring the same name twice is an error
    pub fn declare(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        if self.get(name).is_some() {
            bail!("Uniform '{}' is already declared", name);
        }
        let value = value.into();
        check_array_len(name, &value)?;
        self.entries.push((name.to_string(), value));

        let (_, size) = self.layout();
        if size > MAX_UNIFORM_BUFFER_SIZE {
            self.entries.pop();
            bail!(
                "Uniform '{}' grows the buffer to {} bytes, the limit is {}",
                name,
                size,
                MAX_UNIFORM_BUFFER_SIZE
            );
        }
        Ok(())
    }

    /// Builder form of [`UniformBag::declare`]
    pub fn with(mut self, name: &str, value: impl Into<UniformValue>) -> Result<Self> {
        self.declare(name, value)?;
        Ok(self)
    }

    /// Replace the value of a declared uniform, keeping its layout
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let value = value.into();
        let slot = self
            .entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .with_context(|| format!("Uniform '{}' is not declared", name))?;

        if !slot.same_kind(&value) {
            bail!(
                "Uniform '{}' is {} and cannot be set to {}",
                name,
                slot.kind(),
                value.kind()
            );
        }

        if let (UniformValue::Vec3Array(old), UniformValue::Vec3Array(new)) = (&*slot, &value) {
            if old.len() != new.len() {
                bail!(
                    "Uniform array '{}' has {} elements baked into the shader, got {}",
                    name,
                    old.len(),
                    new.len()
                );
            }
        }

        *slot = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Offsets of every uniform plus the total (16-byte rounded) buffer size
    pub fn layout(&self) -> (Vec<UniformSlot>, usize) {
        let mut offset = 0;
        let mut slots = Vec::with_capacity(self.entries.len());

        for (_, value) in &self.entries {
            let (align, size) = value.layout();
            offset = align_to(offset, align);
            slots.push(UniformSlot { offset, size });
            offset += size;
        }

        // Uniform buffers cannot be bound empty
        (slots, align_to(offset, 16).max(16))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let (slots, size) = self.layout();
        let mut bytes = vec![0u8; size];

        for ((_, value), slot) in self.entries.iter().zip(slots) {
            value.write(&mut bytes[slot.offset..slot.offset + slot.size]);
        }

        bytes
    }
}

fn check_array_len(name: &str, value: &UniformValue) -> Result<()> {
    if let UniformValue::Vec3Array(points) = value {
        if points.is_empty() {
            bail!("Uniform array '{}' must not be empty", name);
        }
        if points.len() > MAX_UNIFORM_ARRAY_LEN {
            bail!(
                "Uniform array '{}' has {} elements, the limit is {}",
                name,
                points.len(),
                MAX_UNIFORM_ARRAY_LEN
            );
        }
    }
    Ok(())
}

fn align_to(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

/// WGSL source plus integer defines injected as `const` declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderSource {
    pub body: String,
    pub defines: Vec<(String, u32)>,
}

impl ShaderSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            defines: Vec::new(),
        }
    }

    pub fn define(mut self, name: &str, value: u32) -> Self {
        match self.defines.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value,
            None => self.defines.push((name.to_string(), value)),
        }
        self
    }

    pub fn define_value(&self, name: &str) -> Option<u32> {
        self.defines.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Full module text: defines, then `prelude`, then the body
    pub fn compose(&self, prelude: &str) -> String {
        let mut text = String::new();
        for (name, value) in &self.defines {
            text.push_str(&format!("const {}: u32 = {}u;\n", name, value));
        }
        text.push_str(prelude);
        text.push('\n');
        text.push_str(&self.body);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(0, 16), 0);
        assert_eq!(align_to(4, 16), 16);
        assert_eq!(align_to(16, 16), 16);
        assert_eq!(align_to(13, 4), 16);
    }

    #[test]
    fn test_empty_bag_still_binds() {
        let (slots, size) = UniformBag::new().layout();
        assert!(slots.is_empty());
        assert_eq!(size, 16);
    }

    #[test]
    fn test_buffer_size_limit() {
        let points = |n: usize| vec![Vec3::X; n];
        let header = || UniformBag::new().with("color", Color::WHITE).unwrap().with("time", 0.0_f32).unwrap();

        // 16 header bytes + 4095 * 16 fills the binding exactly
        let full = header().with("points", points(MAX_UNIFORM_ARRAY_LEN - 1)).unwrap();
        assert_eq!(full.layout().1, MAX_UNIFORM_BUFFER_SIZE);

        let mut over = header();
        assert!(over.declare("points", points(MAX_UNIFORM_ARRAY_LEN)).is_err());
        assert_eq!(over.len(), 2);
        assert!(over.get("points").is_none());
    }

    #[test]
    fn test_define_overwrites() {
        let source = ShaderSource::new("").define("N", 1).define("N", 2);
        assert_eq!(source.defines.len(), 1);
        assert_eq!(source.define_value("N"), Some(2));
    }
}
