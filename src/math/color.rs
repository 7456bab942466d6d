use anyhow::{bail, Result};
use glam::Vec3;

/// RGB color with components in [0, 1]
///
/// Values are written to the framebuffer as-is (no gamma conversion), so a
/// color parsed from `"#ff0000"` ends up as exactly that on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xc0c0c0),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("purple", 0x800080),
    ("teal", 0x008080),
    ("navy", 0x000080),
    ("orange", 0xffa500),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Color from a packed 0xRRGGBB value
    pub fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    /// Parse a CSS-style color: `#rgb`, `#rrggbb` or a basic color name
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        if let Some(digits) = text.strip_prefix('#') {
            // from_str_radix alone would take a leading sign
            if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                bail!("Invalid hex color: {}", text);
            }
            let expanded: String = match digits.len() {
                3 => digits.chars().flat_map(|c| [c, c]).collect(),
                6 => digits.to_string(),
                _ => bail!("Invalid hex color: {}", text),
            };
            return match u32::from_str_radix(&expanded, 16) {
                Ok(hex) => Ok(Self::from_hex(hex)),
                Err(_) => bail!("Invalid hex color: {}", text),
            };
        }

        let lower = text.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, hex)| Self::from_hex(hex))
            .ok_or_else(|| anyhow::anyhow!("Unknown color name: {}", text))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn to_wgpu(self, alpha: f32) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: alpha as f64,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(Color::parse("red").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::parse("black").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("White").unwrap(), Color::WHITE);
    }

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#000").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("#f00").unwrap(), Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_long_hex() {
        let c = Color::parse("#336699").unwrap();
        assert!((c.r - 0.2).abs() < 0.01);
        assert!((c.g - 0.4).abs() < 0.01);
        assert!((c.b - 0.6).abs() < 0.01);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("not-a-color").is_err());
    }

    #[test]
    fn test_parse_rejects_signed_hex() {
        assert!(Color::parse("#+fffff").is_err());
        assert!(Color::parse("#+ff").is_err());
        assert!(Color::parse("#-12345").is_err());
        assert!(Color::parse("# ffffff").is_err());
    }

    #[test]
    fn test_to_wgpu_carries_alpha() {
        let c = Color::WHITE.to_wgpu(0.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.a, 0.5);
    }
}
