use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decodes a `0xRRGGBB` sRGB literal into linear space.
    pub fn hex(value: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((value >> shift) & 0xff) as f32 / 255.0);
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Lighting model requested by a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shading {
    /// Flat color, ignores lights.
    Unlit,
    Standard,
    /// Standard plus clearcoat, sheen and transmission terms.
    Physical,
}

/// Immutable surface description shared by every mesh that uses it.
///
/// Records are built once by the shape constructors and handed out behind an
/// `Arc`; nothing mutates them after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub sheen: f32,
    pub sheen_color: Color,
    pub sheen_roughness: f32,
    pub transmission: f32,
    pub thickness: f32,
    pub ior: f32,
    pub specular_intensity: f32,
    pub env_map_intensity: f32,
}

impl Material {
    pub fn standard(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            shading: Shading::Standard,
            color,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            sheen: 0.0,
            sheen_color: Color::BLACK,
            sheen_roughness: 1.0,
            transmission: 0.0,
            thickness: 0.0,
            ior: 1.5,
            specular_intensity: 1.0,
            env_map_intensity: 1.0,
        }
    }

    pub fn physical(name: impl Into<String>, color: Color) -> Self {
        Self {
            shading: Shading::Physical,
            ..Self::standard(name, color)
        }
    }

    pub fn unlit(name: impl Into<String>, color: Color) -> Self {
        Self {
            shading: Shading::Unlit,
            ..Self::standard(name, color)
        }
    }

    /// Switches on alpha blending with the given opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.opacity = opacity;
        self
    }

    /// Whether the renderer must draw this material in the blended pass.
    pub fn is_blended(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }

    pub fn is_lit(&self) -> bool {
        self.shading != Shading::Unlit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_white_and_black_map_to_extremes() {
        let white = Color::hex(0xffffff);
        assert!((white.r - 1.0).abs() < 1e-5);
        assert!((white.b - 1.0).abs() < 1e-5);
        assert_eq!(Color::hex(0x000000), Color::BLACK);
    }

    #[test]
    fn hex_decodes_into_linear_space() {
        let mid = Color::hex(0x808080);
        assert!((mid.r - 0.2158).abs() < 1e-3);
        assert_eq!(mid.r, mid.g);
        assert_eq!(mid.g, mid.b);
    }

    #[test]
    fn opacity_implies_blending() {
        let blush = Material::standard("blush", Color::hex(0xff8a9a)).with_opacity(0.18);
        assert!(blush.transparent);
        assert!(blush.is_blended());
        assert!(!Material::standard("skin", Color::WHITE).is_blended());
    }

    #[test]
    fn transmission_alone_stays_opaque() {
        let body = Material {
            transmission: 0.07,
            ..Material::physical("tomato", Color::hex(0xdd1f2c))
        };
        assert!(!body.is_blended());
        assert!(body.is_lit());
        assert!(!Material::unlit("shadow", Color::BLACK).is_lit());
    }
}
