use glam::{EulerRot, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// An sRGB colour stored as 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xFFFFFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Normalized channels in `[0, 1]`, still sRGB-encoded.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Linear-light channels, for writing into an sRGB render target.
    pub fn to_linear(self) -> [f32; 3] {
        self.to_f32().map(srgb_to_linear)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.to_hex())
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Per-axis rotation of a shape in radians.
///
/// Angles accumulate without wraparound; rotation is periodic so the
/// unbounded value is harmless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation { x: 0.0, y: 0.0 };

    pub fn advance(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Model matrix with Euler XYZ ordering.
    pub fn to_matrix(self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }

    pub fn apply(self, v: Vec3) -> Vec3 {
        self.to_matrix().transform_vector3(v)
    }
}

/// Size of a rendering surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    /// Used in place of a zero dimension reported by the host.
    pub const FALLBACK: ViewportSize = ViewportSize {
        width: 800,
        height: 600,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Replace each zero dimension with its fallback value.
    pub fn sanitized(self) -> Self {
        Self {
            width: if self.width == 0 {
                Self::FALLBACK.width
            } else {
                self.width
            },
            height: if self.height == 0 {
                Self::FALLBACK.height
            } else {
                self.height
            },
        }
    }

    /// Aspect ratio of the sanitized size; always finite and positive.
    pub fn aspect(self) -> f32 {
        let s = self.sanitized();
        s.width as f32 / s.height as f32
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::FALLBACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Rgb::from_hex(0xFF6B6B);
        assert_eq!(c, Rgb::new(0xFF, 0x6B, 0x6B));
        assert_eq!(c.to_hex(), 0xFF6B6B);
        assert_eq!(c.to_string(), "#FF6B6B");
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        assert_eq!(Rgb::new(0, 0, 0).to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb::WHITE.to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn rotation_accumulates() {
        let mut r = Rotation::ZERO;
        r.advance(0.01, 0.015);
        r.advance(0.01, 0.015);
        assert!((r.x - 0.02).abs() < 1e-6);
        assert!((r.y - 0.03).abs() < 1e-6);
    }

    #[test]
    fn zero_rotation_is_identity() {
        assert_eq!(Rotation::ZERO.to_matrix(), Mat4::IDENTITY);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!((Rotation::ZERO.apply(v) - v).length() < 1e-6);
    }

    #[test]
    fn zero_dimensions_fall_back() {
        assert_eq!(ViewportSize::new(0, 0).sanitized(), ViewportSize::FALLBACK);
        assert_eq!(
            ViewportSize::new(1024, 0).sanitized(),
            ViewportSize::new(1024, 600)
        );
        assert_eq!(
            ViewportSize::new(0, 300).sanitized(),
            ViewportSize::new(800, 300)
        );
    }

    #[test]
    fn aspect_is_finite_and_positive() {
        for size in [
            ViewportSize::new(0, 0),
            ViewportSize::new(0, 720),
            ViewportSize::new(1280, 0),
            ViewportSize::new(1, 1),
        ] {
            let a = size.aspect();
            assert!(a.is_finite());
            assert!(a > 0.0);
        }
    }
}
