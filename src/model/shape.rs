use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Normalised [r, g, b, a] for vertex data
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_f32_array();
        wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 }
    }
}

/// A drawable rectangle in window pixels (y grows downwards).
///
/// `position` is where `origin` (measured from the top-left corner of the
/// unrotated rectangle) lands on screen; rotation is applied around it.
/// The outline is drawn outside the rectangle, `outline_thickness` pixels wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectShape {
    pub position: Vec2,
    pub size: Vec2,
    pub origin: Vec2,
    pub rotation: f32,
    pub fill: Color,
    pub outline: Color,
    pub outline_thickness: f32,
}

impl RectShape {
    pub fn new(size: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
            origin: Vec2::ZERO,
            rotation: 0.0,
            fill: Color::WHITE,
            outline: Color::TRANSPARENT,
            outline_thickness: 0.0,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Put the origin at the centre of the rectangle
    pub fn centered(mut self) -> Self {
        self.origin = self.size * 0.5;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_outline(mut self, outline: Color, thickness: f32) -> Self {
        self.outline = outline;
        self.outline_thickness = thickness;
        self
    }

    /// Map a point in local rectangle space (top-left = 0,0) to window space
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        let rel = local - self.origin;
        let (sin, cos) = self.rotation.sin_cos();
        self.position + Vec2::new(rel.x * cos - rel.y * sin, rel.x * sin + rel.y * cos)
    }

    /// Window-space corners in order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.local_to_world(Vec2::ZERO),
            self.local_to_world(Vec2::new(self.size.x, 0.0)),
            self.local_to_world(self.size),
            self.local_to_world(Vec2::new(0.0, self.size.y)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_corners() {
        let rect = RectShape::new(Vec2::new(20.0, 10.0))
            .centered()
            .with_position(Vec2::new(100.0, 50.0));
        let corners = rect.corners();
        assert_eq!(corners[0], Vec2::new(90.0, 45.0));
        assert_eq!(corners[2], Vec2::new(110.0, 55.0));
    }

    #[test]
    fn test_rotation_about_origin() {
        let mut rect = RectShape::new(Vec2::new(2.0, 2.0)).centered();
        rect.rotation = std::f32::consts::FRAC_PI_2;
        // Top-left (-1,-1) rotated by 90 degrees lands on (1,-1)
        let tl = rect.corners()[0];
        assert!((tl.x - 1.0).abs() < 1e-5);
        assert!((tl.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_color_normalisation() {
        assert_eq!(Color::YELLOW.to_f32_array(), [1.0, 1.0, 0.0, 1.0]);
        assert!(Color::TRANSPARENT.is_transparent());
        assert!(!Color::RED.is_transparent());
    }
}
