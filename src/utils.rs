//! Conversions between the glam types used across the crate and the
//! nalgebra types rapier expects.

use glam::Vec2;
use rapier2d::na::{Isometry2, Point2, Vector2};

pub fn to_na_vector(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

pub fn to_na_point(v: Vec2) -> Point2<f32> {
    Point2::new(v.x, v.y)
}

pub fn from_na_vector(v: &Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

pub fn from_na_point(p: &Point2<f32>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Split an isometry into (translation, angle in radians)
pub fn isometry_to_pos_rot(iso: &Isometry2<f32>) -> (Vec2, f32) {
    (
        Vec2::new(iso.translation.x, iso.translation.y),
        iso.rotation.angle(),
    )
}
