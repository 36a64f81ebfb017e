//! Flattened vector paths and paint

use glam::{Affine2, Vec2};
use std::f32::consts::TAU;

/// Line segments per cubic curve
const CURVE_SEGMENTS: u32 = 16;
/// Segments per full ellipse
const ELLIPSE_SEGMENTS: u32 = 40;

/// A closed polygon. Curves are flattened when the path is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    points: Vec<Vec2>,
}

impl Path {
    pub fn from_points(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Copy of this path with every point mapped through `transform`
    pub fn transformed(&self, transform: &Affine2) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| transform.transform_point2(*p))
                .collect(),
        }
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    pub fn rect(origin: Vec2, size: Vec2) -> Self {
        Self::from_points(vec![
            origin,
            origin + Vec2::new(size.x, 0.0),
            origin + size,
            origin + Vec2::new(0.0, size.y),
        ])
    }

    /// Ellipse around `center`, with its x radius turned by `rotation` radians
    pub fn ellipse(center: Vec2, radii: Vec2, rotation: f32) -> Self {
        let rot = Vec2::from_angle(rotation);
        let points = (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / ELLIPSE_SEGMENTS as f32 * TAU;
                center + rot.rotate(Vec2::new(radii.x * t.cos(), radii.y * t.sin()))
            })
            .collect();
        Self::from_points(points)
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::ellipse(center, Vec2::splat(radius), 0.0)
    }
}

/// Builds a [`Path`] from canvas-style commands
#[derive(Debug, Default)]
pub struct PathBuilder {
    points: Vec<Vec2>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Vec2) -> Self {
        self.points.clear();
        self.points.push(p);
        self
    }

    pub fn line_to(mut self, p: Vec2) -> Self {
        self.points.push(p);
        self
    }

    /// Cubic bezier from the current point, flattened
    pub fn bezier_to(mut self, c1: Vec2, c2: Vec2, end: Vec2) -> Self {
        let start = self.points.last().copied().unwrap_or(Vec2::ZERO);
        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let u = 1.0 - t;
            let p = start * (u * u * u)
                + c1 * (3.0 * u * u * t)
                + c2 * (3.0 * u * t * t)
                + end * (t * t * t);
            self.points.push(p);
        }
        self
    }

    /// Finish; the polygon closes back to its first point implicitly
    pub fn build(self) -> Path {
        Path::from_points(self.points)
    }
}

/// Fill color and opacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: [f32; 4],
    pub alpha: f32,
}

impl Paint {
    pub const fn new(color: [f32; 4], alpha: f32) -> Self {
        Self { color, alpha }
    }

    pub const fn solid(color: [f32; 4]) -> Self {
        Self::new(color, 1.0)
    }

    /// CSS color string for canvas fill styles
    pub fn css(&self) -> String {
        let [r, g, b, a] = self.color;
        format!(
            "rgba({}, {}, {}, {})",
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            a
        )
    }
}

/// Colors for game elements
pub mod colors {
    /// #FBFBF4
    pub const BACKGROUND: [f32; 4] = [0.984, 0.984, 0.957, 1.0];
    /// #FFA500
    pub const CUP: [f32; 4] = [1.0, 0.647, 0.0, 1.0];
    /// Lighter orange under the pointer
    pub const CUP_HOVER: [f32; 4] = [1.0, 0.749, 0.302, 1.0];
    /// Darker orange once picked
    pub const CUP_PICKED: [f32; 4] = [0.902, 0.494, 0.0, 1.0];
    /// #999
    pub const CUP_SHADOW: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
    /// #dc2626
    pub const BALL: [f32; 4] = [0.863, 0.149, 0.149, 1.0];
    pub const BALL_SHADOW: [f32; 4] = [0.502, 0.502, 0.502, 1.0];
}
