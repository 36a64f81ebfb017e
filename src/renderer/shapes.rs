//! Cup, ball and shadow geometry
//!
//! All shapes are built in local space around the cup's bottom-left corner and
//! mapped to canvas space, so the returned cup outline is directly usable for
//! hit-testing.

use glam::{Affine2, Mat2, Vec2};

use super::Surface;
use super::path::{Paint, Path, PathBuilder, colors};
use crate::consts::*;
use crate::{clamp_rotation, rotation_fraction};

const WIDTH_DIFFERENCE: f32 = CUP_BOTTOM_WIDTH - CUP_TOP_WIDTH;

/// How a cup should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CupFlags {
    pub has_ball: bool,
    pub hovered: bool,
    pub picked: bool,
    /// `transparent` cheat
    pub see_through: bool,
}

/// Cup silhouette in local space, base from (0, 0) to (CUP_BOTTOM_WIDTH, 0)
fn local_cup(height: f32, x_offset: f32, rim_lean: f32) -> Path {
    let right_bottom = Vec2::new(CUP_BOTTOM_WIDTH, 0.0);
    let right_top = Vec2::new(CUP_TOP_WIDTH + WIDTH_DIFFERENCE / 2.0 + x_offset, -height);
    let left_top = Vec2::new(WIDTH_DIFFERENCE / 2.0 + x_offset, -height);
    let curve = Vec2::new(0.0, CUP_CURVE);

    PathBuilder::new()
        .move_to(Vec2::ZERO)
        .bezier_to(curve, right_bottom + curve, right_bottom)
        .line_to(right_top)
        .bezier_to(
            right_top - curve + Vec2::new(rim_lean, 0.0),
            left_top - curve + Vec2::new(rim_lean, 0.0),
            left_top,
        )
        .build()
}

/// Pivot on the bottom-left corner and tilt counter-clockwise by `rotate` degrees
fn cup_transform(base: Vec2, rotate: f32) -> Affine2 {
    Affine2::from_translation(base) * Affine2::from_angle(-clamp_rotation(rotate).to_radians())
}

/// Cup outline in canvas space
pub fn cup_path(base: Vec2, rotate: f32) -> Path {
    local_cup(CUP_HEIGHT, 0.0, 0.0).transformed(&cup_transform(base, rotate))
}

/// Shadow opacity: fades as the cup lifts
pub fn shadow_alpha(rotate: f32) -> f32 {
    SHADOW_ALPHA_MAX - SHADOW_ALPHA_MIN * rotation_fraction(rotate)
}

/// Shadow transform: tilts, shrinks and skews with the lift
pub fn shadow_transform(base: Vec2, rotate: f32) -> Affine2 {
    let t = rotation_fraction(rotate);
    let tilt = -(SHADOW_TILT_DEG * t).to_radians();
    let scale = 1.0 - (1.0 - SHADOW_SCALE_MIN) * t;
    let skew = (clamp_rotation(rotate) * t).to_radians().tan();

    Affine2::from_translation(base)
        * Affine2::from_angle(tilt)
        * Affine2::from_scale(Vec2::splat(scale))
        * Affine2::from_mat2(Mat2::from_cols(Vec2::new(1.0, 0.0), Vec2::new(skew, 1.0)))
}

/// Cup shadow in canvas space
pub fn cup_shadow_path(base: Vec2, rotate: f32) -> Path {
    local_cup(CUP_SHADOW_HEIGHT, SHADOW_X_OFFSET, CUP_CURVE).transformed(&shadow_transform(base, rotate))
}

/// Ball resting under the cup
pub fn ball_path(base: Vec2) -> Path {
    Path::circle(base + Vec2::new(CUP_BOTTOM_WIDTH / 2.0, -BALL_LIFT), BALL_RADIUS)
}

pub fn ball_shadow_path(base: Vec2) -> Path {
    let ball_width = BALL_RADIUS;
    Path::ellipse(
        base + Vec2::new(CUP_BOTTOM_WIDTH / 2.0, 0.0),
        Vec2::new(ball_width / 4.0, ball_width / 7.0 * 6.0),
        std::f32::consts::FRAC_PI_2,
    )
}

/// Fill for the cup body
pub fn cup_paint(flags: CupFlags) -> Paint {
    let color = if flags.picked {
        colors::CUP_PICKED
    } else if flags.hovered {
        colors::CUP_HOVER
    } else {
        colors::CUP
    };
    let alpha = if flags.see_through {
        TRANSPARENT_CUP_ALPHA
    } else {
        1.0
    };
    Paint::new(color, alpha)
}

/// Draw one cup with its shadow (and the ball, if it hides there).
/// Returns the cup outline for hit-testing.
pub fn draw_cup_set(surface: &mut dyn Surface, base: Vec2, rotate: f32, flags: CupFlags) -> Path {
    if flags.has_ball {
        surface.fill(&ball_shadow_path(base), Paint::new(colors::BALL_SHADOW, SHADOW_ALPHA_MAX));
    }

    surface.fill(
        &cup_shadow_path(base, rotate),
        Paint::new(colors::CUP_SHADOW, shadow_alpha(rotate)),
    );

    if flags.has_ball {
        surface.fill(&ball_path(base), Paint::solid(colors::BALL));
    }

    let cup = cup_path(base, rotate);
    surface.fill(&cup, cup_paint(flags));
    cup
}
