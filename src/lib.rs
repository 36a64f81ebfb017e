//! Cookie Cups - a cookie consent banner that makes you play for your "No"
//!
//! Core modules:
//! - `sim`: Deterministic shell-game engine (tweens, shuffle, round state machine)
//! - `renderer`: Drawing surface abstraction and cup/ball geometry
//! - `config`: Round tiers, timings and cheat modes
//! - `platform`: Browser helpers (query string, location)

pub mod config;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::{CheatModes, ConfigError, GameConfig, RoundTier};
pub use sim::Engine;

/// Cup and ball geometry (CSS pixels)
pub mod consts {
    pub const CUP_HEIGHT: f32 = 120.0;
    pub const CUP_TOP_WIDTH: f32 = 80.0;
    pub const CUP_BOTTOM_WIDTH: f32 = 100.0;
    pub const CUP_SHADOW_HEIGHT: f32 = CUP_HEIGHT / 3.0;
    /// Control point offset for the rim and base curves
    pub const CUP_CURVE: f32 = 10.0;
    /// Shadow is sheared this far to the right at its top edge
    pub const SHADOW_X_OFFSET: f32 = 50.0;

    pub const BALL_RADIUS: f32 = 20.0;
    /// Ball center sits this far above the cup base
    pub const BALL_LIFT: f32 = 20.0;

    /// Rotation range in degrees. 0 = flush, 60 = fully lifted.
    pub const ROTATE_MIN: f32 = 0.0;
    pub const ROTATE_MAX: f32 = 60.0;

    pub const SHADOW_ALPHA_MIN: f32 = 0.3;
    pub const SHADOW_ALPHA_MAX: f32 = 0.4;
    pub const SHADOW_SCALE_MIN: f32 = 0.6;
    pub const SHADOW_TILT_DEG: f32 = 10.0;
    pub const BACKGROUND_ALPHA: f32 = 0.6;

    /// Alpha of cups when the `transparent` cheat is on
    pub const TRANSPARENT_CUP_ALPHA: f32 = 0.3;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Round to two decimal places (keeps rotation tweens from jittering)
#[inline]
pub fn round_hundredths(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Clamp a cup rotation into the drawable range
#[inline]
pub fn clamp_rotation(deg: f32) -> f32 {
    deg.clamp(consts::ROTATE_MIN, consts::ROTATE_MAX)
}

/// Fraction of the way from flush to fully lifted, in [0, 1]
#[inline]
pub fn rotation_fraction(deg: f32) -> f32 {
    (clamp_rotation(deg) - consts::ROTATE_MIN) / (consts::ROTATE_MAX - consts::ROTATE_MIN)
}
