//! Luma weights used by the saturation step.
//!
//! The saturation adjustment desaturates toward the ITU-R BT.601 luma of the
//! pixel, computed on 0-255 channel values.

/// ITU-R BT.601 coefficient for the red channel.
pub const LUMA_R: f32 = 0.299;

/// ITU-R BT.601 coefficient for the green channel.
pub const LUMA_G: f32 = 0.587;

/// ITU-R BT.601 coefficient for the blue channel.
pub const LUMA_B: f32 = 0.114;

/// Luminosity-weighted gray of an RGB triple on the 0-255 scale.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}
