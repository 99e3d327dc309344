//! Photometric pass
//!
//! Applies brightness, contrast and saturation to RGBA pixel data.
//!
//! ## Adjustment Order
//! 1. Brightness (scale, unclamped)
//! 2. Contrast (clamped to 0..=255)
//! 3. Saturation (toward BT.601 luma of the contrast-adjusted pixel)
//! 4. Final clamp
//!
//! The order is fixed. Because contrast clamps before saturation reads the
//! gray value, swapping steps 2 and 3 produces different output whenever the
//! contrast step saturates a channel.
//!
//! Alpha is never touched.

use crate::config::CONTRAST_NEUTRAL;
use crate::luminance::luma;
use crate::EditParameters;

/// Midpoint the contrast formula pivots around.
const CONTRAST_PIVOT: f32 = 128.0;

/// Apply the photometric pass to RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `params` - Edit parameters; rotation is ignored here
pub fn apply_photometric(pixels: &mut [u8], params: &EditParameters) {
    if is_photometric_identity(params) {
        return;
    }

    let brightness = params.brightness / 100.0;
    let contrast = contrast_factor(params.contrast);
    let saturation = params.saturation / 100.0;

    for chunk in pixels.chunks_exact_mut(4) {
        let rgb = adjust_rgb(
            [chunk[0] as f32, chunk[1] as f32, chunk[2] as f32],
            brightness,
            contrast,
            saturation,
        );
        chunk[0] = rgb[0];
        chunk[1] = rgb[1];
        chunk[2] = rgb[2];
    }
}

/// True when the three sliders are at their neutral positions.
pub fn is_photometric_identity(params: &EditParameters) -> bool {
    params.brightness == 100.0
        && params.contrast == CONTRAST_NEUTRAL
        && params.saturation == 100.0
}

/// Contrast multiplier for a slider position.
///
/// The slider value is shifted by [`CONTRAST_NEUTRAL`] and fed into the
/// classic `259 * (c + 255) / (255 * (259 - c))` curve, so the default slider
/// position yields a factor of exactly 1.
#[inline]
pub fn contrast_factor(slider: f32) -> f32 {
    let c = slider - CONTRAST_NEUTRAL;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

/// Run one RGB triple through all steps.
///
/// `brightness` and `saturation` are multipliers (1.0 = unchanged) and
/// `contrast` is the factor from [`contrast_factor`].
#[inline]
pub fn adjust_rgb(rgb: [f32; 3], brightness: f32, contrast: f32, saturation: f32) -> [u8; 3] {
    let [r, g, b] = apply_brightness(rgb, brightness);
    let [r, g, b] = apply_contrast([r, g, b], contrast);
    let [r, g, b] = apply_saturation([r, g, b], saturation);
    [to_channel(r), to_channel(g), to_channel(b)]
}

/// Scale each channel. No clamping.
#[inline]
fn apply_brightness(rgb: [f32; 3], multiplier: f32) -> [f32; 3] {
    rgb.map(|c| c * multiplier)
}

/// Stretch around the pivot and clamp to the displayable range.
#[inline]
fn apply_contrast(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    rgb.map(|c| (factor * (c - CONTRAST_PIVOT) + CONTRAST_PIVOT).clamp(0.0, 255.0))
}

/// Interpolate each channel toward (or away from) its luma.
#[inline]
fn apply_saturation(rgb: [f32; 3], multiplier: f32) -> [f32; 3] {
    let gray = luma(rgb[0], rgb[1], rgb[2]);
    rgb.map(|c| gray + multiplier * (c - gray))
}

#[inline]
fn to_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create an opaque RGBA pixel
    fn pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b, 255]
    }

    fn params(brightness: f32, contrast: f32, saturation: f32) -> EditParameters {
        EditParameters {
            rotation_degrees: 0,
            brightness,
            contrast,
            saturation,
        }
    }

    /// Helper to apply adjustments and return resulting pixel
    fn apply(pixels: &[u8], params: &EditParameters) -> Vec<u8> {
        let mut result = pixels.to_vec();
        apply_photometric(&mut result, params);
        result
    }

    // ===== Identity Tests =====

    #[test]
    fn test_identity_defaults() {
        let pixels = pixel(128, 64, 192);
        let result = apply(&pixels, &EditParameters::default());
        assert_eq!(result, pixels, "Default parameters should not change pixels");
    }

    #[test]
    fn test_contrast_factor_neutral_at_default() {
        assert_eq!(contrast_factor(CONTRAST_NEUTRAL), 1.0);
    }

    #[test]
    fn test_contrast_factor_monotonic() {
        assert!(contrast_factor(50.0) < 1.0);
        assert!(contrast_factor(150.0) > 1.0);
        assert!(contrast_factor(150.0) > contrast_factor(120.0));
    }

    #[test]
    fn test_rotation_does_not_affect_photometric_identity() {
        let mut p = EditParameters::default();
        p.rotation_degrees = 90;
        assert!(is_photometric_identity(&p));
    }

    // ===== Brightness Tests =====

    #[test]
    fn test_brightness_step_unclamped() {
        let out = apply_brightness([200.0, 100.0, 50.0], 1.2);
        assert!((out[0] - 240.0).abs() < 1e-3);
        assert!((out[1] - 120.0).abs() < 1e-3);
        assert!((out[2] - 60.0).abs() < 1e-3);

        let out = apply_brightness([250.0, 0.0, 0.0], 1.5);
        assert!(out[0] > 255.0, "brightness itself does not clamp");
    }

    #[test]
    fn test_brightness_120_scenario() {
        let result = apply(&pixel(200, 100, 50), &params(120.0, 100.0, 100.0));
        assert_eq!(result, pixel(240, 120, 60));
    }

    #[test]
    fn test_brightness_clips_at_white() {
        let result = apply(&pixel(220, 220, 220), &params(150.0, 100.0, 100.0));
        assert_eq!(result, pixel(255, 255, 255));
    }

    #[test]
    fn test_brightness_darkens() {
        let result = apply(&pixel(200, 100, 50), &params(50.0, 100.0, 100.0));
        assert_eq!(result, pixel(100, 50, 25));
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_increase_spreads_from_pivot() {
        let result = apply(&pixel(64, 128, 192), &params(100.0, 150.0, 100.0));
        assert!(result[0] < 64, "Dark channel should get darker");
        assert_eq!(result[1], 128, "Pivot should not move");
        assert!(result[2] > 192, "Bright channel should get brighter");
    }

    #[test]
    fn test_contrast_decrease_moves_toward_pivot() {
        let result = apply(&pixel(0, 128, 255), &params(100.0, 50.0, 100.0));
        assert!(result[0] > 0);
        assert_eq!(result[1], 128);
        assert!(result[2] < 255);
    }

    #[test]
    fn test_contrast_clamps_before_saturation() {
        let out = apply_contrast([300.0, -40.0, 128.0], contrast_factor(150.0));
        assert_eq!(out[0], 255.0);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 128.0);
    }

    // ===== Saturation Tests =====

    #[test]
    fn test_saturation_zero_gives_gray() {
        let result = apply(&pixel(10, 10, 10), &params(100.0, 100.0, 0.0));
        assert_eq!(result, pixel(10, 10, 10));

        let result = apply(&pixel(10, 40, 90), &params(100.0, 100.0, 0.0));
        // 0.299*10 + 0.587*40 + 0.114*90 = 36.73
        assert_eq!(result, pixel(37, 37, 37));
    }

    #[test]
    fn test_saturation_zero_uses_post_contrast_gray() {
        // Contrast 150 pushes 10 below zero; the gray is taken after clamping.
        let result = apply(&pixel(10, 10, 10), &params(100.0, 150.0, 0.0));
        assert_eq!(result, pixel(0, 0, 0));
    }

    #[test]
    fn test_saturation_boost_final_clamp() {
        let result = apply(&pixel(250, 20, 20), &params(100.0, 100.0, 200.0));
        assert_eq!(result[0], 255);
        assert_eq!(result[1], 0);
        assert_eq!(result[2], 0);
    }

    #[test]
    fn test_saturation_leaves_gray_alone() {
        let result = apply(&pixel(90, 90, 90), &params(100.0, 100.0, 200.0));
        assert_eq!(result, pixel(90, 90, 90));
    }

    // ===== Ordering Tests =====

    #[test]
    fn test_saturated_channels_clamp_before_gray() {
        let rgb = [250.0, 120.0, 10.0];
        let factor = contrast_factor(150.0);
        assert_eq!(adjust_rgb(rgb, 1.0, factor, 0.0), [144, 144, 144]);
    }

    // ===== Alpha Tests =====

    #[test]
    fn test_alpha_passes_through() {
        let pixels = vec![200, 100, 50, 17, 10, 20, 30, 0];
        let result = apply(&pixels, &params(140.0, 130.0, 20.0));
        assert_eq!(result[3], 17);
        assert_eq!(result[7], 0);
    }

    #[test]
    fn test_multiple_pixels() {
        let mut pixels = pixel(200, 100, 50);
        pixels.extend(pixel(100, 50, 25));
        let result = apply(&pixels, &params(120.0, 100.0, 100.0));
        assert_eq!(&result[0..4], &[240, 120, 60, 255]);
        assert_eq!(&result[4..8], &[120, 60, 30, 255]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
