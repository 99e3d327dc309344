//! Output canvas size for a rotated, scaled source.
//!
//! The canvas is the axis-aligned bounding box of the rotated source
//! rectangle:
//! ```text
//! rotated_w = w * |cos θ| + h * |sin θ|
//! rotated_h = w * |sin θ| + h * |cos θ|
//! ```
//! multiplied by the display scale. Both edges are rounded up so the rotated
//! content is never clipped. A small tolerance is subtracted before rounding
//! so that trigonometric noise (e.g. `cos 90° ≈ 6e-17`) cannot add a pixel:
//! quarter turns come out exact without special-casing them.

/// Values within this distance above an integer round down to it.
const ROUNDING_TOLERANCE: f64 = 1e-6;

/// Compute the canvas `(width, height)` for a source rotated by
/// `rotation_degrees` and scaled by `display_scale`.
///
/// The angle is reduced modulo 360 before the trigonometry, so accumulated
/// values such as 450 behave exactly like 90. Neither edge is ever zero.
///
/// # Example
///
/// ```
/// use photobatch_core::transform::resolve;
///
/// assert_eq!(resolve(100, 50, 90.0, 1.0), (50, 100));
/// assert_eq!(resolve(100, 50, 180.0, 1.0), (100, 50));
/// assert_eq!(resolve(1600, 900, 0.0, 0.5), (800, 450));
/// ```
pub fn resolve(
    source_width: u32,
    source_height: u32,
    rotation_degrees: f64,
    display_scale: f64,
) -> (u32, u32) {
    let theta = rotation_degrees.rem_euclid(360.0).to_radians();
    let cos = theta.cos().abs();
    let sin = theta.sin().abs();

    let w = source_width as f64;
    let h = source_height as f64;

    let rotated_w = (w * cos + h * sin) * display_scale;
    let rotated_h = (w * sin + h * cos) * display_scale;

    (ceil_dimension(rotated_w), ceil_dimension(rotated_h))
}

/// Round a scaled edge up to whole pixels, with the tolerance above.
#[inline]
pub(crate) fn ceil_dimension(value: f64) -> u32 {
    let rounded = (value - ROUNDING_TOLERANCE).ceil();
    if rounded.is_nan() || rounded < 1.0 {
        1
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: 0° and 180° keep dimensions; 90° and 270° swap them.
        #[test]
        fn prop_quarter_turn_identities(w in 1u32..=20_000, h in 1u32..=20_000) {
            prop_assert_eq!(resolve(w, h, 0.0, 1.0), (w, h));
            prop_assert_eq!(resolve(w, h, 180.0, 1.0), (w, h));
            prop_assert_eq!(resolve(w, h, 90.0, 1.0), (h, w));
            prop_assert_eq!(resolve(w, h, 270.0, 1.0), (h, w));
        }

        /// Property: four +90° steps return to the original dimensions.
        #[test]
        fn prop_four_quarter_turns_round_trip(w in 1u32..=20_000, h in 1u32..=20_000) {
            let mut rotation = 0i32;
            for _ in 0..4 {
                rotation += 90;
            }
            prop_assert_eq!(resolve(w, h, rotation as f64, 1.0), (w, h));
        }

        /// Property: the canvas always contains the unrotated source.
        #[test]
        fn prop_canvas_contains_rotated_corners(
            w in 1u32..=2_000,
            h in 1u32..=2_000,
            angle in -720.0f64..720.0,
        ) {
            let (cw, ch) = resolve(w, h, angle, 1.0);
            let theta = angle.to_radians();
            let (c, s) = (theta.cos(), theta.sin());
            let (hw, hh) = (w as f64 / 2.0, h as f64 / 2.0);
            for (x, y) in [(-hw, -hh), (hw, -hh), (-hw, hh), (hw, hh)] {
                let rx = x * c - y * s;
                let ry = x * s + y * c;
                prop_assert!(rx.abs() <= cw as f64 / 2.0 + 1e-3);
                prop_assert!(ry.abs() <= ch as f64 / 2.0 + 1e-3);
            }
        }
    }
}
