//! Per-pixel colour filters.
//!
//! Implements the Filter Effects `brightness()`, `contrast()`, `saturate()`
//! and `grayscale()` functions on RGB8 data. Each function works on
//! normalized channel values and clamps to `[0, 1]` before the next one
//! runs, the same as chaining filter functions.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. (blur, `image::imageops::blur` in `composite`)
//! 5. Grayscale

use crate::FilterParameters;

/// Rec. 709 luma weights as rounded in the `saturate()` matrix.
const SATURATE_R: f32 = 0.213;
const SATURATE_G: f32 = 0.715;
const SATURATE_B: f32 = 0.072;

/// ITU-R BT.709 luma weights used by the `grayscale()` matrix.
pub const LUMINANCE_R: f32 = 0.2126;
pub const LUMINANCE_G: f32 = 0.7152;
pub const LUMINANCE_B: f32 = 0.0722;

type Matrix3 = [[f32; 3]; 3];

/// Apply brightness, contrast and saturation in place.
///
/// Each filter is skipped at its neutral value.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `params` - Filter values in user units (percent)
pub fn apply_color_filters(pixels: &mut [u8], params: &FilterParameters) {
    let brightness = params.brightness / 100.0;
    let contrast = params.contrast / 100.0;
    let saturation = (params.saturation != FilterParameters::NEUTRAL_SATURATION)
        .then(|| saturate_matrix(params.saturation / 100.0));

    let do_brightness = params.brightness != FilterParameters::NEUTRAL_BRIGHTNESS;
    let do_contrast = params.contrast != FilterParameters::NEUTRAL_CONTRAST;
    if !do_brightness && !do_contrast && saturation.is_none() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(3) {
        let mut rgb = to_unit(chunk);
        if do_brightness {
            rgb = apply_brightness(rgb, brightness);
        }
        if do_contrast {
            rgb = apply_contrast(rgb, contrast);
        }
        if let Some(m) = &saturation {
            rgb = apply_matrix(rgb, m);
        }
        from_unit(rgb, chunk);
    }
}

/// Apply `grayscale(amount%)` in place. `amount` is 0-100.
pub fn apply_grayscale(pixels: &mut [u8], amount: f32) {
    if amount <= 0.0 {
        return;
    }
    let m = grayscale_matrix(amount / 100.0);
    for chunk in pixels.chunks_exact_mut(3) {
        let rgb = apply_matrix(to_unit(chunk), &m);
        from_unit(rgb, chunk);
    }
}

/// Linear multiply: `c * factor`.
#[inline]
pub fn apply_brightness(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    rgb.map(|c| (c * factor).clamp(0.0, 1.0))
}

/// Scale around mid-grey: `(c - 0.5) * factor + 0.5`.
#[inline]
pub fn apply_contrast(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    rgb.map(|c| ((c - 0.5) * factor + 0.5).clamp(0.0, 1.0))
}

/// Colour matrix for `saturate(s)`, where `s = 1` is the identity.
pub fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [
            SATURATE_R + (1.0 - SATURATE_R) * s,
            SATURATE_G - SATURATE_G * s,
            SATURATE_B - SATURATE_B * s,
        ],
        [
            SATURATE_R - SATURATE_R * s,
            SATURATE_G + (1.0 - SATURATE_G) * s,
            SATURATE_B - SATURATE_B * s,
        ],
        [
            SATURATE_R - SATURATE_R * s,
            SATURATE_G - SATURATE_G * s,
            SATURATE_B + (1.0 - SATURATE_B) * s,
        ],
    ]
}

/// Colour matrix for `grayscale(amount)`, where `amount` is in `[0, 1]`.
pub fn grayscale_matrix(amount: f32) -> Matrix3 {
    let g = 1.0 - amount.clamp(0.0, 1.0);
    [
        [
            LUMINANCE_R + (1.0 - LUMINANCE_R) * g,
            LUMINANCE_G - LUMINANCE_G * g,
            LUMINANCE_B - LUMINANCE_B * g,
        ],
        [
            LUMINANCE_R - LUMINANCE_R * g,
            LUMINANCE_G + (1.0 - LUMINANCE_G) * g,
            LUMINANCE_B - LUMINANCE_B * g,
        ],
        [
            LUMINANCE_R - LUMINANCE_R * g,
            LUMINANCE_G - LUMINANCE_G * g,
            LUMINANCE_B + (1.0 - LUMINANCE_B) * g,
        ],
    ]
}

#[inline]
fn apply_matrix(rgb: [f32; 3], m: &Matrix3) -> [f32; 3] {
    let [r, g, b] = rgb;
    [
        (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0),
        (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0),
        (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0),
    ]
}

#[inline]
fn to_unit(chunk: &[u8]) -> [f32; 3] {
    [
        chunk[0] as f32 / 255.0,
        chunk[1] as f32 / 255.0,
        chunk[2] as f32 / 255.0,
    ]
}

#[inline]
fn from_unit(rgb: [f32; 3], chunk: &mut [u8]) {
    for (dst, c) in chunk.iter_mut().zip(rgb) {
        *dst = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(brightness: f32, contrast: f32, saturation: f32) -> FilterParameters {
        FilterParameters {
            brightness,
            contrast,
            saturation,
            ..FilterParameters::default()
        }
    }

    // ===== Brightness Tests =====

    #[test]
    fn test_brightness_scales_linearly() {
        let mut px = vec![100, 50, 200];
        apply_color_filters(&mut px, &params(150.0, 100.0, 100.0));
        assert_eq!(px, vec![150, 75, 255]);
    }

    #[test]
    fn test_brightness_zero_is_black() {
        let mut px = vec![100, 50, 200];
        apply_color_filters(&mut px, &params(0.0, 100.0, 100.0));
        assert_eq!(px, vec![0, 0, 0]);
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_zero_is_mid_grey() {
        let mut px = vec![0, 255, 30];
        apply_color_filters(&mut px, &params(100.0, 0.0, 100.0));
        assert_eq!(px, vec![128, 128, 128]);
    }

    #[test]
    fn test_contrast_expands_from_midpoint() {
        let rgb = apply_contrast([0.25, 0.5, 0.75], 2.0);
        assert_eq!(rgb, [0.0, 0.5, 1.0]);
    }

    // ===== Saturation Tests =====

    #[test]
    fn test_saturate_identity_matrix() {
        let m = saturate_matrix(1.0);
        for (i, row) in m.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_desaturate_gives_equal_channels() {
        let mut px = vec![200, 40, 90];
        apply_color_filters(&mut px, &params(100.0, 100.0, 0.0));
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_neutral_params_leave_pixels() {
        let mut px = vec![1, 2, 3, 250, 251, 252];
        let before = px.clone();
        apply_color_filters(&mut px, &FilterParameters::default());
        assert_eq!(px, before);
    }

    // ===== Grayscale Tests =====

    #[test]
    fn test_full_grayscale_uses_bt709_luma() {
        let mut px = vec![255, 0, 0];
        apply_grayscale(&mut px, 100.0);
        // 0.2126 * 255 = 54.2
        assert_eq!(px, vec![54, 54, 54]);
    }

    #[test]
    fn test_partial_grayscale_moves_toward_luma() {
        let mut px = vec![255, 0, 0];
        apply_grayscale(&mut px, 50.0);
        assert!(px[0] < 255 && px[0] > 54);
        assert!(px[1] > 0 && px[1] < 54);
    }

    #[test]
    fn test_grayscale_zero_is_noop() {
        let mut px = vec![9, 8, 7];
        apply_grayscale(&mut px, 0.0);
        assert_eq!(px, vec![9, 8, 7]);
    }

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert!((LUMINANCE_R + LUMINANCE_G + LUMINANCE_B - 1.0).abs() < 1e-6);
        assert!((SATURATE_R + SATURATE_G + SATURATE_B - 1.0).abs() < 1e-6);
    }
}
