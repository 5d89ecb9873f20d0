//! Structural completeness checks: cheap heuristics that separate real
//! frontal faces from logos, text blocks, and other cascade false positives.

use crate::scoring::quality_config::CompletenessConfig;
use crate::shared::frame::Frame;
use crate::shared::gray::{self, GrayPatch};

/// Gradient magnitude above which a pixel counts as an edge pixel.
const EDGE_PIXEL_THRESHOLD: f64 = 0.1;

/// How much darker than the patch mean an eye-like cell must be.
const EYE_DARKNESS_MARGIN: f64 = 15.0;

/// Composite gate over all completeness sub-checks. Fails closed: any
/// failing sub-check rejects the patch.
pub fn is_complete_face(crop: &Frame, gray: &GrayPatch, config: &CompletenessConfig) -> bool {
    let skin = skin_ratio(crop);
    if skin < config.min_skin_ratio || skin > config.max_skin_ratio {
        return false;
    }
    if symmetry_score(gray) < config.min_symmetry {
        return false;
    }
    if edge_density(gray) > config.max_edge_density {
        return false;
    }
    if config.require_eye_region && !has_eye_region(gray) {
        return false;
    }
    true
}

/// Fraction of pixels whose HSV values fall inside the skin-tone band
/// (hue below 40 degrees, moderate saturation, not too dark).
pub fn skin_ratio(crop: &Frame) -> f64 {
    let channels = crop.channels() as usize;
    if channels < 3 || crop.data().is_empty() {
        return 0.0;
    }

    let num_pixels = (crop.width() * crop.height()) as usize;
    let data = crop.data();
    let mut skin = 0usize;

    for i in 0..num_pixels {
        let offset = i * channels;
        let r = data[offset] as f64 / 255.0;
        let g = data[offset + 1] as f64 / 255.0;
        let b = data[offset + 2] as f64 / 255.0;
        let (h, s, v) = rgb_to_hsv(r, g, b);
        if h <= 40.0 && s >= 0.08 && v >= 0.27 {
            skin += 1;
        }
    }

    skin as f64 / num_pixels as f64
}

/// Correlation between the left half and the mirrored right half.
///
/// Human faces are roughly bilaterally symmetric; logos and text rarely are.
pub fn symmetry_score(gray: &GrayPatch) -> f64 {
    let w = gray.width();
    let h = gray.height();
    let half = w / 2;
    if half == 0 || h == 0 {
        return 0.0;
    }

    let left = gray.region(0, 0, half, h);
    let right = gray.region(w - half, 0, half, h).flipped_horizontal();
    gray::ncc(&left, &right)
}

/// Fraction of strong-gradient pixels. High values indicate text, clutter,
/// or synthetic graphics rather than skin.
pub fn edge_density(gray: &GrayPatch) -> f64 {
    if gray.is_empty() {
        return 0.0;
    }
    let map = gray::sobel_magnitude(gray);
    let strong = map.iter().filter(|&&m| m > EDGE_PIXEL_THRESHOLD).count();
    strong as f64 / map.len() as f64
}

/// Looks for at least one eye-like dark cell in the upper half.
///
/// The band between 1/4 and 1/2 of the patch height is split into six
/// horizontal cells; a cell qualifies when its mean intensity sits well
/// below the whole-patch mean.
pub fn has_eye_region(gray: &GrayPatch) -> bool {
    let w = gray.width();
    let h = gray.height();
    if w < 12 || h < 8 {
        return false;
    }

    let band_top = h / 4;
    let band_height = h / 4;
    let cell_width = w / 6;
    let patch_mean = gray.mean();

    for cell in 0..6 {
        let x = cell * cell_width;
        let cell_mean = gray.region(x, band_top, cell_width, band_height).mean();
        if cell_mean <= patch_mean - EYE_DARKNESS_MARGIN {
            return true;
        }
    }
    false
}

fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid_rgb(r: u8, g: u8, b: u8, w: u32, h: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..(w * h) {
            data.push(r);
            data.push(g);
            data.push(b);
        }
        Frame::new(data, w, h, 3, 0)
    }

    fn paint(data: &mut [u8], size: u32, x0: u32, y0: u32, w: u32, h: u32, rgb: [u8; 3]) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let offset = ((y * size + x) * 3) as usize;
                data[offset..offset + 3].copy_from_slice(&rgb);
            }
        }
    }

    /// Synthetic face-like patch: skin-toned background, dark hair strip
    /// along the top, and two dark symmetric eye cells in the upper band.
    fn face_like_frame(size: u32) -> Frame {
        let base = solid_rgb(200, 150, 120, size, size);
        let mut data = base.data().to_vec();
        let hair = [30, 20, 20];
        paint(&mut data, size, 0, 0, size, size / 6, hair);

        let eye_y = size / 3;
        let eye_h = size / 6;
        let eye_w = size / 5;
        for &eye_x in &[size / 5, size - size / 5 - eye_w] {
            paint(&mut data, size, eye_x, eye_y, eye_w, eye_h, hair);
        }
        Frame::new(data, size, size, 3, 0)
    }

    #[test]
    fn test_skin_ratio_skin_colored_patch() {
        let frame = solid_rgb(200, 150, 120, 16, 16);
        assert_relative_eq!(skin_ratio(&frame), 1.0);
    }

    #[test]
    fn test_skin_ratio_blue_patch_is_zero() {
        let frame = solid_rgb(0, 0, 255, 16, 16);
        assert_relative_eq!(skin_ratio(&frame), 0.0);
    }

    #[test]
    fn test_skin_ratio_dark_patch_is_zero() {
        // Below the value floor, even with skin-like hue
        let frame = solid_rgb(40, 30, 25, 16, 16);
        assert_relative_eq!(skin_ratio(&frame), 0.0);
    }

    #[test]
    fn test_symmetry_mirrored_patch_is_high() {
        let frame = face_like_frame(48);
        let gray = GrayPatch::from_frame(&frame);
        assert!(symmetry_score(&gray) > 0.9);
    }

    #[test]
    fn test_symmetry_asymmetric_patch_is_low() {
        // Dark blob on the left side only
        let mut data = vec![200u8; 24 * 24];
        for y in 4..20 {
            for x in 0..8 {
                data[y * 24 + x] = 10;
            }
        }
        let gray = GrayPatch::new(data, 24, 24);
        assert!(symmetry_score(&gray) < 0.3);
    }

    #[test]
    fn test_edge_density_flat_patch_is_zero() {
        let gray = GrayPatch::new(vec![128; 256], 16, 16);
        assert_relative_eq!(edge_density(&gray), 0.0);
    }

    #[test]
    fn test_edge_density_stripes_is_high() {
        // Vertical stripes two pixels wide: nearly every pixel sits next
        // to a strong boundary.
        let mut data = vec![0u8; 256];
        for y in 0..16 {
            for x in 0..16 {
                if (x / 2) % 2 == 0 {
                    data[y * 16 + x] = 255;
                }
            }
        }
        let gray = GrayPatch::new(data, 16, 16);
        assert!(edge_density(&gray) > 0.45);
    }

    #[test]
    fn test_has_eye_region_on_face_like_patch() {
        let gray = GrayPatch::from_frame(&face_like_frame(48));
        assert!(has_eye_region(&gray));
    }

    #[test]
    fn test_has_eye_region_flat_patch_is_false() {
        let gray = GrayPatch::new(vec![128; 48 * 48], 48, 48);
        assert!(!has_eye_region(&gray));
    }

    #[test]
    fn test_has_eye_region_tiny_patch_is_false() {
        let gray = GrayPatch::new(vec![0; 16], 4, 4);
        assert!(!has_eye_region(&gray));
    }

    #[test]
    fn test_composite_accepts_face_like_patch() {
        let frame = face_like_frame(48);
        let gray = GrayPatch::from_frame(&frame);
        assert!(is_complete_face(
            &frame,
            &gray,
            &CompletenessConfig::default()
        ));
    }

    #[test]
    fn test_composite_rejects_blue_patch() {
        let frame = solid_rgb(0, 0, 255, 48, 48);
        let gray = GrayPatch::from_frame(&frame);
        assert!(!is_complete_face(
            &frame,
            &gray,
            &CompletenessConfig::default()
        ));
    }

    #[test]
    fn test_composite_rejects_all_skin_patch() {
        // Uniform skin tone exceeds the skin-ratio ceiling
        let frame = solid_rgb(200, 150, 120, 48, 48);
        let gray = GrayPatch::from_frame(&frame);
        assert!(!is_complete_face(
            &frame,
            &gray,
            &CompletenessConfig::default()
        ));
    }

    #[test]
    fn test_composite_fails_closed_on_missing_eyes() {
        // Hair strip keeps the skin ratio in band, but no eye cells
        let base = solid_rgb(200, 150, 120, 48, 48);
        let mut data = base.data().to_vec();
        paint(&mut data, 48, 0, 0, 48, 8, [30, 20, 20]);
        let frame = Frame::new(data, 48, 48, 3, 0);
        let gray = GrayPatch::from_frame(&frame);

        let config = CompletenessConfig::default();
        assert!(!is_complete_face(&frame, &gray, &config));

        let lenient = CompletenessConfig {
            require_eye_region: false,
            ..config
        };
        assert!(is_complete_face(&frame, &gray, &lenient));
    }

    #[test]
    fn test_rgb_to_hsv_red() {
        let (h, s, v) = rgb_to_hsv(1.0, 0.0, 0.0);
        assert!((h - 0.0).abs() < 1.0);
        assert!((s - 1.0).abs() < 0.01);
        assert!((v - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_rgb_to_hsv_white() {
        let (_h, s, v) = rgb_to_hsv(1.0, 1.0, 1.0);
        assert_eq!(s, 0.0);
        assert!((v - 1.0).abs() < 0.01);
    }
}
