use crate::scoring::completeness;
use crate::scoring::quality_config::QualityConfig;
use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::gray::GrayPatch;

/// Outcome of scoring one face patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityVerdict {
    /// Weighted combination of the normalized sub-scores, in [0, 1].
    pub quality: f64,
    /// Whether the observation may enter the cluster store.
    pub accept: bool,
}

/// Pure, stateless scorer: a function of one patch and the configuration.
///
/// Safe to share across worker threads.
#[derive(Clone, Debug)]
pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Scores a cropped face region against its declared bbox dimensions.
    ///
    /// `accept` is false when the bbox fails the hard geometric bounds,
    /// the patch fails structural completeness, or the combined quality
    /// falls below the configured floor. Quality is always computed so
    /// callers can log near-misses.
    pub fn score(&self, crop: &Frame, bbox: &BoundingBox) -> QualityVerdict {
        if crop.data().is_empty() || bbox.is_degenerate() {
            return QualityVerdict {
                quality: 0.0,
                accept: false,
            };
        }

        let gray = GrayPatch::from_frame(crop);
        let quality = self.combined_quality(&gray, bbox);

        let accept = self.within_geometric_bounds(bbox)
            && completeness::is_complete_face(crop, &gray, &self.config.completeness)
            && quality >= self.config.min_quality;

        QualityVerdict { quality, accept }
    }

    fn within_geometric_bounds(&self, bbox: &BoundingBox) -> bool {
        let min = self.config.min_face_size as i32;
        let max = self.config.max_face_size as i32;
        let aspect = bbox.aspect_ratio();
        bbox.width >= min
            && bbox.height >= min
            && bbox.width <= max
            && bbox.height <= max
            && aspect >= self.config.min_aspect
            && aspect <= self.config.max_aspect
    }

    fn combined_quality(&self, gray: &GrayPatch, bbox: &BoundingBox) -> f64 {
        let c = &self.config;
        let w = &c.weights;
        let total = w.total();
        if total <= 0.0 {
            return 0.0;
        }

        let sharpness = (laplacian_variance(gray) / c.sharpness_saturation).min(1.0);
        let contrast = (gray.std_dev() / c.contrast_saturation).min(1.0);
        let brightness = 1.0 - (gray.mean() - 128.0).abs() / 128.0;
        let size = (bbox.area() as f64 / c.size_saturation_area).min(1.0);
        let aspect_ratio = bbox.aspect_ratio();
        let aspect = if aspect_ratio >= c.min_aspect && aspect_ratio <= c.max_aspect {
            1.0
        } else {
            0.0
        };

        (w.sharpness * sharpness
            + w.contrast * contrast
            + w.brightness * brightness
            + w.size * size
            + w.aspect * aspect)
            / total
    }
}

/// Variance of the 3x3 Laplacian response over interior pixels.
///
/// The classic blur detector: sharp patches produce high-variance second
/// derivatives, defocused ones do not.
pub fn laplacian_variance(gray: &GrayPatch) -> f64 {
    let w = gray.width() as usize;
    let h = gray.height() as usize;
    if w < 3 || h < 3 {
        return 0.0;
    }

    let mut responses = Vec::with_capacity((w - 2) * (h - 2));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = gray.get(x as u32, y as u32) as f64;
            let response = gray.get(x as u32, y as u32 - 1) as f64
                + gray.get(x as u32 - 1, y as u32) as f64
                + gray.get(x as u32 + 1, y as u32) as f64
                + gray.get(x as u32, y as u32 + 1) as f64
                - 4.0 * center;
            responses.push(response);
        }
    }

    let n = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / n;
    responses.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

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

    /// Skin background, hair strip, two symmetric dark eyes. Passes the
    /// completeness gate and scores well above the default quality floor.
    fn face_like_frame(size: u32) -> Frame {
        let base = solid_rgb(200, 150, 120, size, size);
        let mut data = base.data().to_vec();
        let hair = [30, 20, 20];
        paint(&mut data, size, 0, 0, size, size / 6, hair);
        let eye_w = size / 5;
        let eye_y = size / 3;
        let eye_h = size / 6;
        for &eye_x in &[size / 5, size - size / 5 - eye_w] {
            paint(&mut data, size, eye_x, eye_y, eye_w, eye_h, hair);
        }
        Frame::new(data, size, size, 3, 0)
    }

    fn bbox_for(frame: &Frame) -> BoundingBox {
        BoundingBox::new(0, 0, frame.width() as i32, frame.height() as i32)
    }

    #[test]
    fn test_accepts_face_like_patch() {
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(QualityConfig::default());
        let verdict = scorer.score(&frame, &bbox_for(&frame));
        assert!(verdict.accept, "quality was {}", verdict.quality);
        assert!(verdict.quality >= 0.4);
        assert!(verdict.quality <= 1.0);
    }

    #[rstest]
    #[case::too_small(BoundingBox::new(0, 0, 30, 30))]
    #[case::too_large(BoundingBox::new(0, 0, 500, 500))]
    #[case::too_wide(BoundingBox::new(0, 0, 200, 100))]
    #[case::too_tall(BoundingBox::new(0, 0, 100, 200))]
    fn test_rejects_geometric_bounds(#[case] bbox: BoundingBox) {
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(QualityConfig::default());
        assert!(!scorer.score(&frame, &bbox).accept);
    }

    #[test]
    fn test_rejects_incomplete_patch() {
        // Completeness gate, not geometry: blue square of valid size
        let frame = solid_rgb(0, 0, 255, 100, 100);
        let scorer = QualityScorer::new(QualityConfig::default());
        assert!(!scorer.score(&frame, &bbox_for(&frame)).accept);
    }

    #[test]
    fn test_rejects_below_quality_floor() {
        let config = QualityConfig {
            min_quality: 0.99,
            ..QualityConfig::default()
        };
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(config);
        let verdict = scorer.score(&frame, &bbox_for(&frame));
        assert!(!verdict.accept);
        assert!(verdict.quality > 0.0);
    }

    #[test]
    fn test_empty_crop_scores_zero() {
        let frame = Frame::new(Vec::new(), 0, 0, 3, 0);
        let scorer = QualityScorer::new(QualityConfig::default());
        let verdict = scorer.score(&frame, &BoundingBox::new(0, 0, 100, 100));
        assert_relative_eq!(verdict.quality, 0.0);
        assert!(!verdict.accept);
    }

    #[test]
    fn test_degenerate_bbox_rejected() {
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(QualityConfig::default());
        assert!(!scorer.score(&frame, &BoundingBox::new(0, 0, 0, 100)).accept);
    }

    #[test]
    fn test_larger_face_scores_higher() {
        // Same pixels, but the larger declared bbox lifts the size sub-score
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(QualityConfig::default());
        let small = scorer.score(&frame, &BoundingBox::new(0, 0, 60, 60));
        let large = scorer.score(&frame, &BoundingBox::new(0, 0, 150, 150));
        assert!(large.quality > small.quality);
    }

    #[test]
    fn test_size_score_saturates() {
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(QualityConfig::default());
        let at_cap = scorer.score(&frame, &BoundingBox::new(0, 0, 150, 150));
        let past_cap = scorer.score(&frame, &BoundingBox::new(0, 0, 300, 300));
        assert_relative_eq!(at_cap.quality, past_cap.quality, epsilon = 1e-12);
    }

    #[test]
    fn test_laplacian_variance_flat_is_zero() {
        let gray = GrayPatch::new(vec![128; 100], 10, 10);
        assert_relative_eq!(laplacian_variance(&gray), 0.0);
    }

    #[test]
    fn test_laplacian_variance_detects_detail() {
        let mut data = vec![0u8; 100];
        for (i, v) in data.iter_mut().enumerate() {
            if (i / 2) % 2 == 0 {
                *v = 255;
            }
        }
        let sharp = GrayPatch::new(data, 10, 10);
        assert!(laplacian_variance(&sharp) > 1000.0);
    }

    #[test]
    fn test_laplacian_variance_tiny_patch_is_zero() {
        let gray = GrayPatch::new(vec![0, 255, 0, 255], 2, 2);
        assert_relative_eq!(laplacian_variance(&gray), 0.0);
    }

    #[test]
    fn test_quality_is_deterministic() {
        let frame = face_like_frame(100);
        let scorer = QualityScorer::new(QualityConfig::default());
        let a = scorer.score(&frame, &bbox_for(&frame));
        let b = scorer.score(&frame, &bbox_for(&frame));
        assert_eq!(a, b);
    }
}
