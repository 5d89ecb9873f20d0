//! Pairwise face similarity from five complementary cues: multi-scale
//! template correlation, intensity histograms, raw pixel distance, edge
//! maps, and sparse keypoint matching.
//!
//! All cues operate on grayscale features already normalized to the
//! configured reference size, so the engine itself stays cheap enough to
//! run against every stored cluster for every accepted observation.

use crate::matching::similarity_config::SimilarityConfig;
use crate::shared::gray::{self, GrayPatch};

/// Gradient magnitude a pixel must exceed to seed a keypoint.
const KEYPOINT_RESPONSE_THRESHOLD: f64 = 0.25;
/// Strongest responses kept per patch.
const MAX_KEYPOINTS: usize = 32;
/// Half-width of the square descriptor sampled around each keypoint.
const DESCRIPTOR_RADIUS: u32 = 4;

const HISTOGRAM_BINS: usize = 64;

#[derive(Clone, Debug)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
}

impl SimilarityEngine {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Weighted combination of all cues, in [0, 1]. Symmetric in its
    /// arguments.
    pub fn similarity(&self, a: &GrayPatch, b: &GrayPatch) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let w = &self.config.weights;
        let total = w.total();
        if total <= 0.0 {
            return 0.0;
        }

        let combined = w.template * self.template_score(a, b)
            + w.histogram * histogram_score(a, b)
            + w.pixel * pixel_score(a, b)
            + w.edge * edge_score(a, b)
            + w.keypoints * self.keypoint_score(a, b);

        (combined / total).clamp(0.0, 1.0)
    }

    /// Best normalized cross-correlation over the configured template
    /// scales, probing both match directions so the score is symmetric.
    pub fn template_score(&self, a: &GrayPatch, b: &GrayPatch) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let forward = self.directional_template_score(a, b);
        let backward = self.directional_template_score(b, a);
        forward.max(backward).clamp(0.0, 1.0)
    }

    /// Sub-unit scales crop the template center without resampling, which
    /// both shrinks it and leaves room to slide, so small detector shifts
    /// between frames still line up. Super-unit scales resize up and fit
    /// back to the image.
    fn directional_template_score(&self, image: &GrayPatch, template: &GrayPatch) -> f64 {
        let mut best = f64::NEG_INFINITY;
        for &scale in &self.config.ncc_scales {
            let score = if scale < 1.0 {
                let cropped = centered_fraction(template, scale);
                max_ncc_sliding(image, &cropped)
            } else if scale > 1.0 {
                let tw = ((template.width() as f64 * scale).round() as u32).max(1);
                let th = ((template.height() as f64 * scale).round() as u32).max(1);
                let up = template.resized(tw, th);
                let fitted = centered_fit(&up, image.width(), image.height());
                max_ncc_sliding(image, &fitted)
            } else {
                max_ncc_sliding(image, template)
            };
            best = best.max(score);
        }
        best
    }

    /// Mutually best-matching keypoints relative to the larger keypoint
    /// count, so a sparse patch cannot score a strong match against a
    /// dense one.
    ///
    /// Zero when either patch yields no keypoints at all, which is the
    /// honest answer for featureless patches rather than a free match.
    pub fn keypoint_score(&self, a: &GrayPatch, b: &GrayPatch) -> f64 {
        let kp_a = detect_keypoints(a);
        let kp_b = detect_keypoints(b);
        if kp_a.is_empty() || kp_b.is_empty() {
            return 0.0;
        }

        let desc_a: Vec<GrayPatch> = kp_a.iter().map(|k| descriptor(a, k)).collect();
        let desc_b: Vec<GrayPatch> = kp_b.iter().map(|k| descriptor(b, k)).collect();

        let mut best_for_a = vec![(usize::MAX, f64::NEG_INFINITY); desc_a.len()];
        let mut best_for_b = vec![(usize::MAX, f64::NEG_INFINITY); desc_b.len()];
        for (i, da) in desc_a.iter().enumerate() {
            for (j, db) in desc_b.iter().enumerate() {
                let score = gray::ncc(da, db);
                if score > best_for_a[i].1 {
                    best_for_a[i] = (j, score);
                }
                if score > best_for_b[j].1 {
                    best_for_b[j] = (i, score);
                }
            }
        }

        let threshold = self.config.keypoint_match_threshold;
        let mutual = best_for_a
            .iter()
            .enumerate()
            .filter(|(i, (j, score))| {
                *score > threshold && *j != usize::MAX && best_for_b[*j].0 == *i
            })
            .count();

        match_ratio(mutual, kp_a.len(), kp_b.len())
    }
}

/// Match count normalized by the larger of the two keypoint counts.
fn match_ratio(matches: usize, count_a: usize, count_b: usize) -> f64 {
    matches as f64 / count_a.max(count_b) as f64
}

/// Correlation of 64-bin intensity histograms, negative correlations
/// clamped to zero.
pub fn histogram_score(a: &GrayPatch, b: &GrayPatch) -> f64 {
    let ha = histogram(a);
    let hb = histogram(b);
    pearson(&ha, &hb).max(0.0)
}

/// One minus the mean absolute pixel difference. The second patch is
/// resized when the dimensions differ.
pub fn pixel_score(a: &GrayPatch, b: &GrayPatch) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let resized;
    let b = if a.width() == b.width() && a.height() == b.height() {
        b
    } else {
        resized = b.resized(a.width(), a.height());
        &resized
    };

    let sum: f64 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&pa, &pb)| (pa as f64 - pb as f64).abs())
        .sum();
    1.0 - sum / (a.data().len() as f64 * 255.0)
}

/// One minus the mean absolute difference between normalized Sobel
/// magnitude maps.
pub fn edge_score(a: &GrayPatch, b: &GrayPatch) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let resized;
    let b = if a.width() == b.width() && a.height() == b.height() {
        b
    } else {
        resized = b.resized(a.width(), a.height());
        &resized
    };

    let ea = gray::sobel_magnitude(a);
    let eb = gray::sobel_magnitude(b);
    if ea.is_empty() {
        return 0.0;
    }
    let sum: f64 = ea.iter().zip(&eb).map(|(ma, mb)| (ma - mb).abs()).sum();
    1.0 - sum / ea.len() as f64
}

/// Slides the smaller patch over the larger one and returns the maximum
/// zero-mean NCC across all placements.
fn max_ncc_sliding(a: &GrayPatch, b: &GrayPatch) -> f64 {
    let (image, template) = if b.width() <= a.width() && b.height() <= a.height() {
        (a, b)
    } else if a.width() <= b.width() && a.height() <= b.height() {
        (b, a)
    } else {
        // Mixed aspect mismatch, fall back to a direct resize comparison
        let resized = b.resized(a.width(), a.height());
        return gray::ncc(a, &resized);
    };

    if image.is_empty() || template.is_empty() {
        return 0.0;
    }

    let tw = template.width();
    let th = template.height();
    let mut best = f64::NEG_INFINITY;
    for y in 0..=(image.height() - th) {
        for x in 0..=(image.width() - tw) {
            let window = image.region(x, y, tw, th);
            best = best.max(gray::ncc(&window, template));
        }
    }
    best
}

/// Centered crop covering the given fraction of each side.
fn centered_fraction(patch: &GrayPatch, fraction: f64) -> GrayPatch {
    let w = ((patch.width() as f64 * fraction).round() as u32).max(1);
    let h = ((patch.height() as f64 * fraction).round() as u32).max(1);
    patch.region((patch.width() - w) / 2, (patch.height() - h) / 2, w, h)
}

/// Centered crop to at most the given dimensions.
fn centered_fit(patch: &GrayPatch, max_w: u32, max_h: u32) -> GrayPatch {
    let w = patch.width().min(max_w);
    let h = patch.height().min(max_h);
    patch.region((patch.width() - w) / 2, (patch.height() - h) / 2, w, h)
}

fn histogram(patch: &GrayPatch) -> Vec<f64> {
    let mut bins = vec![0.0f64; HISTOGRAM_BINS];
    let data = patch.data();
    if data.is_empty() {
        return bins;
    }
    let divisor = 256 / HISTOGRAM_BINS;
    for &p in data {
        bins[p as usize / divisor] += 1.0;
    }
    let n = data.len() as f64;
    for b in &mut bins {
        *b /= n;
    }
    bins
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&xa, &xb) in a.iter().zip(b) {
        let da = xa - mean_a;
        let db = xb - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 && var_b == 0.0 {
        return 1.0;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[derive(Clone, Copy, Debug)]
struct Keypoint {
    x: u32,
    y: u32,
}

/// Local maxima of the Sobel magnitude map, strongest first, capped.
///
/// Points too close to the border to carry a full descriptor are skipped.
fn detect_keypoints(patch: &GrayPatch) -> Vec<Keypoint> {
    let w = patch.width() as usize;
    let h = patch.height() as usize;
    let margin = DESCRIPTOR_RADIUS as usize;
    if w <= 2 * margin || h <= 2 * margin {
        return Vec::new();
    }

    let map = gray::sobel_magnitude(patch);
    let mut candidates: Vec<(f64, Keypoint)> = Vec::new();

    for y in margin..h - margin {
        for x in margin..w - margin {
            let m = map[y * w + x];
            if m <= KEYPOINT_RESPONSE_THRESHOLD {
                continue;
            }
            let is_peak = (-1i32..=1)
                .flat_map(|dy| (-1i32..=1).map(move |dx| (dx, dy)))
                .filter(|&(dx, dy)| dx != 0 || dy != 0)
                .all(|(dx, dy)| {
                    let nx = (x as i32 + dx) as usize;
                    let ny = (y as i32 + dy) as usize;
                    map[ny * w + nx] < m
                });
            if is_peak {
                candidates.push((
                    m,
                    Keypoint {
                        x: x as u32,
                        y: y as u32,
                    },
                ));
            }
        }
    }

    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates
        .into_iter()
        .take(MAX_KEYPOINTS)
        .map(|(_, kp)| kp)
        .collect()
}

fn descriptor(patch: &GrayPatch, kp: &Keypoint) -> GrayPatch {
    let side = 2 * DESCRIPTOR_RADIUS + 1;
    patch.region(kp.x - DESCRIPTOR_RADIUS, kp.y - DESCRIPTOR_RADIUS, side, side)
}
