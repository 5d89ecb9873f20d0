use serde::{Deserialize, Serialize};

/// Relative contribution of each similarity cue.
///
/// Template correlation dominates: it survives the small alignment shifts
/// a detector produces between frames, which raw pixel distance does not.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub template: f64,
    pub histogram: f64,
    pub pixel: f64,
    pub edge: f64,
    pub keypoints: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            template: 0.35,
            histogram: 0.25,
            pixel: 0.20,
            edge: 0.12,
            keypoints: 0.08,
        }
    }
}

impl SimilarityWeights {
    pub fn total(&self) -> f64 {
        self.template + self.histogram + self.pixel + self.edge + self.keypoints
    }
}

/// Configuration for the pairwise similarity engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub weights: SimilarityWeights,
    /// Side length all face features are normalized to before comparison.
    pub reference_size: u32,
    /// Template scales probed during multi-scale correlation.
    pub ncc_scales: Vec<f64>,
    /// Minimum descriptor correlation for a keypoint match.
    pub keypoint_match_threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            reference_size: 64,
            ncc_scales: vec![0.9, 1.0, 1.1],
            keypoint_match_threshold: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert_relative_eq!(SimilarityWeights::default().total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_template_is_largest_weight() {
        let w = SimilarityWeights::default();
        assert!(w.template > w.histogram);
        assert!(w.template > w.pixel);
        assert!(w.template > w.edge);
        assert!(w.template > w.keypoints);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = SimilarityConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimilarityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimilarityConfig =
            serde_json::from_str(r#"{"reference_size": 96}"#).unwrap();
        assert_eq!(config.reference_size, 96);
        assert_relative_eq!(config.weights.template, 0.35);
    }
}
