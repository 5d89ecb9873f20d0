use serde::{Deserialize, Serialize};

/// Relative contribution of each quality sub-score.
///
/// Size is deliberately the largest contributor: small partial detections
/// are the dominant false-positive source, and the other sub-scores cannot
/// tell them apart from genuine distant faces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub sharpness: f64,
    pub contrast: f64,
    pub brightness: f64,
    pub size: f64,
    pub aspect: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            sharpness: 0.20,
            contrast: 0.15,
            brightness: 0.10,
            size: 0.35,
            aspect: 0.20,
        }
    }
}

impl QualityWeights {
    pub fn total(&self) -> f64 {
        self.sharpness + self.contrast + self.brightness + self.size + self.aspect
    }
}

/// Thresholds for the structural completeness gate.
///
/// Every check fails closed: one failing sub-check rejects the observation
/// outright regardless of the weighted quality score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletenessConfig {
    /// Acceptable band for the fraction of skin-toned pixels.
    pub min_skin_ratio: f64,
    pub max_skin_ratio: f64,
    /// Minimum left/right mirror correlation.
    pub min_symmetry: f64,
    /// Ceiling on the fraction of strong-gradient pixels.
    pub max_edge_density: f64,
    /// Require at least one eye-like dark region in the upper half.
    pub require_eye_region: bool,
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            min_skin_ratio: 0.10,
            max_skin_ratio: 0.90,
            min_symmetry: 0.3,
            max_edge_density: 0.45,
            require_eye_region: true,
        }
    }
}

/// Full configuration for the quality scorer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub weights: QualityWeights,
    /// Hard geometric bounds on accepted face patches, in pixels.
    pub min_face_size: u32,
    pub max_face_size: u32,
    /// Acceptable width/height band for human faces.
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Laplacian variance at which the sharpness sub-score saturates.
    pub sharpness_saturation: f64,
    /// Grayscale standard deviation at which contrast saturates.
    pub contrast_saturation: f64,
    /// Patch area (pixels) at which the size sub-score saturates.
    pub size_saturation_area: f64,
    /// Observations scoring below this are gated out before clustering.
    pub min_quality: f64,
    pub completeness: CompletenessConfig,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            weights: QualityWeights::default(),
            min_face_size: 50,
            max_face_size: 400,
            min_aspect: 0.7,
            max_aspect: 1.5,
            sharpness_saturation: 500.0,
            contrast_saturation: 50.0,
            size_saturation_area: 22_500.0,
            min_quality: 0.4,
            completeness: CompletenessConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert_relative_eq!(QualityWeights::default().total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_size_is_largest_weight() {
        let w = QualityWeights::default();
        assert!(w.size > w.sharpness);
        assert!(w.size > w.contrast);
        assert!(w.size > w.brightness);
        assert!(w.size > w.aspect);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = QualityConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: QualityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: QualityConfig = serde_json::from_str(r#"{"min_quality": 0.6}"#).unwrap();
        assert_relative_eq!(config.min_quality, 0.6);
        assert_eq!(config.min_face_size, 50);
    }
}
