use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::gray::GrayPatch;

/// One accepted face detection, carrying everything the store needs to
/// match it against existing clusters and to serve as a representative.
#[derive(Clone, Debug)]
pub struct FaceObservation {
    /// Full-resolution crop, kept for saving representative images.
    pub crop: Frame,
    /// Grayscale feature normalized to the reference size.
    pub feature: GrayPatch,
    pub bbox: BoundingBox,
    /// Seconds from the start of the video, derived from the frame index.
    pub timestamp_secs: f64,
    /// Quality score in [0, 1] from the scorer.
    pub quality: f64,
}

impl FaceObservation {
    /// Structural validity check. Malformed observations are counted and
    /// dropped by the store instead of poisoning clusters.
    pub fn is_malformed(&self) -> bool {
        self.feature.is_empty()
            || self.crop.data().is_empty()
            || self.bbox.is_degenerate()
            || !self.timestamp_secs.is_finite()
            || self.timestamp_secs < 0.0
            || !self.quality.is_finite()
            || !(0.0..=1.0).contains(&self.quality)
    }

    /// Timestamp truncated to whole seconds, the granularity clusters
    /// record appearances at.
    pub fn timestamp_whole_secs(&self) -> u64 {
        self.timestamp_secs as u64
    }
}
