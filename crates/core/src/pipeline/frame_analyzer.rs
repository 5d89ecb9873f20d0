use crate::clustering::observation::FaceObservation;
use crate::detection::domain::face_detector::FaceDetector;
use crate::scoring::quality_scorer::QualityScorer;
use crate::shared::frame::Frame;
use crate::shared::gray::GrayPatch;

/// Result of analyzing one sampled frame.
pub struct FrameAnalysis {
    /// Observations that passed the quality gate, in detection order.
    pub observations: Vec<FaceObservation>,
    /// Raw detection count before gating.
    pub faces_detected: usize,
}

/// Detect-then-score stage for a single frame: runs the detector, crops
/// each hit, gates it through the quality scorer, and extracts the
/// normalized grayscale feature used for matching.
///
/// Each worker thread owns one analyzer, so the detector never needs to
/// be shared.
pub struct FrameAnalyzer {
    detector: Box<dyn FaceDetector>,
    scorer: QualityScorer,
    reference_size: u32,
}

impl FrameAnalyzer {
    pub fn new(detector: Box<dyn FaceDetector>, scorer: QualityScorer, reference_size: u32) -> Self {
        Self {
            detector,
            scorer,
            reference_size,
        }
    }

    pub fn analyze(
        &mut self,
        frame: &Frame,
        timestamp_secs: f64,
    ) -> Result<FrameAnalysis, Box<dyn std::error::Error>> {
        let bboxes = self.detector.detect(frame)?;
        let faces_detected = bboxes.len();

        let mut observations = Vec::new();
        for bbox in bboxes {
            let crop = frame.crop(&bbox);
            if crop.data().is_empty() {
                continue;
            }

            // Geometry is judged on the detector's declared box, pixels on
            // the clamped crop.
            let verdict = self.scorer.score(&crop, &bbox);
            if !verdict.accept {
                continue;
            }

            let feature =
                GrayPatch::from_frame(&crop).resized(self.reference_size, self.reference_size);
            observations.push(FaceObservation {
                crop,
                feature,
                bbox,
                timestamp_secs,
                quality: verdict.quality,
            });
        }

        Ok(FrameAnalysis {
            observations,
            faces_detected,
        })
    }
}
