use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::gray::GrayPatch;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("failed to read model file {path}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse SeetaFace model {path}: {message}")]
    ModelParse { path: PathBuf, message: String },
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is parsed once at construction; `detect` builds a fresh
/// detector from a clone of it per frame, since the rustface detector
/// itself is not reusable across sizes.
pub struct SeetaFaceDetector {
    model: rustface::Model,
    min_face_size: u32,
}

impl SeetaFaceDetector {
    pub fn from_file(path: &Path, min_face_size: u32) -> Result<Self, DetectorError> {
        let bytes = std::fs::read(path).map_err(|source| DetectorError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        let model = rustface::read_model(std::io::Cursor::new(bytes)).map_err(|e| {
            DetectorError::ModelParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            model,
            min_face_size,
        })
    }

    /// Cheap to call: the parsed model is shared, not re-read.
    pub fn duplicate(&self) -> Self {
        Self {
            model: self.model.clone(),
            min_face_size: self.min_face_size,
        }
    }
}

impl FaceDetector for SeetaFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if frame.data().is_empty() {
            return Ok(Vec::new());
        }

        let gray = GrayPatch::from_frame(frame);

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let image = rustface::ImageData::new(gray.data(), frame.width(), frame.height());
        let faces = detector.detect(&image);

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                BoundingBox::new(bbox.x(), bbox.y(), bbox.width() as i32, bbox.height() as i32)
            })
            .collect())
    }
}
