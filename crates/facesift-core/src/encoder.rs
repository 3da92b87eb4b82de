//! One-call face encoding: detect, pick a face, align, extract.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::Embedding;
use image::RgbImage;
use std::path::Path;
use thiserror::Error;

/// SCRFD detection model filename expected in the model directory.
pub const SCRFD_MODEL_FILE: &str = "det_10g.onnx";
/// ArcFace recognition model filename expected in the model directory.
pub const ARCFACE_MODEL_FILE: &str = "w600k_r50.onnx";

#[derive(Error, Debug)]
pub enum EncodeError {
    /// No face found in the image. Non-fatal to callers processing a batch:
    /// the image simply has no encodable face.
    #[error("no face detected")]
    NoFaceDetected,
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
}

/// Detector and recognizer behind a single image → embedding call.
pub struct FaceEncoder {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl FaceEncoder {
    /// Load both ONNX models from the given model directory.
    pub fn load(model_dir: &Path) -> Result<Self, EncodeError> {
        let detector = FaceDetector::load(&model_dir.join(SCRFD_MODEL_FILE))?;
        let recognizer = FaceRecognizer::load(&model_dir.join(ARCFACE_MODEL_FILE))?;
        Ok(Self {
            detector,
            recognizer,
        })
    }

    /// Encode the face in a photo into an embedding.
    ///
    /// When multiple faces are present the highest-confidence detection is
    /// used; confidence ties fall back to detection order. Returns
    /// [`EncodeError::NoFaceDetected`] when the photo contains no face.
    pub fn encode(&mut self, photo: &RgbImage) -> Result<Embedding, EncodeError> {
        let faces = self.detector.detect(photo)?;

        // detect() sorts by confidence descending, so the first box is the
        // deterministic pick.
        let face = faces.first().ok_or(EncodeError::NoFaceDetected)?;
        tracing::debug!(
            candidates = faces.len(),
            confidence = face.confidence,
            "face selected for encoding"
        );

        Ok(self.recognizer.extract(photo, face)?)
    }
}
