//! facesift-core — Face detection and embedding extraction engine.
//!
//! Uses SCRFD for face detection and ArcFace for embedding extraction,
//! both running via ONNX Runtime for CPU inference. Images come in as
//! decoded RGB buffers; the models themselves are external artifacts
//! loaded from a model directory.

pub mod alignment;
pub mod detector;
pub mod encoder;
pub mod recognizer;
pub mod types;

pub use detector::FaceDetector;
pub use encoder::{EncodeError, FaceEncoder};
pub use recognizer::FaceRecognizer;
pub use types::{BoundingBox, DistanceMatcher, Embedding, EuclideanMatcher, MatchDecision};

use std::path::PathBuf;

/// Default directory for ONNX model files: `$XDG_DATA_HOME/facesift/models`
/// (falling back to `~/.local/share/facesift/models`).
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facesift")
        .join("models")
}
