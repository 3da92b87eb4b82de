use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Face embedding vector (512-dimensional for ArcFace, L2-normalized).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Embedding {
    /// Compute Euclidean distance between two embeddings.
    ///
    /// Embeddings of different dimensionality yield `f32::INFINITY`
    /// rather than a silent truncated comparison.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return f32::INFINITY;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// Outcome of comparing one candidate embedding against the reference.
#[derive(Debug, Clone, Copy)]
pub struct MatchDecision {
    pub matched: bool,
    /// Euclidean distance between the two embeddings.
    pub distance: f32,
}

/// Strategy for deciding whether a candidate face is the reference person.
pub trait DistanceMatcher {
    fn compare(&self, reference: &Embedding, candidate: &Embedding, threshold: f32)
        -> MatchDecision;
}

/// Euclidean-distance matcher over L2-normalized embeddings.
///
/// A candidate matches iff its distance to the reference is at or below
/// the threshold. The boundary is inclusive: distance == threshold is a
/// match.
pub struct EuclideanMatcher;

impl DistanceMatcher for EuclideanMatcher {
    fn compare(
        &self,
        reference: &Embedding,
        candidate: &Embedding,
        threshold: f32,
    ) -> MatchDecision {
        let distance = reference.euclidean_distance(candidate);
        MatchDecision {
            matched: distance <= threshold,
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(values: Vec<f32>) -> Embedding {
        Embedding {
            values,
            model_version: None,
        }
    }

    #[test]
    fn test_distance_identical() {
        let a = emb(vec![1.0, 0.0, 0.0]);
        assert!(a.euclidean_distance(&a).abs() < 1e-6);
    }

    #[test]
    fn test_distance_known_value() {
        let a = emb(vec![0.0, 0.0]);
        let b = emb(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_dimension_mismatch_is_infinite() {
        let a = emb(vec![1.0, 0.0]);
        let b = emb(vec![1.0, 0.0, 0.0]);
        assert_eq!(a.euclidean_distance(&b), f32::INFINITY);
    }

    #[test]
    fn test_matcher_below_threshold() {
        let r = emb(vec![1.0, 0.0]);
        let c = emb(vec![1.0, 0.5]);
        let d = EuclideanMatcher.compare(&r, &c, 0.6);
        assert!(d.matched);
        assert!((d.distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_matcher_boundary_is_inclusive() {
        let r = emb(vec![0.0, 0.0]);
        let c = emb(vec![0.6, 0.0]);
        // distance == threshold exactly
        let d = EuclideanMatcher.compare(&r, &c, 0.6);
        assert!(d.matched);
    }

    #[test]
    fn test_matcher_above_threshold() {
        let r = emb(vec![0.0, 0.0]);
        let c = emb(vec![1.0, 0.0]);
        let d = EuclideanMatcher.compare(&r, &c, 0.6);
        assert!(!d.matched);
    }

    #[test]
    fn test_matcher_dimension_mismatch_never_matches() {
        let r = emb(vec![0.0, 0.0]);
        let c = emb(vec![0.0, 0.0, 0.0]);
        let d = EuclideanMatcher.compare(&r, &c, f32::MAX);
        assert!(!d.matched);
        assert_eq!(d.distance, f32::INFINITY);
    }
}
