//! Data model for a match run.

use facesift_core::Embedding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The reference person: one photo and its derived embedding. Created once
/// per session and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceFace {
    /// Photo the embedding was derived from.
    pub source: PathBuf,
    pub embedding: Embedding,
}

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("failed to read reference file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid reference file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("reference file {} holds an empty embedding", .0.display())]
    EmptyEmbedding(PathBuf),
}

impl ReferenceFace {
    pub fn new(source: PathBuf, embedding: Embedding) -> Self {
        Self { source, embedding }
    }

    /// Save the reference as JSON so it can be reused across sessions.
    pub fn save(&self, path: &Path) -> Result<(), ReferenceError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            ReferenceError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(|source| ReferenceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a saved reference, rejecting files with an empty embedding.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reference: Self =
            serde_json::from_str(&json).map_err(|source| ReferenceError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        if reference.embedding.values.is_empty() {
            return Err(ReferenceError::EmptyEmbedding(path.to_path_buf()));
        }
        Ok(reference)
    }
}

/// Per-candidate outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Embedding computed and within threshold distance of the reference.
    Matched { distance: f32 },
    /// Embedding computed but too far from the reference.
    Unmatched { distance: f32 },
    /// The photo decoded but contained no detectable face.
    NoFace,
    /// The file could not be decoded as an image.
    DecodeError,
    /// Detection or embedding inference failed for this photo.
    EncodeFailed,
}

impl Verdict {
    pub fn is_matched(&self) -> bool {
        matches!(self, Verdict::Matched { .. })
    }

    /// Whether this verdict counts toward the errored tally.
    pub fn is_errored(&self) -> bool {
        matches!(self, Verdict::DecodeError | Verdict::EncodeFailed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Matched { distance } => write!(f, "matched (distance {distance:.3})"),
            Verdict::Unmatched { distance } => write!(f, "no match (distance {distance:.3})"),
            Verdict::NoFace => write!(f, "no face detected"),
            Verdict::DecodeError => write!(f, "decode error"),
            Verdict::EncodeFailed => write!(f, "encoding failed"),
        }
    }
}

/// One scanned file and what happened to it.
#[derive(Debug, Clone)]
pub struct CandidateImage {
    pub path: PathBuf,
    pub verdict: Verdict,
}

/// Matched candidates in discovery order.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    entries: Vec<CandidateImage>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a matched candidate. Order of insertion is preserved.
    pub fn push(&mut self, candidate: CandidateImage) {
        debug_assert!(candidate.verdict.is_matched());
        self.entries.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateImage> {
        self.entries.iter()
    }

    /// Matched file paths, in discovery order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|c| c.path.clone()).collect()
    }
}

/// Pipeline lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ReferenceSet,
    Running,
    Completed,
    Cancelled,
}

/// Final tallies for a run. Always reported, so there are no silent
/// total failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Candidates actually processed (== total unless cancelled).
    pub processed: usize,
    /// Candidates discovered by the scanner.
    pub total: usize,
    pub matched: usize,
    pub no_face: usize,
    /// Decode or inference failures.
    pub errored: usize,
}

/// Everything a frontend needs after a run finishes.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Terminal state: `Completed` or `Cancelled`.
    pub state: RunState,
    /// Every processed candidate with its verdict, in discovery order.
    pub candidates: Vec<CandidateImage>,
    pub matches: MatchSet,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(values: Vec<f32>) -> Embedding {
        Embedding {
            values,
            model_version: Some("w600k_r50".into()),
        }
    }

    #[test]
    fn test_reference_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.json");

        let reference = ReferenceFace::new("me.jpg".into(), embedding(vec![0.25, -0.5, 1.0]));
        reference.save(&path).unwrap();

        let loaded = ReferenceFace::load(&path).unwrap();
        assert_eq!(loaded.source, PathBuf::from("me.jpg"));
        assert_eq!(loaded.embedding.values, vec![0.25, -0.5, 1.0]);
        assert_eq!(loaded.embedding.model_version.as_deref(), Some("w600k_r50"));
    }

    #[test]
    fn test_reference_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ReferenceFace::load(&dir.path().join("absent.json")),
            Err(ReferenceError::Io { .. })
        ));
    }

    #[test]
    fn test_reference_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ReferenceFace::load(&path),
            Err(ReferenceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_reference_load_rejects_empty_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        ReferenceFace::new("x.jpg".into(), embedding(vec![]))
            .save(&path)
            .unwrap();
        assert!(matches!(
            ReferenceFace::load(&path),
            Err(ReferenceError::EmptyEmbedding(_))
        ));
    }

    #[test]
    fn test_match_set_preserves_order() {
        let mut set = MatchSet::new();
        for name in ["b.jpg", "a.jpg", "c.jpg"] {
            set.push(CandidateImage {
                path: name.into(),
                verdict: Verdict::Matched { distance: 0.1 },
            });
        }
        let paths = set.paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], PathBuf::from("b.jpg"));
        assert_eq!(paths[1], PathBuf::from("a.jpg"));
        assert_eq!(paths[2], PathBuf::from("c.jpg"));
    }

    #[test]
    fn test_verdict_categories() {
        assert!(Verdict::Matched { distance: 0.0 }.is_matched());
        assert!(!Verdict::NoFace.is_matched());
        assert!(Verdict::DecodeError.is_errored());
        assert!(Verdict::EncodeFailed.is_errored());
        assert!(!Verdict::NoFace.is_errored());
        assert!(!Verdict::Unmatched { distance: 2.0 }.is_errored());
    }
}
