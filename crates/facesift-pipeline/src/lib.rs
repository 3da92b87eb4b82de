//! facesift-pipeline — the match pipeline.
//!
//! Drives scan → decode → encode → match over a folder of candidate
//! photos, reporting progress incrementally and collecting matched paths
//! for packaging. Face detection and embedding extraction live in
//! `facesift-core`; everything here is orchestration.

pub mod config;
pub mod decode;
pub mod packager;
pub mod scanner;
pub mod session;
pub mod types;

pub use config::Config;
pub use session::{spawn_session, CancelFlag, Encoder, Pipeline, ProgressEvent, Session};
pub use types::{
    CandidateImage, MatchSet, ReferenceError, ReferenceFace, RunOutcome, RunState, RunSummary,
    Verdict,
};
