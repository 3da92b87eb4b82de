//! The pipeline controller.
//!
//! [`Pipeline`] walks the candidate list sequentially — decode, encode,
//! compare — recording a verdict per file and emitting a progress event
//! after every candidate. [`spawn_session`] runs it on a dedicated OS
//! thread so an interactive frontend never blocks on image decoding or
//! inference; progress flows back over a channel and cancellation is a
//! shared flag checked between candidates.

use crate::decode;
use crate::types::{
    CandidateImage, MatchSet, ReferenceFace, RunOutcome, RunState, RunSummary, Verdict,
};
use facesift_core::{DistanceMatcher, Embedding, EncodeError, EuclideanMatcher, FaceEncoder};
use image::RgbImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Seam over `facesift_core::FaceEncoder` so the pipeline can be driven
/// without ONNX models in tests.
pub trait Encoder {
    fn encode(&mut self, photo: &RgbImage) -> Result<Embedding, EncodeError>;
}

impl Encoder for FaceEncoder {
    fn encode(&mut self, photo: &RgbImage) -> Result<Embedding, EncodeError> {
        FaceEncoder::encode(self, photo)
    }
}

/// Cooperative cancellation flag shared between a frontend and the
/// pipeline thread. The pipeline checks it between candidates, never
/// mid-inference.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Incremental progress, observable per candidate rather than only at
/// completion.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    Processed {
        /// Candidates processed so far, ending at exactly `total` for a
        /// completed run.
        processed: usize,
        total: usize,
        path: PathBuf,
        verdict: Verdict,
    },
    Finished(RunOutcome),
    Failed(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no reference face set — select a reference photo before running")]
    NoReference,
}

/// The match pipeline state machine:
/// `Idle → ReferenceSet → Running → Completed | Cancelled`.
pub struct Pipeline<E> {
    encoder: E,
    threshold: f32,
    reference: Option<ReferenceFace>,
    state: RunState,
}

impl<E: Encoder> Pipeline<E> {
    pub fn new(encoder: E, threshold: f32) -> Self {
        Self {
            encoder,
            threshold,
            reference: None,
            state: RunState::Idle,
        }
    }

    /// Set (or replace) the reference face. A run may only start once a
    /// reference is set; no candidate can match without one.
    pub fn set_reference(&mut self, reference: ReferenceFace) {
        self.reference = Some(reference);
        self.state = RunState::ReferenceSet;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Process every candidate, emitting an event after each one.
    ///
    /// Per-candidate failures (decode errors, photos without a face) are
    /// recorded and processing continues. Cancellation stops the run at
    /// the next candidate boundary, keeping the partial MatchSet.
    pub fn run(
        &mut self,
        candidates: &[PathBuf],
        mut on_event: impl FnMut(ProgressEvent),
        cancel: &CancelFlag,
    ) -> Result<RunOutcome, PipelineError> {
        let reference = self.reference.clone().ok_or(PipelineError::NoReference)?;
        self.state = RunState::Running;

        let total = candidates.len();
        let matcher = EuclideanMatcher;

        on_event(ProgressEvent::Started { total });
        tracing::info!(total, threshold = self.threshold, "pipeline run started");

        let mut processed_candidates = Vec::with_capacity(total);
        let mut matches = MatchSet::new();
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };
        let mut cancelled = false;

        for path in candidates {
            if cancel.is_cancelled() {
                cancelled = true;
                tracing::info!(processed = summary.processed, total, "run cancelled");
                break;
            }

            let verdict = match decode::load_rgb(path) {
                Err(err) => {
                    tracing::warn!(error = %err, "candidate skipped: decode failed");
                    Verdict::DecodeError
                }
                Ok(photo) => match self.encoder.encode(&photo) {
                    Err(EncodeError::NoFaceDetected) => Verdict::NoFace,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "candidate skipped: encoding failed");
                        Verdict::EncodeFailed
                    }
                    Ok(embedding) => {
                        let decision =
                            matcher.compare(&reference.embedding, &embedding, self.threshold);
                        if decision.matched {
                            Verdict::Matched {
                                distance: decision.distance,
                            }
                        } else {
                            Verdict::Unmatched {
                                distance: decision.distance,
                            }
                        }
                    }
                },
            };

            summary.processed += 1;
            match verdict {
                Verdict::Matched { .. } => summary.matched += 1,
                Verdict::NoFace => summary.no_face += 1,
                v if v.is_errored() => summary.errored += 1,
                _ => {}
            }

            let candidate = CandidateImage {
                path: path.clone(),
                verdict,
            };
            if verdict.is_matched() {
                matches.push(candidate.clone());
            }
            processed_candidates.push(candidate);

            on_event(ProgressEvent::Processed {
                processed: summary.processed,
                total,
                path: path.clone(),
                verdict,
            });
        }

        self.state = if cancelled {
            RunState::Cancelled
        } else {
            RunState::Completed
        };
        tracing::info!(
            state = ?self.state,
            processed = summary.processed,
            matched = summary.matched,
            no_face = summary.no_face,
            errored = summary.errored,
            "pipeline run finished"
        );

        Ok(RunOutcome {
            state: self.state,
            candidates: processed_candidates,
            matches,
            summary,
        })
    }
}

/// Handle to a pipeline running on its own thread.
pub struct Session {
    /// Progress events, terminated by `Finished` (or `Failed`).
    pub events: mpsc::Receiver<ProgressEvent>,
    cancel: CancelFlag,
}

impl Session {
    /// Clone of the cancellation flag, e.g. to wire into a Ctrl-C handler.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Run a prepared pipeline on a dedicated OS thread.
///
/// The pipeline must already have its reference set. Events are delivered
/// over the returned session's channel; dropping the session's receiver
/// cancels nothing by itself — use [`Session::cancel`].
pub fn spawn_session<E>(mut pipeline: Pipeline<E>, candidates: Vec<PathBuf>) -> Session
where
    E: Encoder + Send + 'static,
{
    let cancel = CancelFlag::default();
    let flag = cancel.clone();
    let (tx, rx) = mpsc::channel::<ProgressEvent>(32);

    std::thread::Builder::new()
        .name("facesift-pipeline".into())
        .spawn(move || {
            let result = pipeline.run(
                &candidates,
                |event| {
                    let _ = tx.blocking_send(event);
                },
                &flag,
            );
            let terminal = match result {
                Ok(outcome) => ProgressEvent::Finished(outcome),
                Err(err) => ProgressEvent::Failed(err.to_string()),
            };
            let _ = tx.blocking_send(terminal);
        })
        .expect("failed to spawn pipeline thread");

    Session { events: rx, cancel }
}
