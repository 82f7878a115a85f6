//! Bounded-concurrency frame analysis.
//!
//! Each frame is analyzed on its own tokio task. Task handles are driven
//! through an order-preserving buffer of size `concurrency`, so at most
//! `concurrency` frames are in flight and outcomes come back in input order
//! regardless of completion order.

use futures::stream::{Stream, StreamExt};
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, warn};
use tsight_media::Frame;
use tsight_models::{FrameAnalysisResult, FrameFailure, ImageAnalysis};

use crate::error::{PipelineError, PipelineResult};
use crate::metrics;

/// Result of analyzing one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Analyzed(FrameAnalysisResult),
    Failed(FrameFailure),
}

impl FrameOutcome {
    pub fn frame_index(&self) -> u64 {
        match self {
            FrameOutcome::Analyzed(r) => r.frame_index,
            FrameOutcome::Failed(f) => f.frame_index,
        }
    }
}

/// Split outcomes into analyzed results and failures, keeping order.
pub fn partition_outcomes(
    outcomes: Vec<FrameOutcome>,
) -> (Vec<FrameAnalysisResult>, Vec<FrameFailure>) {
    let mut analyzed = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            FrameOutcome::Analyzed(result) => analyzed.push(result),
            FrameOutcome::Failed(failure) => failed.push(failure),
        }
    }
    (analyzed, failed)
}

/// Fixed-size frame analysis pool.
#[derive(Debug, Clone, Copy)]
pub struct FrameFanOut {
    concurrency: usize,
}

impl FrameFanOut {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Analyze every frame of `frames` with `analyze_one`.
    ///
    /// A failing or panicking analysis becomes [`FrameOutcome::Failed`] for
    /// that frame only. When `cancel` turns `true` no further frames are
    /// dispatched and [`PipelineError::Cancelled`] is returned; tasks
    /// already running finish detached and their results are dropped.
    pub async fn analyze_all<S, F, Fut>(
        &self,
        frames: S,
        mut analyze_one: F,
        mut cancel: watch::Receiver<bool>,
    ) -> PipelineResult<Vec<FrameOutcome>>
    where
        S: Stream<Item = Frame> + Send,
        F: FnMut(Frame) -> Fut + Send,
        Fut: Future<Output = PipelineResult<ImageAnalysis>> + Send + 'static,
    {
        if *cancel.borrow() {
            return Err(PipelineError::Cancelled);
        }

        let outcomes = frames
            .map(move |frame| {
                let frame_index = frame.frame_index;
                let timestamp = frame.timestamp;
                let handle = tokio::spawn(analyze_one(frame));

                async move {
                    let reason = match handle.await {
                        Ok(Ok(analysis)) => {
                            metrics::record_frame_analyzed();
                            return FrameOutcome::Analyzed(FrameAnalysisResult {
                                frame_index,
                                timestamp,
                                analysis,
                            });
                        }
                        Ok(Err(e)) => e.to_string(),
                        Err(join_err) => format!("frame analysis task failed: {join_err}"),
                    };

                    metrics::record_frame_failure();
                    warn!(frame_index, timestamp, reason = %reason, "Frame analysis failed");
                    FrameOutcome::Failed(FrameFailure {
                        frame_index,
                        timestamp,
                        reason,
                    })
                }
            })
            .buffered(self.concurrency);
        tokio::pin!(outcomes);

        let mut collected = Vec::new();
        let mut cancel_open = true;

        loop {
            tokio::select! {
                biased;

                changed = cancel.changed(), if cancel_open => {
                    match changed {
                        Ok(()) if *cancel.borrow() => {
                            debug!(completed = collected.len(), "Frame fan-out cancelled");
                            return Err(PipelineError::Cancelled);
                        }
                        Ok(()) => {}
                        // Sender gone: the request can no longer be cancelled.
                        Err(_) => cancel_open = false,
                    }
                }
                next = outcomes.next() => match next {
                    Some(outcome) => collected.push(outcome),
                    None => break,
                },
            }
        }

        Ok(collected)
    }
}
