//! Video result reduction.
//!
//! Merges ordered frame analyses into one [`VideoResult`]: mean truth
//! score, a per-frame timeline, a filtered and capped deepfake face list,
//! and merged metadata.

use tsight_models::{
    round_to, DeepfakeDetection, FrameAnalysisResult, GanFingerprint, TimelineEntry,
    VideoMetadata, VideoResult,
};

use crate::error::ReduceError;

/// Faces at or below this confidence are left out of the video summary.
pub const DEEPFAKE_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Maximum deepfake faces reported for a video.
pub const MAX_DEEPFAKE_FACES: usize = 10;

/// Reduce frame results, given in ascending timestamp order.
///
/// Order is verified, never repaired. `failed_frames` and
/// `processing_time` are left for the caller to fill in.
pub fn reduce(results: &[FrameAnalysisResult]) -> Result<VideoResult, ReduceError> {
    if results.is_empty() {
        return Err(ReduceError::Empty);
    }

    if let Some(index) = results
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(ReduceError::OutOfOrder { index: index + 1 });
    }

    let count = results.len() as f64;

    let mean_truth = results.iter().map(|r| r.truth_score()).sum::<f64>() / count;
    let truth_score = round_to(mean_truth, 2);

    let frame_analyses = results
        .iter()
        .map(|r| TimelineEntry {
            frame_number: r.frame_index,
            timestamp: r.timestamp,
            truth_score: r.truth_score(),
        })
        .collect();

    let faces_detected = results
        .iter()
        .map(|r| r.analysis.deepfake_detection.faces_detected)
        .sum();
    let deepfake_faces = results
        .iter()
        .flat_map(|r| r.analysis.deepfake_detection.deepfake_faces.iter())
        .filter(|face| face.confidence > DEEPFAKE_CONFIDENCE_THRESHOLD)
        .take(MAX_DEEPFAKE_FACES)
        .cloned()
        .collect();

    let mean_compression = results
        .iter()
        .map(|r| r.analysis.metadata.compression_score)
        .sum::<f64>()
        / count;

    let gan_fingerprint = GanFingerprint {
        detected: results
            .iter()
            .any(|r| r.analysis.metadata.gan_fingerprint.detected),
        confidence: results
            .iter()
            .map(|r| r.analysis.metadata.gan_fingerprint.confidence)
            .fold(f64::NEG_INFINITY, f64::max),
    };

    Ok(VideoResult {
        truth_score,
        ai_generated_probability: 100.0 - truth_score,
        real_probability: truth_score,
        frame_analyses,
        deepfake_detection: DeepfakeDetection {
            faces_detected,
            deepfake_faces,
        },
        metadata: VideoMetadata {
            compression_score: round_to(mean_compression, 1),
            gan_fingerprint,
        },
        frames_analyzed: results.len(),
        failed_frames: Vec::new(),
        processing_time: 0.0,
    })
}
