//! Single-image analysis service.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use tsight_models::{
    round_to, AggregationResult, DeepfakeDetection, DegradedComponent, GanFingerprint,
    ImageAnalysis, ImageMetadata, SignalBundle,
};
use tsight_scoring::TruthScoreAggregator;

use crate::analyzer::{ImagePayload, SignalAnalyzer};
use crate::error::PipelineResult;
use crate::metrics;

/// Predicted source reported when no prediction is available.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Runs the signal analyzer on one image and scores the result.
#[derive(Clone)]
pub struct ImageAnalysisService {
    analyzer: Arc<dyn SignalAnalyzer>,
    aggregator: TruthScoreAggregator,
}

impl ImageAnalysisService {
    pub fn new(analyzer: Arc<dyn SignalAnalyzer>) -> Self {
        Self {
            analyzer,
            aggregator: TruthScoreAggregator::default(),
        }
    }

    /// Analyze one image.
    pub async fn analyze(&self, payload: &ImagePayload) -> PipelineResult<ImageAnalysis> {
        let start = Instant::now();

        let bundle = match self.analyzer.analyze(payload).await {
            Ok(bundle) => bundle,
            Err(e) => {
                metrics::record_image_analysis("error", start.elapsed().as_secs_f64());
                return Err(e);
            }
        };

        let aggregation = self.aggregator.aggregate(&bundle);
        let analysis = build_analysis(&bundle, aggregation, start.elapsed());

        metrics::record_image_analysis("success", start.elapsed().as_secs_f64());
        debug!(
            truth_score = analysis.truth_score,
            degraded = analysis.degraded_components.len(),
            "Image analyzed"
        );

        Ok(analysis)
    }
}

/// Assemble the response from the raw bundle and its aggregation.
///
/// Detector detail fields are passed through from usable components;
/// degraded or absent components contribute their defaults.
pub fn build_analysis(
    bundle: &SignalBundle,
    aggregation: AggregationResult,
    elapsed: Duration,
) -> ImageAnalysis {
    let deepfake = bundle.deepfake.as_ref().and_then(|s| s.ok());
    let forgery = bundle.forgery.as_ref().and_then(|s| s.ok());
    let gan = bundle.gan.as_ref().and_then(|s| s.ok());
    let meta = bundle.metadata.as_ref().and_then(|s| s.ok());

    let deepfake_detection = deepfake
        .map(|d| DeepfakeDetection {
            faces_detected: d.faces_detected,
            deepfake_faces: d.deepfake_faces.clone(),
        })
        .unwrap_or_default();

    let gan_fingerprint = gan
        .map(|g| GanFingerprint {
            detected: g.detected,
            confidence: g.confidence,
        })
        .unwrap_or_default();

    let metadata = match meta {
        Some(m) => ImageMetadata {
            exif: m.exif.clone(),
            compression_score: m.compression_score,
            gan_fingerprint,
            anomalies: m.anomalies.clone(),
        },
        None => ImageMetadata {
            gan_fingerprint,
            ..Default::default()
        },
    };

    let degraded_components = bundle
        .degraded_components()
        .into_iter()
        .map(|(component, reason)| DegradedComponent { component, reason })
        .collect();

    ImageAnalysis {
        truth_score: aggregation.truth_score,
        ai_generated_probability: aggregation.ai_generated_probability,
        real_probability: aggregation.truth_score,
        deepfake_detection,
        manipulation_heatmap: forgery.and_then(|f| f.heatmap.clone()).unwrap_or_default(),
        metadata,
        predicted_source: bundle
            .source
            .as_ref()
            .map(|s| s.source.clone())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        processing_time: round_to(elapsed.as_secs_f64(), 3),
        component_scores: aggregation.component_scores,
        active_weights: aggregation.active_weights,
        degraded_components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tsight_models::{
        ClipSignal, Component, DeepfakeFace, DeepfakeSignal, ForgerySignal, GanSignal,
        MetadataSignal, SourcePrediction,
    };

    use crate::error::PipelineError;

    struct StaticAnalyzer(SignalBundle);

    #[async_trait]
    impl SignalAnalyzer for StaticAnalyzer {
        async fn analyze(&self, _image: &ImagePayload) -> PipelineResult<SignalBundle> {
            Ok(self.0.clone())
        }
    }

    struct BrokenAnalyzer;

    #[async_trait]
    impl SignalAnalyzer for BrokenAnalyzer {
        async fn analyze(&self, _image: &ImagePayload) -> PipelineResult<SignalBundle> {
            Err(PipelineError::analyzer("detector service unreachable"))
        }
    }

    fn payload() -> ImagePayload {
        ImagePayload::new(vec![0xFF, 0xD8], "image/jpeg").with_filename("upload.jpg")
    }

    #[tokio::test]
    async fn test_analysis_passes_detector_details_through() {
        let bundle = SignalBundle::new()
            .with_clip(ClipSignal {
                ai_generated_probability: 80.0,
                real_probability: Some(20.0),
            })
            .with_deepfake(DeepfakeSignal {
                faces_detected: 2,
                deepfake_faces: vec![DeepfakeFace::new(0.75)],
            })
            .with_gan(GanSignal {
                detected: true,
                confidence: 0.6,
            })
            .with_forgery(ForgerySignal {
                is_manipulated: false,
                confidence: 0.1,
                heatmap: Some("base64-heatmap".to_string()),
            })
            .with_metadata(MetadataSignal {
                compression_score: 70.0,
                anomalies: vec!["No camera information".to_string()],
                ..Default::default()
            })
            .with_source(SourcePrediction {
                source: "Stable Diffusion".to_string(),
                confidence: 0.7,
            });

        let service = ImageAnalysisService::new(Arc::new(StaticAnalyzer(bundle)));
        let analysis = service.analyze(&payload()).await.unwrap();

        assert_eq!(analysis.real_probability, analysis.truth_score);
        assert_eq!(analysis.truth_score + analysis.ai_generated_probability, 100.0);
        assert_eq!(analysis.deepfake_detection.faces_detected, 2);
        assert_eq!(analysis.deepfake_detection.deepfake_faces.len(), 1);
        assert_eq!(analysis.manipulation_heatmap, "base64-heatmap");
        assert_eq!(analysis.metadata.compression_score, 70.0);
        assert!(analysis.metadata.gan_fingerprint.detected);
        assert_eq!(analysis.metadata.anomalies.len(), 1);
        assert_eq!(analysis.predicted_source, "Stable Diffusion");
        assert_eq!(analysis.active_weights.len(), 5);
        assert!(analysis.degraded_components.is_empty());
    }

    #[tokio::test]
    async fn test_degraded_components_are_reported() {
        let bundle = SignalBundle::new()
            .with_clip(ClipSignal::default())
            .with_degraded(Component::Forgery, "timeout");

        let service = ImageAnalysisService::new(Arc::new(StaticAnalyzer(bundle)));
        let analysis = service.analyze(&payload()).await.unwrap();

        assert_eq!(analysis.degraded_components.len(), 1);
        assert_eq!(analysis.degraded_components[0].component, Component::Forgery);
        assert_eq!(analysis.manipulation_heatmap, "");
        assert_eq!(analysis.predicted_source, UNKNOWN_SOURCE);
        assert_eq!(analysis.metadata.compression_score, 100.0);
    }

    #[tokio::test]
    async fn test_empty_bundle_is_authentic() {
        let service = ImageAnalysisService::new(Arc::new(StaticAnalyzer(SignalBundle::new())));
        let analysis = service.analyze(&payload()).await.unwrap();
        assert_eq!(analysis.truth_score, 100.0);
        assert_eq!(analysis.ai_generated_probability, 0.0);
    }

    #[tokio::test]
    async fn test_analyzer_error_propagates() {
        let service = ImageAnalysisService::new(Arc::new(BrokenAnalyzer));
        let err = service.analyze(&payload()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Analyzer(_)));
    }
}
