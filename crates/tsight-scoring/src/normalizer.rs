//! Signal normalization.
//!
//! Maps each detector's raw result to a fake probability in [0, 1].
//! Every function here is pure and total: degraded, absent or malformed
//! data yields 0.0 rather than an error.

use tsight_models::{
    ClipSignal, Component, ComponentSignal, DeepfakeSignal, ForgerySignal, GanSignal,
    MetadataSignal, SignalBundle,
};

/// Penalty added to the metadata fake probability when anomalies were found.
pub const METADATA_ANOMALY_PENALTY: f64 = 0.2;

/// Normalized view of one component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSignal {
    /// Fake probability in [0, 1]
    pub fake_probability: f64,
    /// False when the component has nothing meaningful to say about this
    /// input (deepfake detector with zero faces). Not the same as "real".
    pub applicable: bool,
}

impl NormalizedSignal {
    fn applicable(fake_probability: f64) -> Self {
        Self {
            fake_probability,
            applicable: true,
        }
    }

    fn neutral() -> Self {
        Self::applicable(0.0)
    }

    fn not_applicable() -> Self {
        Self {
            fake_probability: 0.0,
            applicable: false,
        }
    }
}

/// Normalized signals for every component of a bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBundle {
    signals: [NormalizedSignal; 5],
}

impl NormalizedBundle {
    pub fn get(&self, component: Component) -> NormalizedSignal {
        self.signals[index(component)]
    }

    pub fn fake_probability(&self, component: Component) -> f64 {
        self.get(component).fake_probability
    }

    pub fn is_applicable(&self, component: Component) -> bool {
        self.get(component).applicable
    }

    /// Components marked inapplicable for this input.
    pub fn inapplicable(&self) -> impl Iterator<Item = Component> + '_ {
        Component::ALL
            .iter()
            .copied()
            .filter(|c| !self.is_applicable(*c))
    }
}

fn index(component: Component) -> usize {
    match component {
        Component::Clip => 0,
        Component::Deepfake => 1,
        Component::Gan => 2,
        Component::Forgery => 3,
        Component::Metadata => 4,
    }
}

/// Normalize every component of a bundle.
pub fn normalize(bundle: &SignalBundle) -> NormalizedBundle {
    let mut signals = [NormalizedSignal::neutral(); 5];
    signals[index(Component::Clip)] = with_signal(&bundle.clip, normalize_clip);
    signals[index(Component::Deepfake)] = with_signal(&bundle.deepfake, normalize_deepfake);
    signals[index(Component::Gan)] = with_signal(&bundle.gan, normalize_gan);
    signals[index(Component::Forgery)] = with_signal(&bundle.forgery, normalize_forgery);
    signals[index(Component::Metadata)] = with_signal(&bundle.metadata, normalize_metadata);
    NormalizedBundle { signals }
}

/// Absent and degraded components are neutral (0.0) and stay applicable.
fn with_signal<T>(
    signal: &Option<ComponentSignal<T>>,
    normalize_fn: fn(&T) -> NormalizedSignal,
) -> NormalizedSignal {
    match signal {
        Some(ComponentSignal::Ok(raw)) => normalize_fn(raw),
        Some(ComponentSignal::Degraded { .. }) | None => NormalizedSignal::neutral(),
    }
}

/// Clamp a probability into [0, 1]; non-finite input is malformed and maps to 0.
fn probability(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn normalize_clip(signal: &ClipSignal) -> NormalizedSignal {
    NormalizedSignal::applicable(probability(signal.ai_generated_probability / 100.0))
}

pub fn normalize_deepfake(signal: &DeepfakeSignal) -> NormalizedSignal {
    if signal.faces_detected == 0 {
        return NormalizedSignal::not_applicable();
    }

    // Faces reported but none listed is inconsistent; treat as neutral.
    let max_confidence = signal
        .deepfake_faces
        .iter()
        .map(|face| probability(face.confidence))
        .fold(0.0, f64::max);

    NormalizedSignal::applicable(max_confidence)
}

pub fn normalize_gan(signal: &GanSignal) -> NormalizedSignal {
    if signal.detected {
        NormalizedSignal::applicable(probability(signal.confidence))
    } else {
        NormalizedSignal::neutral()
    }
}

pub fn normalize_forgery(signal: &ForgerySignal) -> NormalizedSignal {
    if signal.is_manipulated {
        NormalizedSignal::applicable(probability(signal.confidence))
    } else {
        NormalizedSignal::neutral()
    }
}

pub fn normalize_metadata(signal: &MetadataSignal) -> NormalizedSignal {
    let mut fake = probability((100.0 - signal.compression_score) / 100.0);
    if !signal.anomalies.is_empty() {
        fake = (fake + METADATA_ANOMALY_PENALTY).min(1.0);
    }
    NormalizedSignal::applicable(fake)
}
