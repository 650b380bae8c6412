//! Build the configured classifier backend, degrading instead of failing.

use std::path::Path;
use std::sync::Arc;

use recontext_core::config::{ClassifierConfig, ClassifierFallback};
use tracing::{info, warn};

use crate::classifier::{KeywordClassifier, TopicClassifier, UnavailableClassifier};
use crate::linear::LinearTopicClassifier;

/// Construct the topic classifier described by `config`.
///
/// - `artifact_path` set: load it; on failure log a warning and use the
///   configured fallback.
/// - `artifact_path` unset: use the bundled artifact.
///
/// Never returns an error. A missing or corrupt artifact turns into a
/// backend that classifies everything as `Unknown` (or keyword matching when
/// `fallback = "keyword"`).
pub fn build_classifier(config: &ClassifierConfig) -> Arc<dyn TopicClassifier> {
    let loaded = match config.artifact_path.as_deref() {
        Some(path) => LinearTopicClassifier::from_file(Path::new(path), config.min_confidence),
        None => LinearTopicClassifier::bundled(config.min_confidence),
    };

    match loaded {
        Ok(classifier) => {
            info!(
                model_version = %classifier.model_version(),
                min_confidence = config.min_confidence,
                "Topic classifier ready"
            );
            Arc::new(classifier)
        }
        Err(e) => {
            warn!(
                error = %e,
                fallback = ?config.fallback,
                "Topic classifier artifact unavailable, degrading"
            );
            match config.fallback {
                ClassifierFallback::Keyword => Arc::new(KeywordClassifier),
                ClassifierFallback::Unknown => Arc::new(UnavailableClassifier::new(e.to_string())),
            }
        }
    }
}
