//! Linear topic classifier over TF-IDF features.
//!
//! The model is loaded from a JSON artifact produced by offline training:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "model_version": "bundled-2024.06",
//!   "labels": ["Politics", "Sports", "General"],
//!   "ngram_range": [1, 1],
//!   "sublinear_tf": false,
//!   "vocabulary": { "prime": 0, "minister": 1 },
//!   "idf": [2.1, 1.9],
//!   "coefficients": [[4.0, 4.0], [-1.0, -1.0], [-1.0, -1.0]],
//!   "intercepts": [0.0, 0.0, 0.2]
//! }
//! ```
//!
//! Scores are `coefficients · x + intercepts`, turned into probabilities with
//! a softmax. The artifact is validated in full at load time so that
//! classification itself cannot fail.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use recontext_core::Topic;

use crate::classifier::{Classification, TopicClassifier};
use crate::error::ClassifierError;
use crate::tfidf::TfidfVectorizer;

/// Artifact format version understood by this build.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Longest word n-gram an artifact may ask for.
pub const MAX_NGRAM: usize = 8;

/// Artifact shipped with the crate, used when no path is configured.
const BUNDLED_ARTIFACT: &str = include_str!("../assets/topic_model.json");

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// On-disk representation of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub model_version: String,
    pub labels: Vec<String>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    /// One row per label, one column per vocabulary index.
    pub coefficients: Vec<Vec<f32>>,
    pub intercepts: Vec<f32>,
}

impl ModelArtifact {
    /// Check every shape and value constraint the classifier relies on.
    pub fn validate(&self) -> Result<Vec<Topic>, ClassifierError> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ClassifierError::UnsupportedVersion(self.format_version));
        }
        if self.labels.is_empty() {
            return Err(ClassifierError::InvalidArtifact("no labels".to_string()));
        }

        let mut topics = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            let topic = Topic::from_label(label).ok_or_else(|| {
                ClassifierError::InvalidArtifact(format!("unknown label '{}'", label))
            })?;
            if topics.contains(&topic) {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
            topics.push(topic);
        }

        let dims = self.vocabulary.len();
        if dims == 0 {
            return Err(ClassifierError::InvalidArtifact("empty vocabulary".to_string()));
        }
        if self.idf.len() != dims {
            return Err(ClassifierError::InvalidArtifact(format!(
                "idf length {} != vocabulary size {}",
                self.idf.len(),
                dims
            )));
        }
        let mut seen = HashSet::with_capacity(dims);
        for (term, &idx) in &self.vocabulary {
            if idx >= dims || !seen.insert(idx) {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "bad vocabulary index {} for '{}'",
                    idx, term
                )));
            }
        }

        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n || max_n > MAX_NGRAM {
            return Err(ClassifierError::InvalidArtifact(format!(
                "bad ngram range ({}, {})",
                min_n, max_n
            )));
        }

        if self.coefficients.len() != topics.len() || self.intercepts.len() != topics.len() {
            return Err(ClassifierError::InvalidArtifact(format!(
                "expected {} coefficient rows and intercepts, got {} and {}",
                topics.len(),
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        for (row_idx, row) in self.coefficients.iter().enumerate() {
            if row.len() != dims {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "coefficient row {} has {} columns, expected {}",
                    row_idx,
                    row.len(),
                    dims
                )));
            }
        }

        let all_finite = self
            .idf
            .iter()
            .chain(self.intercepts.iter())
            .chain(self.coefficients.iter().flatten())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ClassifierError::InvalidArtifact(
                "non-finite parameter".to_string(),
            ));
        }

        Ok(topics)
    }
}

/// TF-IDF + linear model classifier.
#[derive(Debug, Clone)]
pub struct LinearTopicClassifier {
    vectorizer: TfidfVectorizer,
    labels: Vec<Topic>,
    coefficients: Vec<Vec<f32>>,
    intercepts: Vec<f32>,
    min_confidence: f32,
    model_version: String,
}

impl LinearTopicClassifier {
    /// Build a classifier from a parsed artifact.
    pub fn from_artifact(
        artifact: ModelArtifact,
        min_confidence: f32,
    ) -> Result<Self, ClassifierError> {
        let labels = artifact.validate()?;
        let vectorizer = TfidfVectorizer::new(
            artifact.vocabulary,
            artifact.idf,
            artifact.ngram_range,
            artifact.sublinear_tf,
        );
        Ok(Self {
            vectorizer,
            labels,
            coefficients: artifact.coefficients,
            intercepts: artifact.intercepts,
            min_confidence,
            model_version: artifact.model_version,
        })
    }

    /// Parse and validate an artifact from a JSON string.
    pub fn from_json(json: &str, min_confidence: f32) -> Result<Self, ClassifierError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact, min_confidence)
    }

    /// Load an artifact file.
    pub fn from_file(path: &Path, min_confidence: f32) -> Result<Self, ClassifierError> {
        let json = std::fs::read_to_string(path)?;
        let classifier = Self::from_json(&json, min_confidence)?;
        info!(
            path = %path.display(),
            model_version = %classifier.model_version,
            features = classifier.vectorizer.dimensions(),
            "Loaded topic classifier artifact"
        );
        Ok(classifier)
    }

    /// The artifact compiled into this crate.
    pub fn bundled(min_confidence: f32) -> Result<Self, ClassifierError> {
        Self::from_json(BUNDLED_ARTIFACT, min_confidence)
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Softmax probability for every label, in artifact order.
    ///
    /// Returns an empty list when the text has no in-vocabulary terms.
    pub fn predict_proba(&self, text: &str) -> Vec<(Topic, f32)> {
        let features = self.vectorizer.transform(text);
        if features.is_empty() {
            return vec![];
        }

        let scores: Vec<f32> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, bias)| bias + features.iter().map(|&(i, w)| row[i] * w).sum::<f32>())
            .collect();

        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f32 = exps.iter().sum();

        self.labels
            .iter()
            .copied()
            .zip(exps.into_iter().map(|e| e / total))
            .collect()
    }
}

impl TopicClassifier for LinearTopicClassifier {
    fn classify(&self, text: &str) -> Classification {
        let probs = self.predict_proba(text);
        let best = probs
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            None => Classification::unknown(),
            Some((topic, p)) if p < self.min_confidence => {
                debug!(candidate = %topic, confidence = p, "Below confidence threshold");
                Classification::new(Topic::Unknown, p)
            }
            Some((topic, p)) => Classification::new(topic, p),
        }
    }

    fn name(&self) -> &str {
        "linear-tfidf"
    }
}

// =============================================================================
// Tests
// =============================================================================
