//! Classifier contract and the non-statistical implementations.
//!
//! - [`UnavailableClassifier`] stands in when an artifact cannot be loaded and
//!   answers `Unknown` with zero confidence for every input.
//! - [`KeywordClassifier`] scores politics and sports keyword hits. It needs no
//!   artifact and is useful as a fallback or in tests.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use recontext_core::Topic;

/// A topic label with the classifier's confidence in it (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub topic: Topic,
    pub confidence: f32,
}

impl Classification {
    pub fn new(topic: Topic, confidence: f32) -> Self {
        Self { topic, confidence }
    }

    /// `Unknown` with zero confidence.
    pub fn unknown() -> Self {
        Self::new(Topic::Unknown, 0.0)
    }
}

/// Maps utterance text to a [`Topic`].
///
/// Implementations must be pure with respect to the input text and must not
/// panic; anything they cannot handle is reported as `Unknown`. They are
/// shared read-only across sessions.
pub trait TopicClassifier: Send + Sync {
    /// Classify the given text.
    fn classify(&self, text: &str) -> Classification;

    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// `false` when this is a degraded stand-in for a backend that failed to load.
    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// UnavailableClassifier
// ---------------------------------------------------------------------------

/// Stand-in used when the configured artifact is missing or corrupt.
#[derive(Debug, Clone)]
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the real backend could not be loaded.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl TopicClassifier for UnavailableClassifier {
    fn classify(&self, _text: &str) -> Classification {
        Classification::unknown()
    }

    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// KeywordClassifier
// ---------------------------------------------------------------------------

static POLITICS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:pm|prime\s+minister|president|parliament|government|election|minister|senate|chancellor|cabinet)\b",
    )
    .expect("Invalid politics keyword regex")
});

static SPORTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:captain|coach|cricket|football|team|match|league|player|club|tournament)\b",
    )
    .expect("Invalid sports keyword regex")
});

/// Lexical classifier: counts politics and sports keyword hits.
///
/// The side with more hits wins and its share of all hits is the confidence.
/// No hits, or a tie, gives `Unknown` with zero confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl TopicClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Classification {
        let politics = POLITICS_RE.find_iter(text).count();
        let sports = SPORTS_RE.find_iter(text).count();
        let total = politics + sports;

        if total == 0 || politics == sports {
            return Classification::unknown();
        }

        let (topic, hits) = if politics > sports {
            (Topic::Politics, politics)
        } else {
            (Topic::Sports, sports)
        };
        Classification::new(topic, hits as f32 / total as f32)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

// =============================================================================
// Tests
// =============================================================================
