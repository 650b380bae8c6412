//! Topic classification for Recontext.
//!
//! The turn pipeline depends only on the [`TopicClassifier`] trait. The
//! production backend is a TF-IDF vectorizer feeding a linear model whose
//! parameters are loaded from an offline-trained JSON artifact.

pub mod classifier;
pub mod error;
pub mod linear;
pub mod loader;
pub mod tfidf;

pub use classifier::{Classification, KeywordClassifier, TopicClassifier, UnavailableClassifier};
pub use error::ClassifierError;
pub use linear::{LinearTopicClassifier, ModelArtifact};
pub use loader::build_classifier;
pub use tfidf::TfidfVectorizer;
