//! Bag-of-terms TF-IDF vectorizer.
//!
//! Tokenization mirrors the common offline training setup: lower-case, keep
//! runs of two or more word characters, optional word n-grams joined by a
//! single space. Vectors are L2-normalized and returned in sparse form.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid token regex"));

/// Sparse term vector as `(feature index, weight)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f32)>;

/// Maps text to TF-IDF weighted, L2-normalized sparse vectors over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
}

impl TfidfVectorizer {
    /// Build a vectorizer. Callers validate that `idf` covers every vocabulary index.
    pub fn new(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f32>,
        ngram_range: (usize, usize),
        sublinear_tf: bool,
    ) -> Self {
        Self {
            vocabulary,
            idf,
            ngram_range,
            sublinear_tf,
        }
    }

    /// Number of features.
    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    /// Split text into lower-cased word tokens.
    pub fn tokenize(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        TOKEN_RE
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Generate the n-gram terms for `text` according to the configured range.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let tokens = Self::tokenize(text);
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Vectorize `text`. Terms outside the vocabulary are ignored; an input with
    /// no known terms yields an empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in self.terms(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();
        vector.sort_by_key(|(idx, _)| *idx);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in vector.iter_mut() {
                *w /= norm;
            }
        } else {
            vector.clear();
        }
        vector
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(ngram_range: (usize, usize), sublinear_tf: bool) -> TfidfVectorizer {
        let vocabulary: HashMap<String, usize> = [
            ("prime", 0),
            ("minister", 1),
            ("captain", 2),
            ("prime minister", 3),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        TfidfVectorizer::new(vocabulary, vec![1.0, 1.0, 2.0, 3.0], ngram_range, sublinear_tf)
    }

    // ---- Tokenization ----

    #[test]
    fn test_tokenize_lowercases_and_drops_short_tokens() {
        let tokens = TfidfVectorizer::tokenize("Who is the PM of India?");
        assert_eq!(tokens, vec!["who", "is", "the", "pm", "of", "india"]);
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens = TfidfVectorizer::tokenize("captain, coach... (team)!");
        assert_eq!(tokens, vec!["captain", "coach", "team"]);
    }

    #[test]
    fn test_tokenize_single_chars_dropped() {
        assert!(TfidfVectorizer::tokenize("a b c").is_empty());
    }

    // ---- N-grams ----

    #[test]
    fn test_terms_unigram_only() {
        let v = vectorizer((1, 1), false);
        assert_eq!(v.terms("prime minister"), vec!["prime", "minister"]);
    }

    #[test]
    fn test_terms_with_bigrams() {
        let v = vectorizer((1, 2), false);
        assert_eq!(
            v.terms("the prime minister"),
            vec!["the", "prime", "minister", "the prime", "prime minister"]
        );
    }

    #[test]
    fn test_terms_ngram_longer_than_input() {
        let v = vectorizer((2, 2), false);
        assert!(v.terms("prime").is_empty());
    }

    #[test]
    fn test_terms_huge_ngram_bound_stops_at_input_length() {
        let v = vectorizer((1, usize::MAX), false);
        assert_eq!(
            v.terms("prime minister"),
            vec!["prime", "minister", "prime minister"]
        );
    }

    // ---- Transform ----

    #[test]
    fn test_transform_unknown_terms_empty() {
        let v = vectorizer((1, 1), false);
        assert!(v.transform("what about us").is_empty());
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let v = vectorizer((1, 2), false);
        let vec = v.transform("who is the prime minister");
        let norm: f32 = vec.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        let indices: Vec<usize> = vec.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 3]);
    }

    #[test]
    fn test_transform_single_term_weight_one() {
        let v = vectorizer((1, 1), false);
        let vec = v.transform("captain captain");
        assert_eq!(vec.len(), 1);
        assert_eq!(vec[0].0, 2);
        assert!((vec[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_idf_weighting() {
        let v = vectorizer((1, 1), false);
        // prime: tf 1 * idf 1, captain: tf 1 * idf 2 -> normalized 1/sqrt5, 2/sqrt5
        let vec = v.transform("prime captain");
        let weights: HashMap<usize, f32> = vec.into_iter().collect();
        assert!((weights[&0] - 1.0 / 5f32.sqrt()).abs() < 1e-5);
        assert!((weights[&2] - 2.0 / 5f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_transform_sublinear_tf() {
        let v = vectorizer((1, 1), true);
        // prime x3 -> 1 + ln 3, captain x1 -> 1 * idf 2
        let vec = v.transform("prime prime prime captain");
        let weights: HashMap<usize, f32> = vec.into_iter().collect();
        let p = 1.0 + 3f32.ln();
        let c = 2.0;
        let norm = (p * p + c * c).sqrt();
        assert!((weights[&0] - p / norm).abs() < 1e-5);
        assert!((weights[&2] - c / norm).abs() < 1e-5);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(vectorizer((1, 1), false).dimensions(), 4);
    }
}
