//! Throughput of the bundled TF-IDF classifier.
//!
//! Classification runs once per `NewQuery` turn, so it has to stay well under
//! a millisecond for short utterances.
//!
//! ```bash
//! cargo bench -p recontext-classifier
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use recontext_classifier::{KeywordClassifier, LinearTopicClassifier, TopicClassifier};

const UTTERANCES: &[&str] = &[
    "Who is the prime minister of India?",
    "who is the captain of the cricket team",
    "what about us",
    "his duties?",
    "tell me about the population of the capital",
    "now tell me who coaches liverpool football club this season",
];

fn bench_linear(c: &mut Criterion) {
    let classifier = LinearTopicClassifier::bundled(0.5).expect("bundled artifact");
    c.bench_function("linear_classify_batch", |b| {
        b.iter(|| {
            for text in UTTERANCES {
                black_box(classifier.classify(black_box(text)));
            }
        })
    });
}

fn bench_keyword(c: &mut Criterion) {
    let classifier = KeywordClassifier;
    c.bench_function("keyword_classify_batch", |b| {
        b.iter(|| {
            for text in UTTERANCES {
                black_box(classifier.classify(black_box(text)));
            }
        })
    });
}

fn bench_load_bundled(c: &mut Criterion) {
    c.bench_function("load_bundled_artifact", |b| {
        b.iter(|| black_box(LinearTopicClassifier::bundled(0.5)))
    });
}

criterion_group!(benches, bench_linear, bench_keyword, bench_load_bundled);
criterion_main!(benches);
