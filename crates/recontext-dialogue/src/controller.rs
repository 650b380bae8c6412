//! Turn controller: runs one utterance through detection, classification,
//! state mutation and expansion.

use std::sync::Arc;

use recontext_classifier::{Classification, TopicClassifier};
use recontext_core::{DialogueAct, RecontextConfig, Topic};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acts::ActDetector;
use crate::context::{ContextState, FrameSnapshot};
use crate::error::DialogueError;
use crate::expansion::{ExpansionEngine, ExpansionOutcome};
use crate::slots::SlotExtractor;

/// Recoverable conditions observed during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDiagnostic {
    /// Classifier artifact missing or corrupt; the domain was set to `Unknown`.
    ClassifierUnavailable,
    /// Anchor and referential cue together; treated as a new query.
    AmbiguousAct,
    /// Follow-up on a session with no frame; answered with a clarification.
    MissingContext,
    /// Topic-shift cue or domain switch; unsupplied slots were cleared.
    FrameReset,
}

/// Everything a caller needs to know about one processed turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub act: DialogueAct,
    /// Present only for turns that ran the classifier.
    pub classification: Option<Classification>,
    pub outcome: ExpansionOutcome,
    pub diagnostics: Vec<TurnDiagnostic>,
    /// Frame after the turn.
    pub frame: FrameSnapshot,
    /// Whether the turn changed the context state.
    pub committed: bool,
}

/// Per-turn pipeline. Holds no session state; callers pass the
/// [`ContextState`] of the session being served.
pub struct TurnController {
    classifier: Arc<dyn TopicClassifier>,
    extractor: SlotExtractor,
    detector: ActDetector,
    engine: ExpansionEngine,
}

impl TurnController {
    pub fn new(
        classifier: Arc<dyn TopicClassifier>,
        extractor: SlotExtractor,
        detector: ActDetector,
    ) -> Self {
        Self {
            classifier,
            extractor,
            detector,
            engine: ExpansionEngine,
        }
    }

    /// Build the extractor and detector from config around an existing classifier.
    pub fn from_config(
        config: &RecontextConfig,
        classifier: Arc<dyn TopicClassifier>,
    ) -> Result<Self, DialogueError> {
        let extractor = SlotExtractor::new(&config.lexicon)?;
        let detector = ActDetector::new(config.dialogue.followup_max_tokens);
        Ok(Self::new(classifier, extractor, detector))
    }

    pub fn classifier(&self) -> &Arc<dyn TopicClassifier> {
        &self.classifier
    }

    /// Process one utterance against `state`.
    ///
    /// - `CasualChat`: pass-through, state untouched.
    /// - `NewQuery`: classify, seed (or reseed on a topic shift or domain
    ///   switch), expand, record history.
    /// - `ContextualContinuation`: merge without classifying; the domain
    ///   stays as is. History is recorded only when the merge renders.
    /// - Missing context: clarification, state untouched.
    pub fn process_turn(&self, state: &mut ContextState, utterance: &str) -> TurnReport {
        let slots = self.extractor.extract(utterance);
        let analysis = self.detector.analyze(utterance, &slots, state.has_context());

        let mut diagnostics = Vec::new();
        if analysis.ambiguous {
            diagnostics.push(TurnDiagnostic::AmbiguousAct);
        }

        let mut classification = None;
        let mut committed = false;

        let outcome = match analysis.act {
            DialogueAct::CasualChat => self.engine.expand(utterance, &analysis, &slots, state),
            DialogueAct::NewQuery if analysis.missing_context => {
                diagnostics.push(TurnDiagnostic::MissingContext);
                self.engine.expand(utterance, &analysis, &slots, state)
            }
            DialogueAct::NewQuery => {
                let result = self.classifier.classify(utterance);
                if !self.classifier.is_available() {
                    diagnostics.push(TurnDiagnostic::ClassifierUnavailable);
                }

                let switched = state
                    .frame()
                    .domain()
                    .is_some_and(|prev| prev.is_known() && result.topic.is_known() && prev != result.topic);
                if analysis.topic_shift || switched {
                    diagnostics.push(TurnDiagnostic::FrameReset);
                    state.reseed(result.topic, &slots);
                } else {
                    state.seed(result.topic, &slots);
                }

                let outcome = self.engine.expand(utterance, &analysis, &slots, state);
                state.append_history(utterance, analysis.act, result.topic);
                classification = Some(result);
                committed = true;
                outcome
            }
            DialogueAct::ContextualContinuation => {
                let outcome = self.engine.expand(utterance, &analysis, &slots, state);
                if !outcome.is_clarification() {
                    let topic = state.frame().domain().unwrap_or(Topic::Unknown);
                    state.append_history(utterance, analysis.act, topic);
                    committed = true;
                }
                outcome
            }
        };

        debug!(
            act = %analysis.act,
            committed,
            diagnostics = ?diagnostics,
            outcome = ?outcome,
            "Turn processed"
        );

        TurnReport {
            act: analysis.act,
            classification,
            outcome,
            diagnostics,
            frame: state.frame().snapshot(),
            committed,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
