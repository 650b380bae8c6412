//! Query expansion.
//!
//! Turns the current utterance plus the session frame into an explicit
//! standalone query, a clarification request naming the missing slots, or a
//! verbatim pass-through for casual chat.

use recontext_core::{DialogueAct, Intent, Slot};
use serde::{Deserialize, Serialize};

use crate::acts::ActAnalysis;
use crate::context::{ContextState, Frame};
use crate::slots::ExtractedSlots;

/// Result of expanding one utterance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExpansionOutcome {
    /// Standalone query for the answering backend.
    ExplicitQuery(String),
    /// Slots the user still has to supply.
    ClarificationRequest(Vec<Slot>),
    /// Casual chat, forwarded unmodified.
    PassThrough(String),
}

impl ExpansionOutcome {
    pub fn is_clarification(&self) -> bool {
        matches!(self, ExpansionOutcome::ClarificationRequest(_))
    }

    /// Query text or pass-through text; `None` for clarifications.
    pub fn text(&self) -> Option<&str> {
        match self {
            ExpansionOutcome::ExplicitQuery(q) | ExpansionOutcome::PassThrough(q) => Some(q),
            ExpansionOutcome::ClarificationRequest(_) => None,
        }
    }

    /// User-facing line for this outcome.
    pub fn prompt(&self) -> String {
        match self {
            ExpansionOutcome::ExplicitQuery(q) | ExpansionOutcome::PassThrough(q) => q.clone(),
            ExpansionOutcome::ClarificationRequest(slots) => {
                let names: Vec<&str> = slots.iter().map(Slot::as_str).collect();
                match names.as_slice() {
                    [] => "Could you rephrase that?".to_string(),
                    [only] => format!("Could you tell me which {} you mean?", only),
                    [rest @ .., last] => format!(
                        "Could you tell me which {} and {} you mean?",
                        rest.join(", "),
                        last
                    ),
                }
            }
        }
    }
}

/// Stateless rewriter from (utterance, act, frame) to an [`ExpansionOutcome`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpansionEngine;

impl ExpansionEngine {
    /// Canonical question for a complete slot set.
    pub fn render(subject: &str, role: &str, intent: Intent) -> String {
        match intent {
            Intent::Who => format!("who is the {} of {}", role, subject),
            Intent::Duties => format!("what are the duties of the {} of {}", role, subject),
            Intent::Info => format!("tell me about the {} of {}", role, subject),
        }
    }

    /// Render a frame if subject, role and intent are all present.
    pub fn render_frame(frame: &Frame) -> Option<String> {
        match (frame.subject(), frame.role(), frame.intent()) {
            (Some(subject), Some(role), Some(intent)) => Some(Self::render(subject, role, intent)),
            _ => None,
        }
    }

    /// Expand one utterance.
    ///
    /// For `NewQuery` the caller has already seeded `state`; a complete
    /// seeded frame renders through the template, anything less is the
    /// normalized utterance. For `ContextualContinuation` the merge is
    /// computed on a working copy and committed through
    /// [`ContextState::resolve`] only when it renders; a clarification
    /// leaves `state` untouched.
    pub fn expand(
        &self,
        utterance: &str,
        analysis: &ActAnalysis,
        slots: &ExtractedSlots,
        state: &mut ContextState,
    ) -> ExpansionOutcome {
        match analysis.act {
            DialogueAct::CasualChat => ExpansionOutcome::PassThrough(utterance.to_string()),
            DialogueAct::NewQuery if analysis.missing_context => {
                ExpansionOutcome::ClarificationRequest(state.frame().missing_required())
            }
            DialogueAct::NewQuery => {
                let rendered = Self::render_frame(state.frame()).or_else(|| {
                    match (&slots.subject, &slots.role, slots.intent) {
                        (Some(subject), Some(role), Some(intent)) => {
                            Some(Self::render(subject, role, intent))
                        }
                        _ => None,
                    }
                });
                ExpansionOutcome::ExplicitQuery(
                    rendered.unwrap_or_else(|| normalize_query(utterance)),
                )
            }
            DialogueAct::ContextualContinuation => {
                let merged = state.preview_resolve(slots);
                match Self::render_frame(&merged) {
                    Some(query) => {
                        state.resolve(slots);
                        ExpansionOutcome::ExplicitQuery(query)
                    }
                    None => ExpansionOutcome::ClarificationRequest(merged.missing_required()),
                }
            }
        }
    }
}

/// Lowercase, collapse whitespace, strip trailing punctuation.
pub fn normalize_query(utterance: &str) -> String {
    utterance
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['?', '.', '!'])
        .trim_end()
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================
