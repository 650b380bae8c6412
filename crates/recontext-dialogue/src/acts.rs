//! Dialogue act detection.
//!
//! A pure function of the utterance, its extracted slots, and whether the
//! session already holds a frame. Anchors beat referential cues; phatic
//! utterances without slot content short-circuit as casual chat.

use std::sync::LazyLock;

use recontext_core::DialogueAct;
use regex::Regex;
use serde::Serialize;

use crate::slots::ExtractedSlots;

// =============================================================================
// Patterns
// =============================================================================

/// A wh-word followed by a copula or auxiliary, or an imperative request.
static QUESTION_FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:who|what|which|where|when|how)(?:\s+(?:is|are|was|were|do|does|did)\b|(?:'s|’s)\b)|\btell\s+me\b",
    )
    .unwrap()
});

static PRONOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:he|she|him|his|her|hers|they|them|their|it|its|that|this|those|these|there)\b",
    )
    .unwrap()
});

/// Elliptical openers: "and ...", "what about ...", "tell me more".
static ELLIPSIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:ok|okay|so|and)[,\s]+)?(?:and\b|(?:what|how)\s+about\b|what\s+else\b|tell\s+me\s+more\b|same\s+for\b)",
    )
    .unwrap()
});

static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:hi|hello|hey|yo|good\s+(?:morning|afternoon|evening)|ok|okay|cool|great|nice|sure|alright|got\s+it)\b",
    )
    .unwrap()
});

static THANKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:thanks|thank\s+you|thx|cheers|bye|goodbye|see\s+you)\b").unwrap()
});

static TOPIC_SHIFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:change\s+(?:the\s+)?(?:topic|subject)|switch\s+to|now\s+tell\s+me|new\s+question|moving\s+on|different\s+question|another\s+question)\b",
    )
    .unwrap()
});

// =============================================================================
// ActAnalysis
// =============================================================================

/// The detected act plus the cues that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActAnalysis {
    pub act: DialogueAct,
    /// Named subject plus a question form or role.
    pub anchored: bool,
    /// Pronoun, elliptical opener, or short bare follow-up.
    pub referential: bool,
    pub phatic: bool,
    pub topic_shift: bool,
    /// Referential utterance on a session with no frame yet.
    pub missing_context: bool,
    /// Anchor and referential cue in the same utterance.
    pub ambiguous: bool,
}

// =============================================================================
// ActDetector
// =============================================================================

/// Rule-based classifier over the closed `DialogueAct` set.
#[derive(Clone, Copy, Debug)]
pub struct ActDetector {
    followup_max_tokens: usize,
}

impl ActDetector {
    /// `followup_max_tokens` bounds how long a cue-free utterance can be and
    /// still count as a bare follow-up ("his duties?", "and the coach").
    pub fn new(followup_max_tokens: usize) -> Self {
        Self {
            followup_max_tokens,
        }
    }

    pub fn detect(&self, utterance: &str, slots: &ExtractedSlots, has_context: bool) -> DialogueAct {
        self.analyze(utterance, slots, has_context).act
    }

    /// Full analysis. Decision order: anchor, phatic, topic shift, referential, default.
    pub fn analyze(
        &self,
        utterance: &str,
        slots: &ExtractedSlots,
        has_context: bool,
    ) -> ActAnalysis {
        let anchored = slots.subject.is_some()
            && (QUESTION_FORM_RE.is_match(utterance)
                || slots.intent.is_some()
                || slots.role.is_some());
        let referential = self.is_referential(utterance, slots);
        let phatic = slots.is_empty()
            && (GREETING_RE.is_match(utterance) || THANKS_RE.is_match(utterance));
        let topic_shift = TOPIC_SHIFT_RE.is_match(utterance);

        let mut analysis = ActAnalysis {
            act: DialogueAct::NewQuery,
            anchored,
            referential,
            phatic,
            topic_shift,
            missing_context: false,
            ambiguous: false,
        };

        if anchored {
            analysis.ambiguous = referential;
        } else if phatic {
            analysis.act = DialogueAct::CasualChat;
        } else if referential && !has_context {
            // A shift cue with its own subject can still stand alone.
            if !topic_shift || slots.subject.is_none() {
                analysis.missing_context = true;
            }
        } else if referential && !topic_shift {
            analysis.act = DialogueAct::ContextualContinuation;
        }

        analysis
    }

    fn is_referential(&self, utterance: &str, slots: &ExtractedSlots) -> bool {
        if PRONOUN_RE.is_match(utterance) || ELLIPSIS_RE.is_match(utterance) {
            return true;
        }
        let tokens = utterance.split_whitespace().count();
        tokens <= self.followup_max_tokens
            && slots.subject.is_none()
            && (slots.role.is_some() || slots.intent.is_some())
    }
}

impl Default for ActDetector {
    fn default() -> Self {
        Self::new(6)
    }
}

// =============================================================================
// Tests
// =============================================================================
