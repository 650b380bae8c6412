//! Conversational memory.
//!
//! One [`ContextState`] per session holds the current frame (domain,
//! subject, role, intent) and a bounded history of committed turns. Every
//! commit decays existing slot confidences first, so slots that are never
//! refreshed are eventually forgotten.

use std::collections::VecDeque;

use chrono::Local;
use recontext_core::config::DecayConfig;
use recontext_core::{DialogueAct, Intent, Slot, Topic};
use serde::{Deserialize, Serialize};

use crate::slots::ExtractedSlots;

/// Placeholder subject in topic assignments when none is known.
pub const NO_SUBJECT: &str = "NA";

// =============================================================================
// SlotValue / Frame
// =============================================================================

/// A remembered value and how fresh it is (1.0 when written).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotValue<T> {
    pub value: T,
    pub confidence: f32,
}

impl<T> SlotValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            confidence: 1.0,
        }
    }
}

/// The slot values of one logical frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub domain: Option<SlotValue<Topic>>,
    pub subject: Option<SlotValue<String>>,
    pub role: Option<SlotValue<String>>,
    pub intent: Option<SlotValue<Intent>>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.subject.is_none()
            && self.role.is_none()
            && self.intent.is_none()
    }

    pub fn domain(&self) -> Option<Topic> {
        self.domain.as_ref().map(|s| s.value)
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_ref().map(|s| s.value.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_ref().map(|s| s.value.as_str())
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent.as_ref().map(|s| s.value)
    }

    /// Write every slot the utterance supplied; leave the rest untouched.
    pub fn overlay(&mut self, slots: &ExtractedSlots) {
        if let Some(subject) = &slots.subject {
            self.subject = Some(SlotValue::new(subject.clone()));
        }
        if let Some(role) = &slots.role {
            self.role = Some(SlotValue::new(role.clone()));
        }
        if let Some(intent) = slots.intent {
            self.intent = Some(SlotValue::new(intent));
        }
    }

    /// Required slots with no value, in `Slot::REQUIRED` order.
    pub fn missing_required(&self) -> Vec<Slot> {
        Slot::REQUIRED
            .into_iter()
            .filter(|slot| match slot {
                Slot::Subject => self.subject.is_none(),
                Slot::Role => self.role.is_none(),
                Slot::Intent => self.intent.is_none(),
                Slot::Domain => self.domain.is_none(),
            })
            .collect()
    }

    /// Multiply every confidence by `factor`; drop what falls under `floor`.
    /// The domain falls back to `Unknown` instead of disappearing.
    pub fn decay(&mut self, policy: &DecayConfig) {
        if !policy.enabled {
            return;
        }
        if let Some(domain) = self.domain.as_mut() {
            domain.confidence *= policy.factor;
            if domain.confidence < policy.floor {
                *domain = SlotValue {
                    value: Topic::Unknown,
                    confidence: 0.0,
                };
            }
        }
        decay_slot(&mut self.subject, policy);
        decay_slot(&mut self.role, policy);
        decay_slot(&mut self.intent, policy);
    }

    /// `(domain label, subject)`, with `"General"` and `"NA"` standing in for unset values.
    pub fn topic_assignment(&self) -> (String, String) {
        let domain = self
            .domain()
            .filter(Topic::is_known)
            .unwrap_or(Topic::General);
        let subject = self.subject().unwrap_or(NO_SUBJECT);
        (domain.label().to_string(), subject.to_string())
    }

    /// Plain-value copy for reports.
    pub fn snapshot(&self) -> FrameSnapshot {
        let (domain_label, subject_label) = self.topic_assignment();
        FrameSnapshot {
            domain: self.domain(),
            subject: self.subject().map(str::to_string),
            role: self.role().map(str::to_string),
            intent: self.intent(),
            topic_assignment: TopicAssignment {
                domain: domain_label,
                subject: subject_label,
            },
        }
    }
}

fn decay_slot<T>(slot: &mut Option<SlotValue<T>>, policy: &DecayConfig) {
    let expired = match slot.as_mut() {
        Some(value) => {
            value.confidence *= policy.factor;
            value.confidence < policy.floor
        }
        None => false,
    };
    if expired {
        *slot = None;
    }
}

/// Domain label and subject a turn is filed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub domain: String,
    pub subject: String,
}

/// Frame values without confidences, as reported after each turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub domain: Option<Topic>,
    pub subject: Option<String>,
    pub role: Option<String>,
    pub intent: Option<Intent>,
    pub topic_assignment: TopicAssignment,
}

// =============================================================================
// ContextState
// =============================================================================

/// One committed turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub utterance: String,
    pub act: DialogueAct,
    pub topic: Topic,
    pub timestamp: i64,
}

/// Per-session conversational memory.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextState {
    frame: Frame,
    history: VecDeque<HistoryRecord>,
    history_limit: usize,
    decay: DecayConfig,
}

impl ContextState {
    pub fn new(history_limit: usize, decay: DecayConfig) -> Self {
        Self {
            frame: Frame::default(),
            history: VecDeque::new(),
            history_limit,
            decay,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn history(&self) -> &VecDeque<HistoryRecord> {
        &self.history
    }

    /// True once any slot holds a value.
    pub fn has_context(&self) -> bool {
        !self.frame.is_empty()
    }

    /// New-query commit: decay, overwrite the domain, overlay supplied slots.
    /// Unsupplied slots carry over.
    pub fn seed(&mut self, domain: Topic, slots: &ExtractedSlots) {
        self.frame.decay(&self.decay);
        self.frame.domain = Some(SlotValue::new(domain));
        self.frame.overlay(slots);
    }

    /// Like [`seed`](Self::seed), but slots the utterance did not supply are cleared.
    pub fn reseed(&mut self, domain: Topic, slots: &ExtractedSlots) {
        self.frame = Frame {
            domain: Some(SlotValue::new(domain)),
            ..Frame::default()
        };
        self.frame.overlay(slots);
    }

    /// The frame `resolve` would produce, without committing it.
    pub fn preview_resolve(&self, slots: &ExtractedSlots) -> Frame {
        let mut working = self.frame.clone();
        working.decay(&self.decay);
        working.overlay(slots);
        working
    }

    /// Continuation commit: overwrite only the slots the utterance supplied.
    /// The domain is left as is.
    pub fn resolve(&mut self, slots: &ExtractedSlots) {
        self.frame = self.preview_resolve(slots);
    }

    /// Record a committed turn, dropping the oldest past `history_limit`.
    pub fn append_history(&mut self, utterance: &str, act: DialogueAct, topic: Topic) {
        self.history.push_back(HistoryRecord {
            utterance: utterance.to_string(),
            act,
            topic,
            timestamp: Local::now().timestamp(),
        });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Forget the frame and history.
    pub fn clear(&mut self) {
        self.frame = Frame::default();
        self.history.clear();
    }
}

impl Default for ContextState {
    fn default() -> Self {
        Self::new(50, DecayConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
