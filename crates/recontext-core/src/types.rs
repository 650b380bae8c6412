use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Subject-matter category assigned to an utterance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Politics,
    Sports,
    General,
    /// No confident label. Also the degraded result when the classifier is unavailable.
    #[default]
    Unknown,
}

impl Topic {
    /// All labels in declaration order.
    pub const ALL: [Topic; 4] = [Topic::Politics, Topic::Sports, Topic::General, Topic::Unknown];

    /// Human-readable label, e.g. `"Politics"`.
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Politics => "Politics",
            Topic::Sports => "Sports",
            Topic::General => "General",
            Topic::Unknown => "Unknown",
        }
    }

    /// Parse a label case-insensitively. Returns `None` for anything outside the closed set.
    pub fn from_label(label: &str) -> Option<Topic> {
        let trimmed = label.trim();
        Topic::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(trimmed))
    }

    /// Anything but `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Topic::Unknown)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conversational function of an utterance relative to the current context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueAct {
    /// Carries its own anchor, or starts a fresh frame.
    NewQuery,
    /// Elliptical or anaphoric follow-up that leans on the stored frame.
    ContextualContinuation,
    /// Greetings, thanks, acknowledgments. Never touches the frame.
    CasualChat,
}

impl DialogueAct {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueAct::NewQuery => "new_query",
            DialogueAct::ContextualContinuation => "contextual_continuation",
            DialogueAct::CasualChat => "casual_chat",
        }
    }
}

impl fmt::Display for DialogueAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question type asked about the subject/role pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "who is the X of Y"
    Who,
    /// "what are the duties of the X of Y"
    Duties,
    /// "tell me about the X of Y"
    Info,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Who => "who",
            Intent::Duties => "duties",
            Intent::Info => "info",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named field of conversational memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Domain,
    Subject,
    Role,
    Intent,
}

impl Slot {
    /// Slots that must be filled before a query can be rendered from the template.
    pub const REQUIRED: [Slot; 3] = [Slot::Subject, Slot::Role, Slot::Intent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Domain => "domain",
            Slot::Subject => "subject",
            Slot::Role => "role",
            Slot::Intent => "intent",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
