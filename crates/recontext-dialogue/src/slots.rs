//! Slot extraction.
//!
//! Pulls the subject, role and intent an utterance supplies on its own.
//! Roles and well-known subjects come from alias tables mapped to canonical
//! names (`"PM"` and `"premier"` both become `"prime minister"`); unknown
//! subjects are picked up from possessive, `"of X"` and `"what about X"`
//! phrasing.

use std::collections::HashMap;
use std::sync::LazyLock;

use recontext_core::config::LexiconConfig;
use recontext_core::{Intent, Slot};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DialogueError;

// =============================================================================
// Lexicons
// =============================================================================

/// Canonical role name followed by the surface forms that map to it.
static ROLES: &[(&str, &[&str])] = &[
    ("prime minister", &["prime minister", "pm", "premier"]),
    ("president", &["president"]),
    ("vice president", &["vice president", "vp"]),
    ("chancellor", &["chancellor"]),
    ("finance minister", &["finance minister"]),
    ("foreign minister", &["foreign minister"]),
    ("chief minister", &["chief minister"]),
    ("governor", &["governor"]),
    ("mayor", &["mayor"]),
    ("king", &["king"]),
    ("queen", &["queen"]),
    ("captain", &["captain", "skipper"]),
    ("coach", &["coach", "head coach"]),
];

/// Canonical subject name followed by the surface forms that map to it.
static SUBJECTS: &[(&str, &[&str])] = &[
    ("india", &["india"]),
    ("us", &["us", "usa", "united states", "america"]),
    ("uk", &["uk", "united kingdom", "britain", "great britain"]),
    ("england", &["england"]),
    ("france", &["france"]),
    ("germany", &["germany"]),
    ("japan", &["japan"]),
    ("china", &["china"]),
    ("canada", &["canada"]),
    ("australia", &["australia"]),
    ("pakistan", &["pakistan"]),
    ("bangladesh", &["bangladesh"]),
    ("sri lanka", &["sri lanka"]),
    ("new zealand", &["new zealand"]),
    ("south africa", &["south africa"]),
    ("brazil", &["brazil"]),
    ("italy", &["italy"]),
    ("spain", &["spain"]),
    ("russia", &["russia"]),
    ("liverpool", &["liverpool"]),
    ("arsenal", &["arsenal"]),
    ("chelsea", &["chelsea"]),
    ("barcelona", &["barcelona"]),
    ("real madrid", &["real madrid"]),
    (
        "manchester united",
        &["manchester united", "man united", "man utd"],
    ),
];

/// Words that can never be a subject on their own.
static NON_SUBJECT_WORDS: &[&str] = &[
    "he", "she", "him", "his", "her", "hers", "they", "them", "their", "it", "its", "that",
    "this", "those", "these", "there", "here", "me", "my", "you", "your", "we", "our", "i",
    "what", "who", "whom", "which", "where", "when", "how", "why", "a", "an", "the", "some",
    "any", "all", "more", "else", "same", "one", "let", "everyone", "someone",
];

// =============================================================================
// Static patterns
// =============================================================================

static DUTIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:duties|duty|responsibilities|responsibility|powers|functions)\b")
        .unwrap()
});

static WHO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:who|whom|name\s+of)\b").unwrap());

static INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:tell\s+me\s+(?:more\s+)?about|more\s+about|information\s+(?:on|about)|details\s+(?:on|about)|describe|explain)\b",
    )
    .unwrap()
});

/// `"... of X"` at the very end of the utterance, one to three words.
static OF_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bof\s+(?:the\s+)?([a-z][a-z'\-]*(?:\s+[a-z][a-z'\-]*){0,2})\s*[?.!]*\s*$")
        .unwrap()
});

/// `"what about X"` / `"how about X"` spanning the whole utterance.
static WHAT_ABOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:and|so|ok|okay)[,\s]+)?(?:what|how)\s+about\s+(?:the\s+)?([a-z][a-z'\-.]*(?:\s+[a-z][a-z'\-.]*){0,2})\s*[?.!]*\s*$",
    )
    .unwrap()
});

/// Words immediately before a lowercase `"us"` that make it the country.
static US_COUNTRY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:about|of|in|for|the|and)\s+$").unwrap());

// =============================================================================
// ExtractedSlots
// =============================================================================

/// Slot values the current utterance supplies by itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSlots {
    pub subject: Option<String>,
    pub role: Option<String>,
    pub intent: Option<Intent>,
}

impl ExtractedSlots {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.role.is_none() && self.intent.is_none()
    }

    /// Subject, role and intent all present.
    pub fn is_complete(&self) -> bool {
        self.subject.is_some() && self.role.is_some() && self.intent.is_some()
    }

    /// Names of the slots this utterance supplied.
    pub fn supplied(&self) -> Vec<Slot> {
        let mut out = Vec::new();
        if self.subject.is_some() {
            out.push(Slot::Subject);
        }
        if self.role.is_some() {
            out.push(Slot::Role);
        }
        if self.intent.is_some() {
            out.push(Slot::Intent);
        }
        out
    }
}

// =============================================================================
// SlotExtractor
// =============================================================================

/// Rule-based slot filler built from the built-in lexicon plus configured extras.
#[derive(Clone, Debug)]
pub struct SlotExtractor {
    role_re: Regex,
    roles: HashMap<String, String>,
    subject_re: Regex,
    subjects: HashMap<String, String>,
    possessive_re: Regex,
}

impl SlotExtractor {
    /// Compile the alias tables. Extra subjects and roles from config map to themselves.
    pub fn new(lexicon: &LexiconConfig) -> Result<Self, DialogueError> {
        let roles = alias_table(ROLES, &lexicon.extra_roles);
        let subjects = alias_table(SUBJECTS, &lexicon.extra_subjects);

        let role_alternation = alternation(roles.keys());
        let subject_alternation = alternation(subjects.keys());

        Ok(Self {
            role_re: Regex::new(&format!(r"(?i)\b(?:{})\b", role_alternation))?,
            subject_re: Regex::new(&format!(r"(?i)\b(?:{})\b", subject_alternation))?,
            possessive_re: Regex::new(&format!(
                r"(?i)\b([a-z][a-z\-]*)(?:'s|’s)\s+(?:{})\b",
                role_alternation
            ))?,
            roles,
            subjects,
        })
    }

    /// Extract every slot the utterance supplies.
    pub fn extract(&self, text: &str) -> ExtractedSlots {
        ExtractedSlots {
            subject: self.extract_subject(text),
            role: self.extract_role(text),
            intent: extract_intent(text),
        }
    }

    /// First role mention, canonicalized.
    pub fn extract_role(&self, text: &str) -> Option<String> {
        self.role_re
            .find_iter(text)
            .find_map(|m| self.roles.get(&normalize_phrase(m.as_str())).cloned())
    }

    /// Subject from the gazetteer, then possessive, `"of X"` and `"what about X"` phrasing.
    pub fn extract_subject(&self, text: &str) -> Option<String> {
        for m in self.subject_re.find_iter(text) {
            let alias = normalize_phrase(m.as_str());
            if alias == "us" && !us_means_country(text, m.start(), m.as_str()) {
                continue;
            }
            if let Some(canonical) = self.subjects.get(&alias) {
                return Some(canonical.clone());
            }
        }

        if let Some(caps) = self.possessive_re.captures(text) {
            if let Some(subject) = self.accept_candidate(&caps[1]) {
                return Some(subject);
            }
        }

        if let Some(caps) = OF_TAIL_RE.captures(text) {
            if let Some(subject) = self.accept_candidate(&caps[1]) {
                return Some(subject);
            }
        }

        WHAT_ABOUT_RE
            .captures(text)
            .and_then(|caps| self.accept_candidate(&caps[1]))
    }

    /// Whether the phrase is (or contains) a known role.
    pub fn mentions_role(&self, text: &str) -> bool {
        self.role_re.is_match(text)
    }

    fn accept_candidate(&self, raw: &str) -> Option<String> {
        let candidate = normalize_phrase(raw.trim_end_matches(['?', '.', '!']));
        let words: Vec<&str> = candidate.split(' ').filter(|w| !w.is_empty()).collect();
        if words.is_empty() || words.len() > 3 {
            return None;
        }
        if words.iter().any(|w| NON_SUBJECT_WORDS.contains(w)) {
            return None;
        }
        if self.role_re.is_match(&candidate) || extract_intent(&candidate).is_some() {
            return None;
        }
        Some(candidate)
    }
}

/// Intent cue with priority duties > who > info.
pub fn extract_intent(text: &str) -> Option<Intent> {
    if DUTIES_RE.is_match(text) {
        Some(Intent::Duties)
    } else if WHO_RE.is_match(text) {
        Some(Intent::Who)
    } else if INFO_RE.is_match(text) {
        Some(Intent::Info)
    } else {
        None
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Lowercase and collapse internal whitespace.
pub(crate) fn normalize_phrase(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn alias_table(builtin: &[(&str, &[&str])], extras: &[String]) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for (canonical, aliases) in builtin {
        for alias in aliases.iter() {
            table.insert(alias.to_string(), canonical.to_string());
        }
    }
    for extra in extras {
        let normalized = normalize_phrase(extra);
        if !normalized.is_empty() {
            table.insert(normalized.clone(), normalized);
        }
    }
    table
}

/// Regex alternation over aliases, longest first so multi-word forms win.
fn alternation<'a>(aliases: impl Iterator<Item = &'a String>) -> String {
    let mut sorted: Vec<&String> = aliases.collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted
        .iter()
        .map(|alias| {
            alias
                .split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// `"US"` is the country; lowercase `"us"` only after a preposition or article.
fn us_means_country(text: &str, start: usize, matched: &str) -> bool {
    matched == "US" || US_COUNTRY_PREFIX_RE.is_match(&text[..start])
}

// =============================================================================
// Tests
// =============================================================================
