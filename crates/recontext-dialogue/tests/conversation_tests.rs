//! End-to-end conversations through the session manager.
//!
//! Each test drives a fresh manager over the bundled classifier and checks
//! the expanded queries, clarifications and frame after every turn.

use std::sync::Arc;

use recontext_classifier::{build_classifier, LinearTopicClassifier, UnavailableClassifier};
use recontext_core::config::ClassifierFallback;
use recontext_core::{DialogueAct, Intent, RecontextConfig, Slot, Topic};
use recontext_dialogue::{
    ContextState, ExpansionOutcome, SessionManager, TurnController, TurnDiagnostic,
};
use uuid::Uuid;

// =============================================================================
// Helpers
// =============================================================================

fn make_manager() -> SessionManager {
    let classifier = Arc::new(LinearTopicClassifier::bundled(0.5).unwrap());
    SessionManager::from_config(&RecontextConfig::default(), classifier).unwrap()
}

fn make_controller() -> TurnController {
    let classifier = Arc::new(LinearTopicClassifier::bundled(0.5).unwrap());
    TurnController::from_config(&RecontextConfig::default(), classifier).unwrap()
}

fn query(text: &str) -> ExpansionOutcome {
    ExpansionOutcome::ExplicitQuery(text.to_string())
}

/// Send `utterance` in `sid` and return the outcome.
fn say(m: &SessionManager, sid: Uuid, utterance: &str) -> ExpansionOutcome {
    m.handle_message(utterance, Some(sid)).unwrap().0.outcome
}

// =============================================================================
// Elliptical follow-ups
// =============================================================================

#[test]
fn test_prime_minister_conversation() {
    let m = make_manager();
    let (first, sid) = m
        .handle_message("Who is the prime minister of India?", None)
        .unwrap();
    assert_eq!(first.outcome, query("who is the prime minister of india"));
    assert_eq!(first.frame.domain, Some(Topic::Politics));

    let (second, _) = m.handle_message("What about US?", Some(sid)).unwrap();
    assert_eq!(second.act, DialogueAct::ContextualContinuation);
    assert_eq!(second.outcome, query("who is the prime minister of us"));
    assert_eq!(second.frame.domain, Some(Topic::Politics));
    assert_eq!(second.frame.subject.as_deref(), Some("us"));
    assert_eq!(second.frame.role.as_deref(), Some("prime minister"));
    assert_eq!(second.frame.intent, Some(Intent::Who));

    let (third, _) = m.handle_message("his duties?", Some(sid)).unwrap();
    assert_eq!(
        third.outcome,
        query("what are the duties of the prime minister of us")
    );
    assert_eq!(third.frame.intent, Some(Intent::Duties));
    assert_eq!(third.frame.subject.as_deref(), Some("us"));
}

#[test]
fn test_sports_conversation() {
    let m = make_manager();
    let (first, sid) = m
        .handle_message("who is the captain of the england cricket team", None)
        .unwrap();
    assert_eq!(first.frame.domain, Some(Topic::Sports));
    assert_eq!(first.outcome, query("who is the captain of england"));

    assert_eq!(say(&m, sid, "and australia?"), query("who is the captain of australia"));
    assert_eq!(say(&m, sid, "and the coach?"), query("who is the coach of australia"));
    assert_eq!(
        say(&m, sid, "tell me more about him"),
        query("tell me about the coach of australia")
    );
}

#[test]
fn test_role_switch_inherits_subject() {
    let m = make_manager();
    let (_, sid) = m
        .handle_message("who is the prime minister of india", None)
        .unwrap();
    assert_eq!(say(&m, sid, "and the president?"), query("who is the president of india"));
}

#[test]
fn test_anchored_followups_carry_intent() {
    let cases = [
        ("what about the PM of UK", "who is the prime minister of uk"),
        ("What about India's president?", "who is the president of india"),
        ("and what about the president of france?", "who is the president of france"),
    ];
    for (followup, expected) in cases {
        let m = make_manager();
        let (_, sid) = m
            .handle_message("who is the prime minister of india", None)
            .unwrap();
        let (report, _) = m.handle_message(followup, Some(sid)).unwrap();
        assert_eq!(report.act, DialogueAct::NewQuery, "{}", followup);
        assert_eq!(report.outcome, query(expected), "{}", followup);
        assert_eq!(report.frame.intent, Some(Intent::Who), "{}", followup);
    }
}

#[test]
fn test_equivalent_phrasings_expand_identically() {
    let m = make_manager();
    let (a, _) = m
        .handle_message("who is the prime minister of india", None)
        .unwrap();
    let (b, _) = m.handle_message("Who is India's PM?", None).unwrap();
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.frame, b.frame);
}

// =============================================================================
// Clarification
// =============================================================================

#[test]
fn test_followup_on_fresh_session_clarifies_all_slots() {
    let m = make_manager();
    let (report, _) = m.handle_message("what about US?", None).unwrap();
    assert_eq!(
        report.outcome,
        ExpansionOutcome::ClarificationRequest(vec![Slot::Subject, Slot::Role, Slot::Intent])
    );
    assert!(report.diagnostics.contains(&TurnDiagnostic::MissingContext));
}

#[test]
fn test_clarification_leaves_state_identical() {
    let c = make_controller();
    let mut state = ContextState::default();
    c.process_turn(&mut state, "tell me about france");
    let before = state.clone();

    let report = c.process_turn(&mut state, "his duties?");
    assert_eq!(
        report.outcome,
        ExpansionOutcome::ClarificationRequest(vec![Slot::Role])
    );
    assert!(!report.committed);
    assert_eq!(state, before);
}

#[test]
fn test_clarification_then_answer() {
    let c = make_controller();
    let mut state = ContextState::default();
    c.process_turn(&mut state, "tell me about france");
    assert!(c.process_turn(&mut state, "his duties?").outcome.is_clarification());

    let report = c.process_turn(&mut state, "the president's duties");
    assert_eq!(
        report.outcome,
        query("what are the duties of the president of france")
    );
}

// =============================================================================
// Casual chat and topic changes
// =============================================================================

#[test]
fn test_casual_chat_is_idempotent() {
    let c = make_controller();
    let mut state = ContextState::default();
    c.process_turn(&mut state, "who is the prime minister of india");
    let before = state.clone();

    for text in ["thanks!", "ok cool", "hello", "bye"] {
        let report = c.process_turn(&mut state, text);
        assert_eq!(report.act, DialogueAct::CasualChat, "{}", text);
        assert_eq!(report.outcome, ExpansionOutcome::PassThrough(text.to_string()));
    }
    assert_eq!(state, before);
}

#[test]
fn test_topic_change_does_not_leak_role() {
    let m = make_manager();
    let (_, sid) = m
        .handle_message("who is the prime minister of india", None)
        .unwrap();
    let (report, _) = m
        .handle_message("now tell me about liverpool football club", Some(sid))
        .unwrap();
    assert!(report.diagnostics.contains(&TurnDiagnostic::FrameReset));
    assert_eq!(report.frame.domain, Some(Topic::Sports));
    assert_eq!(report.frame.role, None);

    assert_eq!(say(&m, sid, "and the coach?"), query("tell me about the coach of liverpool"));
}

#[test]
fn test_topic_assignment_follows_frame() {
    let m = make_manager();
    let (report, _) = m
        .handle_message("who is the prime minister of india", None)
        .unwrap();
    assert_eq!(report.frame.topic_assignment.domain, "Politics");
    assert_eq!(report.frame.topic_assignment.subject, "india");

    let (casual, _) = m.handle_message("hello", None).unwrap();
    assert_eq!(casual.frame.topic_assignment.domain, "General");
    assert_eq!(casual.frame.topic_assignment.subject, "NA");
}

// =============================================================================
// Classifier degradation
// =============================================================================

#[test]
fn test_unavailable_classifier_still_expands() {
    let classifier = Arc::new(UnavailableClassifier::new("artifact missing"));
    let m = SessionManager::from_config(&RecontextConfig::default(), classifier).unwrap();
    let (first, sid) = m
        .handle_message("who is the prime minister of india", None)
        .unwrap();
    assert_eq!(first.frame.domain, Some(Topic::Unknown));
    assert!(first
        .diagnostics
        .contains(&TurnDiagnostic::ClassifierUnavailable));
    assert_eq!(say(&m, sid, "what about US"), query("who is the prime minister of us"));
}

#[test]
fn test_missing_artifact_falls_back_to_keywords() {
    let mut config = RecontextConfig::default();
    config.classifier.artifact_path = Some("/definitely/not/here/topic_model.json".to_string());
    config.classifier.fallback = ClassifierFallback::Keyword;
    let classifier = build_classifier(&config.classifier);
    assert_eq!(classifier.name(), "keyword");
    let m = SessionManager::from_config(&config, classifier).unwrap();
    let (report, _) = m
        .handle_message("who is the captain of the football team in spain", None)
        .unwrap();
    assert_eq!(report.frame.domain, Some(Topic::Sports));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_report_serializes() {
    let m = make_manager();
    let (report, _) = m
        .handle_message("who is the prime minister of india", None)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["act"], "new_query");
    assert_eq!(json["outcome"]["kind"], "explicit_query");
    assert_eq!(json["outcome"]["value"], "who is the prime minister of india");
    assert_eq!(json["frame"]["subject"], "india");
}
