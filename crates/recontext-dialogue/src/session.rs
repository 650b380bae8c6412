//! Session manager: one [`ContextState`] per conversation, keyed by id.
//!
//! Sessions are created on demand, expire after an idle timeout, and keep a
//! transcript of every turn (casual chat and clarifications included).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use chrono::{DateTime, Local, TimeZone};
use recontext_classifier::TopicClassifier;
use recontext_core::config::{DecayConfig, DialogueConfig};
use recontext_core::RecontextConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::{ContextState, FrameSnapshot, TopicAssignment};
use crate::controller::{TurnController, TurnReport};
use crate::error::DialogueError;

/// One line of a session transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub utterance: String,
    pub report: TurnReport,
    pub timestamp: i64,
}

/// A live conversation.
#[derive(Clone, Debug)]
pub struct ConversationSession {
    pub id: Uuid,
    pub started_at: i64,
    pub last_message_at: i64,
    pub turn_count: u32,
    pub state: ContextState,
    pub transcript: Vec<TranscriptEntry>,
}

/// Listing view of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: String,
    pub last_message_at: String,
    pub turn_count: u32,
    pub topic_assignment: TopicAssignment,
}

type SharedSession = Arc<Mutex<ConversationSession>>;

/// Routes utterances to per-session context and the shared turn controller.
///
/// Lock order is map, then session. A turn runs under its session's lock
/// only, so a slow turn never stalls other conversations.
pub struct SessionManager {
    controller: TurnController,
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
    dialogue: DialogueConfig,
    decay: DecayConfig,
}

impl SessionManager {
    pub fn new(controller: TurnController, config: &RecontextConfig) -> Self {
        Self {
            controller,
            sessions: Mutex::new(HashMap::new()),
            dialogue: config.dialogue.clone(),
            decay: config.decay.clone(),
        }
    }

    /// Build the controller from config around a shared classifier.
    pub fn from_config(
        config: &RecontextConfig,
        classifier: Arc<dyn TopicClassifier>,
    ) -> Result<Self, DialogueError> {
        let controller = TurnController::from_config(config, classifier)?;
        Ok(Self::new(controller, config))
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    /// Process an utterance in the given session, creating one if the id is
    /// absent, unknown or expired.
    ///
    /// Returns the turn report and the session id that served it.
    pub fn handle_message(
        &self,
        utterance: &str,
        session_id: Option<Uuid>,
    ) -> Result<(TurnReport, Uuid), DialogueError> {
        if utterance.trim().is_empty() {
            return Err(DialogueError::EmptyUtterance);
        }
        if utterance.chars().count() > self.dialogue.max_utterance_chars {
            return Err(DialogueError::UtteranceTooLong(
                self.dialogue.max_utterance_chars,
            ));
        }

        let (sid, handle) = {
            let mut sessions = self.lock_sessions()?;
            let sid = self.resolve_session(&mut sessions, session_id)?;
            let handle = sessions
                .get(&sid)
                .cloned()
                .ok_or(DialogueError::SessionNotFound(sid))?;
            (sid, handle)
        };

        let mut session = lock_session(&handle)?;
        let report = self.controller.process_turn(&mut session.state, utterance);

        let now = Local::now().timestamp();
        session.last_message_at = now;
        session.turn_count += 1;
        session.transcript.push(TranscriptEntry {
            utterance: utterance.to_string(),
            report: report.clone(),
            timestamp: now,
        });

        debug!(session_id = %sid, turn = session.turn_count, "Message handled");
        Ok((report, sid))
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: Uuid) -> Option<ConversationSession> {
        let handle = self.session_handle(session_id).ok()?;
        let session = handle.lock().ok()?;
        Some(session.clone())
    }

    /// Current frame of a session.
    pub fn snapshot(&self, session_id: Uuid) -> Result<FrameSnapshot, DialogueError> {
        let handle = self.session_handle(session_id)?;
        let session = lock_session(&handle)?;
        Ok(session.state.frame().snapshot())
    }

    /// List all live sessions as summaries.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let handles: Vec<SharedSession> = match self.sessions.lock() {
            Ok(s) => s.values().cloned().collect(),
            Err(_) => return vec![],
        };
        let mut summaries: Vec<SessionSummary> = handles
            .iter()
            .filter_map(|h| h.lock().ok())
            .map(|s| {
                let (domain, subject) = s.state.frame().topic_assignment();
                SessionSummary {
                    id: s.id,
                    started_at: format_epoch(s.started_at),
                    last_message_at: format_epoch(s.last_message_at),
                    turn_count: s.turn_count,
                    topic_assignment: TopicAssignment { domain, subject },
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Forget the frame and history of a session. The transcript is kept.
    pub fn reset_session(&self, session_id: Uuid) -> Result<(), DialogueError> {
        let handle = self.session_handle(session_id)?;
        lock_session(&handle)?.state.clear();
        info!(session_id = %session_id, "Session context reset");
        Ok(())
    }

    /// Delete a session by ID.
    pub fn delete_session(&self, session_id: Uuid) -> Result<(), DialogueError> {
        let mut sessions = self.lock_sessions()?;
        if sessions.remove(&session_id).is_some() {
            Ok(())
        } else {
            Err(DialogueError::SessionNotFound(session_id))
        }
    }

    /// Every turn of a session, oldest first.
    pub fn transcript(&self, session_id: Uuid) -> Result<Vec<TranscriptEntry>, DialogueError> {
        let handle = self.session_handle(session_id)?;
        let session = lock_session(&handle)?;
        Ok(session.transcript.clone())
    }

    /// Drop every expired session. Returns how many were removed.
    ///
    /// A session in the middle of a turn is live and is kept.
    pub fn purge_expired(&self) -> Result<usize, DialogueError> {
        let mut sessions = self.lock_sessions()?;
        let mut expired = Vec::new();
        for (id, handle) in sessions.iter() {
            if self.idle_expired(handle)? {
                expired.push(*id);
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        if !expired.is_empty() {
            info!(purged = expired.len(), "Expired sessions purged");
        }
        Ok(expired.len())
    }

    /// Check whether a session has been idle longer than the configured timeout.
    pub fn is_expired(&self, session: &ConversationSession) -> bool {
        let now = Local::now().timestamp();
        let timeout_secs = i64::from(self.dialogue.session_timeout_minutes) * 60;
        now - session.last_message_at > timeout_secs
    }

    // -- Private helpers --

    fn lock_sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SharedSession>>, DialogueError> {
        self.sessions
            .lock()
            .map_err(|e| DialogueError::LockPoisoned(e.to_string()))
    }

    /// Clone a session handle out of the map, releasing the map lock.
    fn session_handle(&self, session_id: Uuid) -> Result<SharedSession, DialogueError> {
        self.lock_sessions()?
            .get(&session_id)
            .cloned()
            .ok_or(DialogueError::SessionNotFound(session_id))
    }

    /// Expiry check that never waits on a busy session; a held lock means a
    /// turn is running, so the session is live.
    fn idle_expired(&self, handle: &SharedSession) -> Result<bool, DialogueError> {
        match handle.try_lock() {
            Ok(session) => Ok(self.is_expired(&session)),
            Err(TryLockError::WouldBlock) => Ok(false),
            Err(TryLockError::Poisoned(e)) => Err(DialogueError::LockPoisoned(e.to_string())),
        }
    }

    /// Reuse a live session or create a fresh one.
    fn resolve_session(
        &self,
        sessions: &mut HashMap<Uuid, SharedSession>,
        requested: Option<Uuid>,
    ) -> Result<Uuid, DialogueError> {
        if let Some(sid) = requested {
            if let Some(handle) = sessions.get(&sid) {
                if !self.idle_expired(handle)? {
                    return Ok(sid);
                }
                sessions.remove(&sid);
                info!(session_id = %sid, "Session expired, starting a new one");
            }
        }

        let now = Local::now().timestamp();
        let session = ConversationSession {
            id: Uuid::new_v4(),
            started_at: now,
            last_message_at: now,
            turn_count: 0,
            state: ContextState::new(self.dialogue.history_limit, self.decay.clone()),
            transcript: Vec::new(),
        };
        let sid = session.id;
        sessions.insert(sid, Arc::new(Mutex::new(session)));
        Ok(sid)
    }
}

fn lock_session(
    handle: &SharedSession,
) -> Result<MutexGuard<'_, ConversationSession>, DialogueError> {
    handle
        .lock()
        .map_err(|e| DialogueError::LockPoisoned(e.to_string()))
}

/// Format epoch seconds as ISO 8601 string.
fn format_epoch(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

// =============================================================================
// Tests
// =============================================================================
