//! Turn pipeline for Recontext.
//!
//! Detects the dialogue act of each utterance, keeps a per-session frame of
//! domain/subject/role/intent, and rewrites elliptical follow-ups into
//! standalone queries or asks for the slots it is missing.

pub mod acts;
pub mod context;
pub mod controller;
pub mod error;
pub mod expansion;
pub mod session;
pub mod slots;

pub use acts::{ActAnalysis, ActDetector};
pub use context::{ContextState, Frame, FrameSnapshot, HistoryRecord, SlotValue, TopicAssignment};
pub use controller::{TurnController, TurnDiagnostic, TurnReport};
pub use error::DialogueError;
pub use expansion::{ExpansionEngine, ExpansionOutcome};
pub use session::{ConversationSession, SessionManager, SessionSummary, TranscriptEntry};
pub use slots::{ExtractedSlots, SlotExtractor};
