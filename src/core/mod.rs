//! Core slate and session logic

pub mod entry;
pub mod session;
pub mod slate;
pub mod value;

// Re-export commonly used types
pub use entry::{next_match_id, MatchForm};
pub use session::{DisplayedResult, Session, SessionState};
pub use slate::Slate;
pub use value::{assess_selection, expected_return, implied_probabilities, OutcomeValue};
