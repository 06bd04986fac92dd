mod active;
mod service;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use active::ActiveSession;
pub use service::{DEFAULT_WORDS, MAX_WORDS, MIN_WORDS, SessionRequest, StudySessionService};
