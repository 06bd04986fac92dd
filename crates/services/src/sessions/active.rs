use chrono::{DateTime, Utc};

use lingo_core::model::{ExerciseQuestion, SessionPhase, SessionSummary, StudySession, WordEntry};
use lingo_core::session::SessionMachine;

/// A loaded session being studied, plus when its current item was shown.
///
/// Answer timing runs from `shown_at`, which resets after every transition.
#[derive(Debug)]
pub struct ActiveSession {
    pub(crate) machine: SessionMachine,
    pub(crate) shown_at: DateTime<Utc>,
}

impl ActiveSession {
    pub(crate) fn new(session: StudySession, shown_at: DateTime<Utc>) -> Self {
        Self {
            machine: SessionMachine::new(session),
            shown_at,
        }
    }

    #[must_use]
    pub fn session(&self) -> &StudySession {
        self.machine.session()
    }

    #[must_use]
    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    #[must_use]
    pub fn shown_at(&self) -> DateTime<Utc> {
        self.shown_at
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&WordEntry> {
        self.machine.current_word()
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&ExerciseQuestion> {
        self.machine.current_exercise()
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExerciseQuestion] {
        self.machine.exercises()
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.machine.summary()
    }

    #[must_use]
    pub fn into_session(self) -> StudySession {
        self.machine.into_session()
    }
}
