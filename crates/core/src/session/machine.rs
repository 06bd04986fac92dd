use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::exercises::generate_exercises_seeded;
use crate::model::{
    ExerciseId, ExerciseQuestion, SessionPhase, SessionSummary, StudySession, WordEntry,
};
use crate::progress;

/// Points for the first correct answer to an exercise.
pub const BASE_POINTS: u32 = 10;

/// Extra points when that first correct answer comes quickly.
pub const SPEED_BONUS_POINTS: u32 = 5;

/// Answers strictly faster than this earn [`SPEED_BONUS_POINTS`].
pub const SPEED_BONUS_WINDOW: Duration = Duration::from_millis(20_000);

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A transition that is not valid from the session's current state.
///
/// The session is left untouched whenever one of these is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("expected {expected} phase, session is in {actual}")]
    WrongPhase {
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("already at the first step")]
    AtFirstStep,

    #[error("session is finished")]
    Finished,

    #[error("step {step} is outside the {len} available items")]
    StepOutOfRange { step: usize, len: usize },
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of answering the current exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub exercise_id: ExerciseId,
    pub correct: bool,
    /// Zero unless this was the first correct answer to the exercise.
    pub points_awarded: u32,
    /// True when this answer finished the session.
    pub completed: bool,
}

/// What a successful transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved within the current phase.
    Stepped { phase: SessionPhase, step: usize },
    /// Left the flashcards and started the exercises.
    EnteredExercises,
    Answered(AnswerOutcome),
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Drives a [`StudySession`] through `learning → exercise → summary`.
///
/// Holds the session together with its exercise list, regenerated from the
/// session's seed so that `current_step` always indexes the same items.
#[derive(Clone)]
pub struct SessionMachine {
    session: StudySession,
    exercises: Vec<ExerciseQuestion>,
}

impl SessionMachine {
    #[must_use]
    pub fn new(session: StudySession) -> Self {
        let exercises =
            generate_exercises_seeded(&session.words, session.mode, session.exercise_seed);
        Self { session, exercises }
    }

    #[must_use]
    pub fn session(&self) -> &StudySession {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> StudySession {
        self.session
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExerciseQuestion] {
        &self.exercises
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.session.words.len()
    }

    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    /// Flashcard under study, in the learning phase.
    #[must_use]
    pub fn current_word(&self) -> Option<&WordEntry> {
        match self.session.phase {
            SessionPhase::Learning => self.session.words.get(self.session.current_step),
            _ => None,
        }
    }

    /// Exercise awaiting an answer, in the exercise phase.
    #[must_use]
    pub fn current_exercise(&self) -> Option<&ExerciseQuestion> {
        match self.session.phase {
            SessionPhase::Exercise => self.exercises.get(self.session.current_step),
            _ => None,
        }
    }

    /// Source word of an exercise.
    #[must_use]
    pub fn word_for(&self, exercise: &ExerciseQuestion) -> Option<&WordEntry> {
        self.session
            .words
            .iter()
            .find(|w| &w.id == exercise.word_id())
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(
            self.session.score,
            self.session.solved_count(),
            self.exercise_count(),
        )
    }

    /// Step back one item within the current phase.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Finished` in the summary phase and
    /// `TransitionError::AtFirstStep` at step zero.
    pub fn prev(&mut self) -> Result<Transition, TransitionError> {
        if self.session.phase == SessionPhase::Summary {
            return Err(TransitionError::Finished);
        }
        if self.session.current_step == 0 {
            return Err(TransitionError::AtFirstStep);
        }
        self.session.current_step -= 1;
        Ok(Transition::Stepped {
            phase: self.session.phase,
            step: self.session.current_step,
        })
    }

    /// Move to the next flashcard, or into the exercises after the last one.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::WrongPhase` outside the learning phase.
    pub fn next_word(&mut self) -> Result<Transition, TransitionError> {
        self.expect_phase(SessionPhase::Learning)?;

        let word_count = self.word_count();
        let next = self.session.current_step + 1;
        if next < word_count {
            let session = &mut self.session;
            session.current_step = next;
            session.high_water = session.high_water.max(next);
            session.progress = progress::advance(
                session.progress,
                progress::learning_progress(session.high_water, word_count, self.exercises.len()),
            );
            return Ok(Transition::Stepped {
                phase: SessionPhase::Learning,
                step: next,
            });
        }

        let session = &mut self.session;
        session.phase = SessionPhase::Exercise;
        session.current_step = 0;
        session.high_water = 0;
        session.progress = progress::advance(session.progress, progress::EXERCISE_PHASE_START);
        Ok(Transition::EnteredExercises)
    }

    /// Record an answer to the current exercise and move on.
    ///
    /// Only the first correct answer to a given exercise scores; revisiting it
    /// after `prev` awards nothing further. Answering the last exercise ends the
    /// session whether or not the answer was right.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::WrongPhase` outside the exercise phase and
    /// `TransitionError::StepOutOfRange` if the step does not index an exercise.
    pub fn answer(
        &mut self,
        correct: bool,
        elapsed: Duration,
    ) -> Result<Transition, TransitionError> {
        self.expect_phase(SessionPhase::Exercise)?;

        let count = self.exercises.len();
        let step = self.session.current_step;
        let exercise_id = self
            .exercises
            .get(step)
            .map(|e| e.id().clone())
            .ok_or(TransitionError::StepOutOfRange { step, len: count })?;

        let session = &mut self.session;
        let mut points = 0;
        if correct && !session.is_solved(&exercise_id) {
            points = BASE_POINTS;
            if elapsed < SPEED_BONUS_WINDOW {
                points += SPEED_BONUS_POINTS;
            }
            session.score = session.score.saturating_add(points);
        }
        if correct {
            session.exercise_results.insert(exercise_id.clone(), true);
        }

        let next = step + 1;
        let completed = next >= count;
        if completed {
            session.current_step = count;
            session.phase = SessionPhase::Summary;
            session.progress = progress::COMPLETE;
            session.completed = true;
        } else {
            session.current_step = next;
            session.progress =
                progress::advance(session.progress, progress::exercise_progress(next, count));
        }

        Ok(Transition::Answered(AnswerOutcome {
            exercise_id,
            correct,
            points_awarded: points,
            completed,
        }))
    }

    /// Grade `response` against the current exercise, then [`answer`](Self::answer).
    ///
    /// # Errors
    ///
    /// Same as [`answer`](Self::answer).
    pub fn submit(
        &mut self,
        response: &str,
        elapsed: Duration,
    ) -> Result<Transition, TransitionError> {
        self.expect_phase(SessionPhase::Exercise)?;
        let step = self.session.current_step;
        let correct = self
            .exercises
            .get(step)
            .ok_or(TransitionError::StepOutOfRange {
                step,
                len: self.exercises.len(),
            })?
            .grade(response);
        self.answer(correct, elapsed)
    }

    fn expect_phase(&self, expected: SessionPhase) -> Result<(), TransitionError> {
        match self.session.phase {
            actual if actual == expected => Ok(()),
            SessionPhase::Summary => Err(TransitionError::Finished),
            actual => Err(TransitionError::WrongPhase { expected, actual }),
        }
    }
}

impl fmt::Debug for SessionMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionMachine")
            .field("session_id", &self.session.id)
            .field("phase", &self.session.phase)
            .field("current_step", &self.session.current_step)
            .field("words_len", &self.session.words.len())
            .field("exercises_len", &self.exercises.len())
            .field("score", &self.session.score)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
