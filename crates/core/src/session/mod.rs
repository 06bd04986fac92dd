//! Session state machine: flashcards, then exercises, then the summary.

mod machine;

pub use machine::{
    AnswerOutcome, BASE_POINTS, SPEED_BONUS_POINTS, SPEED_BONUS_WINDOW, SessionMachine,
    Transition, TransitionError,
};
