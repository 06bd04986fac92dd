//! Completion percentage across the learning and exercise phases.
//!
//! Every function here is pure; the state machine folds results through
//! [`advance`] so the stored value never goes down.

/// Progress recorded when the learner leaves the flashcards.
pub const EXERCISE_PHASE_START: f64 = 50.0;

/// Progress of a finished session.
pub const COMPLETE: f64 = 100.0;

/// Progress while flipping flashcards.
///
/// Measured against the whole session (`word_count + exercise_count` steps), so
/// it stays well below [`EXERCISE_PHASE_START`].
#[must_use]
pub fn learning_progress(high_water: usize, word_count: usize, exercise_count: usize) -> f64 {
    let total = word_count + exercise_count;
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = high_water as f64 / total as f64 * 100.0;
    pct.clamp(0.0, COMPLETE)
}

/// Progress after `answered` of `exercise_count` exercises.
#[must_use]
pub fn exercise_progress(answered: usize, exercise_count: usize) -> f64 {
    if exercise_count == 0 {
        return EXERCISE_PHASE_START;
    }
    #[allow(clippy::cast_precision_loss)]
    let share = answered as f64 / exercise_count as f64;
    (EXERCISE_PHASE_START + share * (COMPLETE - EXERCISE_PHASE_START)).clamp(0.0, COMPLETE)
}

/// Fold a freshly computed value into the stored one without regressing.
#[must_use]
pub fn advance(previous: f64, fresh: f64) -> f64 {
    previous.max(fresh)
}
