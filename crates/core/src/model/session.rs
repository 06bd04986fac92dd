use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{
    ExerciseId, SessionId, StudyMode, UserId, WordEntry, WordListError, validate_word_list,
};

/// Phase of a study session. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Learning,
    Exercise,
    Summary,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPhase::Learning => "learning",
            SessionPhase::Exercise => "exercise",
            SessionPhase::Summary => "summary",
        })
    }
}

/// Persisted study session: the aggregate mutated by the session state machine.
///
/// The exercise list itself is not stored. It is regenerated from `words`,
/// `mode` and `exercise_seed`, which yields the same list on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub(crate) id: SessionId,
    pub(crate) user_id: UserId,
    pub(crate) topic: String,
    pub(crate) level: String,
    pub(crate) mode: StudyMode,
    pub(crate) total_words: usize,
    pub(crate) progress: f64,
    pub(crate) score: u32,
    pub(crate) completed: bool,
    #[serde(rename = "date")]
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) words: Vec<WordEntry>,
    pub(crate) current_step: usize,
    #[serde(default, rename = "maxStepReached")]
    pub(crate) high_water: usize,
    pub(crate) phase: SessionPhase,
    #[serde(default)]
    pub(crate) exercise_results: BTreeMap<ExerciseId, bool>,
    #[serde(default)]
    pub(crate) exercise_seed: u64,
}

impl StudySession {
    /// Start a new session in the learning phase.
    ///
    /// # Errors
    ///
    /// Returns `WordListError` if the list is empty, has invalid entries or repeats ids.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SessionId,
        user_id: UserId,
        topic: impl Into<String>,
        level: impl Into<String>,
        mode: StudyMode,
        words: Vec<WordEntry>,
        created_at: DateTime<Utc>,
        exercise_seed: u64,
    ) -> Result<Self, WordListError> {
        validate_word_list(&words)?;
        Ok(Self {
            id,
            user_id,
            topic: topic.into(),
            level: level.into(),
            mode,
            total_words: words.len(),
            progress: 0.0,
            score: 0,
            completed: false,
            created_at,
            words,
            current_step: 0,
            high_water: 0,
            phase: SessionPhase::Learning,
            exercise_results: BTreeMap::new(),
            exercise_seed,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    #[must_use]
    pub fn total_words(&self) -> usize {
        self.total_words
    }

    /// Completion percentage in `0.0..=100.0`; never decreases.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn exercise_results(&self) -> &BTreeMap<ExerciseId, bool> {
        &self.exercise_results
    }

    #[must_use]
    pub fn exercise_seed(&self) -> u64 {
        self.exercise_seed
    }

    /// Whether `exercise` has been answered correctly at least once.
    #[must_use]
    pub fn is_solved(&self, exercise: &ExerciseId) -> bool {
        self.exercise_results.get(exercise).copied().unwrap_or(false)
    }

    /// Number of exercises answered correctly at least once.
    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.exercise_results.values().filter(|v| **v).count()
    }
}

/// End-of-session figures shown on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub score: u32,
    pub correct: usize,
    pub total_exercises: usize,
    /// Rounded share of exercises solved, `0..=100`.
    pub accuracy: u32,
}

impl SessionSummary {
    #[must_use]
    pub fn new(score: u32, correct: usize, total_exercises: usize) -> Self {
        let accuracy = if total_exercises == 0 {
            0
        } else {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let pct = ((correct as f64 / total_exercises as f64) * 100.0).round() as u32;
            pct.min(100)
        };
        Self {
            score,
            correct,
            total_exercises,
            accuracy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn words() -> Vec<WordEntry> {
        vec![
            WordEntry::new("w1", "apple", "quả táo", "An apple a day.", "Mỗi ngày một quả táo."),
            WordEntry::new("w2", "river", "dòng sông", "The river is wide.", "Dòng sông rộng."),
        ]
    }

    fn session() -> StudySession {
        StudySession::new(
            SessionId::generate(),
            UserId::new("u1"),
            "Nature",
            "A2",
            StudyMode::Vocabulary,
            words(),
            fixed_now(),
            7,
        )
        .unwrap()
    }

    #[test]
    fn new_session_starts_in_learning_at_zero() {
        let s = session();
        assert_eq!(s.phase(), SessionPhase::Learning);
        assert_eq!(s.current_step(), 0);
        assert_eq!(s.high_water(), 0);
        assert_eq!(s.score(), 0);
        assert!(s.progress().abs() < f64::EPSILON);
        assert!(!s.is_completed());
        assert_eq!(s.total_words(), 2);
        assert!(s.is_owned_by(&UserId::new("u1")));
        assert!(!s.is_owned_by(&UserId::new("u2")));
    }

    #[test]
    fn empty_word_list_is_rejected() {
        let err = StudySession::new(
            SessionId::generate(),
            UserId::new("u1"),
            "t",
            "l",
            StudyMode::Vocabulary,
            Vec::new(),
            fixed_now(),
            0,
        )
        .unwrap_err();
        assert_eq!(err, WordListError::Empty);
    }

    #[test]
    fn json_uses_persisted_field_names() {
        let s = session();
        let value = serde_json::to_value(&s).unwrap();
        for key in [
            "id",
            "userId",
            "date",
            "currentStep",
            "maxStepReached",
            "exerciseResults",
            "exerciseSeed",
            "totalWords",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["phase"], "learning");

        let back: StudySession = serde_json::from_value(value).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn summary_accuracy_rounds_and_handles_zero() {
        assert_eq!(SessionSummary::new(30, 2, 3).accuracy, 67);
        assert_eq!(SessionSummary::new(0, 0, 0).accuracy, 0);
        assert_eq!(SessionSummary::new(150, 10, 10).accuracy, 100);
    }
}
