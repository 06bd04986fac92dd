use serde::Serialize;
use std::fmt;

use crate::grading::check_similarity;
use crate::model::{ExerciseId, WordId};

/// Kind of practice item derived from a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    MatchMeaning,
    ListenSelect,
    FillBlankChoice,
    FillBlankInput,
    Translate,
}

impl ExerciseKind {
    /// Whether items of this kind are answered by picking one of four options.
    #[must_use]
    pub fn is_multiple_choice(self) -> bool {
        matches!(
            self,
            ExerciseKind::MatchMeaning | ExerciseKind::ListenSelect | ExerciseKind::FillBlankChoice
        )
    }

    /// Display label shown to learners.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExerciseKind::MatchMeaning => "Ghép nghĩa",
            ExerciseKind::ListenSelect => "Nghe & Chọn",
            ExerciseKind::FillBlankChoice => "Điền từ (Trắc nghiệm)",
            ExerciseKind::FillBlankInput => "Điền từ (Gõ phím)",
            ExerciseKind::Translate => "Dịch câu",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One derived practice item.
///
/// Built by the exercise generator; when `options` is present it always contains
/// `correct_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseQuestion {
    id: ExerciseId,
    word_id: WordId,
    kind: ExerciseKind,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_context: Option<String>,
    explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_translation: Option<String>,
}

impl ExerciseQuestion {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ExerciseId,
        word_id: WordId,
        kind: ExerciseKind,
        prompt: String,
        options: Option<Vec<String>>,
        correct_answer: String,
        audio_context: Option<String>,
        explanation: String,
        prompt_translation: Option<String>,
    ) -> Self {
        debug_assert!(
            options
                .as_ref()
                .is_none_or(|opts| opts.contains(&correct_answer)),
            "options must contain the correct answer"
        );
        Self {
            id,
            word_id,
            kind,
            prompt,
            options,
            correct_answer,
            audio_context,
            explanation,
            prompt_translation,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn word_id(&self) -> &WordId {
        &self.word_id
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Text to speak for listening items.
    #[must_use]
    pub fn audio_context(&self) -> Option<&str> {
        self.audio_context.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn prompt_translation(&self) -> Option<&str> {
        self.prompt_translation.as_deref()
    }

    /// Grade a learner response.
    ///
    /// Option items need the exact option text; free-text items go through
    /// [`check_similarity`].
    #[must_use]
    pub fn grade(&self, response: &str) -> bool {
        if self.options.is_some() {
            response == self.correct_answer
        } else {
            check_similarity(response, &self.correct_answer)
        }
    }
}
