use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{StudyMode, WordId};

//
// ─── WORD ENTRY ────────────────────────────────────────────────────────────────
//

/// One generated vocabulary item.
///
/// Field names on the wire match the JSON produced by the content service.
/// Optional strings that arrive empty are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: WordId,
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub phonetic: String,
    pub example_en: String,
    #[serde(default)]
    pub example_vn: String,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub related_term: Option<String>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub related_meaning: Option<String>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub quiz_sentence: Option<String>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub quiz_sentence_meaning: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl WordEntry {
    /// Minimal entry: id, headword, meaning, and an example sentence with its translation.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        word: impl Into<String>,
        meaning: impl Into<String>,
        example_en: impl Into<String>,
        example_vn: impl Into<String>,
    ) -> Self {
        Self {
            id: WordId::new(id),
            word: word.into(),
            meaning: meaning.into(),
            pos: String::new(),
            phonetic: String::new(),
            example_en: example_en.into(),
            example_vn: example_vn.into(),
            related_term: None,
            related_meaning: None,
            quiz_sentence: None,
            quiz_sentence_meaning: None,
        }
    }

    #[must_use]
    pub fn with_related(mut self, term: impl Into<String>, meaning: Option<String>) -> Self {
        self.related_term = Some(term.into());
        self.related_meaning = meaning;
        self
    }

    #[must_use]
    pub fn with_quiz_sentence(
        mut self,
        sentence: impl Into<String>,
        translation: Option<String>,
    ) -> Self {
        self.quiz_sentence = Some(sentence.into());
        self.quiz_sentence_meaning = translation;
        self
    }

    #[must_use]
    pub fn with_details(mut self, pos: impl Into<String>, phonetic: impl Into<String>) -> Self {
        self.pos = pos.into();
        self.phonetic = phonetic.into();
        self
    }

    /// The synonym/antonym counterpart, if the generator supplied one.
    #[must_use]
    pub fn related_term(&self) -> Option<&str> {
        self.related_term.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Meaning of the related term, falling back to the headword's meaning.
    #[must_use]
    pub fn resolve_related_meaning(&self) -> &str {
        self.related_meaning
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.meaning)
    }

    /// Related term when the mode tests it, otherwise the headword.
    #[must_use]
    pub fn quiz_target(&self, mode: StudyMode) -> &str {
        match self.related_term() {
            Some(term) if mode.uses_related_terms() => term,
            _ => &self.word,
        }
    }

    /// Sentence used for fill-in-the-blank items.
    #[must_use]
    pub fn quiz_source(&self) -> &str {
        self.quiz_sentence
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.example_en)
    }

    #[must_use]
    pub fn quiz_translation(&self) -> Option<&str> {
        self.quiz_sentence_meaning
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Check that the required fields carry text.
    ///
    /// # Errors
    ///
    /// Returns `WordError` naming the first empty required field.
    pub fn validate(&self) -> Result<(), WordError> {
        if self.id.as_str().trim().is_empty() {
            return Err(WordError::EmptyId);
        }
        if self.word.trim().is_empty() {
            return Err(WordError::EmptyField {
                id: self.id.clone(),
                field: "word",
            });
        }
        if self.meaning.trim().is_empty() {
            return Err(WordError::EmptyField {
                id: self.id.clone(),
                field: "meaning",
            });
        }
        if self.example_en.trim().is_empty() {
            return Err(WordError::EmptyField {
                id: self.id.clone(),
                field: "exampleEn",
            });
        }
        Ok(())
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word id must not be empty")]
    EmptyId,

    #[error("word {id} has an empty {field}")]
    EmptyField { id: WordId, field: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordListError {
    #[error("word list is empty")]
    Empty,

    #[error("duplicate word id: {0}")]
    DuplicateId(WordId),

    #[error(transparent)]
    Word(#[from] WordError),
}

/// Validate a session's word list: non-empty, valid entries, unique ids.
///
/// # Errors
///
/// Returns `WordListError` describing the first problem found.
pub fn validate_word_list(words: &[WordEntry]) -> Result<(), WordListError> {
    if words.is_empty() {
        return Err(WordListError::Empty);
    }
    let mut seen = HashSet::with_capacity(words.len());
    for word in words {
        word.validate()?;
        if !seen.insert(&word.id) {
            return Err(WordListError::DuplicateId(word.id.clone()));
        }
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
