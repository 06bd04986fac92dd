use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Study mode chosen at session setup; shapes which exercise variants are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyMode {
    #[default]
    #[serde(alias = "Từ vựng")]
    Vocabulary,
    #[serde(alias = "Từ đồng nghĩa")]
    Synonyms,
    #[serde(alias = "Từ trái nghĩa")]
    Antonyms,
    #[serde(alias = "Cụm động từ")]
    PhrasalVerbs,
}

impl StudyMode {
    pub const ALL: [StudyMode; 4] = [
        StudyMode::Vocabulary,
        StudyMode::Synonyms,
        StudyMode::Antonyms,
        StudyMode::PhrasalVerbs,
    ];

    /// True for the modes where words carry a synonym/antonym counterpart.
    #[must_use]
    pub fn uses_related_terms(self) -> bool {
        matches!(self, StudyMode::Synonyms | StudyMode::Antonyms)
    }

    /// Display label shown to learners.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StudyMode::Vocabulary => "Từ vựng",
            StudyMode::Synonyms => "Từ đồng nghĩa",
            StudyMode::Antonyms => "Từ trái nghĩa",
            StudyMode::PhrasalVerbs => "Cụm động từ",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StudyMode::Vocabulary => "vocabulary",
            StudyMode::Synonyms => "synonyms",
            StudyMode::Antonyms => "antonyms",
            StudyMode::PhrasalVerbs => "phrasal-verbs",
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown study mode: {0}")]
pub struct ParseStudyModeError(String);

impl FromStr for StudyMode {
    type Err = ParseStudyModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vocabulary" | "vocab" => Ok(StudyMode::Vocabulary),
            "synonyms" | "synonym" => Ok(StudyMode::Synonyms),
            "antonyms" | "antonym" => Ok(StudyMode::Antonyms),
            "phrasal-verbs" | "phrasal_verbs" | "phrasal" => Ok(StudyMode::PhrasalVerbs),
            other => Err(ParseStudyModeError(other.to_string())),
        }
    }
}
