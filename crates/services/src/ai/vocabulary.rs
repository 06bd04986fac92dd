use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use lingo_core::model::{StudyMode, WordEntry, WordId};
use serde::Deserialize;
use serde_json::Value;

use super::client::{AiContentConfig, ChatClient};
use crate::error::ContentError;

/// Source of generated vocabulary.
///
/// Failures never surface here: an empty list or `None` means nothing usable
/// came back, and the implementation logs why.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    async fn generate_vocabulary_list(
        &self,
        topic: &str,
        level: &str,
        count: usize,
        mode: StudyMode,
    ) -> Vec<WordEntry>;

    async fn lookup_dictionary(&self, term: &str) -> Option<WordEntry>;
}

//
// ─── PROMPTS ───────────────────────────────────────────────────────────────────
//

const WORD_FIELDS: &str = "
YÊU CẦU CẤU TRÚC JSON NGHIÊM NGẶT:
1. 'id': string (unique).
2. 'word': string (Từ vựng chính).
3. 'meaning': string (Nghĩa tiếng Việt ngắn gọn của 'word').
4. 'pos': string (Từ loại: Noun, Verb, Adj...).
5. 'phonetic': string (Phiên âm IPA).
6. 'exampleEn': string (Câu ví dụ chứa 'word').
7. 'exampleVn': string (Dịch câu ví dụ trên).
8. 'relatedTerm': string (Bắt buộc nếu là Đồng nghĩa/Trái nghĩa, nếu không thì null).
9. 'relatedMeaning': string (Nghĩa tiếng Việt của relatedTerm).
10. 'quizSentence': string (Một câu bài tập điền từ KHÁC HOÀN TOÀN với 'exampleEn'. Phải chứa 'relatedTerm' nếu là chế độ Syn/Ant, hoặc chứa 'word' nếu là chế độ thường).
11. 'quizSentenceMeaning': string (Dịch nghĩa tiếng Việt của 'quizSentence' để hiện thị sau khi làm bài).
";

/// Prompt asking for `count` words on `topic` at `level`, tailored to `mode`.
#[must_use]
pub fn vocabulary_prompt(topic: &str, level: &str, count: usize, mode: StudyMode) -> String {
    let mut prompt = format!(
        "Bạn là chuyên gia ngôn ngữ AI. Hãy tạo danh sách JSON gồm {count} từ vựng tiếng Anh về chủ đề '{topic}' ở trình độ '{level}'."
    );

    match mode {
        StudyMode::Synonyms => prompt.push_str(
            " CHẾ ĐỘ TỪ ĐỒNG NGHĨA: Với mỗi mục, cung cấp từ gốc (word) và 1 từ đồng nghĩa chính xác (relatedTerm). Cung cấp nghĩa tiếng Việt của relatedTerm trong trường 'relatedMeaning'.",
        ),
        StudyMode::Antonyms => prompt.push_str(
            " CHẾ ĐỘ TỪ TRÁI NGHĨA: Với mỗi mục, cung cấp từ gốc (word) và 1 từ trái nghĩa chính xác (relatedTerm). Cung cấp nghĩa tiếng Việt của relatedTerm trong trường 'relatedMeaning'.",
        ),
        StudyMode::PhrasalVerbs => {
            prompt.push_str(" CHẾ ĐỘ CỤM ĐỘNG TỪ: Các từ (word) bắt buộc phải là phrasal verbs.");
        }
        StudyMode::Vocabulary => {}
    }

    prompt.push_str(WORD_FIELDS);
    prompt.push_str(
        "\nTrả về một JSON object dạng {\"words\": [...]} chứa mảng các mục trên. Đảm bảo nội dung chính xác, mang tính học thuật cao.",
    );
    prompt
}

/// Prompt for a single dictionary entry.
#[must_use]
pub fn dictionary_prompt(term: &str) -> String {
    format!(
        "Tra từ điển chi tiết cho: \"{term}\".\nCung cấp: Nghĩa tiếng Việt, từ loại, phiên âm, ví dụ (Anh/Việt), từ liên quan (nếu có).\nDùng các trường: word, meaning, pos, phonetic, exampleEn, exampleVn, relatedTerm, relatedMeaning.\nTrả về JSON object."
    )
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

/// Strip a surrounding Markdown code fence (with or without a `json` tag).
#[must_use]
pub fn clean_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim_end()
}

/// Loosely-typed item as the model returns it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WordDraft {
    id: Option<Value>,
    word: Option<String>,
    meaning: Option<String>,
    pos: Option<String>,
    phonetic: Option<String>,
    example_en: Option<String>,
    example_vn: Option<String>,
    related_term: Option<String>,
    related_meaning: Option<String>,
    quiz_sentence: Option<String>,
    quiz_sentence_meaning: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn draft_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_blank(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl WordDraft {
    /// Build an entry, or `None` when a required field is missing.
    fn into_entry(self, id: String) -> Option<WordEntry> {
        let word = non_blank(self.word)?;
        let meaning = non_blank(self.meaning)?;
        let example_en = non_blank(self.example_en)?;
        let mut entry = WordEntry::new(
            id,
            word,
            meaning,
            example_en,
            non_blank(self.example_vn).unwrap_or_default(),
        )
        .with_details(
            non_blank(self.pos).unwrap_or_default(),
            non_blank(self.phonetic).unwrap_or_default(),
        );
        if let Some(term) = non_blank(self.related_term) {
            entry = entry.with_related(term, non_blank(self.related_meaning));
        }
        if let Some(sentence) = non_blank(self.quiz_sentence) {
            entry = entry.with_quiz_sentence(sentence, non_blank(self.quiz_sentence_meaning));
        }
        entry.validate().ok()?;
        Some(entry)
    }
}

/// Locate the word array: a bare array, or the first array inside an object.
fn word_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("words") {
            Some(Value::Array(items)) => items,
            _ => map
                .into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default(),
        },
        _ => Vec::new(),
    }
}

/// Parse a generated word list.
///
/// Items missing a headword, meaning or example are dropped. Missing or
/// repeated ids are replaced with `word-{n}`.
///
/// # Errors
///
/// Returns `ContentError::Malformed` if the text is not JSON.
pub fn parse_word_list(text: &str) -> Result<Vec<WordEntry>, ContentError> {
    let value: Value = serde_json::from_str(clean_json(text))?;
    let mut seen = HashSet::new();
    let mut words = Vec::new();

    for (index, item) in word_array(value).into_iter().enumerate() {
        let draft: WordDraft = match serde_json::from_value(item) {
            Ok(draft) => draft,
            Err(err) => {
                tracing::debug!(index, error = %err, "dropping malformed word item");
                continue;
            }
        };
        let id = draft_id(draft.id.as_ref())
            .filter(|id| !seen.contains(id))
            .unwrap_or_else(|| format!("word-{}", index + 1));
        if seen.contains(&id) {
            tracing::debug!(index, "dropping word with unresolvable duplicate id");
            continue;
        }
        match draft.into_entry(id.clone()) {
            Some(entry) => {
                seen.insert(id);
                words.push(entry);
            }
            None => tracing::debug!(index, "dropping incomplete word item"),
        }
    }

    Ok(words)
}

/// Parse a dictionary entry and give it `id`.
///
/// # Errors
///
/// Returns `ContentError::Malformed` if the text is not JSON.
pub fn parse_dictionary_entry(text: &str, id: &str) -> Result<Option<WordEntry>, ContentError> {
    let value: Value = serde_json::from_str(clean_json(text))?;
    let draft: WordDraft = serde_json::from_value(value)?;
    Ok(draft.into_entry(id.to_string()))
}

//
// ─── CLIENT ────────────────────────────────────────────────────────────────────
//

/// Vocabulary generation over an OpenAI-compatible chat endpoint.
#[derive(Clone)]
pub struct AiContentClient {
    chat: ChatClient,
}

impl AiContentClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AiContentConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AiContentConfig>) -> Self {
        Self {
            chat: ChatClient::new(config),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.chat.enabled()
    }

    /// Generate a word list.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the client is disabled, the request fails,
    /// or the reply is not JSON.
    pub async fn generate_words(
        &self,
        topic: &str,
        level: &str,
        count: usize,
        mode: StudyMode,
    ) -> Result<Vec<WordEntry>, ContentError> {
        let prompt = vocabulary_prompt(topic, level, count, mode);
        let reply = self.chat.complete_json(&prompt).await?;
        let words = parse_word_list(&reply)?;
        tracing::info!(topic, level, requested = count, received = words.len(), mode = %mode, "generated vocabulary");
        Ok(words)
    }

    /// Look up a single term.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the client is disabled, the request fails,
    /// or the reply is not JSON.
    pub async fn lookup(&self, term: &str) -> Result<Option<WordEntry>, ContentError> {
        let reply = self.chat.complete_json(&dictionary_prompt(term)).await?;
        let id = format!("dict-{}", Utc::now().timestamp_millis());
        parse_dictionary_entry(&reply, &id)
    }
}

#[async_trait]
impl VocabularySource for AiContentClient {
    async fn generate_vocabulary_list(
        &self,
        topic: &str,
        level: &str,
        count: usize,
        mode: StudyMode,
    ) -> Vec<WordEntry> {
        match self.generate_words(topic, level, count, mode).await {
            Ok(words) => words,
            Err(err) => {
                tracing::error!(error = %err, topic, "vocabulary generation failed");
                Vec::new()
            }
        }
    }

    async fn lookup_dictionary(&self, term: &str) -> Option<WordEntry> {
        match self.lookup(term).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::error!(error = %err, term, "dictionary lookup failed");
                None
            }
        }
    }
}

/// Re-derive ids so they are unique within a list.
pub(crate) fn ensure_unique_ids(words: &mut [WordEntry]) {
    let mut seen = HashSet::new();
    for (index, word) in words.iter_mut().enumerate() {
        if !seen.insert(word.id.as_str().to_string()) {
            let fresh = format!("word-{}-{}", index + 1, word.id);
            word.id = WordId::new(fresh.clone());
            seen.insert(fresh);
        }
    }
}
