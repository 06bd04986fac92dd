mod client;
mod speech;
mod vocabulary;

pub use client::{AiContentConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SPEECH_MODEL, DEFAULT_VOICE};
pub use speech::AiSpeechClient;
pub use vocabulary::{
    AiContentClient, VocabularySource, clean_json, dictionary_prompt, parse_dictionary_entry,
    parse_word_list, vocabulary_prompt,
};

pub(crate) use vocabulary::ensure_unique_ids;
