use async_trait::async_trait;
use serde::Serialize;

use super::client::{AiContentConfig, ChatClient};
use crate::audio::{AudioClip, SpeechSynthesizer};
use crate::error::ContentError;

/// Text-to-speech over the `audio/speech` endpoint, requesting raw PCM.
#[derive(Clone)]
pub struct AiSpeechClient {
    chat: ChatClient,
}

impl AiSpeechClient {
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
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'static str,
}

#[async_trait]
impl SpeechSynthesizer for AiSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ContentError> {
        let config = self.chat.config()?;
        let payload = SpeechRequest {
            model: &config.speech_model,
            voice: &config.voice,
            input: text,
            response_format: "pcm",
        };

        let response = self
            .chat
            .http()
            .post(config.endpoint("audio/speech"))
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ContentError::EmptyResponse);
        }
        Ok(AudioClip::from_pcm(bytes.to_vec()))
    }
}
