use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SPEECH_MODEL: &str = "gpt-4o-mini-tts";
pub const DEFAULT_VOICE: &str = "alloy";

/// Connection settings for an OpenAI-compatible API.
#[derive(Clone, Debug)]
pub struct AiContentConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub speech_model: String,
    pub voice: String,
}

impl AiContentConfig {
    /// Settings with the default endpoint and models.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            speech_model: DEFAULT_SPEECH_MODEL.into(),
            voice: DEFAULT_VOICE.into(),
        }
    }

    /// Read `LINGO_AI_*` variables. `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LINGO_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("LINGO_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("LINGO_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let speech_model =
            env::var("LINGO_AI_SPEECH_MODEL").unwrap_or_else(|_| DEFAULT_SPEECH_MODEL.into());
        let voice = env::var("LINGO_AI_VOICE").unwrap_or_else(|_| DEFAULT_VOICE.into());
        Some(Self {
            base_url,
            api_key,
            model,
            speech_model,
            voice,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Thin chat-completions client shared by the content features.
#[derive(Clone)]
pub(crate) struct ChatClient {
    http: Client,
    config: Option<AiContentConfig>,
}

impl ChatClient {
    pub(crate) fn new(config: Option<AiContentConfig>) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.config.is_some()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn config(&self) -> Result<&AiContentConfig, ContentError> {
        self.config.as_ref().ok_or(ContentError::Disabled)
    }

    /// Send one user message asking for a JSON object and return the reply text.
    pub(crate) async fn complete_json(&self, prompt: &str) -> Result<String, ContentError> {
        let config = self.config()?;

        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.7,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(config.endpoint("chat/completions"))
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ContentError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
