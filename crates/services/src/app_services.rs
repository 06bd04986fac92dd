use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::ai::{AiContentClient, AiContentConfig, AiSpeechClient, VocabularySource};
use crate::audio::AudioCache;
use crate::error::AppServicesError;
use crate::sessions::StudySessionService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    study: Arc<StudySessionService>,
    content: Arc<AiContentClient>,
    audio: Option<AudioCache>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        ai: Option<AiContentConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, ai))
    }

    /// Build services over an existing storage aggregate.
    ///
    /// Audio is only wired when an AI configuration is present.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, ai: Option<AiContentConfig>) -> Self {
        let content = Arc::new(AiContentClient::new(ai.clone()));
        let audio = ai.map(|config| {
            AudioCache::in_memory(Arc::new(AiSpeechClient::new(Some(config))))
        });

        let vocabulary: Arc<dyn VocabularySource> = content.clone();
        let mut study = StudySessionService::new(clock, Arc::clone(&storage.sessions), vocabulary);
        if let Some(cache) = &audio {
            study = study.with_audio(cache.clone());
        }

        Self {
            study: Arc::new(study),
            content,
            audio,
        }
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudySessionService> {
        Arc::clone(&self.study)
    }

    #[must_use]
    pub fn content(&self) -> Arc<AiContentClient> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn audio(&self) -> Option<&AudioCache> {
        self.audio.as_ref()
    }

    #[must_use]
    pub fn content_enabled(&self) -> bool {
        self.content.enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_ai_config_audio_is_off() {
        let services = AppServices::from_storage(&Storage::in_memory(), Clock::default(), None);
        assert!(!services.content_enabled());
        assert!(services.audio().is_none());
        assert!(services.study().audio().is_none());
    }

    #[test]
    fn with_ai_config_audio_is_wired() {
        let config = AiContentConfig::new("test-key");
        let services =
            AppServices::from_storage(&Storage::in_memory(), Clock::default(), Some(config));
        assert!(services.content_enabled());
        assert!(services.study().audio().is_some());
    }
}
