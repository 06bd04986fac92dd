use std::sync::Arc;

use rand::Rng;

use lingo_core::model::{
    ExerciseKind, SessionId, SessionPhase, StudyMode, StudySession, UserId, WordEntry,
};
use lingo_core::session::{SessionMachine, Transition, TransitionError};
use storage::repository::SessionRepository;

use super::active::ActiveSession;
use crate::Clock;
use crate::ai::{VocabularySource, ensure_unique_ids};
use crate::audio::AudioCache;
use crate::error::SessionError;

pub const MIN_WORDS: usize = 3;
pub const MAX_WORDS: usize = 50;
pub const DEFAULT_WORDS: usize = 10;

/// What the learner asked for on the setup screen.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub user: UserId,
    pub topic: String,
    pub level: String,
    pub word_count: usize,
    pub mode: StudyMode,
}

impl SessionRequest {
    #[must_use]
    pub fn new(user: UserId, topic: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            user,
            topic: topic.into(),
            level: level.into(),
            word_count: DEFAULT_WORDS,
            mode: StudyMode::default(),
        }
    }

    #[must_use]
    pub fn with_word_count(mut self, word_count: usize) -> Self {
        self.word_count = word_count;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: StudyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Requested count clamped to `MIN_WORDS..=MAX_WORDS`.
    #[must_use]
    pub fn clamped_word_count(&self) -> usize {
        self.word_count.clamp(MIN_WORDS, MAX_WORDS)
    }
}

/// Orchestrates session creation, loading and persisted transitions.
///
/// Every successful transition writes the session back before returning.
#[derive(Clone)]
pub struct StudySessionService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    vocabulary: Arc<dyn VocabularySource>,
    audio: Option<AudioCache>,
}

impl StudySessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        vocabulary: Arc<dyn VocabularySource>,
    ) -> Self {
        Self {
            clock,
            sessions,
            vocabulary,
            audio: None,
        }
    }

    /// Prefetch pronunciation audio through `cache` when sessions load.
    #[must_use]
    pub fn with_audio(mut self, cache: AudioCache) -> Self {
        self.audio = Some(cache);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn audio(&self) -> Option<&AudioCache> {
        self.audio.as_ref()
    }

    /// Generate words for `request` and persist a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::GenerationFailed` if no words came back, and
    /// `SessionError::Storage` if the session cannot be saved.
    pub async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<ActiveSession, SessionError> {
        let count = request.clamped_word_count();
        let mut words = self
            .vocabulary
            .generate_vocabulary_list(&request.topic, &request.level, count, request.mode)
            .await;
        if words.is_empty() {
            tracing::warn!(topic = %request.topic, "no words generated; session not created");
            return Err(SessionError::GenerationFailed);
        }
        ensure_unique_ids(&mut words);

        let now = self.clock.now();
        let seed: u64 = rand::rng().random();
        let session = StudySession::new(
            SessionId::generate(),
            request.user.clone(),
            request.topic.clone(),
            request.level.clone(),
            request.mode,
            words,
            now,
            seed,
        )?;
        self.sessions.save_session(&session).await?;
        tracing::info!(
            session_id = %session.id(),
            user = %request.user,
            words = session.total_words(),
            mode = %request.mode,
            "created study session"
        );

        let active = ActiveSession::new(session, now);
        self.prefetch_audio(&active);
        Ok(active)
    }

    /// Load a session for `user`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for an unknown id and
    /// `SessionError::Forbidden` when another user owns it.
    pub async fn resume(
        &self,
        id: SessionId,
        user: &UserId,
    ) -> Result<ActiveSession, SessionError> {
        let session = self.load_owned(id, user).await?;
        tracing::debug!(session_id = %id, phase = %session.phase(), step = session.current_step(), "resumed session");
        let active = ActiveSession::new(session, self.clock.now());
        self.prefetch_audio(&active);
        Ok(active)
    }

    /// Read a session for `user` without starting to study it.
    ///
    /// # Errors
    ///
    /// Same as [`resume`](Self::resume).
    pub async fn load_owned(
        &self,
        id: SessionId,
        user: &UserId,
    ) -> Result<StudySession, SessionError> {
        let session = self
            .sessions
            .get_session(id)
            .await?
            .ok_or(SessionError::NotFound(id))?;
        if !session.is_owned_by(user) {
            tracing::warn!(session_id = %id, user = %user, "session owned by another user");
            return Err(SessionError::Forbidden(id));
        }
        Ok(session)
    }

    /// Rebuild a session's exercises for a status view, without prefetching audio.
    ///
    /// # Errors
    ///
    /// Same as [`resume`](Self::resume).
    pub async fn inspect(
        &self,
        id: SessionId,
        user: &UserId,
    ) -> Result<SessionMachine, SessionError> {
        Ok(SessionMachine::new(self.load_owned(id, user).await?))
    }

    /// Sessions for the dashboard, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the list cannot be read.
    pub async fn list_sessions(&self, user: &UserId) -> Result<Vec<StudySession>, SessionError> {
        Ok(self.sessions.load_sessions(user).await?)
    }

    /// Dictionary lookup through the vocabulary source. No audio is fetched.
    pub async fn lookup_word(&self, term: &str) -> Option<WordEntry> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        self.vocabulary.lookup_dictionary(term).await
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Previous flashcard or exercise.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` for an invalid move, or
    /// `SessionError::Storage` if persisting fails.
    pub async fn prev(&self, active: &mut ActiveSession) -> Result<Transition, SessionError> {
        self.apply(active, SessionMachine::prev).await
    }

    /// Next flashcard, entering the exercises after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` for an invalid move, or
    /// `SessionError::Storage` if persisting fails.
    pub async fn next_word(&self, active: &mut ActiveSession) -> Result<Transition, SessionError> {
        let transition = self.apply(active, SessionMachine::next_word).await?;
        if matches!(transition, Transition::EnteredExercises) {
            self.prefetch_audio(active);
        }
        Ok(transition)
    }

    /// Record an already-graded answer, timed from when the exercise was shown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` for an invalid move, or
    /// `SessionError::Storage` if persisting fails.
    pub async fn answer(
        &self,
        active: &mut ActiveSession,
        correct: bool,
    ) -> Result<Transition, SessionError> {
        let elapsed = self.clock.elapsed_since(active.shown_at);
        self.apply(active, |m| m.answer(correct, elapsed)).await
    }

    /// Grade `response` against the current exercise and record it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` for an invalid move, or
    /// `SessionError::Storage` if persisting fails.
    pub async fn submit(
        &self,
        active: &mut ActiveSession,
        response: &str,
    ) -> Result<Transition, SessionError> {
        let elapsed = self.clock.elapsed_since(active.shown_at);
        self.apply(active, |m| m.submit(response, elapsed)).await
    }

    async fn apply<F>(&self, active: &mut ActiveSession, step: F) -> Result<Transition, SessionError>
    where
        F: FnOnce(&mut SessionMachine) -> Result<Transition, TransitionError>,
    {
        let transition = step(&mut active.machine)?;
        self.sessions.save_session(active.machine.session()).await?;
        active.shown_at = self.clock.now();

        let session = active.machine.session();
        tracing::debug!(
            session_id = %session.id(),
            phase = %session.phase(),
            step = session.current_step(),
            progress = session.progress(),
            score = session.score(),
            "session transition"
        );
        if let Transition::Answered(outcome) = &transition {
            if outcome.completed {
                tracing::info!(session_id = %session.id(), score = session.score(), "session completed");
            }
        }
        Ok(transition)
    }

    fn prefetch_audio(&self, active: &ActiveSession) {
        let Some(audio) = &self.audio else {
            return;
        };
        let session = active.session();
        match session.phase() {
            SessionPhase::Learning => {
                for word in session.words() {
                    audio.prefetch(&word.word);
                    if let Some(term) = word.related_term() {
                        audio.prefetch(term);
                    }
                    audio.prefetch(&word.example_en);
                }
            }
            SessionPhase::Exercise => {
                for exercise in active.exercises() {
                    if exercise.kind() == ExerciseKind::ListenSelect {
                        if let Some(text) = exercise.audio_context() {
                            audio.prefetch(text);
                        }
                    }
                }
            }
            SessionPhase::Summary => {}
        }
    }
}
