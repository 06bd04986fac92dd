use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use lingo_core::model::{SessionPhase, StudyMode, UserId, WordEntry};
use lingo_core::session::{Transition, TransitionError};
use lingo_core::time::fixed_now;
use services::{
    AudioCache, AudioClip, Clock, ContentError, SessionError, SessionRequest, SpeechSynthesizer,
    StudySessionService, VocabularySource,
};
use storage::repository::Storage;

/// Returns `count` canned words, or nothing when `empty` is set.
#[derive(Default)]
struct CannedVocabulary {
    empty: bool,
    requested: Mutex<Vec<usize>>,
}

impl CannedVocabulary {
    fn words(count: usize) -> Vec<WordEntry> {
        (0..count)
            .map(|i| {
                let word = format!("word{i}");
                WordEntry::new(
                    format!("w{i}"),
                    word.clone(),
                    format!("nghĩa {i}"),
                    format!("An example with {word}."),
                    format!("Ví dụ {i}."),
                )
                .with_quiz_sentence(format!("Please use {word} here."), None)
            })
            .collect()
    }
}

#[async_trait]
impl VocabularySource for CannedVocabulary {
    async fn generate_vocabulary_list(
        &self,
        _topic: &str,
        _level: &str,
        count: usize,
        _mode: StudyMode,
    ) -> Vec<WordEntry> {
        self.requested.lock().unwrap().push(count);
        if self.empty {
            Vec::new()
        } else {
            Self::words(count)
        }
    }

    async fn lookup_dictionary(&self, term: &str) -> Option<WordEntry> {
        Some(WordEntry::new("dict-1", term, "nghĩa", "Example.", "Ví dụ."))
    }
}

fn service(storage: &Storage, vocabulary: Arc<CannedVocabulary>) -> StudySessionService {
    StudySessionService::new(
        Clock::fixed(fixed_now()),
        Arc::clone(&storage.sessions),
        vocabulary,
    )
}

fn learner() -> UserId {
    UserId::new("learner")
}

#[tokio::test]
async fn learning_phase_hands_over_to_exercises_at_half_progress() {
    let storage = Storage::in_memory();
    let svc = service(&storage, Arc::new(CannedVocabulary::default()));

    let request = SessionRequest::new(learner(), "Travel", "B1").with_word_count(10);
    let mut active = svc.create_session(&request).await.unwrap();
    assert_eq!(active.session().total_words(), 10);

    for _ in 0..9 {
        svc.next_word(&mut active).await.unwrap();
    }
    assert_eq!(active.phase(), SessionPhase::Learning);
    let entered = svc.next_word(&mut active).await.unwrap();
    assert_eq!(entered, Transition::EnteredExercises);

    let stored = storage
        .sessions
        .get_session(active.session().id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.phase(), SessionPhase::Exercise);
    assert_eq!(stored.current_step(), 0);
    assert!((stored.progress() - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn word_count_is_clamped_and_empty_generation_fails() {
    let storage = Storage::in_memory();
    let vocabulary = Arc::new(CannedVocabulary::default());
    let svc = service(&storage, Arc::clone(&vocabulary));

    svc.create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(1))
        .await
        .unwrap();
    svc.create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(500))
        .await
        .unwrap();
    assert_eq!(*vocabulary.requested.lock().unwrap(), vec![3, 50]);

    let failing = service(
        &storage,
        Arc::new(CannedVocabulary {
            empty: true,
            ..CannedVocabulary::default()
        }),
    );
    let err = failing
        .create_session(&SessionRequest::new(learner(), "t", "l"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::GenerationFailed));
    assert_eq!(svc.list_sessions(&learner()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn speed_bonus_depends_on_time_since_shown() {
    let storage = Storage::in_memory();
    let svc = service(&storage, Arc::new(CannedVocabulary::default()));
    let mut active = svc
        .create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(3))
        .await
        .unwrap();
    for _ in 0..3 {
        svc.next_word(&mut active).await.unwrap();
    }

    // Shown at t0, answered at t0: fast.
    let fast = svc.answer(&mut active, true).await.unwrap();
    let Transition::Answered(outcome) = fast else {
        panic!("expected an answer outcome");
    };
    assert_eq!(outcome.points_awarded, 15);

    // Answered 25 seconds after being shown: no bonus.
    let slow_svc = svc
        .clone()
        .with_clock(Clock::fixed(fixed_now() + Duration::seconds(25)));
    let slow = slow_svc.answer(&mut active, true).await.unwrap();
    let Transition::Answered(outcome) = slow else {
        panic!("expected an answer outcome");
    };
    assert_eq!(outcome.points_awarded, 10);
    assert_eq!(active.session().score(), 25);
}

#[tokio::test]
async fn revisited_exercise_does_not_score_twice() {
    let storage = Storage::in_memory();
    let svc = service(&storage, Arc::new(CannedVocabulary::default()));
    let mut active = svc
        .create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(3))
        .await
        .unwrap();
    for _ in 0..3 {
        svc.next_word(&mut active).await.unwrap();
    }

    svc.answer(&mut active, true).await.unwrap();
    svc.prev(&mut active).await.unwrap();
    let again = svc.answer(&mut active, true).await.unwrap();
    let Transition::Answered(outcome) = again else {
        panic!("expected an answer outcome");
    };
    assert_eq!(outcome.points_awarded, 0);
    assert_eq!(active.session().score(), 15);
}

#[tokio::test]
async fn final_answer_completes_and_summary_is_terminal() {
    let storage = Storage::in_memory();
    let svc = service(&storage, Arc::new(CannedVocabulary::default()));
    let mut active = svc
        .create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(3))
        .await
        .unwrap();
    for _ in 0..3 {
        svc.next_word(&mut active).await.unwrap();
    }

    let total = active.exercises().len();
    for _ in 0..total - 1 {
        let expected = active.current_exercise().unwrap().correct_answer().to_string();
        svc.submit(&mut active, &expected).await.unwrap();
    }
    svc.submit(&mut active, "definitely wrong").await.unwrap();

    assert_eq!(active.phase(), SessionPhase::Summary);
    assert!(active.session().is_completed());
    assert!((active.session().progress() - 100.0).abs() < f64::EPSILON);

    let summary = active.summary();
    assert_eq!(summary.total_exercises, total);
    assert_eq!(summary.correct, total - 1);

    let err = svc.next_word(&mut active).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Transition(TransitionError::Finished)
    ));

    let stored = svc
        .load_owned(active.session().id(), &learner())
        .await
        .unwrap();
    assert!(stored.is_completed());
}

#[tokio::test]
async fn resume_checks_owner_and_rebuilds_the_same_exercises() {
    let storage = Storage::in_memory();
    let svc = service(&storage, Arc::new(CannedVocabulary::default()));
    let mut active = svc
        .create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(4))
        .await
        .unwrap();
    for _ in 0..4 {
        svc.next_word(&mut active).await.unwrap();
    }
    svc.answer(&mut active, true).await.unwrap();
    let id = active.session().id();

    let resumed = svc.resume(id, &learner()).await.unwrap();
    assert_eq!(resumed.exercises(), active.exercises());
    assert_eq!(resumed.session().current_step(), 1);
    assert_eq!(resumed.session().score(), active.session().score());

    let err = svc.resume(id, &UserId::new("intruder")).await.unwrap_err();
    assert!(matches!(err, SessionError::Forbidden(found) if found == id));

    let missing = lingo_core::model::SessionId::generate();
    let err = svc.resume(missing, &learner()).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));
}

#[tokio::test]
async fn dashboard_lists_newest_first() {
    let storage = Storage::in_memory();
    let vocabulary = Arc::new(CannedVocabulary::default());
    let early = service(&storage, Arc::clone(&vocabulary));
    let late = early
        .clone()
        .with_clock(Clock::fixed(fixed_now() + Duration::hours(1)));

    let first = early
        .create_session(&SessionRequest::new(learner(), "Food", "A1"))
        .await
        .unwrap();
    let second = late
        .create_session(&SessionRequest::new(learner(), "Work", "B2"))
        .await
        .unwrap();

    let topics: Vec<_> = early
        .list_sessions(&learner())
        .await
        .unwrap()
        .iter()
        .map(|s| s.topic().to_string())
        .collect();
    assert_eq!(topics, vec!["Work", "Food"]);
    assert_ne!(first.session().id(), second.session().id());
}

#[tokio::test]
async fn lookup_trims_and_skips_blank_terms() {
    let storage = Storage::in_memory();
    let svc = service(&storage, Arc::new(CannedVocabulary::default()));
    assert!(svc.lookup_word("   ").await.is_none());
    let entry = svc.lookup_word(" serendipity ").await.unwrap();
    assert_eq!(entry.word, "serendipity");
}

#[derive(Default)]
struct CountingSpeech {
    calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesizer for CountingSpeech {
    async fn synthesize(&self, _text: &str) -> Result<AudioClip, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AudioClip::from_pcm(vec![0u8; 4]))
    }
}

#[tokio::test]
async fn status_checks_and_lookups_fetch_no_audio() {
    let storage = Storage::in_memory();
    let plain = service(&storage, Arc::new(CannedVocabulary::default()));
    let id = plain
        .create_session(&SessionRequest::new(learner(), "t", "l").with_word_count(3))
        .await
        .unwrap()
        .session()
        .id();

    let speech = Arc::new(CountingSpeech::default());
    let audio = AudioCache::in_memory(Arc::clone(&speech) as Arc<dyn SpeechSynthesizer>);
    let svc = plain.clone().with_audio(audio.clone());

    let machine = svc.inspect(id, &learner()).await.unwrap();
    assert_eq!(machine.phase(), SessionPhase::Learning);
    assert!(machine.exercise_count() >= 9);
    assert!(svc.lookup_word("serendipity").await.is_some());
    tokio::task::yield_now().await;
    assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    assert!(!audio.has_pending("word0"));
    assert!(!audio.has_pending("serendipity"));

    let err = svc.inspect(id, &UserId::new("intruder")).await.unwrap_err();
    assert!(matches!(err, SessionError::Forbidden(_)));

    // Studying does warm the cache.
    svc.resume(id, &learner()).await.unwrap();
    assert!(audio.has_pending("word0") || audio.cached("word0").is_some());
}
