//! Pronunciation audio: synthesis, caching and deduplicated fetches.
//!
//! Clips are keyed by trimmed text. A fetch in flight is shared by every
//! caller asking for the same text; failures are logged and read as `None`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::ContentError;

pub const SAMPLE_RATE_HZ: u32 = 24_000;
pub const CHANNELS: u16 = 1;

//
// ─── CLIP ──────────────────────────────────────────────────────────────────────
//

/// Raw 16-bit little-endian mono PCM at [`SAMPLE_RATE_HZ`].
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pcm: Arc<[u8]>,
}

impl AudioClip {
    #[must_use]
    pub fn from_pcm(pcm: impl Into<Arc<[u8]>>) -> Self {
        Self { pcm: pcm.into() }
    }

    #[must_use]
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    /// Decoded samples in `[-1.0, 1.0)`. A trailing odd byte is ignored.
    #[must_use]
    pub fn samples(&self) -> Vec<f32> {
        self.pcm
            .chunks_exact(2)
            .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
            .collect()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        let frames = (self.pcm.len() / 2) as u64;
        Duration::from_micros(frames * 1_000_000 / u64::from(SAMPLE_RATE_HZ))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pcm.len() < 2
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("bytes", &self.pcm.len())
            .field("duration", &self.duration())
            .finish()
    }
}

//
// ─── SEAMS ─────────────────────────────────────────────────────────────────────
//

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the backend fails or returns no audio.
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ContentError>;
}

/// Where finished clips are kept.
pub trait AudioStore: Send + Sync {
    fn get(&self, key: &str) -> Option<AudioClip>;
    fn set(&self, key: &str, clip: AudioClip);
}

/// Unbounded in-memory clip store.
#[derive(Clone, Default)]
pub struct InMemoryAudioStore {
    clips: Arc<Mutex<HashMap<String, AudioClip>>>,
}

impl InMemoryAudioStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.lock().map(|g| g.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioStore for InMemoryAudioStore {
    fn get(&self, key: &str) -> Option<AudioClip> {
        self.clips.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, clip: AudioClip) {
        match self.clips.lock() {
            Ok(mut guard) => {
                guard.insert(key.to_owned(), clip);
            }
            Err(err) => tracing::warn!(error = %err, "audio store lock poisoned"),
        }
    }
}

//
// ─── CACHE ─────────────────────────────────────────────────────────────────────
//

type Pending = HashMap<String, watch::Receiver<bool>>;

/// Synthesizer front with a clip store and in-flight deduplication.
#[derive(Clone)]
pub struct AudioCache {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn AudioStore>,
    pending: Arc<Mutex<Pending>>,
}

enum Lookup {
    Hit(AudioClip),
    Wait(watch::Receiver<bool>),
    Fetch(watch::Sender<bool>),
}

impl AudioCache {
    #[must_use]
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, store: Arc<dyn AudioStore>) -> Self {
        Self {
            synthesizer,
            store,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Cache backed by an [`InMemoryAudioStore`].
    #[must_use]
    pub fn in_memory(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self::new(synthesizer, Arc::new(InMemoryAudioStore::new()))
    }

    #[must_use]
    pub fn cached(&self, text: &str) -> Option<AudioClip> {
        self.store.get(text.trim())
    }

    /// Whether a fetch for `text` is in flight.
    #[must_use]
    pub fn has_pending(&self, text: &str) -> bool {
        self.pending
            .lock()
            .map(|p| p.contains_key(text.trim()))
            .unwrap_or(false)
    }

    /// Start fetching `text` in the background unless it is cached or in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn prefetch(&self, text: &str) {
        let key = text.trim();
        if key.is_empty() {
            return;
        }
        if let Lookup::Fetch(done) = self.lookup(key) {
            let cache = self.clone();
            let key = key.to_owned();
            tokio::spawn(async move {
                let _ = cache.fetch(&key, done).await;
            });
        }
    }

    /// Return the clip for `text`: from the store, from a fetch already in
    /// flight, or from a fresh fetch. `None` if synthesis failed.
    pub async fn speak(&self, text: &str) -> Option<AudioClip> {
        let key = text.trim();
        if key.is_empty() {
            return None;
        }

        match self.lookup(key) {
            Lookup::Hit(clip) => Some(clip),
            Lookup::Wait(mut rx) => {
                if rx.wait_for(|done| *done).await.is_err() {
                    tracing::debug!(text = key, "audio fetch abandoned");
                }
                self.store.get(key)
            }
            Lookup::Fetch(tx) => self.fetch(key, tx).await,
        }
    }

    fn lookup(&self, key: &str) -> Lookup {
        let Ok(mut pending) = self.pending.lock() else {
            let (tx, _rx) = watch::channel(false);
            return Lookup::Fetch(tx);
        };
        // Checked under the lock: a finishing fetch stores its clip before
        // clearing its pending entry.
        if let Some(clip) = self.store.get(key) {
            return Lookup::Hit(clip);
        }
        if let Some(rx) = pending.get(key) {
            return Lookup::Wait(rx.clone());
        }
        let (tx, rx) = watch::channel(false);
        pending.insert(key.to_owned(), rx);
        Lookup::Fetch(tx)
    }

    async fn fetch(&self, key: &str, done: watch::Sender<bool>) -> Option<AudioClip> {
        let result = match self.synthesizer.synthesize(key).await {
            Ok(clip) if !clip.is_empty() => Some(clip),
            Ok(_) => {
                tracing::warn!(text = key, "speech synthesis returned no audio");
                None
            }
            Err(err) => {
                tracing::warn!(text = key, error = %err, "speech synthesis failed");
                None
            }
        };

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(clip) = &result {
                self.store.set(key, clip.clone());
            }
            pending.remove(key);
        } else if let Some(clip) = &result {
            self.store.set(key, clip.clone());
        }
        let _ = done.send(true);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSynth {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for CountingSynth {
        async fn synthesize(&self, _text: &str) -> Result<AudioClip, ContentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                Err(ContentError::EmptyResponse)
            } else {
                Ok(AudioClip::from_pcm(vec![0u8, 0, 0xff, 0x7f]))
            }
        }
    }

    fn synth(fail: bool) -> Arc<CountingSynth> {
        Arc::new(CountingSynth {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[test]
    fn samples_decode_little_endian() {
        let clip = AudioClip::from_pcm(vec![0x00, 0x80, 0x00, 0x00, 0x00, 0x40, 0x01]);
        assert_eq!(clip.samples(), vec![-1.0, 0.0, 0.5]);
        assert_eq!(
            AudioClip::from_pcm(vec![0u8; 48_000]).duration(),
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        let s = synth(false);
        let cache = AudioCache::in_memory(s.clone());

        let (a, b) = tokio::join!(cache.speak(" hello "), cache.speak("hello"));
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(s.calls.load(Ordering::SeqCst), 1);

        assert!(cache.speak("hello").await.is_some());
        assert_eq!(s.calls.load(Ordering::SeqCst), 1);
        assert!(!cache.has_pending("hello"));
    }

    #[tokio::test]
    async fn failures_yield_none_and_are_retried() {
        let s = synth(true);
        let cache = AudioCache::in_memory(s.clone());

        assert!(cache.speak("word").await.is_none());
        assert!(cache.speak("word").await.is_none());
        assert_eq!(s.calls.load(Ordering::SeqCst), 2);
        assert!(cache.cached("word").is_none());
    }

    #[tokio::test]
    async fn blank_text_is_ignored() {
        let s = synth(false);
        let cache = AudioCache::in_memory(s.clone());
        assert!(cache.speak("   ").await.is_none());
        cache.prefetch("");
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn prefetch_fills_the_store() {
        let s = synth(false);
        let store = Arc::new(InMemoryAudioStore::new());
        let cache = AudioCache::new(s.clone(), store.clone());

        cache.prefetch("river");
        assert!(cache.has_pending("river"));
        let clip = cache.speak("river").await;
        assert!(clip.is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(s.calls.load(Ordering::SeqCst), 1);
    }
}
