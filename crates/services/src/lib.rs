#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod audio;
pub mod error;
pub mod sessions;

pub use lingo_core::Clock;

pub use ai::{AiContentClient, AiContentConfig, AiSpeechClient, VocabularySource};
pub use app_services::AppServices;
pub use audio::{AudioCache, AudioClip, AudioStore, InMemoryAudioStore, SpeechSynthesizer};
pub use error::{AppServicesError, ContentError, SessionError};
pub use sessions::{ActiveSession, SessionRequest, StudySessionService};
