mod exercise;
mod ids;
mod mode;
mod session;
mod word;

pub use exercise::{ExerciseKind, ExerciseQuestion};
pub use ids::{ExerciseId, ParseIdError, SessionId, UserId, WordId};
pub use mode::{ParseStudyModeError, StudyMode};
pub use session::{SessionPhase, SessionSummary, StudySession};
pub use word::{WordEntry, WordError, WordListError, validate_word_list};
