//! Derivation of practice items from a session's word list.

mod blank;
mod distractors;
mod generator;

pub use blank::{BLANK_MARKER, blank_out};
pub use distractors::{DISTRACTOR_COUNT, FILLER_OPTION, pick_distractors};
pub use generator::{generate_exercises, generate_exercises_seeded};
