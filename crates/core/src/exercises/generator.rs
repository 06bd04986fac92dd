use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::blank::blank_out;
use super::distractors::pick_distractors;
use crate::model::{
    ExerciseId, ExerciseKind, ExerciseQuestion, StudyMode, WordEntry,
};

const MATCH_TRANSLATION: &str = "Tìm định nghĩa chính xác";
const MISSING_TRANSLATION: &str = "Dịch nghĩa không có sẵn";

/// Meaning tested by the match-meaning item for `word`.
fn tested_meaning(word: &WordEntry, mode: StudyMode) -> &str {
    if mode.uses_related_terms() && word.related_term().is_some() {
        word.resolve_related_meaning()
    } else {
        &word.meaning
    }
}

fn relation_name(mode: StudyMode) -> &'static str {
    if mode == StudyMode::Antonyms {
        "trái nghĩa"
    } else {
        "đồng nghĩa"
    }
}

fn relation_symbol(mode: StudyMode) -> &'static str {
    if mode == StudyMode::Antonyms { "≠" } else { "=" }
}

/// Pools of sibling values, computed once per word list.
struct Pools<'w> {
    meanings: Vec<&'w str>,
    targets: Vec<&'w str>,
    headwords: Vec<&'w str>,
}

impl<'w> Pools<'w> {
    fn new(words: &'w [WordEntry], mode: StudyMode) -> Self {
        Self {
            meanings: words.iter().map(|w| tested_meaning(w, mode)).collect(),
            targets: words.iter().map(|w| w.quiz_target(mode)).collect(),
            headwords: words.iter().map(|w| w.word.as_str()).collect(),
        }
    }
}

/// Derive the practice items for a word list and shuffle them once.
///
/// Each word yields a match-meaning, a listen-and-select and a translate item,
/// plus two fill-in-the-blank items when its target word literally occurs in
/// the quiz sentence. The result therefore holds between `3 * words.len()` and
/// `5 * words.len()` items.
pub fn generate_exercises<R>(words: &[WordEntry], mode: StudyMode, rng: &mut R) -> Vec<ExerciseQuestion>
where
    R: Rng + ?Sized,
{
    let pools = Pools::new(words, mode);
    let mut exercises = Vec::with_capacity(words.len() * 5);

    for word in words {
        exercises.push(match_meaning(word, mode, &pools, rng));
        exercises.push(listen_select(word, mode, &pools, rng));
        if let Some([choice, input]) = fill_blank(word, mode, &pools, rng) {
            exercises.push(choice);
            exercises.push(input);
        }
        exercises.push(translate(word));
    }

    exercises.shuffle(rng);
    exercises
}

/// Generate with a deterministic RNG so a reloaded session sees the same list.
#[must_use]
pub fn generate_exercises_seeded(
    words: &[WordEntry],
    mode: StudyMode,
    seed: u64,
) -> Vec<ExerciseQuestion> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_exercises(words, mode, &mut rng)
}

fn match_meaning<R: Rng + ?Sized>(
    word: &WordEntry,
    mode: StudyMode,
    pools: &Pools<'_>,
    rng: &mut R,
) -> ExerciseQuestion {
    let correct = tested_meaning(word, mode).to_string();
    let options = pick_distractors(&correct, pools.meanings.iter().copied(), rng);

    match word.related_term() {
        Some(related) if mode.uses_related_terms() => ExerciseQuestion::new(
            ExerciseId::derive(&word.id, "match-rel"),
            word.id.clone(),
            ExerciseKind::MatchMeaning,
            format!("Chọn nghĩa đúng của từ: {related}"),
            Some(options),
            correct.clone(),
            None,
            format!(
                "{related} ({} với {}). Nghĩa: {correct}",
                relation_name(mode),
                word.word
            ),
            Some(MATCH_TRANSLATION.to_string()),
        ),
        _ => ExerciseQuestion::new(
            ExerciseId::derive(&word.id, "match"),
            word.id.clone(),
            ExerciseKind::MatchMeaning,
            format!("Chọn nghĩa tiếng Việt của từ: {}", word.word),
            Some(options),
            correct.clone(),
            None,
            format!("{}: {correct}", word.word),
            Some(MATCH_TRANSLATION.to_string()),
        ),
    }
}

fn listen_select<R: Rng + ?Sized>(
    word: &WordEntry,
    mode: StudyMode,
    pools: &Pools<'_>,
    rng: &mut R,
) -> ExerciseQuestion {
    match word.related_term() {
        Some(related) if mode.uses_related_terms() => ExerciseQuestion::new(
            ExerciseId::derive(&word.id, "listen-syn"),
            word.id.clone(),
            ExerciseKind::ListenSelect,
            format!(
                "Nghe từ gốc và chọn từ {}",
                relation_name(mode).to_uppercase()
            ),
            Some(pick_distractors(related, pools.targets.iter().copied(), rng)),
            related.to_string(),
            Some(word.word.clone()),
            format!(
                "{} ({}) {} {related}",
                word.word,
                word.meaning,
                relation_symbol(mode)
            ),
            Some("Nghe và tìm từ liên quan".to_string()),
        ),
        _ => ExerciseQuestion::new(
            ExerciseId::derive(&word.id, "listen"),
            word.id.clone(),
            ExerciseKind::ListenSelect,
            "Nghe và chọn từ đúng".to_string(),
            Some(pick_distractors(&word.word, pools.headwords.iter().copied(), rng)),
            word.word.clone(),
            Some(word.word.clone()),
            format!("{} nghĩa là {}", word.word, word.meaning),
            Some("Nghe phát âm và chọn từ vựng tương ứng".to_string()),
        ),
    }
}

fn fill_blank<R: Rng + ?Sized>(
    word: &WordEntry,
    mode: StudyMode,
    pools: &Pools<'_>,
    rng: &mut R,
) -> Option<[ExerciseQuestion; 2]> {
    let target = word.quiz_target(mode);
    let sentence = word.quiz_source();
    let prompt = blank_out(sentence, target)?;

    let translation = if word.quiz_sentence.is_some() {
        word.quiz_translation()
    } else {
        Some(word.example_vn.as_str()).filter(|s| !s.trim().is_empty())
    }
    .unwrap_or(MISSING_TRANSLATION)
    .to_string();

    let choice = ExerciseQuestion::new(
        ExerciseId::derive(&word.id, "fill-mc"),
        word.id.clone(),
        ExerciseKind::FillBlankChoice,
        prompt.clone(),
        Some(pick_distractors(target, pools.targets.iter().copied(), rng)),
        target.to_string(),
        None,
        sentence.to_string(),
        Some(translation.clone()),
    );
    let input = ExerciseQuestion::new(
        ExerciseId::derive(&word.id, "fill-input"),
        word.id.clone(),
        ExerciseKind::FillBlankInput,
        prompt,
        None,
        target.to_string(),
        None,
        sentence.to_string(),
        Some(translation),
    );
    Some([choice, input])
}

fn translate(word: &WordEntry) -> ExerciseQuestion {
    ExerciseQuestion::new(
        ExerciseId::derive(&word.id, "translate"),
        word.id.clone(),
        ExerciseKind::Translate,
        format!("Dịch câu sau sang tiếng Anh: \"{}\"", word.example_vn),
        None,
        word.example_en.clone(),
        None,
        word.example_en.clone(),
        Some(word.example_vn.clone()),
    )
}
