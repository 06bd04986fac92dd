use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Placeholder used when the word list is too small to supply three wrong answers.
pub const FILLER_OPTION: &str = "Other";

/// Number of wrong answers shown next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

/// Build the four options for a multiple-choice item.
///
/// Wrong answers come from `pool` values that differ from `correct` ignoring
/// case. When fewer than three remain the list is padded with
/// [`FILLER_OPTION`], so small datasets may show repeated fillers. The result
/// always holds `correct` exactly once, at a random position.
pub fn pick_distractors<'a, R>(
    correct: &str,
    pool: impl IntoIterator<Item = &'a str>,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let correct_folded = correct.to_lowercase();
    let mut candidates: Vec<&str> = pool
        .into_iter()
        .filter(|value| !value.trim().is_empty() && value.to_lowercase() != correct_folded)
        .collect();

    while candidates.len() < DISTRACTOR_COUNT {
        candidates.push(FILLER_OPTION);
    }

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, DISTRACTOR_COUNT)
        .map(|value| (*value).to_string())
        .collect();
    options.push(correct.to_string());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn returns_four_options_with_correct_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let pool = ["cat", "dog", "bird", "fish", "horse"];
        let options = pick_distractors("dog", pool, &mut rng);

        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| o.as_str() == "dog").count(), 1);
        assert!(options.iter().all(|o| pool.contains(&o.as_str())));
    }

    #[test]
    fn excludes_case_insensitive_duplicates_of_correct() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let options = pick_distractors("Dog", ["DOG", "dog", "cat", "bird", "fish"], &mut rng);

        assert_eq!(options.len(), 4);
        assert_eq!(
            options.iter().filter(|o| o.eq_ignore_ascii_case("dog")).count(),
            1
        );
    }

    #[test]
    fn pads_small_pools_with_filler() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let options = pick_distractors("sun", ["sun", "moon", ""], &mut rng);

        assert_eq!(options.len(), 4);
        assert!(options.contains(&"sun".to_string()));
        assert!(options.contains(&"moon".to_string()));
        assert_eq!(
            options.iter().filter(|o| o.as_str() == FILLER_OPTION).count(),
            2
        );
    }

    #[test]
    fn correct_answer_position_varies() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pool = ["a", "b", "c", "d", "e"];
        let positions: std::collections::HashSet<usize> = (0..64)
            .map(|_| {
                pick_distractors("z", pool, &mut rng)
                    .iter()
                    .position(|o| o == "z")
                    .unwrap()
            })
            .collect();
        assert!(positions.len() > 1);
    }
}
