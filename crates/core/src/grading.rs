//! Free-text answer grading.

/// Characters removed before comparing answers.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Inputs with at least this many tokens are graded by token overlap.
pub const OVERLAP_MIN_TOKENS: usize = 3;

/// Share of the target's token count that matching input tokens must reach.
pub const OVERLAP_THRESHOLD: f64 = 0.7;

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Decide whether a typed answer matches the expected one.
///
/// Both sides are lower-cased and stripped of punctuation. Identical strings
/// always pass. Inputs with fewer than [`OVERLAP_MIN_TOKENS`] tokens must match
/// exactly. Longer inputs pass when the number of input tokens that also occur
/// in the target reaches [`OVERLAP_THRESHOLD`] of the target's token count.
/// Word order is ignored and the count runs from input to target, so repeating
/// a correct word counts each time.
#[must_use]
pub fn check_similarity(input: &str, target: &str) -> bool {
    let input = normalize(input);
    let target = normalize(target);

    if input == target {
        return true;
    }

    let input_tokens: Vec<&str> = input.split_whitespace().collect();
    if input_tokens.len() < OVERLAP_MIN_TOKENS {
        return false;
    }

    let target_tokens: Vec<&str> = target.split_whitespace().collect();
    if target_tokens.is_empty() {
        return false;
    }

    let matches = input_tokens
        .iter()
        .filter(|token| target_tokens.contains(token))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let ratio = matches as f64 / target_tokens.len() as f64;
    ratio >= OVERLAP_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_case_and_punctuation() {
        assert!(check_similarity("Hello, World!", "hello world"));
        assert!(check_similarity("  well-known ", "wellknown"));
    }

    #[test]
    fn short_answers_need_exact_match() {
        assert!(check_similarity("joyful", "Joyful"));
        assert!(!check_similarity("joy", "joyful"));
        assert!(!check_similarity("very happy", "happy"));
    }

    #[test]
    fn long_answers_pass_at_seventy_percent_overlap() {
        let target = "She goes to school every day by bus";
        assert_eq!(target.split_whitespace().count(), 8);
        // 7 of 8 target tokens present.
        assert!(check_similarity("she goes to school every day by", target));
        // 6 of 8.
        assert!(check_similarity("she goes to school every day", target));
        // 5 of 8.
        assert!(!check_similarity("she goes to school every", target));
    }

    #[test]
    fn overlap_runs_from_input_to_target() {
        // Repeated correct words inflate the count.
        assert!(check_similarity("cat cat cat", "the cat sat"));
        assert!(!check_similarity("dog dog dog", "the cat sat"));
    }

    #[test]
    fn threshold_is_inclusive() {
        // 7 of 10 target tokens exactly.
        let target = "a b c d e f g h i j";
        assert!(check_similarity("a b c d e f g", target));
        assert!(!check_similarity("a b c d e f", target));
    }
}
