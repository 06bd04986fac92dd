use regex::{NoExpand, RegexBuilder};

/// Marker that replaces the target word in fill-in-the-blank prompts.
pub const BLANK_MARKER: &str = "_______";

/// Replace the first case-insensitive whole-word occurrence of `target` in
/// `sentence` with [`BLANK_MARKER`].
///
/// Returns `None` when the target does not occur as a whole word.
#[must_use]
pub fn blank_out(sentence: &str, target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }

    let pattern = format!(r"\b{}\b", regex::escape(target));
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;

    if !re.is_match(sentence) {
        return None;
    }
    Some(re.replace(sentence, NoExpand(BLANK_MARKER)).into_owned())
}
