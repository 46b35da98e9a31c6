//! Word-boundary aware text helpers shared by the classifier, extractor and engine.

use unicode_segmentation::UnicodeSegmentation;

/// Lowercased word tokens, split on Unicode word boundaries
pub fn words(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Byte offsets of every occurrence of `phrase` in `text` that does not sit
/// inside a longer word.
///
/// Both inputs are expected to be lowercase already. Phrases that start or end
/// with punctuation (`location:`) only need a boundary on their word side.
pub fn phrase_positions<'a>(text: &'a str, phrase: &'a str) -> impl Iterator<Item = usize> + 'a {
    let first = phrase.chars().next();
    let last = phrase.chars().next_back();

    text.match_indices(phrase)
        .map(|(start, _)| start)
        .filter(move |&start| {
            let (Some(first), Some(last)) = (first, last) else {
                return false;
            };
            let before_ok = match text[..start].chars().next_back() {
                Some(b) => !(is_word_char(b) && is_word_char(first)),
                None => true,
            };
            let after_ok = match text[start + phrase.len()..].chars().next() {
                Some(a) => !(is_word_char(a) && is_word_char(last)),
                None => true,
            };
            before_ok && after_ok
        })
}

/// Byte offset of the first word-bounded occurrence of `phrase` in `text`
pub fn find_phrase(text: &str, phrase: &str) -> Option<usize> {
    if phrase.is_empty() {
        return None;
    }
    phrase_positions(text, phrase).next()
}

/// Whether `phrase` occurs in `text` on word boundaries
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    find_phrase(text, phrase).is_some()
}

/// Whether any of `phrases` occurs in `text` on word boundaries
pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_phrase(text, p))
}

/// Collapse runs of whitespace and trim
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
