//! Number words
//!
//! Roman Urdu and English number words used as order quantities.

/// Words recognized as quantities, in regex alternation order
pub const QUANTITY_WORDS: &[&str] = &[
    "ek", "do", "teen", "char", "panch", "che", "saat", "aath", "nau", "das", "one", "two",
    "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Convert a number word to its value
///
/// # Examples
/// ```
/// use order_engine_text_processing::numbers::word_to_number;
/// assert_eq!(word_to_number("teen"), Some(3));
/// assert_eq!(word_to_number("Five"), Some(5));
/// assert_eq!(word_to_number("7"), Some(7));
/// ```
pub fn word_to_number(word: &str) -> Option<u32> {
    match word.trim().to_lowercase().as_str() {
        "ek" | "one" => Some(1),
        "do" | "two" => Some(2),
        "teen" | "three" => Some(3),
        "char" | "four" => Some(4),
        "panch" | "five" => Some(5),
        "che" | "six" => Some(6),
        "saat" | "seven" => Some(7),
        "aath" | "eight" => Some(8),
        "nau" | "nine" => Some(9),
        "das" | "ten" => Some(10),
        digits => digits.parse().ok(),
    }
}
