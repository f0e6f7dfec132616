//! Splitting free text into normalized word tokens.

/// Characters that separate words, in addition to whitespace
pub const WORD_DELIMITERS: &[char] = &[
    ':', ',', ';', '.', '-', '+', '=', '[', ']', '!', '?', '(', ')', '$', '%', '^', '&', '*', '<',
    '>', '"', '`',
];

#[inline]
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || WORD_DELIMITERS.contains(&c)
}

/// Split text into lower-cased words, dropping empty fragments.
///
/// # Examples
///
/// ```
/// use bits_bot::core::tokenize::tokenize;
///
/// assert_eq!(tokenize("Jack Nicholson: LAUGHING!"), vec!["jack", "nicholson", "laughing"]);
/// assert!(tokenize(" ,.;-- ").is_empty());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(is_delimiter)
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
