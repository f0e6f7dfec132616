use crate::core::tokenize::tokenize;

/// Starting score for every entry, and the "no match" sentinel.
///
/// A missing keyword is reported as `None` by [`score_words`]; a computed
/// score at or below this value is not a match either, and the match
/// selector drops it.
pub const BASE_SCORE: i32 = -2;

/// Points added for every keyword found in a title
pub const MATCH_BONUS: i32 = 10;

/// Running score is multiplied by `RESCALE_NUM / RESCALE_DEN` after each keyword
const RESCALE_NUM: i32 = 20;
const RESCALE_DEN: i32 = 16;

/// Convert a word-distance into score units, saturating on absurd titles.
#[inline]
fn distance_to_i32(distance: usize) -> i32 {
    i32::try_from(distance).unwrap_or(i32::MAX)
}

/// Score a catalog title against query keywords.
///
/// See [`score_words`] for the algorithm.
#[must_use]
pub fn score_title(title: &str, keywords: &[String]) -> Option<i32> {
    score_words(&tokenize(title), keywords)
}

/// Score already-tokenized title words against query keywords.
///
/// For each keyword in order, the title is scanned from its first word for
/// an exact match:
///
/// - a keyword missing from the title rejects the entry (`None`)
/// - a match more than one word after the previous keyword's match costs
///   `(idx - last) + 1` points, so contiguous phrases rank higher
/// - every match adds [`MATCH_BONUS`]
/// - the running score is then rescaled by `20 / 16`, truncating toward zero
///
/// The scan restarts at the first title word for every keyword, so one title
/// word can satisfy two identical keywords.
///
/// An empty keyword list yields `Some(BASE_SCORE)`; the match selector treats
/// the empty query as "everything matches" before it gets here.
///
/// # Examples
///
/// ```
/// use bits_bot::matching::scoring::score_title;
///
/// let jack = vec!["jack".to_string(), "laughing".to_string()];
/// assert_eq!(score_title("Jack Nicholson Laughing", &jack), Some(21));
/// assert_eq!(score_title("Will Smith Laughing", &jack), None);
/// ```
#[must_use]
pub fn score_words(words: &[String], keywords: &[String]) -> Option<i32> {
    let mut score = BASE_SCORE;
    let mut last: Option<usize> = None;

    for keyword in keywords {
        // Only the first occurrence counts
        let idx = words.iter().position(|word| word == keyword)?;

        if let Some(last) = last {
            if idx > last + 1 {
                let penalty = distance_to_i32(idx - last).saturating_add(1);
                score = score.saturating_sub(penalty);
            }
        }

        score = score.saturating_add(MATCH_BONUS);
        score = score.saturating_mul(RESCALE_NUM) / RESCALE_DEN;
        last = Some(idx);
    }

    Some(score)
}
