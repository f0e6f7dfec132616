use crate::core::tokenize::tokenize;

/// Query prefix that asks for every best match instead of one image
pub const LIST_PREFIX: &str = "-list";

/// Characters stripped between a trigger or prefix and the query
const SEPARATORS: &[char] = &[' ', ':', '\t', '\n'];

/// How the bot should answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Post one image, picking randomly among ties
    Single,
    /// Post a list of all best matches without an image
    List,
}

/// A parsed query addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRequest {
    pub mode: ReplyMode,
    /// Query text as typed, after prefix removal; quoted back in replies
    pub text: String,
    /// Tokenized query
    pub keywords: Vec<String>,
}

impl BotRequest {
    /// Parse the text that followed the bot's trigger
    pub fn parse(text: &str) -> Self {
        let (mode, text) = match text.strip_prefix(LIST_PREFIX) {
            Some(rest) => (ReplyMode::List, rest.trim_start_matches(SEPARATORS)),
            None => (ReplyMode::Single, text),
        };

        Self {
            mode,
            text: text.to_string(),
            keywords: tokenize(text),
        }
    }
}

/// Remove a leading trigger (mention tag or trigger word) from message text.
///
/// Returns `None` when the text doesn't start with the trigger.
///
/// # Examples
///
/// ```
/// use bits_bot::bot::request::strip_trigger;
///
/// assert_eq!(strip_trigger("<@U1>: deal with it", "<@U1>"), Some("deal with it"));
/// assert_eq!(strip_trigger("deal with it", "<@U1>"), None);
/// ```
#[must_use]
pub fn strip_trigger<'t>(text: &'t str, trigger: &str) -> Option<&'t str> {
    text.strip_prefix(trigger)
        .map(|rest| rest.trim_start_matches(SEPARATORS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let request = BotRequest::parse("Jack Laughing");
        assert_eq!(request.mode, ReplyMode::Single);
        assert_eq!(request.text, "Jack Laughing");
        assert_eq!(request.keywords, vec!["jack", "laughing"]);
    }

    #[test]
    fn test_parse_list() {
        let request = BotRequest::parse("-list: jack");
        assert_eq!(request.mode, ReplyMode::List);
        assert_eq!(request.text, "jack");
        assert_eq!(request.keywords, vec!["jack"]);
    }

    #[test]
    fn test_parse_list_without_query() {
        let request = BotRequest::parse("-list");
        assert_eq!(request.mode, ReplyMode::List);
        assert!(request.keywords.is_empty());
    }

    #[test]
    fn test_list_must_be_prefix() {
        let request = BotRequest::parse("jack -list");
        assert_eq!(request.mode, ReplyMode::Single);
        assert_eq!(request.keywords, vec!["jack", "list"]);
    }

    #[test]
    fn test_strip_trigger() {
        assert_eq!(strip_trigger("<@U1> \t:jack", "<@U1>"), Some("jack"));
        assert_eq!(strip_trigger("<@U1>", "<@U1>"), Some(""));
        assert_eq!(strip_trigger(" <@U1> jack", "<@U1>"), None);
        assert_eq!(strip_trigger("bitsbot: jack", "bitsbot"), Some("jack"));
    }
}
