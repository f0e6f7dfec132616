use crate::core::entry::CatalogEntry;
use crate::core::message::{Attachment, OutboundMessage};
use crate::matching::engine::WinnerSet;

/// Reply when nothing in the catalog matched
#[must_use]
pub fn compose_no_match(user_name: &str, query: &str) -> OutboundMessage {
    OutboundMessage::text(format!("Sorry, {user_name}, no match for '{query}'."))
}

/// Reply with the winning image attached
#[must_use]
pub fn compose_single(entry: &CatalogEntry, image_base_url: &str) -> OutboundMessage {
    OutboundMessage::text(entry.title.clone()).with_attachment(Attachment {
        fallback: entry.title.clone(),
        image_url: format!("{image_base_url}{}", entry.image_url),
    })
}

/// Reply listing every winner as a link, without attachments
#[must_use]
pub fn compose_list(winners: &WinnerSet<'_>, query: &str, image_base_url: &str) -> OutboundMessage {
    if winners.is_empty() {
        return OutboundMessage::text(format!("No matches for '{query}'.\n"));
    }

    let mut out = format!("Best matches for '{query}':\n");
    for entry in winners.iter() {
        out.push_str(&format!(
            " * <{image_base_url}/b/{}|{}>\n",
            entry.short_id, entry.title
        ));
    }
    OutboundMessage::text(out)
}

/// Split text into chunks of at most `limit` characters.
///
/// Each chunk ends just after the last newline inside the limit, so list
/// lines are not broken; a window without a newline is cut at the limit.
///
/// # Examples
///
/// ```
/// use bits_bot::bot::reply::divide_message;
///
/// assert_eq!(divide_message("ab\ncd\nef", 7), vec!["ab\ncd\n", "ef"]);
/// assert_eq!(divide_message("abcdef", 4), vec!["abcd", "ef"]);
/// ```
#[must_use]
pub fn divide_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    // `nth(limit)` exists only while more than `limit` characters remain
    while let Some((limit_at, _)) = rest.char_indices().nth(limit) {
        let window = &rest[..limit_at];
        let cut = window.rfind('\n').map_or(limit_at, |newline| newline + 1);
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

/// Split an outbound message into postable pieces.
///
/// Attachments ride along with the first piece only.
#[must_use]
pub fn split_outbound(message: &OutboundMessage, limit: usize) -> Vec<OutboundMessage> {
    divide_message(&message.text, limit)
        .into_iter()
        .enumerate()
        .map(|(i, text)| OutboundMessage {
            text,
            attachments: if i == 0 {
                message.attachments.clone()
            } else {
                Vec::new()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::engine::MatchingEngine;

    fn make_test_catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new(1, "a", "Jack Nicholson Laughing", "jpeg"),
            CatalogEntry::new(2, "b", "Will Smith Laughing", "png"),
        ]
    }

    #[test]
    fn test_compose_no_match() {
        let reply = compose_no_match("jsd", "unicorn");
        assert_eq!(reply.text, "Sorry, jsd, no match for 'unicorn'.");
        assert!(reply.attachments.is_empty());
    }

    #[test]
    fn test_compose_single() {
        let entry = CatalogEntry::new(1, "a", "Jack Nicholson Laughing", "jpeg")
            .with_image_url("/b/a.jpg");
        let reply = compose_single(&entry, "http://i.bittwiddlers.org");
        assert_eq!(reply.text, "Jack Nicholson Laughing");
        assert_eq!(reply.attachments.len(), 1);
        assert_eq!(reply.attachments[0].fallback, "Jack Nicholson Laughing");
        assert_eq!(
            reply.attachments[0].image_url,
            "http://i.bittwiddlers.org/b/a.jpg"
        );
    }

    #[test]
    fn test_compose_list() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);
        let winners = engine.find_winners_for_text("laughing");

        let reply = compose_list(&winners, "laughing", "http://img");
        assert_eq!(
            reply.text,
            "Best matches for 'laughing':\n \
             * <http://img/b/a|Jack Nicholson Laughing>\n \
             * <http://img/b/b|Will Smith Laughing>\n"
        );
        assert!(reply.attachments.is_empty());
    }

    #[test]
    fn test_compose_list_empty() {
        let winners = WinnerSet::default();
        let reply = compose_list(&winners, "unicorn", "http://img");
        assert_eq!(reply.text, "No matches for 'unicorn'.\n");
    }

    #[test]
    fn test_divide_short_message() {
        assert_eq!(divide_message("hello", 4000), vec!["hello"]);
        assert_eq!(divide_message("", 4000), vec![""]);
    }

    #[test]
    fn test_divide_without_newline() {
        let text = "a".repeat(4001);
        let chunks = divide_message(&text, 4000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4000);
        assert_eq!(chunks[1], "a");
    }

    #[test]
    fn test_divide_at_exact_limit() {
        let text = "a".repeat(4000);
        assert_eq!(divide_message(&text, 4000), vec![text]);
    }

    #[test]
    fn test_divide_prefers_last_newline() {
        let mut text = "a".repeat(3990);
        text.push('\n');
        text.push_str(&"b".repeat(109));
        assert_eq!(text.len(), 4100);

        let chunks = divide_message(&text, 4000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 3991);
        assert!(chunks[0].ends_with('\n'));
        assert_eq!(chunks[1], "b".repeat(109));
    }

    #[test]
    fn test_divide_counts_characters() {
        let text = "é".repeat(5);
        let chunks = divide_message(&text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_divide_preserves_content() {
        let text: String = (0..500).map(|i| format!(" * line {i}\n")).collect();
        let chunks = divide_message(&text, 256);
        assert!(chunks.iter().all(|c| c.chars().count() <= 256));
        assert!(chunks.iter().all(|c| c.ends_with('\n')));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_outbound_attaches_once() {
        let entry = CatalogEntry::new(1, "a", "x".repeat(10), "png");
        let reply = compose_single(&entry, "http://img");
        let pieces = split_outbound(&reply, 4);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].attachments.len(), 1);
        assert!(pieces[1].attachments.is_empty());
        assert!(pieces[2].attachments.is_empty());
    }
}
