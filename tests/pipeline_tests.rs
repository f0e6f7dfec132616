//! End-to-end reply pipeline tests with an in-memory catalog

use std::sync::Arc;

use bits_bot::bot::reply::split_outbound;
use bits_bot::catalog::parse_catalog_json;
use bits_bot::{Bot, BotConfig, CatalogEntry, ChatMessage, MemoryCatalog};

fn make_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(1, "jn", "Jack Nicholson laughing", "gif"),
        CatalogEntry::new(2, "cl", "Crowd laughing", "jpeg"),
        CatalogEntry::new(3, "dw", "Deal With It", "png"),
        CatalogEntry::new(4, "yt", "Jack laughing on video", "youtube"),
        CatalogEntry::new(5, "mp", "Laughing mp4", "mp4"),
    ]
}

fn make_bot(entries: Vec<CatalogEntry>) -> Bot {
    let mut config = BotConfig::new("xoxb-test", "secret");
    config.image_base_url = "http://img.example.com/".to_string();
    Bot::new(Arc::new(MemoryCatalog::new(entries)), &config)
}

fn message(text: &str, timestamp: &str) -> ChatMessage {
    ChatMessage {
        user_id: "U1".to_string(),
        user_name: "jsd".to_string(),
        channel_id: "C1".to_string(),
        channel_name: "general".to_string(),
        text: text.to_string(),
        timestamp: timestamp.to_string(),
    }
}

#[tokio::test]
async fn test_tie_picks_one_of_the_tied_entries() {
    let bot = make_bot(make_catalog());

    for ts in ["1458170617.000005", "1458170618.5", "1", "not-a-timestamp"] {
        let reply = bot.respond(&message("laughing", ts)).await.unwrap();
        assert!(
            reply.text == "Jack Nicholson laughing" || reply.text == "Crowd laughing",
            "unexpected winner {:?}",
            reply.text
        );
    }
}

#[tokio::test]
async fn test_same_timestamp_same_winner() {
    let bot = make_bot(make_catalog());
    let first = bot
        .respond(&message("laughing", "1458170617.000005"))
        .await
        .unwrap();
    for _ in 0..10 {
        let again = bot
            .respond(&message("laughing", "1458170617.000005"))
            .await
            .unwrap();
        assert_eq!(again, first);
    }
}

#[tokio::test]
async fn test_phrase_beats_scattered_words() {
    let bot = make_bot(make_catalog());
    let reply = bot
        .respond(&message("jack laughing", "1458170617.000005"))
        .await
        .unwrap();
    assert_eq!(reply.text, "Jack Nicholson laughing");
    assert_eq!(reply.attachments[0].fallback, "Jack Nicholson laughing");
    assert_eq!(reply.attachments[0].image_url, "http://img.example.com/b/jn");
}

#[tokio::test]
async fn test_video_entries_never_win() {
    let bot = make_bot(make_catalog());
    let reply = bot.respond(&message("video", "1.0")).await.unwrap();
    assert_eq!(reply.text, "Sorry, jsd, no match for 'video'.");
    assert!(reply.attachments.is_empty());
}

#[tokio::test]
async fn test_empty_query_matches_everything_displayable() {
    let bot = make_bot(make_catalog());
    let reply = bot.respond(&message("-list", "1.0")).await.unwrap();
    assert!(reply.text.starts_with("Best matches for '':\n"));
    assert_eq!(reply.text.matches(" * <").count(), 3);
}

#[tokio::test]
async fn test_list_reply_is_chunked_on_line_boundaries() {
    let entries: Vec<CatalogEntry> = (0..200)
        .map(|i| CatalogEntry::new(i, &format!("id{i}"), &format!("Cat picture number {i}"), "jpeg"))
        .collect();
    let bot = make_bot(entries);

    let reply = bot
        .respond(&message("-list: cat picture", "1.0"))
        .await
        .unwrap();
    let pieces = split_outbound(&reply, 500);

    assert!(pieces.len() > 1);
    for piece in &pieces {
        assert!(piece.text.chars().count() <= 500);
        assert!(piece.attachments.is_empty());
    }
    for piece in &pieces[..pieces.len() - 1] {
        assert!(piece.text.ends_with('\n'));
    }
    let joined: String = pieces.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(joined, reply.text);
}

#[tokio::test]
async fn test_catalog_envelope_through_pipeline() {
    let json = r#"{"result": {"list": [
        {"id": 7, "base62id": "z7", "title": "Deal With It", "kind": "gif",
         "imageURL": "/b/z7", "thumbURL": "/t/z7", "isClean": true},
        {"id": 8, "base62id": "z8", "title": "Deal With It Dog", "kind": "gifv",
         "imageURL": "/b/z8", "thumbURL": "/t/z8"}
    ]}}"#;
    let bot = make_bot(parse_catalog_json(json).unwrap());

    let reply = bot.respond(&message("deal with it", "1.0")).await.unwrap();
    assert_eq!(reply.text, "Deal With It");
    assert_eq!(reply.attachments[0].image_url, "http://img.example.com/b/z7");
}
