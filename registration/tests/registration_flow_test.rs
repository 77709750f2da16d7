//! Integration tests for the registration dialogue: handler + engine + stores.
//!
//! Uses in-memory stores and a recording Bot; no network or file I/O. The full dialogue is
//! driven through [`RegistrationHandler::handle`] the way the chain would call it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use qbot_core::{Bot, Chat, Handler, HandlerResponse, Message, MessageDirection, User};
use registration::{
    InMemoryPlayerRepository, InMemoryStateStore, PlayerRepository, RegistrationEngine,
    RegistrationHandler,
};

/// Bot that records every sent text instead of talking to Telegram.
#[derive(Default)]
struct RecordingBot {
    sent: std::sync::Mutex<Vec<String>>,
}

impl RecordingBot {
    fn new() -> Self {
        Self::default()
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn last_sent(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> qbot_core::Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> qbot_core::Result<()> {
        self.send_message(&message.chat, text).await
    }
}

struct Fixture {
    handler: RegistrationHandler,
    players: Arc<InMemoryPlayerRepository>,
    bot: Arc<RecordingBot>,
}

fn fixture() -> Fixture {
    let players = Arc::new(InMemoryPlayerRepository::new());
    let states = Arc::new(InMemoryStateStore::new());
    let bot = Arc::new(RecordingBot::new());
    let engine = RegistrationEngine::new(players.clone());
    let handler = RegistrationHandler::new(engine, states, bot.clone());
    Fixture {
        handler,
        players,
        bot,
    }
}

fn message_from(user_id: i64, content: &str) -> Message {
    Message {
        id: format!("msg_{}_{}", user_id, content.len()),
        user: User {
            id: user_id,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
    }
}

/// **Test: the full dialogue including a rejected name and a correction.**
///
/// /register → name prompt; "Al" → too short; "Alice" → confirm; "nope" → yes/no re-prompt;
/// "no" → new name prompt; "Bob" → confirm; "yes" → player created with name "Bob".
#[tokio::test]
async fn test_full_registration_dialogue() {
    let f = fixture();

    let response = f.handler.handle(&message_from(1, "/register")).await.unwrap();
    assert!(matches!(response, HandlerResponse::Reply(_)));
    assert!(f.bot.last_sent().unwrap().contains("what name"));

    f.handler.handle(&message_from(1, "Al")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("between 3 and 20"));

    f.handler.handle(&message_from(1, "Alice")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("\"Alice\""));

    f.handler.handle(&message_from(1, "nope")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("'yes' or 'no'"));

    f.handler.handle(&message_from(1, "no")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("different name"));

    f.handler.handle(&message_from(1, "Bob")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("\"Bob\""));

    f.handler.handle(&message_from(1, "yes")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("Welcome, Bob"));

    let player = f
        .players
        .find_by_external_user_id("1")
        .await
        .unwrap()
        .expect("player must exist after confirmation");
    assert_eq!(player.name, "Bob");
    assert_eq!(player.external_chat_id, "456");

    // State cleared: the next unrelated message falls through the chain
    let response = f.handler.handle(&message_from(1, "hello again")).await.unwrap();
    assert_eq!(response, HandlerResponse::Continue);
}

/// **Test: text from a user with no active state is not consumed.**
#[tokio::test]
async fn test_unrelated_traffic_falls_through() {
    let f = fixture();

    let response = f.handler.handle(&message_from(7, "just chatting")).await.unwrap();
    assert_eq!(response, HandlerResponse::Continue);
    assert!(f.bot.sent().is_empty());
}

/// **Test: registrations of different users interleave without crosstalk.**
#[tokio::test]
async fn test_two_users_interleaved() {
    let f = fixture();

    f.handler.handle(&message_from(1, "/register")).await.unwrap();
    f.handler.handle(&message_from(2, "/register")).await.unwrap();
    f.handler.handle(&message_from(1, "Alice")).await.unwrap();
    f.handler.handle(&message_from(2, "Bob")).await.unwrap();
    f.handler.handle(&message_from(2, "yes")).await.unwrap();
    f.handler.handle(&message_from(1, "yes")).await.unwrap();

    let alice = f.players.find_by_external_user_id("1").await.unwrap().unwrap();
    let bob = f.players.find_by_external_user_id("2").await.unwrap().unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(bob.name, "Bob");
}

/// **Test: /register twice after completion never creates a second player.**
#[tokio::test]
async fn test_begin_is_idempotent_after_completion() {
    let f = fixture();

    f.handler.handle(&message_from(1, "/register")).await.unwrap();
    f.handler.handle(&message_from(1, "Alice")).await.unwrap();
    f.handler.handle(&message_from(1, "yes")).await.unwrap();

    for _ in 0..2 {
        f.handler.handle(&message_from(1, "/register")).await.unwrap();
        let last = f.bot.last_sent().unwrap();
        assert!(last.contains("already registered"));
        assert!(last.contains("Alice"));
    }

    let player = f.players.find_by_external_user_id("1").await.unwrap().unwrap();
    assert_eq!(player.id, 1);
    assert_eq!(player.name, "Alice");
}

/// **Test: /register mid-flow restarts at the name step and drops the candidate.**
#[tokio::test]
async fn test_register_mid_flow_restarts() {
    let f = fixture();

    f.handler.handle(&message_from(1, "/register")).await.unwrap();
    f.handler.handle(&message_from(1, "Alice")).await.unwrap();
    f.handler.handle(&message_from(1, "/register")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("what name"));

    // "ok" is judged as a (too short) name, not as a confirmation of "Alice"
    f.handler.handle(&message_from(1, "ok")).await.unwrap();
    assert!(f.bot.last_sent().unwrap().contains("between 3 and 20"));
    assert!(f.players.find_by_external_user_id("1").await.unwrap().is_none());
}

/// **Test: concurrent confirmations for one user produce exactly one player.**
///
/// Eight copies of the same "yes" race through the handler; the gate serializes them, the
/// first commits, the rest fall through on the cleared state.
#[tokio::test]
async fn test_concurrent_confirmations_create_one_player() {
    let f = fixture();
    let handler = Arc::new(f.handler);

    handler.handle(&message_from(1, "/register")).await.unwrap();
    handler.handle(&message_from(1, "Alice")).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            handler.handle(&message_from(1, "yes")).await.unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let player = f.players.find_by_external_user_id("1").await.unwrap().unwrap();
    assert_eq!(player.id, 1);
    assert_eq!(player.name, "Alice");
}
