use mealwise_core::chat::{APOLOGY, ChatAssistant, ChatMessage, ChatRole, GREETING};
use mealwise_test_utils::{ScriptedChat, sample_plan};

fn ready_assistant() -> ChatAssistant {
    let mut chat = ChatAssistant::new("English");
    assert!(chat.ensure_session(Some(&sample_plan())));
    chat
}

#[tokio::test]
async fn reply_is_appended_after_optimistic_user_message() {
    let backend = ScriptedChat::new();
    backend.push_reply("**Yes.** Oats are fine.\n- keep portions small");
    let mut chat = ready_assistant();

    let reply = chat.send(&backend, "Can I eat oats?").await.unwrap();

    assert_eq!(reply.role, ChatRole::Assistant);
    let roles: Vec<ChatRole> = chat.transcript().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
    );
    assert_eq!(chat.transcript()[1], ChatMessage::user("Can I eat oats?"));
}

#[tokio::test]
async fn greeting_is_never_sent_as_context() {
    let backend = ScriptedChat::new();
    backend.push_reply("first answer");
    backend.push_reply("second answer");
    let mut chat = ready_assistant();

    chat.send(&backend, "one").await.unwrap();
    chat.send(&backend, "two").await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].history.is_empty());
    assert_eq!(calls[1].history.len(), 2);
    assert!(calls.iter().all(|c| c.history.iter().all(|m| m.text != GREETING)));
    assert!(calls[0].system.contains(&sample_plan().summary));
}

#[tokio::test]
async fn failure_becomes_apology() {
    let backend = ScriptedChat::new();
    backend.push_failure();
    let mut chat = ready_assistant();

    let reply = chat.send(&backend, "hello").await.unwrap();

    assert_eq!(reply.text, APOLOGY);
    assert!(!chat.is_waiting());
    assert_eq!(chat.transcript().len(), 3);
}

#[tokio::test]
async fn blank_input_sends_nothing() {
    let backend = ScriptedChat::new();
    let mut chat = ready_assistant();
    assert!(chat.send(&backend, "  ").await.is_none());
    assert!(backend.calls().is_empty());
}
