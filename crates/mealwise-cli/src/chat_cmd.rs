//! `mealwise chat` command: a line-oriented chat about a saved plan.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;

use mealwise_core::chat::markup::{self, Block, Span};
use mealwise_core::chat::{ChatAssistant, ChatBackend, ChatMessage, ChatRole, GeminiChatBackend};

use crate::config::MealwiseConfig;
use crate::export_cmd::load_plan;

const PROMPT: &str = "you> ";

/// Flatten the light markup of a reply for a plain terminal.
pub fn render_plain(text: &str) -> String {
    let flatten = |spans: Vec<Span<'_>>| -> String {
        spans
            .into_iter()
            .map(|s| match s {
                Span::Plain(t) | Span::Bold(t) => t,
            })
            .collect()
    };

    markup::parse(text)
        .into_iter()
        .map(|block| match block {
            Block::Blank => String::new(),
            Block::Paragraph(spans) => flatten(spans),
            Block::ListItem(spans) => format!("  * {}", flatten(spans)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_message(out: &mut impl Write, message: &ChatMessage) -> Result<()> {
    let who = match message.role {
        ChatRole::User => "you",
        ChatRole::Assistant => "assistant",
    };
    writeln!(out, "{who}> {}", render_plain(&message.text))?;
    Ok(())
}

/// Read questions from `input` until EOF or `/quit`, printing each reply.
pub async fn chat_loop(
    assistant: &mut ChatAssistant,
    backend: &dyn ChatBackend,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<usize> {
    if let Some(greeting) = assistant.transcript().first() {
        print_message(&mut out, greeting)?;
    }

    let mut sent = 0;
    write!(out, "{PROMPT}")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let question = line.trim();
        if question == "/quit" || question == "/exit" {
            break;
        }
        if let Some(reply) = assistant.send(backend, question).await {
            print_message(&mut out, &reply)?;
            sent += 1;
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(sent)
}

/// Run the chat command against the configured Gemini backend.
pub async fn run_chat(config: &MealwiseConfig, plan_path: &Path) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let mut assistant = ChatAssistant::new(config.language.clone());
    assistant.ensure_session(Some(&plan));
    let backend = GeminiChatBackend::new(config.client());

    eprintln!("Ask about your plan. Type /quit to leave.");
    let stdin = std::io::stdin();
    let sent = chat_loop(
        &mut assistant,
        &backend,
        stdin.lock(),
        std::io::stdout().lock(),
    )
    .await?;
    tracing::debug!(sent, "chat finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealwise_core::chat::{APOLOGY, GREETING};
    use mealwise_test_utils::{ScriptedChat, sample_plan};

    #[test]
    fn markup_is_flattened() {
        let text = "**Tip:** drink water\n- before meals\n\nDone";
        assert_eq!(
            render_plain(text),
            "Tip: drink water\n  * before meals\n\nDone"
        );
    }

    #[tokio::test]
    async fn loop_sends_each_question_and_stops_at_quit() {
        let backend = ScriptedChat::new();
        backend.push_reply("Yes, **swap** it.");
        let mut assistant = ChatAssistant::new("English");
        assistant.ensure_session(Some(&sample_plan()));

        let input = "Can I swap lunch?\n\n/quit\nignored\n".as_bytes();
        let mut out = Vec::new();
        let sent = chat_loop(&mut assistant, &backend, input, &mut out)
            .await
            .unwrap();

        assert_eq!(sent, 1);
        assert_eq!(backend.calls().len(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(&render_plain(GREETING)));
        assert!(printed.contains("assistant> Yes, swap it."));
    }

    #[tokio::test]
    async fn failure_prints_apology_and_continues() {
        let backend = ScriptedChat::new();
        backend.push_failure();
        backend.push_reply("Second try worked.");
        let mut assistant = ChatAssistant::new("English");
        assistant.ensure_session(Some(&sample_plan()));

        let mut out = Vec::new();
        chat_loop(&mut assistant, &backend, "one\ntwo\n".as_bytes(), &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(APOLOGY));
        assert!(printed.contains("Second try worked."));
    }
}
