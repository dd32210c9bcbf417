//! Built-in content: starter prompts offered on an empty conversation, and
//! demo conversations used when `seed_mock_sessions` is enabled and nothing
//! has been persisted yet.

use chrono::{Duration, Utc};

use chat_types::message::{ContentKind, Message};
use chat_types::session::{derive_title, ChatSession, Mode};

const GENERAL_ACTIONS: &[&str] = &[
    "Write a poem about the moon",
    "Explain quantum computing simply",
    "Summarize the plot of Hamlet",
    "Give me a recipe for chocolate chip cookies",
];

const SPIRITUAL_ACTIONS: &[&str] = &[
    "What is mindfulness?",
    "Share a verse about hope",
    "Explain the concept of karma",
    "Guide me through a short meditation",
];

/// Starter prompts shown for an empty conversation in `mode`.
pub fn quick_actions(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::General => GENERAL_ACTIONS,
        Mode::Spiritual => SPIRITUAL_ACTIONS,
    }
}

fn conversation(mode: Mode, age_minutes: i64, turns: &[(&str, &str)]) -> ChatSession {
    let mut session = ChatSession::new(mode);
    session.created_at = Utc::now() - Duration::minutes(age_minutes);
    for (question, answer) in turns {
        session.messages.push(Message::user(*question));
        session.messages.push(Message::assistant(*answer));
    }
    if let Some((first, _)) = turns.first() {
        session.title = derive_title(first);
    }
    session
}

/// Newest first, like the live collection.
pub fn mock_sessions() -> Vec<ChatSession> {
    let mut general = conversation(
        Mode::General,
        5,
        &[(
            "What can you help me with?",
            "I can answer questions, explain ideas, or help you think a problem through.",
        )],
    );
    let mut tips = Message::assistant(
        "- Take a short walk\n- Write down three things you are grateful for\n- Breathe slowly for a minute",
    );
    tips.kind = Some(ContentKind::List);
    tips.suggestions = vec![
        "Tell me more about gratitude".to_string(),
        "How long should I meditate?".to_string(),
    ];
    general.messages.push(Message::user("Give me a few ways to reset during a busy day"));
    general.messages.push(tips);

    let spiritual = conversation(
        Mode::Spiritual,
        60,
        &[(
            "How do I find a quiet moment for reflection?",
            "Start small: a few minutes at the same time each day, somewhere without distractions.",
        )],
    );

    vec![general, spiritual]
}
