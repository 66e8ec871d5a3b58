//! The fixed request template: persona instruction, then the full
//! conversation, oldest turn first.

use crate::chat::{Conversation, Role, Turn};
use crate::ollama::api::{self, ChatMessage};

/// The persona injected at the head of every request. Not configurable.
pub(crate) const SYSTEM_PERSONA: &str = "You are an expert AI coding assistant. \
Provide concise, correct solutions with strategic print statements for debugging. \
Always respond in English.";

impl From<Role> for api::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::System => api::Role::System,
            Role::Human => api::Role::User,
            Role::Assistant => api::Role::Assistant,
        }
    }
}

/// Renders the request payload for a completion: one system message holding
/// the persona, followed by every turn of the conversation in order. The
/// caller appends the new human turn to the conversation first, so it
/// arrives as the final message.
///
/// There is no truncation or windowing; the entire history is resent on
/// every call and the backend manages its context window implicitly.
pub(crate) fn render(conversation: &Conversation) -> Vec<ChatMessage> {
    let persona = Turn::system(SYSTEM_PERSONA.to_string());

    let mut messages = Vec::with_capacity(conversation.len() + 1);

    for turn in std::iter::once(&persona).chain(conversation.turns()) {
        messages.push(ChatMessage {
            role: turn.role.into(),
            content: turn.content.clone(),
        });
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Turn, GREETING};

    #[test]
    fn renders_persona_then_every_turn_in_order() {
        let mut conversation = Conversation::new();

        conversation.push(Turn::human("fix my loop".to_string()));

        let messages = render(&conversation);

        assert_eq!(messages.len(), 3);

        assert_eq!(messages[0].role, api::Role::System);
        assert_eq!(messages[0].content, SYSTEM_PERSONA);

        assert_eq!(messages[1].role, api::Role::Assistant);
        assert_eq!(messages[1].content, GREETING);

        assert_eq!(messages[2].role, api::Role::User);
        assert_eq!(messages[2].content, "fix my loop");
    }

    #[test]
    fn resends_the_full_history() {
        let mut conversation = Conversation::new();

        for i in 0..4 {
            conversation.push(Turn::human(format!("q{}", i)));
            conversation.push(Turn::assistant(format!("a{}", i)));
        }

        let messages = render(&conversation);

        // persona + seed + four exchanges
        assert_eq!(messages.len(), 1 + 1 + 8);
        assert_eq!(messages.last().unwrap().content, "a3");
    }
}
