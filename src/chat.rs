//! Conversation primitives: roles, turns, and the authoritative history log.
//!
//! The [`Conversation`] is the only history kept for a session. The UI-facing
//! pairing view is derived from it on demand by [`Conversation::transcript`]
//! rather than being maintained as a second, hand-synchronized copy.

/// The greeting the conversation is seeded with. It is shown to the user and
/// restored by [`Conversation::reset`].
pub(crate) const GREETING: &str = "Hi! I'm your pair programmer. How can I help you code today?";

/// The author of a [`Turn`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// An authoritative instruction to the model. Appears once, at the
    /// head of every rendered request.
    System,

    /// A turn authored by the user
    Human,

    /// A turn authored by the model
    Assistant,
}

/// One role-tagged message unit in a conversation. Immutable once created;
/// ordering within the conversation is significant.
#[derive(Debug, Clone)]
pub(crate) struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub(crate) fn system(content: String) -> Turn {
        Turn {
            role: Role::System,
            content,
        }
    }

    pub(crate) fn human(content: String) -> Turn {
        Turn {
            role: Role::Human,
            content,
        }
    }

    pub(crate) fn assistant(content: String) -> Turn {
        Turn {
            role: Role::Assistant,
            content,
        }
    }
}

/// The ordered log of turns for a session.
///
/// Starts non-empty, seeded with one assistant greeting turn. A successful
/// exchange grows it by exactly one human turn followed by one assistant
/// turn; failed exchanges record the attempt the same way, with a sentinel
/// assistant turn.
#[derive(Debug)]
pub(crate) struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub(crate) fn new() -> Conversation {
        Conversation {
            turns: vec![Turn::assistant(GREETING.to_string())],
        }
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub(crate) fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub(crate) fn len(&self) -> usize {
        self.turns.len()
    }

    /// Discards everything but the seed greeting.
    pub(crate) fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::assistant(GREETING.to_string()));
    }

    /// Derives the UI-facing pairing view: one `(user, reply)` tuple per
    /// exchange, in order. The seed greeting has no human partner and is
    /// not part of the view.
    pub(crate) fn transcript(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        let mut turns = self.turns.iter().peekable();

        while let Some(turn) = turns.next() {
            if turn.role != Role::Human {
                continue;
            }

            if let Some(next) = turns.peek() {
                if next.role == Role::Assistant {
                    pairs.push((turn.content.clone(), next.content.clone()));
                }
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_the_seed_greeting() {
        let conversation = Conversation::new();

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].role, Role::Assistant);
        assert_eq!(conversation.turns()[0].content, GREETING);
    }

    #[test]
    fn grows_by_two_turns_per_exchange() {
        let mut conversation = Conversation::new();

        for i in 0..3 {
            conversation.push(Turn::human(format!("question {}", i)));
            conversation.push(Turn::assistant(format!("answer {}", i)));
        }

        assert_eq!(conversation.len(), 1 + 2 * 3);
    }

    #[test]
    fn reset_restores_the_seed() {
        let mut conversation = Conversation::new();

        conversation.push(Turn::human("hello".to_string()));
        conversation.push(Turn::assistant("hi".to_string()));
        conversation.reset();

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].content, GREETING);
        assert!(conversation.transcript().is_empty());
    }

    #[test]
    fn transcript_pairs_each_human_turn_with_its_reply() {
        let mut conversation = Conversation::new();

        conversation.push(Turn::human("first".to_string()));
        conversation.push(Turn::assistant("one".to_string()));
        conversation.push(Turn::human("second".to_string()));
        conversation.push(Turn::assistant("two".to_string()));

        let transcript = conversation.transcript();

        assert_eq!(
            transcript,
            vec![
                ("first".to_string(), "one".to_string()),
                ("second".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn transcript_excludes_the_seed_greeting() {
        let conversation = Conversation::new();

        assert!(conversation.transcript().is_empty());
    }
}
