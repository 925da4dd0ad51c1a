use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of a chat session. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Ordered, append-only list of turns for one session. Insertion order is
/// the display order; there is no persistence beyond the session.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatTurn, Role, Transcript};

    #[test]
    fn transcript_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        for index in 0..4 {
            transcript.push(ChatTurn::user(format!("question {index}")));
            transcript.push(ChatTurn::assistant(format!("answer {index}")));
        }

        assert_eq!(transcript.len(), 8);
        for (index, pair) in transcript.turns().chunks(2).enumerate() {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[0].content, format!("question {index}"));
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[1].content, format!("answer {index}"));
        }
    }

    #[test]
    fn roles_serialize_lowercase() {
        let turn = ChatTurn::assistant("hello");
        let json = serde_json::to_string(&turn).expect("turn should serialize");
        assert!(json.contains("\"assistant\""));
        assert_eq!(Role::User.as_str(), "user");
    }
}
