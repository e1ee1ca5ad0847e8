use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// System instruction seeded at index 0 of every user's buffer.
pub const SYSTEM_PROMPT: &str = "You are MoodBuddy, a professional emotional support AI. \
    Always reply politely, in a comforting and empathetic tone, limited to 4 lines. \
    Respond like a human counselor trained in positive psychology.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a conversation buffer. Serializes directly
/// into the chat-completions message shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Keyed store of per-user conversation buffers, injected via AppState.
/// Buffers are in-memory only; the persistent mirror lives in
/// `chat_messages`. Each user's buffer has its own mutex so one user's
/// exchange (including the model call) cannot interleave with another
/// request from the same user, while different users never contend.
#[derive(Clone)]
pub struct ChatBuffers {
    cap: usize,
    buffers: Arc<Mutex<HashMap<Uuid, Arc<Mutex<Vec<ConversationTurn>>>>>>,
}

impl ChatBuffers {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            buffers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Locks the buffer for one user, seeding it with the system turn on
    /// first contact. The guard is held across the whole exchange.
    pub async fn lock_user(&self, user_id: Uuid) -> OwnedMutexGuard<Vec<ConversationTurn>> {
        let buf = {
            let mut map = self.buffers.lock().await;
            map.entry(user_id)
                .or_insert_with(|| {
                    Arc::new(Mutex::new(vec![ConversationTurn::new(
                        TurnRole::System,
                        SYSTEM_PROMPT,
                    )]))
                })
                .clone()
        };
        buf.lock_owned().await
    }

    /// Appends one turn, trims past the cap, and returns the current
    /// sequence.
    pub async fn append_turn_and_trim(
        &self,
        user_id: Uuid,
        role: TurnRole,
        content: impl Into<String>,
    ) -> Vec<ConversationTurn> {
        let mut buf = self.lock_user(user_id).await;
        buf.push(ConversationTurn::new(role, content));
        Self::trim(&mut buf, self.cap);
        buf.clone()
    }

    /// Drops the oldest non-system turn pair (indices 1 and 2) until the
    /// buffer fits the cap. The system turn at index 0 is never removed,
    /// and trimming is always in pairs so exchanges stay whole.
    pub fn trim(buf: &mut Vec<ConversationTurn>, cap: usize) {
        while buf.len() > cap && buf.len() >= 3 {
            buf.drain(1..3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: usize = 16;

    #[tokio::test]
    async fn first_contact_seeds_system_turn() {
        let buffers = ChatBuffers::new(CAP);
        let buf = buffers.lock_user(Uuid::new_v4()).await;
        assert_eq!(buf.len(), 1);
        assert_eq!(buf[0].role, TurnRole::System);
        assert_eq!(buf[0].content, SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn twenty_exchanges_stay_within_cap() {
        let buffers = ChatBuffers::new(CAP);
        let user_id = Uuid::new_v4();

        for i in 0..20 {
            let turns = buffers
                .append_turn_and_trim(user_id, TurnRole::User, format!("question {}", i))
                .await;
            assert!(turns.len() <= CAP);
            assert_eq!(turns[0].role, TurnRole::System);

            let turns = buffers
                .append_turn_and_trim(user_id, TurnRole::Assistant, format!("answer {}", i))
                .await;
            assert!(turns.len() <= CAP);
            assert_eq!(turns[0].role, TurnRole::System);
            assert_eq!(turns[0].content, SYSTEM_PROMPT);
        }
    }

    #[tokio::test]
    async fn trim_removes_oldest_pair_not_single_turns() {
        let buffers = ChatBuffers::new(CAP);
        let user_id = Uuid::new_v4();

        // Fill to the cap: 1 system + 15 conversational turns.
        for i in 0..15 {
            buffers
                .append_turn_and_trim(user_id, TurnRole::User, format!("turn {}", i))
                .await;
        }
        // The 16th conversational turn overflows and evicts turns 0 and 1.
        let turns = buffers
            .append_turn_and_trim(user_id, TurnRole::User, "turn 15")
            .await;

        assert_eq!(turns.len(), CAP - 1);
        assert_eq!(turns[0].role, TurnRole::System);
        assert_eq!(turns[1].content, "turn 2");
        assert_eq!(turns.last().unwrap().content, "turn 15");
    }

    #[tokio::test]
    async fn buffers_are_isolated_per_user() {
        let buffers = ChatBuffers::new(CAP);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        buffers.append_turn_and_trim(a, TurnRole::User, "hello").await;
        let b_turns = buffers.lock_user(b).await;
        assert_eq!(b_turns.len(), 1);
    }

    #[test]
    fn trim_is_a_noop_under_cap() {
        let mut buf = vec![
            ConversationTurn::new(TurnRole::System, SYSTEM_PROMPT),
            ConversationTurn::new(TurnRole::User, "hi"),
        ];
        ChatBuffers::trim(&mut buf, CAP);
        assert_eq!(buf.len(), 2);
    }
}
