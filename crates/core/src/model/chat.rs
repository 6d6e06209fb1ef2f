use serde::{Deserialize, Serialize};

/// Only the most recent messages are kept when persisting chat history.
pub const CHAT_HISTORY_LIMIT: usize = 50;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in the help overlay's conversation log.
///
/// `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: i64,
}

/// Append a message, dropping the oldest entries beyond `CHAT_HISTORY_LIMIT`.
pub fn push_capped(history: &mut Vec<ChatMessage>, message: ChatMessage) {
    history.push(message);
    if history.len() > CHAT_HISTORY_LIMIT {
        let excess = history.len() - CHAT_HISTORY_LIMIT;
        history.drain(..excess);
    }
}
