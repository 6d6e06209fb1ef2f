use std::sync::Arc;

use tracing::warn;

use labs_core::model::{push_capped, ChatMessage, Sender};
use labs_core::Clock;
use storage::ChatHistoryRepository;

/// Persisted conversation log for the help overlay.
///
/// Response generation lives elsewhere; this service only owns the capped
/// history and its persistence round-trip. Storage failures are logged and
/// the session continues without persistence.
pub struct ChatService {
    repo: Arc<dyn ChatHistoryRepository>,
    clock: Clock,
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatService {
    /// Create the service, loading any persisted history.
    #[must_use]
    pub fn new(repo: Arc<dyn ChatHistoryRepository>, clock: Clock) -> Self {
        let messages = repo.load_history().unwrap_or_else(|err| {
            warn!(%err, "chat history unreadable, starting fresh");
            Vec::new()
        });
        let next_id = messages.iter().map(|m| m.id).max().map_or(1, |id| id + 1);
        Self {
            repo,
            clock,
            messages,
            next_id,
        }
    }

    /// Messages in order, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append a message, cap the history, and persist it.
    ///
    /// Returns the new message's id.
    pub fn push(&mut self, sender: Sender, content: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        push_capped(
            &mut self.messages,
            ChatMessage {
                id,
                sender,
                content: content.into(),
                timestamp: self.clock.now_millis(),
            },
        );
        if let Err(err) = self.repo.save_history(&self.messages) {
            warn!(%err, "failed to persist chat history");
        }
        id
    }

    /// Drop the in-memory log and the persisted entry.
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Err(err) = self.repo.clear_history() {
            warn!(%err, "failed to clear chat history");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use labs_core::model::CHAT_HISTORY_LIMIT;
    use labs_core::time::fixed_clock;
    use storage::InMemoryStore;

    #[test]
    fn push_persists_and_caps_the_history() {
        let store = InMemoryStore::new();
        let mut chat = ChatService::new(Arc::new(store.clone()), fixed_clock());

        for index in 0..60 {
            chat.push(Sender::User, format!("question {index}"));
        }
        assert_eq!(chat.messages().len(), CHAT_HISTORY_LIMIT);
        assert_eq!(store.load_history().unwrap().len(), CHAT_HISTORY_LIMIT);
        assert_eq!(chat.messages()[0].content, "question 10");
    }

    #[test]
    fn ids_continue_after_a_reload() {
        let store = InMemoryStore::new();
        let mut chat = ChatService::new(Arc::new(store.clone()), fixed_clock());
        chat.push(Sender::User, "hello");
        chat.push(Sender::Assistant, "hi");

        let mut reloaded = ChatService::new(Arc::new(store.clone()), fixed_clock());
        assert_eq!(reloaded.messages().len(), 2);
        let id = reloaded.push(Sender::User, "again");
        assert_eq!(id, 3);
    }

    #[test]
    fn clear_empties_both_sides() {
        let store = InMemoryStore::new();
        let mut chat = ChatService::new(Arc::new(store.clone()), fixed_clock());
        chat.push(Sender::User, "hello");
        chat.clear();
        assert!(chat.messages().is_empty());
        assert!(store.load_history().unwrap().is_empty());
    }
}
