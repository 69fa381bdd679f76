//! Shared conversation state
//!
//! One store exists process-wide. All access happens inside short critical
//! sections; the guard is never held across an external provider call. The
//! completion call instead works from a snapshot taken under the guard, and
//! the assistant reply is recorded by re-acquiring it afterwards.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The human speaking into the device
    User,
    /// The chat model's reply
    Assistant,
}

impl Role {
    /// Wire name used by the chat provider
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One utterance in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Speaker role
    pub role: Role,
    /// Text content
    pub content: String,
}

impl Turn {
    /// Create a user turn
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Copy of conversation state taken under the guard, for use outside it
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// System prompt to prepend
    pub system_prompt: String,
    /// All turns, oldest first, ending with the just-appended user turn
    pub turns: Vec<Turn>,
}

#[derive(Debug, Default)]
struct State {
    turns: Vec<Turn>,
    last_activity: Option<Instant>,
}

/// Ordered turn history with time-based eviction
///
/// History is cleared when a new user turn arrives after more than the
/// inactivity timeout of silence — stale context never silently carries
/// across an idle gap.
#[derive(Debug)]
pub struct ConversationStore {
    state: Mutex<State>,
    system_prompt: String,
    timeout: Duration,
}

impl ConversationStore {
    /// Create a store with the given system prompt and inactivity timeout
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, timeout: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            system_prompt: system_prompt.into(),
            timeout,
        }
    }

    /// Append a user turn, evicting stale history first, and return a
    /// snapshot for the completion call.
    ///
    /// Resets the inactivity clock.
    pub async fn append_user_turn(&self, text: impl Into<String>) -> Snapshot {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_activity
            && now.duration_since(last) > self.timeout
        {
            tracing::info!(
                idle_secs = now.duration_since(last).as_secs(),
                dropped_turns = state.turns.len(),
                "conversation inactive past timeout, clearing history"
            );
            state.turns.clear();
        }

        state.turns.push(Turn::user(text));
        state.last_activity = Some(now);

        Snapshot {
            system_prompt: self.system_prompt.clone(),
            turns: state.turns.clone(),
        }
    }

    /// Record the assistant's reply.
    ///
    /// Does not touch the inactivity clock — only new user input resets it.
    pub async fn append_assistant_turn(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.turns.push(Turn::assistant(text));
    }

    /// Copy of the current turn history, oldest first
    pub async fn history(&self) -> Vec<Turn> {
        self.state.lock().await.turns.clone()
    }

    /// The configured system prompt
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(7200);

    fn store() -> ConversationStore {
        ConversationStore::new("be brief", TIMEOUT)
    }

    #[tokio::test]
    async fn snapshot_contains_prompt_and_new_turn() {
        let store = store();
        let snapshot = store.append_user_turn("hello").await;

        assert_eq!(snapshot.system_prompt, "be brief");
        assert_eq!(snapshot.turns, vec![Turn::user("hello")]);
    }

    #[tokio::test]
    async fn turns_accumulate_in_order() {
        let store = store();
        store.append_user_turn("one").await;
        store.append_assistant_turn("two").await;
        let snapshot = store.append_user_turn("three").await;

        assert_eq!(
            snapshot.turns,
            vec![Turn::user("one"), Turn::assistant("two"), Turn::user("three")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn recent_history_survives_new_turn() {
        let store = store();
        store.append_user_turn("first").await;
        store.append_assistant_turn("reply").await;

        tokio::time::advance(TIMEOUT - Duration::from_secs(1)).await;

        let snapshot = store.append_user_turn("second").await;
        assert_eq!(snapshot.turns.len(), 3);
        assert_eq!(snapshot.turns[0], Turn::user("first"));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_history_is_evicted() {
        let store = store();
        store.append_user_turn("old").await;
        store.append_assistant_turn("old reply").await;

        tokio::time::advance(TIMEOUT + Duration::from_secs(1)).await;

        let snapshot = store.append_user_turn("fresh").await;
        assert_eq!(snapshot.turns, vec![Turn::user("fresh")]);

        store.append_assistant_turn("fresh reply").await;
        assert_eq!(
            store.history().await,
            vec![Turn::user("fresh"), Turn::assistant("fresh reply")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn assistant_turn_does_not_reset_clock() {
        let store = store();
        store.append_user_turn("old").await;

        tokio::time::advance(TIMEOUT - Duration::from_secs(10)).await;
        store.append_assistant_turn("late reply").await;
        tokio::time::advance(Duration::from_secs(11)).await;

        // Total idle since the user turn exceeds the timeout even though the
        // assistant turn landed in between.
        let snapshot = store.append_user_turn("fresh").await;
        assert_eq!(snapshot.turns, vec![Turn::user("fresh")]);
    }
}
