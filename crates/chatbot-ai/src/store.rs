//! Per-thread conversation history.
//!
//! Lock ordering: the registry lock is always released before a
//! conversation lock is taken.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::{Message, Role};

/// Storage for conversation turns keyed by thread id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a turn, creating the conversation if needed.
    async fn append(&self, thread_id: &str, message: Message);

    /// Append the answer to the thread's pending user turn.
    ///
    /// Stores nothing and returns `false` if the thread is gone (evicted or
    /// cleared) or no longer ends on a user turn.
    async fn append_reply(&self, thread_id: &str, message: Message) -> bool;

    /// All turns of a thread in order; empty if the thread is unknown.
    async fn history(&self, thread_id: &str) -> Vec<Message>;

    /// Language last set for the thread.
    async fn language(&self, thread_id: &str) -> Option<String>;

    async fn set_language(&self, thread_id: &str, language: &str);

    /// Drop a thread. Returns whether it existed.
    async fn clear(&self, thread_id: &str) -> bool;

    /// Number of live threads.
    async fn thread_count(&self) -> usize;
}

#[derive(Debug, Default)]
struct Conversation {
    turns: Vec<Message>,
    language: Option<String>,
}

pub const DEFAULT_MAX_THREADS: usize = 1000;

/// In-memory store. Once `capacity` threads exist, the least recently used
/// one is evicted together with its history.
pub struct InMemoryStore {
    threads: Mutex<LruCache<String, Arc<RwLock<Conversation>>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_THREADS)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            threads: Mutex::new(LruCache::new(capacity)),
        }
    }

    async fn get(&self, thread_id: &str) -> Option<Arc<RwLock<Conversation>>> {
        self.threads.lock().await.get(thread_id).cloned()
    }

    async fn get_or_create(&self, thread_id: &str) -> Arc<RwLock<Conversation>> {
        let mut threads = self.threads.lock().await;
        if let Some(conversation) = threads.get(thread_id) {
            return conversation.clone();
        }

        let conversation = Arc::new(RwLock::new(Conversation::default()));
        if let Some((evicted, _)) = threads.push(thread_id.to_string(), conversation.clone()) {
            debug!(thread_id = %evicted, "evicted least recently used conversation");
        }
        debug!(thread_id, threads = threads.len(), "conversation created");
        conversation
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn append(&self, thread_id: &str, message: Message) {
        let conversation = self.get_or_create(thread_id).await;
        conversation.write().await.turns.push(message);
    }

    async fn append_reply(&self, thread_id: &str, message: Message) -> bool {
        let Some(conversation) = self.get(thread_id).await else {
            return false;
        };
        let mut conversation = conversation.write().await;
        let pending = conversation
            .turns
            .last()
            .is_some_and(|last| last.role == Role::User);
        if pending {
            conversation.turns.push(message);
        }
        pending
    }

    async fn history(&self, thread_id: &str) -> Vec<Message> {
        match self.get(thread_id).await {
            Some(conversation) => conversation.read().await.turns.clone(),
            None => Vec::new(),
        }
    }

    async fn language(&self, thread_id: &str) -> Option<String> {
        let conversation = self.get(thread_id).await?;
        let language = conversation.read().await.language.clone();
        language
    }

    async fn set_language(&self, thread_id: &str, language: &str) {
        let conversation = self.get_or_create(thread_id).await;
        conversation.write().await.language = Some(language.to_string());
    }

    async fn clear(&self, thread_id: &str) -> bool {
        self.threads.lock().await.pop(thread_id).is_some()
    }

    async fn thread_count(&self) -> usize {
        self.threads.lock().await.len()
    }
}
