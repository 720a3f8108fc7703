//! The conversation engine: store, trimmer and prompt around one model.

use std::sync::Arc;

use chatbot_config::ChatbotConfig;
use tracing::{debug, info};

use crate::prompt::PromptTemplate;
use crate::store::{ConversationStore, InMemoryStore};
use crate::window::{trim_window, window_cost, ApproxTokenCounter, TokenCounter, WindowPolicy};
use crate::{AiClient, Message};

use super::types::{ThreadLocks, TurnState};

/// Runs conversation turns for any number of threads.
///
/// Turns on one thread are serialized: a second message queues until the
/// first reply is complete or abandoned. Turns on different threads run
/// independently.
pub struct ChatEngine {
    pub(super) client: Arc<dyn AiClient>,
    pub(super) store: Arc<dyn ConversationStore>,
    counter: Arc<dyn TokenCounter>,
    policy: WindowPolicy,
    template: PromptTemplate,
    pub(super) locks: ThreadLocks,
}

impl ChatEngine {
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self {
            client,
            store: Arc::new(InMemoryStore::new()),
            counter: Arc::new(ApproxTokenCounter::default()),
            policy: WindowPolicy::default(),
            template: PromptTemplate::default(),
            locks: ThreadLocks::default(),
        }
    }

    pub fn from_config(client: Arc<dyn AiClient>, config: &ChatbotConfig) -> Self {
        Self::new(client)
            .with_store(Arc::new(InMemoryStore::with_capacity(
                config.store.max_threads as usize,
            )))
            .with_token_counter(Arc::new(ApproxTokenCounter::from(&config.window)))
            .with_window_policy(WindowPolicy::from(&config.window))
            .with_prompt_template(PromptTemplate::from(&config.prompt))
    }

    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_window_policy(mut self, policy: WindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn default_language(&self) -> &str {
        self.template.default_language()
    }

    /// Stored turns of a thread, oldest first.
    pub async fn history(&self, thread_id: &str) -> Vec<Message> {
        self.store.history(thread_id).await
    }

    /// The language the next turn on this thread will use by default.
    pub async fn language(&self, thread_id: &str) -> String {
        self.store
            .language(thread_id)
            .await
            .unwrap_or_else(|| self.default_language().to_string())
    }

    pub async fn set_language(&self, thread_id: &str, language: &str) {
        let language = language.trim();
        if !language.is_empty() {
            self.store.set_language(thread_id, language).await;
        }
    }

    /// Forget a thread. Waits for a turn in flight on it to finish first.
    pub async fn clear(&self, thread_id: &str) -> bool {
        let _turn = self.locks.acquire(thread_id).await;
        let existed = self.store.clear(thread_id).await;
        info!(thread_id, existed, "conversation cleared");
        existed
    }

    pub fn state(&self, thread_id: &str) -> TurnState {
        self.locks.state(thread_id)
    }

    pub async fn thread_count(&self) -> usize {
        self.store.thread_count().await
    }

    /// Record the user turn and build the prompt for it.
    pub(super) async fn prepare(
        &self,
        thread_id: &str,
        message: &str,
        language: Option<&str>,
    ) -> Vec<Message> {
        self.store.append(thread_id, Message::user(message)).await;
        if let Some(language) = language {
            self.set_language(thread_id, language).await;
        }

        let language = self.store.language(thread_id).await;
        let history = self.store.history(thread_id).await;
        let window = trim_window(&history, self.counter.as_ref(), &self.policy);

        debug!(
            thread_id,
            history = history.len(),
            window = window.len(),
            cost = window_cost(&window, self.counter.as_ref()),
            budget = self.policy.max_tokens,
            "history trimmed"
        );

        self.template.assemble(language.as_deref(), &window)
    }
}
