//! History windowing under a token budget.
//!
//! The window is the longest trailing run of a conversation that fits the
//! budget, aligned so it starts on a user turn, with the leading system
//! turn kept in front. Stored history is never modified; trimming works on
//! a borrowed slice and returns fresh turns.

use chatbot_config::schema::{StartOn, WindowConfig};

use crate::{Message, Role};

/// Estimates the token cost of a single turn.
pub trait TokenCounter: Send + Sync {
    fn count(&self, message: &Message) -> usize;
}

/// Character-based estimate: `ceil(chars / chars_per_token)` plus a fixed
/// per-turn overhead for role and framing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproxTokenCounter {
    pub chars_per_token: usize,
    pub message_overhead: usize,
}

impl Default for ApproxTokenCounter {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            message_overhead: 3,
        }
    }
}

impl From<&WindowConfig> for ApproxTokenCounter {
    fn from(config: &WindowConfig) -> Self {
        Self {
            chars_per_token: config.chars_per_token as usize,
            message_overhead: config.message_overhead as usize,
        }
    }
}

impl TokenCounter for ApproxTokenCounter {
    fn count(&self, message: &Message) -> usize {
        let chars = message.content.chars().count();
        chars.div_ceil(self.chars_per_token.max(1)) + self.message_overhead
    }
}

/// Trimming parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPolicy {
    pub max_tokens: usize,
    /// Keep a system turn at the head of history, charged against the budget.
    pub include_system: bool,
    /// Cut the oldest fitting turn down to its trailing words instead of
    /// dropping it whole.
    pub allow_partial: bool,
    /// Role the window must start on; `None` accepts any role.
    pub start_on: Option<Role>,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            max_tokens: 65,
            include_system: true,
            allow_partial: false,
            start_on: Some(Role::User),
        }
    }
}

impl From<&WindowConfig> for WindowPolicy {
    fn from(config: &WindowConfig) -> Self {
        Self {
            max_tokens: config.max_tokens as usize,
            include_system: config.include_system,
            allow_partial: config.allow_partial,
            start_on: match config.start_on {
                StartOn::User => Some(Role::User),
                StartOn::Assistant => Some(Role::Assistant),
                StartOn::Any => None,
            },
        }
    }
}

impl WindowPolicy {
    fn starts_on(&self, role: Role) -> bool {
        match self.start_on {
            Some(wanted) => wanted == role,
            None => true,
        }
    }
}

/// Total estimated cost of a sequence of turns.
pub fn window_cost(turns: &[Message], counter: &dyn TokenCounter) -> usize {
    turns.iter().map(|turn| counter.count(turn)).sum()
}

/// Reduce `turns` to the window sent to the model.
///
/// When even the smallest valid window (system turn plus the suffix from
/// the most recent `start_on` turn) exceeds the budget, that smallest
/// window is returned anyway. With no `start_on` turn at all the result
/// is just the retained system turn, or empty.
pub fn trim_window(
    turns: &[Message],
    counter: &dyn TokenCounter,
    policy: &WindowPolicy,
) -> Vec<Message> {
    let (system, body) = match turns.split_first() {
        Some((first, rest)) if policy.include_system && first.role == Role::System => {
            (Some(first), rest)
        }
        _ => (None, turns),
    };

    let mut remaining = policy
        .max_tokens
        .saturating_sub(system.map_or(0, |turn| counter.count(turn)));

    let mut fitted: Vec<Message> = Vec::new();
    for turn in body.iter().rev() {
        let cost = counter.count(turn);
        if cost <= remaining {
            remaining -= cost;
            fitted.push(turn.clone());
            continue;
        }
        if policy.allow_partial {
            if let Some(cut) = truncate_to_fit(turn, counter, remaining) {
                fitted.push(cut);
            }
        }
        break;
    }
    fitted.reverse();

    let aligned = match fitted.iter().position(|turn| policy.starts_on(turn.role)) {
        Some(start) => fitted.split_off(start),
        None => body
            .iter()
            .rposition(|turn| policy.starts_on(turn.role))
            .map(|start| body[start..].to_vec())
            .unwrap_or_default(),
    };

    system.cloned().into_iter().chain(aligned).collect()
}

/// Longest trailing run of whole words of `turn` that fits `budget`.
fn truncate_to_fit(turn: &Message, counter: &dyn TokenCounter, budget: usize) -> Option<Message> {
    let words: Vec<&str> = turn.content.split_whitespace().collect();
    (1..words.len())
        .map(|start| Message::new(turn.role, words[start..].join(" ")))
        .find(|candidate| counter.count(candidate) <= budget)
}
