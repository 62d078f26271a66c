use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::ContentAdvisor;
use super::generator::TextGenerator;
use crate::state::AnimalRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Player,
    Animal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Bounded conversation with one animal.
///
/// Only the most recent messages are kept, and a shorter tail of those is sent
/// to the generator as context.
#[derive(Debug, Clone)]
pub struct ChatSession {
    animal_id: String,
    history: VecDeque<ChatMessage>,
    limit: usize,
    context_len: usize,
}

impl ChatSession {
    #[must_use]
    pub fn new(animal_id: impl Into<String>, limit: usize, context_len: usize) -> Self {
        Self {
            animal_id: animal_id.into(),
            history: VecDeque::with_capacity(limit),
            limit,
            context_len: context_len.min(limit),
        }
    }

    /// Session sized by the advisor's policy.
    #[must_use]
    pub fn for_advisor<G>(advisor: &ContentAdvisor<G>, animal_id: impl Into<String>) -> Self {
        let policy = advisor.policy();
        Self::new(animal_id, policy.chat_history_limit, policy.chat_context_messages)
    }

    #[must_use]
    pub fn animal_id(&self) -> &str {
        &self.animal_id
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[must_use]
    pub fn last_reply(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|message| message.speaker == Speaker::Animal)
            .map(|message| message.text.as_str())
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn push(&mut self, speaker: Speaker, text: String) {
        self.history.push_back(ChatMessage {
            speaker,
            text,
            at: Utc::now(),
        });
        while self.history.len() > self.limit {
            self.history.pop_front();
        }
    }

    fn context(&self) -> Vec<ChatMessage> {
        let skip = self.history.len().saturating_sub(self.context_len);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Send `message` to `animal` and record both sides of the exchange.
    pub async fn send<G: TextGenerator>(
        &mut self,
        advisor: &ContentAdvisor<G>,
        animal: &AnimalRecord,
        message: &str,
    ) -> String {
        let context = self.context();
        self.push(Speaker::Player, message.to_string());
        let reply = advisor
            .chat_in_context(animal.template(), animal.intimacy(), &context, message)
            .await;
        self.push(Speaker::Animal, reply.clone());
        reply
    }
}
