//! Educational text for an animal: fact cards, quizzes and chat replies.
//!
//! Every request goes to a [`TextGenerator`] first. Errors, unparseable replies
//! and replies that break the shape contract are swallowed and replaced by
//! deterministic fallback content, so callers always get usable output.
//! Nothing here touches the session; callers apply results themselves and
//! should drop them if the mode controller epoch moved on meanwhile.

pub mod chat;
pub mod fallback;
pub mod generator;
#[cfg(feature = "remote")]
pub mod openai;
pub mod parse;
mod prompt;
pub mod recommend;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::AnimalTemplate;
use crate::config::ContentPolicy;
use crate::state::RosterView;

pub use chat::{ChatMessage, ChatSession, Speaker};
pub use generator::{GenerationError, TextGenerator, UnavailableGenerator};
#[cfg(feature = "remote")]
pub use openai::OpenAiGenerator;
pub use parse::ContractViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Bucket for a player level.
    #[must_use]
    pub const fn for_level(level: u32, policy: &ContentPolicy) -> Self {
        if level <= policy.beginner_max_level {
            Self::Beginner
        } else if level <= policy.intermediate_max_level {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }

    /// Bucket for the intimacy with a single animal.
    #[must_use]
    pub const fn for_intimacy(intimacy: u8, policy: &ContentPolicy) -> Self {
        if intimacy <= policy.beginner_max_intimacy {
            Self::Beginner
        } else if intimacy <= policy.intermediate_max_intimacy {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Fact,
    Conservation,
    Story,
    Quiz,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactItem {
    pub topic: String,
    pub content: String,
    pub difficulty: Difficulty,
    pub kind: FactKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    #[must_use]
    pub const fn is_correct(&self, choice: usize) -> bool {
        self.correct_answer == choice
    }
}

pub struct ContentAdvisor<G> {
    generator: G,
    policy: ContentPolicy,
}

impl ContentAdvisor<UnavailableGenerator> {
    /// Advisor that only ever serves fallback content.
    #[must_use]
    pub fn offline(policy: ContentPolicy) -> Self {
        Self::new(UnavailableGenerator, policy)
    }
}

impl<G> ContentAdvisor<G> {
    pub const fn new(generator: G, policy: ContentPolicy) -> Self {
        Self { generator, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn difficulty_for_level(&self, level: u32) -> Difficulty {
        Difficulty::for_level(level, &self.policy)
    }

    #[must_use]
    pub fn recommendations(&self, roster: &impl RosterView) -> Vec<String> {
        recommend::recommendations(roster, self.policy.max_recommendations)
    }
}

impl<G: TextGenerator> ContentAdvisor<G> {
    async fn remote(&self, what: &str, prompt: &str) -> Option<String> {
        match self.generator.generate(prompt).await {
            Ok(text) => Some(text),
            Err(GenerationError::Unavailable) => {
                log::debug!("no generator for {what}, using fallback");
                None
            }
            Err(err) => {
                log::warn!("{what} generation failed: {err}");
                None
            }
        }
    }

    /// Fact cards pitched at the player's level.
    pub async fn facts(&self, animal: &AnimalTemplate, player_level: u32) -> Vec<FactItem> {
        let difficulty = self.difficulty_for_level(player_level);
        let prompt = prompt::facts(animal, difficulty, &self.policy);
        if let Some(text) = self.remote("facts", &prompt).await {
            match parse::facts(&text, difficulty, &self.policy) {
                Ok(items) => return items,
                Err(err) => log::warn!("discarding facts for {}: {err}", animal.id),
            }
        }
        log::debug!("fallback facts for {}", animal.id);
        fallback::facts(animal, difficulty, &self.policy)
    }

    pub async fn quiz(&self, animal: &AnimalTemplate, difficulty: Difficulty) -> Vec<QuizQuestion> {
        let prompt = prompt::quiz(animal, difficulty, &self.policy);
        if let Some(text) = self.remote("quiz", &prompt).await {
            match parse::quiz(&text, &self.policy) {
                Ok(questions) => return questions,
                Err(err) => log::warn!("discarding quiz for {}: {err}", animal.id),
            }
        }
        log::debug!("fallback quiz for {}", animal.id);
        fallback::quiz(animal, difficulty, &self.policy)
    }

    /// One-off answer without conversation history.
    pub async fn chat(&self, animal: &AnimalTemplate, question: &str) -> String {
        self.chat_in_context(animal, 0, &[], question).await
    }

    pub(crate) async fn chat_in_context(
        &self,
        animal: &AnimalTemplate,
        intimacy: u8,
        context: &[ChatMessage],
        question: &str,
    ) -> String {
        let prompt = prompt::chat(animal, intimacy, context, question, &self.policy);
        if let Some(text) = self.remote("chat", &prompt).await {
            match parse::chat(&text, &self.policy) {
                Ok(reply) => return reply,
                Err(err) => log::warn!("discarding chat reply for {}: {err}", animal.id),
            }
        }
        fallback::chat(animal, question, &self.policy)
    }
}
