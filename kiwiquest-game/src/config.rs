//! Tunable policy for content generation and mini-games.
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_CONFIG_DATA: &str = include_str!("../assets/data/config.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub content: ContentPolicy,
    #[serde(default)]
    pub minigame: MinigameTuning,
}

impl GameConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CONFIG_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }
}

/// Bucket boundaries and shape limits owned by the content advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPolicy {
    #[serde(default = "default_beginner_max_level")]
    pub beginner_max_level: u32,
    #[serde(default = "default_intermediate_max_level")]
    pub intermediate_max_level: u32,
    #[serde(default = "default_beginner_max_intimacy")]
    pub beginner_max_intimacy: u8,
    #[serde(default = "default_intermediate_max_intimacy")]
    pub intermediate_max_intimacy: u8,
    #[serde(default = "default_max_facts")]
    pub max_facts: usize,
    #[serde(default = "default_max_quiz_questions")]
    pub max_quiz_questions: usize,
    #[serde(default = "default_quiz_options")]
    pub quiz_options: usize,
    #[serde(default = "default_chat_max_chars")]
    pub chat_max_chars: usize,
    #[serde(default = "default_chat_history_limit")]
    pub chat_history_limit: usize,
    #[serde(default = "default_chat_context_messages")]
    pub chat_context_messages: usize,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            beginner_max_level: default_beginner_max_level(),
            intermediate_max_level: default_intermediate_max_level(),
            beginner_max_intimacy: default_beginner_max_intimacy(),
            intermediate_max_intimacy: default_intermediate_max_intimacy(),
            max_facts: default_max_facts(),
            max_quiz_questions: default_max_quiz_questions(),
            quiz_options: default_quiz_options(),
            chat_max_chars: default_chat_max_chars(),
            chat_history_limit: default_chat_history_limit(),
            chat_context_messages: default_chat_context_messages(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinigameTuning {
    #[serde(default = "default_quiz_high_pct")]
    pub quiz_high_pct: u32,
    #[serde(default = "default_quiz_high_reward")]
    pub quiz_high_reward: i32,
    #[serde(default = "default_quiz_pass_pct")]
    pub quiz_pass_pct: u32,
    #[serde(default = "default_quiz_pass_reward")]
    pub quiz_pass_reward: i32,
    #[serde(default = "default_eco_win_reward")]
    pub eco_win_reward: i32,
}

impl Default for MinigameTuning {
    fn default() -> Self {
        Self {
            quiz_high_pct: default_quiz_high_pct(),
            quiz_high_reward: default_quiz_high_reward(),
            quiz_pass_pct: default_quiz_pass_pct(),
            quiz_pass_reward: default_quiz_pass_reward(),
            eco_win_reward: default_eco_win_reward(),
        }
    }
}

const fn default_beginner_max_level() -> u32 {
    2
}

const fn default_intermediate_max_level() -> u32 {
    5
}

const fn default_beginner_max_intimacy() -> u8 {
    3
}

const fn default_intermediate_max_intimacy() -> u8 {
    7
}

const fn default_max_facts() -> usize {
    4
}

const fn default_max_quiz_questions() -> usize {
    3
}

const fn default_quiz_options() -> usize {
    4
}

const fn default_chat_max_chars() -> usize {
    600
}

const fn default_chat_history_limit() -> usize {
    10
}

const fn default_chat_context_messages() -> usize {
    6
}

const fn default_max_recommendations() -> usize {
    3
}

const fn default_quiz_high_pct() -> u32 {
    80
}

const fn default_quiz_high_reward() -> i32 {
    2
}

const fn default_quiz_pass_pct() -> u32 {
    60
}

const fn default_quiz_pass_reward() -> i32 {
    1
}

const fn default_eco_win_reward() -> i32 {
    2
}
