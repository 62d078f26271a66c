//! Turns raw generator replies into contract-checked content.
use serde::Deserialize;
use thiserror::Error;

use super::{Difficulty, FactItem, FactKind, QuizQuestion};
use crate::config::ContentPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("reply was empty")]
    Empty,
    #[error("reply is not a JSON array: {0}")]
    NotJson(String),
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: &'static str },
}

const TOPIC_MAX_CHARS: usize = 60;

fn strip_list_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &trimmed[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim_start)
}

fn classify(content: &str) -> FactKind {
    let lowered = content.to_lowercase();
    if lowered.contains("conservation") || lowered.contains("endangered") {
        FactKind::Conservation
    } else if lowered.contains("story") || lowered.contains("legend") {
        FactKind::Story
    } else if lowered.contains("question") || lowered.contains("quiz") {
        FactKind::Quiz
    } else {
        FactKind::Fact
    }
}

fn split_topic(section: &str, index: usize) -> (String, String) {
    let cleaned = section.replace("**", "");
    if let Some((topic, body)) = cleaned.split_once(':') {
        let topic = topic.trim();
        let body = body.trim();
        if !topic.is_empty() && !body.is_empty() && topic.chars().count() <= TOPIC_MAX_CHARS {
            return (topic.to_string(), body.to_string());
        }
    }
    (format!("Content {}", index + 1), cleaned.trim().to_string())
}

/// Parse a numbered-list reply into fact cards.
///
/// # Errors
///
/// Returns [`ContractViolation::Empty`] when no non-empty item is found.
pub fn facts(
    text: &str,
    difficulty: Difficulty,
    policy: &ContentPolicy,
) -> Result<Vec<FactItem>, ContractViolation> {
    let mut sections: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = strip_list_marker(line) {
            sections.push(rest.to_string());
        } else if let Some(current) = sections.last_mut() {
            let line = line.trim();
            if !line.is_empty() {
                current.push(' ');
                current.push_str(line);
            }
        }
    }
    if sections.is_empty() && !text.trim().is_empty() {
        sections.push(text.trim().to_string());
    }

    let items: Vec<FactItem> = sections
        .iter()
        .map(|section| section.trim())
        .filter(|section| !section.is_empty())
        .take(policy.max_facts)
        .enumerate()
        .map(|(index, section)| {
            let (topic, content) = split_topic(section, index);
            FactItem {
                kind: classify(&content),
                topic,
                content,
                difficulty,
            }
        })
        .filter(|item| !item.content.is_empty())
        .collect();

    if items.is_empty() {
        return Err(ContractViolation::Empty);
    }
    Ok(items)
}

#[derive(Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "answer")]
    correct_answer: Option<usize>,
    #[serde(default)]
    explanation: String,
}

fn json_body(text: &str) -> &str {
    let trimmed = text.trim();
    match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parse a JSON quiz reply. Any invalid question rejects the whole reply.
///
/// # Errors
///
/// Returns a [`ContractViolation`] when the reply is not a JSON array, is
/// empty, or holds a question with the wrong option count, an out of range
/// answer, or blank text.
pub fn quiz(text: &str, policy: &ContentPolicy) -> Result<Vec<QuizQuestion>, ContractViolation> {
    let raw: Vec<RawQuestion> = serde_json::from_str(json_body(text))
        .map_err(|err| ContractViolation::NotJson(err.to_string()))?;
    if raw.is_empty() {
        return Err(ContractViolation::Empty);
    }

    raw.into_iter()
        .take(policy.max_quiz_questions)
        .enumerate()
        .map(|(index, question)| {
            let invalid = |reason| ContractViolation::InvalidQuestion { index, reason };
            if question.question.trim().is_empty() {
                return Err(invalid("blank question"));
            }
            if question.options.len() != policy.quiz_options {
                return Err(invalid("wrong number of options"));
            }
            if question.options.iter().any(|option| option.trim().is_empty()) {
                return Err(invalid("blank option"));
            }
            let correct_answer = question
                .correct_answer
                .filter(|answer| *answer < question.options.len())
                .ok_or_else(|| invalid("answer index out of range"))?;
            if question.explanation.trim().is_empty() {
                return Err(invalid("blank explanation"));
            }
            Ok(QuizQuestion {
                question: question.question.trim().to_string(),
                options: question.options,
                correct_answer,
                explanation: question.explanation.trim().to_string(),
            })
        })
        .collect()
}

/// Cut `text` to at most `max_chars` characters, preferring a word boundary.
#[must_use]
pub fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let clipped = match cut.rfind(char::is_whitespace) {
        Some(boundary) if boundary > 0 => &cut[..boundary],
        _ => cut.as_str(),
    };
    clipped.trim_end().to_string()
}

/// Trim and bound a chat reply.
///
/// # Errors
///
/// Returns [`ContractViolation::Empty`] for a blank reply.
pub fn chat(text: &str, policy: &ContentPolicy) -> Result<String, ContractViolation> {
    let reply = clip(text, policy.chat_max_chars);
    if reply.is_empty() {
        return Err(ContractViolation::Empty);
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ContentPolicy {
        ContentPolicy::default()
    }

    #[test]
    fn numbered_reply_becomes_fact_cards() {
        let text = "Here you go!\n1. **Night life**: Kiwi forage after dark.\n\
                    2. Habitat loss and predators keep kiwi endangered.\n   More detail here.\n\
                    3) Legend: Māori story tells how kiwi lost its wings.";
        let items = facts(text, Difficulty::Beginner, &policy()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].topic, "Night life");
        assert_eq!(items[0].kind, FactKind::Fact);
        assert_eq!(items[1].topic, "Content 2");
        assert_eq!(items[1].kind, FactKind::Conservation);
        assert!(items[1].content.ends_with("More detail here."));
        assert_eq!(items[2].kind, FactKind::Story);
    }

    #[test]
    fn fact_list_is_capped() {
        let text = (1..=9).map(|n| format!("{n}. Fact number {n}\n")).collect::<String>();
        let items = facts(&text, Difficulty::Advanced, &policy()).unwrap();
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn blank_fact_reply_is_rejected() {
        assert_eq!(
            facts("  \n ", Difficulty::Beginner, &policy()),
            Err(ContractViolation::Empty)
        );
    }

    #[test]
    fn quiz_accepts_fenced_camel_case_json() {
        let text = "```json\n[{\"question\": \"Where?\", \"options\": [\"a\",\"b\",\"c\",\"d\"], \
                    \"correctAnswer\": 2, \"explanation\": \"Because.\"}]\n```";
        let questions = quiz(text, &policy()).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, 2);
    }

    #[test]
    fn quiz_rejects_wrong_option_count() {
        let text = r#"[{"question": "Q", "options": ["a","b","c"], "correct_answer": 0, "explanation": "E"}]"#;
        assert!(matches!(
            quiz(text, &policy()),
            Err(ContractViolation::InvalidQuestion { index: 0, .. })
        ));
    }

    #[test]
    fn quiz_rejects_out_of_range_answer() {
        let text = r#"[{"question": "Q", "options": ["a","b","c","d"], "correct_answer": 4, "explanation": "E"}]"#;
        assert!(quiz(text, &policy()).is_err());
        assert!(matches!(quiz("no quiz today", &policy()), Err(ContractViolation::NotJson(_))));
        assert_eq!(quiz("[]", &policy()), Err(ContractViolation::Empty));
    }

    #[test]
    fn clip_respects_budget_and_words() {
        assert_eq!(clip("  hello world  ", 50), "hello world");
        assert_eq!(clip("hello wonderful world", 12), "hello");
        assert_eq!(clip("abcdefgh", 4), "abcd");
        assert!(chat("   ", &policy()).is_err());
    }
}
