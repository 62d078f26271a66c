//! Deterministic content built only from an animal's own catalog fields.
use super::parse::clip;
use super::{Difficulty, FactItem, FactKind, QuizQuestion};
use crate::catalog::{AnimalTemplate, ConservationTier};
use crate::config::ContentPolicy;
use crate::constants::CHAT_STREAM_TAG;
use crate::seed::text_bucket;

const HABITAT_DISTRACTORS: [&str; 7] = [
    "City",
    "Desert",
    "Arctic",
    "Savanna",
    "Coral reef",
    "Sand dunes",
    "Glacier",
];
const FOOD_DISTRACTORS: [&str; 7] = [
    "Seeds", "Nectar", "Crabs", "Mice", "Grass", "Plankton", "Honey",
];

const GREETING_WORDS: [&str; 5] = ["hello", "hi", "hey", "kia", "greetings"];
const FOOD_WORDS: [&str; 6] = ["eat", "eats", "food", "hungry", "diet", "feed"];
const CONSERVATION_WORDS: [&str; 6] = [
    "protect",
    "conservation",
    "endangered",
    "environment",
    "save",
    "help",
];

fn diet_text(animal: &AnimalTemplate) -> String {
    if animal.diet.is_empty() {
        "many different foods".to_string()
    } else {
        animal.diet.join(", ")
    }
}

/// Fact cards, cut to the policy's `max_facts` (never below one card).
#[must_use]
pub fn facts(
    animal: &AnimalTemplate,
    difficulty: Difficulty,
    policy: &ContentPolicy,
) -> Vec<FactItem> {
    let name = &animal.display_name;
    let mut items = vec![
        FactItem {
            topic: "Basic Information".to_string(),
            content: format!(
                "{name} is a native animal of New Zealand, living in {}. They mainly feed on {}.",
                animal.habitat,
                diet_text(animal)
            ),
            difficulty,
            kind: FactKind::Fact,
        },
        FactItem {
            topic: "Conservation Status".to_string(),
            content: format!(
                "{name} currently has a conservation status of {}. We need to protect their habitat so these precious animals can keep thriving.",
                animal.conservation
            ),
            difficulty,
            kind: FactKind::Conservation,
        },
    ];
    if !animal.description.trim().is_empty() {
        items.push(FactItem {
            topic: "Interesting Facts".to_string(),
            content: format!(
                "{} This makes {name} an important part of New Zealand's unique ecosystem.",
                animal.description.trim()
            ),
            difficulty,
            kind: FactKind::Fact,
        });
    }
    items.truncate(policy.max_facts.max(1));
    items
}

fn conservation_distractors(tier: ConservationTier) -> Vec<String> {
    let first = if tier == ConservationTier::LeastConcern {
        "Data Deficient"
    } else {
        ConservationTier::LeastConcern.label()
    };
    let mut pool = vec![first, "Extinct", "Not Evaluated", "Data Deficient"];
    pool.extend(
        [
            ConservationTier::NearThreatened,
            ConservationTier::Vulnerable,
            ConservationTier::Endangered,
            ConservationTier::CriticallyEndangered,
        ]
        .map(ConservationTier::label),
    );
    pool.into_iter().map(ToString::to_string).collect()
}

/// Exactly `want` distinct options with `correct` at `slot`, or at the end
/// when fewer options are wanted. `None` if the pool runs dry.
fn sized_options(
    correct: &str,
    distractors: impl IntoIterator<Item = String>,
    slot: usize,
    want: usize,
) -> Option<(Vec<String>, usize)> {
    if want == 0 {
        return None;
    }
    let mut options: Vec<String> = Vec::with_capacity(want);
    for option in distractors {
        if options.len() + 1 == want {
            break;
        }
        if !option.eq_ignore_ascii_case(correct) && !options.contains(&option) {
            options.push(option);
        }
    }
    if options.len() + 1 < want {
        return None;
    }
    let slot = slot.min(options.len());
    options.insert(slot, correct.to_string());
    Some((options, slot))
}

/// Quiz sized to the policy: at most `max_quiz_questions` questions with
/// exactly `quiz_options` options each.
#[must_use]
pub fn quiz(
    animal: &AnimalTemplate,
    difficulty: Difficulty,
    policy: &ContentPolicy,
) -> Vec<QuizQuestion> {
    let name = &animal.display_name;
    let want = policy.quiz_options;
    let mut questions = Vec::new();

    if let Some((options, correct_answer)) = sized_options(
        &animal.habitat,
        HABITAT_DISTRACTORS.iter().map(ToString::to_string),
        0,
        want,
    ) {
        questions.push(QuizQuestion {
            question: format!("Where does {name} mainly live?"),
            options,
            correct_answer,
            explanation: format!("{name}'s main habitat is {}.", animal.habitat),
        });
    }

    if let Some((options, correct_answer)) = sized_options(
        animal.conservation.label(),
        conservation_distractors(animal.conservation),
        1,
        want,
    ) {
        questions.push(QuizQuestion {
            question: format!("What is {name}'s conservation status?"),
            options,
            correct_answer,
            explanation: format!("{name} is currently listed as {}.", animal.conservation),
        });
    }

    if difficulty != Difficulty::Beginner
        && let Some(favourite) = animal.diet.first()
        && let Some((options, correct_answer)) = sized_options(
            favourite,
            FOOD_DISTRACTORS
                .iter()
                .filter(|food| !animal.eats(food))
                .map(ToString::to_string),
            2,
            want,
        )
    {
        questions.push(QuizQuestion {
            question: format!("Which of these foods does {name} eat?"),
            options,
            correct_answer,
            explanation: format!("{name} feeds on {}.", diet_text(animal)),
        });
    }

    questions.truncate(policy.max_quiz_questions.max(1));
    questions
}

fn mentions_any(words: &[String], keywords: &[&str]) -> bool {
    words.iter().any(|word| keywords.contains(&word.as_str()))
}

/// Keyword-driven reply in the animal's voice.
#[must_use]
pub fn chat(animal: &AnimalTemplate, message: &str, policy: &ContentPolicy) -> String {
    let name = &animal.display_name;
    let favourite = animal
        .diet
        .first()
        .map_or("all sorts of food", String::as_str);
    let description = if animal.description.trim().is_empty() {
        format!("I am a {}.", animal.species)
    } else {
        animal.description.trim().to_string()
    };
    let replies = [
        format!(
            "Kia ora! I'm {name}, nice to meet you! I live in {}.",
            animal.habitat
        ),
        format!(
            "As a {}, my favourite thing to eat is {favourite}!",
            animal.species
        ),
        format!(
            "Did you know? {name} is listed as {}, so we need everyone's help to stay safe.",
            animal.conservation
        ),
        format!("{description} That's what makes us special!"),
        "I love chatting with you! What else would you like to know about me?".to_string(),
    ];

    let words: Vec<String> = message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect();
    let index = if mentions_any(&words, &GREETING_WORDS) {
        0
    } else if mentions_any(&words, &FOOD_WORDS) {
        1
    } else if mentions_any(&words, &CONSERVATION_WORDS) {
        2
    } else {
        text_bucket(CHAT_STREAM_TAG, message, replies.len())
    };
    let reply = replies.get(index).map_or("", String::as_str);
    clip(reply, policy.chat_max_chars)
}
