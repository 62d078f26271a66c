use std::fmt::Write as _;

use super::Difficulty;
use super::chat::{ChatMessage, Speaker};
use crate::catalog::AnimalTemplate;
use crate::config::ContentPolicy;

fn animal_profile(animal: &AnimalTemplate) -> String {
    format!(
        "- Habitat: {}\n- Diet: {}\n- Conservation status: {}\n- Description: {}",
        animal.habitat,
        animal.diet.join(", "),
        animal.conservation,
        animal.description,
    )
}

pub(super) fn facts(animal: &AnimalTemplate, difficulty: Difficulty, policy: &ContentPolicy) -> String {
    format!(
        "As a New Zealand wildlife conservation expert, write educational content about {name} ({species}).\n\n\
         Animal information:\n{profile}\n\n\
         Write between 1 and {max} numbered items at {difficulty} level. \
         Start each item with a short topic followed by a colon, then the content. \
         Cover an interesting fact, conservation knowledge and an ecological story.",
        name = animal.display_name,
        species = animal.species,
        profile = animal_profile(animal),
        max = policy.max_facts,
    )
}

pub(super) fn quiz(animal: &AnimalTemplate, difficulty: Difficulty, policy: &ContentPolicy) -> String {
    format!(
        "Create a {difficulty} level quiz about {name} ({species}).\n\n\
         Animal information:\n{profile}\n\n\
         Reply with only a JSON array of at most {max} objects. Each object has \"question\", \
         \"options\" (exactly {options} strings), \"correct_answer\" (zero-based index) and \
         \"explanation\" fields.",
        name = animal.display_name,
        species = animal.species,
        profile = animal_profile(animal),
        max = policy.max_quiz_questions,
        options = policy.quiz_options,
    )
}

pub(super) fn chat(
    animal: &AnimalTemplate,
    intimacy: u8,
    context: &[ChatMessage],
    message: &str,
    policy: &ContentPolicy,
) -> String {
    let mut history = String::new();
    if context.is_empty() {
        history.push_str("This is your first conversation.\n");
    }
    for entry in context {
        let speaker = match entry.speaker {
            Speaker::Player => "Player",
            Speaker::Animal => animal.display_name.as_str(),
        };
        let _ = writeln!(history, "{speaker}: {}", entry.text);
    }
    format!(
        "You are {name}, a {species} living in {habitat}, New Zealand.\n\n\
         Character:\n{profile}\n- Friendship level: {intimacy} of 10\n\n\
         Speak in the first person as the animal. Be friendly, accurate and suitable for children. \
         Care about conservation. Be warmer at higher friendship levels. \
         Keep the reply under {limit} characters.\n\n\
         Conversation so far:\n{history}\nPlayer says: {message}\n\nReply as {name}:",
        name = animal.display_name,
        species = animal.species,
        habitat = animal.habitat,
        profile = animal_profile(animal),
        limit = policy.chat_max_chars,
    )
}
