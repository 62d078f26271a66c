//! Mini-games played from the collection screen.
//!
//! Games never touch the session directly. They report a reward which the
//! caller applies through [`crate::SessionState::reward`] before finishing.
use serde::{Deserialize, Serialize};

use crate::config::MinigameTuning;
use crate::content::QuizQuestion;

const ECO_START_BIRDS: u8 = 50;
const ECO_START_ENVIRONMENT: u8 = 75;
const ECO_START_TREES: u8 = 10;
const ECO_PREDATORS: u8 = 3;
const ECO_METER_MAX: u8 = 100;
const ECO_WIN_THRESHOLD: u8 = 80;

const PLANT_ENVIRONMENT_COST: u8 = 5;
const PLANT_BIRD_GAIN: i32 = 10;
const CUT_ENVIRONMENT_GAIN: i32 = 5;
const CUT_BIRD_LOSS: i32 = -15;
const FEED_BIRD_GAIN: i32 = 5;
const SAFE_BIRD_GAIN: i32 = 2;
const SAFE_ENVIRONMENT_GAIN: i32 = 1;
const DANGER_BIRD_LOSS: i32 = -3;

/// A quiz being answered one question at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRound {
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<usize>>,
}

impl QuizRound {
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        Self { questions, answers }
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Index of the first unanswered question.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.answers.iter().position(Option::is_none)
    }

    /// Record `choice` for question `index`.
    ///
    /// Returns whether the answer was correct, or `None` when the question
    /// does not exist or was already answered.
    pub fn answer(&mut self, index: usize, choice: usize) -> Option<bool> {
        let question = self.questions.get(index)?;
        let slot = self.answers.get_mut(index)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(choice);
        Some(question.is_correct(choice))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| answer.is_some_and(|choice| question.is_correct(choice)))
            .count()
    }

    /// Share of correct answers as a whole percentage.
    #[must_use]
    pub fn score_pct(&self) -> u32 {
        let total = self.questions.len();
        if total == 0 {
            return 0;
        }
        u32::try_from(self.correct_count() * 100 / total).unwrap_or(0)
    }

    /// Intimacy earned by this round.
    #[must_use]
    pub fn reward(&self, tuning: &MinigameTuning) -> i32 {
        let pct = self.score_pct();
        if self.questions.is_empty() {
            0
        } else if pct >= tuning.quiz_high_pct {
            tuning.quiz_high_reward
        } else if pct >= tuning.quiz_pass_pct {
            tuning.quiz_pass_reward
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcoAction {
    Plant,
    Cut,
    Feed,
    Relocate { safe: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcoRefusal {
    NotEnoughEnvironment,
    NoTreesLeft,
    AlreadyWon,
}

fn nudge(meter: u8, delta: i32) -> u8 {
    let next = (i32::from(meter) + delta).clamp(0, i32::from(ECO_METER_MAX));
    u8::try_from(next).unwrap_or(ECO_METER_MAX)
}

/// Habitat restoration puzzle: grow the bird population and the environment
/// while getting the bird to the predator-free island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcoGame {
    pub birds: u8,
    pub environment: u8,
    pub trees: u8,
    pub predators: u8,
    pub bird_safe: bool,
}

impl Default for EcoGame {
    fn default() -> Self {
        Self {
            birds: ECO_START_BIRDS,
            environment: ECO_START_ENVIRONMENT,
            trees: ECO_START_TREES,
            predators: ECO_PREDATORS,
            bird_safe: false,
        }
    }
}

impl EcoGame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_won(&self) -> bool {
        self.birds >= ECO_WIN_THRESHOLD && self.environment >= ECO_WIN_THRESHOLD && self.bird_safe
    }

    /// # Errors
    ///
    /// Returns an [`EcoRefusal`] when the action's requirement is not met or
    /// the game is already won. The game is unchanged in that case.
    pub fn apply(&mut self, action: EcoAction) -> Result<(), EcoRefusal> {
        if self.is_won() {
            return Err(EcoRefusal::AlreadyWon);
        }
        match action {
            EcoAction::Plant => {
                if self.environment < PLANT_ENVIRONMENT_COST {
                    return Err(EcoRefusal::NotEnoughEnvironment);
                }
                self.trees = nudge(self.trees, 1);
                self.environment -= PLANT_ENVIRONMENT_COST;
                self.birds = nudge(self.birds, PLANT_BIRD_GAIN);
            }
            EcoAction::Cut => {
                if self.trees == 0 {
                    return Err(EcoRefusal::NoTreesLeft);
                }
                self.trees -= 1;
                self.environment = nudge(self.environment, CUT_ENVIRONMENT_GAIN);
                self.birds = nudge(self.birds, CUT_BIRD_LOSS);
            }
            EcoAction::Feed => self.birds = nudge(self.birds, FEED_BIRD_GAIN),
            EcoAction::Relocate { safe } => {
                self.bird_safe = safe;
                if safe {
                    self.birds = nudge(self.birds, SAFE_BIRD_GAIN);
                    self.environment = nudge(self.environment, SAFE_ENVIRONMENT_GAIN);
                } else {
                    self.birds = nudge(self.birds, DANGER_BIRD_LOSS);
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn reward(&self, tuning: &MinigameTuning) -> i32 {
        if self.is_won() { tuning.eco_win_reward } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            question: "Q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: correct,
            explanation: "E".to_string(),
        }
    }

    fn round_with(correct: usize, total: usize) -> QuizRound {
        let mut round = QuizRound::new((0..total).map(|_| question(1)).collect());
        for index in 0..total {
            let choice = if index < correct { 1 } else { 0 };
            round.answer(index, choice);
        }
        round
    }

    #[test]
    fn quiz_reward_thresholds() {
        let tuning = MinigameTuning::default();
        assert_eq!(round_with(5, 5).reward(&tuning), 2);
        assert_eq!(round_with(4, 5).reward(&tuning), 2);
        assert_eq!(round_with(3, 5).reward(&tuning), 1);
        assert_eq!(round_with(2, 5).reward(&tuning), 0);
        assert_eq!(round_with(1, 2).reward(&tuning), 0);
        assert_eq!(QuizRound::new(Vec::new()).reward(&tuning), 0);
    }

    #[test]
    fn answers_are_recorded_once() {
        let mut round = QuizRound::new(vec![question(0), question(3)]);
        assert_eq!(round.current(), Some(0));
        assert_eq!(round.answer(0, 0), Some(true));
        assert_eq!(round.answer(0, 1), None);
        assert_eq!(round.answer(5, 0), None);
        assert_eq!(round.current(), Some(1));
        assert_eq!(round.answer(1, 2), Some(false));
        assert!(round.is_finished());
        assert_eq!(round.score_pct(), 50);
    }

    #[test]
    fn eco_actions_move_meters() {
        let mut game = EcoGame::new();
        game.apply(EcoAction::Plant).unwrap();
        assert_eq!((game.trees, game.environment, game.birds), (11, 70, 60));
        game.apply(EcoAction::Cut).unwrap();
        assert_eq!((game.trees, game.environment, game.birds), (10, 75, 45));
        game.apply(EcoAction::Feed).unwrap();
        assert_eq!(game.birds, 50);
        game.apply(EcoAction::Relocate { safe: false }).unwrap();
        assert_eq!(game.birds, 47);
        assert!(!game.bird_safe);
    }

    #[test]
    fn eco_requirements_refuse_without_change() {
        let mut game = EcoGame {
            environment: 4,
            trees: 0,
            ..EcoGame::default()
        };
        let before = game;
        assert_eq!(game.apply(EcoAction::Plant), Err(EcoRefusal::NotEnoughEnvironment));
        assert_eq!(game.apply(EcoAction::Cut), Err(EcoRefusal::NoTreesLeft));
        assert_eq!(game, before);
    }

    #[test]
    fn eco_meters_clamp_and_game_can_be_won() {
        let tuning = MinigameTuning::default();
        let mut game = EcoGame::new();
        for _ in 0..20 {
            game.apply(EcoAction::Feed).unwrap();
        }
        assert_eq!(game.birds, 100);
        assert_eq!(game.reward(&tuning), 0);
        for _ in 0..5 {
            game.apply(EcoAction::Relocate { safe: true }).unwrap();
        }
        assert!(game.environment >= 80);
        assert!(game.is_won());
        assert_eq!(game.reward(&tuning), 2);
        assert_eq!(game.apply(EcoAction::Feed), Err(EcoRefusal::AlreadyWon));
    }
}
