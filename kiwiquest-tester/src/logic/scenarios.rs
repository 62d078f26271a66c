use std::fmt;

use anyhow::{Context, Result, anyhow, ensure};
use kiwiquest_game::constants::INTIMACY_MAX;
use kiwiquest_game::{
    ChatSession, Difficulty, EcoAction, EcoGame, EmbeddedLoader, GameConfig,
    GameEngine, GameMode, MemoryStorage, ModeRequest, ModeState, PlaySession, QuizRound, Region,
    SessionState, UnavailableGenerator, deserialize, serialize,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const PLAY_STEPS: usize = 60;
const ECO_STEP_LIMIT: usize = 200;
const TAMPER_ATTEMPTS: usize = 12;
const CHAT_LINES: [&str; 5] = [
    "Hello there!",
    "What do you like to eat?",
    "Are you endangered?",
    "Where do you sleep?",
    "",
];

/// Save string attached to a failure so it can be written out as an artifact.
#[derive(Debug, Clone)]
pub struct FailedSave {
    pub save: String,
}

impl fmt::Display for FailedSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save under test ({} bytes)", self.save.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Smoke,
    CaptureFeed,
    ModeWalk,
    SaveRoundtrip,
    SaveTamper,
    ContentFallback,
    QuizReward,
    EcoGame,
}

impl Scenario {
    pub const ALL: [Self; 8] = [
        Self::Smoke,
        Self::CaptureFeed,
        Self::ModeWalk,
        Self::SaveRoundtrip,
        Self::SaveTamper,
        Self::ContentFallback,
        Self::QuizReward,
        Self::EcoGame,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::CaptureFeed => "capture-feed",
            Self::ModeWalk => "mode-walk",
            Self::SaveRoundtrip => "save-roundtrip",
            Self::SaveTamper => "save-tamper",
            Self::ContentFallback => "content-fallback",
            Self::QuizReward => "quiz-reward",
            Self::EcoGame => "eco-game",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Smoke => "Smoke Test",
            Self::CaptureFeed => "Capture And Feed",
            Self::ModeWalk => "Mode Walk",
            Self::SaveRoundtrip => "Save Round Trip",
            Self::SaveTamper => "Tampered Saves",
            Self::ContentFallback => "Offline Content",
            Self::QuizReward => "Quiz Reward",
            Self::EcoGame => "Eco Restoration",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Smoke => "Fresh session loads bundled data and starts on the map",
            Self::CaptureFeed => "Encounter, capture and feed with random foods",
            Self::ModeWalk => "Random mode requests keep session and controller in step",
            Self::SaveRoundtrip => "Save through the engine and load back unchanged",
            Self::SaveTamper => "Corrupted saves fail cleanly or load consistent",
            Self::ContentFallback => "Facts, quizzes and chat work with no generator",
            Self::QuizReward => "Answer a quiz mini-game and bank the reward",
            Self::EcoGame => "Play the habitat puzzle and bank the reward",
        }
    }

    pub fn find(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|scenario| scenario.key() == key)
    }

    /// Run one iteration with `seed`.
    ///
    /// # Errors
    ///
    /// Returns the first broken expectation.
    pub async fn run(self, seed: u64) -> Result<()> {
        match self {
            Self::Smoke => smoke(),
            Self::CaptureFeed => capture_feed(seed),
            Self::ModeWalk => mode_walk(seed),
            Self::SaveRoundtrip => save_roundtrip(seed),
            Self::SaveTamper => save_tamper(seed),
            Self::ContentFallback => content_fallback(seed).await,
            Self::QuizReward => quiz_reward(seed).await,
            Self::EcoGame => eco_game(seed),
        }
    }
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    Scenario::ALL
        .iter()
        .map(|scenario| (scenario.key(), scenario.description()))
        .collect()
}

fn engine() -> GameEngine<EmbeddedLoader, MemoryStorage> {
    GameEngine::new(EmbeddedLoader, MemoryStorage::default())
}

fn check_invariants(state: &SessionState) -> Result<()> {
    let violations = state.invariant_violations();
    ensure!(
        violations.is_empty(),
        "invariants broken: {}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    );
    Ok(())
}

fn random_region(rng: &mut ChaCha20Rng) -> Region {
    if rng.random_bool(0.5) {
        Region::North
    } else {
        Region::South
    }
}

/// Seeded play: wander between regions, capture what turns up and feed it.
fn play(session: &mut PlaySession, rng: &mut ChaCha20Rng, steps: usize) -> Result<()> {
    let foods: Vec<String> = session
        .foods()
        .foods
        .iter()
        .map(|food| food.name.clone())
        .collect();

    for _ in 0..steps {
        match session.state().mode() {
            GameMode::Map => {
                session.select_region(random_region(rng));
                session
                    .request(ModeRequest::EnterEncounter)
                    .context("entering an encounter with a region selected")?;
            }
            GameMode::Encounter => {
                if rng.random_bool(0.7) {
                    session.capture_encounter();
                }
                session.request(ModeRequest::ExitEncounter)?;
            }
            GameMode::Collection | GameMode::Minigame => {
                session.request(ModeRequest::CloseCollection).ok();
            }
        }

        let captured: Vec<String> = session
            .state()
            .list_captured()
            .iter()
            .map(|record| record.id().to_string())
            .collect();
        if !captured.is_empty() && !foods.is_empty() {
            let id = &captured[rng.random_range(0..captured.len())];
            let food = &foods[rng.random_range(0..foods.len())];
            session.offer_food(id, food);
        }
        check_invariants(session.state())?;
    }
    Ok(())
}

fn smoke() -> Result<()> {
    let engine = engine();
    let session = engine.new_session(0)?;
    let state = session.state();
    ensure!(!state.list_all().is_empty(), "bundled catalog is empty");
    ensure!(state.list_captured().is_empty(), "fresh session has captures");
    ensure!(state.mode() == GameMode::Map, "fresh session not on the map");
    ensure!(state.region().is_none(), "fresh session has a region");
    ensure!(state.player_level() == 1, "fresh player level should be 1");
    ensure!(
        engine.config()? == GameConfig::default_config(),
        "bundled config differs from defaults"
    );
    check_invariants(state)
}

fn capture_feed(seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut session = engine().new_session(seed)?;
    play(&mut session, &mut rng, PLAY_STEPS)?;

    let state = session.state();
    let discovered = state.discovered_ids().len();
    ensure!(
        discovered == state.list_captured().len(),
        "discovered {discovered} but captured {}",
        state.list_captured().len()
    );
    for record in state.list_all() {
        ensure!(
            record.intimacy() <= INTIMACY_MAX,
            "{} intimacy {} over cap",
            record.id(),
            record.intimacy()
        );
    }
    Ok(())
}

fn mode_walk(seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut session = engine().new_session(seed)?;
    let ids: Vec<String> = session
        .state()
        .list_all()
        .iter()
        .map(|record| record.id().to_string())
        .collect();

    let mut accepted = 0_u64;
    for _ in 0..PLAY_STEPS * 2 {
        if rng.random_bool(0.2) {
            session.select_region(random_region(&mut rng));
        }
        if rng.random_bool(0.3) {
            session.capture_encounter();
        }
        let request = match rng.random_range(0..6) {
            0 => ModeRequest::EnterEncounter,
            1 => ModeRequest::ExitEncounter,
            2 => ModeRequest::OpenCollection,
            3 => ModeRequest::CloseCollection,
            4 => ModeRequest::StartMinigame {
                animal_id: ids[rng.random_range(0..ids.len())].clone(),
            },
            _ => ModeRequest::FinishMinigame,
        };

        let before = session.controller().state().clone();
        match session.request(request) {
            Ok(transition) => {
                accepted += 1;
                ensure!(
                    transition.epoch == accepted,
                    "epoch {} after {accepted} transitions",
                    transition.epoch
                );
                if let ModeState::Minigame { animal_id } = &transition.state {
                    ensure!(
                        session.state().is_captured(animal_id),
                        "mini-game started for uncaptured {animal_id}"
                    );
                }
            }
            Err(_) => {
                ensure!(
                    session.controller().state() == &before,
                    "denied request changed the controller"
                );
            }
        }
        ensure!(
            session.state().mode() == session.controller().mode(),
            "session mode {} but controller {}",
            session.state().mode(),
            session.controller().mode()
        );
        check_invariants(session.state())?;
    }
    Ok(())
}

fn save_roundtrip(seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine();
    let mut session = engine.new_session(seed)?;
    play(&mut session, &mut rng, PLAY_STEPS)?;
    // Transient modes are not restored on load
    if session.state().mode() == GameMode::Encounter {
        session.request(ModeRequest::ExitEncounter)?;
    }
    session.request(ModeRequest::OpenCollection)?;

    engine.save("tester", &session)?;
    let save = engine
        .storage()
        .raw("kiwiquest.save.tester")
        .ok_or_else(|| anyhow!("save slot is empty after saving"))?;

    let loaded = engine
        .load("tester", seed)
        .context(FailedSave { save: save.clone() })?
        .ok_or_else(|| anyhow!("saved slot not found"))?;

    compare_states(session.state(), loaded.state()).context(FailedSave { save })
}

fn compare_states(original: &SessionState, restored: &SessionState) -> Result<()> {
    ensure!(
        restored.snapshot() == original.snapshot(),
        "progress differs after load"
    );
    for record in original.list_all() {
        let twin = restored
            .get(record.id())
            .ok_or_else(|| anyhow!("{} missing after load", record.id()))?;
        ensure!(
            twin.captured() == record.captured() && twin.intimacy() == record.intimacy(),
            "{} changed after load",
            record.id()
        );
    }
    check_invariants(restored)
}

fn save_tamper(seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut session = engine().new_session(seed)?;
    play(&mut session, &mut rng, PLAY_STEPS / 2)?;
    let save = serialize(session.state());

    for _ in 0..TAMPER_ATTEMPTS {
        let tampered = tamper(&save, &mut rng);
        let mut target = session.state().clone();
        let before = target.clone();
        match target.restore(&tampered) {
            Ok(()) => check_invariants(&target).context(FailedSave {
                save: tampered.clone(),
            })?,
            Err(_) => {
                ensure!(target == before, "failed restore modified the session");
            }
        }
        if let Ok(decoded) = deserialize(&tampered) {
            check_invariants(&decoded).context(FailedSave { save: tampered })?;
        }
    }
    Ok(())
}

fn tamper(save: &str, rng: &mut ChaCha20Rng) -> String {
    match rng.random_range(0..5) {
        0 => {
            let mut cut = rng.random_range(0..save.len().max(1));
            while !save.is_char_boundary(cut) {
                cut -= 1;
            }
            save[..cut].to_string()
        }
        1 => save.replacen("\"version\":1", "\"version\":99", 1),
        2 => save.replacen("\"captured\":false", "\"captured\":true", 1),
        3 => save.replace(
            "\"discovered_ids\":[",
            "\"discovered_ids\":[\"moa\",\"tuatara\",",
        ),
        _ => save.replacen("\"intimacy\":", "\"intimacy\":-40", 1),
    }
}

async fn content_fallback(seed: u64) -> Result<()> {
    let engine = engine();
    let advisor = engine.advisor(UnavailableGenerator)?;
    let policy = advisor.policy().clone();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let session = engine.new_session(seed)?;

    for record in session.state().list_all() {
        let template = record.template();
        let level = rng.random_range(1..=10);
        let facts = advisor.facts(template, level).await;
        ensure!(
            (1..=policy.max_facts).contains(&facts.len()),
            "{}: {} facts",
            record.id(),
            facts.len()
        );

        for difficulty in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advanced,
        ] {
            let quiz = advisor.quiz(template, difficulty).await;
            ensure!(!quiz.is_empty(), "{}: empty {difficulty} quiz", record.id());
            for question in &quiz {
                ensure!(
                    question.options.len() == policy.quiz_options,
                    "{}: question has {} options",
                    record.id(),
                    question.options.len()
                );
                ensure!(
                    question.correct_answer < question.options.len(),
                    "{}: answer index out of range",
                    record.id()
                );
            }
        }

        let mut chat = ChatSession::for_advisor(&advisor, record.id());
        let line = CHAT_LINES[rng.random_range(0..CHAT_LINES.len())];
        let reply = chat.send(&advisor, record, line).await;
        ensure!(!reply.trim().is_empty(), "{}: empty chat reply", record.id());
        ensure!(
            reply.chars().count() <= policy.chat_max_chars,
            "{}: chat reply too long",
            record.id()
        );
        ensure!(chat.len() == 2, "chat history should hold both sides");
    }
    Ok(())
}

async fn quiz_reward(seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine();
    let tuning = engine.config()?.minigame;
    let advisor = engine.advisor(UnavailableGenerator)?;
    let mut session = engine.new_session(seed)?;

    let ids: Vec<String> = session
        .state()
        .list_all()
        .iter()
        .map(|record| record.id().to_string())
        .collect();
    let id = ids[rng.random_range(0..ids.len())].clone();
    session.state_mut().capture(&id);

    session.request(ModeRequest::OpenCollection)?;
    session.request(ModeRequest::StartMinigame {
        animal_id: id.clone(),
    })?;

    let record = session
        .state()
        .get(&id)
        .ok_or_else(|| anyhow!("{id} vanished"))?;
    let difficulty = Difficulty::for_intimacy(record.intimacy(), advisor.policy());
    let mut round = QuizRound::new(advisor.quiz(record.template(), difficulty).await);
    while let Some(index) = round.current() {
        let options = round.questions()[index].options.len();
        let choice = rng.random_range(0..options.max(1));
        ensure!(
            round.answer(index, choice).is_some(),
            "question {index} rejected its first answer"
        );
    }
    ensure!(round.is_finished(), "quiz round did not finish");

    let before = session.state().get(&id).map_or(0, |r| i32::from(r.intimacy()));
    let reward = round.reward(&tuning);
    session.finish_minigame(reward)?;
    let after = session.state().get(&id).map_or(0, |r| i32::from(r.intimacy()));
    ensure!(
        after == (before + reward).min(i32::from(INTIMACY_MAX)),
        "reward {reward} took intimacy {before} to {after}"
    );
    ensure!(
        session.state().mode() == GameMode::Collection,
        "finishing a mini-game should return to the collection"
    );
    check_invariants(session.state())
}

fn eco_game(seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine();
    let tuning = engine.config()?.minigame;
    let mut session = engine.new_session(seed)?;
    session.state_mut().capture("kakapo");
    session.request(ModeRequest::OpenCollection)?;
    session.request(ModeRequest::StartMinigame {
        animal_id: "kakapo".to_string(),
    })?;

    let mut game = EcoGame::new();
    for _ in 0..ECO_STEP_LIMIT {
        if game.is_won() {
            break;
        }
        let action = match rng.random_range(0..6) {
            0 | 1 => EcoAction::Plant,
            2 => EcoAction::Cut,
            3 | 4 => EcoAction::Feed,
            _ => EcoAction::Relocate {
                safe: rng.random_bool(0.8),
            },
        };
        let snapshot = game;
        if game.apply(action).is_err() {
            ensure!(game == snapshot, "refused {action:?} still changed the game");
        }
        ensure!(
            game.birds <= 100 && game.environment <= 100,
            "meters out of range: birds {} environment {}",
            game.birds,
            game.environment
        );
    }

    let reward = game.reward(&tuning);
    ensure!(
        reward == 0 || game.is_won(),
        "reward {reward} paid for an unfinished game"
    );
    session.finish_minigame(reward)?;
    check_invariants(session.state())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_find() {
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::find(scenario.key()), Some(scenario));
        }
        assert_eq!(Scenario::find(" Smoke "), Some(Scenario::Smoke));
        assert!(Scenario::find("real-game").is_none());
    }

    #[test]
    fn listing_covers_every_scenario() {
        let listed = list_scenarios();
        assert_eq!(listed.len(), Scenario::ALL.len());
        assert!(listed.iter().all(|(_, description)| !description.is_empty()));
    }

    #[test]
    fn tamper_never_panics_on_short_saves() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        for _ in 0..50 {
            let _ = tamper("", &mut rng);
            let _ = tamper("{\"version\":1}", &mut rng);
        }
    }

    #[tokio::test]
    async fn every_scenario_passes_for_a_few_seeds() {
        for scenario in Scenario::ALL {
            for seed in [0, 1, 1337] {
                if let Err(err) = scenario.run(seed).await {
                    panic!("{} seed {seed}: {err:#}", scenario.key());
                }
            }
        }
    }

    #[test]
    fn failed_save_is_recoverable_from_error() {
        let err = Err::<(), _>(anyhow!("boom"))
            .context(FailedSave {
                save: "{}".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.downcast_ref::<FailedSave>().map(|f| f.save.as_str()), Some("{}"));
    }
}
