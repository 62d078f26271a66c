use std::collections::BTreeSet;

use kiwiquest_game::{
    AnimalCatalog, FoodCatalog, GameMode, Region, SessionState, deserialize, evaluate, serialize,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const FOOD_TAGS: [&str; 10] = [
    "Insects",
    "Worms",
    "Berries",
    "Leaves",
    "Flowers",
    "Fruits",
    "Fish",
    "Squid",
    "Small reptiles",
    "Plastic",
];

fn ids() -> Vec<String> {
    let mut ids: Vec<String> = AnimalCatalog::default_catalog()
        .ids()
        .map(str::to_string)
        .collect();
    ids.push("moa".to_string());
    ids
}

fn assert_invariants(state: &SessionState, context: &str) {
    let violations = state.invariant_violations();
    assert!(violations.is_empty(), "{context}: {violations:?}");

    let captured: BTreeSet<&str> = state
        .list_all()
        .iter()
        .filter(|record| record.captured())
        .map(|record| record.id())
        .collect();
    let discovered: BTreeSet<&str> = state.discovered_ids().iter().map(String::as_str).collect();
    assert_eq!(captured, discovered, "{context}");
    assert_eq!(discovered.len(), state.discovered_ids().len(), "{context}");
    for record in state.list_all() {
        assert!(record.intimacy() <= 10, "{context}");
        if !record.captured() {
            assert_eq!(record.intimacy(), 0, "{context}");
        }
    }
}

fn random_step(state: &mut SessionState, rng: &mut ChaCha20Rng, ids: &[String], foods: &FoodCatalog) {
    let id = &ids[rng.random_range(0..ids.len())];
    match rng.random_range(0..7) {
        0 | 1 => {
            state.capture(id);
        }
        2 => {
            let tag = FOOD_TAGS[rng.random_range(0..FOOD_TAGS.len())];
            state.feed(id, tag);
        }
        3 => {
            let food = &foods.foods[rng.random_range(0..foods.foods.len())];
            if let Some(animal) = state.get(id).cloned() {
                let outcome = evaluate(&animal, food);
                state.apply_feeding(id, &outcome);
            }
        }
        4 => {
            state.reward(id, rng.random_range(-4..=4));
        }
        5 => {
            let region = match rng.random_range(0..3) {
                0 => None,
                1 => Some(Region::North),
                _ => Some(Region::South),
            };
            state.set_region(region);
        }
        _ => {
            let restored = deserialize(&serialize(state)).expect("own saves decode");
            assert_eq!(&restored, state);
            *state = restored;
        }
    }
}

#[test]
fn invariants_hold_across_random_sessions() {
    let ids = ids();
    let foods = FoodCatalog::default_catalog();
    for seed in 0..64_u64 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = SessionState::default();
        for step in 0..120 {
            random_step(&mut state, &mut rng, &ids, &foods);
            assert_invariants(&state, &format!("seed {seed} step {step}"));
        }
    }
}

#[test]
fn save_round_trip_preserves_captures_and_intimacy() {
    let mut state = SessionState::default();
    state.capture("yellow-eyed-penguin");
    state.capture("kakapo");
    state.reward("kakapo", 6);
    state.feed("yellow-eyed-penguin", "Squid");
    state.set_region(Some(Region::South));
    state.set_mode(GameMode::Collection);

    let restored = deserialize(&serialize(&state)).unwrap();
    assert_eq!(restored.discovered_ids(), ["yellow-eyed-penguin", "kakapo"]);
    for record in state.list_all() {
        let twin = restored.get(record.id()).unwrap();
        assert_eq!(twin.captured(), record.captured());
        assert_eq!(twin.intimacy(), record.intimacy());
    }
    assert_eq!(restored.snapshot(), state.snapshot());
}

#[test]
fn tampered_discovery_list_is_ignored_on_load() {
    let mut state = SessionState::default();
    state.capture("kiwi");
    let save = serialize(&state).replace(
        r#""discovered_ids":["kiwi"]"#,
        r#""discovered_ids":["kakapo","tuatara","kiwi"]"#,
    );
    assert!(save.contains("kakapo\",\"tuatara"));

    let restored = deserialize(&save).unwrap();
    assert_eq!(restored.discovered_ids(), ["kiwi"]);
    assert!(!restored.is_captured("kakapo"));
    assert!(!restored.is_captured("tuatara"));
}

#[test]
fn failed_load_leaves_session_untouched() {
    let mut state = SessionState::default();
    state.capture("tuatara");
    let before = state.clone();
    for bad in ["", "null", "{\"version\":2,\"animals\":[]}", "{\"animals\":[]}"] {
        assert!(state.restore(bad).is_err(), "{bad:?} should fail");
        assert_eq!(state, before);
    }
}
