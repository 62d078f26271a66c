//! KiwiQuest Game Engine
//!
//! Platform-agnostic session core for the KiwiQuest wildlife collection game.
//! This crate owns the animal roster, feeding rules, the mode state machine,
//! save encoding and educational content, without UI or platform dependencies.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod constants;
pub mod content;
pub mod data;
pub mod feeding;
pub mod minigame;
pub mod mode;
pub mod seed;
pub mod session;
pub mod state;

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

// Re-export commonly used types
pub use catalog::{AnimalCatalog, AnimalTemplate, ConservationTier, DietTags, Region, RegionRange};
pub use codec::{DecodeError, deserialize, deserialize_with, serialize};
pub use config::{ContentPolicy, GameConfig, MinigameTuning};
pub use content::{
    ChatSession, ContentAdvisor, Difficulty, FactItem, FactKind, GenerationError, QuizQuestion,
    TextGenerator, UnavailableGenerator,
};
pub use data::{EmbeddedLoader, LoadError};
pub use feeding::{
    FeedTier, FeedingOutcome, FoodCatalog, FoodCategory, FoodItem, available_foods, evaluate,
};
pub use minigame::{EcoAction, EcoGame, EcoRefusal, QuizRound};
pub use mode::{
    DenialReason, EncounterHost, ModeController, ModeRequest, ModeState, Transition,
    TransitionDenied,
};
pub use seed::{derive_stream_seed, text_bucket};
pub use session::PlaySession;
pub use state::{
    AnimalRecord, GameMode, InvariantViolation, RosterFilter, RosterSort, RosterView,
    SessionProgress, SessionState,
};

use constants::SAVE_SLOT_PREFIX;

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the animal catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<AnimalCatalog, Self::Error>;

    /// Load the foods offered in the feeding panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the food catalog cannot be loaded.
    fn load_foods(&self) -> Result<FoodCatalog, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Named slots holding save strings.
pub trait SaveStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the save string cannot be stored.
    fn save(&self, slot: &str, data: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    fn load(&self, slot: &str) -> Result<Option<String>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    fn delete(&self, slot: &str) -> Result<(), Self::Error>;
}

/// In-process storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Overwrite a raw slot, bypassing the engine.
    pub fn put_raw(&self, key: &str, data: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), data.to_string());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl SaveStorage for MemoryStorage {
    type Error = Infallible;

    fn save(&self, slot: &str, data: &str) -> Result<(), Self::Error> {
        self.put_raw(slot, data);
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(slot))
    }

    fn delete(&self, slot: &str) -> Result<(), Self::Error> {
        self.slots.borrow_mut().remove(slot);
        Ok(())
    }
}

fn slot_key(slot: &str) -> String {
    format!("{SAVE_SLOT_PREFIX}{slot}")
}

/// Main game engine wiring data, storage and sessions together
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: SaveStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: SaveStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Start a fresh session. `seed` fixes the encounter sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if catalog or food data cannot be loaded.
    pub fn new_session(&self, seed: u64) -> Result<PlaySession, L::Error> {
        let catalog = self.data_loader.load_catalog()?;
        let foods = self.data_loader.load_foods()?;
        Ok(PlaySession::new(SessionState::new(&catalog), foods, seed))
    }

    /// Load the game configuration, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn config(&self) -> Result<GameConfig, L::Error> {
        self.data_loader.load_config("config")
    }

    /// Build a content advisor that uses `generator` with the loaded policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn advisor<G>(&self, generator: G) -> Result<ContentAdvisor<G>, L::Error>
    where
        G: TextGenerator,
    {
        Ok(ContentAdvisor::new(generator, self.config()?.content))
    }

    /// Save a session
    ///
    /// # Errors
    ///
    /// Returns an error if the save string cannot be stored.
    pub fn save(&self, slot: &str, session: &PlaySession) -> Result<(), S::Error> {
        self.storage
            .save(&slot_key(slot), &codec::serialize(session.state()))
    }

    /// Load a session, re-seeding its controller with `seed`
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails, data cannot be loaded, or the save
    /// cannot be decoded.
    pub fn load(&self, slot: &str, seed: u64) -> Result<Option<PlaySession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(text) = self.storage.load(&slot_key(slot)).map_err(Into::into)? else {
            return Ok(None);
        };
        // Rehydrate templates from fresh catalog data
        let catalog = self.data_loader.load_catalog().map_err(Into::into)?;
        let foods = self.data_loader.load_foods().map_err(Into::into)?;
        let state = codec::deserialize_with(&text, &catalog)?;
        Ok(Some(PlaySession::resumed(state, foods, seed)))
    }

    /// Delete a saved session
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    pub fn delete(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete(&slot_key(slot))
    }
}
