//! Centralized tuning constants for KiwiQuest session logic.
//!
//! The intimacy scale and save-format version are part of the persisted
//! contract; changing either requires a codec migration.

// Intimacy -----------------------------------------------------------------
pub const INTIMACY_MIN: u8 = 0;
pub const INTIMACY_MAX: u8 = 10;
pub(crate) const INTIMACY_ON_CAPTURE: u8 = 1;
pub(crate) const INTIMACY_PER_SIMPLE_FEED: i32 = 1;
pub(crate) const PLAYER_LEVEL_INTIMACY_STEP: u32 = 5;

// Feeding ------------------------------------------------------------------
pub(crate) const PREFERRED_FOOD_MULTIPLIER: i32 = 2;

// Persistence --------------------------------------------------------------
pub const SAVE_FORMAT_VERSION: u32 = 1;
pub(crate) const SAVE_SLOT_PREFIX: &str = "kiwiquest.save.";

// Randomness ---------------------------------------------------------------
pub(crate) const ENCOUNTER_STREAM_TAG: &[u8] = b"KIWIQ-ENC";
pub(crate) const CHAT_STREAM_TAG: &[u8] = b"KIWIQ-CHAT";
