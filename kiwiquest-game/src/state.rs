use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog::{AnimalCatalog, AnimalTemplate, Region};
use crate::constants::{
    INTIMACY_MAX, INTIMACY_MIN, INTIMACY_ON_CAPTURE, INTIMACY_PER_SIMPLE_FEED,
    PLAYER_LEVEL_INTIMACY_STEP,
};
use crate::feeding::FeedingOutcome;

/// Interactive surface currently presented to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Map,
    Encounter,
    Collection,
    Minigame,
}

impl GameMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Encounter => "encounter",
            Self::Collection => "collection",
            Self::Minigame => "minigame",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" => Ok(Self::Map),
            "encounter" => Ok(Self::Encounter),
            "collection" => Ok(Self::Collection),
            "minigame" => Ok(Self::Minigame),
            _ => Err(()),
        }
    }
}

pub(crate) fn clamp_intimacy(value: i64) -> u8 {
    let clamped = value.clamp(i64::from(INTIMACY_MIN), i64::from(INTIMACY_MAX));
    u8::try_from(clamped).unwrap_or(INTIMACY_MAX)
}

/// Lowercased name with macrons folded so Kākāpō sorts beside Kakariki.
fn name_sort_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'ā' => 'a',
            'ē' => 'e',
            'ī' => 'i',
            'ō' => 'o',
            'ū' => 'u',
            other => other,
        })
        .collect()
}

/// Catalog template plus the player's progress with that animal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalRecord {
    template: AnimalTemplate,
    captured: bool,
    intimacy: u8,
    last_interaction: Option<DateTime<Utc>>,
}

impl AnimalRecord {
    #[must_use]
    pub fn from_template(template: AnimalTemplate) -> Self {
        Self {
            template,
            captured: false,
            intimacy: 0,
            last_interaction: None,
        }
    }

    /// Rebuild a record from persisted runtime fields, repairing them so the
    /// record invariants hold.
    pub(crate) fn restored(
        template: AnimalTemplate,
        captured: bool,
        intimacy: i64,
        last_interaction: Option<DateTime<Utc>>,
    ) -> Self {
        let intimacy = if captured { clamp_intimacy(intimacy) } else { 0 };
        Self {
            template,
            captured,
            intimacy,
            last_interaction,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.template.id
    }

    #[must_use]
    pub const fn template(&self) -> &AnimalTemplate {
        &self.template
    }

    #[must_use]
    pub const fn captured(&self) -> bool {
        self.captured
    }

    #[must_use]
    pub const fn intimacy(&self) -> u8 {
        self.intimacy
    }

    #[must_use]
    pub const fn last_interaction(&self) -> Option<DateTime<Utc>> {
        self.last_interaction
    }

    fn adjust_intimacy(&mut self, delta: i32, now: DateTime<Utc>) -> u8 {
        self.intimacy = clamp_intimacy(i64::from(self.intimacy) + i64::from(delta));
        self.last_interaction = Some(now);
        self.intimacy
    }
}

impl AsRef<AnimalTemplate> for AnimalRecord {
    fn as_ref(&self) -> &AnimalTemplate {
        &self.template
    }
}

/// Progress summary the presentation layer polls after each mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionProgress {
    pub discovered_ids: Vec<String>,
    pub current_region: Option<Region>,
    pub current_mode: GameMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterFilter {
    #[default]
    All,
    Region(Region),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterSort {
    /// Discovery order.
    #[default]
    Discovered,
    Name,
    /// Highest intimacy first.
    Intimacy,
    /// Most recently fed first; never-fed animals last.
    Recent,
}

/// A broken session invariant, reported by [`SessionState::invariant_violations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    IntimacyWithoutCapture { id: String, intimacy: u8 },
    IntimacyOutOfRange { id: String, intimacy: u8 },
    DiscoveredNotCaptured { id: String },
    CapturedNotDiscovered { id: String },
    DuplicateDiscovery { id: String },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntimacyWithoutCapture { id, intimacy } => {
                write!(f, "{id} has intimacy {intimacy} but is not captured")
            }
            Self::IntimacyOutOfRange { id, intimacy } => {
                write!(f, "{id} intimacy {intimacy} exceeds {INTIMACY_MAX}")
            }
            Self::DiscoveredNotCaptured { id } => write!(f, "{id} discovered but not captured"),
            Self::CapturedNotDiscovered { id } => write!(f, "{id} captured but not discovered"),
            Self::DuplicateDiscovery { id } => write!(f, "{id} discovered more than once"),
        }
    }
}

/// Read-only view of the player's collection.
pub trait RosterView {
    /// Captured animals in capture order.
    fn captured_animals(&self) -> Vec<&AnimalRecord>;
}

impl RosterView for SessionState {
    fn captured_animals(&self) -> Vec<&AnimalRecord> {
        self.list_captured()
    }
}

/// Single mutable source of truth for one play session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    records: Vec<AnimalRecord>,
    progress: SessionProgress,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&AnimalCatalog::default_catalog())
    }
}

impl SessionState {
    #[must_use]
    pub fn new(catalog: &AnimalCatalog) -> Self {
        Self {
            records: catalog
                .animals
                .iter()
                .cloned()
                .map(AnimalRecord::from_template)
                .collect(),
            progress: SessionProgress::default(),
        }
    }

    pub(crate) fn from_parts(records: Vec<AnimalRecord>, progress: SessionProgress) -> Self {
        Self { records, progress }
    }

    #[must_use]
    pub fn list_all(&self) -> &[AnimalRecord] {
        &self.records
    }

    /// Animals encountered on `region`, including those found on both islands.
    #[must_use]
    pub fn list_by_region(&self, region: Region) -> Vec<&AnimalRecord> {
        self.records
            .iter()
            .filter(|record| record.template.region.covers(region))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AnimalRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut AnimalRecord> {
        self.records.iter_mut().find(|record| record.id() == id)
    }

    #[must_use]
    pub fn is_captured(&self, id: &str) -> bool {
        self.get(id).is_some_and(AnimalRecord::captured)
    }

    /// Add an animal to the collection.
    ///
    /// Returns false without mutating when the id is unknown or the animal is
    /// already captured.
    pub fn capture(&mut self, id: &str) -> bool {
        let Some(record) = self.get_mut(id) else {
            log::debug!("capture ignored: unknown animal {id}");
            return false;
        };
        if record.captured {
            return false;
        }
        record.captured = true;
        record.intimacy = INTIMACY_ON_CAPTURE;
        self.progress.discovered_ids.push(id.to_string());
        log::info!("captured {id}");
        true
    }

    /// Flat feeding path: any listed diet item grants one intimacy point.
    pub fn feed(&mut self, id: &str, food_tag: &str) -> bool {
        self.feed_at(id, food_tag, Utc::now())
    }

    pub fn feed_at(&mut self, id: &str, food_tag: &str, now: DateTime<Utc>) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        if !record.captured || !record.template.eats(food_tag) {
            return false;
        }
        record.adjust_intimacy(INTIMACY_PER_SIMPLE_FEED, now);
        true
    }

    /// Apply a [`crate::feeding::evaluate`] result, returning the new intimacy.
    ///
    /// Rejected outcomes and animals that are unknown or not captured leave
    /// the session untouched.
    pub fn apply_feeding(&mut self, id: &str, outcome: &FeedingOutcome) -> Option<u8> {
        self.apply_feeding_at(id, outcome, Utc::now())
    }

    pub fn apply_feeding_at(
        &mut self,
        id: &str,
        outcome: &FeedingOutcome,
        now: DateTime<Utc>,
    ) -> Option<u8> {
        if !outcome.accepted {
            return None;
        }
        self.reward_at(id, outcome.intimacy_delta, now)
    }

    /// Mini-game reward: adjust intimacy of a captured animal.
    pub fn reward(&mut self, id: &str, delta: i32) -> Option<u8> {
        self.reward_at(id, delta, Utc::now())
    }

    pub fn reward_at(&mut self, id: &str, delta: i32, now: DateTime<Utc>) -> Option<u8> {
        let record = self.get_mut(id)?;
        if !record.captured {
            return None;
        }
        Some(record.adjust_intimacy(delta, now))
    }

    pub fn set_region(&mut self, region: Option<Region>) {
        self.progress.current_region = region;
    }

    #[must_use]
    pub const fn region(&self) -> Option<Region> {
        self.progress.current_region
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.progress.current_mode = mode;
    }

    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.progress.current_mode
    }

    /// Captured animals in capture order.
    #[must_use]
    pub fn list_captured(&self) -> Vec<&AnimalRecord> {
        self.progress
            .discovered_ids
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionProgress {
        self.progress.clone()
    }

    #[must_use]
    pub fn discovered_ids(&self) -> &[String] {
        &self.progress.discovered_ids
    }

    #[must_use]
    pub fn total_intimacy(&self) -> u32 {
        self.records
            .iter()
            .filter(|record| record.captured)
            .map(|record| u32::from(record.intimacy))
            .sum()
    }

    /// One level per five points of intimacy across the collection, from 1.
    #[must_use]
    pub fn player_level(&self) -> u32 {
        self.total_intimacy() / PLAYER_LEVEL_INTIMACY_STEP + 1
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(AnimalRecord::captured)
    }

    /// Collection browser view over captured animals.
    #[must_use]
    pub fn roster(&self, filter: RosterFilter, sort: RosterSort) -> Vec<&AnimalRecord> {
        let mut animals: Vec<&AnimalRecord> = self
            .list_captured()
            .into_iter()
            .filter(|record| match filter {
                RosterFilter::All => true,
                RosterFilter::Region(region) => record.template.region.covers(region),
            })
            .collect();
        match sort {
            RosterSort::Discovered => {}
            RosterSort::Name => {
                animals
                    .sort_by_cached_key(|record| name_sort_key(&record.template.display_name));
            }
            RosterSort::Intimacy => animals.sort_by_key(|record| Reverse(record.intimacy)),
            RosterSort::Recent => animals.sort_by_key(|record| Reverse(record.last_interaction)),
        }
        animals
    }

    /// Every broken invariant, empty for a healthy session.
    #[must_use]
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        for record in &self.records {
            if record.intimacy > INTIMACY_MAX {
                violations.push(InvariantViolation::IntimacyOutOfRange {
                    id: record.id().to_string(),
                    intimacy: record.intimacy,
                });
            }
            if record.intimacy > 0 && !record.captured {
                violations.push(InvariantViolation::IntimacyWithoutCapture {
                    id: record.id().to_string(),
                    intimacy: record.intimacy,
                });
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for id in &self.progress.discovered_ids {
            if !seen.insert(id.as_str()) {
                violations.push(InvariantViolation::DuplicateDiscovery { id: id.clone() });
            }
            if !self.is_captured(id) {
                violations.push(InvariantViolation::DiscoveredNotCaptured { id: id.clone() });
            }
        }
        for record in self.records.iter().filter(|record| record.captured) {
            if !seen.contains(record.id()) {
                violations.push(InvariantViolation::CapturedNotDiscovered {
                    id: record.id().to_string(),
                });
            }
        }
        violations
    }
}
