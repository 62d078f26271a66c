//! Static animal catalog loaded from embedded data.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

pub(crate) const DEFAULT_ANIMAL_DATA: &str = include_str!("../assets/data/animals.json");

/// Ordered food names an animal eats. Most animals list three or fewer.
pub type DietTags = SmallVec<[String; 4]>;

/// One of the two map areas a player can explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    South,
}

impl Region {
    pub const ALL: [Self; 2] = [Self::North, Self::South];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "North Island",
            Self::South => "South Island",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Self::North),
            "south" => Ok(Self::South),
            _ => Err(()),
        }
    }
}

/// Where an animal can be encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionRange {
    North,
    South,
    Both,
}

impl RegionRange {
    /// Whether an animal with this range shows up when exploring `region`.
    #[must_use]
    pub const fn covers(self, region: Region) -> bool {
        matches!(
            (self, region),
            (Self::Both, _) | (Self::North, Region::North) | (Self::South, Region::South)
        )
    }
}

/// IUCN-style conservation status, ordered from least to most threatened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationTier {
    LeastConcern,
    NearThreatened,
    Vulnerable,
    Endangered,
    CriticallyEndangered,
}

impl ConservationTier {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LeastConcern => "Least Concern",
            Self::NearThreatened => "Near Threatened",
            Self::Vulnerable => "Vulnerable",
            Self::Endangered => "Endangered",
            Self::CriticallyEndangered => "Critically Endangered",
        }
    }

    /// Endangered or worse.
    #[must_use]
    pub fn is_threatened(self) -> bool {
        self >= Self::Endangered
    }
}

impl fmt::Display for ConservationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable description of a discoverable animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalTemplate {
    pub id: String,
    pub display_name: String,
    pub species: String,
    pub habitat: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub diet: DietTags,
    pub conservation: ConservationTier,
    pub region: RegionRange,
}

impl AnimalTemplate {
    #[must_use]
    pub fn eats(&self, food_name: &str) -> bool {
        self.diet.iter().any(|item| item == food_name)
    }
}

impl AsRef<AnimalTemplate> for AnimalTemplate {
    fn as_ref(&self) -> &AnimalTemplate {
        self
    }
}

/// Container for every animal the game knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnimalCatalog {
    pub animals: Vec<AnimalTemplate>,
}

impl AnimalCatalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            animals: Vec::new(),
        }
    }

    /// Load a catalog from a JSON string.
    ///
    /// Duplicate ids keep their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into catalog data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: Self = serde_json::from_str(json)?;
        Ok(Self::from_templates(parsed.animals))
    }

    #[must_use]
    pub fn from_templates(templates: Vec<AnimalTemplate>) -> Self {
        let mut animals: Vec<AnimalTemplate> = Vec::with_capacity(templates.len());
        for template in templates {
            if animals.iter().any(|known| known.id == template.id) {
                log::warn!("duplicate catalog id {} ignored", template.id);
                continue;
            }
            animals.push(template);
        }
        Self { animals }
    }

    /// Load the catalog bundled with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_ANIMAL_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> Self {
        Self::load_from_static()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AnimalTemplate> {
        self.animals.iter().find(|animal| animal.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.animals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.animals.iter().map(|animal| animal.id.as_str())
    }
}
