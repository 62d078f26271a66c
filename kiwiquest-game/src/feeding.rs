//! Feeding compatibility and reward rules.
//!
//! Everything here is pure: the caller applies a [`FeedingOutcome`] to the
//! session through [`crate::SessionState::apply_feeding`].
use serde::{Deserialize, Serialize};

use crate::catalog::AnimalTemplate;
use crate::constants::PREFERRED_FOOD_MULTIPLIER;

pub(crate) const DEFAULT_FOOD_DATA: &str = include_str!("../assets/data/foods.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Insect,
    Plant,
    Fish,
    Meat,
}

/// Category implied by a named diet item.
///
/// Names outside this table imply no category and can only ever be matched
/// exactly.
#[must_use]
pub fn diet_category(item: &str) -> Option<FoodCategory> {
    match item {
        "Insects" | "Worms" => Some(FoodCategory::Insect),
        "Berries" | "Leaves" | "Flowers" | "Fruits" => Some(FoodCategory::Plant),
        "Fish" | "Squid" => Some(FoodCategory::Fish),
        "Small reptiles" => Some(FoodCategory::Meat),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub category: FoodCategory,
    #[serde(rename = "nutrition")]
    pub nutrition_value: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FoodCatalog {
    pub foods: Vec<FoodItem>,
}

impl FoodCatalog {
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into food data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_FOOD_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> Self {
        Self::load_from_static()
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&FoodItem> {
        self.foods.iter().find(|food| food.name == name)
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&FoodItem> {
        self.foods.iter().find(|food| food.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTier {
    Preferred,
    Compatible,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingOutcome {
    pub accepted: bool,
    pub intimacy_delta: i32,
    pub tier: FeedTier,
}

impl FeedingOutcome {
    pub const REJECTED: Self = Self {
        accepted: false,
        intimacy_delta: 0,
        tier: FeedTier::Rejected,
    };
}

fn implied_categories(animal: &AnimalTemplate) -> impl Iterator<Item = FoodCategory> + '_ {
    animal.diet.iter().filter_map(|item| diet_category(item))
}

/// Decide how an animal reacts to a food.
///
/// An exact diet-name match always wins over a category match.
#[must_use]
pub fn evaluate(animal: impl AsRef<AnimalTemplate>, food: &FoodItem) -> FeedingOutcome {
    let animal = animal.as_ref();
    let nutrition = i32::from(food.nutrition_value);
    if animal.eats(&food.name) {
        return FeedingOutcome {
            accepted: true,
            intimacy_delta: nutrition * PREFERRED_FOOD_MULTIPLIER,
            tier: FeedTier::Preferred,
        };
    }
    if implied_categories(animal).any(|category| category == food.category) {
        return FeedingOutcome {
            accepted: true,
            intimacy_delta: nutrition,
            tier: FeedTier::Compatible,
        };
    }
    FeedingOutcome::REJECTED
}

/// Foods worth offering in the feeding panel, in catalog order.
#[must_use]
pub fn available_foods<'a>(
    animal: impl AsRef<AnimalTemplate>,
    foods: &'a FoodCatalog,
) -> Vec<&'a FoodItem> {
    let animal = animal.as_ref();
    foods
        .foods
        .iter()
        .filter(|food| evaluate(animal, food).accepted)
        .collect()
}
