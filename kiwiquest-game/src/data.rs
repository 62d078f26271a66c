//! Data bundled into the crate and the loader that serves it.
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::DataLoader;
use crate::catalog::{AnimalCatalog, DEFAULT_ANIMAL_DATA};
use crate::config::DEFAULT_CONFIG_DATA;
use crate::feeding::{DEFAULT_FOOD_DATA, FoodCatalog};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no bundled data named {0}")]
    UnknownConfig(String),
    #[error("bundled data {name} is invalid: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Names accepted by [`EmbeddedLoader::load_config`].
pub const BUNDLED_NAMES: [&str; 3] = ["animals", "foods", "config"];

fn bundled(name: &str) -> Option<&'static str> {
    match name {
        "animals" => Some(DEFAULT_ANIMAL_DATA),
        "foods" => Some(DEFAULT_FOOD_DATA),
        "config" => Some(DEFAULT_CONFIG_DATA),
        _ => None,
    }
}

/// Serves the JSON compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl DataLoader for EmbeddedLoader {
    type Error = LoadError;

    fn load_catalog(&self) -> Result<AnimalCatalog, Self::Error> {
        AnimalCatalog::from_json(DEFAULT_ANIMAL_DATA).map_err(|source| LoadError::Parse {
            name: "animals".to_string(),
            source,
        })
    }

    fn load_foods(&self) -> Result<FoodCatalog, Self::Error> {
        FoodCatalog::from_json(DEFAULT_FOOD_DATA).map_err(|source| LoadError::Parse {
            name: "foods".to_string(),
            source,
        })
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let text =
            bundled(config_name).ok_or_else(|| LoadError::UnknownConfig(config_name.to_string()))?;
        serde_json::from_str(text).map_err(|source| LoadError::Parse {
            name: config_name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn every_bundled_file_parses() {
        let loader = EmbeddedLoader;
        assert_eq!(loader.load_catalog().unwrap().len(), 4);
        assert_eq!(loader.load_foods().unwrap().foods.len(), 9);
        let cfg: GameConfig = loader.load_config("config").unwrap();
        assert_eq!(cfg, GameConfig::default_config());
        for name in BUNDLED_NAMES {
            let _: serde_json::Value = loader.load_config(name).unwrap();
        }
    }

    #[test]
    fn unknown_names_are_reported() {
        let err = EmbeddedLoader
            .load_config::<serde_json::Value>("pacing")
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownConfig(name) if name == "pacing"));
    }
}
