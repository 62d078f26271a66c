//! Versioned save strings.
//!
//! Encoding writes every record and the progress block. Decoding trusts the
//! payload only for runtime fields: templates come from the catalog, unknown
//! ids are dropped, and the discovery list is rebuilt from capture flags.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::catalog::{AnimalCatalog, Region};
use crate::constants::SAVE_FORMAT_VERSION;
use crate::state::{AnimalRecord, GameMode, SessionProgress, SessionState};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed save data: {0}")]
    Malformed(String),
    #[error("unsupported save version {found} (expected {SAVE_FORMAT_VERSION})")]
    UnsupportedVersion { found: u64 },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[derive(Serialize)]
struct SavePayload<'a> {
    version: u32,
    animals: Vec<SavedAnimal<'a>>,
    progress: SavedProgress<'a>,
}

#[derive(Serialize)]
struct SavedAnimal<'a> {
    id: &'a str,
    captured: bool,
    intimacy: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_interaction: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct SavedProgress<'a> {
    discovered_ids: &'a [String],
    current_region: Option<Region>,
    current_mode: GameMode,
}

/// Inbound records are read field by field so that one bad value degrades
/// instead of failing the whole load.
#[derive(Deserialize)]
struct LoadedPayload {
    version: u64,
    #[serde(default)]
    animals: Option<Value>,
    #[serde(default)]
    progress: Option<Value>,
}

#[must_use]
pub fn serialize(state: &SessionState) -> String {
    let payload = SavePayload {
        version: SAVE_FORMAT_VERSION,
        animals: state
            .list_all()
            .iter()
            .map(|record| SavedAnimal {
                id: record.id(),
                captured: record.captured(),
                intimacy: record.intimacy(),
                last_interaction: record.last_interaction(),
            })
            .collect(),
        progress: SavedProgress {
            discovered_ids: state.discovered_ids(),
            current_region: state.region(),
            current_mode: state.mode(),
        },
    };
    serde_json::to_string(&payload).unwrap_or_default()
}

/// Decode against the bundled catalog.
///
/// # Errors
///
/// See [`deserialize_with`].
pub fn deserialize(text: &str) -> Result<SessionState, DecodeError> {
    deserialize_with(text, &AnimalCatalog::default_catalog())
}

/// Decode a save string against `catalog`.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] when the text is not JSON or lacks the
/// top-level shape, and [`DecodeError::UnsupportedVersion`] for saves written
/// by another format version.
pub fn deserialize_with(text: &str, catalog: &AnimalCatalog) -> Result<SessionState, DecodeError> {
    let root: Value = serde_json::from_str(text)?;
    if !root.is_object() {
        return Err(DecodeError::Malformed("top level is not an object".to_string()));
    }
    let payload: LoadedPayload = serde_json::from_value(root)?;
    if payload.version != u64::from(SAVE_FORMAT_VERSION) {
        return Err(DecodeError::UnsupportedVersion {
            found: payload.version,
        });
    }

    let entries: &[Value] = match &payload.animals {
        Some(Value::Array(entries)) => entries,
        None | Some(Value::Null) => &[],
        Some(_) => {
            log::warn!("save roster is not a list, starting from a fresh roster");
            &[]
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut loaded: Vec<(String, bool, i64, Option<DateTime<Utc>>)> = Vec::new();
    for entry in entries {
        let Some(id) = entry.get("id").and_then(Value::as_str) else {
            log::warn!("dropping save record without an id");
            continue;
        };
        if !catalog.contains(id) {
            log::warn!("dropping save record for unknown animal {id}");
            continue;
        }
        if !seen.insert(id.to_string()) {
            log::warn!("dropping duplicate save record for {id}");
            continue;
        }
        let captured = entry
            .get("captured")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let intimacy = entry.get("intimacy").map_or(0, read_integer);
        let last_interaction = entry
            .get("last_interaction")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());
        loaded.push((id.to_string(), captured, intimacy, last_interaction));
    }

    let records: Vec<AnimalRecord> = catalog
        .animals
        .iter()
        .map(|template| {
            loaded
                .iter()
                .find(|(id, ..)| *id == template.id)
                .map_or_else(
                    || AnimalRecord::from_template(template.clone()),
                    |(_, captured, intimacy, last)| {
                        AnimalRecord::restored(template.clone(), *captured, *intimacy, *last)
                    },
                )
        })
        .collect();

    let progress = payload.progress.unwrap_or(Value::Null);
    let claimed: Vec<&str> = progress
        .get("discovered_ids")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let captured: HashSet<&str> = records
        .iter()
        .filter(|record| record.captured())
        .map(AnimalRecord::id)
        .collect();

    let mut discovered_ids: Vec<String> = Vec::with_capacity(captured.len());
    for id in claimed {
        if captured.contains(id) && !discovered_ids.iter().any(|known| known == id) {
            discovered_ids.push(id.to_string());
        }
    }
    for record in records.iter().filter(|record| record.captured()) {
        if !discovered_ids.iter().any(|known| known == record.id()) {
            discovered_ids.push(record.id().to_string());
        }
    }

    let current_region = progress
        .get("current_region")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<Region>().ok());
    let current_mode = progress
        .get("current_mode")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<GameMode>().ok())
        .unwrap_or_default();

    Ok(SessionState::from_parts(
        records,
        SessionProgress {
            discovered_ids,
            current_region,
            current_mode,
        },
    ))
}

#[allow(clippy::cast_possible_truncation)]
fn read_integer(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .unwrap_or(0)
}

impl SessionState {
    /// Replace this session with a decoded save, checked against the animals
    /// this session already knows. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Propagates [`DecodeError`] from [`deserialize_with`].
    pub fn restore(&mut self, text: &str) -> Result<(), DecodeError> {
        let catalog = AnimalCatalog::from_templates(
            self.list_all()
                .iter()
                .map(|record| record.template().clone())
                .collect(),
        );
        self.restore_with(text, &catalog)
    }

    /// Like [`SessionState::restore`], against an explicit catalog.
    ///
    /// # Errors
    ///
    /// Propagates [`DecodeError`] from [`deserialize_with`].
    pub fn restore_with(
        &mut self,
        text: &str,
        catalog: &AnimalCatalog,
    ) -> Result<(), DecodeError> {
        *self = deserialize_with(text, catalog)?;
        Ok(())
    }

    #[must_use]
    pub fn to_save_string(&self) -> String {
        serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn played_session() -> SessionState {
        let mut state = SessionState::default();
        state.capture("tuatara");
        state.capture("kiwi");
        state.feed("kiwi", "Worms");
        state.reward("tuatara", 4);
        state.set_region(Some(Region::North));
        state.set_mode(GameMode::Collection);
        state
    }

    #[test]
    fn round_trip_preserves_progress() {
        let original = played_session();
        let decoded = deserialize(&serialize(&original)).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.discovered_ids(), ["tuatara", "kiwi"]);
    }

    #[test]
    fn tampered_discovery_list_is_rebuilt() {
        let mut save: Value = serde_json::from_str(&serialize(&played_session())).unwrap();
        save["progress"]["discovered_ids"] = json!(["kakapo", "kiwi", "kiwi", "moa"]);
        let decoded = deserialize(&save.to_string()).unwrap();
        assert_eq!(decoded.discovered_ids(), ["kiwi", "tuatara"]);
        assert!(!decoded.is_captured("kakapo"));
        assert!(decoded.invariant_violations().is_empty());
    }

    #[test]
    fn runtime_fields_are_repaired() {
        let text = json!({
            "version": 1,
            "animals": [
                {"id": "kiwi", "captured": true, "intimacy": 99},
                {"id": "kakapo", "captured": false, "intimacy": 6},
                {"id": "kiwi", "captured": false, "intimacy": 0},
                {"id": "moa", "captured": true, "intimacy": 3},
                {"id": "tuatara", "captured": true, "intimacy": -4}
            ],
            "progress": {"current_region": "atlantis", "current_mode": "ar"}
        })
        .to_string();
        let decoded = deserialize(&text).unwrap();
        assert_eq!(decoded.get("kiwi").map(AnimalRecord::intimacy), Some(10));
        assert_eq!(decoded.get("kakapo").map(AnimalRecord::intimacy), Some(0));
        assert_eq!(decoded.get("tuatara").map(AnimalRecord::intimacy), Some(0));
        assert!(decoded.get("moa").is_none());
        assert_eq!(decoded.list_all().len(), 4);
        assert_eq!(decoded.region(), None);
        assert_eq!(decoded.mode(), GameMode::Map);
        assert_eq!(decoded.discovered_ids(), ["kiwi", "tuatara"]);
    }

    #[test]
    fn templates_come_from_catalog() {
        let text = json!({
            "version": 1,
            "animals": [{"id": "kiwi", "captured": true, "intimacy": 2,
                         "display_name": "Chicken", "diet": ["Fish"]}]
        })
        .to_string();
        let decoded = deserialize(&text).unwrap();
        let kiwi = decoded.get("kiwi").unwrap().template();
        assert_eq!(kiwi.display_name, "Kiwi");
        assert!(!kiwi.eats("Fish"));
    }

    #[test]
    fn malformed_and_foreign_versions_are_rejected() {
        assert!(matches!(deserialize("not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(deserialize("[1, 2]"), Err(DecodeError::Malformed(_))));
        assert!(matches!(deserialize("{}"), Err(DecodeError::Malformed(_))));
        assert!(matches!(
            deserialize(r#"{"version": 7, "animals": []}"#),
            Err(DecodeError::UnsupportedVersion { found: 7 })
        ));
    }

    #[test]
    fn failed_restore_keeps_previous_state() {
        let mut state = played_session();
        let before = state.clone();
        assert!(state.restore("{\"version\": \"one\"}").is_err());
        assert_eq!(state, before);

        let fresh = SessionState::default().to_save_string();
        state.restore(&fresh).unwrap();
        assert!(state.list_captured().is_empty());
    }

    fn catalog_with_weka() -> AnimalCatalog {
        let mut templates = AnimalCatalog::default_catalog().animals;
        let mut weka = templates[0].clone();
        weka.id = "weka".to_string();
        weka.display_name = "Weka".to_string();
        templates.push(weka);
        AnimalCatalog::from_templates(templates)
    }

    #[test]
    fn restore_keeps_animals_from_a_custom_catalog() {
        let mut state = SessionState::new(&catalog_with_weka());
        assert!(state.capture("weka"));
        state.feed("weka", "Worms");
        let save = serialize(&state);
        let before = state.clone();

        state.restore(&save).unwrap();
        assert_eq!(state, before);
        assert_eq!(state.discovered_ids(), ["weka"]);

        let mut other = SessionState::default();
        other.restore_with(&save, &catalog_with_weka()).unwrap();
        assert!(other.is_captured("weka"));
    }

    #[test]
    fn non_list_roster_degrades_to_fresh_records() {
        let text = json!({
            "version": 1,
            "animals": 5,
            "progress": {"discovered_ids": ["kiwi"], "current_region": "south"}
        })
        .to_string();
        let decoded = deserialize(&text).unwrap();
        assert_eq!(decoded.list_all().len(), AnimalCatalog::default_catalog().len());
        assert!(decoded.list_captured().is_empty());
        assert!(decoded.discovered_ids().is_empty());
        assert_eq!(decoded.region(), Some(Region::South));
    }
}
