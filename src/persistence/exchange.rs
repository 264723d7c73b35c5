use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::simulation::edict::OrderMap;
use crate::world::{WorldState, SCHEMA_VERSION};

/// Errors that can occur while reading or writing exchange files.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Deserialization error: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("Unsupported world schema version {found} (this build reads up to {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ExchangeError + '_ {
    move |source| ExchangeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Pretty-printed JSON for a world state.
pub fn world_to_json(world: &WorldState) -> Result<String, ExchangeError> {
    serde_json::to_string_pretty(world).map_err(ExchangeError::Serialize)
}

/// Parse a world state, rejecting schema versions newer than this build.
pub fn world_from_json(json: &str) -> Result<WorldState, ExchangeError> {
    let world: WorldState = serde_json::from_str(json).map_err(ExchangeError::Deserialize)?;
    if world.schema_version > SCHEMA_VERSION {
        return Err(ExchangeError::UnsupportedSchema {
            found: world.schema_version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(world)
}

pub fn orders_to_json(orders: &OrderMap) -> Result<String, ExchangeError> {
    serde_json::to_string_pretty(orders).map_err(ExchangeError::Serialize)
}

pub fn orders_from_json(json: &str) -> Result<OrderMap, ExchangeError> {
    serde_json::from_str(json).map_err(ExchangeError::Deserialize)
}

pub fn load_world(path: &Path) -> Result<WorldState, ExchangeError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let world = world_from_json(&content)?;
    debug!(path = %path.display(), turn = world.turn_number, "Loaded world");
    Ok(world)
}

pub fn load_orders(path: &Path) -> Result<OrderMap, ExchangeError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    orders_from_json(&content)
}

/// Save a world state using an atomic write.
///
/// Writes to a temporary file next to the target first, then renames it over
/// the target, so a partial write never corrupts an existing file.
pub fn save_world(world: &WorldState, path: &Path) -> Result<(), ExchangeError> {
    let encoded = world_to_json(world)?;
    write_atomic(path, encoded.as_bytes())?;
    debug!(path = %path.display(), turn = world.turn_number, "Saved world");
    Ok(())
}

pub fn save_orders(orders: &OrderMap, path: &Path) -> Result<(), ExchangeError> {
    let encoded = orders_to_json(orders)?;
    write_atomic(path, encoded.as_bytes())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ExchangeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "world.json".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", filename));

    if let Err(e) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(&tmp)(e));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(path)(e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Roster;
    use crate::simulation::edict::{Edict, MilitaryEdict, MilitaryOperation};
    use crate::world::setup::setup_world;
    use crate::world::{DefensivePact, ResourceKind, SettlementState, Troops};
    use tempfile::TempDir;

    fn sample_world() -> WorldState {
        let mut world = setup_world(&Roster::builtin());
        world.turn_number = 4;
        world.factions[0].adjust_resource(ResourceKind::Gold, -50);
        world.settlements.push(SettlementState {
            settlement_id: "harbor".to_string(),
            owner_faction_id: world.factions[0].faction_id.clone(),
            occupying_faction_id: Some(world.factions[1].faction_id.clone()),
            garrison_strength: 2,
        });
        world.defensive_pacts.push(DefensivePact {
            faction_a_id: world.factions[0].faction_id.clone(),
            faction_b_id: world.factions[2].faction_id.clone(),
        });
        world
    }

    #[test]
    fn save_and_load_world_preserves_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("world.json");
        let world = sample_world();

        save_world(&world, &path).unwrap();
        let loaded = load_world(&path).unwrap();

        assert_eq!(loaded, world);
        assert!(loaded.factions[0].resource(ResourceKind::Gold) < 0);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world.json");

        save_world(&sample_world(), &path).unwrap();
        save_world(&sample_world(), &path).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["world.json"]);
    }

    #[test]
    fn absent_optional_fields_stay_absent() {
        let mut world = WorldState::default();
        world.factions.push(crate::world::FactionState::new("shoal"));

        let json = world_to_json(&world).unwrap();

        assert!(!json.contains("overlord_faction_id"));
        assert_eq!(world_from_json(&json).unwrap(), world);
    }

    #[test]
    fn minimal_world_json_uses_defaults() {
        let world = world_from_json(r#"{ "factions": [ { "faction_id": "sos" } ] }"#).unwrap();
        assert_eq!(world.schema_version, SCHEMA_VERSION);
        assert_eq!(world.turn_number, 0);
        assert!(world.factions[0].resources.is_empty());
    }

    #[test]
    fn newer_schema_rejected() {
        let err = world_from_json(r#"{ "schema_version": 99 }"#).unwrap_err();
        assert!(matches!(err, ExchangeError::UnsupportedSchema { found: 99, .. }));
    }

    #[test]
    fn orders_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        let mut orders = OrderMap::new();
        orders.insert(
            "sos".to_string(),
            vec![Edict::military(
                "sos",
                MilitaryEdict {
                    operation: MilitaryOperation::Liberation,
                    source_settlement_id: None,
                    target_settlement_id: Some("harbor".to_string()),
                    supported_faction_id: None,
                    requested: Troops::new(1, 2, 0),
                },
            )],
        );

        save_orders(&orders, &path).unwrap();

        assert_eq!(load_orders(&path).unwrap(), orders);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let err = load_world(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}
