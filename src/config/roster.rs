use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::{collect_errors, read_config_file, ConfigError};
use crate::world::{Faction, ResourceKind, Resources, Settlement, Units};

/// A faction as listed in the roster, with its starting stockpile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub starting_resources: Resources,
    #[serde(default)]
    pub starting_units: Units,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlord: Option<String>,
}

impl FactionEntry {
    pub fn definition(&self) -> Faction {
        Faction {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub resource_focuses: Vec<ResourceKind>,
    #[serde(default)]
    pub base_garrison_strength: i64,
    /// Faction that owns the settlement when a new world is set up.
    pub owner: String,
}

impl SettlementEntry {
    pub fn definition(&self) -> Settlement {
        Settlement {
            id: self.id.clone(),
            name: self.name.clone(),
            resource_focuses: self.resource_focuses.clone(),
            base_garrison_strength: self.base_garrison_strength,
        }
    }
}

/// Static reference data: who plays and which settlements exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub factions: Vec<FactionEntry>,
    #[serde(default)]
    pub settlements: Vec<SettlementEntry>,
}

impl Roster {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let roster: Roster = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let mut faction_ids = BTreeSet::new();

        for faction in &self.factions {
            if faction.id.trim().is_empty() {
                errors.push(format!("faction '{}' has a blank id", faction.name));
            } else if !faction_ids.insert(faction.id.as_str()) {
                errors.push(format!("duplicate faction id '{}'", faction.id));
            }
        }

        for faction in &self.factions {
            if let Some(overlord) = &faction.overlord {
                if !faction_ids.contains(overlord.as_str()) {
                    errors.push(format!(
                        "faction '{}' names unknown overlord '{}'",
                        faction.id, overlord
                    ));
                }
            }
        }

        let mut settlement_ids = BTreeSet::new();
        for settlement in &self.settlements {
            if settlement.id.trim().is_empty() {
                errors.push(format!("settlement '{}' has a blank id", settlement.name));
            } else if !settlement_ids.insert(settlement.id.as_str()) {
                errors.push(format!("duplicate settlement id '{}'", settlement.id));
            }
            if !faction_ids.contains(settlement.owner.as_str()) {
                errors.push(format!(
                    "settlement '{}' is owned by unknown faction '{}'",
                    settlement.id, settlement.owner
                ));
            }
            if settlement.base_garrison_strength < 0 {
                errors.push(format!(
                    "settlement '{}' base_garrison_strength must be >= 0, got {}",
                    settlement.id, settlement.base_garrison_strength
                ));
            }
        }

        collect_errors(errors)
    }

    pub fn faction(&self, faction_id: &str) -> Option<&FactionEntry> {
        self.factions.iter().find(|f| f.id == faction_id)
    }

    pub fn settlement(&self, settlement_id: &str) -> Option<&SettlementEntry> {
        self.settlements.iter().find(|s| s.id == settlement_id)
    }

    /// The fifteen shipped factions with their starting stockpiles and no
    /// settlements.
    pub fn builtin() -> Self {
        // Columns: Food, Wood, Iron, Gold, MagicalLiquid, Workforce, Tools,
        // LuxuryGoods, MagicItems, Ships, Conscripts, Scholars.
        let table: [(&str, &str, [i64; 12]); 15] = [
            ("aelthuun", "Ael’thuun", [0, 0, 0, 1, 1, 3, 2, 0, -1, 0, 0, -1]),
            ("aurumbrae", "Aurumbræ", [0, 1, 0, 1, 0, 0, 2, 0, 0, 0, 6, 0]),
            ("dracogallus", "Dracogallus", [0, 0, 0, 0, 0, 3, 2, 1, 0, 0, 4, 0]),
            ("elyndar", "Elyndar", [0, 0, 0, 1, 0, 3, 3, 0, 0, 0, 3, 0]),
            ("kame-no-kaizoku", "Kame no Kaizoku", [0, 1, 0, 0, 0, 3, 3, 0, 0, 3, 0, 0]),
            ("malvethar", "Malvethar", [1, 1, 0, 0, 0, 0, 2, 0, 0, 3, 3, 0]),
            ("mar-rhazun", "Mar’Rhazûn", [0, 1, 0, 0, 0, 3, 0, 0, 0, 0, 6, 0]),
            ("morr-ghuun", "Morr’ghuun", [0, 0, 1, 0, 0, 3, 0, 0, 0, 0, 6, 0]),
            ("ooruun", "Ooruun", [0, 1, 1, 1, 0, 3, 0, 0, 0, 0, 4, 0]),
            ("ordo-solis", "Ordo Solis", [0, 1, 1, 0, 0, 3, 0, 0, 0, 0, 5, 0]),
            ("qal-asar", "Qal Asar", [0, 1, 1, 0, 0, 3, 0, 0, 0, 2, 2, 1]),
            ("ruda-flotila", "Rudá flotila", [1, 2, 0, 0, 0, 0, 2, 0, 0, 5, 0, 0]),
            ("sos", "S.O.S.", [0, 0, 0, 0, 0, 3, 3, 0, 0, 4, 0, 0]),
            ("shoal", "Shoal", [0, 1, 0, 0, 0, 0, 2, 0, 0, 0, 7, 0]),
            ("taznar", "Taznar", [0, 0, 0, 1, 0, 3, 3, 0, 0, 0, 3, 0]),
        ];

        let factions = table
            .iter()
            .map(|(id, name, amounts)| FactionEntry {
                id: id.to_string(),
                name: name.to_string(),
                starting_resources: ResourceKind::all()
                    .iter()
                    .copied()
                    .zip(amounts.iter().copied())
                    .collect(),
                starting_units: Units::new(),
                overlord: None,
            })
            .collect();

        Roster {
            factions,
            settlements: Vec::new(),
        }
    }
}
