//! Per-faction special rules.
//!
//! The resolver never branches on faction identity; it asks the [`RuleBook`]
//! for the modifiers of whichever faction it is handling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{collect_errors, read_config_file, ConfigError};
use crate::world::ResourceKind;

/// Granted once per successfully executed internal edict whose name matches
/// (case-insensitive) in the same phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEdictBonus {
    pub edict_name: String,
    pub resource: ResourceKind,
    #[serde(default = "default_named_bonus_amount")]
    pub amount: i64,
}

fn default_named_bonus_amount() -> i64 {
    1
}

impl NamedEdictBonus {
    pub fn matches(&self, edict_name: &str) -> bool {
        self.edict_name.to_lowercase() == edict_name.to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionRules {
    /// Exactly three resources that earn the strong-resource output bonus.
    #[serde(default)]
    pub strong_resources: Vec<ResourceKind>,
    /// Added on top of the strong-resource bonus.
    #[serde(default)]
    pub strong_resource_extra_bonus: i64,
    /// Flat per-execution output bonus for specific resources.
    #[serde(default)]
    pub resource_bonuses: BTreeMap<ResourceKind, i64>,
    #[serde(default)]
    pub gold_per_settlement: i64,
    #[serde(default)]
    pub workforce_per_settlement: i64,
    /// One gold per this many units exported through trade contracts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_gold_rate: Option<i64>,
    /// Defenders beaten by this faction lose every committed unit.
    #[serde(default)]
    pub full_losses_on_victory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_edict_bonus: Option<NamedEdictBonus>,
}

impl FactionRules {
    pub fn is_strong(&self, resource: ResourceKind) -> bool {
        self.strong_resources.contains(&resource)
    }

    fn validate(&self, faction_id: &str, errors: &mut Vec<String>) {
        let mut distinct = self.strong_resources.clone();
        distinct.sort();
        distinct.dedup();
        if self.strong_resources.len() != 3 || distinct.len() != 3 {
            errors.push(format!(
                "factions.{}.strong_resources must list exactly 3 distinct resources, got {:?}",
                faction_id, self.strong_resources
            ));
        }

        if self.strong_resource_extra_bonus < 0 {
            errors.push(format!(
                "factions.{}.strong_resource_extra_bonus must be >= 0, got {}",
                faction_id, self.strong_resource_extra_bonus
            ));
        }

        for (resource, bonus) in &self.resource_bonuses {
            if *bonus < 0 {
                errors.push(format!(
                    "factions.{}.resource_bonuses.{:?} must be >= 0, got {}",
                    faction_id, resource, bonus
                ));
            }
        }

        if self.gold_per_settlement < 0 || self.workforce_per_settlement < 0 {
            errors.push(format!(
                "factions.{}: per-settlement bonuses must be >= 0",
                faction_id
            ));
        }

        if let Some(rate) = self.export_gold_rate {
            if rate <= 0 {
                errors.push(format!(
                    "factions.{}.export_gold_rate must be > 0, got {}. Example: export_gold_rate = 5",
                    faction_id, rate
                ));
            }
        }

        if let Some(bonus) = &self.named_edict_bonus {
            if bonus.edict_name.trim().is_empty() {
                errors.push(format!(
                    "factions.{}.named_edict_bonus.edict_name must not be blank",
                    faction_id
                ));
            }
            if bonus.amount <= 0 {
                errors.push(format!(
                    "factions.{}.named_edict_bonus.amount must be > 0, got {}",
                    faction_id, bonus.amount
                ));
            }
        }
    }
}

/// Read-only special-rule table keyed by faction id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub factions: BTreeMap<String, FactionRules>,
}

impl RuleBook {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let book: RuleBook = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
        book.validate()?;
        Ok(book)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        for (faction_id, rules) in &self.factions {
            rules.validate(faction_id, &mut errors);
        }
        collect_errors(errors)
    }

    /// Rules for a faction; factions without an entry get no modifiers.
    pub fn rules_for(&self, faction_id: &str) -> &FactionRules {
        static NO_RULES: FactionRules = FactionRules {
            strong_resources: Vec::new(),
            strong_resource_extra_bonus: 0,
            resource_bonuses: BTreeMap::new(),
            gold_per_settlement: 0,
            workforce_per_settlement: 0,
            export_gold_rate: None,
            full_losses_on_victory: false,
            named_edict_bonus: None,
        };
        self.factions.get(faction_id).unwrap_or(&NO_RULES)
    }

    /// The rule table of the fifteen shipped factions.
    pub fn builtin() -> Self {
        use ResourceKind::*;

        let strong: [(&str, [ResourceKind; 3]); 15] = [
            ("aelthuun", [MagicalLiquid, MagicItems, Scholars]),
            ("aurumbrae", [Gold, LuxuryGoods, Tools]),
            ("dracogallus", [Iron, Gold, Conscripts]),
            ("elyndar", [Food, Wood, MagicalLiquid]),
            ("kame-no-kaizoku", [Food, Wood, Ships]),
            ("malvethar", [Gold, Workforce, LuxuryGoods]),
            ("mar-rhazun", [Iron, Tools, Conscripts]),
            ("morr-ghuun", [Iron, Workforce, Conscripts]),
            ("ooruun", [Food, Wood, Workforce]),
            ("ordo-solis", [Gold, Conscripts, Scholars]),
            ("qal-asar", [MagicalLiquid, LuxuryGoods, MagicItems]),
            ("ruda-flotila", [Food, Wood, Ships]),
            ("sos", [Gold, Tools, Ships]),
            ("shoal", [Food, Workforce, Ships]),
            ("taznar", [Food, MagicalLiquid, Conscripts]),
        ];

        let mut factions: BTreeMap<String, FactionRules> = strong
            .iter()
            .map(|(id, resources)| {
                (
                    id.to_string(),
                    FactionRules {
                        strong_resources: resources.to_vec(),
                        ..FactionRules::default()
                    },
                )
            })
            .collect();

        if let Some(rules) = factions.get_mut("mar-rhazun") {
            rules.strong_resource_extra_bonus = 1;
        }
        if let Some(rules) = factions.get_mut("qal-asar") {
            rules.resource_bonuses.insert(MagicItems, 2);
        }
        if let Some(rules) = factions.get_mut("ordo-solis") {
            rules.gold_per_settlement = 10;
        }
        if let Some(rules) = factions.get_mut("malvethar") {
            rules.gold_per_settlement = 5;
            rules.workforce_per_settlement = 5;
        }
        if let Some(rules) = factions.get_mut("aurumbrae") {
            rules.export_gold_rate = Some(5);
        }
        if let Some(rules) = factions.get_mut("elyndar") {
            rules.full_losses_on_victory = true;
        }
        if let Some(rules) = factions.get_mut("taznar") {
            rules.named_edict_bonus = Some(NamedEdictBonus {
                edict_name: "Magické zřídlo".to_string(),
                resource: Conscripts,
                amount: 1,
            });
        }

        RuleBook { factions }
    }
}
