use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// === Enums ===

/// Declaration order is the iteration order of every per-resource map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Wood,
    Iron,
    Gold,
    MagicalLiquid,
    Workforce,
    Tools,
    LuxuryGoods,
    MagicItems,
    Ships,
    Conscripts,
    Scholars,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Food,
            ResourceKind::Wood,
            ResourceKind::Iron,
            ResourceKind::Gold,
            ResourceKind::MagicalLiquid,
            ResourceKind::Workforce,
            ResourceKind::Tools,
            ResourceKind::LuxuryGoods,
            ResourceKind::MagicItems,
            ResourceKind::Ships,
            ResourceKind::Conscripts,
            ResourceKind::Scholars,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Army,
    Fleet,
    Mages,
}

impl UnitKind {
    /// Draw and casualty order: army first, mages last.
    pub fn all() -> &'static [UnitKind] {
        &[UnitKind::Army, UnitKind::Fleet, UnitKind::Mages]
    }

    /// Combat power contributed by one unit of this kind.
    pub fn power(self) -> i64 {
        match self {
            UnitKind::Army | UnitKind::Fleet => 1,
            UnitKind::Mages => 5,
        }
    }
}

pub type Resources = BTreeMap<ResourceKind, i64>;
pub type Units = BTreeMap<UnitKind, i64>;

// === Troops ===

/// A bundle of army, fleet and mage counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Troops {
    #[serde(default)]
    pub army: i64,
    #[serde(default)]
    pub fleet: i64,
    #[serde(default)]
    pub mages: i64,
}

impl Troops {
    pub fn new(army: i64, fleet: i64, mages: i64) -> Self {
        Troops { army, fleet, mages }
    }

    pub fn from_units(units: &Units) -> Self {
        Troops {
            army: units.get(&UnitKind::Army).copied().unwrap_or(0),
            fleet: units.get(&UnitKind::Fleet).copied().unwrap_or(0),
            mages: units.get(&UnitKind::Mages).copied().unwrap_or(0),
        }
    }

    pub fn get(&self, kind: UnitKind) -> i64 {
        match kind {
            UnitKind::Army => self.army,
            UnitKind::Fleet => self.fleet,
            UnitKind::Mages => self.mages,
        }
    }

    pub fn get_mut(&mut self, kind: UnitKind) -> &mut i64 {
        match kind {
            UnitKind::Army => &mut self.army,
            UnitKind::Fleet => &mut self.fleet,
            UnitKind::Mages => &mut self.mages,
        }
    }

    pub fn total_units(&self) -> i64 {
        self.army + self.fleet + self.mages
    }

    /// `army + fleet + 5 * mages`.
    pub fn combat_power(&self) -> i64 {
        UnitKind::all()
            .iter()
            .map(|&kind| self.get(kind) * kind.power())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }
}

impl std::fmt::Display for Troops {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A:{} F:{} M:{}", self.army, self.fleet, self.mages)
    }
}

// === Static Definitions ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,
    pub name: String,
    /// May repeat; consumers deduplicate.
    #[serde(default)]
    pub resource_focuses: Vec<ResourceKind>,
    #[serde(default)]
    pub base_garrison_strength: i64,
}

// === Mutable State ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionState {
    pub faction_id: String,
    /// Vassalage, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlord_faction_id: Option<String>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub is_in_economic_collapse: bool,
    /// Cumulative gold already granted from owned-settlement bonuses.
    #[serde(default)]
    pub applied_settlement_gold_bonus: i64,
    /// Cumulative workforce already granted from owned-settlement bonuses.
    #[serde(default)]
    pub applied_settlement_workforce_bonus: i64,
}

impl FactionState {
    pub fn new(faction_id: impl Into<String>) -> Self {
        FactionState {
            faction_id: faction_id.into(),
            overlord_faction_id: None,
            resources: Resources::new(),
            units: Units::new(),
            is_in_economic_collapse: false,
            applied_settlement_gold_bonus: 0,
            applied_settlement_workforce_bonus: 0,
        }
    }

    pub fn resource(&self, kind: ResourceKind) -> i64 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    pub fn adjust_resource(&mut self, kind: ResourceKind, delta: i64) {
        *self.resources.entry(kind).or_insert(0) += delta;
    }

    pub fn unit(&self, kind: UnitKind) -> i64 {
        self.units.get(&kind).copied().unwrap_or(0)
    }

    pub fn troops(&self) -> Troops {
        Troops::from_units(&self.units)
    }

    /// True when any resource quantity is negative.
    pub fn has_negative_resources(&self) -> bool {
        self.resources.values().any(|&value| value < 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementState {
    pub settlement_id: String,
    pub owner_faction_id: String,
    /// An occupier never owns the settlement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupying_faction_id: Option<String>,
    #[serde(default)]
    pub garrison_strength: i64,
}

impl SettlementState {
    pub fn is_occupied(&self) -> bool {
        self.occupying_faction_id.is_some()
    }
}

// === Diplomacy ===

/// Unordered pair: `(a, b)` and `(b, a)` are the same pact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefensivePact {
    pub faction_a_id: String,
    pub faction_b_id: String,
}

impl DefensivePact {
    pub fn joins(&self, first: &str, second: &str) -> bool {
        (self.faction_a_id == first && self.faction_b_id == second)
            || (self.faction_a_id == second && self.faction_b_id == first)
    }

    /// The other member of the pact, if `faction_id` is one of them.
    pub fn partner_of(&self, faction_id: &str) -> Option<&str> {
        if self.faction_a_id == faction_id {
            Some(&self.faction_b_id)
        } else if self.faction_b_id == faction_id {
            Some(&self.faction_a_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTransfer {
    pub from_faction_id: String,
    pub to_faction_id: String,
    pub resource: ResourceKind,
    #[serde(default)]
    pub amount: i64,
}

/// Declarative record only; turn resources move through trade edicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePact {
    pub faction_a_id: String,
    pub faction_b_id: String,
    #[serde(default)]
    pub transfers: Vec<TradeTransfer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn troops_combat_power_weights_mages() {
        let troops = Troops::new(3, 2, 4);
        assert_eq!(troops.total_units(), 9);
        assert_eq!(troops.combat_power(), 25);
    }

    #[test]
    fn troops_from_units_defaults_missing_kinds() {
        let mut units = Units::new();
        units.insert(UnitKind::Fleet, 7);
        let troops = Troops::from_units(&units);
        assert_eq!(troops, Troops::new(0, 7, 0));
        assert_eq!(troops.to_string(), "A:0 F:7 M:0");
    }

    #[test]
    fn faction_state_adjusts_missing_resource_from_zero() {
        let mut faction = FactionState::new("elyndar");
        faction.adjust_resource(ResourceKind::Gold, -3);
        assert_eq!(faction.resource(ResourceKind::Gold), -3);
        assert_eq!(faction.resource(ResourceKind::Food), 0);
        assert!(faction.has_negative_resources());
    }

    #[test]
    fn defensive_pact_is_unordered() {
        let pact = DefensivePact {
            faction_a_id: "shoal".to_string(),
            faction_b_id: "sos".to_string(),
        };
        assert!(pact.joins("shoal", "sos"));
        assert!(pact.joins("sos", "shoal"));
        assert!(!pact.joins("sos", "taznar"));
        assert_eq!(pact.partner_of("sos"), Some("shoal"));
        assert_eq!(pact.partner_of("taznar"), None);
    }

    #[test]
    fn resource_kinds_iterate_in_declaration_order() {
        let mut sorted = ResourceKind::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, ResourceKind::all());
        assert_eq!(ResourceKind::all().len(), 12);
    }
}
