pub mod setup;
pub mod types;

use serde::{Deserialize, Serialize};

pub use types::{
    DefensivePact, Faction, FactionState, ResourceKind, Resources, Settlement, SettlementState,
    TradePact, TradeTransfer, Troops, UnitKind, Units,
};

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// The complete mutable state of one game, resolved one turn at a time.
///
/// Every faction id referenced by a settlement owner or occupier must exist in
/// the caller's roster; the resolver does not check this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub turn_number: u32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub factions: Vec<FactionState>,
    #[serde(default)]
    pub settlements: Vec<SettlementState>,
    #[serde(default)]
    pub defensive_pacts: Vec<DefensivePact>,
    #[serde(default)]
    pub trade_pacts: Vec<TradePact>,
}

impl Default for WorldState {
    fn default() -> Self {
        WorldState {
            schema_version: SCHEMA_VERSION,
            turn_number: 0,
            seed: 0,
            factions: Vec::new(),
            settlements: Vec::new(),
            defensive_pacts: Vec::new(),
            trade_pacts: Vec::new(),
        }
    }
}

impl WorldState {
    pub fn faction(&self, faction_id: &str) -> Option<&FactionState> {
        self.factions.iter().find(|f| f.faction_id == faction_id)
    }

    pub fn faction_mut(&mut self, faction_id: &str) -> Option<&mut FactionState> {
        self.factions.iter_mut().find(|f| f.faction_id == faction_id)
    }

    pub fn faction_index(&self, faction_id: &str) -> Option<usize> {
        self.factions.iter().position(|f| f.faction_id == faction_id)
    }

    pub fn settlement(&self, settlement_id: &str) -> Option<&SettlementState> {
        self.settlements
            .iter()
            .find(|s| s.settlement_id == settlement_id)
    }

    pub fn settlement_mut(&mut self, settlement_id: &str) -> Option<&mut SettlementState> {
        self.settlements
            .iter_mut()
            .find(|s| s.settlement_id == settlement_id)
    }

    /// Settlements owned (not merely occupied) by a faction, in state order.
    pub fn owned_settlements<'a>(
        &'a self,
        faction_id: &'a str,
    ) -> impl Iterator<Item = &'a SettlementState> + 'a {
        self.settlements
            .iter()
            .filter(move |s| s.owner_faction_id == faction_id)
    }

    pub fn has_defensive_pact(&self, first: &str, second: &str) -> bool {
        self.defensive_pacts.iter().any(|p| p.joins(first, second))
    }

    /// Distinct pact partners of a faction, in pact order.
    pub fn defensive_allies(&self, faction_id: &str) -> Vec<String> {
        let mut allies: Vec<String> = Vec::new();
        for partner in self
            .defensive_pacts
            .iter()
            .filter_map(|p| p.partner_of(faction_id))
        {
            if !allies.iter().any(|a| a == partner) {
                allies.push(partner.to_string());
            }
        }
        allies
    }

    /// Recompute every faction's economic-collapse flag.
    pub fn refresh_collapse_flags(&mut self) {
        for faction in &mut self.factions {
            faction.is_in_economic_collapse = faction.has_negative_resources();
        }
    }
}
