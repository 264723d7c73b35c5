use std::collections::BTreeMap;

use serde::Serialize;

use crate::world::{ResourceKind, Troops, UnitKind, WorldState};

/// Per-turn aggregate metrics for introspection and degenerate state detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnStatistics {
    pub turn: u32,
    pub factions: usize,
    pub factions_in_collapse: Vec<String>,
    pub occupied_settlements: usize,
    pub defensive_pacts: usize,
    pub military_intents: usize,
    pub battles: usize,
    pub log_entries: usize,
    /// Sum of every faction's holdings, negative balances included.
    pub resource_totals: BTreeMap<ResourceKind, i64>,
    pub total_units: Troops,
    pub turn_duration_ms: f32,
}

/// Compute statistics for the world state after a turn.
pub fn compute_statistics(
    world: &WorldState,
    military_intents: usize,
    battles: usize,
    log_entries: usize,
    turn_duration_ms: f32,
) -> TurnStatistics {
    let mut resource_totals: BTreeMap<ResourceKind, i64> = BTreeMap::new();
    let mut total_units = Troops::default();

    for faction in &world.factions {
        for (resource, amount) in &faction.resources {
            *resource_totals.entry(*resource).or_insert(0) += amount;
        }
        for kind in UnitKind::all() {
            *total_units.get_mut(*kind) += faction.unit(*kind);
        }
    }

    TurnStatistics {
        turn: world.turn_number,
        factions: world.factions.len(),
        factions_in_collapse: world
            .factions
            .iter()
            .filter(|f| f.is_in_economic_collapse)
            .map(|f| f.faction_id.clone())
            .collect(),
        occupied_settlements: world.settlements.iter().filter(|s| s.is_occupied()).count(),
        defensive_pacts: world.defensive_pacts.len(),
        military_intents,
        battles,
        log_entries,
        resource_totals,
        total_units,
        turn_duration_ms,
    }
}

impl std::fmt::Display for TurnStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Turn {}: {} factions, {} log entries", self.turn, self.factions, self.log_entries)?;
        writeln!(
            f,
            "  military: {} intents, {} battles, {} occupied settlements",
            self.military_intents, self.battles, self.occupied_settlements
        )?;
        writeln!(f, "  defensive pacts: {}", self.defensive_pacts)?;
        writeln!(f, "  units: {}", self.total_units)?;
        if self.factions_in_collapse.is_empty() {
            write!(f, "  no faction in economic collapse")
        } else {
            write!(f, "  in economic collapse: {}", self.factions_in_collapse.join(", "))
        }
    }
}
