//! Military intents: collection, troop commitment and battle preparation.
//!
//! Nothing here changes the world. Commitment draws from a working copy of
//! each faction's units; the copy left over afterwards is the pool defenders
//! mobilize from during battle resolution.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::simulation::edict::{EdictKind, MilitaryEdict, MilitaryOperation, OrderMap};
use crate::simulation::log::TurnLog;
use crate::world::{Troops, UnitKind, WorldState};

/// Remaining uncommitted units per faction.
pub type UnitPool = BTreeMap<String, Troops>;

/// A submitted military edict and the units actually committed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilitaryIntent {
    pub issuing_faction_id: String,
    pub order: MilitaryEdict,
    pub committed: Troops,
}

impl MilitaryIntent {
    pub fn target_settlement_id(&self) -> &str {
        self.order.target_settlement_id.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedAttack {
    pub attacker_faction_id: String,
    pub operation: MilitaryOperation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_faction_id: Option<String>,
    /// The attacker's full units at preparation time.
    pub available: Troops,
    pub committed: Troops,
}

/// All military activity aimed at one settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedBattle {
    pub target_settlement_id: String,
    pub defender_faction_id: String,
    pub defender_garrison_strength: i64,
    pub attacks: Vec<PreparedAttack>,
}

/// Gather every military edict, factions in resolution order and each
/// faction's edicts in submission order.
///
/// Nothing is filtered here: a collapsed faction may still march, and
/// negative requests are clamped when troops are committed.
pub fn collect_intents(orders: &OrderMap, faction_order: &[String]) -> Vec<MilitaryIntent> {
    faction_order
        .iter()
        .filter_map(|faction_id| orders.get(faction_id).map(|edicts| (faction_id, edicts)))
        .flat_map(|(faction_id, edicts)| {
            edicts.iter().filter_map(move |edict| match &edict.kind {
                EdictKind::Military(order) => Some(MilitaryIntent {
                    issuing_faction_id: faction_id.clone(),
                    order: order.clone(),
                    committed: Troops::default(),
                }),
                _ => None,
            })
        })
        .collect()
}

/// Commit units to every intent in order, first come first served.
///
/// Each intent receives `min(requested, still available)` per unit kind.
/// Faction units are not touched; the returned pool holds what no intent
/// claimed.
pub fn commit_troops(world: &WorldState, intents: &mut [MilitaryIntent], log: &mut TurnLog) -> UnitPool {
    let mut pool: UnitPool = world
        .factions
        .iter()
        .map(|faction| {
            let mut available = faction.troops();
            for kind in UnitKind::all() {
                let count = available.get_mut(*kind);
                *count = (*count).max(0);
            }
            (faction.faction_id.clone(), available)
        })
        .collect();

    for intent in intents.iter_mut() {
        let Some(available) = pool.get_mut(&intent.issuing_faction_id) else {
            continue;
        };

        let mut committed = Troops::default();
        for kind in UnitKind::all() {
            let granted = intent.order.requested.get(*kind).max(0).min(available.get(*kind));
            *committed.get_mut(*kind) = granted;
            *available.get_mut(*kind) -= granted;
        }
        intent.committed = committed;

        log.record(format!(
            "Military commit: {} committed {} for {:?}.",
            intent.issuing_faction_id, committed, intent.order.operation
        ));
    }

    pool
}

/// Group intents into one battle per targeted settlement, in order of first
/// appearance. Intents against unknown settlements are dropped.
pub fn prepare_battles(world: &WorldState, intents: &[MilitaryIntent], log: &mut TurnLog) -> Vec<PreparedBattle> {
    let mut battles: Vec<PreparedBattle> = Vec::new();

    for intent in intents {
        let target_id = intent.target_settlement_id();
        let Some(settlement) = world.settlement(target_id) else {
            warn!(faction = %intent.issuing_faction_id, target = %target_id, "Unknown target settlement");
            log.record(format!(
                "Military intent skipped: target settlement '{}' does not exist.",
                target_id
            ));
            continue;
        };

        let attack = PreparedAttack {
            attacker_faction_id: intent.issuing_faction_id.clone(),
            operation: intent.order.operation,
            supported_faction_id: intent.order.supported_faction_id.clone(),
            available: world
                .faction(&intent.issuing_faction_id)
                .map(|f| f.troops())
                .unwrap_or_default(),
            committed: intent.committed,
        };

        match battles.iter_mut().find(|b| b.target_settlement_id == target_id) {
            Some(battle) => battle.attacks.push(attack),
            None => battles.push(PreparedBattle {
                target_settlement_id: settlement.settlement_id.clone(),
                defender_faction_id: settlement.owner_faction_id.clone(),
                defender_garrison_strength: settlement.garrison_strength,
                attacks: vec![attack],
            }),
        }
    }

    battles
}
