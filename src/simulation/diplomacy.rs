use tracing::warn;

use crate::config::RuleBook;
use crate::simulation::edict::{ExternalEdict, ExternalKind};
use crate::simulation::log::TurnLog;
use crate::world::{DefensivePact, ResourceKind, WorldState};

/// Resolve a faction's validated external edicts for one section, in order.
///
/// Runs after the section's internal deltas were applied, so trades move
/// resources from the post-production balance.
pub fn resolve_external_edicts(
    world: &mut WorldState,
    issuer_index: usize,
    edicts: &[&ExternalEdict],
    rules: &RuleBook,
    log: &mut TurnLog,
) {
    for edict in edicts {
        match edict.external_kind {
            ExternalKind::TradeContract => resolve_trade(world, issuer_index, edict, rules, log),
            ExternalKind::DefensivePact => resolve_pact(world, issuer_index, edict, log),
            ExternalKind::Spy => resolve_spy(world, issuer_index, edict, log),
        }
    }
}

fn resolve_trade(
    world: &mut WorldState,
    issuer_index: usize,
    edict: &ExternalEdict,
    rules: &RuleBook,
    log: &mut TurnLog,
) {
    let issuer_id = world.factions[issuer_index].faction_id.clone();
    let Some(resource) = edict.resource else {
        return;
    };
    if edict.amount <= 0 {
        return;
    }
    let Some(target_index) = world.faction_index(&edict.target_faction_id) else {
        warn!(faction = %issuer_id, target = %edict.target_faction_id, "Trade target not found");
        log.record(format!(
            "Faction {}: trade contract target {} not found.",
            issuer_id, edict.target_faction_id
        ));
        return;
    };

    let (exporter_index, importer_index) = if edict.inbound_to_issuer {
        (target_index, issuer_index)
    } else {
        (issuer_index, target_index)
    };

    world.factions[exporter_index].adjust_resource(resource, -edict.amount);
    world.factions[importer_index].adjust_resource(resource, edict.amount);

    let exporter_id = world.factions[exporter_index].faction_id.clone();
    log.record(format!(
        "Trade: {} -> {}: {} {:?}.",
        exporter_id, world.factions[importer_index].faction_id, edict.amount, resource
    ));

    let rate = rules
        .rules_for(&exporter_id)
        .export_gold_rate
        .filter(|rate| *rate > 0);
    if let Some(rate) = rate {
        let bonus = edict.amount / rate;
        if bonus > 0 {
            world.factions[exporter_index].adjust_resource(ResourceKind::Gold, bonus);
            log.record(format!(
                "Faction {} special: +{} Gold from trade exports.",
                exporter_id, bonus
            ));
        }
    }
}

fn resolve_pact(world: &mut WorldState, issuer_index: usize, edict: &ExternalEdict, log: &mut TurnLog) {
    let issuer_id = world.factions[issuer_index].faction_id.clone();
    let target_id = &edict.target_faction_id;

    if *target_id == issuer_id {
        log.record(format!(
            "Faction {}: defensive pact with itself ignored.",
            issuer_id
        ));
        return;
    }
    if world.faction(target_id).is_none() {
        warn!(faction = %issuer_id, target = %target_id, "Pact target not found");
        log.record(format!(
            "Faction {}: defensive pact target {} not found.",
            issuer_id, target_id
        ));
        return;
    }
    if world.has_defensive_pact(&issuer_id, target_id) {
        return;
    }

    world.defensive_pacts.push(DefensivePact {
        faction_a_id: issuer_id.clone(),
        faction_b_id: target_id.clone(),
    });
    log.record(format!(
        "Defensive pact established: {} <-> {}.",
        issuer_id, target_id
    ));
}

fn resolve_spy(world: &WorldState, issuer_index: usize, edict: &ExternalEdict, log: &mut TurnLog) {
    let issuer_id = &world.factions[issuer_index].faction_id;
    if world.faction(&edict.target_faction_id).is_none() {
        log.record(format!(
            "Faction {}: spy target {} not found.",
            issuer_id, edict.target_faction_id
        ));
        return;
    }
    log.record(format!(
        "Faction {}: spy edict registered against {}.",
        issuer_id, edict.target_faction_id
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::FactionState;

    fn world(ids: &[&str]) -> WorldState {
        WorldState {
            factions: ids.iter().map(|id| FactionState::new(*id)).collect(),
            ..WorldState::default()
        }
    }

    fn external(kind: ExternalKind, target: &str, resource: Option<ResourceKind>, amount: i64) -> ExternalEdict {
        ExternalEdict {
            external_kind: kind,
            target_faction_id: target.to_string(),
            resource,
            amount,
            inbound_to_issuer: false,
        }
    }

    fn resolve(world: &mut WorldState, issuer: usize, edicts: &[ExternalEdict]) -> TurnLog {
        let mut log = TurnLog::new();
        let refs: Vec<&ExternalEdict> = edicts.iter().collect();
        resolve_external_edicts(world, issuer, &refs, &RuleBook::builtin(), &mut log);
        log
    }

    #[test]
    fn outbound_trade_moves_resources_to_target() {
        let mut world = world(&["shoal", "sos"]);
        let trade = external(ExternalKind::TradeContract, "sos", Some(ResourceKind::Food), 4);

        let log = resolve(&mut world, 0, &[trade]);

        assert_eq!(world.factions[0].resource(ResourceKind::Food), -4);
        assert_eq!(world.factions[1].resource(ResourceKind::Food), 4);
        assert_eq!(log.entries(), ["Trade: shoal -> sos: 4 Food."]);
    }

    #[test]
    fn inbound_trade_pays_export_bonus_to_target() {
        let mut world = world(&["shoal", "aurumbrae"]);
        let mut trade = external(ExternalKind::TradeContract, "aurumbrae", Some(ResourceKind::Tools), 12);
        trade.inbound_to_issuer = true;

        let log = resolve(&mut world, 0, &[trade]);

        let aurumbrae = &world.factions[1];
        assert_eq!(aurumbrae.resource(ResourceKind::Tools), -12);
        assert_eq!(aurumbrae.resource(ResourceKind::Gold), 2);
        assert_eq!(world.factions[0].resource(ResourceKind::Tools), 12);
        assert_eq!(world.factions[0].resource(ResourceKind::Gold), 0);
        assert_eq!(log.entries()[0], "Trade: aurumbrae -> shoal: 12 Tools.");
        assert_eq!(log.entries()[1], "Faction aurumbrae special: +2 Gold from trade exports.");
    }

    #[test]
    fn small_exports_earn_no_bonus() {
        let mut world = world(&["aurumbrae", "shoal"]);
        let trade = external(ExternalKind::TradeContract, "shoal", Some(ResourceKind::Gold), 4);

        let log = resolve(&mut world, 0, &[trade]);

        assert_eq!(world.factions[0].resource(ResourceKind::Gold), -4);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn trade_with_unknown_target_dropped() {
        let mut world = world(&["shoal"]);
        let trade = external(ExternalKind::TradeContract, "atlantis", Some(ResourceKind::Food), 4);

        let log = resolve(&mut world, 0, &[trade]);

        assert_eq!(world.factions[0].resource(ResourceKind::Food), 0);
        assert_eq!(log.entries(), ["Faction shoal: trade contract target atlantis not found."]);
    }

    #[test]
    fn defensive_pact_is_idempotent() {
        let mut world = world(&["elyndar", "taznar"]);
        let pact = external(ExternalKind::DefensivePact, "taznar", None, 0);

        resolve(&mut world, 0, &[pact.clone(), pact]);
        let reverse = external(ExternalKind::DefensivePact, "elyndar", None, 0);
        let log = resolve(&mut world, 1, &[reverse]);

        assert_eq!(world.defensive_pacts.len(), 1);
        assert!(world.has_defensive_pact("taznar", "elyndar"));
        assert!(log.is_empty());
    }

    #[test]
    fn pact_with_self_or_stranger_ignored() {
        let mut world = world(&["elyndar"]);
        let edicts = [
            external(ExternalKind::DefensivePact, "elyndar", None, 0),
            external(ExternalKind::DefensivePact, "nowhere", None, 0),
        ];

        let log = resolve(&mut world, 0, &edicts);

        assert!(world.defensive_pacts.is_empty());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn spy_only_logs() {
        let mut world = world(&["sos", "shoal"]);
        let before = world.clone();
        let spy = external(ExternalKind::Spy, "shoal", None, 0);

        let log = resolve(&mut world, 0, &[spy]);

        assert_eq!(world, before);
        assert_eq!(log.entries(), ["Faction sos: spy edict registered against shoal."]);
    }
}
