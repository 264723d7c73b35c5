use std::collections::BTreeMap;

use crate::config::RuleBook;
use crate::simulation::diplomacy;
use crate::simulation::edict::{Edict, EdictKind, ExternalEdict, InternalEdict, ResourceUsage, Section};
use crate::simulation::log::{signed, TurnLog};
use crate::simulation::production::{self, RESOLUTION_EDICT_LIMIT};
use crate::simulation::validation::{join_errors, validate};
use crate::simulation::ResolveError;
use crate::world::{ResourceKind, Resources, WorldState};

/// Bring every faction's settlement-count bonuses up to date.
///
/// Only the difference between the new target and the cumulative amount
/// already granted is applied, so resolving the same ownership twice grants
/// nothing the second time and losing a settlement takes its share back.
pub fn apply_settlement_bonuses(world: &mut WorldState, rules: &RuleBook, log: &mut TurnLog) {
    for index in 0..world.factions.len() {
        let faction_id = world.factions[index].faction_id.clone();
        let faction_rules = rules.rules_for(&faction_id);
        let controlled = world.owned_settlements(&faction_id).count() as i64;

        let faction = &mut world.factions[index];
        let gold_target = controlled * faction_rules.gold_per_settlement;
        let workforce_target = controlled * faction_rules.workforce_per_settlement;
        let gold_delta = gold_target - faction.applied_settlement_gold_bonus;
        let workforce_delta = workforce_target - faction.applied_settlement_workforce_bonus;

        let mut adjustments = Vec::new();
        if gold_delta != 0 {
            faction.adjust_resource(ResourceKind::Gold, gold_delta);
            faction.applied_settlement_gold_bonus = gold_target;
            adjustments.push(format!("Gold {}", signed(gold_delta)));
        }
        if workforce_delta != 0 {
            faction.adjust_resource(ResourceKind::Workforce, workforce_delta);
            faction.applied_settlement_workforce_bonus = workforce_target;
            adjustments.push(format!("Workforce {}", signed(workforce_delta)));
        }

        if !adjustments.is_empty() {
            log.record(format!(
                "Faction {} settlement bonus adjusted by {} (controlled settlements: {}).",
                faction_id,
                adjustments.join(", "),
                controlled
            ));
        }
    }
}

/// Resolve one economic section for one faction.
///
/// Requirements are checked against a snapshot taken before the section
/// starts, and every resource change is buffered and applied together once
/// all edicts were considered. Edicts in the same section therefore never see
/// each other's effects, while the next section sees all of them.
pub fn resolve_economic_phase(
    world: &mut WorldState,
    faction_index: usize,
    edicts: &[Edict],
    section: Section,
    rules: &RuleBook,
    log: &mut TurnLog,
) -> Result<(), ResolveError> {
    let faction_id = world.factions[faction_index].faction_id.clone();
    log.record(format!("Faction {}: section {} snapshot start.", faction_id, section));

    let section_edicts: Vec<&Edict> = edicts.iter().filter(|e| e.section == section).collect();
    if section_edicts.is_empty() {
        return Ok(());
    }
    log.record(format!(
        "Faction {}: section {} has {} edict(s).",
        faction_id,
        section,
        section_edicts.len()
    ));

    let snapshot = world.factions[faction_index].resources.clone();
    let mut pending: BTreeMap<ResourceKind, i64> = BTreeMap::new();
    let mut executed_internal: Vec<&InternalEdict> = Vec::new();
    let mut external: Vec<&ExternalEdict> = Vec::new();

    for edict in section_edicts {
        let errors = validate(edict, &world.factions[faction_index]);
        if !errors.is_empty() {
            log.record(format!(
                "Faction {}: skipped {} due to validation errors ({}).",
                faction_id,
                edict.describe(),
                join_errors(&errors)
            ));
            continue;
        }

        match &edict.kind {
            EdictKind::Internal(internal) => {
                if resolve_internal(&faction_id, &snapshot, internal, &mut pending, rules, log)? {
                    executed_internal.push(internal);
                }
            }
            EdictKind::External(order) => external.push(order),
            // Rejected by validation outside the military section.
            EdictKind::Military(_) => {}
        }
    }

    let faction = &mut world.factions[faction_index];
    for (resource, delta) in pending {
        faction.adjust_resource(resource, delta);
    }

    diplomacy::resolve_external_edicts(world, faction_index, &external, rules, log);
    apply_named_edict_bonus(world, faction_index, &executed_internal, rules, log);

    Ok(())
}

/// Returns whether the edict executed.
fn resolve_internal(
    faction_id: &str,
    snapshot: &Resources,
    edict: &InternalEdict,
    pending: &mut BTreeMap<ResourceKind, i64>,
    rules: &RuleBook,
    log: &mut TurnLog,
) -> Result<bool, ResolveError> {
    for requirement in &edict.inputs {
        let available = snapshot.get(&requirement.resource).copied().unwrap_or(0);
        if available < requirement.amount {
            log.record(format!(
                "Faction {}: internal edict '{}' skipped (snapshot has {} {:?}, needs {}).",
                faction_id, edict.name, available, requirement.resource, requirement.amount
            ));
            return Ok(false);
        }
    }

    for requirement in edict
        .inputs
        .iter()
        .filter(|input| input.usage == ResourceUsage::Consumed)
    {
        *pending.entry(requirement.resource).or_insert(0) -= requirement.amount;
    }

    for output in &edict.outputs {
        let per_execution = production::base_output(rules, faction_id, output.resource);
        let scaling = production::scale(per_execution, edict.execution_count, RESOLUTION_EDICT_LIMIT)?;
        let produced = scaling.produced();
        *pending.entry(output.resource).or_insert(0) += produced;

        log.record(format!(
            "Faction {}: internal edict '{}' produced {} {:?}.",
            faction_id, edict.name, produced, output.resource
        ));
    }

    Ok(true)
}

fn apply_named_edict_bonus(
    world: &mut WorldState,
    faction_index: usize,
    executed: &[&InternalEdict],
    rules: &RuleBook,
    log: &mut TurnLog,
) {
    let faction = &mut world.factions[faction_index];
    let Some(bonus) = &rules.rules_for(&faction.faction_id).named_edict_bonus else {
        return;
    };

    let occurrences = executed.iter().filter(|e| bonus.matches(&e.name)).count() as i64;
    if occurrences == 0 {
        return;
    }

    let gained = occurrences * bonus.amount;
    faction.adjust_resource(bonus.resource, gained);
    log.record(format!(
        "Faction {} special: +{} {:?} from {}.",
        faction.faction_id, gained, bonus.resource, bonus.edict_name
    ));
}
