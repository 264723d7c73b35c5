pub mod battle;
pub mod diplomacy;
pub mod edict;
pub mod log;
pub mod military;
pub mod phase;
pub mod production;
pub mod shuffle;
pub mod statistics;
pub mod validation;

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::RuleBook;
use crate::simulation::edict::{OrderMap, Section};
use crate::simulation::log::TurnLog;
use crate::simulation::military::{MilitaryIntent, PreparedBattle};
use crate::simulation::production::ScalingError;
use crate::simulation::statistics::TurnStatistics;
use crate::world::WorldState;

/// Contract violations that abort a turn. Bad edict content never ends up
/// here; it is skipped and logged instead.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("faction '{0}' appears more than once in the world state")]
    DuplicateFaction(String),
    #[error("production scaling failed: {0}")]
    Scaling(#[from] ScalingError),
}

/// Everything a turn produced besides the mutated world.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub log: TurnLog,
    pub faction_order: Vec<String>,
    /// Valid military edicts annotated with the units actually committed.
    pub military_intents: Vec<MilitaryIntent>,
    pub prepared_battles: Vec<PreparedBattle>,
    pub statistics: TurnStatistics,
}

/// Resolve one turn against `world` in place.
///
/// Pipeline: shuffle the factions that submitted orders, refresh settlement
/// bonuses, run sections I, II and III for each faction in shuffled order,
/// then collect, commit and fight every military intent at once. The seed is
/// stored on the world and collapse flags are recomputed at the end. The turn
/// number is left to the caller.
///
/// Identical world, orders, seed and rules always produce an identical world
/// and log.
pub fn resolve_turn(
    world: &mut WorldState,
    orders: &OrderMap,
    seed: u64,
    rules: &RuleBook,
) -> Result<TurnResult, ResolveError> {
    let turn_start = Instant::now();
    check_unique_factions(world)?;

    let faction_order = shuffle::shuffle_factions(orders.keys(), seed);
    info!(turn = world.turn_number, seed, factions = faction_order.len(), "Resolving turn");

    let mut log = TurnLog::new();
    log.record(format!("Resolve turn {} with seed {}.", world.turn_number, seed));
    log.record(format!("Faction order: {}", faction_order.join(", ")));

    phase::apply_settlement_bonuses(world, rules, &mut log);

    for faction_id in &faction_order {
        let Some(edicts) = orders.get(faction_id) else {
            continue;
        };
        let Some(index) = world.faction_index(faction_id) else {
            warn!(faction = %faction_id, "Orders submitted for unknown faction");
            log.record(format!(
                "Faction {}: no faction state; orders dropped.",
                faction_id
            ));
            continue;
        };

        log.record(format!("Faction {}: begin resolution.", faction_id));
        for section in Section::economic() {
            phase::resolve_economic_phase(world, index, edicts, *section, rules, &mut log)?;
        }
    }

    let mut military_intents = military::collect_intents(orders, &faction_order);
    let mut remaining = military::commit_troops(world, &mut military_intents, &mut log);
    let prepared_battles = military::prepare_battles(world, &military_intents, &mut log);
    log.record(format!("Military intents collected: {}.", military_intents.len()));
    log.record(format!("Prepared battles: {}.", prepared_battles.len()));

    battle::resolve_battles(world, &prepared_battles, &mut remaining, rules, &mut log);

    world.seed = seed;
    world.refresh_collapse_flags();

    let turn_duration = turn_start.elapsed().as_secs_f32() * 1000.0;
    let statistics = statistics::compute_statistics(
        world,
        military_intents.len(),
        prepared_battles.len(),
        log.len(),
        turn_duration,
    );
    info!(
        turn = world.turn_number,
        log_entries = log.len(),
        battles = prepared_battles.len(),
        collapsed = statistics.factions_in_collapse.len(),
        duration_ms = turn_duration,
        "Turn resolved"
    );

    Ok(TurnResult {
        log,
        faction_order,
        military_intents,
        prepared_battles,
        statistics,
    })
}

fn check_unique_factions(world: &WorldState) -> Result<(), ResolveError> {
    let mut seen = BTreeSet::new();
    for faction in &world.factions {
        if !seen.insert(faction.faction_id.as_str()) {
            return Err(ResolveError::DuplicateFaction(faction.faction_id.clone()));
        }
    }
    Ok(())
}
