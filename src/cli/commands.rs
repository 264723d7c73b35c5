use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::config::{ConfigError, ResolverConfig, RuleBook, Roster};
use crate::persistence::{self, ExchangeError};
use crate::simulation::production;
use crate::simulation::validation::{validate, ValidationError};
use crate::simulation::{self, ResolveError, TurnResult};
use crate::world::setup::setup_world;
use crate::world::{ResourceKind, WorldState};

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("Turn resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Faction '{0}' not found in world state")]
    UnknownFaction(String),
    #[error("{} already exists; pass --force to overwrite", .0.display())]
    AlreadyExists(std::path::PathBuf),
}

/// The configured rule book, or the built-in one.
pub fn load_rules(config: &ResolverConfig) -> Result<RuleBook, CommandError> {
    match &config.rules_file {
        Some(path) => Ok(RuleBook::from_file(Path::new(path))?),
        None => Ok(RuleBook::builtin()),
    }
}

/// The configured roster, or the built-in one.
pub fn load_roster(config: &ResolverConfig) -> Result<Roster, CommandError> {
    match &config.roster_file {
        Some(path) => Ok(Roster::from_file(Path::new(path))?),
        None => Ok(Roster::builtin()),
    }
}

/// Create a turn-zero world from the roster and save it.
pub fn init_world(config: &ResolverConfig, output: &Path, force: bool) -> Result<WorldState, CommandError> {
    if output.exists() && !force {
        return Err(CommandError::AlreadyExists(output.to_path_buf()));
    }

    let roster = load_roster(config)?;
    let world = setup_world(&roster);
    persistence::save_world(&world, output)?;

    info!(
        path = %output.display(),
        factions = world.factions.len(),
        settlements = world.settlements.len(),
        "World initialized"
    );
    Ok(world)
}

/// Resolve one turn: load state and orders, resolve, advance the turn number
/// and save the result to `output`.
pub fn resolve(
    config: &ResolverConfig,
    state_path: &Path,
    orders_path: &Path,
    seed: u64,
    output: &Path,
) -> Result<TurnResult, CommandError> {
    let rules = load_rules(config)?;
    let mut world = persistence::load_world(state_path)?;
    let orders = persistence::load_orders(orders_path)?;

    let result = simulation::resolve_turn(&mut world, &orders, seed, &rules)?;
    world.turn_number += 1;
    persistence::save_world(&world, output)?;

    info!(path = %output.display(), turn = world.turn_number, "World saved");
    Ok(result)
}

/// Print a resolved turn's log and statistics.
pub fn print_turn(result: &TurnResult) {
    for entry in result.log.entries() {
        println!("{}", entry);
    }
    println!();
    println!("{}", result.statistics);
}

/// Validation outcome for one submitted edict.
#[derive(Debug, Clone)]
pub struct EdictCheck {
    pub faction_id: String,
    pub edict: String,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub checks: Vec<EdictCheck>,
    /// Order-map keys with no matching faction state.
    pub unknown_factions: Vec<String>,
}

impl ValidationReport {
    pub fn invalid_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.errors.is_empty()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.invalid_count() == 0 && self.unknown_factions.is_empty()
    }
}

/// Run the edict validator over an orders file without resolving anything.
pub fn validate_orders(state_path: &Path, orders_path: &Path) -> Result<ValidationReport, CommandError> {
    let world = persistence::load_world(state_path)?;
    let orders = persistence::load_orders(orders_path)?;
    let mut report = ValidationReport::default();

    for (faction_id, edicts) in &orders {
        let Some(faction) = world.faction(faction_id) else {
            report.unknown_factions.push(faction_id.clone());
            continue;
        };
        for edict in edicts {
            report.checks.push(EdictCheck {
                faction_id: faction_id.clone(),
                edict: format!("[{}] {}", edict.section, edict.describe()),
                errors: validate(edict, faction),
            });
        }
    }

    Ok(report)
}

pub fn print_validation(report: &ValidationReport) {
    for check in &report.checks {
        if check.errors.is_empty() {
            println!("  ok    {}: {}", check.faction_id, check.edict);
        } else {
            println!("  FAIL  {}: {}", check.faction_id, check.edict);
            for error in &check.errors {
                println!("          - {}", error);
            }
        }
    }
    for faction_id in &report.unknown_factions {
        println!("  FAIL  {}: no faction state", faction_id);
    }
    println!(
        "\n{} edict(s) checked, {} invalid, {} unknown faction(s)",
        report.checks.len(),
        report.invalid_count(),
        report.unknown_factions.len()
    );
}

/// Edict limits for the settlements a faction owns, taken in roster order.
pub fn edict_limits(
    config: &ResolverConfig,
    state_path: &Path,
    faction_id: &str,
) -> Result<BTreeMap<ResourceKind, i64>, CommandError> {
    let roster = load_roster(config)?;
    let world = persistence::load_world(state_path)?;
    if world.faction(faction_id).is_none() {
        return Err(CommandError::UnknownFaction(faction_id.to_string()));
    }

    let owned: Vec<_> = roster
        .settlements
        .iter()
        .filter(|entry| {
            world
                .settlement(&entry.id)
                .is_some_and(|s| s.owner_faction_id == faction_id)
        })
        .map(|entry| entry.definition())
        .collect();

    Ok(production::limits(&owned))
}

pub fn print_limits(faction_id: &str, limits: &BTreeMap<ResourceKind, i64>) {
    println!("=== Edict limits: {} ===", faction_id);
    for (resource, limit) in limits {
        println!("  {:<14} {:>4}", format!("{:?}", resource), limit);
    }
}

/// Inspect a faction or the whole world.
pub fn inspect(state_path: &Path, faction_id: Option<&str>) -> Result<(), CommandError> {
    let world = persistence::load_world(state_path)?;

    match faction_id {
        Some(id) => inspect_faction(&world, id),
        None => {
            inspect_world(&world);
            Ok(())
        }
    }
}

fn inspect_faction(world: &WorldState, faction_id: &str) -> Result<(), CommandError> {
    let faction = world
        .faction(faction_id)
        .ok_or_else(|| CommandError::UnknownFaction(faction_id.to_string()))?;

    println!("=== Faction {} ===", faction.faction_id);
    if let Some(overlord) = &faction.overlord_faction_id {
        println!("Overlord: {}", overlord);
    }
    println!("Economic collapse: {}", faction.is_in_economic_collapse);
    println!(
        "Applied settlement bonus: gold {}, workforce {}",
        faction.applied_settlement_gold_bonus, faction.applied_settlement_workforce_bonus
    );
    println!();
    println!("--- Resources ---");
    for resource in ResourceKind::all() {
        println!("  {:<14} {:>6}", format!("{:?}", resource), faction.resource(*resource));
    }
    println!();
    println!("--- Units ---");
    println!("  {}", faction.troops());
    println!();
    println!("--- Settlements ---");
    let mut any = false;
    for settlement in &world.settlements {
        let owned = settlement.owner_faction_id == faction.faction_id;
        let occupying = settlement.occupying_faction_id.as_deref() == Some(faction.faction_id.as_str());
        if owned || occupying {
            any = true;
            let role = if owned { "owner" } else { "occupier" };
            println!(
                "  {} ({}, garrison {})",
                settlement.settlement_id, role, settlement.garrison_strength
            );
        }
    }
    if !any {
        println!("  (none)");
    }
    println!();
    println!("--- Defensive pacts ---");
    let allies = world.defensive_allies(&faction.faction_id);
    if allies.is_empty() {
        println!("  (none)");
    } else {
        println!("  {}", allies.join(", "));
    }

    Ok(())
}

fn inspect_world(world: &WorldState) {
    println!("=== World ===");
    println!("Turn: {}", world.turn_number);
    println!("Last seed: {}", world.seed);
    println!("Factions: {}", world.factions.len());
    println!("Settlements: {}", world.settlements.len());
    println!("Defensive pacts: {}", world.defensive_pacts.len());
    println!();

    println!("{:<18} {:>8} {:>9} {:<18}", "Faction", "Collapse", "Settled", "Units");
    println!("{}", "-".repeat(56));
    for faction in &world.factions {
        let owned = world.owned_settlements(&faction.faction_id).count();
        println!(
            "{:<18} {:>8} {:>9} {:<18}",
            faction.faction_id,
            if faction.is_in_economic_collapse { "yes" } else { "no" },
            owned,
            faction.troops().to_string()
        );
    }
}
