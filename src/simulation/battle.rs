//! Battle resolution: coalitions, defender mobilization, casualties and
//! settlement outcomes.

use crate::config::RuleBook;
use crate::simulation::edict::MilitaryOperation;
use crate::simulation::log::TurnLog;
use crate::simulation::military::{PreparedAttack, PreparedBattle, UnitPool};
use crate::world::{FactionState, Troops, UnitKind, WorldState};

/// Fraction of a side's contributed units lost in one battle.
struct CasualtyRate {
    numerator: i64,
    denominator: i64,
}

const HALF: CasualtyRate = CasualtyRate { numerator: 1, denominator: 2 };
const QUARTER: CasualtyRate = CasualtyRate { numerator: 1, denominator: 4 };
const ALL: CasualtyRate = CasualtyRate { numerator: 1, denominator: 1 };

impl CasualtyRate {
    /// Rounded up.
    fn of(&self, units: i64) -> i64 {
        if units <= 0 {
            return 0;
        }
        (units * self.numerator + self.denominator - 1) / self.denominator
    }
}

#[derive(Debug, Clone)]
struct Contributor {
    faction_id: String,
    troops: Troops,
}

fn total_units(side: &[Contributor]) -> i64 {
    side.iter().map(|c| c.troops.total_units()).sum()
}

fn total_power(side: &[Contributor]) -> i64 {
    side.iter().map(|c| c.troops.combat_power()).sum()
}

/// A primary attack plus every support aimed at its attacker.
fn coalition(primary: &PreparedAttack, attacks: &[PreparedAttack]) -> Vec<Contributor> {
    let mut contributors = vec![Contributor {
        faction_id: primary.attacker_faction_id.clone(),
        troops: primary.committed,
    }];
    contributors.extend(
        attacks
            .iter()
            .filter(|a| {
                a.operation == MilitaryOperation::SupportAttack
                    && a.supported_faction_id.as_deref() == Some(primary.attacker_faction_id.as_str())
            })
            .map(|a| Contributor {
                faction_id: a.attacker_faction_id.clone(),
                troops: a.committed,
            }),
    );
    contributors
}

/// Resolve every prepared battle in ascending settlement-id order.
///
/// `remaining` holds each faction's uncommitted units and is drawn down as
/// defenders mobilize, so a faction defending twice cannot spend the same
/// units twice.
pub fn resolve_battles(
    world: &mut WorldState,
    battles: &[PreparedBattle],
    remaining: &mut UnitPool,
    rules: &RuleBook,
    log: &mut TurnLog,
) {
    let mut ordered: Vec<&PreparedBattle> = battles.iter().collect();
    ordered.sort_by(|a, b| a.target_settlement_id.cmp(&b.target_settlement_id));

    for battle in ordered {
        resolve_battle(world, battle, remaining, rules, log);
    }
}

fn resolve_battle(
    world: &mut WorldState,
    battle: &PreparedBattle,
    remaining: &mut UnitPool,
    rules: &RuleBook,
    log: &mut TurnLog,
) {
    let settlement_id = &battle.target_settlement_id;
    let coalitions: Vec<(&PreparedAttack, Vec<Contributor>)> = battle
        .attacks
        .iter()
        .filter(|a| a.operation.is_primary())
        .map(|primary| (primary, coalition(primary, &battle.attacks)))
        .collect();

    if coalitions.is_empty() {
        log.record(format!("Battle {}: no primary attacks submitted.", settlement_id));
        return;
    }

    let strongest = coalitions
        .iter()
        .map(|(_, side)| total_power(side))
        .max()
        .unwrap_or(0);
    let mut leaders = coalitions.iter().filter(|(_, side)| total_power(side) == strongest);
    let (Some((primary, attackers)), None) = (leaders.next(), leaders.next()) else {
        log.record(format!(
            "Battle {}: multiple strongest attackers tied; defender holds.",
            settlement_id
        ));
        return;
    };

    let attack_power = strongest;
    let defenders = mobilize(world, battle, attack_power, remaining, log);
    let defense_power = battle.defender_garrison_strength + total_power(&defenders);

    if defense_power >= attack_power {
        log.record(format!(
            "Battle {}: defender {} wins (def {} vs atk {}).",
            settlement_id, battle.defender_faction_id, defense_power, attack_power
        ));
        apply_casualties(world, attackers, HALF.of(total_units(attackers)), log);
        apply_casualties(world, &defenders, QUARTER.of(total_units(&defenders)), log);
        return;
    }

    log.record(format!(
        "Battle {}: attacker {} wins (atk {} vs def {}).",
        settlement_id, primary.attacker_faction_id, attack_power, defense_power
    ));

    let full_losses = attackers
        .iter()
        .any(|c| rules.rules_for(&c.faction_id).full_losses_on_victory);
    let defender_rate = if full_losses { ALL } else { HALF };
    apply_casualties(world, attackers, QUARTER.of(total_units(attackers)), log);
    apply_casualties(world, &defenders, defender_rate.of(total_units(&defenders)), log);

    apply_outcome(world, settlement_id, primary, log);
}

/// Draw defending units, the owner first and then its pact allies, until the
/// mobilized power alone matches the attack. The garrison is added on top
/// afterwards. Army is drawn before fleet, fleet before mages.
fn mobilize(
    world: &WorldState,
    battle: &PreparedBattle,
    attack_power: i64,
    remaining: &mut UnitPool,
    log: &mut TurnLog,
) -> Vec<Contributor> {
    let mut power = 0;
    let mut contributors = Vec::new();

    let candidates = std::iter::once(battle.defender_faction_id.clone())
        .chain(world.defensive_allies(&battle.defender_faction_id));

    for faction_id in candidates {
        if power >= attack_power {
            break;
        }
        let Some(pool) = remaining.get_mut(&faction_id) else {
            continue;
        };

        let mut drawn = Troops::default();
        for kind in UnitKind::all() {
            let taken = units_needed(attack_power - power, kind.power()).min(pool.get(*kind).max(0));
            *pool.get_mut(*kind) -= taken;
            *drawn.get_mut(*kind) = taken;
            power = power.saturating_add(taken.saturating_mul(kind.power()));
        }
        if drawn.is_empty() {
            continue;
        }

        log.record(format!(
            "Battle {}: {} auto-defends with {}.",
            battle.target_settlement_id, faction_id, drawn
        ));
        contributors.push(Contributor {
            faction_id,
            troops: drawn,
        });
    }

    contributors
}

/// Fewest units of `unit_power` that cover `missing` power, overshooting by
/// less than one unit.
fn units_needed(missing: i64, unit_power: i64) -> i64 {
    if missing <= 0 {
        return 0;
    }
    (missing - 1) / unit_power + 1
}

/// Spread `casualties` over a side, each contributor losing at most what it
/// brought, in contribution order.
fn apply_casualties(world: &mut WorldState, side: &[Contributor], casualties: i64, log: &mut TurnLog) {
    let mut left = casualties;

    for contributor in side {
        if left <= 0 {
            break;
        }
        let brought = contributor.troops.total_units();
        if brought <= 0 {
            continue;
        }
        let Some(faction) = world.faction_mut(&contributor.faction_id) else {
            continue;
        };

        let share = brought.min(left);
        left -= share;
        let lost = remove_units(faction, share);
        if lost > 0 {
            log.record(format!(
                "Casualties: {} loses {} unit(s).",
                contributor.faction_id, lost
            ));
        }
    }
}

/// Remove up to `count` units, army first, then fleet, then mages. Returns
/// how many were removed.
fn remove_units(faction: &mut FactionState, count: i64) -> i64 {
    let mut left = count;
    for kind in UnitKind::all() {
        if left <= 0 {
            break;
        }
        let Some(held) = faction.units.get_mut(kind) else {
            continue;
        };
        let taken = (*held).max(0).min(left);
        *held -= taken;
        left -= taken;
    }
    count - left
}

fn apply_outcome(world: &mut WorldState, settlement_id: &str, primary: &PreparedAttack, log: &mut TurnLog) {
    let Some(settlement) = world.settlement_mut(settlement_id) else {
        return;
    };
    let attacker = &primary.attacker_faction_id;

    match primary.operation {
        MilitaryOperation::Takeover => {
            settlement.owner_faction_id = attacker.clone();
            settlement.occupying_faction_id = None;
            log.record(format!("Battle {}: takeover by {}.", settlement_id, attacker));
        }
        MilitaryOperation::Liberation => {
            settlement.occupying_faction_id = None;
            log.record(format!("Battle {}: liberation by {}.", settlement_id, attacker));
        }
        _ => {
            settlement.occupying_faction_id = Some(attacker.clone());
            log.record(format!("Battle {}: occupation by {}.", settlement_id, attacker));
        }
    }
}
