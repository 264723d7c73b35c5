//! Production math: per-execution output, diminishing-returns scaling and
//! settlement-derived edict limits. Everything here is pure.

use std::collections::BTreeMap;

use crate::config::RuleBook;
use crate::world::{ResourceKind, Settlement};

pub const BASE_INTERNAL_OUTPUT: i64 = 4;
pub const STRONG_RESOURCE_BONUS: i64 = 2;
pub const BASE_EDICT_LIMIT: i64 = 2;
/// Limit used for every internal edict during turn resolution.
pub const RESOLUTION_EDICT_LIMIT: i64 = 2;
/// Bonus granted by the first controlled settlement; each later one grants
/// one less, never below zero.
const FIRST_SETTLEMENT_LIMIT_BONUS: i64 = 20;

/// Contract violations for [`scale`]. Callers must pre-validate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScalingError {
    #[error("base output per execution must be >= 0, got {0}")]
    NegativeBaseOutput(i64),
    #[error("requested executions must be >= 0, got {0}")]
    NegativeRequested(i64),
    #[error("edict limit must be > 0, got {0}")]
    NonPositiveLimit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingOutcome {
    pub requested: i64,
    pub executed: i64,
    pub full_output_executions: i64,
    pub reduced_output_executions: i64,
    /// Exact total; reduced executions yield half output, so this may carry
    /// a fractional half.
    pub total_output: f64,
}

impl ScalingOutcome {
    /// Integer output credited to the faction (floor of the exact total).
    pub fn produced(&self) -> i64 {
        self.total_output.floor() as i64
    }
}

/// Apply diminishing returns to `requested` executions.
///
/// The first `limit` executions yield `base` each, the next `limit` yield
/// `base / 2`, and anything past `2 * limit` does not run.
pub fn scale(base: i64, requested: i64, limit: i64) -> Result<ScalingOutcome, ScalingError> {
    if base < 0 {
        return Err(ScalingError::NegativeBaseOutput(base));
    }
    if requested < 0 {
        return Err(ScalingError::NegativeRequested(requested));
    }
    if limit <= 0 {
        return Err(ScalingError::NonPositiveLimit(limit));
    }

    let max_executions = limit * 2;
    let executed = requested.min(max_executions);
    let full = executed.min(limit);
    let reduced = executed - full;
    let total_output = (full * base) as f64 + reduced as f64 * (base as f64 / 2.0);

    Ok(ScalingOutcome {
        requested,
        executed,
        full_output_executions: full,
        reduced_output_executions: reduced,
        total_output,
    })
}

/// Output of one execution of an internal edict producing `resource`.
pub fn base_output(rules: &RuleBook, faction_id: &str, resource: ResourceKind) -> i64 {
    let faction_rules = rules.rules_for(faction_id);
    let mut output = BASE_INTERNAL_OUTPUT;

    if faction_rules.is_strong(resource) {
        output += STRONG_RESOURCE_BONUS + faction_rules.strong_resource_extra_bonus;
    }

    if let Some(bonus) = faction_rules.resource_bonuses.get(&resource) {
        output += bonus;
    }

    output
}

/// Per-resource production ceilings for a faction's controlled settlements.
///
/// Settlements are taken in the order given: the first adds 20 to each of its
/// distinct focuses, the second 19, and so on. Callers choose the priority by
/// ordering the slice; this function never reorders it.
pub fn limits(controlled: &[Settlement]) -> BTreeMap<ResourceKind, i64> {
    let mut limits: BTreeMap<ResourceKind, i64> = ResourceKind::all()
        .iter()
        .map(|&resource| (resource, BASE_EDICT_LIMIT))
        .collect();

    for (position, settlement) in controlled.iter().enumerate() {
        let bonus = (FIRST_SETTLEMENT_LIMIT_BONUS - position as i64).max(0);
        let mut focuses = settlement.resource_focuses.clone();
        focuses.sort();
        focuses.dedup();
        for focus in focuses {
            *limits.entry(focus).or_insert(BASE_EDICT_LIMIT) += bonus;
        }
    }

    limits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settlement(id: &str, focuses: &[ResourceKind]) -> Settlement {
        Settlement {
            id: id.to_string(),
            name: id.to_uppercase(),
            resource_focuses: focuses.to_vec(),
            base_garrison_strength: 0,
        }
    }

    #[test]
    fn scaling_halves_output_above_limit_and_caps_at_double() {
        let outcome = scale(4, 7, 3).unwrap();
        assert_eq!(outcome.requested, 7);
        assert_eq!(outcome.executed, 6);
        assert_eq!(outcome.full_output_executions, 3);
        assert_eq!(outcome.reduced_output_executions, 3);
        assert_eq!(outcome.total_output, 18.0);
        assert_eq!(outcome.produced(), 18);
    }

    #[test]
    fn scaling_floors_fractional_totals() {
        // 2 full at 5 plus 1 reduced at 2.5
        let outcome = scale(5, 3, 2).unwrap();
        assert_eq!(outcome.total_output, 12.5);
        assert_eq!(outcome.produced(), 12);
    }

    #[test]
    fn scaling_within_limit_is_linear() {
        let outcome = scale(6, 2, 2).unwrap();
        assert_eq!(outcome.executed, 2);
        assert_eq!(outcome.reduced_output_executions, 0);
        assert_eq!(outcome.produced(), 12);
    }

    #[test]
    fn scaling_zero_requested_produces_nothing() {
        let outcome = scale(4, 0, 2).unwrap();
        assert_eq!(outcome.executed, 0);
        assert_eq!(outcome.produced(), 0);
    }

    #[test]
    fn scaling_rejects_contract_violations() {
        assert_eq!(scale(-1, 1, 1), Err(ScalingError::NegativeBaseOutput(-1)));
        assert_eq!(scale(1, -1, 1), Err(ScalingError::NegativeRequested(-1)));
        assert_eq!(scale(1, 1, 0), Err(ScalingError::NonPositiveLimit(0)));
    }

    #[test]
    fn base_output_applies_strong_and_faction_bonuses() {
        let rules = RuleBook::builtin();
        assert_eq!(base_output(&rules, "aelthuun", ResourceKind::Food), 4);
        assert_eq!(base_output(&rules, "aelthuun", ResourceKind::MagicItems), 6);
        assert_eq!(base_output(&rules, "mar-rhazun", ResourceKind::Iron), 7);
        assert_eq!(base_output(&rules, "qal-asar", ResourceKind::MagicItems), 8);
        assert_eq!(base_output(&rules, "unknown", ResourceKind::Gold), 4);
    }

    #[test]
    fn limits_grow_with_settlement_position() {
        let controlled = [
            settlement(
                "c1",
                &[ResourceKind::Food, ResourceKind::Wood, ResourceKind::Iron],
            ),
            settlement(
                "c2",
                &[ResourceKind::Food, ResourceKind::Gold, ResourceKind::Tools],
            ),
        ];
        let limits = limits(&controlled);
        assert_eq!(limits[&ResourceKind::Food], 41);
        assert_eq!(limits[&ResourceKind::Wood], 22);
        assert_eq!(limits[&ResourceKind::Iron], 22);
        assert_eq!(limits[&ResourceKind::Gold], 21);
        assert_eq!(limits[&ResourceKind::Tools], 21);
        assert_eq!(limits[&ResourceKind::LuxuryGoods], 2);
    }

    #[test]
    fn limits_ignore_duplicate_focuses() {
        let controlled = [settlement(
            "c1",
            &[ResourceKind::Ships, ResourceKind::Ships],
        )];
        assert_eq!(limits(&controlled)[&ResourceKind::Ships], 22);
    }

    #[test]
    fn limits_bonus_never_negative() {
        let controlled: Vec<Settlement> = (0..25)
            .map(|i| settlement(&format!("c{}", i), &[ResourceKind::Scholars]))
            .collect();
        // 2 + (20 + 19 + ... + 1) + 0 * 5
        assert_eq!(limits(&controlled)[&ResourceKind::Scholars], 2 + 210);
    }

    #[test]
    fn limits_depend_on_caller_order() {
        let a = settlement("a", &[ResourceKind::Food]);
        let b = settlement("b", &[ResourceKind::Wood]);
        let forward = limits(&[a.clone(), b.clone()]);
        let backward = limits(&[b, a]);
        assert_eq!(forward[&ResourceKind::Food], 22);
        assert_eq!(backward[&ResourceKind::Food], 21);
    }
}
