//! Structural and collapse-state checks for a single edict.
//!
//! Validation never fails loudly: every problem becomes a
//! [`ValidationError`] and the caller decides whether to skip the edict.

use crate::simulation::edict::{
    Edict, EdictKind, ExternalEdict, ExternalKind, InternalEdict, MilitaryEdict,
    MilitaryOperation, Section,
};
use crate::world::FactionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Join errors for a single audit-log line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check an edict against its issuer's current state.
///
/// Returns an empty list when the edict may be resolved.
pub fn validate(edict: &Edict, issuer: &FactionState) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if edict.issuing_faction_id.trim().is_empty() {
        errors.push(ValidationError::new("Issuing faction is required."));
    }

    if issuer.is_in_economic_collapse && !allowed_during_collapse(edict) {
        errors.push(ValidationError::new(
            "Faction in economic collapse may only issue trade contracts or cancellation edicts.",
        ));
    }

    match &edict.kind {
        EdictKind::Internal(internal) => validate_internal(edict.section, internal, &mut errors),
        EdictKind::External(external) => validate_external(edict.section, external, &mut errors),
        EdictKind::Military(military) => validate_military(edict.section, military, &mut errors),
    }

    errors
}

fn allowed_during_collapse(edict: &Edict) -> bool {
    edict.is_cancellation
        || matches!(
            &edict.kind,
            EdictKind::External(ExternalEdict {
                external_kind: ExternalKind::TradeContract,
                ..
            })
        )
}

fn validate_internal(section: Section, edict: &InternalEdict, errors: &mut Vec<ValidationError>) {
    if section == Section::Military {
        errors.push(ValidationError::new(
            "Internal edict cannot be in military section.",
        ));
    }

    if edict.name.trim().is_empty() {
        errors.push(ValidationError::new("Internal edict name is required."));
    }

    if edict.execution_count <= 0 {
        errors.push(ValidationError::new(
            "Internal edict execution count must be positive.",
        ));
    }

    if edict.inputs.is_empty() {
        errors.push(ValidationError::new(
            "Internal edict must define at least one input requirement.",
        ));
    }

    if edict.outputs.is_empty() {
        errors.push(ValidationError::new(
            "Internal edict must define at least one output.",
        ));
    }

    let input_amounts = edict.inputs.iter().map(|input| input.amount);
    let output_amounts = edict.outputs.iter().map(|output| output.amount);
    check_positive_amounts(input_amounts, "input", errors);
    check_positive_amounts(output_amounts, "output", errors);
}

fn check_positive_amounts(
    amounts: impl Iterator<Item = i64>,
    label: &str,
    errors: &mut Vec<ValidationError>,
) {
    for amount in amounts {
        if amount <= 0 {
            errors.push(ValidationError::new(format!(
                "Internal edict {} amount must be positive.",
                label
            )));
        }
    }
}

fn validate_external(section: Section, edict: &ExternalEdict, errors: &mut Vec<ValidationError>) {
    if section == Section::Military {
        errors.push(ValidationError::new(
            "External edict cannot be in military section.",
        ));
    }

    if edict.target_faction_id.trim().is_empty() {
        errors.push(ValidationError::new(
            "External edict target faction is required.",
        ));
    }

    if edict.amount < 0 {
        errors.push(ValidationError::new(
            "External edict amount cannot be negative.",
        ));
    }

    if edict.external_kind == ExternalKind::TradeContract {
        if edict.resource.is_none() {
            errors.push(ValidationError::new("Trade contract requires a resource."));
        }

        if edict.amount <= 0 {
            errors.push(ValidationError::new(
                "Trade contract amount must be positive.",
            ));
        }
    }
}

fn validate_military(section: Section, edict: &MilitaryEdict, errors: &mut Vec<ValidationError>) {
    if section != Section::Military {
        errors.push(ValidationError::new(
            "Military edict must be in military section.",
        ));
    }

    let has_target = edict
        .target_settlement_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());

    match edict.operation {
        MilitaryOperation::Attack | MilitaryOperation::Takeover | MilitaryOperation::Liberation => {
            if !has_target {
                errors.push(ValidationError::new(
                    "Military operation requires target settlement.",
                ));
            }
        }
        MilitaryOperation::SupportAttack => {
            let has_supported = edict
                .supported_faction_id
                .as_deref()
                .is_some_and(|id| !id.trim().is_empty());
            if !has_supported {
                errors.push(ValidationError::new(
                    "Support attack requires supported faction.",
                ));
            }
            if !has_target {
                errors.push(ValidationError::new(
                    "Support attack requires target settlement.",
                ));
            }
        }
        MilitaryOperation::EndOccupation => {
            if !has_target {
                errors.push(ValidationError::new(
                    "End occupation requires target settlement.",
                ));
            }
        }
    }

    for (label, requested) in [
        ("army", edict.requested.army),
        ("fleet", edict.requested.fleet),
        ("mages", edict.requested.mages),
    ] {
        if requested < 0 {
            errors.push(ValidationError::new(format!(
                "Requested {} cannot be negative.",
                label
            )));
        }
    }
}
