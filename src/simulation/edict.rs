//! Edicts: the orders a faction submits for one turn.
//!
//! An [`Edict`] carries the fields every order shares and one of three
//! closed [`EdictKind`] shapes. Edicts are ephemeral; they are discarded
//! once the turn is resolved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::world::{ResourceKind, Troops};

/// Orders per faction, keyed by faction id. Each list keeps submission order.
pub type OrderMap = BTreeMap<String, Vec<Edict>>;

/// Resolution stage of an edict. I–III are economic phases run per faction;
/// Military runs once for all factions after every economic phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    I,
    II,
    III,
    Military,
}

impl Section {
    pub fn economic() -> &'static [Section] {
        &[Section::I, Section::II, Section::III]
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Section::I => "I",
            Section::II => "II",
            Section::III => "III",
            Section::Military => "Military",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceUsage {
    /// Debited when the edict executes.
    Consumed,
    /// Must be on hand but is not debited.
    RequiredAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRequirement {
    pub resource: ResourceKind,
    pub amount: i64,
    pub usage: ResourceUsage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub resource: ResourceKind,
    pub amount: i64,
}

/// Domestic production: consume inputs, produce outputs, `execution_count`
/// times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalEdict {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<InputRequirement>,
    #[serde(default)]
    pub outputs: Vec<ResourceAmount>,
    pub execution_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalKind {
    TradeContract,
    DefensivePact,
    Spy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEdict {
    pub external_kind: ExternalKind,
    pub target_faction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceKind>,
    #[serde(default)]
    pub amount: i64,
    /// `true`: the issuer imports from the target. `false`: the issuer exports.
    #[serde(default)]
    pub inbound_to_issuer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MilitaryOperation {
    Attack,
    SupportAttack,
    EndOccupation,
    Takeover,
    Liberation,
}

impl MilitaryOperation {
    /// Operations that lead a coalition in battle.
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            MilitaryOperation::Attack | MilitaryOperation::Takeover | MilitaryOperation::Liberation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilitaryEdict {
    pub operation: MilitaryOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_settlement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_settlement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_faction_id: Option<String>,
    /// Units the issuer wishes to commit; the commitment step may grant fewer.
    #[serde(default)]
    pub requested: Troops,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EdictKind {
    Internal(InternalEdict),
    External(ExternalEdict),
    Military(MilitaryEdict),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edict {
    pub issuing_faction_id: String,
    pub section: Section,
    #[serde(default)]
    pub is_cancellation: bool,
    #[serde(flatten)]
    pub kind: EdictKind,
}

impl Edict {
    pub fn internal(faction_id: impl Into<String>, section: Section, edict: InternalEdict) -> Self {
        Edict {
            issuing_faction_id: faction_id.into(),
            section,
            is_cancellation: false,
            kind: EdictKind::Internal(edict),
        }
    }

    pub fn external(faction_id: impl Into<String>, section: Section, edict: ExternalEdict) -> Self {
        Edict {
            issuing_faction_id: faction_id.into(),
            section,
            is_cancellation: false,
            kind: EdictKind::External(edict),
        }
    }

    pub fn military(faction_id: impl Into<String>, edict: MilitaryEdict) -> Self {
        Edict {
            issuing_faction_id: faction_id.into(),
            section: Section::Military,
            is_cancellation: false,
            kind: EdictKind::Military(edict),
        }
    }

    pub fn cancelled(mut self) -> Self {
        self.is_cancellation = true;
        self
    }

    /// Short label for audit-log lines.
    pub fn describe(&self) -> String {
        match &self.kind {
            EdictKind::Internal(e) => format!("internal edict '{}'", e.name),
            EdictKind::External(e) => {
                format!("{:?} edict towards {}", e.external_kind, e.target_faction_id)
            }
            EdictKind::Military(e) => format!(
                "{:?} on {}",
                e.operation,
                e.target_settlement_id.as_deref().unwrap_or("<none>")
            ),
        }
    }
}
