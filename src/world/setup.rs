use crate::config::roster::Roster;
use crate::world::{FactionState, SettlementState, WorldState};

/// Build the turn-zero world described by a roster.
///
/// Factions start with their roster stockpiles and units, settlements are
/// owned by their listed owner with the base garrison, and collapse flags are
/// computed from the starting resources.
pub fn setup_world(roster: &Roster) -> WorldState {
    let factions = roster
        .factions
        .iter()
        .map(|entry| FactionState {
            overlord_faction_id: entry.overlord.clone(),
            resources: entry.starting_resources.clone(),
            units: entry.starting_units.clone(),
            ..FactionState::new(entry.id.clone())
        })
        .collect();

    let settlements = roster
        .settlements
        .iter()
        .map(|entry| SettlementState {
            settlement_id: entry.id.clone(),
            owner_faction_id: entry.owner.clone(),
            occupying_faction_id: None,
            garrison_strength: entry.base_garrison_strength,
        })
        .collect();

    let mut world = WorldState {
        factions,
        settlements,
        ..WorldState::default()
    };
    world.refresh_collapse_flags();
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::roster::SettlementEntry;
    use crate::world::{ResourceKind, SCHEMA_VERSION};

    #[test]
    fn builtin_roster_world_flags_starting_debt() {
        let world = setup_world(&Roster::builtin());
        assert_eq!(world.schema_version, SCHEMA_VERSION);
        assert_eq!(world.turn_number, 0);
        assert_eq!(world.factions.len(), 15);

        let aelthuun = world.faction("aelthuun").unwrap();
        assert!(aelthuun.is_in_economic_collapse);
        assert_eq!(aelthuun.resource(ResourceKind::Scholars), -1);

        let shoal = world.faction("shoal").unwrap();
        assert!(!shoal.is_in_economic_collapse);
        assert_eq!(shoal.resource(ResourceKind::Conscripts), 7);
        assert_eq!(shoal.applied_settlement_gold_bonus, 0);
    }

    #[test]
    fn settlements_start_owned_with_base_garrison() {
        let mut roster = Roster::builtin();
        roster.settlements.push(SettlementEntry {
            id: "citadel".to_string(),
            name: "Citadel".to_string(),
            resource_focuses: vec![ResourceKind::Iron],
            base_garrison_strength: 6,
            owner: "ordo-solis".to_string(),
        });

        let world = setup_world(&roster);
        let citadel = world.settlement("citadel").unwrap();
        assert_eq!(citadel.owner_faction_id, "ordo-solis");
        assert_eq!(citadel.garrison_strength, 6);
        assert!(!citadel.is_occupied());
    }

    #[test]
    fn setup_is_deterministic() {
        let roster = Roster::builtin();
        assert_eq!(setup_world(&roster), setup_world(&roster));
    }
}
