//! Team classification heuristics.
//!
//! Teams are classified exactly once, at construction time, from their
//! member slots and the local client's host status. Later slot changes do
//! not reclassify (see the field docs on
//! [`LobbyMirror`](crate::LobbyMirror)).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::protocol::{SlotPayload, SlotStatus, TeamType};

// Patterns are string literals; compilation cannot fail at runtime.
#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("pattern literal compiles")
}

static COMPUTER_TEAM_NAME: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)(computer|creeps|summoned)"));

static SPECTATOR_TEAM_NAME: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)(host|spectator|observer|referee)"));

/// Classify one team from its name, the local client's host status and its
/// member slots.
///
/// Observer members dominate everything. Hosts can see slot edit
/// permissions, so a team where nothing is movable and no seat is ours is
/// map-managed; non-hosts fall back to the composition test (every seat
/// filled but none bound to a player identity). Everything else is decided
/// by the name heuristic.
pub fn classify(team_name: &str, is_host: bool, members: &[&SlotPayload]) -> TeamType {
    if members.iter().any(|member| member.is_observer) {
        return TeamType::SpecTeams;
    }
    if is_host {
        if !members
            .iter()
            .any(|member| member.slot_type_change_enabled || member.is_self)
        {
            return TeamType::OtherTeams;
        }
    } else if members.iter().all(|member| {
        member.slot_status == SlotStatus::Filled && member.player_region.is_empty()
    }) {
        return TeamType::OtherTeams;
    }
    team_type_from_name(team_name)
}

/// Name-only heuristic: computer/creep names are managed teams, spectator
/// names are observer teams, anything else (including the empty name) is a
/// player team.
pub fn team_type_from_name(team_name: &str) -> TeamType {
    if COMPUTER_TEAM_NAME.is_match(team_name) {
        TeamType::OtherTeams
    } else if SPECTATOR_TEAM_NAME.is_match(team_name) {
        TeamType::SpecTeams
    } else {
        TeamType::PlayerTeams
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn slot(status: SlotStatus, region: &str) -> SlotPayload {
        SlotPayload {
            slot_status: status,
            slot: 0,
            team: 0,
            slot_type: 0,
            is_observer: false,
            is_self: false,
            slot_type_change_enabled: false,
            id: 255,
            name: String::new(),
            player_region: region.to_string(),
            player_gateway: 10,
            color: 0,
            color_change_enabled: false,
            team_change_enabled: false,
            race: 0,
            race_change_enabled: false,
            handicap: 100,
            handicap_change_enabled: false,
        }
    }

    #[test]
    fn observer_member_forces_spec_team() {
        let mut member = slot(SlotStatus::Filled, "us");
        member.is_observer = true;
        assert_eq!(
            classify("Team 1", true, &[&member]),
            TeamType::SpecTeams
        );
    }

    #[test]
    fn host_with_no_movable_member_sees_other_team() {
        let ai = slot(SlotStatus::Filled, "");
        assert_eq!(classify("Team 2", true, &[&ai, &ai]), TeamType::OtherTeams);
    }

    #[test]
    fn host_with_self_member_falls_through_to_name() {
        let mut own = slot(SlotStatus::Filled, "");
        own.is_self = true;
        assert_eq!(classify("Team 2", true, &[&own]), TeamType::PlayerTeams);
    }

    #[test]
    fn non_host_all_filled_unbound_is_other_team() {
        let ai = slot(SlotStatus::Filled, "");
        assert_eq!(
            classify("Team 3", false, &[&ai, &ai]),
            TeamType::OtherTeams
        );
    }

    #[test]
    fn non_host_with_open_seat_falls_through_to_name() {
        let ai = slot(SlotStatus::Filled, "");
        let open = slot(SlotStatus::Open, "");
        assert_eq!(
            classify("Team 3", false, &[&ai, &open]),
            TeamType::PlayerTeams
        );
    }

    #[test]
    fn name_heuristic_matches_the_known_words() {
        assert_eq!(team_type_from_name("Computer"), TeamType::OtherTeams);
        assert_eq!(team_type_from_name("Creeps and Neutrals"), TeamType::OtherTeams);
        assert_eq!(team_type_from_name("Referees"), TeamType::SpecTeams);
        assert_eq!(team_type_from_name("The Observers"), TeamType::SpecTeams);
        assert_eq!(team_type_from_name("Team 1"), TeamType::PlayerTeams);
        assert_eq!(team_type_from_name(""), TeamType::PlayerTeams);
    }
}
