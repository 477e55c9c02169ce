#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Shared test fixtures for lobby-mirror integration tests.
//!
//! Provides builders for schema-valid slot payloads and first-contact
//! lobby payloads, so individual tests only spell out what they vary.

use lobby_mirror::protocol::{
    GameClientLobbyPayload, LobbyStatic, MapData, MapFlags, SlotPayload, SlotStatus, TeamData,
    TeamSummary,
};

/// Battle tag of the local client in every fixture lobby.
pub const SELF_NAME: &str = "Trenchguns#1800";

// ── Slot builders ───────────────────────────────────────────────────

/// An open, unbound seat.
pub fn open_slot(index: u8, team: u8) -> SlotPayload {
    SlotPayload {
        slot_status: SlotStatus::Open,
        slot: index,
        team,
        slot_type: 0,
        is_observer: false,
        is_self: false,
        slot_type_change_enabled: false,
        id: 255,
        name: String::new(),
        player_region: String::new(),
        player_gateway: 10,
        color: index,
        color_change_enabled: false,
        team_change_enabled: false,
        race: 0,
        race_change_enabled: false,
        handicap: 100,
        handicap_change_enabled: false,
    }
}

/// A closed seat.
pub fn closed_slot(index: u8, team: u8) -> SlotPayload {
    SlotPayload {
        slot_status: SlotStatus::Closed,
        ..open_slot(index, team)
    }
}

/// A seat filled by a real (region-bound) player.
pub fn filled_slot(index: u8, team: u8, name: &str, region: &str) -> SlotPayload {
    SlotPayload {
        slot_status: SlotStatus::Filled,
        name: name.to_string(),
        player_region: region.to_string(),
        slot_type_change_enabled: true,
        color_change_enabled: true,
        team_change_enabled: true,
        race_change_enabled: true,
        handicap_change_enabled: true,
        ..open_slot(index, team)
    }
}

/// The local client's own seat.
pub fn self_slot(index: u8, team: u8) -> SlotPayload {
    SlotPayload {
        is_self: true,
        ..filled_slot(index, team, SELF_NAME, "us")
    }
}

/// A map-managed AI seat (filled, no region, not movable).
pub fn ai_slot(index: u8, team: u8, name: &str) -> SlotPayload {
    SlotPayload {
        slot_status: SlotStatus::Filled,
        name: name.to_string(),
        ..open_slot(index, team)
    }
}

// ── Payload builders ────────────────────────────────────────────────

/// A first-contact payload with the given teams and players, as a non-host
/// client.
pub fn lobby_payload(teams: &[(u8, &str)], players: Vec<SlotPayload>) -> GameClientLobbyPayload {
    lobby_payload_host(teams, players, false)
}

/// Like [`lobby_payload`], with explicit host status.
pub fn lobby_payload_host(
    teams: &[(u8, &str)],
    players: Vec<SlotPayload>,
    is_host: bool,
) -> GameClientLobbyPayload {
    let filled = players
        .iter()
        .filter(|slot| slot.slot_status == SlotStatus::Filled)
        .count() as u8;
    let summaries = teams
        .iter()
        .map(|(team, name)| {
            let members = players.iter().filter(|slot| slot.team == *team).count() as u8;
            TeamSummary {
                name: (*name).to_string(),
                team: *team,
                filled_slots: players
                    .iter()
                    .filter(|slot| {
                        slot.team == *team && slot.slot_status == SlotStatus::Filled
                    })
                    .count() as u8,
                total_slots: members.max(1),
            }
        })
        .collect();
    GameClientLobbyPayload {
        lobby_static: LobbyStatic {
            is_host,
            player_host: SELF_NAME.to_string(),
            max_teams: teams.len().max(1) as u8,
            is_custom_forces: false,
            is_custom_players: false,
            map_data: MapData {
                map_size: "Extra Small".into(),
                map_speed: "Fast".into(),
                map_name: "Legion TD 10.2d".into(),
                map_path: "maps/download/legiontd.w3x".into(),
                map_author: "AutoAttack".into(),
                description: "Defend against waves with your legion".into(),
                suggested_players: "4v4".into(),
            },
            lobby_name: "legion td all welcome".into(),
            map_flags: MapFlags {
                flag_lock_teams: true,
                flag_place_teams_together: true,
                flag_full_shared_unit_control: false,
                flag_random_races: false,
                flag_random_hero: false,
                setting_observers: "No Observers".into(),
                type_observers: 0,
                setting_visibility: "Default".into(),
                type_visibility: 0,
            },
        },
        team_data: TeamData {
            teams: summaries,
            playable_slots: players.len() as u8,
            filled_playable_slots: filled.max(1),
            observer_slots_remaining: 0,
        },
        players,
    }
}

/// The standard fixture lobby: one player team with "Foo#1234" in slot 0,
/// the local client in slot 3, and open seats 1, 2, 4 and 5.
pub fn base_payload() -> GameClientLobbyPayload {
    lobby_payload(
        &[(0, "Team 1")],
        vec![
            filled_slot(0, 0, "Foo#1234", "us"),
            open_slot(1, 0),
            open_slot(2, 0),
            self_slot(3, 0),
            open_slot(4, 0),
            open_slot(5, 0),
        ],
    )
}
