//! Data model for the lobby mirror.
//!
//! Every type here produces the same JSON the game client emits: `camelCase`
//! field names, numeric slot status codes, lowercase region codes. The
//! exception is `suggested_players`, which the client itself ships in
//! snake_case and is kept as-is.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LobbyError;

/// Maximum number of seats in a lobby; slot indices are `0..MAX_SLOTS`.
pub const MAX_SLOTS: usize = 24;

// ── Enums ───────────────────────────────────────────────────────────

/// Game regions recognized by the synchronizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us,
    Eu,
    Usw,
    Kr,
}

impl Region {
    /// Lowercase wire form of the region code.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Usw => "usw",
            Region::Kr => "kr",
        }
    }
}

impl FromStr for Region {
    type Err = LobbyError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "usw" => Ok(Region::Usw),
            "kr" => Ok(Region::Kr),
            other => Err(LobbyError::InvalidRegion(other.to_string())),
        }
    }
}

/// Occupancy state of a slot, serialized as its numeric wire code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum SlotStatus {
    Open,
    Closed,
    Filled,
}

impl TryFrom<u8> for SlotStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SlotStatus::Open),
            1 => Ok(SlotStatus::Closed),
            2 => Ok(SlotStatus::Filled),
            other => Err(format!("unknown slot status code: {other}")),
        }
    }
}

impl From<SlotStatus> for u8 {
    fn from(status: SlotStatus) -> Self {
        match status {
            SlotStatus::Open => 0,
            SlotStatus::Closed => 1,
            SlotStatus::Filled => 2,
        }
    }
}

/// Classification of a team, computed once at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TeamType {
    /// Teams containing actual competing players.
    PlayerTeams,
    /// Observer / referee / host teams.
    SpecTeams,
    /// Computer, creep or otherwise immovable teams.
    OtherTeams,
}

// ── Slots ───────────────────────────────────────────────────────────

/// One of the 24 fixed seats of a lobby, as reported by the game client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotPayload {
    pub slot_status: SlotStatus,
    pub slot: u8,
    pub team: u8,
    /// 0 = usable, 1 = managed by the map script.
    pub slot_type: u8,
    pub is_observer: bool,
    pub is_self: bool,
    pub slot_type_change_enabled: bool,
    pub id: u8,
    #[serde(default)]
    pub name: String,
    /// Region the occupant connected from; empty for open, closed and AI
    /// slots.
    #[serde(default)]
    pub player_region: String,
    pub player_gateway: i32,
    pub color: u8,
    pub color_change_enabled: bool,
    pub team_change_enabled: bool,
    pub race: u8,
    pub race_change_enabled: bool,
    pub handicap: u8,
    pub handicap_change_enabled: bool,
}

impl SlotPayload {
    /// Whether this slot is bound to a player identity.
    ///
    /// Open, closed and AI slots carry no region and are not identity-bound;
    /// the local client's own slot counts even before a region is reported.
    pub fn is_identity_bound(&self) -> bool {
        !self.player_region.is_empty() || self.is_self
    }
}

// ── Static lobby metadata ───────────────────────────────────────────

/// Map metadata as reported by the game client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub map_size: String,
    pub map_speed: String,
    pub map_name: String,
    pub map_path: String,
    pub map_author: String,
    pub description: String,
    #[serde(rename = "suggested_players")]
    pub suggested_players: String,
}

/// Map option flags and observer/visibility settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapFlags {
    pub flag_lock_teams: bool,
    pub flag_place_teams_together: bool,
    pub flag_full_shared_unit_control: bool,
    pub flag_random_races: bool,
    pub flag_random_hero: bool,
    pub setting_observers: String,
    pub type_observers: u8,
    pub setting_visibility: String,
    pub type_visibility: u8,
}

/// Lobby metadata that never changes after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStatic {
    pub is_host: bool,
    pub player_host: String,
    pub max_teams: u8,
    pub is_custom_forces: bool,
    pub is_custom_players: bool,
    pub map_data: MapData,
    pub lobby_name: String,
    pub map_flags: MapFlags,
}

// ── First-contact payload ───────────────────────────────────────────

/// Per-team summary inside the first-contact payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub name: String,
    pub team: u8,
    pub filled_slots: u8,
    pub total_slots: u8,
}

/// Team composition block of the first-contact payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamData {
    pub teams: Vec<TeamSummary>,
    pub playable_slots: u8,
    pub filled_playable_slots: u8,
    pub observer_slots_remaining: u8,
}

/// The full payload the game client sends on first contact with a lobby.
///
/// Transient fields the client attaches (`availableTeamColors`,
/// `availableColors`) are dropped on deserialization; what remains after
/// removing `teamData` and `players` is the static metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameClientLobbyPayload {
    #[serde(flatten)]
    pub lobby_static: LobbyStatic,
    pub team_data: TeamData,
    pub players: Vec<SlotPayload>,
}

// ── Derived and tracked state ───────────────────────────────────────

/// Classification and display name of one team, immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamInfo {
    #[serde(rename = "type")]
    pub kind: TeamType,
    pub name: String,
}

/// One chat line with its arrival time in Unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub name: String,
    pub message: String,
    pub time: u64,
}

/// Historical stats attached to a player record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub last_change: f64,
    #[serde(default)]
    pub rank: u32,
}

/// Per-player bookkeeping, kept for exactly the names currently bound to a
/// slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Unix milliseconds at which the name first appeared in the lobby.
    pub joined_at: u64,
    #[serde(default)]
    pub cleared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<PlayerStats>,
}

impl PlayerRecord {
    /// A fresh record for a player first seen at `joined_at`.
    pub fn new(joined_at: u64) -> Self {
        Self {
            joined_at,
            cleared: false,
            extra: None,
        }
    }
}

/// The exportable aggregate of everything a [`LobbyMirror`](crate::LobbyMirror)
/// tracks. Produced by `export_snapshot` and accepted back by
/// snapshot-based construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub lobby_static: LobbyStatic,
    pub region: Region,
    pub slots: BTreeMap<u8, SlotPayload>,
    pub team_list_lookup: BTreeMap<u8, TeamInfo>,
    pub chat_messages: Vec<ChatMessage>,
    pub player_data: BTreeMap<String, PlayerRecord>,
    /// Whether stats lookups are known to work for this map. Absent on older
    /// exports, in which case it is recomputed from the map name on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_available: Option<bool>,
}

/// One row of `export_team_structure`: a seat as seen by roster consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamSlotView {
    /// Player name for filled seats, `"OPEN"` / `"CLOSED"` otherwise.
    pub name: String,
    pub slot_status: SlotStatus,
    /// Slot index the occupant resolves to, if any.
    pub slot: Option<u8>,
    /// Whether the seat is occupied by a real (region-bound) player.
    pub real_player: bool,
    /// Tracked record for the occupant; `None` when no record applies
    /// (open, closed and AI seats).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PlayerRecord>,
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

    #[test]
    fn region_parses_all_recognized_codes() {
        for code in ["us", "eu", "usw", "kr"] {
            let region: Region = code.parse().unwrap();
            assert_eq!(region.as_str(), code);
        }
        assert!(matches!(
            "na".parse::<Region>(),
            Err(LobbyError::InvalidRegion(code)) if code == "na"
        ));
    }

    #[test]
    fn slot_status_round_trips_through_numeric_codes() {
        let json = serde_json::to_string(&SlotStatus::Filled).unwrap();
        assert_eq!(json, "2");
        let status: SlotStatus = serde_json::from_str("0").unwrap();
        assert_eq!(status, SlotStatus::Open);
        assert!(serde_json::from_str::<SlotStatus>("3").is_err());
    }

    #[test]
    fn team_type_uses_camel_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&TeamType::PlayerTeams).unwrap(),
            "\"playerTeams\""
        );
        assert_eq!(
            serde_json::to_string(&TeamType::SpecTeams).unwrap(),
            "\"specTeams\""
        );
    }

    #[test]
    fn identity_binding_covers_region_and_self() {
        let mut slot = SlotPayload {
            slot_status: SlotStatus::Open,
            slot: 0,
            team: 0,
            slot_type: 0,
            is_observer: false,
            is_self: false,
            slot_type_change_enabled: true,
            id: 255,
            name: String::new(),
            player_region: String::new(),
            player_gateway: 10,
            color: 0,
            color_change_enabled: true,
            team_change_enabled: true,
            race: 0,
            race_change_enabled: true,
            handicap: 100,
            handicap_change_enabled: true,
        };
        assert!(!slot.is_identity_bound());
        slot.player_region = "eu".into();
        assert!(slot.is_identity_bound());
        slot.player_region.clear();
        slot.is_self = true;
        assert!(slot.is_identity_bound());
    }

    #[test]
    fn suggested_players_keeps_its_snake_case_wire_name() {
        let map_data = MapData {
            map_size: "Extra Small".into(),
            map_speed: "Fast".into(),
            map_name: "Legion TD 10.2d".into(),
            map_path: "maps/download/legiontd.w3x".into(),
            map_author: "AutoAttack".into(),
            description: "Defend with legions".into(),
            suggested_players: "4v4".into(),
        };
        let json = serde_json::to_value(&map_data).unwrap();
        assert!(json.get("suggested_players").is_some());
        assert!(json.get("suggestedPlayers").is_none());
    }
}
