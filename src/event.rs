//! Update and event vocabulary shared between the synchronizer and its
//! consumers.
//!
//! [`LobbyUpdate`] is one tagged union for both directions: callers feed the
//! consumed variants into [`LobbyMirror::ingest_update`](crate::LobbyMirror::ingest_update)
//! and receive the produced variants back as the ordered event list. It
//! serializes externally tagged (`{"playerJoined": {...}}`), matching the
//! shape downstream consumers already speak.

use serde::{Deserialize, Serialize};

use crate::protocol::{LobbySnapshot, PlayerRecord, PlayerStats, SlotPayload};

/// An incoming chat line. The arrival time is assigned by the mirror on
/// acceptance, not by the sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatUpdate {
    pub name: String,
    pub message: String,
}

/// Out-of-band patch to one player's tracked record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDataPatch {
    pub name: String,
    /// Scalar record fields to merge (`joinedAt`, `cleared`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PlayerRecord>,
    /// Stats block; replaces the record's stats wholesale when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<PlayerStats>,
}

/// The tagged update/event vocabulary.
///
/// The first three variants are consumed by the ingestion engine. The
/// `player*` variants are what it produces. The remaining variants are
/// reserved for other layers (transport, lifecycle management): this engine
/// never produces them and passes them through unchanged when asked to
/// ingest one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum LobbyUpdate {
    // ── Consumed ────────────────────────────────────────────────────
    /// A chat line arrived from the game client.
    ChatMessage(ChatUpdate),
    /// A batch of slot payloads, optionally carrying a stats patch for one
    /// of the players involved.
    #[serde(rename_all = "camelCase")]
    PlayerPayload {
        payloads: Vec<SlotPayload>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_data: Option<PlayerDataPatch>,
    },
    /// Out-of-band player record patch; echoed back as an event when it
    /// changes state.
    PlayerData(PlayerDataPatch),

    // ── Produced ────────────────────────────────────────────────────
    /// A name not previously present became bound to a slot.
    PlayerJoined(SlotPayload),
    /// A previously tracked name is no longer bound to any slot.
    PlayerLeft(String),
    /// A known player changed seats into an unoccupied slot.
    #[serde(rename_all = "camelCase")]
    PlayerMoved {
        /// Previous slot of the player, when it could be resolved.
        from: Option<u8>,
        to: u8,
        name: String,
    },
    /// Two known players exchanged seats. Emitted at most once per batch.
    PlayersSwapped {
        players: [String; 2],
        slots: [u8; 2],
    },

    // ── Reserved for other layers ───────────────────────────────────
    LobbyReady,
    LeftLobby,
    Stale,
    SlotOpened(u8),
    SlotClosed(u8),
    NewLobby(Box<LobbySnapshot>),
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
    fn player_left_serializes_externally_tagged() {
        let event = LobbyUpdate::PlayerLeft("Trenchguns#1800".into());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "playerLeft": "Trenchguns#1800" })
        );
    }

    #[test]
    fn players_swapped_carries_paired_slots_and_names() {
        let event = LobbyUpdate::PlayersSwapped {
            players: ["Bar#5678".into(), "Foo#1234".into()],
            slots: [2, 5],
        };
        let round_tripped: LobbyUpdate =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(round_tripped, event);
    }

    #[test]
    fn player_data_patch_omits_absent_blocks() {
        let patch = PlayerDataPatch {
            name: "Foo#1234".into(),
            data: None,
            extra_data: None,
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Foo#1234" }));
    }

    #[test]
    fn chat_update_deserializes_from_client_shape() {
        let update: LobbyUpdate = serde_json::from_str(
            r#"{ "chatMessage": { "name": "Foo#1234", "message": "gl hf" } }"#,
        )
        .unwrap();
        assert!(matches!(
            update,
            LobbyUpdate::ChatMessage(ChatUpdate { ref message, .. }) if message == "gl hf"
        ));
    }
}
