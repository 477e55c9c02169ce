//! # Lobby Mirror
//!
//! Client-side mirror of a remote multiplayer game lobby that turns raw
//! state payloads into a stream of typed domain events.
//!
//! A [`LobbyMirror`] is bootstrapped from either a first-contact game-client
//! payload or a previously exported [`LobbySnapshot`], then fed every
//! subsequent payload through [`LobbyMirror::ingest_update`]. The mirror
//! keeps slots, team classification, chat log and per-player records
//! consistent and classifies structural changes into discrete
//! [`LobbyUpdate`] events — a player joined, two players swapped seats, a
//! player left, a chat message arrived, a player's historical stats changed
//! — so consumers (bots, overlays, matchmaking services) subscribe to
//! events instead of diffing payloads themselves.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let mut mirror = LobbyMirror::from_payload("us", first_contact_payload)?;
//!
//! let outcome = mirror.update_lobby_slots(&slot_batch);
//! for event in outcome.result.events {
//!     match event {
//!         LobbyUpdate::PlayerJoined(slot) => greet(&slot.name),
//!         LobbyUpdate::PlayerLeft(name) => farewell(&name),
//!         _ => {}
//!     }
//! }
//! ```
//!
//! The mirror is synchronous and single-threaded; see the [`lobby`] module
//! docs for the serialization discipline expected of concurrent embedders.

pub mod error;
pub mod event;
pub mod lobby;
pub mod map_name;
pub mod protocol;
pub mod schema;
pub mod team;

// Re-export primary types for ergonomic imports.
pub use error::{LobbyError, Result};
pub use event::{ChatUpdate, LobbyUpdate, PlayerDataPatch};
pub use lobby::{IngestResult, LobbyBootstrap, LobbyMirror, SlotBatchOutcome};
pub use protocol::{
    ChatMessage, GameClientLobbyPayload, LobbySnapshot, LobbyStatic, PlayerRecord, PlayerStats,
    Region, SlotPayload, SlotStatus, TeamInfo, TeamSlotView, TeamType,
};
