//! Incremental lobby state synchronizer.
//!
//! [`LobbyMirror`] maintains an authoritative-enough copy of a remote
//! lobby's state from the partial and full payloads a game client emits,
//! and classifies structural changes into discrete [`LobbyUpdate`] events
//! (joined, left, moved, swapped, chat, stats changed) so consumers never
//! diff raw payloads themselves.
//!
//! The mirror is single-threaded and synchronous: every operation runs to
//! completion, and `&mut self` on the mutating entry points enforces the
//! one-update-stream-per-instance discipline at the type level. Embedders
//! with concurrent sources must serialize mutating calls (e.g. one update
//! queue per lobby); read-only queries may run freely in between.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, error, warn};

use crate::error::{LobbyError, Result};
use crate::event::{LobbyUpdate, PlayerDataPatch};
use crate::map_name;
use crate::protocol::{
    ChatMessage, GameClientLobbyPayload, LobbySnapshot, LobbyStatic, PlayerRecord, Region,
    SlotPayload, SlotStatus, TeamInfo, TeamSlotView, TeamType, MAX_SLOTS,
};
use crate::schema::{
    self, prefix_violations, Violation, CHAT_MESSAGE_SCHEMA, LOBBY_PAYLOAD_SCHEMA,
    LOBBY_STATIC_SCHEMA, PLAYER_RECORD_SCHEMA, PLAYER_STATS_SCHEMA, SLOT_PAYLOAD_SCHEMA,
    TEAM_INFO_SCHEMA,
};
use crate::team;

/// Two chat messages with identical content within this window are
/// considered duplicates, regardless of sender.
const CHAT_DEDUPE_WINDOW_MS: u64 = 1000;

/// Current time in Unix milliseconds. A clock before the epoch reads as 0.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

// ── Bootstrap input ─────────────────────────────────────────────────

/// Construction input for [`LobbyMirror::new`].
///
/// Exactly one of `payload` (first contact with a live client) or
/// `full_data` (a previously exported snapshot) must be supplied;
/// anything else fails with [`LobbyError::MissingInput`].
///
/// # Example
///
/// ```rust,ignore
/// let mirror = LobbyMirror::new(
///     LobbyBootstrap::from_payload("us", payload).with_stats_available(true),
/// )?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct LobbyBootstrap {
    /// Region code of the client session (`"us"`, `"eu"`, `"usw"`, `"kr"`).
    /// Required with `payload`; ignored with `full_data`, which carries its
    /// own region.
    pub region: Option<String>,
    /// First-contact client payload.
    pub payload: Option<GameClientLobbyPayload>,
    /// Previously exported snapshot.
    pub full_data: Option<LobbySnapshot>,
    /// Force the stats-available flag instead of deriving it from the map
    /// name (or the snapshot).
    pub stats_available_override: Option<bool>,
}

impl LobbyBootstrap {
    /// Bootstrap from a first-contact client payload.
    pub fn from_payload(region: impl Into<String>, payload: GameClientLobbyPayload) -> Self {
        Self {
            region: Some(region.into()),
            payload: Some(payload),
            ..Default::default()
        }
    }

    /// Bootstrap from a previously exported snapshot.
    pub fn from_snapshot(snapshot: LobbySnapshot) -> Self {
        Self {
            full_data: Some(snapshot),
            ..Default::default()
        }
    }

    /// Force the stats-available flag.
    #[must_use]
    pub fn with_stats_available(mut self, stats_available: bool) -> Self {
        self.stats_available_override = Some(stats_available);
        self
    }
}

// ── Results ─────────────────────────────────────────────────────────

/// Outcome of one [`LobbyMirror::ingest_update`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestResult {
    /// Whether any tracked state changed.
    pub is_updated: bool,
    /// Ordered events classified from the update.
    pub events: Vec<LobbyUpdate>,
}

/// Outcome of [`LobbyMirror::update_lobby_slots`]: the payloads that
/// survived the pre-filter and the ingestion result they produced.
#[derive(Debug, Clone, Default)]
pub struct SlotBatchOutcome {
    pub player_updates: Vec<SlotPayload>,
    pub result: IngestResult,
}

// ── The mirror ──────────────────────────────────────────────────────

/// Client-side mirror of one remote lobby.
///
/// Construct with [`LobbyMirror::new`] (or the [`from_payload`](LobbyMirror::from_payload)
/// / [`from_snapshot`](LobbyMirror::from_snapshot) shortcuts), then drive it
/// with [`ingest_update`](LobbyMirror::ingest_update) or
/// [`update_lobby_slots`](LobbyMirror::update_lobby_slots) for every
/// subsequent client payload.
#[derive(Debug, Clone)]
pub struct LobbyMirror {
    region: Region,
    lobby_static: LobbyStatic,
    slots: BTreeMap<u8, SlotPayload>,
    /// Computed once at construction from the first-contact payload and
    /// never refreshed: host-side team edits mid-lobby will not reclassify.
    team_list_lookup: BTreeMap<u8, TeamInfo>,
    chat_messages: Vec<ChatMessage>,
    player_data: BTreeMap<String, PlayerRecord>,
    all_players: Vec<String>,
    non_spec_players: Vec<String>,
    lookup_name: String,
    stats_available: bool,
}

impl LobbyMirror {
    /// Build a mirror from a [`LobbyBootstrap`].
    ///
    /// # Errors
    ///
    /// All-or-nothing: any validation failure aborts construction with the
    /// matching [`LobbyError`] and nothing is partially built.
    pub fn new(bootstrap: LobbyBootstrap) -> Result<Self> {
        if let Some(payload) = bootstrap.payload {
            let region = bootstrap.region.unwrap_or_default().parse::<Region>()?;
            Self::from_client_payload(region, payload, bootstrap.stats_available_override)
        } else if let Some(snapshot) = bootstrap.full_data {
            Self::from_exported(snapshot, bootstrap.stats_available_override)
        } else {
            Err(LobbyError::MissingInput)
        }
    }

    /// Shortcut for payload-based construction.
    pub fn from_payload(region: &str, payload: GameClientLobbyPayload) -> Result<Self> {
        Self::new(LobbyBootstrap::from_payload(region, payload))
    }

    /// Shortcut for snapshot-based construction.
    pub fn from_snapshot(snapshot: LobbySnapshot) -> Result<Self> {
        Self::new(LobbyBootstrap::from_snapshot(snapshot))
    }

    fn from_client_payload(
        region: Region,
        payload: GameClientLobbyPayload,
        stats_override: Option<bool>,
    ) -> Result<Self> {
        let violations = schema::check(&LOBBY_PAYLOAD_SCHEMA, &payload);
        for violation in &violations {
            error!(%violation, "lobby payload rejected");
        }
        if let Some(first) = violations.into_iter().next() {
            return Err(LobbyError::InvalidPayload {
                path: first.path,
                message: first.message,
            });
        }
        if !payload.players.iter().any(|slot| slot.is_self) {
            return Err(LobbyError::NotSelfPresent);
        }

        let mut team_list_lookup = BTreeMap::new();
        for summary in &payload.team_data.teams {
            let members: Vec<&SlotPayload> = payload
                .players
                .iter()
                .filter(|slot| slot.team == summary.team)
                .collect();
            let kind = team::classify(&summary.name, payload.lobby_static.is_host, &members);
            team_list_lookup.insert(
                summary.team,
                TeamInfo {
                    kind,
                    name: summary.name.clone(),
                },
            );
        }

        let joined_at = now_ms();
        let mut slots = BTreeMap::new();
        let mut player_data = BTreeMap::new();
        for slot in payload.players {
            if slot.is_identity_bound() {
                player_data.insert(slot.name.clone(), PlayerRecord::new(joined_at));
            }
            slots.insert(slot.slot, slot);
        }

        Ok(Self::assemble(
            region,
            payload.lobby_static,
            slots,
            team_list_lookup,
            Vec::new(),
            player_data,
            stats_override,
            None,
        ))
    }

    fn from_exported(snapshot: LobbySnapshot, stats_override: Option<bool>) -> Result<Self> {
        let mut violations = Vec::new();
        if snapshot.slots.len() > MAX_SLOTS {
            violations.push(Violation {
                path: "slots".into(),
                message: format!("more than {MAX_SLOTS} slots"),
            });
        }
        violations.extend(schema::check(&LOBBY_STATIC_SCHEMA, &snapshot.lobby_static));
        for (index, slot) in &snapshot.slots {
            if usize::from(*index) >= MAX_SLOTS {
                violations.push(Violation {
                    path: format!("slots.{index}"),
                    message: "slot index out of range".into(),
                });
            }
            violations.extend(prefix_violations(
                &format!("slots.{index}"),
                schema::check(&SLOT_PAYLOAD_SCHEMA, slot),
            ));
        }
        for (index, message) in snapshot.chat_messages.iter().enumerate() {
            violations.extend(prefix_violations(
                &format!("chatMessages.{index}"),
                schema::check(&CHAT_MESSAGE_SCHEMA, message),
            ));
        }
        for (index, info) in &snapshot.team_list_lookup {
            if usize::from(*index) > MAX_SLOTS {
                violations.push(Violation {
                    path: format!("teamListLookup.{index}"),
                    message: "team index out of range".into(),
                });
            }
            violations.extend(prefix_violations(
                &format!("teamListLookup.{index}"),
                schema::check(&TEAM_INFO_SCHEMA, info),
            ));
        }
        for (name, record) in &snapshot.player_data {
            if name.chars().count() > 32 {
                violations.push(Violation {
                    path: format!("playerData.{name}"),
                    message: "player name too long".into(),
                });
            }
            violations.extend(prefix_violations(
                &format!("playerData.{name}"),
                schema::check(&PLAYER_RECORD_SCHEMA, record),
            ));
        }
        if !violations.is_empty() {
            for violation in &violations {
                error!(%violation, "snapshot rejected");
            }
            return Err(LobbyError::InvalidSnapshot { violations });
        }

        let mut mirror = Self::assemble(
            snapshot.region,
            snapshot.lobby_static,
            snapshot.slots,
            snapshot.team_list_lookup,
            snapshot.chat_messages,
            snapshot.player_data,
            stats_override,
            snapshot.stats_available,
        );
        // Replay the adopted slots through the ingestion engine once to
        // rebuild the rosters and reconcile drift; the replay's events are
        // discarded.
        let payloads: Vec<SlotPayload> = mirror.slots.values().cloned().collect();
        let _ = mirror.ingest_update(LobbyUpdate::PlayerPayload {
            payloads,
            player_data: None,
        });
        Ok(mirror)
    }

    /// Shared tail of both construction paths: map path/name normalization,
    /// stats-available precedence, roster computation.
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        region: Region,
        mut lobby_static: LobbyStatic,
        slots: BTreeMap<u8, SlotPayload>,
        team_list_lookup: BTreeMap<u8, TeamInfo>,
        chat_messages: Vec<ChatMessage>,
        player_data: BTreeMap<String, PlayerRecord>,
        stats_override: Option<bool>,
        snapshot_stats: Option<bool>,
    ) -> Self {
        lobby_static.map_data.map_path =
            map_name::map_file_name(&lobby_static.map_data.map_path).to_string();
        let normalized = map_name::normalize(&lobby_static.map_data.map_name);
        let stats_available = stats_override
            .or(snapshot_stats)
            .unwrap_or(normalized.stats_available);
        let mut mirror = Self {
            region,
            lobby_static,
            slots,
            team_list_lookup,
            chat_messages,
            player_data,
            all_players: Vec::new(),
            non_spec_players: Vec::new(),
            lookup_name: normalized.name,
            stats_available,
        };
        mirror.all_players = mirror.collect_players(true);
        mirror.non_spec_players = mirror.collect_players(false);
        mirror
    }

    // ── Ingestion ───────────────────────────────────────────────────

    /// Ingest one update and classify what changed.
    ///
    /// Never fails: malformed content degrades event generation, not state
    /// tracking. In the slot-batch branch specifically, the first invalid
    /// payload stops event classification for the remainder of the batch,
    /// but every payload (including invalid ones) is still applied to the
    /// slot table afterwards — state must keep tracking the remote client
    /// even when events are dropped.
    ///
    /// Reserved vocabulary owned by other layers (`lobbyReady`, `stale`,
    /// `slotOpened`, ...) is handed back unchanged in `events`.
    pub fn ingest_update(&mut self, update: LobbyUpdate) -> IngestResult {
        let mut is_updated = false;
        let mut events = Vec::new();
        match update {
            LobbyUpdate::ChatMessage(chat) => {
                let violations = schema::check(&CHAT_MESSAGE_SCHEMA, &chat);
                if violations.is_empty() {
                    is_updated = self.push_chat(chat.name, chat.message);
                } else {
                    for violation in &violations {
                        warn!(%violation, "chat message rejected");
                    }
                }
            }
            LobbyUpdate::PlayerPayload {
                payloads,
                player_data,
            } => {
                is_updated = self.ingest_slot_batch(&payloads, &mut events);
                if let Some(patch) = player_data {
                    is_updated |= self.apply_attached_stats(patch);
                }
                // Apply pass: every payload overwrites its slot, including
                // ones that failed validation above.
                for payload in payloads {
                    self.slots.insert(payload.slot, payload);
                }
                is_updated |= self.detect_leavers(&mut events);
                self.all_players = self.collect_players(true);
                self.non_spec_players = self.collect_players(false);
            }
            LobbyUpdate::PlayerData(patch) => {
                is_updated = self.apply_player_patch(patch, &mut events);
            }
            other => {
                // Not ours; pass through unchanged for the layers that own it.
                events.push(other);
            }
        }
        IngestResult { is_updated, events }
    }

    /// Classification pass over a slot batch. Returns whether any payload
    /// differed from the stored slot. Stops generating events at the first
    /// invalid payload.
    fn ingest_slot_batch(&mut self, payloads: &[SlotPayload], events: &mut Vec<LobbyUpdate>) -> bool {
        let mut is_updated = false;
        for payload in payloads {
            let violations = schema::check(&SLOT_PAYLOAD_SCHEMA, payload);
            if !violations.is_empty() {
                for violation in &violations {
                    warn!(
                        slot = payload.slot,
                        %violation,
                        "invalid slot payload; dropping event generation for the rest of the batch"
                    );
                }
                break;
            }
            let current = self.slots.get(&payload.slot);
            if current == Some(payload) {
                continue;
            }
            is_updated = true;
            if !payload.is_identity_bound() {
                continue;
            }
            let known = self.all_players.iter().any(|name| *name == payload.name)
                || self.player_data.contains_key(&payload.name);
            if !known {
                debug!(name = %payload.name, slot = payload.slot, "player joined");
                events.push(LobbyUpdate::PlayerJoined(payload.clone()));
                self.player_data
                    .insert(payload.name.clone(), PlayerRecord::new(now_ms()));
            } else if self
                .slots
                .get(&payload.slot)
                .is_some_and(|slot| slot.is_identity_bound())
            {
                let already_swapped = events
                    .iter()
                    .any(|event| matches!(event, LobbyUpdate::PlayersSwapped { .. }));
                if already_swapped {
                    continue;
                }
                let displaced = self
                    .slots
                    .get(&payload.slot)
                    .map(|slot| slot.name.clone())
                    .unwrap_or_default();
                match self.player_slot(&payload.name) {
                    Some(previous_slot) => {
                        debug!(
                            name = %payload.name,
                            displaced = %displaced,
                            to = payload.slot,
                            from = previous_slot,
                            "players swapped"
                        );
                        events.push(LobbyUpdate::PlayersSwapped {
                            players: [payload.name.clone(), displaced],
                            slots: [payload.slot, previous_slot],
                        });
                    }
                    None => {
                        warn!(
                            name = %payload.name,
                            "swapping player not found in any slot; recording a move"
                        );
                        events.push(LobbyUpdate::PlayerMoved {
                            from: None,
                            to: payload.slot,
                            name: payload.name.clone(),
                        });
                    }
                }
            } else {
                let from = self.player_slot(&payload.name);
                debug!(name = %payload.name, ?from, to = payload.slot, "player moved");
                events.push(LobbyUpdate::PlayerMoved {
                    from,
                    to: payload.slot,
                    name: payload.name.clone(),
                });
            }
        }
        is_updated
    }

    /// Stats patch attached to a slot batch. Unlike the standalone branch,
    /// an untracked player that is present in the roster gets a record
    /// created on the spot (with a warning).
    fn apply_attached_stats(&mut self, patch: PlayerDataPatch) -> bool {
        let Some(extra) = patch.extra_data else {
            return false;
        };
        let violations = schema::check(&PLAYER_STATS_SCHEMA, &extra);
        if !violations.is_empty() {
            for violation in &violations {
                warn!(name = %patch.name, %violation, "stats patch rejected");
            }
            return false;
        }
        if let Some(record) = self.player_data.get_mut(&patch.name) {
            let changed = record.extra.as_ref() != Some(&extra);
            record.extra = Some(extra);
            changed
        } else if self.collect_players(true).iter().any(|name| *name == patch.name) {
            warn!(
                name = %patch.name,
                "stats patch for a player without a record who is still in the lobby"
            );
            let mut record = PlayerRecord::new(now_ms());
            record.extra = Some(extra);
            self.player_data.insert(patch.name, record);
            true
        } else {
            false
        }
    }

    /// Standalone player-data patch: silently dropped for unknown players;
    /// `extraData` replaces the stats block wholesale, `data` merges the
    /// scalar record fields. Applied patches are echoed as events.
    fn apply_player_patch(&mut self, patch: PlayerDataPatch, events: &mut Vec<LobbyUpdate>) -> bool {
        if let Some(extra) = &patch.extra_data {
            let violations = schema::check(&PLAYER_STATS_SCHEMA, extra);
            if !violations.is_empty() {
                for violation in &violations {
                    warn!(name = %patch.name, %violation, "stats patch rejected");
                }
                return false;
            }
        }
        let Some(record) = self.player_data.get_mut(&patch.name) else {
            debug!(name = %patch.name, "player data patch for unknown player dropped");
            return false;
        };
        let mut updated = false;
        if let Some(extra) = patch.extra_data.clone() {
            record.extra = Some(extra);
            // Wholesale replacement always counts as an update.
            updated = true;
        }
        if let Some(data) = &patch.data {
            if record.joined_at != data.joined_at {
                record.joined_at = data.joined_at;
                updated = true;
            }
            if record.cleared != data.cleared {
                record.cleared = data.cleared;
                updated = true;
            }
        }
        if updated {
            events.push(LobbyUpdate::PlayerData(patch));
        }
        updated
    }

    /// Compare the pre-update roster against the freshly applied slots and
    /// emit `playerLeft` for every name that dropped out, removing its
    /// record.
    fn detect_leavers(&mut self, events: &mut Vec<LobbyUpdate>) -> bool {
        let roster = self.collect_players(true);
        let mut any_left = false;
        for name in std::mem::take(&mut self.all_players) {
            if !roster.contains(&name) {
                any_left = true;
                debug!(name = %name, "player left");
                self.player_data.remove(&name);
                events.push(LobbyUpdate::PlayerLeft(name));
            }
        }
        self.all_players = roster;
        any_left
    }

    /// Pre-filter in front of the slot-batch branch: drops invalid
    /// payloads, no-op payloads and identity-bound payloads with no name
    /// (incomplete identity), then forwards the survivors to
    /// [`ingest_update`](LobbyMirror::ingest_update).
    pub fn update_lobby_slots(&mut self, slots: &[SlotPayload]) -> SlotBatchOutcome {
        let mut player_updates = Vec::new();
        for payload in slots {
            let violations = schema::check(&SLOT_PAYLOAD_SCHEMA, payload);
            if !violations.is_empty() {
                for violation in &violations {
                    warn!(slot = payload.slot, %violation, "invalid slot payload dropped");
                }
                continue;
            }
            if self.slots.get(&payload.slot) == Some(payload) {
                continue;
            }
            if payload.is_identity_bound() && payload.name.is_empty() {
                continue;
            }
            player_updates.push(payload.clone());
        }
        if player_updates.is_empty() {
            debug!("no slot updates to apply");
            return SlotBatchOutcome::default();
        }
        let result = self.ingest_update(LobbyUpdate::PlayerPayload {
            payloads: player_updates.clone(),
            player_data: None,
        });
        SlotBatchOutcome {
            player_updates,
            result,
        }
    }

    fn push_chat(&mut self, name: String, message: String) -> bool {
        let now = now_ms();
        let duplicate = self.chat_messages.iter().any(|chat| {
            chat.message == message && now.abs_diff(chat.time) < CHAT_DEDUPE_WINDOW_MS
        });
        if duplicate {
            debug!(name = %name, "duplicate chat message dropped");
            return false;
        }
        self.chat_messages.push(ChatMessage {
            name,
            message,
            time: now,
        });
        true
    }

    // ── Queries and exports ─────────────────────────────────────────

    /// Names of all identity-bound players, optionally restricted to slots
    /// whose team classifies as a player team. Ordered by slot index.
    pub fn players(&self, include_non_player_teams: bool) -> Vec<String> {
        self.collect_players(include_non_player_teams)
    }

    fn collect_players(&self, include_non_player_teams: bool) -> Vec<String> {
        self.slots
            .values()
            .filter(|slot| slot.is_identity_bound())
            .filter(|slot| {
                include_non_player_teams
                    || self
                        .team_list_lookup
                        .get(&slot.team)
                        .is_some_and(|info| info.kind == TeamType::PlayerTeams)
            })
            .map(|slot| slot.name.clone())
            .collect()
    }

    /// Cached full roster, refreshed after every state-changing ingestion.
    pub fn all_players(&self) -> &[String] {
        &self.all_players
    }

    /// Cached roster restricted to player teams.
    pub fn non_spec_players(&self) -> &[String] {
        &self.non_spec_players
    }

    /// Slot index currently holding `name`, if any.
    pub fn player_slot(&self, name: &str) -> Option<u8> {
        self.slots
            .values()
            .find(|slot| slot.name == name)
            .map(|slot| slot.slot)
    }

    /// Case-insensitive search over the full roster. `pattern` is treated
    /// as a regex; if it does not compile, it degrades to a substring
    /// match.
    pub fn search_players(&self, pattern: &str) -> Vec<String> {
        match regex::RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => self
                .all_players
                .iter()
                .filter(|name| regex.is_match(name))
                .cloned()
                .collect(),
            Err(_) => {
                let needle = pattern.to_lowercase();
                self.all_players
                    .iter()
                    .filter(|name| name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Name of the local client's own slot.
    pub fn self_name(&self) -> Option<&str> {
        self.slots
            .values()
            .find(|slot| slot.is_self)
            .map(|slot| slot.name.as_str())
    }

    /// All tracked player records.
    pub fn player_records(&self) -> &BTreeMap<String, PlayerRecord> {
        &self.player_data
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn lobby_static(&self) -> &LobbyStatic {
        &self.lobby_static
    }

    pub fn slots(&self) -> &BTreeMap<u8, SlotPayload> {
        &self.slots
    }

    pub fn team_list_lookup(&self) -> &BTreeMap<u8, TeamInfo> {
        &self.team_list_lookup
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        &self.chat_messages
    }

    /// Canonical map name used as the stats key.
    pub fn lookup_name(&self) -> &str {
        &self.lookup_name
    }

    pub fn stats_available(&self) -> bool {
        self.stats_available
    }

    /// Export the full tracked state for persistence. Feeding the result
    /// back into [`LobbyMirror::from_snapshot`] reconstructs an equivalent
    /// mirror.
    pub fn export_snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            lobby_static: self.lobby_static.clone(),
            region: self.region,
            slots: self.slots.clone(),
            team_list_lookup: self.team_list_lookup.clone(),
            chat_messages: self.chat_messages.clone(),
            player_data: self.player_data.clone(),
            stats_available: Some(self.stats_available),
        }
    }

    /// Project the lobby per team: one row per seat, with `"OPEN"` /
    /// `"CLOSED"` display names for unoccupied seats and the tracked record
    /// (or a fresh one for bound-but-untracked occupants) attached.
    pub fn export_team_structure(
        &self,
        player_teams_only: bool,
    ) -> BTreeMap<String, Vec<TeamSlotView>> {
        let mut structure = BTreeMap::new();
        for (team_index, info) in &self.team_list_lookup {
            if player_teams_only && info.kind != TeamType::PlayerTeams {
                continue;
            }
            let rows: Vec<TeamSlotView> = self
                .slots
                .values()
                .filter(|slot| slot.team == *team_index)
                .map(|slot| {
                    let name = match slot.slot_status {
                        SlotStatus::Filled => slot.name.clone(),
                        SlotStatus::Closed => "CLOSED".to_string(),
                        SlotStatus::Open => "OPEN".to_string(),
                    };
                    let data = self.player_data.get(&slot.name).cloned().or_else(|| {
                        (!slot.player_region.is_empty()).then(|| PlayerRecord::new(now_ms()))
                    });
                    TeamSlotView {
                        name,
                        slot_status: slot.slot_status,
                        slot: self.player_slot(&slot.name),
                        real_player: !slot.player_region.is_empty(),
                        data,
                    }
                })
                .collect();
            structure.insert(info.name.clone(), rows);
        }
        structure
    }
}
