#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Bootstrap and ingestion tests for the lobby mirror.
//!
//! Drives a mirror built from fixture payloads through the scenarios the
//! engine has to classify correctly: joins, moves, seat swaps, leavers,
//! chat dedupe, stats patches and the fail-open handling of malformed
//! batches.

mod common;

use common::{
    ai_slot, base_payload, filled_slot, lobby_payload, lobby_payload_host, open_slot, self_slot,
    SELF_NAME,
};
use lobby_mirror::{
    ChatUpdate, LobbyBootstrap, LobbyError, LobbyMirror, LobbyUpdate, PlayerDataPatch,
    PlayerRecord, PlayerStats, TeamType,
};

fn stats(rating: f64) -> PlayerStats {
    PlayerStats {
        played: 120,
        wins: 70,
        losses: 50,
        rating,
        last_change: 12.5,
        rank: 3,
    }
}

// ════════════════════════════════════════════════════════════════════
// Bootstrap from a client payload
// ════════════════════════════════════════════════════════════════════

#[test]
fn bootstrap_classifies_the_player_team() {
    let mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let team = mirror.team_list_lookup().get(&0).unwrap();
    assert_eq!(team.kind, TeamType::PlayerTeams);
    assert_eq!(team.name, "Team 1");

    assert_eq!(mirror.all_players(), ["Foo#1234".to_string(), SELF_NAME.to_string()]);
    assert_eq!(mirror.non_spec_players(), mirror.all_players());
    assert!(mirror.player_records().contains_key("Foo#1234"));
    assert!(mirror.player_records().contains_key(SELF_NAME));
}

#[test]
fn bootstrap_normalizes_map_name_and_path() {
    let mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();
    assert_eq!(mirror.lookup_name(), "Legion TD");
    assert!(mirror.stats_available());
    assert_eq!(mirror.lobby_static().map_data.map_path, "legiontd.w3x");
}

#[test]
fn bootstrap_stats_override_beats_the_normalizer() {
    let mirror = LobbyMirror::new(
        LobbyBootstrap::from_payload("us", base_payload()).with_stats_available(false),
    )
    .unwrap();
    assert_eq!(mirror.lookup_name(), "Legion TD");
    assert!(!mirror.stats_available());
}

#[test]
fn bootstrap_rejects_unknown_region() {
    let err = LobbyMirror::from_payload("na", base_payload()).unwrap_err();
    assert!(matches!(err, LobbyError::InvalidRegion(code) if code == "na"));
}

#[test]
fn bootstrap_requires_a_self_slot() {
    let payload = lobby_payload(
        &[(0, "Team 1")],
        vec![filled_slot(0, 0, "Foo#1234", "us"), open_slot(1, 0)],
    );
    let err = LobbyMirror::from_payload("us", payload).unwrap_err();
    assert!(matches!(err, LobbyError::NotSelfPresent));
}

#[test]
fn bootstrap_rejects_payload_violating_the_schema() {
    let mut payload = base_payload();
    payload.players[0].handicap = 10; // below the allowed 50..=100
    let err = LobbyMirror::from_payload("us", payload).unwrap_err();
    match err {
        LobbyError::InvalidPayload { path, .. } => {
            assert_eq!(path, "players.0.handicap");
        }
        other => panic!("expected InvalidPayload, got {other:?}"),
    }
}

#[test]
fn bootstrap_without_any_input_is_rejected() {
    let err = LobbyMirror::new(LobbyBootstrap::default()).unwrap_err();
    assert!(matches!(err, LobbyError::MissingInput));
}

#[test]
fn host_sees_immovable_ai_team_as_other() {
    let payload = lobby_payload_host(
        &[(0, "Team 1"), (1, "Team 2")],
        vec![
            filled_slot(0, 0, "Foo#1234", "us"),
            self_slot(3, 0),
            ai_slot(4, 1, "Computer (Insane)"),
            ai_slot(5, 1, "Computer (Easy)"),
        ],
        true,
    );
    let mirror = LobbyMirror::from_payload("us", payload).unwrap();
    assert_eq!(mirror.team_list_lookup().get(&0).unwrap().kind, TeamType::PlayerTeams);
    assert_eq!(mirror.team_list_lookup().get(&1).unwrap().kind, TeamType::OtherTeams);
    // AI seats are not identity-bound and never enter the roster.
    assert_eq!(mirror.all_players().len(), 2);
}

// ════════════════════════════════════════════════════════════════════
// Slot batch ingestion
// ════════════════════════════════════════════════════════════════════

#[test]
fn new_identity_emits_player_joined_and_creates_a_record() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![filled_slot(1, 0, "Baz#9999", "eu")],
        player_data: None,
    });

    assert!(result.is_updated);
    assert_eq!(result.events.len(), 1);
    assert!(matches!(
        &result.events[0],
        LobbyUpdate::PlayerJoined(slot) if slot.name == "Baz#9999" && slot.slot == 1
    ));
    assert!(mirror.player_records().contains_key("Baz#9999"));
    assert!(mirror.all_players().contains(&"Baz#9999".to_string()));
}

#[test]
fn reingesting_an_identical_batch_is_a_no_op() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();
    let batch = vec![filled_slot(1, 0, "Baz#9999", "eu")];

    let first = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: batch.clone(),
        player_data: None,
    });
    assert!(first.is_updated);

    let second = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: batch,
        player_data: None,
    });
    assert!(!second.is_updated);
    assert!(second.events.is_empty());
}

#[test]
fn seat_exchange_emits_exactly_one_players_swapped() {
    let payload = lobby_payload(
        &[(0, "Team 1")],
        vec![
            open_slot(0, 0),
            open_slot(1, 0),
            filled_slot(2, 0, "Foo#1234", "us"),
            self_slot(3, 0),
            open_slot(4, 0),
            filled_slot(5, 0, "Bar#5678", "eu"),
        ],
    );
    let mut mirror = LobbyMirror::from_payload("us", payload).unwrap();

    // Foo and Bar trade seats: slot 2 now reports Bar, slot 5 now reports Foo.
    let result = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![
            filled_slot(2, 0, "Bar#5678", "eu"),
            filled_slot(5, 0, "Foo#1234", "us"),
        ],
        player_data: None,
    });

    assert!(result.is_updated);
    assert_eq!(result.events.len(), 1, "swap must be reported once, not per payload");
    assert!(matches!(
        &result.events[0],
        LobbyUpdate::PlayersSwapped { players, slots }
            if *players == ["Bar#5678".to_string(), "Foo#1234".to_string()]
                && *slots == [2, 5]
    ));
    // Both players remain tracked afterwards.
    assert!(mirror.player_records().contains_key("Foo#1234"));
    assert!(mirror.player_records().contains_key("Bar#5678"));
    assert_eq!(mirror.slots().get(&2).unwrap().name, "Bar#5678");
    assert_eq!(mirror.slots().get(&5).unwrap().name, "Foo#1234");
}

#[test]
fn moving_into_an_open_seat_emits_player_moved() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![open_slot(0, 0), filled_slot(4, 0, "Foo#1234", "us")],
        player_data: None,
    });

    assert!(result.is_updated);
    assert_eq!(result.events.len(), 1);
    assert!(matches!(
        &result.events[0],
        LobbyUpdate::PlayerMoved { from: Some(0), to: 4, name } if name == "Foo#1234"
    ));
    assert!(mirror.player_records().contains_key("Foo#1234"));
}

#[test]
fn vacated_identity_emits_player_left_and_drops_the_record() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![open_slot(0, 0)],
        player_data: None,
    });

    assert!(result.is_updated);
    assert_eq!(result.events.len(), 1);
    assert!(matches!(
        &result.events[0],
        LobbyUpdate::PlayerLeft(name) if name == "Foo#1234"
    ));
    assert!(!mirror.player_records().contains_key("Foo#1234"));
    assert!(!mirror.all_players().contains(&"Foo#1234".to_string()));
}

#[test]
fn malformed_payload_stops_events_but_state_is_still_applied() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let mut malformed = filled_slot(1, 0, "Zed#1111", "eu");
    malformed.handicap = 10; // fails validation
    let valid = filled_slot(4, 0, "Baz#9999", "eu");

    let result = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![malformed.clone(), valid.clone()],
        player_data: None,
    });

    // Event generation stopped at index 0 ...
    assert!(result.events.is_empty());
    assert!(!result.is_updated);
    // ... but both payloads were applied to the slot table regardless.
    assert_eq!(mirror.slots().get(&1), Some(&malformed));
    assert_eq!(mirror.slots().get(&4), Some(&valid));
    // No classification ran, so no record was created for the new name.
    assert!(!mirror.player_records().contains_key("Baz#9999"));
    assert!(mirror.all_players().contains(&"Baz#9999".to_string()));
}

// ════════════════════════════════════════════════════════════════════
// Slot update pre-filter
// ════════════════════════════════════════════════════════════════════

#[test]
fn filter_drops_noop_and_incomplete_payloads() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    // Identical to the stored slot: dropped.
    let unchanged = filled_slot(0, 0, "Foo#1234", "us");
    // Identity-bound but nameless: incomplete, dropped.
    let nameless = filled_slot(1, 0, "", "eu");

    let outcome = mirror.update_lobby_slots(&[unchanged, nameless]);
    assert!(outcome.player_updates.is_empty());
    assert!(!outcome.result.is_updated);
    assert!(outcome.result.events.is_empty());
}

#[test]
fn filter_forwards_real_changes_to_the_engine() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let joining = filled_slot(1, 0, "Baz#9999", "eu");
    let outcome = mirror.update_lobby_slots(&[joining.clone(), open_slot(4, 0)]);

    assert_eq!(outcome.player_updates, vec![joining]);
    assert!(outcome.result.is_updated);
    assert!(matches!(
        &outcome.result.events[0],
        LobbyUpdate::PlayerJoined(slot) if slot.name == "Baz#9999"
    ));
}

#[test]
fn filter_drops_invalid_payloads_without_applying_them() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let mut malformed = filled_slot(1, 0, "Zed#1111", "eu");
    malformed.race = 200;
    let outcome = mirror.update_lobby_slots(&[malformed]);

    assert!(outcome.player_updates.is_empty());
    assert!(!outcome.result.is_updated);
    // Unlike direct ingestion, the pre-filter protects the slot table.
    assert_eq!(mirror.slots().get(&1).unwrap().name, "");
}

// ════════════════════════════════════════════════════════════════════
// Chat
// ════════════════════════════════════════════════════════════════════

#[test]
fn chat_appends_with_current_time() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::ChatMessage(ChatUpdate {
        name: "Foo#1234".into(),
        message: "gl hf".into(),
    }));

    assert!(result.is_updated);
    assert_eq!(mirror.chat_messages().len(), 1);
    assert_eq!(mirror.chat_messages()[0].message, "gl hf");
    assert!(mirror.chat_messages()[0].time > 0);
}

#[test]
fn chat_dedupes_by_content_regardless_of_sender() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let first = mirror.ingest_update(LobbyUpdate::ChatMessage(ChatUpdate {
        name: "Foo#1234".into(),
        message: "hi".into(),
    }));
    assert!(first.is_updated);

    // Different sender, identical content, well inside the window.
    let second = mirror.ingest_update(LobbyUpdate::ChatMessage(ChatUpdate {
        name: "Bar#5678".into(),
        message: "hi".into(),
    }));
    assert!(!second.is_updated);
    assert_eq!(mirror.chat_messages().len(), 1);

    // Different content is accepted immediately.
    let third = mirror.ingest_update(LobbyUpdate::ChatMessage(ChatUpdate {
        name: "Bar#5678".into(),
        message: "hi!".into(),
    }));
    assert!(third.is_updated);
    assert_eq!(mirror.chat_messages().len(), 2);
}

#[test]
fn chat_with_invalid_sender_is_rejected() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::ChatMessage(ChatUpdate {
        name: "not a battle tag".into(),
        message: "hi".into(),
    }));

    assert!(!result.is_updated);
    assert!(mirror.chat_messages().is_empty());
}

// ════════════════════════════════════════════════════════════════════
// Player data patches
// ════════════════════════════════════════════════════════════════════

#[test]
fn standalone_stats_patch_is_applied_and_echoed() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let patch = PlayerDataPatch {
        name: "Foo#1234".into(),
        data: None,
        extra_data: Some(stats(1630.0)),
    };
    let result = mirror.ingest_update(LobbyUpdate::PlayerData(patch.clone()));

    assert!(result.is_updated);
    assert_eq!(result.events, vec![LobbyUpdate::PlayerData(patch)]);
    let record = mirror.player_records().get("Foo#1234").unwrap();
    assert_eq!(record.extra.as_ref().unwrap().rating, 1630.0);

    // Wholesale replacement counts as an update even when nothing differs.
    let again = mirror.ingest_update(LobbyUpdate::PlayerData(PlayerDataPatch {
        name: "Foo#1234".into(),
        data: None,
        extra_data: Some(stats(1630.0)),
    }));
    assert!(again.is_updated);
}

#[test]
fn standalone_patch_for_unknown_player_is_dropped_silently() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::PlayerData(PlayerDataPatch {
        name: "Ghost#0000".into(),
        data: None,
        extra_data: Some(stats(1500.0)),
    }));

    assert!(!result.is_updated);
    assert!(result.events.is_empty());
    assert!(!mirror.player_records().contains_key("Ghost#0000"));
}

#[test]
fn standalone_patch_merges_scalar_record_fields() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let result = mirror.ingest_update(LobbyUpdate::PlayerData(PlayerDataPatch {
        name: "Foo#1234".into(),
        data: Some(PlayerRecord {
            joined_at: 42,
            cleared: true,
            extra: None,
        }),
        extra_data: None,
    }));

    assert!(result.is_updated);
    let record = mirror.player_records().get("Foo#1234").unwrap();
    assert_eq!(record.joined_at, 42);
    assert!(record.cleared);
}

#[test]
fn attached_stats_patch_reports_whether_stats_changed() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    let update = |rating: f64| LobbyUpdate::PlayerPayload {
        payloads: vec![],
        player_data: Some(PlayerDataPatch {
            name: "Foo#1234".into(),
            data: None,
            extra_data: Some(stats(rating)),
        }),
    };

    assert!(mirror.ingest_update(update(1630.0)).is_updated);
    // Identical stats: nothing changed this time.
    assert!(!mirror.ingest_update(update(1630.0)).is_updated);
    assert!(mirror.ingest_update(update(1655.0)).is_updated);
}

#[test]
fn attached_patch_creates_a_record_for_a_recordless_roster_player() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    // A malformed batch applies a new identity without classification,
    // leaving a roster member with no record.
    let mut malformed = filled_slot(1, 0, "Zed#1111", "eu");
    malformed.handicap = 10;
    let baz = filled_slot(4, 0, "Baz#9999", "eu");
    mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![malformed, baz],
        player_data: None,
    });
    assert!(!mirror.player_records().contains_key("Baz#9999"));

    let result = mirror.ingest_update(LobbyUpdate::PlayerPayload {
        payloads: vec![],
        player_data: Some(PlayerDataPatch {
            name: "Baz#9999".into(),
            data: None,
            extra_data: Some(stats(1490.0)),
        }),
    });

    assert!(result.is_updated);
    let record = mirror.player_records().get("Baz#9999").unwrap();
    assert_eq!(record.extra.as_ref().unwrap().rating, 1490.0);
}

// ════════════════════════════════════════════════════════════════════
// Reserved vocabulary
// ════════════════════════════════════════════════════════════════════

#[test]
fn reserved_variants_pass_through_unchanged() {
    let mut mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    for reserved in [
        LobbyUpdate::Stale,
        LobbyUpdate::LeftLobby,
        LobbyUpdate::LobbyReady,
        LobbyUpdate::SlotOpened(7),
        LobbyUpdate::SlotClosed(8),
    ] {
        let result = mirror.ingest_update(reserved.clone());
        assert!(!result.is_updated);
        assert_eq!(result.events, vec![reserved]);
    }
}

// ════════════════════════════════════════════════════════════════════
// Queries and team structure
// ════════════════════════════════════════════════════════════════════

fn payload_with_referee_team() -> lobby_mirror::GameClientLobbyPayload {
    lobby_payload(
        &[(0, "Team 1"), (1, "Referees")],
        vec![
            filled_slot(0, 0, "Foo#1234", "us"),
            open_slot(1, 0),
            self_slot(3, 0),
            filled_slot(6, 1, "Watcher#4321", "eu"),
        ],
    )
}

#[test]
fn spec_team_members_are_excluded_from_non_spec_roster() {
    let mirror = LobbyMirror::from_payload("us", payload_with_referee_team()).unwrap();

    assert_eq!(mirror.team_list_lookup().get(&1).unwrap().kind, TeamType::SpecTeams);
    assert!(mirror.all_players().contains(&"Watcher#4321".to_string()));
    assert!(!mirror.non_spec_players().contains(&"Watcher#4321".to_string()));
    assert_eq!(mirror.players(false).len(), 2);
    assert_eq!(mirror.players(true).len(), 3);
}

#[test]
fn search_is_case_insensitive_and_survives_bad_patterns() {
    let mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    assert_eq!(mirror.search_players("foo"), vec!["Foo#1234".to_string()]);
    assert_eq!(mirror.search_players("^trench"), vec![SELF_NAME.to_string()]);
    // Unclosed group is not a valid regex; falls back to substring match.
    assert_eq!(mirror.search_players("foo("), Vec::<String>::new());
    assert_eq!(mirror.search_players("FOO#12"), vec!["Foo#1234".to_string()]);
}

#[test]
fn slot_and_self_queries_resolve() {
    let mirror = LobbyMirror::from_payload("us", base_payload()).unwrap();

    assert_eq!(mirror.player_slot("Foo#1234"), Some(0));
    assert_eq!(mirror.player_slot("Nobody#1111"), None);
    assert_eq!(mirror.self_name(), Some(SELF_NAME));
}

#[test]
fn team_structure_projects_seats_with_display_names() {
    let mirror = LobbyMirror::from_payload("us", payload_with_referee_team()).unwrap();

    let all = mirror.export_team_structure(false);
    assert!(all.contains_key("Team 1"));
    assert!(all.contains_key("Referees"));

    let players_only = mirror.export_team_structure(true);
    assert!(!players_only.contains_key("Referees"));

    let team1 = players_only.get("Team 1").unwrap();
    assert_eq!(team1.len(), 3);
    let foo = team1.iter().find(|row| row.name == "Foo#1234").unwrap();
    assert!(foo.real_player);
    assert_eq!(foo.slot, Some(0));
    assert!(foo.data.is_some());
    let open = team1.iter().find(|row| row.name == "OPEN").unwrap();
    assert!(!open.real_player);
    assert!(open.data.is_none());
}
