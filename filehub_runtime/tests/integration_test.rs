//! Integration tests for filehub_runtime.
//!
//! All tests use temporary directories for isolation.

use std::fs;
use std::path::Path;

use filehub_engine::actions::PlayerAction;
use filehub_engine::domain::PlayerId;
use filehub_engine::hashing::canonical_hash;
use filehub_engine::{EngineError, GameEngine};

use filehub_runtime::drift::compare_states;
use filehub_runtime::journal::Journal;
use filehub_runtime::record_store::{FileRecordStore, MemoryRecordStore, RecordStore};
use filehub_runtime::replay;
use filehub_runtime::{RuntimeConfig, RuntimeError, SessionStore};

const SEED: u64 = 42;

fn file_sessions(dir: &Path) -> SessionStore<FileRecordStore> {
    let config = RuntimeConfig {
        data_dir: dir.to_path_buf(),
        journal: true,
        master_seed: Some(SEED),
        game_config: None,
    };
    SessionStore::from_config(&config).unwrap()
}

fn start_hub<S: RecordStore>(sessions: &mut SessionStore<S>, player: PlayerId) {
    let setup = PlayerAction::SetupHub {
        name: "Attic Archive".into(),
        domain: "atticarchive.org".into(),
    };
    sessions.perform_action(player, &setup).unwrap();
    sessions
        .perform_action(player, &"campaign_social_media_small".parse().unwrap())
        .unwrap();
}

/// Play `turns` turns, answering every event with its first choice.
fn play<S: RecordStore>(sessions: &mut SessionStore<S>, player: PlayerId, turns: u32) {
    for _ in 0..turns {
        while sessions.state(player).unwrap().has_pending_event() {
            sessions.resolve_event(player, 0).unwrap();
        }
        sessions.process_turn(player).unwrap();
    }
}

fn hash_of<S: RecordStore>(sessions: &SessionStore<S>, player: PlayerId) -> String {
    canonical_hash(sessions.state(player).unwrap()).unwrap()
}

// ─────────────────────────────────────────────────────────────
// Test 1: evict then reopen restores the same state
// ─────────────────────────────────────────────────────────────

#[test]
fn evict_then_reopen_restores_the_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut sessions = file_sessions(dir.path());
    start_hub(&mut sessions, 1);
    play(&mut sessions, 1, 4);
    let before = hash_of(&sessions, 1);

    sessions.evict(1).unwrap();
    assert!(!sessions.is_cached(1));
    sessions.open(1).unwrap();
    assert_eq!(hash_of(&sessions, 1), before);
}

// ─────────────────────────────────────────────────────────────
// Test 2: journal replay reproduces the live state
// ─────────────────────────────────────────────────────────────

#[test]
fn journal_replay_reproduces_the_live_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut sessions = file_sessions(dir.path());
    start_hub(&mut sessions, 2);
    play(&mut sessions, 2, 5);

    let path = sessions.journal_path(2).unwrap();
    let entries = Journal::open(&path).unwrap().load_all().unwrap();
    assert!(entries.len() >= 7);

    let (rebuilt, hash) = replay::rebuild_state(&GameEngine::default(), 2, &entries).unwrap();
    assert_eq!(hash, hash_of(&sessions, 2));
    let drift = compare_states(sessions.state(2).unwrap(), &rebuilt).unwrap();
    assert!(drift.is_identical(), "drifted fields: {:?}", drift.changed_fields);
}

// ─────────────────────────────────────────────────────────────
// Test 3: unflushed choice is recovered from the journal
// ─────────────────────────────────────────────────────────────

#[test]
fn unflushed_choice_is_recovered_from_the_journal() {
    let dir = tempfile::tempdir().unwrap();
    let expected = {
        let mut sessions = file_sessions(dir.path());
        start_hub(&mut sessions, 3);
        let mut turns = 0;
        while !sessions.state(3).unwrap().has_pending_event() {
            sessions.process_turn(3).unwrap();
            turns += 1;
            assert!(turns < 100, "no event in 100 turns");
        }
        sessions.resolve_event(3, 1).unwrap();
        // dropped without flushing: the record still has the event pending
        hash_of(&sessions, 3)
    };

    let stored = FileRecordStore::open(dir.path()).unwrap().load(3).unwrap().unwrap();
    assert!(stored.restore().unwrap().has_pending_event());

    let mut sessions = file_sessions(dir.path());
    let state = sessions.open(3).unwrap();
    assert!(!state.has_pending_event());
    assert_eq!(hash_of(&sessions, 3), expected);
}

// ─────────────────────────────────────────────────────────────
// Test 4: pending event blocks the turn and nothing is journaled
// ─────────────────────────────────────────────────────────────

#[test]
fn pending_event_blocks_the_turn() {
    let dir = tempfile::tempdir().unwrap();
    let mut sessions = file_sessions(dir.path());
    start_hub(&mut sessions, 4);
    while !sessions.state(4).unwrap().has_pending_event() {
        sessions.process_turn(4).unwrap();
    }

    let journal_path = sessions.journal_path(4).unwrap();
    let logged = Journal::open(&journal_path).unwrap().last_sequence();
    let before = hash_of(&sessions, 4);

    let err = sessions.process_turn(4).unwrap_err();
    assert!(matches!(err, RuntimeError::Engine(EngineError::EventPending)));
    assert!(err.is_validation());
    assert_eq!(hash_of(&sessions, 4), before);
    assert_eq!(Journal::open(&journal_path).unwrap().last_sequence(), logged);
}

// ─────────────────────────────────────────────────────────────
// Test 5: tampered record is refused on open
// ─────────────────────────────────────────────────────────────

#[test]
fn tampered_record_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        data_dir: dir.path().to_path_buf(),
        journal: false,
        master_seed: Some(SEED),
        game_config: None,
    };
    {
        let mut sessions = SessionStore::from_config(&config).unwrap();
        start_hub(&mut sessions, 5);
        sessions.evict(5).unwrap();
    }

    let path = dir.path().join("5.json");
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.replace("Attic Archive", "Attic Archivf")).unwrap();

    let mut sessions = SessionStore::from_config(&config).unwrap();
    match sessions.open(5) {
        Err(RuntimeError::HashMismatch { player_id, .. }) => assert_eq!(player_id, 5),
        Err(other) => panic!("expected HashMismatch, got {}", other),
        Ok(_) => panic!("tampered record was accepted"),
    }
}

// ─────────────────────────────────────────────────────────────
// Test 6: journaling off leaves only records behind
// ─────────────────────────────────────────────────────────────

#[test]
fn journaling_off_writes_only_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        data_dir: dir.path().to_path_buf(),
        journal: false,
        master_seed: Some(SEED),
        game_config: None,
    };
    let mut sessions = SessionStore::from_config(&config).unwrap();
    start_hub(&mut sessions, 6);
    play(&mut sessions, 6, 2);
    assert_eq!(sessions.journal_path(6), None);

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["6.json".to_string()]);
}

// ─────────────────────────────────────────────────────────────
// Test 7: same master seed, same game
// ─────────────────────────────────────────────────────────────

#[test]
fn same_master_seed_plays_the_same_game() {
    let mut a = SessionStore::new(GameEngine::default(), MemoryRecordStore::new()).with_master_seed(SEED);
    let mut b = SessionStore::new(GameEngine::default(), MemoryRecordStore::new()).with_master_seed(SEED);
    for sessions in [&mut a, &mut b] {
        start_hub(sessions, 7);
        play(sessions, 7, 6);
    }
    assert_eq!(hash_of(&a, 7), hash_of(&b, 7));
    assert_eq!(a.score(7).unwrap(), b.score(7).unwrap());
}

// ─────────────────────────────────────────────────────────────
// Test 8: players are independent
// ─────────────────────────────────────────────────────────────

#[test]
fn players_are_independent() {
    let mut sessions = SessionStore::new(GameEngine::default(), MemoryRecordStore::new()).with_master_seed(SEED);
    start_hub(&mut sessions, 8);
    let other_before = sessions.open(9).unwrap().clone();

    play(&mut sessions, 8, 3);
    assert_eq!(sessions.state(9).unwrap(), &other_before);
    assert_eq!(sessions.cached_players(), vec![8, 9]);

    sessions.flush_all().unwrap();
    assert!(sessions.store().exists(8).unwrap());
    assert!(sessions.store().exists(9).unwrap());
}
