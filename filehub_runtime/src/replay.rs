//! Replay — rebuild a player's state from the command journal.
//!
//! `apply_command` is the single place a journaled command touches the
//! engine. The session layer goes through it live and replay goes through
//! it again, so both take the same path through the kernel.

use rand::rngs::StdRng;
use rand::SeedableRng;

use filehub_engine::actions::ActionReceipt;
use filehub_engine::domain::{GameState, PlayerId};
use filehub_engine::hashing::canonical_hash;
use filehub_engine::resolution::ChoiceOutcome;
use filehub_engine::{GameEngine, TurnReport, TurnStatus};

use crate::error::{RuntimeError, RuntimeResult};
use crate::journal::{Command, JournalEntry};

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Turn(TurnReport),
    Choice(ChoiceOutcome),
    Action(ActionReceipt),
}

/// Apply one command. Rejected resolutions and actions leave `state`
/// untouched; a turn is applied even when it reports `Error`.
pub fn apply_command(engine: &GameEngine, state: &mut GameState, command: &Command) -> RuntimeResult<CommandOutcome> {
    match command {
        Command::PlayTurn { seed } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            let report = engine.process_turn(state, &mut rng);
            if report.status != TurnStatus::Error {
                engine.advance_turn(state);
            }
            Ok(CommandOutcome::Turn(report))
        }
        Command::ResolveEvent { choice_index } => {
            Ok(CommandOutcome::Choice(engine.resolve_event_choice(state, *choice_index)?))
        }
        Command::PerformAction { action } => Ok(CommandOutcome::Action(engine.perform_action(state, action)?)),
    }
}

/// Apply `entries` in order on top of `state`.
pub fn apply_entries(engine: &GameEngine, state: &mut GameState, entries: &[JournalEntry]) -> RuntimeResult<()> {
    for entry in entries {
        apply_command(engine, state, &entry.command).map_err(|e| match e {
            // the journal only holds accepted commands
            RuntimeError::Engine(inner) => RuntimeError::ReplayDiverged {
                sequence: entry.sequence,
                reason: inner.to_string(),
            },
            other => other,
        })?;
    }
    Ok(())
}

/// Rebuild a player's state from a fresh game.
///
/// Returns (final_state, canonical_hash).
pub fn rebuild_state(
    engine: &GameEngine,
    player_id: PlayerId,
    entries: &[JournalEntry],
) -> RuntimeResult<(GameState, String)> {
    let mut state = engine.new_game(player_id);
    apply_entries(engine, &mut state, entries)?;
    let hash = canonical_hash(&state)?;
    Ok((state, hash))
}

pub fn rebuild_hash(engine: &GameEngine, player_id: PlayerId, entries: &[JournalEntry]) -> RuntimeResult<String> {
    let (_, hash) = rebuild_state(engine, player_id, entries)?;
    Ok(hash)
}
