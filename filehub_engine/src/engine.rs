/// FileHub Engine — Engine
///
/// Top-level orchestrator. Owns the configuration table and delegates to
/// the generator, metrics, evaluator, resolution and action layers.
///
/// Per turn: events → metrics (A, B, C, derived, MAU) → invariants → outcome.
/// A pending event blocks the turn before anything is rolled.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::actions::{advance_turn, apply_action, ActionReceipt, PlayerAction};
use crate::changeset::Changeset;
use crate::config::GameConfig;
use crate::domain::{GameState, PlayerId};
use crate::error::{EngineError, EngineResult};
use crate::events::{generate_events, GameEvent};
use crate::invariants::try_validate_invariants;
use crate::metrics::apply_turn_metrics;
use crate::outcome::{evaluate_outcome, evaluate_score, Outcome};
use crate::resolution::{resolve_event_choice, ChoiceOutcome};
use crate::state::create_initial_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Success,
    Win,
    Lose,
    Error,
}

/// Result of one `process_turn` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub events: Vec<GameEvent>,
    pub metrics_changed: Changeset,
    pub status: TurnStatus,
    pub message: Option<String>,
}

impl TurnReport {
    fn error(turn: u32, events: Vec<GameEvent>, metrics_changed: Changeset, err: &EngineError) -> Self {
        Self {
            turn,
            events,
            metrics_changed,
            status: TurnStatus::Error,
            message: Some(err.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TurnStatus::Win | TurnStatus::Lose)
    }
}

/// Stateless over players: every call takes the player's state explicitly.
#[derive(Debug, Clone, Default)]
pub struct GameEngine {
    config: GameConfig,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn new_game(&self, player_id: PlayerId) -> GameState {
        info!(player = player_id, "new game");
        create_initial_state(player_id, &self.config)
    }

    /// Resolve one turn in place. Never fails: errors become
    /// `TurnStatus::Error`, with `state` left as far as it progressed.
    pub fn process_turn<R: Rng + ?Sized>(&self, state: &mut GameState, rng: &mut R) -> TurnReport {
        let turn = state.current_turn;

        if state.has_pending_event() {
            let err = EngineError::EventPending;
            warn!(player = state.player_id, turn, pending = state.pending_events.len(), "turn blocked");
            return TurnReport::error(turn, Vec::new(), Changeset::new(), &err);
        }

        info!(player = state.player_id, turn, "turn start");
        let events = generate_events(state, &self.config, rng);

        let metrics_changed = match apply_turn_metrics(state, &self.config, rng) {
            Ok(changes) => changes,
            Err(e) => {
                error!(player = state.player_id, turn, error = %e, "turn failed");
                return TurnReport::error(turn, events, Changeset::new(), &e);
            }
        };

        if let Err(e) = try_validate_invariants(state) {
            error!(player = state.player_id, turn, error = %e, "turn left state invalid");
            return TurnReport::error(turn, events, metrics_changed, &e);
        }

        let status = match evaluate_outcome(state) {
            Outcome::Win => TurnStatus::Win,
            Outcome::Lose => TurnStatus::Lose,
            Outcome::Ongoing => TurnStatus::Success,
        };
        info!(
            player = state.player_id,
            turn,
            events = events.len(),
            users = state.active_users,
            budget = state.budget,
            status = ?status,
            "turn finished"
        );

        TurnReport {
            turn,
            events,
            metrics_changed,
            status,
            message: None,
        }
    }

    pub fn resolve_event_choice(&self, state: &mut GameState, choice_index: usize) -> EngineResult<ChoiceOutcome> {
        resolve_event_choice(state, choice_index).map_err(|e| {
            if e.is_validation() {
                warn!(player = state.player_id, choice = choice_index, error = %e, "choice rejected");
            } else {
                error!(player = state.player_id, choice = choice_index, error = %e, "resolution failed");
            }
            e
        })
    }

    pub fn perform_action(&self, state: &mut GameState, action: &PlayerAction) -> EngineResult<ActionReceipt> {
        apply_action(state, &self.config, action).map_err(|e| {
            warn!(player = state.player_id, action = %action, error = %e, "action rejected");
            e
        })
    }

    pub fn advance_turn(&self, state: &mut GameState) {
        advance_turn(state, &self.config);
    }

    pub fn evaluate_score(&self, state: &GameState) -> i64 {
        evaluate_score(state)
    }
}
