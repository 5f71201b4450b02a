/// FileHub Engine — State Construction

use std::collections::{BTreeMap, VecDeque};

use crate::config::GameConfig;
use crate::domain::{
    Community, Expenses, Financial, GameState, Hosting, Infrastructure, Legal, Marketing,
    PlayerId, Revenue, SetupStep,
};

/// Placeholder identity until the player completes setup.
pub const UNSET_HUB_NAME: &str = "Setup required";
pub const UNSET_DOMAIN: &str = "setup-required.com";

/// Create a fresh game for `player_id`, awaiting hub setup.
pub fn create_initial_state(player_id: PlayerId, config: &GameConfig) -> GameState {
    let g = &config.game;
    GameState {
        player_id,
        hub_name: UNSET_HUB_NAME.to_string(),
        domain_name: UNSET_DOMAIN.to_string(),
        available_domains: Vec::new(),
        domain_blocked: false,
        domain_block_history: Vec::new(),
        last_domain_block_turn: 0,
        next_domain_check_turn: g.first_domain_check_turn,
        setup_complete: false,
        setup_step: SetupStep::Name,

        budget: g.starting_budget,
        active_users: g.starting_users,
        mau: g.starting_mau,
        current_turn: 0,
        total_turns: g.total_turns,
        actions_remaining: g.actions_per_turn,

        staff: BTreeMap::new(),
        infrastructure: Infrastructure::default(),
        hosting: Hosting::default(),
        marketing: Marketing::default(),
        community: Community::default(),
        legal: Legal::default(),
        revenue: Revenue::default(),
        expenses: Expenses::default(),
        financial: Financial::default(),

        events: Vec::new(),
        pending_events: VecDeque::new(),
        next_event_id: 1,
    }
}
