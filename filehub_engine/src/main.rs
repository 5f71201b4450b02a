/// FileHub Engine — Headless Autoplay
///
/// Plays one game with a fixed policy and prints a JSON summary.
///
///   filehub-autoplay [seed] [turns] [config.json]
///
/// Policy per turn: request donations, keep one social-media campaign
/// running while affordable, resolve every event with its first choice.

use std::path::Path;
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};

use filehub_engine::actions::{CommunityAction, PlayerAction};
use filehub_engine::config::GameConfig;
use filehub_engine::domain::{CampaignLevel, CampaignType, GameState};
use filehub_engine::hashing::canonical_hash;
use filehub_engine::names::generate_options;
use filehub_engine::{GameEngine, TurnStatus};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_TURNS: u32 = 30;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let seed = match args.get(1).map(|s| s.parse::<u64>()) {
        None => DEFAULT_SEED,
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed {:?}: {}", args[1], e);
            return ExitCode::from(2);
        }
    };
    let turns = match args.get(2).map(|s| s.parse::<u32>()) {
        None => DEFAULT_TURNS,
        Some(Ok(turns)) => turns,
        Some(Err(e)) => {
            eprintln!("invalid turn count {:?}: {}", args[2], e);
            return ExitCode::from(2);
        }
    };
    let config = match args.get(3) {
        None => GameConfig::default(),
        Some(path) => match GameConfig::from_json_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        },
    };

    match autoplay(GameEngine::new(config), seed, turns) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!(%message, "autoplay aborted");
            ExitCode::FAILURE
        }
    }
}

fn autoplay(engine: GameEngine, seed: u64, turns: u32) -> Result<String, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = engine.new_game(seed);

    let (name, domain) = generate_options(&mut rng, 1)
        .into_iter()
        .next()
        .ok_or_else(|| "name generator produced no option".to_string())?;
    engine
        .perform_action(&mut state, &PlayerAction::SetupHub { name, domain })
        .map_err(|e| e.to_string())?;

    let mut status = TurnStatus::Success;
    let mut played = 0;
    while played < turns {
        play_actions(&engine, &mut state);

        let report = engine.process_turn(&mut state, &mut rng);
        played += 1;
        status = report.status;
        for event in &report.events {
            info!(turn = report.turn, kind = event.kind.key(), "{}", event.description);
        }
        while state.has_pending_event() {
            engine.resolve_event_choice(&mut state, 0).map_err(|e| e.to_string())?;
        }
        match report.status {
            TurnStatus::Error => return Err(report.message.unwrap_or_default()),
            TurnStatus::Win | TurnStatus::Lose => break,
            TurnStatus::Success => engine.advance_turn(&mut state),
        }
    }

    let hash = canonical_hash(&state).map_err(|e| e.to_string())?;
    let summary = json!({
        "seed": seed,
        "turns_played": played,
        "status": status,
        "hub": state.hub_name,
        "domain": state.domain_name,
        "active_users": state.active_users,
        "budget": state.budget,
        "score": engine.evaluate_score(&state),
        "state_hash": hash,
    });
    serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())
}

fn play_actions(engine: &GameEngine, state: &mut GameState) {
    let donations = PlayerAction::Community(CommunityAction::RequestDonations);
    if let Err(e) = engine.perform_action(state, &donations) {
        debug!(action = %donations, error = %e, "autoplay step skipped");
    }

    if state.active_campaigns().next().is_none() {
        let campaign = PlayerAction::StartCampaign(CampaignType::SocialMedia, CampaignLevel::Small);
        // unaffordable campaigns are skipped until donations catch up
        if let Err(e) = engine.perform_action(state, &campaign) {
            debug!(action = %campaign, error = %e, "autoplay step skipped");
        }
    }
}
