/// FileHub Engine — Player Actions
///
/// Discrete, player-initiated mutations between turns. Every action
/// validates fully before writing, so a failed action leaves state as it
/// was. Gameplay actions spend one of the turn's action points; setup and
/// domain changes are free.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arithmetic::{checked_add, checked_mul, checked_sub, clamp_percent};
use crate::config::GameConfig;
use crate::domain::{
    Campaign, CampaignLevel, CampaignType, GameState, HostingRegion, InfraLevel, SetupStep, Staff,
    StaffRole, Subsystem,
};
use crate::error::{EngineError, EngineResult};
use crate::names::check_domain;

/// Longest accepted hub name, in characters.
pub const MAX_HUB_NAME_LEN: usize = 64;

/// Transparency / cooperation bonus from the matching legal action.
pub const LEGAL_SCORE_BONUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalAction {
    HireLawyers,
    IncreaseTransparency,
    CooperateRightsHolders,
}

impl LegalAction {
    pub const ALL: [LegalAction; 3] = [
        LegalAction::HireLawyers,
        LegalAction::IncreaseTransparency,
        LegalAction::CooperateRightsHolders,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LegalAction::HireLawyers => "hire_lawyers",
            LegalAction::IncreaseTransparency => "increase_transparency",
            LegalAction::CooperateRightsHolders => "cooperate_rights_holders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityAction {
    HostEvent,
    RequestDonations,
}

impl CommunityAction {
    pub const ALL: [CommunityAction; 2] = [CommunityAction::HostEvent, CommunityAction::RequestDonations];

    pub fn key(self) -> &'static str {
        match self {
            CommunityAction::HostEvent => "host_event",
            CommunityAction::RequestDonations => "request_donations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    HireStaff(StaffRole),
    UpgradeInfrastructure(Subsystem, InfraLevel),
    AddHostingRegion(HostingRegion),
    StartCampaign(CampaignType, CampaignLevel),
    Legal(LegalAction),
    Community(CommunityAction),
    SetupHub { name: String, domain: String },
    ChangeDomain(String),
    AddMirror(String),
}

impl PlayerAction {
    /// Whether the action spends one of the turn's action points.
    pub fn consumes_action(&self) -> bool {
        !matches!(
            self,
            PlayerAction::SetupHub { .. } | PlayerAction::ChangeDomain(_)
        )
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::HireStaff(role) => write!(f, "hire_{}", role.key()),
            PlayerAction::UpgradeInfrastructure(s, l) => write!(f, "upgrade_{}_{}", s.key(), l.key()),
            PlayerAction::AddHostingRegion(r) => write!(f, "add_hosting_{}", r.key()),
            PlayerAction::StartCampaign(t, l) => write!(f, "campaign_{}_{}", t.key(), l.key()),
            PlayerAction::Legal(a) => write!(f, "legal_{}", a.key()),
            PlayerAction::Community(a) => write!(f, "community_{}", a.key()),
            PlayerAction::SetupHub { name, domain } => write!(f, "setup_hub({}, {})", name, domain),
            PlayerAction::ChangeDomain(d) => write!(f, "change_domain({})", d),
            PlayerAction::AddMirror(d) => write!(f, "add_mirror({})", d),
        }
    }
}

/// Parses the presentation layer's action keys (`hire_CTO`,
/// `upgrade_server_advanced`, `campaign_paid_ads_medium`, ...). Actions
/// that carry free text are built directly, not parsed.
impl FromStr for PlayerAction {
    type Err = EngineError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let unknown = || EngineError::UnknownAction(key.to_string());

        if let Some(role) = key.strip_prefix("hire_") {
            return StaffRole::from_key(role).map(PlayerAction::HireStaff).ok_or_else(unknown);
        }
        if let Some(rest) = key.strip_prefix("upgrade_") {
            let (subsystem, level) = rest.split_once('_').ok_or_else(unknown)?;
            return match (Subsystem::from_key(subsystem), InfraLevel::from_key(level)) {
                (Some(s), Some(l)) => Ok(PlayerAction::UpgradeInfrastructure(s, l)),
                _ => Err(unknown()),
            };
        }
        if let Some(region) = key.strip_prefix("add_hosting_") {
            return HostingRegion::from_key(region)
                .map(PlayerAction::AddHostingRegion)
                .ok_or_else(unknown);
        }
        if let Some(rest) = key.strip_prefix("campaign_") {
            // type keys contain underscores; the level is the last segment
            let (campaign_type, level) = rest.rsplit_once('_').ok_or_else(unknown)?;
            return match (CampaignType::from_key(campaign_type), CampaignLevel::from_key(level)) {
                (Some(t), Some(l)) => Ok(PlayerAction::StartCampaign(t, l)),
                _ => Err(unknown()),
            };
        }
        if let Some(action) = key.strip_prefix("legal_") {
            return LegalAction::ALL
                .into_iter()
                .find(|a| a.key() == action)
                .map(PlayerAction::Legal)
                .ok_or_else(unknown);
        }
        if let Some(action) = key.strip_prefix("community_") {
            return CommunityAction::ALL
                .into_iter()
                .find(|a| a.key() == action)
                .map(PlayerAction::Community)
                .ok_or_else(unknown);
        }
        Err(unknown())
    }
}

/// What an accepted action did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReceipt {
    pub action: String,
    /// Net budget change; positive for income.
    pub budget_delta: i64,
    pub detail: String,
}

// ── Staff roster ───────────────────────────────────────────────────

fn roster(role: StaffRole) -> [&'static str; 3] {
    match role {
        StaffRole::Cto => ["Alexander Tekhnikov", "Dmitry Koderov", "Igor Serverov"],
        StaffRole::Cmo => ["Elena Marketologova", "Anna Reklamova", "Maria Promo"],
        StaffRole::Coo => ["Mikhail Operatsioner", "Alexey Protsessov", "Pavel Avtomatizator"],
        StaffRole::Clo => ["Vladimir Yuridikov", "Sergey Pravovedov", "Andrey Komplaens"],
        StaffRole::CommunityManager => ["Natalia Kommyuniti", "Ekaterina Soobshchestva", "Olga Obshcheniya"],
        StaffRole::DataAnalyst => ["Oleg Analitikov", "Irina Dannykh", "Tatiana Metrik"],
    }
}

/// Deterministic per player and role.
fn staff_name(state: &GameState, role: StaffRole) -> &'static str {
    let names = roster(role);
    let role_index = StaffRole::ALL.iter().position(|r| *r == role).unwrap_or(0) as u64;
    let idx = state.player_id.wrapping_add(role_index) % names.len() as u64;
    names[idx as usize]
}

// ── Application ────────────────────────────────────────────────────

fn ensure_budget(state: &GameState, cost: i64) -> EngineResult<()> {
    if state.budget < cost {
        return Err(EngineError::InsufficientBudget {
            required: cost,
            available: state.budget,
        });
    }
    Ok(())
}

/// Validate and apply `action` to `state`.
pub fn apply_action(
    state: &mut GameState,
    config: &GameConfig,
    action: &PlayerAction,
) -> EngineResult<ActionReceipt> {
    if action.consumes_action() && state.actions_remaining == 0 {
        return Err(EngineError::NoActionsRemaining);
    }

    let (budget_delta, detail) = match action {
        PlayerAction::HireStaff(role) => hire_staff(state, config, *role)?,
        PlayerAction::UpgradeInfrastructure(s, l) => upgrade_infrastructure(state, config, *s, *l)?,
        PlayerAction::AddHostingRegion(r) => add_hosting_region(state, config, *r)?,
        PlayerAction::StartCampaign(t, l) => start_campaign(state, config, *t, *l)?,
        PlayerAction::Legal(a) => legal_action(state, config, *a)?,
        PlayerAction::Community(a) => community_action(state, config, *a)?,
        PlayerAction::SetupHub { name, domain } => setup_hub(state, name, domain)?,
        PlayerAction::ChangeDomain(domain) => change_domain(state, config, domain)?,
        PlayerAction::AddMirror(domain) => add_mirror(state, config, domain)?,
    };

    if action.consumes_action() {
        state.actions_remaining -= 1;
    }

    info!(
        player = state.player_id,
        action = %action,
        budget_delta,
        budget = state.budget,
        actions_remaining = state.actions_remaining,
        "action applied"
    );

    Ok(ActionReceipt {
        action: action.to_string(),
        budget_delta,
        detail,
    })
}

fn hire_staff(state: &mut GameState, config: &GameConfig, role: StaffRole) -> EngineResult<(i64, String)> {
    if state.is_hired(role) {
        return Err(EngineError::AlreadyHired(role));
    }
    let salary = config.staff_salaries.salary(role);
    ensure_budget(state, salary)?;
    let budget = checked_sub(state.budget, salary)?;
    let staff_cost = checked_add(state.expenses.staff_cost, salary)?;

    let name = staff_name(state, role);
    state.staff.insert(
        role,
        Staff {
            role,
            name: name.to_string(),
            skill_level: 1,
            salary,
            hired: true,
            hired_turn: Some(state.current_turn),
        },
    );
    state.budget = budget;
    state.expenses.staff_cost = staff_cost;
    Ok((-salary, format!("{} hired as {}", name, role)))
}

fn upgrade_infrastructure(
    state: &mut GameState,
    config: &GameConfig,
    subsystem: Subsystem,
    level: InfraLevel,
) -> EngineResult<(i64, String)> {
    if state.infrastructure.level(subsystem) >= level {
        return Err(EngineError::AlreadyAtLevel);
    }
    let cost = config.infrastructure_costs.cost(subsystem, level);
    ensure_budget(state, cost)?;
    let budget = checked_sub(state.budget, cost)?;
    let infra_cost = checked_add(state.expenses.infrastructure_cost, cost)?;

    state.infrastructure.set_level(subsystem, level);
    state.budget = budget;
    state.expenses.infrastructure_cost = infra_cost;
    Ok((-cost, format!("{} upgraded to {}", subsystem.key(), level.key())))
}

fn add_hosting_region(
    state: &mut GameState,
    config: &GameConfig,
    region: HostingRegion,
) -> EngineResult<(i64, String)> {
    if state.hosting.regions.contains_key(&region) {
        return Err(EngineError::RegionAlreadyHosted);
    }
    let cost = config.hosting_costs.cost(region, InfraLevel::Basic);
    ensure_budget(state, cost)?;
    let budget = checked_sub(state.budget, cost)?;
    let hosting_cost = checked_add(state.expenses.hosting_cost, cost)?;

    state.hosting.regions.insert(region, InfraLevel::Basic);
    state.hosting.mirror_count = state.hosting.mirror_count.saturating_add(1);
    state.budget = budget;
    state.expenses.hosting_cost = hosting_cost;
    Ok((-cost, format!("hosting added in {}", region.key())))
}

fn start_campaign(
    state: &mut GameState,
    config: &GameConfig,
    campaign_type: CampaignType,
    level: CampaignLevel,
) -> EngineResult<(i64, String)> {
    let key = format!("{}_{}", campaign_type.key(), level.key());
    let cost = config
        .marketing_costs
        .cost(campaign_type, level)
        .ok_or_else(|| EngineError::UnknownAction(format!("campaign_{}", key)))?;
    ensure_budget(state, cost)?;
    let budget = checked_sub(state.budget, cost)?;
    let ad_spend = checked_add(state.marketing.ad_spend, cost)?;
    let marketing_cost = checked_add(state.expenses.marketing_cost, cost)?;

    state.marketing.campaigns.insert(
        key.clone(),
        Campaign {
            campaign_type,
            level,
            start_turn: state.current_turn,
            duration: config.game.campaign_duration,
            cost,
        },
    );
    state.budget = budget;
    state.marketing.ad_spend = ad_spend;
    state.expenses.marketing_cost = marketing_cost;
    Ok((-cost, format!("campaign {} started", key)))
}

fn legal_action(state: &mut GameState, config: &GameConfig, action: LegalAction) -> EngineResult<(i64, String)> {
    let params = match action {
        LegalAction::HireLawyers => config.legal_actions.hire_lawyers,
        LegalAction::IncreaseTransparency => config.legal_actions.increase_transparency,
        LegalAction::CooperateRightsHolders => config.legal_actions.cooperate_rights_holders,
    };
    ensure_budget(state, params.cost)?;
    let budget = checked_sub(state.budget, params.cost)?;
    let legal_cost = checked_add(state.expenses.legal_cost, params.cost)?;

    let legal = &mut state.legal;
    legal.risk_level = clamp_percent(legal.risk_level + params.risk_delta);
    match action {
        LegalAction::IncreaseTransparency => {
            legal.transparency_score = clamp_percent(legal.transparency_score + LEGAL_SCORE_BONUS);
        }
        LegalAction::CooperateRightsHolders => {
            legal.cooperation_level = clamp_percent(legal.cooperation_level + LEGAL_SCORE_BONUS);
        }
        LegalAction::HireLawyers => {}
    }
    state.budget = budget;
    state.expenses.legal_cost = legal_cost;
    Ok((-params.cost, format!("legal action {}", action.key())))
}

fn community_action(
    state: &mut GameState,
    config: &GameConfig,
    action: CommunityAction,
) -> EngineResult<(i64, String)> {
    let c = &config.community_actions;
    match action {
        CommunityAction::HostEvent => {
            ensure_budget(state, c.host_event_cost)?;
            let budget = checked_sub(state.budget, c.host_event_cost)?;
            let community = &mut state.community;
            community.community_health = clamp_percent(community.community_health + c.host_event_health_delta);
            community.toxicity = clamp_percent(community.toxicity + c.host_event_toxicity_delta);
            community.events_hosted = community.events_hosted.saturating_add(1);
            state.budget = budget;
            Ok((-c.host_event_cost, "community event hosted".to_string()))
        }
        CommunityAction::RequestDonations => {
            let amount = checked_mul(state.active_users, c.donation_per_user)?.max(c.donation_floor);
            let monthly = checked_add(state.community.monthly_donations, amount)?;
            let budget = checked_add(state.budget, amount)?;
            state.community.monthly_donations = monthly;
            state.budget = budget;
            Ok((amount, format!("community donated {}", amount)))
        }
    }
}

fn setup_hub(state: &mut GameState, name: &str, domain: &str) -> EngineResult<(i64, String)> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_HUB_NAME_LEN {
        return Err(EngineError::InvalidHubName(name.to_string()));
    }
    check_domain(domain)?;

    state.hub_name = name.to_string();
    state.domain_name = domain.to_string();
    state.available_domains = vec![domain.to_string()];
    state.setup_step = SetupStep::Complete;
    state.setup_complete = true;
    Ok((0, format!("{} is live at {}", name, domain)))
}

fn change_domain(state: &mut GameState, config: &GameConfig, domain: &str) -> EngineResult<(i64, String)> {
    if !state.setup_complete {
        return Err(EngineError::SetupIncomplete);
    }
    check_domain(domain)?;
    let cost = config.game.domain_change_cost;
    ensure_budget(state, cost)?;
    let budget = checked_sub(state.budget, cost)?;

    if !state.available_domains.iter().any(|d| d == domain) {
        state.available_domains.push(domain.to_string());
    }
    state.domain_name = domain.to_string();
    state.domain_blocked = false;
    state.budget = budget;
    Ok((-cost, format!("domain changed to {}", domain)))
}

fn add_mirror(state: &mut GameState, config: &GameConfig, domain: &str) -> EngineResult<(i64, String)> {
    if !state.setup_complete {
        return Err(EngineError::SetupIncomplete);
    }
    check_domain(domain)?;
    if state.available_domains.iter().any(|d| d == domain) {
        return Err(EngineError::InvalidDomain(domain.to_string()));
    }
    let cost = config.game.mirror_creation_cost;
    ensure_budget(state, cost)?;
    let budget = checked_sub(state.budget, cost)?;

    state.available_domains.push(domain.to_string());
    state.hosting.mirror_count = state.hosting.mirror_count.saturating_add(1);
    state.budget = budget;
    Ok((-cost, format!("mirror {} created", domain)))
}

/// Move to the next turn and restore the action points.
pub fn advance_turn(state: &mut GameState, config: &GameConfig) {
    state.current_turn = state.current_turn.saturating_add(1);
    state.actions_remaining = config.game.actions_per_turn;
    info!(player = state.player_id, turn = state.current_turn, "turn advanced");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    fn fresh() -> GameState {
        create_initial_state(1, &GameConfig::default())
    }

    fn act(state: &mut GameState, key: &str) -> EngineResult<ActionReceipt> {
        let action: PlayerAction = key.parse()?;
        apply_action(state, &GameConfig::default(), &action)
    }

    fn set_up(state: &mut GameState) {
        let action = PlayerAction::SetupHub {
            name: "File Club".into(),
            domain: "fileclub.com".into(),
        };
        apply_action(state, &GameConfig::default(), &action).unwrap();
    }

    #[test]
    fn parses_every_key_shape() {
        assert_eq!("hire_CTO".parse::<PlayerAction>().unwrap(), PlayerAction::HireStaff(StaffRole::Cto));
        assert_eq!(
            "hire_COMMUNITY_MANAGER".parse::<PlayerAction>().unwrap(),
            PlayerAction::HireStaff(StaffRole::CommunityManager)
        );
        assert_eq!(
            "upgrade_server_advanced".parse::<PlayerAction>().unwrap(),
            PlayerAction::UpgradeInfrastructure(Subsystem::Server, InfraLevel::Advanced)
        );
        assert_eq!(
            "campaign_paid_ads_medium".parse::<PlayerAction>().unwrap(),
            PlayerAction::StartCampaign(CampaignType::PaidAds, CampaignLevel::Medium)
        );
        assert_eq!(
            "add_hosting_usa".parse::<PlayerAction>().unwrap(),
            PlayerAction::AddHostingRegion(HostingRegion::Usa)
        );
        assert_eq!(
            "legal_hire_lawyers".parse::<PlayerAction>().unwrap(),
            PlayerAction::Legal(LegalAction::HireLawyers)
        );
        assert_eq!(
            "community_request_donations".parse::<PlayerAction>().unwrap(),
            PlayerAction::Community(CommunityAction::RequestDonations)
        );
    }

    #[test]
    fn display_round_trips_keyed_actions() {
        for key in ["hire_DATA_ANALYST", "upgrade_security_enterprise", "campaign_social_media_large"] {
            assert_eq!(key.parse::<PlayerAction>().unwrap().to_string(), key);
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        for key in ["hire_CEO", "upgrade_server", "campaign_tv_small", "campaign_paid_ads_huge", "dance"] {
            assert_eq!(
                key.parse::<PlayerAction>().unwrap_err(),
                EngineError::UnknownAction(key.to_string())
            );
        }
    }

    #[test]
    fn hire_charges_salary_and_is_idempotent_guarded() {
        let mut state = fresh();
        let receipt = act(&mut state, "hire_COO").unwrap();
        assert_eq!(receipt.budget_delta, -100_000);
        assert_eq!(state.budget, 0);
        assert_eq!(state.expenses.staff_cost, 100_000);
        assert!(state.is_hired(StaffRole::Coo));
        assert_eq!(state.actions_remaining, 2);

        state.budget = 500_000;
        assert_eq!(act(&mut state, "hire_COO").unwrap_err(), EngineError::AlreadyHired(StaffRole::Coo));
        assert_eq!(state.hired_count(), 1);
    }

    #[test]
    fn failed_action_leaves_state_unmodified() {
        let mut state = fresh();
        let before = state.clone();
        let err = act(&mut state, "hire_CTO").unwrap_err();
        assert_eq!(err, EngineError::InsufficientBudget { required: 150_000, available: 100_000 });
        assert_eq!(state, before);
    }

    #[test]
    fn upgrade_must_raise_level() {
        let mut state = fresh();
        act(&mut state, "upgrade_storage_advanced").unwrap();
        assert_eq!(state.infrastructure.storage_level, InfraLevel::Advanced);
        assert_eq!(state.expenses.infrastructure_cost, 75_000);
        assert_eq!(act(&mut state, "upgrade_storage_advanced").unwrap_err(), EngineError::AlreadyAtLevel);
        assert_eq!(act(&mut state, "upgrade_storage_basic").unwrap_err(), EngineError::AlreadyAtLevel);
    }

    #[test]
    fn hosting_region_adds_mirror_once() {
        let mut state = fresh();
        act(&mut state, "add_hosting_netherlands").unwrap();
        assert_eq!(state.hosting.mirror_count, 2);
        assert_eq!(state.expenses.hosting_cost, 30_000);
        assert_eq!(state.hosting.regions.get(&HostingRegion::Netherlands), Some(&InfraLevel::Basic));
        assert_eq!(act(&mut state, "add_hosting_russia").unwrap_err(), EngineError::RegionAlreadyHosted);
    }

    #[test]
    fn campaign_records_window_and_spend() {
        let mut state = fresh();
        state.current_turn = 6;
        act(&mut state, "campaign_paid_ads_small").unwrap();
        let c = &state.marketing.campaigns["paid_ads_small"];
        assert_eq!((c.start_turn, c.duration, c.cost), (6, 3, 25_000));
        assert_eq!(state.marketing.ad_spend, 25_000);
        assert_eq!(state.expenses.marketing_cost, 25_000);
        assert_eq!(state.budget, 75_000);
    }

    #[test]
    fn legal_actions_lower_risk() {
        let mut state = fresh();
        act(&mut state, "legal_increase_transparency").unwrap();
        assert_eq!(state.legal.risk_level, 20.0);
        assert_eq!(state.legal.transparency_score, 60.0);
        assert_eq!(state.expenses.legal_cost, 20_000);
    }

    #[test]
    fn donations_have_a_floor() {
        let mut state = fresh();
        let receipt = act(&mut state, "community_request_donations").unwrap();
        assert_eq!(receipt.budget_delta, 1_000);
        assert_eq!(state.budget, 101_000);
        assert_eq!(state.community.monthly_donations, 1_000);

        state.active_users = 5_000;
        act(&mut state, "community_request_donations").unwrap();
        assert_eq!(state.community.monthly_donations, 51_000);
    }

    #[test]
    fn action_points_run_out() {
        let mut state = fresh();
        for _ in 0..3 {
            act(&mut state, "community_request_donations").unwrap();
        }
        assert_eq!(act(&mut state, "community_request_donations").unwrap_err(), EngineError::NoActionsRemaining);

        advance_turn(&mut state, &GameConfig::default());
        assert_eq!(state.current_turn, 1);
        assert_eq!(state.actions_remaining, 3);
    }

    #[test]
    fn setup_and_domain_changes_are_free_of_action_points() {
        let mut state = fresh();
        assert_eq!(
            apply_action(&mut state, &GameConfig::default(), &PlayerAction::ChangeDomain("new.net".into())).unwrap_err(),
            EngineError::SetupIncomplete
        );
        set_up(&mut state);
        assert!(state.setup_complete);
        assert_eq!(state.available_domains, vec!["fileclub.com".to_string()]);

        state.domain_blocked = true;
        apply_action(&mut state, &GameConfig::default(), &PlayerAction::ChangeDomain("fileclub2.net".into())).unwrap();
        assert_eq!(state.domain_name, "fileclub2.net");
        assert!(!state.domain_blocked);
        assert_eq!(state.budget, 95_000);
        assert_eq!(state.actions_remaining, 3);
    }

    #[test]
    fn setup_rejects_bad_input() {
        let mut state = fresh();
        let config = GameConfig::default();
        let bad_domain = PlayerAction::SetupHub { name: "Hub".into(), domain: "nope".into() };
        assert_eq!(
            apply_action(&mut state, &config, &bad_domain).unwrap_err(),
            EngineError::InvalidDomain("nope".into())
        );
        let bad_name = PlayerAction::SetupHub { name: "  ".into(), domain: "ok.com".into() };
        assert!(matches!(apply_action(&mut state, &config, &bad_name), Err(EngineError::InvalidHubName(_))));
        let long_name = PlayerAction::SetupHub {
            name: "X".repeat(MAX_HUB_NAME_LEN + 1),
            domain: "ok.com".into(),
        };
        assert!(matches!(apply_action(&mut state, &config, &long_name), Err(EngineError::InvalidHubName(_))));
        assert!(!state.setup_complete);
        assert_eq!(state.hub_name, crate::state::UNSET_HUB_NAME);

        let widest = "Ж".repeat(MAX_HUB_NAME_LEN);
        let at_limit = PlayerAction::SetupHub { name: widest.clone(), domain: "ok.com".into() };
        apply_action(&mut state, &config, &at_limit).unwrap();
        assert_eq!(state.hub_name, widest);
    }

    #[test]
    fn mirror_is_added_once() {
        let mut state = fresh();
        set_up(&mut state);
        let config = GameConfig::default();
        let before = state.actions_remaining;
        apply_action(&mut state, &config, &PlayerAction::AddMirror("spare.io".into())).unwrap();
        assert_eq!(state.actions_remaining, before - 1);
        assert_eq!(state.available_domains.len(), 2);
        assert_eq!(state.hosting.mirror_count, 2);
        assert_eq!(
            apply_action(&mut state, &config, &PlayerAction::AddMirror("spare.io".into())).unwrap_err(),
            EngineError::InvalidDomain("spare.io".into())
        );
    }

    #[test]
    fn staff_names_are_deterministic() {
        let mut a = fresh();
        let mut b = fresh();
        a.budget = 1_000_000;
        b.budget = 1_000_000;
        act(&mut a, "hire_CLO").unwrap();
        act(&mut b, "hire_CLO").unwrap();
        assert_eq!(a.staff[&StaffRole::Clo].name, b.staff[&StaffRole::Clo].name);
    }
}
