/// FileHub Engine — Event Resolution
///
/// Resolves the head of the pending queue with a zero-based choice and
/// applies the fixed effect cell for `(kind, choice)`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arithmetic::{checked_add, checked_mul, clamp_nps, clamp_percent};
use crate::domain::{GameState, Subsystem};
use crate::error::{EngineError, EngineResult};
use crate::events::EventKind;

/// One cell entry of the effect table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "delta", rename_all = "snake_case")]
pub enum Effect {
    Budget(i64),
    ActiveUsers(i64),
    NpsScore(f64),
    LegalRisk(f64),
    Uptime(f64),
    BrandAwareness(f64),
    ConversionRate(f64),
    /// One tier up, capped at enterprise.
    AdvanceTier(Subsystem),
    /// Thousands of currency added to total revenue.
    Revenue(i64),
    /// Move off a blocked domain onto a known mirror.
    SwitchToMirror,
}

type EffectRow = [&'static [Effect]; 3];

// ── Effect table ───────────────────────────────────────────────────

static DDOS_ATTACK: EffectRow = [
    &[Effect::AdvanceTier(Subsystem::Security), Effect::Budget(-50_000)],
    &[Effect::Uptime(10.0), Effect::Budget(-30_000)],
    &[Effect::ActiveUsers(-30), Effect::NpsScore(-15.0)],
];

static SERVER_OUTAGE: EffectRow = [
    &[Effect::Uptime(15.0), Effect::Budget(-25_000)],
    &[Effect::AdvanceTier(Subsystem::Server), Effect::Budget(-100_000)],
    &[Effect::Uptime(25.0), Effect::Budget(-75_000)],
];

static VIRAL_GROWTH: EffectRow = [
    &[Effect::ActiveUsers(50), Effect::Budget(-40_000)],
    &[Effect::ActiveUsers(80), Effect::Budget(-60_000)],
    &[Effect::ActiveUsers(20)],
];

static COMPETITOR_LAUNCH: EffectRow = [
    &[Effect::NpsScore(15.0), Effect::Budget(-50_000)],
    &[Effect::ConversionRate(10.0), Effect::Budget(-20_000)],
    &[],
];

static REGULATORY_CHECK: EffectRow = [
    &[Effect::LegalRisk(-15.0)],
    &[Effect::LegalRisk(-10.0), Effect::Budget(-40_000)],
    &[Effect::LegalRisk(20.0)],
];

static INFLUENCER_MENTION: EffectRow = [
    &[Effect::BrandAwareness(40.0), Effect::Budget(-30_000)],
    &[Effect::ActiveUsers(60), Effect::Budget(-80_000)],
    &[Effect::BrandAwareness(10.0)],
];

static SECURITY_BREACH: EffectRow = [
    &[Effect::NpsScore(20.0), Effect::Budget(-60_000)],
    &[Effect::LegalRisk(10.0), Effect::Budget(-30_000)],
    &[Effect::AdvanceTier(Subsystem::Security), Effect::Budget(-120_000)],
];

static PARTNERSHIP_OFFER: EffectRow = [
    &[Effect::Revenue(25), Effect::NpsScore(15.0), Effect::Budget(-10_000)],
    &[Effect::NpsScore(5.0)],
    &[Effect::Revenue(35), Effect::NpsScore(20.0), Effect::Budget(-20_000)],
];

// manual entry and generator both wait for a domain change
static DOMAIN_BLOCKED: EffectRow = [&[], &[], &[Effect::SwitchToMirror]];

pub fn effect_row(kind: EventKind) -> &'static EffectRow {
    match kind {
        EventKind::DdosAttack => &DDOS_ATTACK,
        EventKind::ServerOutage => &SERVER_OUTAGE,
        EventKind::ViralGrowth => &VIRAL_GROWTH,
        EventKind::CompetitorLaunch => &COMPETITOR_LAUNCH,
        EventKind::RegulatoryCheck => &REGULATORY_CHECK,
        EventKind::InfluencerMention => &INFLUENCER_MENTION,
        EventKind::SecurityBreach => &SECURITY_BREACH,
        EventKind::PartnershipOffer => &PARTNERSHIP_OFFER,
        EventKind::DomainBlocked => &DOMAIN_BLOCKED,
    }
}

/// What a successful resolution did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOutcome {
    pub event_id: u64,
    pub kind: EventKind,
    pub choice_index: usize,
    pub choice_text: String,
    pub applied_effects: Vec<Effect>,
    /// Set when the choice moved the hub to a mirror domain.
    pub new_domain: Option<String>,
}

/// Resolve the head of the pending queue.
///
/// Validation failures leave `state` untouched. Once validation passes the
/// event is marked resolved before effects are applied.
pub fn resolve_event_choice(state: &mut GameState, choice_index: usize) -> EngineResult<ChoiceOutcome> {
    let event_id = *state.pending_events.front().ok_or(EngineError::NoPendingEvent)?;
    let event = state.event(event_id).ok_or(EngineError::NoPendingEvent)?;
    if event.resolved {
        return Err(EngineError::NoPendingEvent);
    }
    let choice_text = event
        .choices
        .get(choice_index)
        .cloned()
        .ok_or(EngineError::InvalidChoice {
            index: choice_index,
            available: event.choices.len(),
        })?;
    let kind = event.kind;

    state.pending_events.pop_front();
    if let Some(event) = state.event_mut(event_id) {
        event.resolved = true;
        event.selected_choice = Some(choice_text.clone());
    }

    let row = effect_row(kind);
    let cell: &[Effect] = row.get(choice_index).copied().unwrap_or(&[]);
    let mut applied_effects = Vec::with_capacity(cell.len());
    let mut new_domain = None;
    for effect in cell {
        match apply_effect(state, *effect)? {
            Applied::Yes => applied_effects.push(*effect),
            Applied::Domain(domain) => {
                applied_effects.push(*effect);
                new_domain = Some(domain);
            }
            Applied::No => {}
        }
    }

    info!(
        player = state.player_id,
        event = event_id,
        kind = kind.key(),
        choice = choice_index,
        effects = applied_effects.len(),
        "event resolved"
    );

    Ok(ChoiceOutcome {
        event_id,
        kind,
        choice_index,
        choice_text,
        applied_effects,
        new_domain,
    })
}

enum Applied {
    Yes,
    Domain(String),
    No,
}

fn apply_effect(state: &mut GameState, effect: Effect) -> EngineResult<Applied> {
    match effect {
        Effect::Budget(d) => state.budget = checked_add(state.budget, d)?,
        Effect::ActiveUsers(d) => state.active_users = checked_add(state.active_users, d)?.max(0),
        Effect::NpsScore(d) => state.marketing.nps_score = clamp_nps(state.marketing.nps_score + d),
        Effect::LegalRisk(d) => state.legal.risk_level = clamp_percent(state.legal.risk_level + d),
        Effect::Uptime(d) => {
            state.infrastructure.uptime = clamp_percent(state.infrastructure.uptime + d)
        }
        Effect::BrandAwareness(d) => {
            state.marketing.brand_awareness = clamp_percent(state.marketing.brand_awareness + d)
        }
        Effect::ConversionRate(d) => {
            state.marketing.conversion_rate = clamp_percent(state.marketing.conversion_rate + d)
        }
        Effect::AdvanceTier(subsystem) => {
            let next = state.infrastructure.level(subsystem).advanced();
            state.infrastructure.set_level(subsystem, next);
        }
        Effect::Revenue(thousands) => {
            state.revenue.total_revenue =
                checked_add(state.revenue.total_revenue, checked_mul(thousands, 1000)?)?;
        }
        Effect::SwitchToMirror => {
            return Ok(match switch_to_mirror(state) {
                Some(domain) => Applied::Domain(domain),
                None => Applied::No,
            });
        }
    }
    Ok(Applied::Yes)
}

/// First known domain that is neither current nor ever blocked.
fn switch_to_mirror(state: &mut GameState) -> Option<String> {
    let mirror = state
        .available_domains
        .iter()
        .find(|d| {
            **d != state.domain_name && !state.domain_block_history.iter().any(|b| &b.domain == *d)
        })
        .cloned()?;
    state.domain_name = mirror.clone();
    state.domain_blocked = false;
    Some(mirror)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::{BlockReason, DomainBlock, InfraLevel};
    use crate::events::GameEvent;
    use crate::state::create_initial_state;

    fn with_pending(kind: EventKind) -> GameState {
        let mut state = create_initial_state(1, &GameConfig::default());
        push_event(&mut state, kind);
        state
    }

    fn push_event(state: &mut GameState, kind: EventKind) -> u64 {
        let id = state.next_event_id;
        state.next_event_id += 1;
        state.events.push(GameEvent {
            id,
            kind,
            description: kind.template().description.to_string(),
            impact: 0,
            duration_hours: 0,
            probability: 0.0,
            created_turn: state.current_turn,
            resolved: false,
            choices: kind.template().choices.iter().map(|c| c.to_string()).collect(),
            selected_choice: None,
        });
        state.pending_events.push_back(id);
        id
    }

    #[test]
    fn ddos_choice_zero_advances_security_and_costs_50k() {
        let mut state = with_pending(EventKind::DdosAttack);
        let out = resolve_event_choice(&mut state, 0).unwrap();

        assert_eq!(state.infrastructure.security_level, InfraLevel::Advanced);
        assert_eq!(state.budget, 50_000);
        assert_eq!(
            out.applied_effects,
            vec![Effect::AdvanceTier(Subsystem::Security), Effect::Budget(-50_000)]
        );
        assert_eq!(out.choice_text, EventKind::DdosAttack.template().choices[0]);
        assert!(!state.has_pending_event());

        let event = state.last_event().unwrap();
        assert!(event.resolved);
        assert_eq!(event.selected_choice.as_deref(), Some(out.choice_text.as_str()));
    }

    #[test]
    fn invalid_choice_leaves_state_unmodified() {
        let mut state = with_pending(EventKind::ViralGrowth);
        let before = state.clone();
        let err = resolve_event_choice(&mut state, 3).unwrap_err();
        assert_eq!(err, EngineError::InvalidChoice { index: 3, available: 3 });
        assert_eq!(state, before);
    }

    #[test]
    fn no_pending_event() {
        let mut state = create_initial_state(1, &GameConfig::default());
        assert_eq!(resolve_event_choice(&mut state, 0).unwrap_err(), EngineError::NoPendingEvent);
    }

    #[test]
    fn tier_advance_caps_at_enterprise() {
        let mut state = with_pending(EventKind::ServerOutage);
        state.infrastructure.server_level = InfraLevel::Enterprise;
        resolve_event_choice(&mut state, 1).unwrap();
        assert_eq!(state.infrastructure.server_level, InfraLevel::Enterprise);
        assert_eq!(state.budget, 0);
    }

    #[test]
    fn revenue_is_scaled_by_thousand() {
        let mut state = with_pending(EventKind::PartnershipOffer);
        resolve_event_choice(&mut state, 2).unwrap();
        assert_eq!(state.revenue.total_revenue, 35_000);
        assert_eq!(state.marketing.nps_score, 70.0);
        assert_eq!(state.budget, 80_000);
    }

    #[test]
    fn numeric_effects_are_clamped() {
        let mut state = with_pending(EventKind::RegulatoryCheck);
        state.legal.risk_level = 90.0;
        resolve_event_choice(&mut state, 2).unwrap();
        assert_eq!(state.legal.risk_level, 100.0);

        let mut state = with_pending(EventKind::DdosAttack);
        resolve_event_choice(&mut state, 2).unwrap();
        assert_eq!(state.active_users, 0);
        assert_eq!(state.marketing.nps_score, 35.0);
    }

    #[test]
    fn empty_cell_still_resolves() {
        let mut state = with_pending(EventKind::CompetitorLaunch);
        let out = resolve_event_choice(&mut state, 2).unwrap();
        assert!(out.applied_effects.is_empty());
        assert!(!state.has_pending_event());
    }

    #[test]
    fn queue_resolves_head_first() {
        let mut state = create_initial_state(1, &GameConfig::default());
        let first = push_event(&mut state, EventKind::ViralGrowth);
        let second = push_event(&mut state, EventKind::RegulatoryCheck);

        assert_eq!(resolve_event_choice(&mut state, 2).unwrap().event_id, first);
        assert_eq!(state.active_users, 23);
        assert_eq!(resolve_event_choice(&mut state, 0).unwrap().event_id, second);
        assert!(!state.has_pending_event());
    }

    #[test]
    fn mirror_switch_picks_first_unblocked_domain() {
        let mut state = with_pending(EventKind::DomainBlocked);
        state.domain_name = "main.net".to_string();
        state.domain_blocked = true;
        state.available_domains = vec!["main.net".into(), "old.org".into(), "spare.io".into()];
        state.domain_block_history = vec![
            DomainBlock { domain: "old.org".into(), blocked_turn: 2, reason: BlockReason::CourtRuling },
            DomainBlock { domain: "main.net".into(), blocked_turn: 9, reason: BlockReason::RegulatorOrder },
        ];

        let out = resolve_event_choice(&mut state, 2).unwrap();
        assert_eq!(out.new_domain.as_deref(), Some("spare.io"));
        assert_eq!(state.domain_name, "spare.io");
        assert!(!state.domain_blocked);
    }

    #[test]
    fn mirror_switch_without_mirror_keeps_block() {
        let mut state = with_pending(EventKind::DomainBlocked);
        state.domain_name = "main.net".to_string();
        state.domain_blocked = true;
        state.available_domains = vec!["main.net".into()];

        let out = resolve_event_choice(&mut state, 2).unwrap();
        assert!(out.applied_effects.is_empty());
        assert!(out.new_domain.is_none());
        assert!(state.domain_blocked);
    }
}
