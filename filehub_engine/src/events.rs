/// FileHub Engine — Event Catalog and Generator
///
/// The catalog is static data keyed by `EventKind`. The generator rolls at
/// most one narrative event per turn, plus the independent domain-block
/// check. Both push onto the state's history and pending queue.
///
/// Random draw order per turn (fixed, replay depends on it):
///   1. narrative roll, then kind index if it fired
///   2. domain-block roll, then recheck offset, then reason index if blocked

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::domain::{BlockReason, DomainBlock, GameState};

/// Impact recorded on every domain-block event.
pub const DOMAIN_BLOCK_IMPACT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DdosAttack,
    ServerOutage,
    ViralGrowth,
    CompetitorLaunch,
    RegulatoryCheck,
    InfluencerMention,
    SecurityBreach,
    PartnershipOffer,
    DomainBlocked,
}

/// Fixed text for one catalog entry.
#[derive(Debug)]
pub struct EventTemplate {
    pub description: &'static str,
    pub choices: [&'static str; 3],
}

// ── Catalog ────────────────────────────────────────────────────────

static DDOS_ATTACK: EventTemplate = EventTemplate {
    description: "DDoS attack! Hackers are attacking your platform.",
    choices: [
        "Strengthen protection (+20 security, -$50,000)",
        "Switch to the backup server (+10 uptime, -$30,000)",
        "Ignore the attack (-30 popularity)",
    ],
};

static SERVER_OUTAGE: EventTemplate = EventTemplate {
    description: "Server outage! The tracker is unreachable.",
    choices: [
        "Quick repair (+15 uptime, -$25,000)",
        "Buy new servers (+30 reliability, -$100,000)",
        "Migrate to another data center (+25 reliability, -$75,000)",
    ],
};

static VIRAL_GROWTH: EventTemplate = EventTemplate {
    description: "Viral growth! Your platform is suddenly popular.",
    choices: [
        "Scale up servers (+50 active users, -$40,000)",
        "Launch an ad campaign (+80 active users, -$60,000)",
        "Keep the current infrastructure (+20 active users)",
    ],
};

static COMPETITOR_LAUNCH: EventTemplate = EventTemplate {
    description: "A competitor launched! A new platform entered the market.",
    choices: [
        "Improve features (+15 reputation, -$50,000)",
        "Cut premium prices (+10 conversion, -$20,000)",
        "Do nothing (no change)",
    ],
};

static REGULATORY_CHECK: EventTemplate = EventTemplate {
    description: "Regulatory inspection! You need to respond now.",
    choices: [
        "Show full transparency (-15 legal risk)",
        "Hire lawyers (-10 legal risk, -$40,000)",
        "Hide information (+20 legal risk)",
    ],
};

static INFLUENCER_MENTION: EventTemplate = EventTemplate {
    description: "A popular influencer mentioned your platform!",
    choices: [
        "Run a promotion (+40 brand awareness, -$30,000)",
        "Partner with the influencer (+60 active users, -$80,000)",
        "Let the moment pass (+10 brand awareness)",
    ],
};

static SECURITY_BREACH: EventTemplate = EventTemplate {
    description: "Data leak! Security is compromised.",
    choices: [
        "Notify users and harden security (+20 trust, -$60,000)",
        "Cover up the leak (+10 risk, -$30,000)",
        "Hire security experts (+35 security, -$120,000)",
    ],
};

static PARTNERSHIP_OFFER: EventTemplate = EventTemplate {
    description: "A large company offers a partnership.",
    choices: [
        "Accept the offer (+25 revenue, +15 trust, -$10,000)",
        "Decline politely (+5 reputation)",
        "Negotiate better terms (+35 revenue, +20 trust, -$20,000)",
    ],
};

static DOMAIN_BLOCKED: EventTemplate = EventTemplate {
    description: "Domain blocked!",
    choices: [
        "Enter a new domain manually",
        "Use the domain generator",
        "Switch to an available mirror",
    ],
};

impl EventKind {
    /// Kinds the narrative roll chooses from, uniformly.
    pub const NARRATIVE: [EventKind; 8] = [
        EventKind::DdosAttack,
        EventKind::ServerOutage,
        EventKind::ViralGrowth,
        EventKind::CompetitorLaunch,
        EventKind::RegulatoryCheck,
        EventKind::InfluencerMention,
        EventKind::SecurityBreach,
        EventKind::PartnershipOffer,
    ];

    pub fn template(self) -> &'static EventTemplate {
        match self {
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

    pub fn key(self) -> &'static str {
        match self {
            EventKind::DdosAttack => "ddos_attack",
            EventKind::ServerOutage => "server_outage",
            EventKind::ViralGrowth => "viral_growth",
            EventKind::CompetitorLaunch => "competitor_launch",
            EventKind::RegulatoryCheck => "regulatory_check",
            EventKind::InfluencerMention => "influencer_mention",
            EventKind::SecurityBreach => "security_breach",
            EventKind::PartnershipOffer => "partnership_offer",
            EventKind::DomainBlocked => "domain_blocked",
        }
    }
}

/// One generated event. Immutable once `resolved` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameEvent {
    pub id: u64,
    pub kind: EventKind,
    pub description: String,
    pub impact: i64,
    pub duration_hours: u32,
    pub probability: f64,
    pub created_turn: u32,
    pub resolved: bool,
    pub choices: Vec<String>,
    pub selected_choice: Option<String>,
}

impl GameEvent {
    fn from_template(
        id: u64,
        kind: EventKind,
        description: String,
        impact: i64,
        duration_hours: u32,
        probability: f64,
        created_turn: u32,
    ) -> Self {
        Self {
            id,
            kind,
            description,
            impact,
            duration_hours,
            probability,
            created_turn,
            resolved: false,
            choices: kind.template().choices.iter().map(|c| c.to_string()).collect(),
            selected_choice: None,
        }
    }
}

// ── Generation ─────────────────────────────────────────────────────

/// Roll this turn's events and record them on `state`.
///
/// Narrative events join the back of the pending queue; a domain block
/// jumps to the front. Returns the events generated, in generation order.
pub fn generate_events<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut R,
) -> Vec<GameEvent> {
    let mut generated = Vec::new();

    if rng.gen::<f64>() < config.game.narrative_event_chance {
        let kind = EventKind::NARRATIVE[rng.gen_range(0..EventKind::NARRATIVE.len())];
        let params = config.events.params(kind);
        let id = allocate_event_id(state);
        let event = GameEvent::from_template(
            id,
            kind,
            kind.template().description.to_string(),
            params.map(|p| p.impact).unwrap_or(0),
            params.map(|p| p.duration_hours).unwrap_or(0),
            params.map(|p| p.probability).unwrap_or(0.0),
            state.current_turn,
        );
        info!(player = state.player_id, turn = state.current_turn, kind = kind.key(), "narrative event");
        state.events.push(event.clone());
        state.pending_events.push_back(id);
        generated.push(event);
    }

    if let Some(event) = check_domain_blocking(state, config, rng) {
        generated.push(event);
    }

    generated
}

/// Domain-block check. Runs only once setup is complete and the scheduled
/// check turn has been reached; always reschedules when it runs.
pub fn check_domain_blocking<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut R,
) -> Option<GameEvent> {
    if !state.setup_complete || state.current_turn < state.next_domain_check_turn {
        return None;
    }

    let g = &config.game;
    let probability = g.domain_block_base_probability * (1.0 + state.legal.risk_level / 100.0);
    let roll = rng.gen::<f64>();
    let offset = rng.gen_range(g.domain_recheck_min..=g.domain_recheck_max);
    state.next_domain_check_turn = state.current_turn.saturating_add(offset);

    if roll >= probability {
        debug!(
            player = state.player_id,
            next_check = state.next_domain_check_turn,
            "domain check passed"
        );
        return None;
    }

    let reason = BlockReason::ALL[rng.gen_range(0..BlockReason::ALL.len())];
    state.domain_blocked = true;
    state.last_domain_block_turn = state.current_turn;
    state.domain_block_history.push(DomainBlock {
        domain: state.domain_name.clone(),
        blocked_turn: state.current_turn,
        reason,
    });

    let id = allocate_event_id(state);
    let event = GameEvent::from_template(
        id,
        EventKind::DomainBlocked,
        format!(
            "Domain blocked! Your domain {} was blocked: {}",
            state.domain_name,
            reason.describe()
        ),
        DOMAIN_BLOCK_IMPACT,
        0,
        1.0,
        state.current_turn,
    );
    info!(
        player = state.player_id,
        domain = %state.domain_name,
        reason = reason.describe(),
        next_check = state.next_domain_check_turn,
        "domain blocked"
    );
    state.events.push(event.clone());
    state.pending_events.push_front(id);
    Some(event)
}

fn allocate_event_id(state: &mut GameState) -> u64 {
    let id = state.next_event_id;
    state.next_event_id = state.next_event_id.saturating_add(1);
    id
}
