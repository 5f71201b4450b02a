/// FileHub Engine — Core Domain Types
///
/// Pure data. The only behaviour here is lookups and small derived values
/// that read a single aggregate.
/// Logical time only: every "when" is a turn number, never a wall clock,
/// so identical inputs hash identically.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;

pub type PlayerId = u64;

// ── Enumerations ───────────────────────────────────────────────────

/// The six staff archetypes. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Cto,
    Cmo,
    Coo,
    Clo,
    CommunityManager,
    DataAnalyst,
}

impl StaffRole {
    pub const ALL: [StaffRole; 6] = [
        StaffRole::Cto,
        StaffRole::Cmo,
        StaffRole::Coo,
        StaffRole::Clo,
        StaffRole::CommunityManager,
        StaffRole::DataAnalyst,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StaffRole::Cto => "CTO",
            StaffRole::Cmo => "CMO",
            StaffRole::Coo => "COO",
            StaffRole::Clo => "CLO",
            StaffRole::CommunityManager => "COMMUNITY_MANAGER",
            StaffRole::DataAnalyst => "DATA_ANALYST",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Infrastructure tier. Ordered: basic < advanced < enterprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfraLevel {
    Basic,
    Advanced,
    Enterprise,
}

impl InfraLevel {
    pub const ALL: [InfraLevel; 3] = [InfraLevel::Basic, InfraLevel::Advanced, InfraLevel::Enterprise];

    /// User-growth multiplier contributed by one subsystem at this tier.
    pub fn growth_multiplier(self) -> f64 {
        match self {
            InfraLevel::Basic => 1.0,
            InfraLevel::Advanced => 1.15,
            InfraLevel::Enterprise => 1.35,
        }
    }

    /// Next tier up, capped at enterprise.
    pub fn advanced(self) -> Self {
        match self {
            InfraLevel::Basic => InfraLevel::Advanced,
            InfraLevel::Advanced | InfraLevel::Enterprise => InfraLevel::Enterprise,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            InfraLevel::Basic => "basic",
            InfraLevel::Advanced => "advanced",
            InfraLevel::Enterprise => "enterprise",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.key() == key)
    }
}

/// The four independently leveled infrastructure subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Server,
    Bandwidth,
    Storage,
    Security,
}

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Server,
        Subsystem::Bandwidth,
        Subsystem::Storage,
        Subsystem::Security,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Subsystem::Server => "server",
            Subsystem::Bandwidth => "bandwidth",
            Subsystem::Storage => "storage",
            Subsystem::Security => "security",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingRegion {
    Russia,
    Netherlands,
    Singapore,
    Usa,
}

impl HostingRegion {
    pub const ALL: [HostingRegion; 4] = [
        HostingRegion::Russia,
        HostingRegion::Netherlands,
        HostingRegion::Singapore,
        HostingRegion::Usa,
    ];

    pub fn key(self) -> &'static str {
        match self {
            HostingRegion::Russia => "russia",
            HostingRegion::Netherlands => "netherlands",
            HostingRegion::Singapore => "singapore",
            HostingRegion::Usa => "usa",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }
}

/// Campaign type. `Other` absorbs types written by older records; it has
/// no per-turn effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    SocialMedia,
    InfluencerPartnership,
    ContentMarketing,
    PaidAds,
    #[serde(other)]
    Other,
}

impl CampaignType {
    pub const LAUNCHABLE: [CampaignType; 4] = [
        CampaignType::SocialMedia,
        CampaignType::InfluencerPartnership,
        CampaignType::ContentMarketing,
        CampaignType::PaidAds,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CampaignType::SocialMedia => "social_media",
            CampaignType::InfluencerPartnership => "influencer_partnership",
            CampaignType::ContentMarketing => "content_marketing",
            CampaignType::PaidAds => "paid_ads",
            CampaignType::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::LAUNCHABLE.into_iter().find(|t| t.key() == key)
    }
}

/// Campaign intensity. `Unrecognized` scales like `Small`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignLevel {
    Small,
    Medium,
    Large,
    #[serde(other)]
    Unrecognized,
}

impl CampaignLevel {
    pub const LAUNCHABLE: [CampaignLevel; 3] =
        [CampaignLevel::Small, CampaignLevel::Medium, CampaignLevel::Large];

    pub fn multiplier(self) -> f64 {
        match self {
            CampaignLevel::Small => 1.0,
            CampaignLevel::Medium => 2.0,
            CampaignLevel::Large => 5.0,
            CampaignLevel::Unrecognized => 1.0,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CampaignLevel::Small => "small",
            CampaignLevel::Medium => "medium",
            CampaignLevel::Large => "large",
            CampaignLevel::Unrecognized => "unrecognized",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::LAUNCHABLE.into_iter().find(|l| l.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    RegulatorOrder,
    CourtRuling,
    RightsHolderComplaint,
    HostingProvider,
}

impl BlockReason {
    pub const ALL: [BlockReason; 4] = [
        BlockReason::RegulatorOrder,
        BlockReason::CourtRuling,
        BlockReason::RightsHolderComplaint,
        BlockReason::HostingProvider,
    ];

    pub fn describe(self) -> &'static str {
        match self {
            BlockReason::RegulatorOrder => "regulator order",
            BlockReason::CourtRuling => "court ruling",
            BlockReason::RightsHolderComplaint => "rights holder complaint",
            BlockReason::HostingProvider => "hosting provider takedown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    None,
    Name,
    Domain,
    Options,
    Complete,
}

// ── Sub-aggregates ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Infrastructure {
    pub server_level: InfraLevel,
    pub bandwidth_level: InfraLevel,
    pub storage_level: InfraLevel,
    pub security_level: InfraLevel,
    pub uptime: f64, // [0, 100]
    pub load: f64,   // [0, 100]
}

impl Default for Infrastructure {
    fn default() -> Self {
        Self {
            server_level: InfraLevel::Basic,
            bandwidth_level: InfraLevel::Basic,
            storage_level: InfraLevel::Basic,
            security_level: InfraLevel::Basic,
            uptime: 99.0,
            load: 50.0,
        }
    }
}

impl Infrastructure {
    pub fn level(&self, subsystem: Subsystem) -> InfraLevel {
        match subsystem {
            Subsystem::Server => self.server_level,
            Subsystem::Bandwidth => self.bandwidth_level,
            Subsystem::Storage => self.storage_level,
            Subsystem::Security => self.security_level,
        }
    }

    pub fn set_level(&mut self, subsystem: Subsystem, level: InfraLevel) {
        match subsystem {
            Subsystem::Server => self.server_level = level,
            Subsystem::Bandwidth => self.bandwidth_level = level,
            Subsystem::Storage => self.storage_level = level,
            Subsystem::Security => self.security_level = level,
        }
    }

    /// Mean of the per-subsystem growth multipliers.
    pub fn growth_multiplier(&self) -> f64 {
        let total: f64 = Subsystem::ALL
            .iter()
            .map(|s| self.level(*s).growth_multiplier())
            .sum();
        total / Subsystem::ALL.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hosting {
    pub regions: BTreeMap<HostingRegion, InfraLevel>,
    pub mirror_count: u32,
    pub failover_enabled: bool,
    pub backup_interval_hours: u32,
}

impl Default for Hosting {
    fn default() -> Self {
        let mut regions = BTreeMap::new();
        regions.insert(HostingRegion::Russia, InfraLevel::Basic);
        Self {
            regions,
            mirror_count: 1,
            failover_enabled: false,
            backup_interval_hours: 24,
        }
    }
}

/// A time-boxed marketing effect, active on `[start_turn, start_turn + duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Campaign {
    pub campaign_type: CampaignType,
    pub level: CampaignLevel,
    pub start_turn: u32,
    pub duration: u32,
    pub cost: i64,
}

impl Campaign {
    /// Inclusive on both ends.
    pub fn is_active(&self, turn: u32) -> bool {
        let end = self.start_turn.saturating_add(self.duration);
        self.start_turn <= turn && turn <= end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Marketing {
    pub campaigns: BTreeMap<String, Campaign>,
    pub ad_spend: i64,
    pub conversion_rate: f64, // [0, 100]
    pub brand_awareness: f64, // [0, 100]
    pub nps_score: f64,       // [-100, 100]
}

impl Default for Marketing {
    fn default() -> Self {
        Self {
            campaigns: BTreeMap::new(),
            ad_spend: 0,
            conversion_rate: 2.5,
            brand_awareness: 10.0,
            nps_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Community {
    pub retention_rate_30d: f64, // [0, 100]
    pub toxicity: f64,           // [0, 100]
    pub moderation_score: f64,   // [0, 100]
    pub community_health: f64,   // [0, 100]
    pub events_hosted: u32,
    pub monthly_donations: i64,
}

impl Default for Community {
    fn default() -> Self {
        Self {
            retention_rate_30d: 60.0,
            toxicity: 20.0,
            moderation_score: 70.0,
            community_health: 75.0,
            events_hosted: 0,
            monthly_donations: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Legal {
    pub risk_level: f64,         // [0, 100]
    pub compliance_score: f64,   // [0, 100]
    pub dmca_notices: u32,
    pub transparency_score: f64, // [0, 100]
    pub cooperation_level: f64,  // [0, 100]
}

impl Default for Legal {
    fn default() -> Self {
        Self {
            risk_level: 30.0,
            compliance_score: 60.0,
            dmca_notices: 0,
            transparency_score: 50.0,
            cooperation_level: 40.0,
        }
    }
}

/// Recomputed each turn by the metrics engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Revenue {
    pub ad_revenue: i64,
    pub donation_revenue: i64,
    pub total_revenue: i64,
}

/// Per-category accumulators are written by player actions; `total_expenses`
/// is their sum, written by the metrics engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expenses {
    pub staff_cost: i64,
    pub marketing_cost: i64,
    pub legal_cost: i64,
    pub infrastructure_cost: i64,
    pub hosting_cost: i64,
    pub total_expenses: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Financial {
    pub cash_flow: i64,
    pub burn_rate: i64,
    pub runway_months: f64,
    pub profit_margin: f64, // [-100, 100]
}

impl Default for Financial {
    fn default() -> Self {
        Self {
            cash_flow: 0,
            burn_rate: 0,
            runway_months: 12.0,
            profit_margin: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Staff {
    pub role: StaffRole,
    pub name: String,
    pub skill_level: u8, // 1..=10
    pub salary: i64,
    pub hired: bool,
    pub hired_turn: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainBlock {
    pub domain: String,
    pub blocked_turn: u32,
    pub reason: BlockReason,
}

// ── Root aggregate ─────────────────────────────────────────────────

/// Complete per-player game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameState {
    // identity / setup
    pub player_id: PlayerId,
    pub hub_name: String,
    pub domain_name: String,
    pub available_domains: Vec<String>,
    pub domain_blocked: bool,
    pub domain_block_history: Vec<DomainBlock>,
    pub last_domain_block_turn: u32,
    pub next_domain_check_turn: u32,
    pub setup_complete: bool,
    pub setup_step: SetupStep,

    // resources
    pub budget: i64,
    pub active_users: i64,
    pub mau: i64,
    pub current_turn: u32,
    pub total_turns: u32,
    pub actions_remaining: u32,

    // sub-aggregates
    pub staff: BTreeMap<StaffRole, Staff>,
    pub infrastructure: Infrastructure,
    pub hosting: Hosting,
    pub marketing: Marketing,
    pub community: Community,
    pub legal: Legal,
    pub revenue: Revenue,
    pub expenses: Expenses,
    pub financial: Financial,

    // events: full history, plus the FIFO of unresolved event ids
    pub events: Vec<GameEvent>,
    pub pending_events: VecDeque<u64>,
    pub next_event_id: u64,
}

impl GameState {
    pub fn hired_count(&self) -> usize {
        self.staff.values().filter(|s| s.hired).count()
    }

    pub fn is_hired(&self, role: StaffRole) -> bool {
        self.staff.get(&role).map(|s| s.hired).unwrap_or(false)
    }

    pub fn has_pending_event(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Head of the pending queue: the event the next choice resolves.
    pub fn pending_event(&self) -> Option<&GameEvent> {
        let id = *self.pending_events.front()?;
        self.event(id)
    }

    pub fn event(&self, id: u64) -> Option<&GameEvent> {
        self.events.iter().rev().find(|e| e.id == id)
    }

    pub fn event_mut(&mut self, id: u64) -> Option<&mut GameEvent> {
        self.events.iter_mut().rev().find(|e| e.id == id)
    }

    /// Most recently generated event, resolved or not.
    pub fn last_event(&self) -> Option<&GameEvent> {
        self.events.last()
    }

    pub fn active_campaigns(&self) -> impl Iterator<Item = (&String, &Campaign)> {
        let turn = self.current_turn;
        self.marketing
            .campaigns
            .iter()
            .filter(move |(_, c)| c.is_active(turn))
    }
}
