/// FileHub Engine — Configuration Table
///
/// Static lookup data: costs, salaries, event parameters, revenue rates.
/// Every field has a default; a JSON file may override any subset.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{CampaignLevel, CampaignType, HostingRegion, InfraLevel, StaffRole, Subsystem};
use crate::error::{EngineError, EngineResult};
use crate::events::EventKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub game: GameConstants,
    pub staff_salaries: StaffSalaries,
    pub infrastructure_costs: InfrastructureCosts,
    pub marketing_costs: MarketingCosts,
    pub hosting_costs: HostingCosts,
    pub events: EventTable,
    pub ad_metrics: AdMetrics,
    pub campaign_effects: CampaignEffects,
    pub legal_actions: LegalActions,
    pub community_actions: CommunityActions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConstants {
    pub starting_budget: i64,
    pub starting_users: i64,
    pub starting_mau: i64,
    pub total_turns: u32,
    pub actions_per_turn: u32,
    pub tick_duration_hours: u32,
    pub narrative_event_chance: f64,
    pub domain_block_base_probability: f64,
    pub domain_recheck_min: u32,
    pub domain_recheck_max: u32,
    pub first_domain_check_turn: u32,
    pub campaign_duration: u32,
    pub domain_change_cost: i64,
    pub mirror_creation_cost: i64,
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            starting_budget: 100_000,
            starting_users: 3,
            starting_mau: 5,
            total_turns: 100,
            actions_per_turn: 3,
            tick_duration_hours: 24,
            narrative_event_chance: 0.30,
            domain_block_base_probability: 0.15,
            domain_recheck_min: 3,
            domain_recheck_max: 7,
            first_domain_check_turn: 5,
            campaign_duration: 3,
            domain_change_cost: 5_000,
            mirror_creation_cost: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaffSalaries {
    pub cto: i64,
    pub cmo: i64,
    pub coo: i64,
    pub clo: i64,
    pub community_manager: i64,
    pub data_analyst: i64,
}

impl Default for StaffSalaries {
    fn default() -> Self {
        Self {
            cto: 150_000,
            cmo: 120_000,
            coo: 100_000,
            clo: 130_000,
            community_manager: 80_000,
            data_analyst: 90_000,
        }
    }
}

impl StaffSalaries {
    pub fn salary(&self, role: StaffRole) -> i64 {
        match role {
            StaffRole::Cto => self.cto,
            StaffRole::Cmo => self.cmo,
            StaffRole::Coo => self.coo,
            StaffRole::Clo => self.clo,
            StaffRole::CommunityManager => self.community_manager,
            StaffRole::DataAnalyst => self.data_analyst,
        }
    }
}

/// Price of one item at each infrastructure tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierCosts {
    pub basic: i64,
    pub advanced: i64,
    pub enterprise: i64,
}

impl TierCosts {
    pub const fn new(basic: i64, advanced: i64, enterprise: i64) -> Self {
        Self { basic, advanced, enterprise }
    }

    pub fn at(&self, level: InfraLevel) -> i64 {
        match level {
            InfraLevel::Basic => self.basic,
            InfraLevel::Advanced => self.advanced,
            InfraLevel::Enterprise => self.enterprise,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfrastructureCosts {
    pub server: TierCosts,
    pub bandwidth: TierCosts,
    pub storage: TierCosts,
    pub security: TierCosts,
}

impl Default for InfrastructureCosts {
    fn default() -> Self {
        Self {
            server: TierCosts::new(50_000, 150_000, 500_000),
            bandwidth: TierCosts::new(30_000, 100_000, 300_000),
            storage: TierCosts::new(25_000, 75_000, 250_000),
            security: TierCosts::new(40_000, 120_000, 400_000),
        }
    }
}

impl InfrastructureCosts {
    pub fn cost(&self, subsystem: Subsystem, level: InfraLevel) -> i64 {
        let tiers = match subsystem {
            Subsystem::Server => &self.server,
            Subsystem::Bandwidth => &self.bandwidth,
            Subsystem::Storage => &self.storage,
            Subsystem::Security => &self.security,
        };
        tiers.at(level)
    }
}

/// Price of a campaign at each intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntensityCosts {
    pub small: i64,
    pub medium: i64,
    pub large: i64,
}

impl IntensityCosts {
    pub const fn new(small: i64, medium: i64, large: i64) -> Self {
        Self { small, medium, large }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketingCosts {
    pub social_media: IntensityCosts,
    pub influencer_partnership: IntensityCosts,
    pub content_marketing: IntensityCosts,
    pub paid_ads: IntensityCosts,
}

impl Default for MarketingCosts {
    fn default() -> Self {
        Self {
            social_media: IntensityCosts::new(20_000, 60_000, 200_000),
            influencer_partnership: IntensityCosts::new(15_000, 50_000, 150_000),
            content_marketing: IntensityCosts::new(10_000, 35_000, 100_000),
            paid_ads: IntensityCosts::new(25_000, 75_000, 250_000),
        }
    }
}

impl MarketingCosts {
    /// `None` for types and levels that cannot be launched.
    pub fn cost(&self, campaign_type: CampaignType, level: CampaignLevel) -> Option<i64> {
        let costs = match campaign_type {
            CampaignType::SocialMedia => &self.social_media,
            CampaignType::InfluencerPartnership => &self.influencer_partnership,
            CampaignType::ContentMarketing => &self.content_marketing,
            CampaignType::PaidAds => &self.paid_ads,
            CampaignType::Other => return None,
        };
        match level {
            CampaignLevel::Small => Some(costs.small),
            CampaignLevel::Medium => Some(costs.medium),
            CampaignLevel::Large => Some(costs.large),
            CampaignLevel::Unrecognized => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostingCosts {
    pub russia: TierCosts,
    pub netherlands: TierCosts,
    pub singapore: TierCosts,
    pub usa: TierCosts,
}

impl Default for HostingCosts {
    fn default() -> Self {
        Self {
            russia: TierCosts::new(20_000, 60_000, 200_000),
            netherlands: TierCosts::new(30_000, 90_000, 300_000),
            singapore: TierCosts::new(35_000, 105_000, 350_000),
            usa: TierCosts::new(40_000, 120_000, 400_000),
        }
    }
}

impl HostingCosts {
    pub fn cost(&self, region: HostingRegion, level: InfraLevel) -> i64 {
        let tiers = match region {
            HostingRegion::Russia => &self.russia,
            HostingRegion::Netherlands => &self.netherlands,
            HostingRegion::Singapore => &self.singapore,
            HostingRegion::Usa => &self.usa,
        };
        tiers.at(level)
    }
}

/// Recorded on each narrative event. The 30% draw and uniform kind
/// selection in the generator do not consult `probability`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventParams {
    pub probability: f64,
    pub impact: i64,
    pub duration_hours: u32,
}

impl EventParams {
    pub const fn new(probability: f64, impact: i64, duration_hours: u32) -> Self {
        Self { probability, impact, duration_hours }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventTable {
    pub ddos_attack: EventParams,
    pub server_outage: EventParams,
    pub viral_growth: EventParams,
    pub competitor_launch: EventParams,
    pub regulatory_check: EventParams,
    pub influencer_mention: EventParams,
    pub security_breach: EventParams,
    pub partnership_offer: EventParams,
}

impl Default for EventTable {
    fn default() -> Self {
        Self {
            ddos_attack: EventParams::new(0.15, -20, 12),
            server_outage: EventParams::new(0.10, -15, 6),
            viral_growth: EventParams::new(0.08, 50, 0),
            competitor_launch: EventParams::new(0.12, -10, 0),
            regulatory_check: EventParams::new(0.06, -25, 0),
            influencer_mention: EventParams::new(0.05, 30, 0),
            security_breach: EventParams::new(0.04, -40, 24),
            partnership_offer: EventParams::new(0.07, 25, 0),
        }
    }
}

impl EventTable {
    /// Domain blocks are not in the table: they carry fixed parameters.
    pub fn params(&self, kind: EventKind) -> Option<EventParams> {
        match kind {
            EventKind::DdosAttack => Some(self.ddos_attack),
            EventKind::ServerOutage => Some(self.server_outage),
            EventKind::ViralGrowth => Some(self.viral_growth),
            EventKind::CompetitorLaunch => Some(self.competitor_launch),
            EventKind::RegulatoryCheck => Some(self.regulatory_check),
            EventKind::InfluencerMention => Some(self.influencer_mention),
            EventKind::SecurityBreach => Some(self.security_breach),
            EventKind::PartnershipOffer => Some(self.partnership_offer),
            EventKind::DomainBlocked => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdMetrics {
    pub base_cpm: f64,
    pub nps_bonus: f64,
    pub retention_bonus: f64,
}

impl Default for AdMetrics {
    fn default() -> Self {
        Self {
            base_cpm: 50.0,
            nps_bonus: 0.05,
            retention_bonus: 0.03,
        }
    }
}

/// Per-turn bonus of one active campaign at level multiplier 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CampaignEffects {
    pub social_media_users: f64,
    pub paid_ads_users: f64,
    pub paid_ads_brand_awareness: f64,
    pub content_marketing_nps: f64,
}

impl Default for CampaignEffects {
    fn default() -> Self {
        Self {
            social_media_users: 500.0,
            paid_ads_users: 800.0,
            paid_ads_brand_awareness: 5.0,
            content_marketing_nps: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegalActionParams {
    pub cost: i64,
    pub risk_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegalActions {
    pub hire_lawyers: LegalActionParams,
    pub increase_transparency: LegalActionParams,
    pub cooperate_rights_holders: LegalActionParams,
}

impl Default for LegalActions {
    fn default() -> Self {
        Self {
            hire_lawyers: LegalActionParams { cost: 40_000, risk_delta: -15.0 },
            increase_transparency: LegalActionParams { cost: 20_000, risk_delta: -10.0 },
            cooperate_rights_holders: LegalActionParams { cost: 30_000, risk_delta: -12.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommunityActions {
    pub host_event_cost: i64,
    pub host_event_health_delta: f64,
    pub host_event_toxicity_delta: f64,
    pub donation_floor: i64,
    pub donation_per_user: i64,
}

impl Default for CommunityActions {
    fn default() -> Self {
        Self {
            host_event_cost: 25_000,
            host_event_health_delta: 5.0,
            host_event_toxicity_delta: -5.0,
            donation_floor: 1_000,
            donation_per_user: 10,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Reject tables the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        let g = &self.game;
        for (name, p) in [
            ("narrative_event_chance", g.narrative_event_chance),
            ("domain_block_base_probability", g.domain_block_base_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::Config(format!("{} must be in [0, 1], got {}", name, p)));
            }
        }
        if g.domain_recheck_min > g.domain_recheck_max {
            return Err(EngineError::Config(format!(
                "domain recheck window {}..={} is empty",
                g.domain_recheck_min, g.domain_recheck_max
            )));
        }
        if g.starting_users < 0 || g.starting_mau < 0 {
            return Err(EngineError::Config("starting users must be non-negative".to_string()));
        }
        if self.ad_metrics.base_cpm < 0.0 {
            return Err(EngineError::Config("base_cpm must be non-negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_table() {
        let c = GameConfig::default();
        assert_eq!(c.staff_salaries.salary(StaffRole::Cto), 150_000);
        assert_eq!(c.staff_salaries.salary(StaffRole::CommunityManager), 80_000);
        assert_eq!(c.infrastructure_costs.cost(Subsystem::Server, InfraLevel::Advanced), 150_000);
        assert_eq!(c.hosting_costs.cost(HostingRegion::Usa, InfraLevel::Basic), 40_000);
        assert_eq!(
            c.marketing_costs.cost(CampaignType::PaidAds, CampaignLevel::Medium),
            Some(75_000)
        );
        assert_eq!(c.events.params(EventKind::SecurityBreach).unwrap().impact, -40);
        assert!(c.events.params(EventKind::DomainBlocked).is_none());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let c = GameConfig::from_json_str(r#"{"game":{"starting_budget":5000}}"#).unwrap();
        assert_eq!(c.game.starting_budget, 5000);
        assert_eq!(c.game.actions_per_turn, 3);
        assert_eq!(c.ad_metrics.base_cpm, 50.0);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = GameConfig::from_json_str(r#"{"gmae":{}}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let err =
            GameConfig::from_json_str(r#"{"game":{"narrative_event_chance":1.5}}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn unlaunchable_campaign_has_no_cost() {
        let c = GameConfig::default();
        assert_eq!(c.marketing_costs.cost(CampaignType::Other, CampaignLevel::Small), None);
        assert_eq!(
            c.marketing_costs.cost(CampaignType::SocialMedia, CampaignLevel::Unrecognized),
            None
        );
    }
}
