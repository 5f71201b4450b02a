/// FileHub Engine — Metrics Engine
///
/// Three ordered phases. Each phase reads the state left by the previous
/// one, so each is computed and applied before the next is computed:
///
///   A. base drift (users, retention, NPS, legal risk)
///   B. campaign bonuses for campaigns active this turn
///   C. revenue, expenses, cash flow, budget
///
/// Then the derived financials, and finally `mau = floor(1.2 × users)`.
///
/// Random draw order in phase A: growth, retention, NPS, legal risk.

use rand::Rng;
use tracing::debug;

use crate::arithmetic::{checked_add, checked_mul, checked_sub, floor_to_i64};
use crate::changeset::{apply_changeset, Changeset, MetricChange};
use crate::config::GameConfig;
use crate::domain::{CampaignType, GameState};
use crate::error::{EngineError, EngineResult};

/// Growth bonus per hired staff member.
pub const STAFF_GROWTH_BONUS: f64 = 0.05;
/// Share of monthly donations booked as revenue.
pub const DONATION_YIELD_NUM: i64 = 4;
pub const DONATION_YIELD_DEN: i64 = 5;
/// Runway reported when the hub is not burning cash.
pub const RUNWAY_NOT_BURNING: f64 = 999.0;

// ── Phase A ────────────────────────────────────────────────────────

pub fn base_metrics<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> EngineResult<Changeset> {
    let staff_bonus = STAFF_GROWTH_BONUS * state.hired_count() as f64;
    let infra_multiplier = state.infrastructure.growth_multiplier();
    let base_growth: f64 = rng.gen_range(0.02..0.05);
    let user_growth = base_growth * (1.0 + staff_bonus) * infra_multiplier;

    let retention_drift: f64 = rng.gen_range(-2.0..3.0);
    let nps_drift: f64 = rng.gen_range(-2.0..4.0);
    let risk_drift: f64 = rng.gen_range(-1.0..3.0);

    let mut changes = Changeset::new();
    changes.push(MetricChange::ActiveUsersDelta(floor_to_i64(
        state.active_users as f64 * user_growth,
    )?));
    changes.push(MetricChange::MauDelta(floor_to_i64(
        state.mau as f64 * (1.0 + 0.8 * user_growth),
    )?));
    changes.push(MetricChange::RetentionRate(
        state.community.retention_rate_30d + retention_drift,
    ));
    changes.push(MetricChange::NpsScore(state.marketing.nps_score + nps_drift));
    changes.push(MetricChange::LegalRisk(state.legal.risk_level + risk_drift));
    Ok(changes)
}

// ── Phase B ────────────────────────────────────────────────────────

/// Bonuses from every campaign active this turn, summed per field.
pub fn campaign_effects(state: &GameState, config: &GameConfig) -> EngineResult<Changeset> {
    let effects = &config.campaign_effects;
    let mut users = 0i64;
    let mut awareness = 0.0f64;
    let mut nps = 0.0f64;

    for (key, campaign) in state.active_campaigns() {
        let m = campaign.level.multiplier();
        match campaign.campaign_type {
            CampaignType::SocialMedia => {
                users = checked_add(users, floor_to_i64(effects.social_media_users * m)?)?;
            }
            CampaignType::PaidAds => {
                users = checked_add(users, floor_to_i64(effects.paid_ads_users * m)?)?;
                awareness += effects.paid_ads_brand_awareness * m;
            }
            CampaignType::ContentMarketing => {
                nps += effects.content_marketing_nps * m;
            }
            CampaignType::InfluencerPartnership | CampaignType::Other => {}
        }
        debug!(player = state.player_id, campaign = %key, "campaign active");
    }

    let mut changes = Changeset::new();
    if users != 0 {
        changes.push(MetricChange::ActiveUsersDelta(users));
    }
    if awareness != 0.0 {
        changes.push(MetricChange::BrandAwarenessDelta(awareness));
    }
    if nps != 0.0 {
        changes.push(MetricChange::NpsDelta(nps));
    }
    Ok(changes)
}

// ── Phase C ────────────────────────────────────────────────────────

pub fn financial_effects(state: &GameState, config: &GameConfig) -> EngineResult<Changeset> {
    let ad = &config.ad_metrics;
    let per_user = ad.base_cpm
        * 0.001
        * (1.0
            + state.marketing.nps_score * ad.nps_bonus
            + state.community.retention_rate_30d * ad.retention_bonus / 100.0);

    let ad_revenue = floor_to_i64(state.active_users as f64 * per_user)?;
    let donation_revenue =
        checked_mul(state.community.monthly_donations, DONATION_YIELD_NUM)?.div_euclid(DONATION_YIELD_DEN);
    let total_revenue = checked_add(ad_revenue, donation_revenue)?;

    let e = &state.expenses;
    let total_expenses = [e.marketing_cost, e.legal_cost, e.infrastructure_cost, e.hosting_cost]
        .into_iter()
        .try_fold(e.staff_cost, checked_add)?;
    let cash_flow = checked_sub(total_revenue, total_expenses)?;

    let mut changes = Changeset::new();
    changes.push(MetricChange::AdRevenue(ad_revenue));
    changes.push(MetricChange::DonationRevenue(donation_revenue));
    changes.push(MetricChange::TotalRevenue(total_revenue));
    changes.push(MetricChange::TotalExpenses(total_expenses));
    changes.push(MetricChange::CashFlow(cash_flow));
    changes.push(MetricChange::BudgetDelta(cash_flow));
    Ok(changes)
}

/// Burn rate, runway and margin from the post-phase-C financials.
pub fn derived_financials(state: &GameState) -> EngineResult<Changeset> {
    let cash_flow = state.financial.cash_flow;
    let burn_rate = if cash_flow < 0 {
        cash_flow
            .checked_neg()
            .ok_or_else(|| EngineError::Overflow(format!("burn rate of {}", cash_flow)))?
    } else {
        0
    };
    let runway = if burn_rate > 0 {
        state.budget as f64 / burn_rate as f64
    } else {
        RUNWAY_NOT_BURNING
    };
    let total_revenue = state.revenue.total_revenue;
    let margin = if total_revenue > 0 {
        cash_flow as f64 / total_revenue as f64 * 100.0
    } else {
        0.0
    };

    let mut changes = Changeset::new();
    changes.push(MetricChange::BurnRate(burn_rate));
    changes.push(MetricChange::RunwayMonths(runway));
    changes.push(MetricChange::ProfitMargin(margin));
    Ok(changes)
}

/// `floor(1.2 × users)`, in exact integer arithmetic.
pub fn derived_mau(active_users: i64) -> EngineResult<i64> {
    Ok(checked_mul(active_users.max(0), 6)? / 5)
}

// ── Turn application ───────────────────────────────────────────────

/// Run all phases against `state` and return the merged changeset.
///
/// On error the phases already applied stay applied.
pub fn apply_turn_metrics<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut R,
) -> EngineResult<Changeset> {
    let mut merged = Changeset::new();

    let base = base_metrics(state, rng)?;
    apply_changeset(state, &base)?;
    merged.extend(&base);

    let campaigns = campaign_effects(state, config)?;
    apply_changeset(state, &campaigns)?;
    merged.extend(&campaigns);

    let finances = financial_effects(state, config)?;
    apply_changeset(state, &finances)?;
    merged.extend(&finances);

    let derived = derived_financials(state)?;
    apply_changeset(state, &derived)?;
    merged.extend(&derived);

    let mau: Changeset = [MetricChange::Mau(derived_mau(state.active_users)?)]
        .into_iter()
        .collect();
    apply_changeset(state, &mau)?;
    merged.extend(&mau);

    debug!(
        player = state.player_id,
        turn = state.current_turn,
        users = state.active_users,
        budget = state.budget,
        cash_flow = state.financial.cash_flow,
        "metrics applied"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Campaign, CampaignLevel, InfraLevel, Staff, StaffRole, Subsystem};
    use crate::state::create_initial_state;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fresh() -> GameState {
        create_initial_state(1, &GameConfig::default())
    }

    fn campaign(t: CampaignType, level: CampaignLevel, start: u32) -> Campaign {
        Campaign {
            campaign_type: t,
            level,
            start_turn: start,
            duration: 3,
            cost: 0,
        }
    }

    #[test]
    fn minimum_draws_give_lower_bounds() {
        let mut state = fresh();
        state.active_users = 10_000;
        let cs = base_metrics(&state, &mut StepRng::new(0, 0)).unwrap();
        apply_changeset(&mut state, &cs).unwrap();
        // growth 0.02, retention -2, nps -2, risk -1
        assert_eq!(state.active_users, 10_200);
        assert_eq!(state.community.retention_rate_30d, 58.0);
        assert_eq!(state.marketing.nps_score, 48.0);
        assert_eq!(state.legal.risk_level, 29.0);
    }

    #[test]
    fn staff_and_infrastructure_scale_growth() {
        let mut state = fresh();
        state.active_users = 100_003;
        for role in [StaffRole::Cto, StaffRole::Cmo] {
            state.staff.insert(
                role,
                Staff {
                    role,
                    name: "x".to_string(),
                    skill_level: 1,
                    salary: 0,
                    hired: true,
                    hired_turn: Some(0),
                },
            );
        }
        for s in Subsystem::ALL {
            state.infrastructure.set_level(s, InfraLevel::Enterprise);
        }
        let cs = base_metrics(&state, &mut StepRng::new(0, 0)).unwrap();
        // 100_003 × 0.02 × 1.1 × 1.35 = 2970.09
        assert_eq!(cs.users_delta(), 2970);
    }

    #[test]
    fn campaigns_stack_by_type_and_level() {
        let mut state = fresh();
        state.current_turn = 5;
        let c = &mut state.marketing.campaigns;
        c.insert("social_media_small".into(), campaign(CampaignType::SocialMedia, CampaignLevel::Small, 4));
        c.insert("paid_ads_medium".into(), campaign(CampaignType::PaidAds, CampaignLevel::Medium, 5));
        c.insert("content_marketing_large".into(), campaign(CampaignType::ContentMarketing, CampaignLevel::Large, 2));
        // expired: window 0..=3
        c.insert("paid_ads_large".into(), campaign(CampaignType::PaidAds, CampaignLevel::Large, 0));

        let cs = campaign_effects(&state, &GameConfig::default()).unwrap();
        let entries: Vec<MetricChange> = cs.iter().copied().collect();
        assert_eq!(
            entries,
            vec![
                MetricChange::ActiveUsersDelta(500 + 1600),
                MetricChange::BrandAwarenessDelta(10.0),
                MetricChange::NpsDelta(10.0),
            ]
        );
    }

    #[test]
    fn unrecognized_level_scales_like_small() {
        let mut state = fresh();
        state.marketing.campaigns.insert(
            "social_media_huge".into(),
            campaign(CampaignType::SocialMedia, CampaignLevel::Unrecognized, 0),
        );
        let cs = campaign_effects(&state, &GameConfig::default()).unwrap();
        assert_eq!(cs.users_delta(), 500);
    }

    #[test]
    fn finances_sum_accumulators_and_move_budget() {
        let mut state = fresh();
        state.active_users = 10_001;
        state.marketing.nps_score = 50.0;
        state.community.retention_rate_30d = 60.0;
        state.community.monthly_donations = 1_000;
        state.expenses.staff_cost = 150_000;
        state.expenses.marketing_cost = 25_000;

        let cs = financial_effects(&state, &GameConfig::default()).unwrap();
        apply_changeset(&mut state, &cs).unwrap();

        // per user: 0.05 × (1 + 2.5 + 0.018) = 0.1759
        assert_eq!(state.revenue.ad_revenue, 1_759);
        assert_eq!(state.revenue.donation_revenue, 800);
        assert_eq!(state.revenue.total_revenue, 2_559);
        assert_eq!(state.expenses.total_expenses, 175_000);
        assert_eq!(state.financial.cash_flow, 2_559 - 175_000);
        assert_eq!(state.budget, 100_000 + 2_559 - 175_000);
    }

    #[test]
    fn derived_financials_when_burning_and_not() {
        let mut state = fresh();
        state.financial.cash_flow = -10_000;
        state.budget = 50_000;
        state.revenue.total_revenue = 5_000;
        let burning = derived_financials(&state).unwrap();
        apply_changeset(&mut state, &burning).unwrap();
        assert_eq!(state.financial.burn_rate, 10_000);
        assert_eq!(state.financial.runway_months, 5.0);
        assert_eq!(state.financial.profit_margin, -100.0);

        state.financial.cash_flow = 1_000;
        let earning = derived_financials(&state).unwrap();
        apply_changeset(&mut state, &earning).unwrap();
        assert_eq!(state.financial.burn_rate, 0);
        assert_eq!(state.financial.runway_months, RUNWAY_NOT_BURNING);
        assert!((state.financial.profit_margin - 20.0).abs() < 1e-9);
    }

    #[test]
    fn mau_is_forced_after_all_phases() {
        let config = GameConfig::default();
        for seed in 0..50u64 {
            let mut state = fresh();
            state.active_users = 1_000 + seed as i64 * 37;
            state.mau = 9_999_999;
            apply_turn_metrics(&mut state, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(state.mau, state.active_users * 6 / 5);
        }
    }

    #[test]
    fn fresh_state_growth_is_bounded() {
        let config = GameConfig::default();
        for seed in 0..100u64 {
            let mut state = fresh();
            let before = state.budget;
            let cs = apply_turn_metrics(&mut state, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!((3..=4).contains(&state.active_users));
            assert_eq!(state.budget, before + state.financial.cash_flow);
            assert!(!cs.is_empty());
        }
    }
}
