/// FileHub Engine — Metric Changesets
///
/// Closed set of updatable fields with typed payloads. Each variant carries
/// its own semantics: `*Delta` variants add, the rest replace. Bounded
/// fields are clamped after every write; user counts floor at zero.

use serde::{Deserialize, Serialize};

use crate::arithmetic::{checked_add, clamp_nps, clamp_percent};
use crate::domain::GameState;
use crate::error::EngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum MetricChange {
    ActiveUsersDelta(i64),
    MauDelta(i64),
    RetentionRate(f64),
    NpsScore(f64),
    NpsDelta(f64),
    LegalRisk(f64),
    BrandAwarenessDelta(f64),
    AdRevenue(i64),
    DonationRevenue(i64),
    TotalRevenue(i64),
    TotalExpenses(i64),
    CashFlow(i64),
    BudgetDelta(i64),
    BurnRate(i64),
    RunwayMonths(f64),
    ProfitMargin(f64),
    /// Final derived value; always written last.
    Mau(i64),
}

impl MetricChange {
    pub fn is_delta(&self) -> bool {
        matches!(
            self,
            MetricChange::ActiveUsersDelta(_)
                | MetricChange::MauDelta(_)
                | MetricChange::NpsDelta(_)
                | MetricChange::BrandAwarenessDelta(_)
                | MetricChange::BudgetDelta(_)
        )
    }
}

/// Ordered list of changes. Order matters: later writes win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changeset {
    changes: Vec<MetricChange>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: MetricChange) {
        self.changes.push(change);
    }

    pub fn extend(&mut self, other: &Changeset) {
        self.changes.extend_from_slice(&other.changes);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricChange> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Net active-user delta across every entry.
    pub fn users_delta(&self) -> i64 {
        self.changes
            .iter()
            .map(|c| match c {
                MetricChange::ActiveUsersDelta(d) => *d,
                _ => 0,
            })
            .fold(0i64, |acc, d| acc.saturating_add(d))
    }
}

impl FromIterator<MetricChange> for Changeset {
    fn from_iter<I: IntoIterator<Item = MetricChange>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// Apply a single change to `state`.
pub fn apply_change(state: &mut GameState, change: MetricChange) -> EngineResult<()> {
    match change {
        MetricChange::ActiveUsersDelta(d) => {
            state.active_users = checked_add(state.active_users, d)?.max(0);
        }
        MetricChange::MauDelta(d) => {
            state.mau = checked_add(state.mau, d)?.max(0);
        }
        MetricChange::RetentionRate(v) => {
            state.community.retention_rate_30d = clamp_percent(v);
        }
        MetricChange::NpsScore(v) => {
            state.marketing.nps_score = clamp_nps(v);
        }
        MetricChange::NpsDelta(d) => {
            state.marketing.nps_score = clamp_nps(state.marketing.nps_score + d);
        }
        MetricChange::LegalRisk(v) => {
            state.legal.risk_level = clamp_percent(v);
        }
        MetricChange::BrandAwarenessDelta(d) => {
            state.marketing.brand_awareness = clamp_percent(state.marketing.brand_awareness + d);
        }
        MetricChange::AdRevenue(v) => state.revenue.ad_revenue = v,
        MetricChange::DonationRevenue(v) => state.revenue.donation_revenue = v,
        MetricChange::TotalRevenue(v) => state.revenue.total_revenue = v,
        MetricChange::TotalExpenses(v) => state.expenses.total_expenses = v,
        MetricChange::CashFlow(v) => state.financial.cash_flow = v,
        MetricChange::BudgetDelta(d) => {
            state.budget = checked_add(state.budget, d)?;
        }
        MetricChange::BurnRate(v) => state.financial.burn_rate = v.max(0),
        MetricChange::RunwayMonths(v) => state.financial.runway_months = v.max(0.0),
        MetricChange::ProfitMargin(v) => state.financial.profit_margin = v.clamp(-100.0, 100.0),
        MetricChange::Mau(v) => state.mau = v.max(0),
    }
    Ok(())
}

/// Apply every change in order. Stops at the first failure, leaving the
/// earlier writes in place.
pub fn apply_changeset(state: &mut GameState, changes: &Changeset) -> EngineResult<()> {
    for change in changes.iter() {
        apply_change(state, *change)?;
    }
    Ok(())
}
