/// FileHub Engine — Win/Lose Evaluator
///
/// Pure predicates over state. Win is checked before lose.

use serde::{Deserialize, Serialize};

use crate::domain::GameState;

pub const WIN_USERS: i64 = 1_000_000;
pub const WIN_NPS: f64 = 70.0;
pub const WIN_MAX_RISK: f64 = 40.0;
pub const LOSE_MIN_USERS: i64 = 100;
pub const LOSE_RISK: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    Win,
    Lose,
}

pub fn is_win(state: &GameState) -> bool {
    state.active_users >= WIN_USERS
        && state.marketing.nps_score >= WIN_NPS
        && state.legal.risk_level <= WIN_MAX_RISK
        && state.financial.cash_flow > 0
}

pub fn is_lose(state: &GameState) -> bool {
    state.budget <= 0 || state.legal.risk_level >= LOSE_RISK || state.active_users < LOSE_MIN_USERS
}

pub fn evaluate_outcome(state: &GameState) -> Outcome {
    if is_win(state) {
        Outcome::Win
    } else if is_lose(state) {
        Outcome::Lose
    } else {
        Outcome::Ongoing
    }
}

/// Final score, floored at zero. Each term is floored on its own.
pub fn evaluate_score(state: &GameState) -> i64 {
    let nps = state.marketing.nps_score;
    let retention = state.community.retention_rate_30d;
    let risk = state.legal.risk_level;

    let users_term = state.active_users.div_euclid(10);
    let revenue_term = state.revenue.total_revenue.div_euclid(1000);
    let float_terms = ((nps + 100.0) * 5.0).floor()
        + (retention * 10.0).floor()
        + ((100.0 - risk) * 2.0).floor()
        - (risk * 5.0).floor();

    // bounded fields keep `float_terms` within a few thousand
    let total = users_term
        .saturating_add(revenue_term)
        .saturating_add(float_terms as i64);
    total.max(0)
}
