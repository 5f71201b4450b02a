/// FileHub Engine — Invariant Checks
///
/// `try_validate_invariants` returns the first violation as an
/// `InvariantViolation`; `validate_invariants` panics on it and is meant
/// for tests and debug tooling.

use std::collections::BTreeSet;

use crate::domain::{GameState, SetupStep};
use crate::error::{EngineError, EngineResult};
use crate::names::validate_domain;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every check. Panics on the first failure.
pub fn validate_invariants(state: &GameState) {
    if let Err(e) = try_validate_invariants(state) {
        panic!("{}", e);
    }
}

/// Run every check, returning the first failure.
pub fn try_validate_invariants(state: &GameState) -> EngineResult<()> {
    check_bounded_fields(state).map_err(EngineError::InvariantViolation)?;
    check_user_counts(state).map_err(EngineError::InvariantViolation)?;
    check_staff_records(state).map_err(EngineError::InvariantViolation)?;
    check_event_history(state).map_err(EngineError::InvariantViolation)?;
    check_pending_queue(state).map_err(EngineError::InvariantViolation)?;
    check_setup(state).map_err(EngineError::InvariantViolation)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn in_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if value.is_nan() || value < min || value > max {
        return Err(format!(
            "[INVARIANT:bounded_field] {} = {} is outside [{}, {}]",
            name, value, min, max
        ));
    }
    Ok(())
}

/// Every percentage in [0, 100]; NPS and profit margin in [-100, 100].
fn check_bounded_fields(state: &GameState) -> Result<(), String> {
    let percents = [
        ("infrastructure.uptime", state.infrastructure.uptime),
        ("infrastructure.load", state.infrastructure.load),
        ("marketing.conversion_rate", state.marketing.conversion_rate),
        ("marketing.brand_awareness", state.marketing.brand_awareness),
        ("community.retention_rate_30d", state.community.retention_rate_30d),
        ("community.toxicity", state.community.toxicity),
        ("community.moderation_score", state.community.moderation_score),
        ("community.community_health", state.community.community_health),
        ("legal.risk_level", state.legal.risk_level),
        ("legal.compliance_score", state.legal.compliance_score),
        ("legal.transparency_score", state.legal.transparency_score),
        ("legal.cooperation_level", state.legal.cooperation_level),
    ];
    for (name, value) in percents {
        in_range(name, value, 0.0, 100.0)?;
    }
    in_range("marketing.nps_score", state.marketing.nps_score, -100.0, 100.0)?;
    in_range("financial.profit_margin", state.financial.profit_margin, -100.0, 100.0)?;
    Ok(())
}

fn check_user_counts(state: &GameState) -> Result<(), String> {
    if state.active_users < 0 {
        return Err(format!("[INVARIANT:user_counts] active_users = {} is negative", state.active_users));
    }
    if state.mau < 0 {
        return Err(format!("[INVARIANT:user_counts] mau = {} is negative", state.mau));
    }
    Ok(())
}

/// Each staff record sits under its own role; skill in 1..=10.
fn check_staff_records(state: &GameState) -> Result<(), String> {
    for (role, staff) in &state.staff {
        if staff.role != *role {
            return Err(format!(
                "[INVARIANT:staff_records] record for {} is filed under {}",
                staff.role, role
            ));
        }
        if !(1..=10).contains(&staff.skill_level) {
            return Err(format!(
                "[INVARIANT:staff_records] {} has skill {} outside 1..=10",
                role, staff.skill_level
            ));
        }
        if staff.hired && staff.hired_turn.is_none() {
            return Err(format!("[INVARIANT:staff_records] {} is hired with no hire turn", role));
        }
    }
    Ok(())
}

/// Unique ids below `next_event_id`; resolved events carry one of their
/// own choices, unresolved events carry none.
fn check_event_history(state: &GameState) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for event in &state.events {
        if !seen.insert(event.id) {
            return Err(format!("[INVARIANT:event_history] duplicate event id {}", event.id));
        }
        if event.id >= state.next_event_id {
            return Err(format!(
                "[INVARIANT:event_history] event id {} is not below next id {}",
                event.id, state.next_event_id
            ));
        }
        match (&event.selected_choice, event.resolved) {
            (Some(choice), true) => {
                if !event.choices.contains(choice) {
                    return Err(format!(
                        "[INVARIANT:event_history] event {} selected {:?}, not one of its choices",
                        event.id, choice
                    ));
                }
            }
            (None, false) => {}
            _ => {
                return Err(format!(
                    "[INVARIANT:event_history] event {} resolved flag disagrees with its selection",
                    event.id
                ));
            }
        }
    }
    Ok(())
}

/// The queue holds exactly the unresolved events, each once.
fn check_pending_queue(state: &GameState) -> Result<(), String> {
    let mut queued = BTreeSet::new();
    for id in &state.pending_events {
        if !queued.insert(*id) {
            return Err(format!("[INVARIANT:pending_queue] event {} queued twice", id));
        }
        match state.event(*id) {
            None => {
                return Err(format!("[INVARIANT:pending_queue] queued event {} does not exist", id));
            }
            Some(e) if e.resolved => {
                return Err(format!("[INVARIANT:pending_queue] queued event {} is already resolved", id));
            }
            Some(_) => {}
        }
    }
    if let Some(e) = state.events.iter().find(|e| !e.resolved && !queued.contains(&e.id)) {
        return Err(format!("[INVARIANT:pending_queue] unresolved event {} is not queued", e.id));
    }
    Ok(())
}

fn check_setup(state: &GameState) -> Result<(), String> {
    if !state.setup_complete {
        return Ok(());
    }
    if state.setup_step != SetupStep::Complete {
        return Err(format!(
            "[INVARIANT:setup] setup is complete but step is {:?}",
            state.setup_step
        ));
    }
    if !validate_domain(&state.domain_name) {
        return Err(format!("[INVARIANT:setup] domain {:?} is malformed", state.domain_name));
    }
    Ok(())
}
