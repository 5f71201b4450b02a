//! Drift detection — determinism verification and state comparison.
//!
//! `compare_states` reports how far apart two states are; the usual pair is
//! a persisted record and the state rebuilt from the journal.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use filehub_engine::domain::{GameState, PlayerId, StaffRole};
use filehub_engine::GameEngine;

use crate::error::{RuntimeError, RuntimeResult};
use crate::journal::JournalEntry;
use crate::replay;

/// Rebuild twice from the same journal and require identical hashes.
/// Returns the hash.
pub fn verify_determinism(engine: &GameEngine, player_id: PlayerId, entries: &[JournalEntry]) -> RuntimeResult<String> {
    let hash1 = replay::rebuild_hash(engine, player_id, entries)?;
    let hash2 = replay::rebuild_hash(engine, player_id, entries)?;
    if hash1 != hash2 {
        return Err(RuntimeError::HashMismatch {
            player_id,
            stored: hash1,
            computed: hash2,
        });
    }
    Ok(hash1)
}

/// Structured comparison of `a` (before / expected) and `b` (after / actual).
pub fn compare_states(a: &GameState, b: &GameState) -> RuntimeResult<DriftReport> {
    let hired_a: BTreeSet<StaffRole> = hired(a);
    let hired_b: BTreeSet<StaffRole> = hired(b);

    Ok(DriftReport {
        turn_delta: i64::from(b.current_turn) - i64::from(a.current_turn),
        active_users_delta: b.active_users - a.active_users,
        mau_delta: b.mau - a.mau,
        budget_delta: b.budget - a.budget,
        total_revenue_delta: b.revenue.total_revenue - a.revenue.total_revenue,
        nps_delta: b.marketing.nps_score - a.marketing.nps_score,
        legal_risk_delta: b.legal.risk_level - a.legal.risk_level,
        events_delta: b.events.len() as i64 - a.events.len() as i64,
        pending_delta: b.pending_events.len() as i64 - a.pending_events.len() as i64,
        domain_changed: a.domain_name != b.domain_name,
        hired_roles: hired_b.difference(&hired_a).copied().collect(),
        released_roles: hired_a.difference(&hired_b).copied().collect(),
        changed_fields: changed_fields(a, b)?,
    })
}

fn hired(state: &GameState) -> BTreeSet<StaffRole> {
    state.staff.values().filter(|s| s.hired).map(|s| s.role).collect()
}

/// Top-level state fields whose serialized values differ, in field order.
fn changed_fields(a: &GameState, b: &GameState) -> RuntimeResult<Vec<String>> {
    let (Value::Object(va), Value::Object(vb)) = (serde_json::to_value(a)?, serde_json::to_value(b)?) else {
        return Ok(Vec::new());
    };
    Ok(va
        .iter()
        .filter(|(key, value)| vb.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub turn_delta: i64,
    pub active_users_delta: i64,
    pub mau_delta: i64,
    pub budget_delta: i64,
    pub total_revenue_delta: i64,
    pub nps_delta: f64,
    pub legal_risk_delta: f64,
    pub events_delta: i64,
    pub pending_delta: i64,
    pub domain_changed: bool,
    pub hired_roles: Vec<StaffRole>,
    pub released_roles: Vec<StaffRole>,
    pub changed_fields: Vec<String>,
}

impl DriftReport {
    pub fn is_identical(&self) -> bool {
        self.changed_fields.is_empty()
    }
}
