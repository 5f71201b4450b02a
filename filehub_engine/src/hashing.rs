/// FileHub Engine — Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing.
///
/// Rules:
///   - `engine_version` is the first field, then the state
///   - struct fields in declaration order, maps sorted by key
///   - compact UTF-8 JSON, no whitespace
///   - floats in shortest round-trip form

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::GameState;
use crate::ENGINE_VERSION;

/// Canonical serialization of a state to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &GameState) -> serde_json::Result<Vec<u8>> {
    let value = build_canonical_value(state)?;
    serde_json::to_vec(&value)
}

/// SHA-256 of the canonical serialization, lowercase hex.
pub fn canonical_hash(state: &GameState) -> serde_json::Result<String> {
    let bytes = canonical_serialize(state)?;
    Ok(hex_digest(&bytes))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn build_canonical_value(state: &GameState) -> serde_json::Result<Value> {
    // engine_version MUST be first: it binds the hash to the rules that produced the state
    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number(ENGINE_VERSION.into()),
    );
    root.insert("state".to_string(), serde_json::to_value(state)?);
    Ok(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::create_initial_state;

    #[test]
    fn version_is_first_field() {
        let state = create_initial_state(5, &GameConfig::default());
        let bytes = canonical_serialize(&state).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(&format!("{{\"engine_version\":{},\"state\":{{", ENGINE_VERSION)));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn equal_states_hash_equal() {
        let a = create_initial_state(5, &GameConfig::default());
        let b = create_initial_state(5, &GameConfig::default());
        let h = canonical_hash(&a).unwrap();
        assert_eq!(h, canonical_hash(&b).unwrap());
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn any_field_change_changes_hash() {
        let a = create_initial_state(5, &GameConfig::default());
        let mut b = a.clone();
        b.community.toxicity += 0.5;
        assert_ne!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
    }
}
