use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::errors::Result;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let mut out = String::with_capacity(64);
        for b in self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{b:02x}");
        }
        out
    }

    /// First 12 hex characters, for log fields.
    #[must_use]
    pub fn short(self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl core::fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl core::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[must_use]
pub fn stable_hash_bytes(bytes: &[u8]) -> Hash256 {
    let digest = Sha256::digest(bytes);
    let mut out = [0_u8; 32];
    out.copy_from_slice(&digest);
    Hash256(out)
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    stable_hash_bytes(bytes).to_hex()
}

/// JSON bytes with object keys sorted at every depth.
pub fn stable_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let raw = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&normalize_json_value(raw))?)
}

pub fn stable_json_hash<T: Serialize>(value: &T) -> Result<Hash256> {
    let bytes = stable_json_bytes(value)?;
    Ok(stable_hash_bytes(&bytes))
}

fn normalize_json_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .map(|(k, v)| (k, normalize_json_value(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_json_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{stable_json_bytes, stable_json_hash};
    use serde_json::json;

    #[test]
    fn canonical_json_orders_object_keys() {
        let value = json!({
            "sort": {"direction": "desc", "field": "budget"},
            "filters": [{"values": ["Paused", "Active"], "dimension": "status"}],
        });

        let bytes = stable_json_bytes(&value).expect("stable json bytes");
        let text = String::from_utf8(bytes).expect("utf8 json");
        assert_eq!(
            text,
            r#"{"filters":[{"dimension":"status","values":["Paused","Active"]}],"sort":{"direction":"desc","field":"budget"}}"#
        );
    }

    #[test]
    fn short_hash_is_a_prefix_of_the_full_hash() {
        let hash = stable_json_hash(&json!({"a": 1})).expect("hash");
        assert!(hash.to_hex().starts_with(&hash.short()));
        assert_eq!(hash.short().len(), 12);
    }
}
