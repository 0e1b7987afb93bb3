//! Result cache for agent executions.
//!
//! Keys are deterministic over agent identity and resolved inputs, so
//! the same computation hits across executions and across nodes. The
//! cache is an optimization only: failures are silent and execution must
//! be correct without it. Only cacheable agents should be stored here; a
//! hit surfaces on the stream as NODE_CACHE_HIT.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::AgentId;

/// Immutable cache key.
///
/// Deliberately excludes the execution id and node id: the same agent
/// with the same inputs shares one entry everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub agent_id: AgentId,
    pub inputs_hash: String,
    pub agent_version: String,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.agent_id, self.agent_version, self.inputs_hash)
    }
}

/// Deterministic hash of resolved inputs: SHA-256 over the canonical
/// JSON encoding, truncated to 16 hex characters.
pub fn compute_inputs_hash(inputs: &Map<String, Value>) -> String {
    // serde_json maps are ordered by key, so encoding is canonical.
    let serialized =
        serde_json::to_string(inputs).unwrap_or_else(|_| format!("{inputs:?}"));
    let digest = Sha256::digest(serialized.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..16].to_string()
}

/// Build the cache key for one agent invocation.
pub fn cache_key(
    agent_id: &AgentId,
    inputs: &Map<String, Value>,
    agent_version: &str,
) -> CacheKey {
    CacheKey {
        agent_id: agent_id.clone(),
        inputs_hash: compute_inputs_hash(inputs),
        agent_version: agent_version.to_string(),
    }
}

/// A cached execution result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub output: Value,
    pub duration_ms: u64,
    pub cached_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    store: HashMap<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// In-memory result cache. Stores only successful outputs.
#[derive(Default)]
pub struct ResultCache {
    state: Mutex<CacheState>,
}

/// Counters for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut state = self.state.lock();
        match state.store.get(key).cloned() {
            Some(entry) => {
                state.hits += 1;
                Some(entry)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    pub fn set(&self, key: CacheKey, output: Value, duration_ms: u64) {
        let entry = CacheEntry {
            output,
            duration_ms,
            cached_at: Utc::now(),
        };
        self.state.lock().store.insert(key, entry);
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.state.lock().store.contains_key(key)
    }

    /// Remove an entry; true if it existed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.state.lock().store.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.store.clear();
        state.hits = 0;
        state.misses = 0;
    }

    pub fn hit_rate(&self) -> f64 {
        let state = self.state.lock();
        let total = state.hits + state.misses;
        if total == 0 {
            0.0
        } else {
            state.hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            size: state.store.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_inputs_hash_is_deterministic() {
        let a = inputs(json!({"x": 1, "y": "two"}));
        let b = inputs(json!({"y": "two", "x": 1}));
        assert_eq!(compute_inputs_hash(&a), compute_inputs_hash(&b));
        assert_eq!(compute_inputs_hash(&a).len(), 16);
    }

    #[test]
    fn test_different_inputs_differ() {
        let a = inputs(json!({"x": 1}));
        let b = inputs(json!({"x": 2}));
        assert_ne!(compute_inputs_hash(&a), compute_inputs_hash(&b));
    }

    #[test]
    fn test_key_excludes_execution_context() {
        let agent = AgentId::from("summarizer");
        let key1 = cache_key(&agent, &inputs(json!({"text": "hello"})), "1.0.0");
        let key2 = cache_key(&agent, &inputs(json!({"text": "hello"})), "1.0.0");
        assert_eq!(key1, key2);

        let other_version = cache_key(&agent, &inputs(json!({"text": "hello"})), "2.0.0");
        assert_ne!(key1, other_version);
    }

    #[test]
    fn test_get_set_roundtrip() {
        let cache = ResultCache::new();
        let key = cache_key(&AgentId::from("a"), &inputs(json!({"x": 1})), "1.0.0");

        assert!(cache.get(&key).is_none());
        cache.set(key.clone(), json!({"summary": "done"}), 120);
        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.output, json!({"summary": "done"}));
        assert_eq!(entry.duration_ms, 120);
    }

    #[test]
    fn test_stats_and_hit_rate() {
        let cache = ResultCache::new();
        let key = cache_key(&AgentId::from("a"), &Map::new(), "1.0.0");
        cache.get(&key); // miss
        cache.set(key.clone(), json!(null), 1);
        cache.get(&key); // hit

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ResultCache::new();
        let key = cache_key(&AgentId::from("a"), &Map::new(), "1.0.0");
        cache.set(key.clone(), json!(1), 1);
        assert!(cache.has(&key));
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));

        cache.set(key.clone(), json!(1), 1);
        cache.clear();
        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.stats().misses, 0);
    }
}
