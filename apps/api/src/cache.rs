//! Content-addressed extraction cache. Keyed on a fingerprint of the
//! uploaded bytes so re-uploads of the same document skip the expensive
//! extraction cascade. Cached output is never trusted blindly: the
//! pipeline re-runs the quality gate on every hit, so tightening the
//! thresholds invalidates stale passes without flushing anything.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::RwLock;

use crate::extraction::cascade::ExtractionResult;

const MAX_ENTRIES: usize = 256;

/// Fingerprints are process-scoped: `DefaultHasher` output is not stable
/// across Rust releases, and nothing keyed on it is persisted or shared
/// between processes. A cache restart starting cold is acceptable here.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

pub trait FingerprintCache: Send + Sync {
    fn get(&self, fingerprint: u64) -> Option<ExtractionResult>;
    fn put(&self, fingerprint: u64, result: ExtractionResult);
}

/// Process-local cache with a hard entry cap. Eviction is arbitrary
/// rather than LRU; at this size recency bookkeeping buys nothing.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<u64, ExtractionResult>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FingerprintCache for MemoryCache {
    fn get(&self, fingerprint: u64) -> Option<ExtractionResult> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(&fingerprint).cloned())
    }

    fn put(&self, fingerprint: u64, result: ExtractionResult) {
        if let Ok(mut map) = self.entries.write() {
            if map.len() >= MAX_ENTRIES && !map.contains_key(&fingerprint) {
                if let Some(&victim) = map.keys().next() {
                    map.remove(&victim);
                }
            }
            map.insert(fingerprint, result);
        }
    }
}

/// Cache that never hits, for deployments that want every upload
/// re-extracted.
pub struct NoopCache;

impl FingerprintCache for NoopCache {
    fn get(&self, _fingerprint: u64) -> Option<ExtractionResult> {
        None
    }

    fn put(&self, _fingerprint: u64, _result: ExtractionResult) {}
}
