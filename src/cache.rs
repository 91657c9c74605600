//! Per-file parse cache (§4.4): path → `(mtime, directives)`, consulted on
//! every request by the walker. Built on `dashmap::DashMap` rather than a
//! hand-rolled `RwLock<HashMap<..>>` — the `daemon` module's own
//! `concurrent-sessions` feature reaches for `dashmap` for exactly this
//! shape of per-key concurrent state, and `DashMap`'s per-shard locking
//! already gives the atomic-entry-swap guarantee §4.4 demands without
//! hand-rolling a reader-writer discipline.

use crate::directive::Directive;
use dashmap::DashMap;

#[derive(Clone, Debug)]
struct CacheEntry {
    mtime: i64,
    directives: Vec<Directive>,
    byte_usage: usize,
}

/// Process-wide singleton, installed once via [`ParseCache::init`] and torn
/// down via [`ParseCache::destroy`] — the two authorized lifecycle points
/// called out in the design notes for global mutable state.
pub struct ParseCache {
    entries: DashMap<String, CacheEntry>,
}

/// Advisory per-entry byte budget (§3.3); not enforced, only reported.
const DEFAULT_ENTRY_BUDGET: usize = 2048;

impl ParseCache {
    /// `bucket_count` is accepted for a "fixed at init" bucket-count model
    /// but `DashMap` manages its own shard count; the parameter only
    /// pre-sizes the underlying map.
    #[must_use]
    pub fn init(bucket_count: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(bucket_count),
        }
    }

    /// Returns a deep clone of the cached list iff an entry exists for
    /// `path` AND its stored `mtime` equals `current_mtime`. Any other
    /// outcome is a miss — there is no stale read.
    #[must_use]
    pub fn get(&self, path: &str, current_mtime: i64) -> Option<Vec<Directive>> {
        let entry = self.entries.get(path)?;
        if entry.mtime == current_mtime {
            Some(entry.directives.clone())
        } else {
            None
        }
    }

    /// Inserts or replaces the entry for `path`. The cache takes ownership
    /// of `directives`; any previous entry for this path is dropped.
    pub fn put(&self, path: String, mtime: i64, directives: Vec<Directive>) {
        let byte_usage = estimate_bytes(&directives).min(DEFAULT_ENTRY_BUDGET * directives.len().max(1));
        self.entries.insert(
            path,
            CacheEntry {
                mtime,
                directives,
                byte_usage,
            },
        );
    }

    /// Advisory byte-usage estimate for a cached entry, or `None` if absent.
    #[must_use]
    pub fn byte_usage(&self, path: &str) -> Option<usize> {
        self.entries.get(path).map(|e| e.byte_usage)
    }

    /// Removes every entry. Idempotent; safe to call on an empty cache.
    pub fn destroy(&self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn estimate_bytes(directives: &[Directive]) -> usize {
    directives
        .iter()
        .map(|d| {
            let mut size = std::mem::size_of::<Directive>();
            size += d.name.as_ref().map_or(0, String::len);
            size += d.value.as_ref().map_or(0, String::len);
            size += estimate_bytes(d.children());
            size
        })
        .sum()
}
