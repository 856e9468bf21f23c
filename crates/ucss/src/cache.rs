//! Per-session memoization: the token cache, the blocked set and the
//! parent-scope ordering map.
//!
//! All three are shared by every in-flight token resolution of a batch and
//! guarded by `parking_lot` read/write locks. Inserts are idempotent, so two
//! resolutions racing on the same token store equal values.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::stringify::StringifiedUtil;

/// The compiled output of one token; `None` means "resolved to nothing".
pub type CachedUtils = Option<Arc<[StringifiedUtil]>>;

/// Builds the cache key for a token resolved under an optional alias.
pub fn cache_key(raw: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{raw} {alias}"),
        None => raw.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct TokenCache {
    entries: RwLock<HashMap<String, CachedUtils>>,
    blocked: RwLock<HashSet<String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the key was never resolved, `Some(None)` when it resolved
    /// to nothing.
    pub fn get(&self, key: &str) -> Option<CachedUtils> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: String, value: CachedUtils) {
        self.entries.write().insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn block(&self, raw: impl Into<String>) {
        self.blocked.write().insert(raw.into());
    }

    pub fn is_blocked(&self, raw: &str) -> bool {
        self.blocked.read().contains(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.blocked.write().clear();
    }
}

/// Ordering weights of parent scopes, fixed the first time each is seen.
#[derive(Debug, Default)]
pub struct ParentOrders {
    orders: RwLock<HashMap<String, i32>>,
}

impl ParentOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `order` for `parent` unless one is already known.
    pub fn record(&self, parent: &str, order: i32) {
        if self.orders.read().contains_key(parent) {
            return;
        }
        self.orders
            .write()
            .entry(parent.to_string())
            .or_insert(order);
    }

    pub fn get(&self, parent: &str) -> Option<i32> {
        self.orders.read().get(parent).copied()
    }

    /// A point-in-time copy used by the assembler.
    pub fn snapshot(&self) -> HashMap<String, i32> {
        self.orders.read().clone()
    }
}
