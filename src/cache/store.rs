use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::cache::tags::{QueryKey, Tag};
use crate::error::ApiError;

pub type FetchOutcome = Option<Result<Value, ApiError>>;

enum CacheEntry {
    Fresh {
        value: Value,
        fetched_at: DateTime<Utc>,
    },
    Stale {
        value: Value,
    },
    InFlight {
        rx: watch::Receiver<FetchOutcome>,
        // set when an invalidation lands while the fetch is in flight
        dirty: bool,
    },
}

pub enum Admission {
    Hit(Value),
    Owner(watch::Sender<FetchOutcome>),
    Waiter(watch::Receiver<FetchOutcome>),
}

pub struct CacheStore {
    entries: DashMap<QueryKey, CacheEntry>,
    tag_to_keys: DashMap<Tag, HashSet<QueryKey>>,
    key_to_tags: DashMap<QueryKey, HashSet<Tag>>,
    stale_after: Duration,
}

impl CacheStore {
    pub fn new(stale_after_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            tag_to_keys: DashMap::new(),
            key_to_tags: DashMap::new(),
            stale_after: Duration::seconds(stale_after_secs as i64),
        }
    }

    /// Admit a read for `key`: fresh hit, owned fetch, or join of an
    /// identical in-flight request. The key is registered under its provided
    /// tags immediately so invalidations can reach it before the first fetch
    /// resolves.
    pub fn admit(&self, key: &QueryKey, provides: &[Tag], force: bool) -> Admission {
        self.register(key, provides);

        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                CacheEntry::Fresh { value, fetched_at } => {
                    let expired = Utc::now() - *fetched_at > self.stale_after;
                    if !force && !expired {
                        return Admission::Hit(value.clone());
                    }
                    let (tx, rx) = watch::channel(None);
                    occupied.insert(CacheEntry::InFlight { rx, dirty: false });
                    Admission::Owner(tx)
                }
                CacheEntry::Stale { .. } => {
                    let (tx, rx) = watch::channel(None);
                    occupied.insert(CacheEntry::InFlight { rx, dirty: false });
                    Admission::Owner(tx)
                }
                CacheEntry::InFlight { rx, .. } => Admission::Waiter(rx.clone()),
            },
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(None);
                vacant.insert(CacheEntry::InFlight { rx, dirty: false });
                Admission::Owner(tx)
            }
        }
    }

    /// Record the outcome of an owned fetch and wake all waiters. Returns
    /// true when an invalidation landed mid-flight, in which case the result
    /// is stored already stale and the caller must schedule a refetch for
    /// live subscribers.
    pub fn complete_fetch(
        &self,
        key: &QueryKey,
        result: Result<Value, ApiError>,
        tx: watch::Sender<FetchOutcome>,
    ) -> bool {
        let was_dirty = matches!(
            self.entries.get(key).as_deref(),
            Some(CacheEntry::InFlight { dirty: true, .. })
        );

        match &result {
            Ok(value) => {
                let entry = if was_dirty {
                    CacheEntry::Stale {
                        value: value.clone(),
                    }
                } else {
                    CacheEntry::Fresh {
                        value: value.clone(),
                        fetched_at: Utc::now(),
                    }
                };
                self.entries.insert(key.clone(), entry);
            }
            Err(_) => {
                self.entries.remove(key);
            }
        }

        let _ = tx.send(Some(result));
        was_dirty
    }

    fn register(&self, key: &QueryKey, provides: &[Tag]) {
        for tag in provides {
            self.tag_to_keys
                .entry(*tag)
                .or_default()
                .insert(key.clone());
        }
        self.key_to_tags
            .insert(key.clone(), provides.iter().copied().collect());
    }

    /// Mark every entry under `tags` stale. In-flight entries are flagged
    /// dirty instead, so their eventual result does not land as fresh.
    pub fn invalidate(&self, tags: &[Tag]) -> Vec<QueryKey> {
        let mut affected = HashSet::new();

        for tag in tags {
            if let Some(keys) = self.tag_to_keys.get(tag) {
                affected.extend(keys.iter().cloned());
            }
        }

        for key in &affected {
            if let Some(mut entry) = self.entries.get_mut(key) {
                let stale_value = match &mut *entry {
                    CacheEntry::Fresh { value, .. } => Some(value.clone()),
                    CacheEntry::InFlight { dirty, .. } => {
                        *dirty = true;
                        None
                    }
                    CacheEntry::Stale { .. } => None,
                };
                if let Some(value) = stale_value {
                    *entry = CacheEntry::Stale { value };
                }
            }
        }

        debug!(tags = ?tags, affected = affected.len(), "cache invalidated");
        affected.into_iter().collect()
    }

    /// Replace the row addressed by `(tag, id)` inside every settled cached
    /// entry for that tag, locating it by `_id`.
    pub fn patch_row(&self, tag: Tag, id: &str, row: &Value) -> Vec<QueryKey> {
        let keys: Vec<QueryKey> = self
            .tag_to_keys
            .get(&tag)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        let mut patched = Vec::new();

        for key in keys {
            if let Some(mut entry) = self.entries.get_mut(&key) {
                let value = match &mut *entry {
                    CacheEntry::Fresh { value, .. } => value,
                    CacheEntry::Stale { value } => value,
                    CacheEntry::InFlight { .. } => continue,
                };

                if splice_row(value, id, row) {
                    patched.push(key.clone());
                }
            }
        }

        if !patched.is_empty() {
            debug!(tag = tag.as_str(), id, entries = patched.len(), "cached row patched");
        }

        patched
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.entries.get(key).and_then(|entry| match &*entry {
            CacheEntry::Fresh { value, .. } => Some(value.clone()),
            CacheEntry::Stale { value } => Some(value.clone()),
            CacheEntry::InFlight { .. } => None,
        })
    }

    pub fn reset(&self) {
        self.entries.clear();
        self.tag_to_keys.clear();
        self.key_to_tags.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// List entries are either a bare array or `{ "data": [...], "meta": ... }`;
// single-entity entries with a matching `_id` are replaced wholesale.
fn splice_row(value: &mut Value, id: &str, row: &Value) -> bool {
    let items = match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => match obj.get_mut("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    };

    if let Some(items) = items {
        for item in items.iter_mut() {
            if item.get("_id").and_then(Value::as_str) == Some(id) {
                *item = row.clone();
                return true;
            }
        }
        return false;
    }

    if value.get("_id").and_then(Value::as_str) == Some(id) {
        *value = row.clone();
        return true;
    }

    false
}
