use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Relation, StoreError, TableStore};

/// TTL read cache over a [`TableStore`]. Any mutation invalidates every
/// cached table, not only the one written: derivations routinely join
/// across tables, and cross-table staleness would be observable.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    loaded_at: Instant,
    relation: Relation,
}

impl<S: TableStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn invalidate_all(&self) {
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        if !guard.is_empty() {
            debug!(tables = guard.len(), "invalidating store cache");
        }
        guard.clear();
    }
}

impl<S: TableStore> TableStore for CachedStore<S> {
    fn load(&self, table: &str) -> Result<Relation, StoreError> {
        {
            let guard = self.entries.lock().expect("cache mutex poisoned");
            if let Some(entry) = guard.get(table) {
                if entry.loaded_at.elapsed() <= self.ttl {
                    return Ok(entry.relation.clone());
                }
            }
        }

        let relation = self.inner.load(table)?;
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        guard.insert(
            table.to_string(),
            CacheEntry {
                loaded_at: Instant::now(),
                relation: relation.clone(),
            },
        );
        Ok(relation)
    }

    fn save(&self, table: &str, relation: &Relation) -> Result<(), StoreError> {
        let result = self.inner.save(table, relation);
        self.invalidate_all();
        result
    }
}
