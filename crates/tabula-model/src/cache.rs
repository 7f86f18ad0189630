use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Interning cache for cell values.
///
/// Returns a previously cached allocation for an equal string while any cell
/// still holds it, so sheets with many repeated values (bulk imports, `"N/A"`
/// markers, ...) share one backing allocation per distinct string. Entries are
/// weak: once every holder drops the value it becomes reclaimable, and dead
/// entries are purged when the map has doubled since the last purge.
///
/// Callers must not rely on allocation identity except as an optimization.
#[derive(Debug)]
pub struct ValueCache {
    strings: HashMap<Box<str>, Weak<str>>,
    purge_at: usize,
}

const MIN_PURGE_THRESHOLD: usize = 32;

impl ValueCache {
    pub fn new() -> Self {
        Self {
            strings: HashMap::new(),
            purge_at: MIN_PURGE_THRESHOLD,
        }
    }

    /// Return the canonical allocation for `s`, caching it if absent or
    /// already reclaimed.
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(weak) = self.strings.get(s) {
            if let Some(live) = weak.upgrade() {
                return live;
            }
        }

        let live: Arc<str> = Arc::from(s);
        self.strings.insert(Box::from(s), Arc::downgrade(&live));

        if self.strings.len() >= self.purge_at {
            self.purge();
            self.purge_at = (self.strings.len() * 2).max(MIN_PURGE_THRESHOLD);
        }

        live
    }

    /// Drop entries whose canonical allocation has been reclaimed.
    pub fn purge(&mut self) {
        self.strings.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of entries, including not-yet-purged dead ones.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for ValueCache {
    fn default() -> Self {
        Self::new()
    }
}
