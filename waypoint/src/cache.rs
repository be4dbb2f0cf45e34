//! Defines `PatternCache`, a bounded least-recently-used cache of compiled patterns.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use linked_hash_map::LinkedHashMap;
use log::{debug, trace};

use crate::config::{CacheOptions, PatternOptions};
use crate::error::Result;
use crate::pattern::Pattern;

/// Compiled patterns keyed by their text, shared between threads.
///
/// Every lookup refreshes the entry; once the cache holds more than `capacity` patterns the
/// least recently used one is dropped. Cloning the cache shares the same storage.
///
/// ```rust
/// # use std::sync::Arc;
/// # use waypoint::cache::PatternCache;
/// # use waypoint::config::{CacheOptions, PatternOptions};
/// # fn main() -> waypoint::error::Result<()> {
/// let cache = PatternCache::new(PatternOptions::default(), CacheOptions { capacity: 2 });
/// let first = cache.get_or_compile("/hotels/{hotel}")?;
/// let second = cache.get_or_compile("/hotels/{hotel}")?;
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PatternCache {
    options: PatternOptions,
    capacity: usize,
    // Compilation happens outside the lock, so the map is never left half updated and a
    // poisoned lock is safe to recover.
    storage: Arc<Mutex<LinkedHashMap<String, Arc<Pattern>>>>,
}

impl PatternCache {
    /// Creates an empty cache compiling with `options`.
    pub fn new(options: PatternOptions, cache: CacheOptions) -> Self {
        PatternCache {
            options,
            capacity: cache.capacity,
            storage: Arc::new(Mutex::new(LinkedHashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LinkedHashMap<String, Arc<Pattern>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Options patterns are compiled with.
    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    /// Maximum number of patterns kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of patterns currently cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every cached pattern.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the cached pattern for `text`, compiling and caching it on a miss. Patterns
    /// which fail to compile are not cached.
    pub fn get_or_compile(&self, text: &str) -> Result<Arc<Pattern>> {
        if let Some(pattern) = self.lock().get_refresh(text) {
            trace!(" pattern cache hit for `{}`", text);
            return Ok(pattern.clone());
        }

        trace!(" pattern cache miss for `{}`", text);
        let pattern = Arc::new(Pattern::compile(text, &self.options)?);

        let mut storage = self.lock();
        storage.insert(text.to_owned(), pattern.clone());
        while storage.len() > self.capacity {
            match storage.pop_front() {
                Some((evicted, _)) => debug!(" evicted pattern `{}` from cache", evicted),
                None => break,
            }
        }

        Ok(pattern)
    }
}
