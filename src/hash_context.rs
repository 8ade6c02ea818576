//! Shared RandomX cache/dataset, rebuilt atomically on seed change.
//!
//! Mirrors `RandomXManager`'s `updateSeed`, but where the original mutates
//! the cache in place and can be left holding a stale seed on a failed
//! dataset allocation, this builds the replacement cache and dataset fully
//! off to the side and only publishes them once both succeed. A failed
//! `update_seed` therefore never disturbs whatever was previously visible.

use randomx_rs::{RandomXCache, RandomXDataset, RandomXFlag, RandomXVM};
use std::env;
use std::sync::{Arc, RwLock};

use crate::error::ResourceError;

/// The currently-published (seed, cache, dataset) tuple. Dataset is always
/// present: this miner only runs in full-memory mode, matching the
/// original's 2 GiB dataset allocation on every seed change.
struct Published {
    seed: [u8; 32],
    cache: RandomXCache,
    dataset: RandomXDataset,
}

pub struct HashContext {
    flags: RandomXFlag,
    published: RwLock<Option<Published>>,
}

fn detect_flags() -> RandomXFlag {
    let mut flags = RandomXFlag::get_recommended_flags() | RandomXFlag::FLAG_FULL_MEM;
    if env::var("RANDOMX_MINER_LARGE_PAGES")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        flags |= RandomXFlag::FLAG_LARGE_PAGES;
    }
    flags
}

impl HashContext {
    pub fn new() -> Self {
        Self {
            flags: detect_flags(),
            published: RwLock::new(None),
        }
    }

    /// The seed currently visible to hashing threads, if any has been
    /// published yet.
    pub fn current_seed(&self) -> Option<[u8; 32]> {
        self.published
            .read()
            .expect("hash context lock poisoned")
            .as_ref()
            .map(|p| p.seed)
    }

    /// Rebuild cache and dataset for `seed` and publish them atomically.
    /// Returns `false` without touching anything if `seed` already matches
    /// what's published. On any failure the previously published (seed,
    /// cache, dataset) stays visible, unchanged.
    pub fn update_seed(&self, seed: &[u8; 32]) -> Result<bool, ResourceError> {
        if self.current_seed().as_ref() == Some(seed) {
            return Ok(false);
        }

        let cache = RandomXCache::new(self.flags, seed)
            .map_err(|e| ResourceError::CacheInit(e.to_string()))?;
        let dataset = RandomXDataset::new(self.flags, cache.clone(), 0)
            .map_err(|e| ResourceError::DatasetInit(e.to_string()))?;

        let mut slot = self.published.write().expect("hash context lock poisoned");
        *slot = Some(Published {
            seed: *seed,
            cache,
            dataset,
        });
        Ok(true)
    }

    /// Build a fresh VM bound to the currently published cache and dataset.
    /// Returns `None` if no seed has been published yet.
    pub fn new_vm(&self) -> Option<RandomXVM> {
        let slot = self.published.read().expect("hash context lock poisoned");
        let published = slot.as_ref()?;
        RandomXVM::new(
            self.flags,
            Some(published.cache.clone()),
            Some(published.dataset.clone()),
        )
        .ok()
    }
}

impl Default for HashContext {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedHashContext = Arc<HashContext>;

pub fn new_shared() -> SharedHashContext {
    Arc::new(HashContext::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_seed_published_yet_has_no_vm() {
        let ctx = HashContext::new();
        assert!(ctx.current_seed().is_none());
        assert!(ctx.new_vm().is_none());
    }

    // Full-dataset allocation takes several seconds and ~2 GiB of RAM, so
    // this is excluded from the default test run.
    #[test]
    #[ignore]
    fn update_seed_publishes_atomically() {
        let ctx = HashContext::new();
        let seed = [0x11u8; 32];
        assert!(ctx.update_seed(&seed).expect("seed update should succeed"));
        assert_eq!(ctx.current_seed(), Some(seed));
        assert!(ctx.new_vm().is_some());
        // A repeat of the same seed is a no-op.
        assert!(!ctx.update_seed(&seed).expect("no-op update should succeed"));
    }
}
