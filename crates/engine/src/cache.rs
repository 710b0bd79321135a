//! Fingerprint-keyed memoization for expensive derived artifacts.
//!
//! The similarity matrix and the trained preference model are pure
//! functions of their input data, so they are cached under a content
//! fingerprint of that input: a hit returns the shared artifact, a
//! changed fingerprint rebuilds and replaces it. One slot suffices —
//! the engine serves a single catalog at a time.

use std::sync::{Arc, Mutex};
use tracing::debug;

/// Single-slot cache keyed by a content fingerprint.
///
/// The slot lock is held across a rebuild, serializing builders so a
/// rebuild happens once per data change even under shared use.
pub struct FingerprintCache<T> {
    slot: Mutex<Option<(u64, Arc<T>)>>,
    name: &'static str,
}

impl<T> FingerprintCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            slot: Mutex::new(None),
            name,
        }
    }

    /// Return the cached artifact for `fingerprint`, building and storing
    /// it on a miss. Build errors leave the previous entry in place.
    pub fn get_or_build<E>(
        &self,
        fingerprint: u64,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock().expect("cache lock poisoned");

        if let Some((cached_fp, artifact)) = slot.as_ref() {
            if *cached_fp == fingerprint {
                debug!("{} cache hit ({:#x})", self.name, fingerprint);
                return Ok(Arc::clone(artifact));
            }
        }

        debug!("{} cache miss, rebuilding ({:#x})", self.name, fingerprint);
        let artifact = Arc::new(build()?);
        *slot = Some((fingerprint, Arc::clone(&artifact)));
        Ok(artifact)
    }

    /// Drop the cached entry regardless of fingerprint
    pub fn invalidate(&self) {
        *self.slot.lock().expect("cache lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_build(counter: &AtomicUsize, value: u32) -> Result<u32, Infallible> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[test]
    fn test_hit_reuses_artifact() {
        let cache = FingerprintCache::new("test");
        let builds = AtomicUsize::new(0);

        let a = cache.get_or_build(7, || counted_build(&builds, 1)).unwrap();
        let b = cache.get_or_build(7, || counted_build(&builds, 2)).unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_changed_fingerprint_rebuilds() {
        let cache = FingerprintCache::new("test");
        let builds = AtomicUsize::new(0);

        let a = cache.get_or_build(1, || counted_build(&builds, 1)).unwrap();
        let b = cache.get_or_build(2, || counted_build(&builds, 2)).unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!((*a, *b), (1, 2));
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = FingerprintCache::new("test");
        let builds = AtomicUsize::new(0);

        cache.get_or_build(7, || counted_build(&builds, 1)).unwrap();
        cache.invalidate();
        cache.get_or_build(7, || counted_build(&builds, 1)).unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_build_error_preserves_previous_entry() {
        let cache = FingerprintCache::new("test");

        let a = cache.get_or_build(1, || Ok::<u32, &str>(10)).unwrap();
        assert!(cache.get_or_build(2, || Err::<u32, &str>("boom")).is_err());
        let b = cache.get_or_build(1, || Ok::<u32, &str>(99)).unwrap();

        // The fingerprint-1 entry survived the failed rebuild
        assert!(Arc::ptr_eq(&a, &b));
    }
}
