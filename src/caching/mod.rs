//! # Caching Module
//!
//! This module provides caching mechanisms for fitness evaluations. A population
//! converging on a plateau holds many identical chromosomes, and each one would
//! otherwise be re-checked against every constraint in every generation.
//!
//! Chromosomes hash by value, so they are used directly as cache keys. Both caches
//! are cleared once they reach their capacity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::Chromosome;
use crate::evolution::{CacheType, Challenge};

/// Default number of entries a cache holds before it is cleared.
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// A wrapper around a challenge that caches fitness evaluations in a single map shared
/// by all threads.
#[derive(Debug, Clone)]
pub struct CachedChallenge<C>
where
    C: Challenge,
{
    /// The wrapped challenge
    challenge: C,
    /// The cache of fitness evaluations
    cache: Arc<Mutex<HashMap<Chromosome, f64>>>,
    capacity: usize,
}

impl<C> CachedChallenge<C>
where
    C: Challenge,
{
    /// Creates a new cached challenge wrapping the given challenge.
    pub fn new(challenge: C) -> Self {
        Self::with_capacity(challenge, DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a new cached challenge that clears itself after `capacity` entries.
    pub fn with_capacity(challenge: C, capacity: usize) -> Self {
        Self {
            challenge,
            cache: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Returns a reference to the wrapped challenge.
    pub fn inner(&self) -> &C {
        &self.challenge
    }

    /// Returns the number of cached fitness evaluations.
    pub fn cache_size(&self) -> usize {
        self.lock().len()
    }

    /// Clears the cache.
    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave a half-written score behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<Chromosome, f64>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Challenge for CachedChallenge<C>
where
    C: Challenge,
{
    fn score(&self, chromosome: &Chromosome) -> f64 {
        if let Some(score) = self.lock().get(chromosome) {
            return *score;
        }

        let score = self.challenge.score(chromosome);

        let mut cache = self.lock();
        if cache.len() >= self.capacity {
            cache.clear();
        }
        cache.insert(chromosome.clone(), score);

        score
    }

    fn max_score(&self) -> f64 {
        self.challenge.max_score()
    }
}

/// A thread-local cache for fitness evaluations.
///
/// This cache is designed to be used in parallel contexts where each thread
/// has its own cache to avoid contention.
#[derive(Debug)]
pub struct ThreadLocalCache {
    cache: thread_local::ThreadLocal<RefCell<HashMap<Chromosome, f64>>>,
    capacity: usize,
}

impl ThreadLocalCache {
    /// Creates a new empty thread-local cache.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: thread_local::ThreadLocal::new(),
            capacity: capacity.max(1),
        }
    }

    /// Gets a cached fitness value if available.
    pub fn get(&self, key: &Chromosome) -> Option<f64> {
        self.cache
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .and_then(|cache| cache.get(key).copied())
    }

    /// Inserts a fitness value into the current thread's cache.
    pub fn insert(&self, key: Chromosome, value: f64) {
        let cell = self.cache.get_or(|| RefCell::new(HashMap::new()));
        if let Ok(mut cache) = cell.try_borrow_mut() {
            if cache.len() >= self.capacity {
                cache.clear();
            }
            cache.insert(key, value);
        }
    }

    /// Clears the cache for the current thread.
    pub fn clear(&self) {
        if let Some(cell) = self.cache.get() {
            if let Ok(mut cache) = cell.try_borrow_mut() {
                cache.clear();
            }
        }
    }

    /// Returns the number of cached fitness evaluations for the current thread.
    pub fn len(&self) -> usize {
        self.cache
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .map_or(0, |cache| cache.len())
    }

    /// Returns `true` if the cache for the current thread is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ThreadLocalCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// A wrapper around a challenge that uses a thread-local cache for fitness evaluations.
#[derive(Debug, Clone)]
pub struct ThreadLocalCachedChallenge<C>
where
    C: Challenge,
{
    challenge: C,
    cache: Arc<ThreadLocalCache>,
}

impl<C> ThreadLocalCachedChallenge<C>
where
    C: Challenge,
{
    /// Creates a new thread-local cached challenge wrapping the given challenge.
    pub fn new(challenge: C) -> Self {
        Self::with_capacity(challenge, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(challenge: C, capacity: usize) -> Self {
        Self {
            challenge,
            cache: Arc::new(ThreadLocalCache::new(capacity)),
        }
    }

    /// Returns a reference to the wrapped challenge.
    pub fn inner(&self) -> &C {
        &self.challenge
    }

    /// Clears the cache for the current thread.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Returns the number of cached fitness evaluations for the current thread.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl<C> Challenge for ThreadLocalCachedChallenge<C>
where
    C: Challenge,
{
    fn score(&self, chromosome: &Chromosome) -> f64 {
        if let Some(score) = self.cache.get(chromosome) {
            return score;
        }

        let score = self.challenge.score(chromosome);
        self.cache.insert(chromosome.clone(), score);

        score
    }

    fn max_score(&self) -> f64 {
        self.challenge.max_score()
    }
}

/// A challenge wrapped in whichever cache [`CacheType`] selects.
#[derive(Debug, Clone)]
pub enum ScoringCache<C>
where
    C: Challenge,
{
    Uncached(C),
    Global(CachedChallenge<C>),
    ThreadLocal(ThreadLocalCachedChallenge<C>),
}

impl<C> ScoringCache<C>
where
    C: Challenge,
{
    pub fn new(challenge: C, cache_type: CacheType, capacity: usize) -> Self {
        match cache_type {
            CacheType::None => ScoringCache::Uncached(challenge),
            CacheType::Global => {
                ScoringCache::Global(CachedChallenge::with_capacity(challenge, capacity))
            }
            CacheType::ThreadLocal => ScoringCache::ThreadLocal(
                ThreadLocalCachedChallenge::with_capacity(challenge, capacity),
            ),
        }
    }

    /// Returns a reference to the wrapped challenge.
    pub fn inner(&self) -> &C {
        match self {
            ScoringCache::Uncached(challenge) => challenge,
            ScoringCache::Global(cached) => cached.inner(),
            ScoringCache::ThreadLocal(cached) => cached.inner(),
        }
    }
}

impl<C> Challenge for ScoringCache<C>
where
    C: Challenge,
{
    fn score(&self, chromosome: &Chromosome) -> f64 {
        match self {
            ScoringCache::Uncached(challenge) => challenge.score(chromosome),
            ScoringCache::Global(cached) => cached.score(chromosome),
            ScoringCache::ThreadLocal(cached) => cached.score(chromosome),
        }
    }

    fn max_score(&self) -> f64 {
        self.inner().max_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct CountingChallenge {
        // Counter to track the number of evaluations
        evaluations: Arc<AtomicUsize>,
    }

    impl CountingChallenge {
        fn new() -> Self {
            Self {
                evaluations: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn get_evaluations(&self) -> usize {
            self.evaluations.load(Ordering::SeqCst)
        }
    }

    impl Challenge for CountingChallenge {
        fn score(&self, chromosome: &Chromosome) -> f64 {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            chromosome.value(0, 0) as f64
        }

        fn max_score(&self) -> f64 {
            2.0
        }
    }

    fn chromosome(first: usize) -> Chromosome {
        let second = if first == 0 { 1 } else { 0 };
        Chromosome::from_slots(vec![vec![first], vec![second]])
    }

    #[test]
    fn test_cached_challenge() {
        let challenge = CountingChallenge::new();
        let cached_challenge = CachedChallenge::new(challenge.clone());

        let score1 = cached_challenge.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 1);

        // Same chromosome should use the cache
        let score2 = cached_challenge.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 1);
        assert_eq!(score1, score2);

        let score3 = cached_challenge.score(&chromosome(0));
        assert_eq!(challenge.get_evaluations(), 2);
        assert_ne!(score1, score3);

        assert_eq!(cached_challenge.cache_size(), 2);
        assert_eq!(cached_challenge.max_score(), 2.0);

        cached_challenge.clear_cache();
        assert_eq!(cached_challenge.cache_size(), 0);

        cached_challenge.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 3);
    }

    #[test]
    fn test_thread_local_cached_challenge() {
        let challenge = CountingChallenge::new();
        let cached_challenge = ThreadLocalCachedChallenge::new(challenge.clone());

        cached_challenge.score(&chromosome(1));
        cached_challenge.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 1);

        cached_challenge.score(&chromosome(0));
        assert_eq!(challenge.get_evaluations(), 2);
        assert_eq!(cached_challenge.cache_size(), 2);

        cached_challenge.clear_cache();
        assert_eq!(cached_challenge.cache_size(), 0);
    }

    #[test]
    fn test_capacity_clears_cache() {
        let challenge = CountingChallenge::new();
        let cached_challenge = CachedChallenge::with_capacity(challenge.clone(), 1);

        cached_challenge.score(&chromosome(1));
        cached_challenge.score(&chromosome(0));
        assert_eq!(cached_challenge.cache_size(), 1);

        // chromosome(1) was evicted by the clear
        cached_challenge.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 3);
    }

    #[test]
    fn test_scoring_cache_dispatch() {
        let challenge = CountingChallenge::new();
        let uncached = ScoringCache::new(challenge.clone(), CacheType::None, 10);
        uncached.score(&chromosome(1));
        uncached.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 2);

        let global = ScoringCache::new(challenge.clone(), CacheType::Global, 10);
        global.score(&chromosome(1));
        global.score(&chromosome(1));
        assert_eq!(challenge.get_evaluations(), 3);
        assert_eq!(global.max_score(), 2.0);
    }
}
