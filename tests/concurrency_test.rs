//! Concurrent use of a shared cached pipeline

use entity_linker::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Slow generator counting how often each key is computed.
struct SlowKb {
    delay: Duration,
    computed: AtomicUsize,
    fail: bool,
}

impl SlowKb {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            computed: AtomicUsize::new(0),
            fail: false,
        }
    }
}

impl CandidateGenerator for SlowKb {
    type Query = String;
    type Candidate = String;

    fn find_candidates(&self, query: &String) -> entity_linker::error::Result<CandidateSet<String>> {
        self.computed.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        if self.fail {
            return Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "search timed out").into());
        }
        Ok(CandidateSet::singleton(format!("/kb/{}", query.to_lowercase())))
    }
}

#[test]
fn test_single_flight_same_key() {
    const NUM_THREADS: usize = 8;
    let cached = Arc::new(CachedGenerator::new(SlowKb::new(Duration::from_millis(100))));
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let cached = Arc::clone(&cached);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cached.find_candidates(&"Geneva".to_string())
            })
        })
        .collect();

    for handle in handles {
        let found = handle.join().unwrap().unwrap();
        assert_eq!(found, CandidateSet::singleton("/kb/geneva".to_string()));
    }
    assert_eq!(cached.delegate().computed.load(Ordering::SeqCst), 1);
    assert_eq!(cached.stats().loads, 1);
}

#[test]
fn test_failure_delivered_to_all_waiters() {
    const NUM_THREADS: usize = 6;
    let mut kb = SlowKb::new(Duration::from_millis(100));
    kb.fail = true;
    let cached = Arc::new(CachedGenerator::new(kb));
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let cached = Arc::clone(&cached);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cached.find_candidates(&"Basel".to_string())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().unwrap_err().is_lookup());
    }
    // Nothing was cached, so a later call computes again
    let before = cached.delegate().computed.load(Ordering::SeqCst);
    assert!(cached.find_candidates(&"Basel".to_string()).is_err());
    assert_eq!(cached.delegate().computed.load(Ordering::SeqCst), before + 1);
    assert!(cached.is_empty());
}

#[test]
fn test_distinct_keys_load_in_parallel() {
    const NUM_THREADS: usize = 4;
    let delay = Duration::from_millis(200);
    let cached = Arc::new(CachedGenerator::new(SlowKb::new(delay)));
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let start = std::time::Instant::now();
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let cached = Arc::clone(&cached);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cached.find_candidates(&format!("City{}", i)).unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let elapsed = start.elapsed();

    assert_eq!(cached.delegate().computed.load(Ordering::SeqCst), NUM_THREADS);
    // Serialized loads would take NUM_THREADS * delay
    assert!(
        elapsed < delay * NUM_THREADS as u32,
        "loads for distinct keys appear to be serialized: {:?}",
        elapsed
    );
}

#[test]
fn test_batch_and_single_callers_share_flights() {
    let cached = Arc::new(CachedGenerator::new(SlowKb::new(Duration::from_millis(100))));
    let barrier = Arc::new(Barrier::new(2));

    let batch = {
        let cached = Arc::clone(&cached);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            cached.batch_find_candidates(&["Bern".to_string(), "Chur".to_string()])
        })
    };
    let single = {
        let cached = Arc::clone(&cached);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            cached.find_candidates(&"Bern".to_string())
        })
    };

    let batch = batch.join().unwrap().unwrap();
    let single = single.join().unwrap().unwrap();
    assert_eq!(batch["Bern"], single);
    assert_eq!(batch.len(), 2);
    // Bern computed once regardless of which caller led
    assert_eq!(cached.delegate().computed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_shared_linker_across_threads() {
    const NUM_THREADS: usize = 8;
    let kb = StaticMapGenerator::new(
        (0..100).map(|i| (format!("m{}", i), vec![format!("/kb/{}", i)])),
    );
    let generator = CacheBuilder::new().max_weight(64).build(kb).unwrap();
    let linker = Arc::new(TwoPhaseLinker::new(generator, NullRanker));
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let linker = Arc::clone(&linker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for j in 0..200 {
                    let i = (t * 37 + j) % 100;
                    assert_eq!(linker.link(&format!("m{}", i)).unwrap(), format!("/kb/{}", i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let cache = linker.generator();
    assert!(cache.total_weight() <= 64);
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, (NUM_THREADS * 200) as u64);
}
