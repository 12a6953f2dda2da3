//! Concurrent Cache Usage Examples
//!
//! This example demonstrates multi-threaded usage patterns for the incremental cache.
//!
//! Run with: cargo run --example concurrent_usage

use rcu_cache::config::IncrementalCacheConfig;
use rcu_cache::metrics::CacheMetrics;
use rcu_cache::{I64Cache, IncrementalCache, StrCache};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("Concurrent Cache Usage Examples");
    println!("================================\n");

    basic_concurrent_usage();
    println!();

    zero_copy_get_with();
    println!();

    budget_tuning();
    println!();

    metrics_report();
}

/// Basic multi-threaded cache usage
fn basic_concurrent_usage() {
    println!("1. Basic Concurrent Usage");
    println!("   -----------------------");

    let cache: Arc<StrCache<usize>> = Arc::new(IncrementalCache::init(
        IncrementalCacheConfig::default(),
        None,
    ));

    let num_threads = 4;
    let keys = 200;

    // Every thread writes the same keys; only the first write per key sticks.
    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut recorded = 0;
                for i in 0..keys {
                    let key = format!("key{}", i);
                    if !cache.set(key.clone(), thread_id) {
                        recorded += 1;
                    }
                    let owner = cache.get(&key).expect("key was just set");
                    assert!(owner < num_threads);
                }
                recorded
            })
        })
        .collect();

    for (thread_id, handle) in handles.into_iter().enumerate() {
        let recorded = handle.join().expect("Thread panicked");
        println!("   Thread {} recorded {} keys first", thread_id, recorded);
    }
    println!("   Final cache size: {} items", cache.len());
}

/// Zero-copy access pattern using get_with()
fn zero_copy_get_with() {
    println!("2. Zero-Copy Access with get_with()");
    println!("   ----------------------------------");

    let cache: StrCache<Vec<u8>> =
        IncrementalCache::init(IncrementalCacheConfig::default(), None);
    cache.set("large_key".to_string(), vec![1u8; 1024]);

    // Process the value without cloning using get_with()
    let sum: Option<u64> =
        cache.get_with("large_key", |data| data.iter().map(|&x| x as u64).sum());

    println!("   Stored 1KB of data in cache");
    println!(
        "   Computed sum without cloning: {}",
        sum.unwrap_or_default()
    );
    println!("   get() returns a clone - use get_with() to avoid cloning");
}

/// Show how the attempt budget moves writes between the two stores
fn budget_tuning() {
    println!("3. Attempt Budget Tuning");
    println!("   ----------------------");

    for budget in [0, 1, 8, 1000] {
        let cache: Arc<I64Cache<i64>> = Arc::new(IncrementalCache::init(
            IncrementalCacheConfig {
                max_cas_attempts: budget,
            },
            None,
        ));

        let start = Instant::now();
        let handles: Vec<_> = (0..8_i64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for key in (t..2000).step_by(8) {
                        cache.set(key, key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread panicked");
        }
        let elapsed = start.elapsed();

        let stats = cache.stats();
        println!(
            "   budget {:>4}: {:>4} published, {:>4} in backup, {:>5} CAS failures, {:?}",
            budget, stats.snapshot_publishes, stats.backup_inserts, stats.cas_failures, elapsed
        );
    }
}

/// Dump every counter the cache keeps
fn metrics_report() {
    println!("4. Metrics");
    println!("   -------");

    let cache: I64Cache<i64> = IncrementalCache::init(
        IncrementalCacheConfig {
            max_cas_attempts: 0,
        },
        None,
    );
    for key in 0..10 {
        cache.set(key, key * key);
    }
    for key in 0..20 {
        let _ = cache.get(&key);
    }

    println!("   {}:", cache.algorithm_name());
    for (name, value) in cache.metrics() {
        println!("   {:<20} {}", name, value);
    }
}
