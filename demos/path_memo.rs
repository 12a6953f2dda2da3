//! Path Memoization Example
//!
//! Parses a handful of path expressions from several threads through a shared
//! `PathCache` and prints what was memoized.
//!
//! Run with: cargo run --example path_memo

use rcu_cache::config::PathCacheConfig;
use rcu_cache::path::{parse_simple_path, PathCache};
use std::sync::Arc;
use std::thread;

const PATHS: &[&str] = &[
    "name.last",
    "age",
    "children.1",
    "friends.0.nets.2",
    "friends.#.first",
    "child*.2",
    "fav\\.movie",
    "a..b",
];

fn main() {
    println!("Simple path parsing");
    println!("===================\n");
    for path in PATHS {
        match parse_simple_path(path) {
            Ok(segments) => println!("   {:<20} -> {:?}", path, segments),
            Err(err) => println!("   {:<20} -> not simple: {}", path, err),
        }
    }
    println!();

    let paths = Arc::new(PathCache::new(PathCacheConfig::default()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let paths = Arc::clone(&paths);
            thread::spawn(move || {
                for _ in 0..1000 {
                    for path in PATHS {
                        let _ = paths.simple_segments(path);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let stats = paths.cache().stats();
    println!("Memoized lookups");
    println!("================\n");
    println!("   distinct paths:   {}", paths.cache().len());
    println!("   lookups:          {}", stats.requests);
    println!("   snapshot hits:    {}", stats.snapshot_hits);
    println!("   parses published: {}", stats.snapshot_publishes);
    println!("   hit rate:         {:.4}", stats.hit_rate());
}
