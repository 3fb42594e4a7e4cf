//! Hashing throughput of the supported algorithms.

use std::{
    fmt::Display,
    hint::black_box,
    time::{Duration, Instant},
};

use human_repr::{HumanDuration, HumanThroughput};
use serde::Serialize;
use tracing::debug;

use crate::{hash::HashType, BCRYPT_BENCHMARK_ITERATIONS};

const BENCHMARK_PASSWORD: &str = "BenchmarkTest123!";
const BENCHMARK_SALT: &str = "brutyf";

/// The time taken to hash a number of passwords with one algorithm.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BenchmarkResult {
    pub hash_type: HashType,
    pub iterations: u64,
    pub elapsed: Duration,
}

impl BenchmarkResult {
    /// Hashes per second.
    pub fn speed(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();

        if elapsed > 0. {
            self.iterations as f64 / elapsed
        } else {
            0.
        }
    }
}

impl Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<14} {:>8} hashes in {:<10} = {}",
            self.hash_type.as_str(),
            self.iterations,
            self.elapsed.as_secs_f64().human_duration(),
            self.speed().human_throughput("H")
        )
    }
}

/// The number of passwords hashed when benchmarking `hash_type`.
/// bcrypt hashes at most `BCRYPT_BENCHMARK_ITERATIONS` passwords.
pub fn iterations_for(hash_type: HashType, iterations: u64) -> u64 {
    match hash_type {
        HashType::Bcrypt => iterations.min(BCRYPT_BENCHMARK_ITERATIONS),
        _ => iterations,
    }
}

/// Hashes `iterations` distinct passwords with `hash_type`.
pub fn benchmark(hash_type: HashType, iterations: u64) -> BenchmarkResult {
    let start = Instant::now();

    for i in 0..iterations {
        let password = format!("{BENCHMARK_PASSWORD}{i}");
        black_box(hash_type.generate(&password, Some(BENCHMARK_SALT)));
    }

    let result = BenchmarkResult {
        hash_type,
        iterations,
        elapsed: start.elapsed(),
    };
    debug!("{result}");

    result
}

/// Benchmarks every supported algorithm in turn.
pub fn benchmark_all(iterations: u64) -> Vec<BenchmarkResult> {
    HashType::all()
        .iter()
        .map(|&hash_type| benchmark(hash_type, iterations_for(hash_type, iterations)))
        .collect()
}

pub fn fastest(results: &[BenchmarkResult]) -> Option<&BenchmarkResult> {
    results
        .iter()
        .max_by(|a, b| a.speed().total_cmp(&b.speed()))
}

pub fn slowest(results: &[BenchmarkResult]) -> Option<&BenchmarkResult> {
    results
        .iter()
        .min_by(|a, b| a.speed().total_cmp(&b.speed()))
}
