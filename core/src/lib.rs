//! Offline password recovery: candidate generators, hash verification,
//! mutation rules and a parallel attack orchestrator with a potfile cache
//! and resumable sessions.

pub mod attack;
pub mod benchmark;
pub mod ctx;
pub mod error;
pub mod event;
pub mod export;
pub mod extract;
pub mod generator;
pub mod hash;
pub mod potfile;
pub mod rules;
pub mod scheduling;
pub mod session;
pub mod stats;
pub mod target;

pub use {
    attack::{Attack, AttackReport, CandidateSource},
    benchmark::BenchmarkResult,
    ctx::{AttackConfig, AttackConfigBuilder, AttackMode, HashTypeSelection},
    error::{BrutyfError, BrutyfResult},
    event::{AttackHandle, AttackPhase, Event},
    export::{CrackResult, OutputFormat},
    extract::InputFormat,
    generator::{
        CandidateGenerator, CombinatorGenerator, HybridGenerator, IncrementalGenerator,
        KeyboardWalkGenerator, MarkovGenerator, MarkovModel, MaskGenerator, WordlistGenerator,
    },
    hash::{HashType, HashTypeCandidate, HashTypeInfo},
    potfile::Potfile,
    rules::{Rule, RuleEngine},
    session::Session,
    stats::{Statistics, StatsReport},
    target::TargetHash,
};

/// The version reported in exported results.
pub const VERSION: &str = "3.0";

/// The maximum number of parallel workers.
pub const MAX_THREADS: usize = 16;

/// The number of base candidates tested between two checks of the found set.
pub const BATCH_SIZE: u64 = 1_000;

/// The number of base candidates between two session checkpoints.
pub const CHECKPOINT_INTERVAL: u64 = 10_000;

/// The default minimum length of brute-force and markov candidates.
pub const DEFAULT_MIN_LENGTH: usize = 1;

/// The default maximum length of incremental candidates.
pub const DEFAULT_MAX_LENGTH: usize = 8;

/// The default charset of the incremental attack.
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz";

/// The default order of the markov chains.
pub const DEFAULT_MARKOV_ORDER: usize = 2;

/// The default maximum number of markov candidates.
pub const DEFAULT_MARKOV_CAP: u64 = 100_000;

/// The default number of passwords used to train a markov model.
pub const DEFAULT_MARKOV_TRAINING_LIMIT: usize = 100_000;

/// The default length window of markov candidates.
pub const DEFAULT_MARKOV_LENGTH: (usize, usize) = (4, 16);

/// The default length window of keyboard walks.
pub const DEFAULT_WALK_LENGTH: (usize, usize) = (4, 12);

/// The default number of passwords hashed per algorithm by the benchmark.
pub const DEFAULT_BENCHMARK_ITERATIONS: u64 = 1_000;

/// The maximum number of passwords hashed with bcrypt by the benchmark.
pub const BCRYPT_BENCHMARK_ITERATIONS: u64 = 10;

/// The name of the potfile in the home directory.
pub const POTFILE_NAME: &str = ".brutyf.pot";
