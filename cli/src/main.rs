mod attack;
mod benchmark;
mod candidates;
mod catalog;
mod config;
mod generate;
mod identify;
mod train;

use std::{fs::File, path::PathBuf, sync::Mutex};

use anyhow::{Context, Result};
use clap::{value_parser, Args, Parser, Subcommand};
use tracing::Level;

use brutyf_core::{
    AttackConfigBuilder, AttackMode, HashType, HashTypeSelection, InputFormat, OutputFormat,
    DEFAULT_BENCHMARK_ITERATIONS, DEFAULT_MARKOV_ORDER, DEFAULT_MARKOV_TRAINING_LIMIT, MAX_THREADS,
};

use attack::attack;
use benchmark::benchmark;
use candidates::candidates;
use catalog::{formats, rules, types};
use generate::generate;
use identify::identify;
use train::train;

/// Offline password recovery from wordlists, masks, brute force and markov chains.
#[derive(Parser)]
#[command(name = "brutyf", author, version, about, long_about = None)]
struct Cli {
    /// Show debug messages.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Write the log messages to this file instead of the standard error.
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Disable colors in log messages.
    #[arg(long, global = true)]
    no_color: bool,

    /// A JSON configuration file providing default options.
    /// Defaults to ./brutyf.json or ~/.config/brutyf/config.json when they exist.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Attack(Attack),
    Identify(Identify),
    Train(Train),
    Candidates(Candidates),
    Hash(Hash),
    Benchmark(Benchmark),
    /// List the mutation rules.
    Rules,
    /// List the supported hash types.
    Types,
    /// List the layouts a hash file can have.
    Formats,
}

/// The options describing the candidates to try.
#[derive(Args)]
pub struct SourceArgs {
    /// The wordlist. `.gz` and `.bz2` files are decompressed on the fly.
    #[arg(short, long)]
    wordlist: Option<PathBuf>,

    /// The second wordlist of the combinator attack.
    #[arg(long)]
    wordlist2: Option<PathBuf>,

    /// A mask such as `?u?l?l?l?d?d`.
    /// Placeholders: ?l lowercase, ?u uppercase, ?d digits, ?s specials, ?a all, ?1 to ?4 custom.
    #[arg(short, long)]
    mask: Option<String>,

    /// Force the attack mode instead of inferring it from the wordlists and the mask.
    #[arg(short, long)]
    attack_mode: Option<AttackMode>,

    /// Mutation rules applied to every candidate, separated by commas.
    #[arg(short, long, value_delimiter = ',')]
    rules: Option<Vec<String>>,

    /// The minimum length of incremental, markov and keyboard walk candidates.
    #[arg(long, value_parser = value_parser!(u64).range(1..))]
    min_length: Option<u64>,

    /// The maximum length of incremental, markov and keyboard walk candidates.
    #[arg(long, value_parser = value_parser!(u64).range(1..))]
    max_length: Option<u64>,

    /// The incremental charset, or one of lower, upper, alpha, digits, alnum, special, all.
    #[arg(long)]
    charset: Option<String>,

    /// The charset of the ?1 mask placeholder.
    #[arg(short = '1', long)]
    custom_charset1: Option<String>,

    /// The charset of the ?2 mask placeholder.
    #[arg(short = '2', long)]
    custom_charset2: Option<String>,

    /// The charset of the ?3 mask placeholder.
    #[arg(short = '3', long)]
    custom_charset3: Option<String>,

    /// The charset of the ?4 mask placeholder.
    #[arg(short = '4', long)]
    custom_charset4: Option<String>,

    /// Put the mask before the word in the hybrid attack.
    #[arg(long)]
    prepend: bool,

    /// The separator of the combinator attack.
    #[arg(long)]
    separator: Option<String>,

    /// The order of the markov chains trained on the wordlist.
    #[arg(long)]
    markov_order: Option<usize>,

    /// A markov model created with the train command.
    #[arg(long)]
    markov_model: Option<PathBuf>,

    /// The maximum number of markov candidates.
    #[arg(long)]
    markov_cap: Option<u64>,

    /// The number of wordlist passwords used to train the markov model.
    #[arg(long)]
    markov_training_limit: Option<usize>,

    /// Make the markov candidates reproducible.
    #[arg(long)]
    seed: Option<u64>,

    /// Leave the shifted keyboard layout out of keyboard walks.
    #[arg(long)]
    no_shifted: bool,

    /// Skip this many candidates.
    #[arg(short, long)]
    skip: Option<u64>,

    /// Try at most this many candidates after the skipped ones.
    #[arg(short, long)]
    limit: Option<u64>,
}

impl SourceArgs {
    /// Overrides the options of `builder` with the ones given on the command line.
    fn apply(self, mut builder: AttackConfigBuilder) -> AttackConfigBuilder {
        if let Some(wordlist) = self.wordlist {
            builder = builder.wordlist(wordlist);
        }
        if let Some(wordlist2) = self.wordlist2 {
            builder = builder.wordlist2(wordlist2);
        }
        if let Some(mask) = &self.mask {
            builder = builder.mask(mask);
        }
        if let Some(mode) = self.attack_mode {
            builder = builder.attack_mode(mode);
        }
        if let Some(rules) = &self.rules {
            builder = builder.rules(rules);
        }
        if let Some(min_length) = self.min_length {
            builder = builder.min_length(min_length as usize);
        }
        if let Some(max_length) = self.max_length {
            builder = builder.max_length(max_length as usize);
        }
        if let Some(charset) = &self.charset {
            builder = builder.charset(charset);
        }

        let custom_charsets = [
            self.custom_charset1,
            self.custom_charset2,
            self.custom_charset3,
            self.custom_charset4,
        ];
        for (slot, charset) in custom_charsets.iter().enumerate() {
            if let Some(charset) = charset {
                builder = builder.custom_charset(slot + 1, charset);
            }
        }

        if self.prepend {
            builder = builder.hybrid_prepend(true);
        }
        if let Some(separator) = &self.separator {
            builder = builder.separator(separator);
        }
        if let Some(order) = self.markov_order {
            builder = builder.markov_order(order);
        }
        if let Some(model) = self.markov_model {
            builder = builder.markov_model(model);
        }
        if let Some(cap) = self.markov_cap {
            builder = builder.markov_cap(cap);
        }
        if let Some(limit) = self.markov_training_limit {
            builder = builder.markov_training_limit(limit);
        }
        if let Some(seed) = self.seed {
            builder = builder.markov_seed(seed);
        }
        if self.no_shifted {
            builder = builder.keyboard_shifted(false);
        }
        if let Some(skip) = self.skip {
            builder = builder.skip(skip);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }

        builder
    }
}

/// Recover the passwords of a file of hashes.
#[derive(Args)]
pub struct Attack {
    /// The file containing the hashes, one per line as hash, hash:salt or user:hash:salt.
    /// Use - to read the standard input.
    hash_file: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    /// The number of workers.
    #[arg(short, long, value_parser = value_parser!(u64).range(1..=MAX_THREADS as u64))]
    threads: Option<u64>,

    /// The type of the hashes, or auto to detect it for each hash.
    #[arg(long)]
    hash_type: Option<HashTypeSelection>,

    /// The layout of the hash file, such as shadow, pwdump or auto. See the formats command.
    #[arg(short, long)]
    input_format: Option<InputFormat>,

    /// Do not read nor write the potfile.
    #[arg(long)]
    no_potfile: bool,

    /// The potfile to use instead of ~/.brutyf.pot.
    #[arg(long)]
    potfile: Option<PathBuf>,

    /// Resume the interrupted single-threaded run of the same attack.
    #[arg(long)]
    resume: bool,

    /// Where session checkpoints are stored.
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Write the results to this file instead of the standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The format of the results: text, json or csv.
    #[arg(short, long)]
    format: Option<OutputFormat>,
}

/// Identify the type of a hash.
#[derive(Args)]
pub struct Identify {
    /// The hash to identify.
    hash: String,
}

/// Train a markov model on a wordlist.
#[derive(Args)]
pub struct Train {
    /// The wordlist to learn from.
    wordlist: PathBuf,

    /// Where the model is stored. A .json path gets a readable model, any other a compact one.
    model: PathBuf,

    /// The order of the markov chains.
    #[arg(long, default_value_t = DEFAULT_MARKOV_ORDER as u64, value_parser = value_parser!(u64).range(1..))]
    order: u64,

    /// The maximum number of passwords to learn from.
    #[arg(long, default_value_t = DEFAULT_MARKOV_TRAINING_LIMIT)]
    limit: usize,
}

/// Print the candidates of an attack without trying them.
#[derive(Args)]
pub struct Candidates {
    #[command(flatten)]
    source: SourceArgs,
}

/// Hash a password, with every algorithm unless one is given.
#[derive(Args)]
pub struct Hash {
    password: String,

    /// The algorithm to use.
    #[arg(long)]
    hash_type: Option<HashType>,

    /// The salt of the salted algorithms.
    #[arg(long)]
    salt: Option<String>,
}

/// Measure the hashing speed of every algorithm.
#[derive(Args)]
pub struct Benchmark {
    /// The number of passwords hashed per algorithm. bcrypt hashes at most 10.
    #[arg(short = 'n', long, default_value_t = DEFAULT_BENCHMARK_ITERATIONS, value_parser = value_parser!(u64).range(1..))]
    iterations: u64,
}

/// Sends the log messages to the standard error or to a file.
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match &cli.log {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Unable to open the log file {}", path.display()))?;

            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => subscriber
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .init(),
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.commands {
        Commands::Attack(atk) => {
            let file_config = config::load(cli.config.as_deref())?;
            attack(atk, file_config, cli.quiet)?
        }
        Commands::Identify(id) => identify(id),
        Commands::Train(tr) => train(tr)?,
        Commands::Candidates(cand) => {
            let file_config = config::load(cli.config.as_deref())?;
            candidates(cand, file_config)?
        }
        Commands::Hash(hash) => generate(hash)?,
        Commands::Benchmark(bench) => benchmark(bench),
        Commands::Rules => rules(),
        Commands::Types => types(),
        Commands::Formats => formats(),
    }

    Ok(())
}
