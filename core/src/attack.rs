//! The attack orchestrator.
//!
//! An attack reads the targets, puts aside the ones already cracked in the potfile,
//! then searches the others with one or several workers. With several workers the
//! targets or the candidate space are split between them, and a shared set of found
//! targets lets every worker give up on a target as soon as another one cracked it.

use std::{
    collections::{HashMap, HashSet},
    env,
    ops::Range,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    thread,
};

use crossbeam_channel::{unbounded, Sender};
use tracing::{debug, info, warn};

use crate::{
    ctx::{AttackConfig, AttackMode},
    error::{BrutyfError, BrutyfResult},
    event::{AttackHandle, AttackPhase, Event},
    export::CrackResult,
    generator::{
        wordlist::count_lines, CandidateGenerator, CombinatorGenerator, HybridGenerator,
        IncrementalGenerator, KeyboardWalkGenerator, MarkovGenerator, MarkovModel, MaskGenerator,
        WordlistGenerator,
    },
    hash::HashType,
    potfile::Potfile,
    rules::RuleEngine,
    scheduling::{split_slice, Partitioning, SplitIterator},
    session::Session,
    stats::{Statistics, StatsReport},
    target::{read_targets, TargetHash},
    BATCH_SIZE, CHECKPOINT_INTERVAL, MAX_THREADS,
};

/// The candidate space of an attack, from which every worker builds its own generator.
#[derive(Clone, Debug)]
pub enum CandidateSource {
    Wordlist {
        path: PathBuf,
        total: u64,
    },
    Mask(MaskGenerator),
    Hybrid(HybridGenerator),
    Combinator(CombinatorGenerator),
    Incremental(IncrementalGenerator),
    Markov {
        model: Arc<MarkovModel>,
        lengths: (usize, usize),
        cap: u64,
        seed: Option<u64>,
    },
    KeyboardWalk(KeyboardWalkGenerator),
}

impl CandidateSource {
    /// Loads the inputs of `mode`.
    /// Fails if an input required by the mode is missing or cannot be read.
    pub fn from_config(config: &AttackConfig, mode: AttackMode) -> BrutyfResult<Self> {
        let missing = |input| BrutyfError::MissingInput {
            mode: mode.as_str(),
            input,
        };

        let mask = || {
            config
                .mask
                .as_deref()
                .map(|mask| MaskGenerator::with_custom_charsets(mask, &config.custom_charsets))
                .ok_or_else(|| missing("a mask"))
        };

        let source = match mode {
            AttackMode::Wordlist => {
                let path = config.wordlist.clone().ok_or_else(|| missing("a wordlist"))?;
                let total = count_lines(&path)?;

                CandidateSource::Wordlist { path, total }
            }

            AttackMode::Mask => CandidateSource::Mask(mask()?),

            AttackMode::Hybrid => {
                let wordlist = config.wordlist.as_ref().ok_or_else(|| missing("a wordlist"))?;

                CandidateSource::Hybrid(HybridGenerator::from_file(
                    wordlist,
                    mask()?,
                    config.hybrid_prepend,
                )?)
            }

            AttackMode::Combinator => {
                let (Some(left), Some(right)) = (&config.wordlist, &config.wordlist2) else {
                    return Err(missing("two wordlists"));
                };

                CandidateSource::Combinator(CombinatorGenerator::from_files(
                    left,
                    right,
                    &config.separator,
                )?)
            }

            AttackMode::Incremental => {
                let (min, max) = config.length_window(mode);

                CandidateSource::Incremental(IncrementalGenerator::new(
                    &config.resolved_charset(),
                    min,
                    max,
                ))
            }

            AttackMode::Markov => {
                let model = match (&config.markov_model, &config.wordlist) {
                    (Some(path), _) => MarkovModel::load(path)?,
                    (None, Some(wordlist)) => {
                        let mut model = MarkovModel::new(config.markov_order);
                        let trained =
                            model.train_from_file(wordlist, config.markov_training_limit)?;
                        info!("Trained a markov model on {trained} passwords");

                        model
                    }
                    (None, None) => return Err(missing("a markov model or a wordlist")),
                };

                if model.is_empty() {
                    return Err(BrutyfError::EmptyModel);
                }

                CandidateSource::Markov {
                    model: Arc::new(model),
                    lengths: config.length_window(mode),
                    cap: config.markov_cap,
                    seed: config.markov_seed,
                }
            }

            AttackMode::KeyboardWalk => {
                let (min, max) = config.length_window(mode);

                CandidateSource::KeyboardWalk(KeyboardWalkGenerator::new(
                    min,
                    max,
                    config.keyboard_shifted,
                ))
            }
        };

        Ok(source)
    }

    /// The number of candidates, or `None` if it overflows.
    /// For markov candidates, this is the maximum number of draws.
    pub fn total(&self) -> Option<u64> {
        match self {
            CandidateSource::Wordlist { total, .. } => Some(*total),
            CandidateSource::Mask(generator) => generator.total_count(),
            CandidateSource::Hybrid(generator) => generator.total_count(),
            CandidateSource::Combinator(generator) => generator.total_count(),
            CandidateSource::Incremental(generator) => generator.total_count(),
            CandidateSource::Markov { cap, .. } => Some(*cap),
            CandidateSource::KeyboardWalk(generator) => generator.total_count(),
        }
    }

    /// The indexes of the candidates to try, `[skip, skip + limit)` bounded by the total.
    pub fn range(&self, skip: u64, limit: Option<u64>) -> Range<u64> {
        let total = self.total().unwrap_or(u64::MAX);
        let end = limit.map_or(total, |limit| skip.saturating_add(limit).min(total));

        skip.min(end)..end
    }

    /// Builds a fresh generator for a worker starting at candidate `start`.
    pub fn generator(&self, start: u64) -> BrutyfResult<Box<dyn CandidateGenerator>> {
        let generator: Box<dyn CandidateGenerator> = match self {
            CandidateSource::Wordlist { path, total } => {
                Box::new(WordlistGenerator::with_count(path, *total)?)
            }
            CandidateSource::Mask(generator) => Box::new(generator.clone()),
            CandidateSource::Hybrid(generator) => Box::new(generator.clone()),
            CandidateSource::Combinator(generator) => Box::new(generator.clone()),
            CandidateSource::Incremental(generator) => Box::new(generator.clone()),
            CandidateSource::Markov {
                model,
                lengths,
                cap,
                seed,
            } => {
                let generator = MarkovGenerator::new(model.clone())
                    .lengths(lengths.0, lengths.1)
                    .cap(*cap);

                // each worker draws its own sequence
                match seed {
                    Some(seed) => Box::new(generator.seed(seed.wrapping_add(start))),
                    None => Box::new(generator),
                }
            }
            CandidateSource::KeyboardWalk(generator) => Box::new(generator.clone()),
        };

        Ok(generator)
    }
}

/// Identifies the checkpoint of an attack along with the hash file.
fn session_key(config: &AttackConfig, mode: AttackMode) -> String {
    let path = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let mask = config.mask.as_deref().unwrap_or_default();
    let (min, max) = config.length_window(mode);

    match mode {
        AttackMode::Wordlist => path(&config.wordlist),
        AttackMode::Mask => format!("mask:{mask}"),
        AttackMode::Hybrid => format!(
            "hybrid:{}:{mask}:{}",
            path(&config.wordlist),
            config.hybrid_prepend
        ),
        AttackMode::Combinator => format!(
            "combinator:{}:{}:{}",
            path(&config.wordlist),
            path(&config.wordlist2),
            config.separator
        ),
        AttackMode::Incremental => format!("incremental:{}:{min}-{max}", config.charset),
        AttackMode::Markov => format!(
            "markov:{}:{}:{min}-{max}:{:?}",
            path(&config.markov_model),
            path(&config.wordlist),
            config.markov_seed
        ),
        AttackMode::KeyboardWalk => {
            format!("keyboard_walk:{min}-{max}:{}", config.keyboard_shifted)
        }
    }
}

/// The outcome of an attack.
#[derive(Clone, Debug)]
pub struct AttackReport {
    pub mode: AttackMode,
    /// How the work was split, or `None` if a single worker ran.
    pub partitioning: Option<Partitioning>,
    /// Every target, with its password when it was cracked.
    pub targets: Vec<TargetHash>,
    /// The number of targets cracked in previous runs.
    pub from_potfile: usize,
    pub stats: StatsReport,
}

impl AttackReport {
    /// The cracked targets, in the order of the hash file.
    pub fn results(&self) -> Vec<CrackResult> {
        self.targets
            .iter()
            .filter_map(|target| {
                target.password.as_ref().map(|password| CrackResult {
                    username: target.username.clone(),
                    hash: target.hash.clone(),
                    password: password.clone(),
                })
            })
            .collect()
    }

    pub fn unsolved(&self) -> Vec<&TargetHash> {
        self.targets
            .iter()
            .filter(|target| target.password.is_none())
            .collect()
    }

    pub fn cracked_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|target| target.password.is_some())
            .count()
    }
}

enum Outcome {
    Found(String),
    Exhausted,
    /// Another worker cracked the target.
    Abandoned,
}

/// What every worker shares.
struct Search<'a> {
    rules: &'a RuleEngine,
    stats: &'a Statistics,
    /// The targets already cracked, by raw entry. Only set with several workers.
    found: Option<&'a Mutex<HashSet<String>>>,
    events: Option<&'a Sender<Event>>,
}

impl Search<'_> {
    fn emit(&self, event: Event) {
        if let Some(sender) = self.events {
            sender.send(event).ok();
        }
    }

    fn is_found(&self, entry: &str) -> bool {
        self.found.is_some_and(|found| {
            found
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(entry)
        })
    }

    /// Marks a target as cracked. Returns false if another worker already did.
    fn mark_found(&self, entry: &str) -> bool {
        self.found.map_or(true, |found| {
            found
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(entry.to_owned())
        })
    }

    /// Tests a base candidate and its mutations.
    #[inline]
    fn try_candidate(&self, target: &TargetHash, candidate: String, tried: &mut u64) -> Option<String> {
        if self.rules.is_empty() {
            *tried += 1;
            return target.verify(&candidate).then_some(candidate);
        }

        for variant in self.rules.apply(&candidate) {
            *tried += 1;

            if target.verify(&variant) {
                return Some(variant);
            }
        }

        None
    }

    /// Searches the password of `target` among the candidates of `range`.
    /// `checkpoint` is called with the current index every `CHECKPOINT_INTERVAL` candidates.
    /// Returns the outcome and the index of the next candidate.
    fn run(
        &self,
        target: &TargetHash,
        generator: &mut dyn CandidateGenerator,
        range: Range<u64>,
        total: Option<u64>,
        mut checkpoint: impl FnMut(u64),
    ) -> (Outcome, u64) {
        generator.seek(range.start);

        let mut position = range.start;
        let mut tried = 0;

        let outcome = loop {
            if position >= range.end {
                break Outcome::Exhausted;
            }

            let done = position - range.start;
            if done != 0 && done % BATCH_SIZE == 0 {
                self.stats.add_passwords(tried);
                tried = 0;

                self.emit(Event::Progress {
                    current: done,
                    total,
                });

                if self.is_found(&target.raw_entry) {
                    break Outcome::Abandoned;
                }

                if done % CHECKPOINT_INTERVAL == 0 {
                    self.stats.sample_memory();
                    checkpoint(position);
                }
            }

            let Some(candidate) = generator.next() else {
                break Outcome::Exhausted;
            };
            position += 1;

            if let Some(password) = self.try_candidate(target, candidate, &mut tried) {
                break Outcome::Found(password);
            }
        };

        self.stats.add_passwords(tried);

        (outcome, position)
    }
}

/// A password recovery attack.
pub struct Attack {
    config: AttackConfig,
    sender: Option<Sender<Event>>,
}

impl Attack {
    /// Runs an attack in a background thread.
    /// The returned handle streams the progress events and gives the report.
    pub fn run_nonblocking(config: AttackConfig) -> AttackHandle {
        let (sender, receiver) = unbounded();
        let thread_handle = thread::spawn(move || Self::new(config, Some(sender)).run());

        AttackHandle {
            thread_handle,
            receiver,
        }
    }

    /// Runs an attack in the calling thread.
    pub fn run_blocking(config: AttackConfig) -> BrutyfResult<AttackReport> {
        Self::new(config, None).run()
    }

    fn new(config: AttackConfig, sender: Option<Sender<Event>>) -> Self {
        Self { config, sender }
    }

    fn emit(&self, event: Event) {
        if let Some(sender) = &self.sender {
            sender.send(event).ok();
        }
    }

    fn phase(&self, phase: AttackPhase) {
        debug!("Attack phase: {phase:?}");
        self.emit(Event::Phase(phase));
    }

    fn run(self) -> BrutyfResult<AttackReport> {
        let config = &self.config;

        let mut stats = Statistics::new();
        stats.start();

        self.phase(AttackPhase::SelectStrategy);
        let mode = config.resolve_mode();

        if config.hash_file.as_os_str().is_empty() {
            return Err(BrutyfError::MissingInput {
                mode: mode.as_str(),
                input: "a hash file",
            });
        }

        let mut targets =
            read_targets(&config.hash_file, config.hash_type, config.input_format)?;
        let source = CandidateSource::from_config(config, mode)?;
        let range = source.range(config.skip, config.limit);
        let rules = RuleEngine::new(&config.rules);

        info!(
            "Starting a {mode} attack on {} hashes over {} candidates",
            targets.len(),
            source
                .total()
                .map_or_else(|| "an unbounded number of".to_owned(), |t| t.to_string())
        );

        self.phase(AttackPhase::FilterCache);
        let mut potfile = if config.potfile {
            let path = config
                .potfile_path
                .clone()
                .unwrap_or_else(Potfile::default_path);
            Some(Potfile::open(path)?)
        } else {
            None
        };

        let mut from_potfile = 0;
        let mut pending = Vec::new();

        for (i, target) in targets.iter_mut().enumerate() {
            if let Some(password) = potfile.as_ref().and_then(|p| p.get(&target.hash)) {
                target.password = Some(password.to_owned());
                from_potfile += 1;
            } else if target.hash_type == HashType::Unknown {
                warn!("Unable to identify the type of {}, skipping it", target.hash);
            } else {
                pending.push(i);
            }
        }

        if from_potfile != 0 {
            info!("{from_potfile} hashes were already cracked");
        }

        stats.add_hashes(pending.len() as u64);

        let search = Search {
            rules: &rules,
            stats: &stats,
            found: None,
            events: self.sender.as_ref(),
        };

        let mut session = None;
        let mut partitioning = None;

        let found = if pending.is_empty() {
            Vec::new()
        } else if config.threads <= 1 {
            self.phase(AttackPhase::SingleThreaded);

            let dir = config.session_dir.clone().unwrap_or_else(env::temp_dir);
            let mut opened = Session::open_in(
                &dir,
                &config.hash_file.to_string_lossy(),
                &session_key(config, mode),
            )?;

            if !config.resume {
                opened.clear()?;
            } else if opened.exists() {
                info!("Resuming from {}", opened.path().display());
            }

            let found =
                self.run_single(&source, &targets, &pending, range, &search, &mut opened)?;
            session = Some(opened);

            found
        } else {
            let chosen = Partitioning::choose(pending.len(), config.threads.min(MAX_THREADS));
            partitioning = Some(chosen);
            self.phase(AttackPhase::Partitioned);

            let found_set = Mutex::new(HashSet::new());
            let search = Search {
                found: Some(&found_set),
                ..search
            };

            self.run_partitioned(&source, &targets, &pending, range, chosen, &search)?
        };

        self.phase(AttackPhase::Aggregate);
        let mut cracked = Vec::new();

        for (i, password) in found {
            let target = &mut targets[i];

            if target.password.is_none() {
                target.password = Some(password);
                cracked.push(i);
            }
        }

        // Only one copy of a repeated entry is searched by the workers.
        let solved: HashMap<String, String> = cracked
            .iter()
            .filter_map(|&i| {
                let target = &targets[i];
                target
                    .password
                    .clone()
                    .map(|password| (target.raw_entry.clone(), password))
            })
            .collect();

        for &i in &pending {
            let target = &mut targets[i];

            if target.password.is_none() {
                if let Some(password) = solved.get(&target.raw_entry) {
                    target.password = Some(password.clone());
                    cracked.push(i);
                }
            }
        }

        stats.add_found(cracked.len() as u64);

        for &i in &pending {
            if targets[i].password.is_none() {
                self.emit(Event::Exhausted {
                    hash: targets[i].hash.clone(),
                });
            }
        }

        self.phase(AttackPhase::Persist);
        if let Some(potfile) = &mut potfile {
            for &i in &cracked {
                let target = &targets[i];

                if let Some(password) = &target.password {
                    if potfile.get(&target.hash) == Some(password.as_str()) {
                        continue;
                    }

                    if let Err(e) = potfile.add(&target.hash, password) {
                        warn!("Unable to record {} in the potfile: {e}", target.hash);
                    }
                }
            }
        }

        if let Some(session) = &mut session {
            session.clear()?;
        }

        self.phase(AttackPhase::Report);
        stats.stop();

        let report = AttackReport {
            mode,
            partitioning,
            targets,
            from_potfile,
            stats: stats.report(),
        };

        info!(
            "Cracked {} of {} hashes",
            report.cracked_count(),
            report.targets.len()
        );

        self.phase(AttackPhase::Done);

        Ok(report)
    }

    /// Searches every target one after the other, checkpointing the progress in `session`.
    fn run_single(
        &self,
        source: &CandidateSource,
        targets: &[TargetHash],
        pending: &[usize],
        range: Range<u64>,
        search: &Search<'_>,
        session: &mut Session,
    ) -> BrutyfResult<Vec<(usize, String)>> {
        let mut generator = source.generator(range.start)?;
        let total = source.total().map(|_| range.end - range.start);
        let mut found = Vec::new();

        for &i in pending {
            let target = &targets[i];
            let entry = target.raw_entry.as_str();

            if let Some(password) = session.found(entry) {
                debug!("{} was cracked before the interruption", target.hash);
                found.push((i, password.to_owned()));
                continue;
            }

            let start = range.start.max(session.get_progress(entry));
            debug!("Searching {} from candidate {start}", target.hash);
            self.emit(Event::TargetStarted {
                hash: target.hash.clone(),
            });

            let (outcome, position) =
                search.run(target, generator.as_mut(), start..range.end, total, |position| {
                    session.set_progress(entry, position);

                    if let Err(e) = session.save() {
                        warn!("Unable to save the session: {e}");
                    }
                });

            match outcome {
                Outcome::Found(password) => {
                    info!("Found {}:{password}", target.hash);
                    self.emit(Event::Found {
                        hash: target.hash.clone(),
                        password: password.clone(),
                    });

                    session.record_found(entry, &password);
                    found.push((i, password));
                }
                Outcome::Exhausted | Outcome::Abandoned => session.set_progress(entry, position),
            }

            if let Err(e) = session.save() {
                warn!("Unable to save the session: {e}");
            }
        }

        Ok(found)
    }

    /// Splits the work between several workers and waits for all of them.
    fn run_partitioned(
        &self,
        source: &CandidateSource,
        targets: &[TargetHash],
        pending: &[usize],
        range: Range<u64>,
        partitioning: Partitioning,
        search: &Search<'_>,
    ) -> BrutyfResult<Vec<(usize, String)>> {
        let threads = self.config.threads.min(MAX_THREADS);
        let (results, receiver) = unbounded();

        let work = |worker: usize, assigned: &[usize], part: Range<u64>, results: Sender<(usize, String)>| {
            let mut generator = match source.generator(part.start) {
                Ok(generator) => generator,
                Err(e) => {
                    warn!("Worker {worker} could not start, skipping its shard: {e}");
                    return;
                }
            };

            let total = source.total().map(|_| part.end - part.start);
            debug!(
                "Worker {worker}: {} hashes, candidates {part:?}",
                assigned.len()
            );

            for &i in assigned {
                let target = &targets[i];

                if search.is_found(&target.raw_entry) {
                    continue;
                }

                search.emit(Event::TargetStarted {
                    hash: target.hash.clone(),
                });

                let (outcome, _) =
                    search.run(target, generator.as_mut(), part.clone(), total, |_| {});

                if let Outcome::Found(password) = outcome {
                    if search.mark_found(&target.raw_entry) {
                        info!("Worker {worker} found {}:{password}", target.hash);
                        search.emit(Event::Found {
                            hash: target.hash.clone(),
                            password: password.clone(),
                        });
                        results.send((i, password)).ok();
                    }
                }
            }
        };
        let work = &work;

        let shards: Vec<(&[usize], Range<u64>)> = match partitioning {
            Partitioning::ByHash => split_slice(pending, threads)
                .into_iter()
                .map(|chunk| (chunk, range.clone()))
                .collect(),
            Partitioning::BySpace => SplitIterator::over(range, threads)
                .map(|part| (pending, part))
                .collect(),
        };

        let panicked = thread::scope(|s| {
            let mut handles = Vec::new();

            for (worker, (assigned, part)) in shards.into_iter().enumerate() {
                let results = results.clone();
                let spawned = thread::Builder::new()
                    .name(format!("brutyf-worker-{worker}"))
                    .spawn_scoped(s, move || work(worker, assigned, part, results));

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => warn!("Unable to spawn worker {worker}, skipping its shard: {e}"),
                }
            }

            handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count()
        });

        drop(results);

        if panicked != 0 {
            return Err(BrutyfError::WorkerPanicked);
        }

        Ok(receiver.try_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use super::*;
    use crate::{
        ctx::{AttackConfigBuilder, HashTypeSelection},
        extract::InputFormat,
    };

    const MD5_PASSWORD: &str = "5f4dcc3b5aa765d61d8327deb882cf99";
    const SHA1_PASSWORD: &str = "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8";
    const MD5_LETMEIN: &str = "0d107d09f5bbe40cade3de5c71e9e9b7";
    const MD5_HELLO: &str = "5d41402abc4b2a76b9719d911017c592";
    const MD5_ADMIN: &str = "21232f297a57a5a743894a0e4a801fc3";
    const MD5_123: &str = "202cb962ac59075b964b07152d234b70";
    const MD5_ABC: &str = "900150983cd24fb0d6963f7d28e17f72";
    const MD5_QWERTY: &str = "d8578edf8458ce06fbc5bb76a58c5ca4";
    const MD5_ABCD: &str = "e2fc714c4727ee9395f324cd2e7f331f";
    const MD5_UNKNOWN: &str = "ffffffffffffffffffffffffffffffff";

    const WORDS: &[&str] = &["123456", "password", "qwerty", "letmein", "hello", "admin"];

    fn write_lines(path: &Path, lines: &[&str]) {
        fs::write(path, lines.join("\n")).unwrap();
    }

    /// A wordlist attack on `hashes` with a private potfile and session directory.
    fn setup(hashes: &[&str]) -> (TempDir, AttackConfigBuilder) {
        let dir = tempfile::tempdir().unwrap();
        let hash_file = dir.path().join("hashes.txt");
        let wordlist = dir.path().join("words.txt");
        write_lines(&hash_file, hashes);
        write_lines(&wordlist, WORDS);

        let builder = AttackConfig::builder()
            .hash_file(hash_file)
            .wordlist(wordlist)
            .potfile_path(dir.path().join("test.pot"))
            .session_dir(dir.path());

        (dir, builder)
    }

    fn password_of<'a>(report: &'a AttackReport, hash: &str) -> Option<&'a str> {
        report
            .targets
            .iter()
            .find(|target| target.hash == hash)
            .and_then(|target| target.password.as_deref())
    }

    #[test]
    fn test_wordlist_attack() {
        let (_dir, builder) = setup(&[MD5_PASSWORD, SHA1_PASSWORD, MD5_UNKNOWN]);
        let report = Attack::run_blocking(builder.build()).unwrap();

        assert_eq!(AttackMode::Wordlist, report.mode);
        assert_eq!(None, report.partitioning);
        assert_eq!(Some("password"), password_of(&report, MD5_PASSWORD));
        assert_eq!(Some("password"), password_of(&report, SHA1_PASSWORD));
        assert_eq!(2, report.cracked_count());
        assert_eq!(1, report.unsolved().len());
        assert_eq!(MD5_UNKNOWN, report.unsolved()[0].hash);
        assert_eq!(2, report.stats.passwords_found);
        // 2 + 2 + 6 candidates
        assert_eq!(10, report.stats.passwords_tried);
    }

    #[test]
    fn test_second_run_uses_potfile() {
        let (dir, builder) = setup(&[MD5_PASSWORD, MD5_LETMEIN]);

        let first = Attack::run_blocking(builder.clone().build()).unwrap();
        assert_eq!(2, first.cracked_count());
        assert_eq!(0, first.from_potfile);

        let pot = fs::read_to_string(dir.path().join("test.pot")).unwrap();
        assert!(pot.contains(&format!("{MD5_PASSWORD}:password")));

        let second = Attack::run_blocking(builder.build()).unwrap();
        assert_eq!(2, second.cracked_count());
        assert_eq!(2, second.from_potfile);
        assert_eq!(0, second.stats.passwords_tried);
        assert_eq!(0, second.stats.hashes_processed);
        assert_eq!(first.results(), second.results());
    }

    #[test]
    fn test_partition_by_hash() {
        let (_dir, builder) = setup(&[MD5_PASSWORD, MD5_LETMEIN, MD5_HELLO, MD5_UNKNOWN]);
        let report = Attack::run_blocking(builder.threads(2).potfile(false).build()).unwrap();

        assert_eq!(Some(Partitioning::ByHash), report.partitioning);
        assert_eq!(Some("letmein"), password_of(&report, MD5_LETMEIN));
        assert_eq!(Some("hello"), password_of(&report, MD5_HELLO));
        assert_eq!(3, report.cracked_count());
        assert_eq!(4, report.stats.hashes_processed);
    }

    #[test]
    fn test_partition_by_space() {
        let (_dir, builder) = setup(&[MD5_ADMIN]);
        let report = Attack::run_blocking(builder.threads(4).potfile(false).build()).unwrap();

        assert_eq!(Some(Partitioning::BySpace), report.partitioning);
        assert_eq!(Some("admin"), password_of(&report, MD5_ADMIN));
        assert!(report.stats.passwords_tried <= WORDS.len() as u64);
    }

    #[test]
    fn test_partition_repeated_entries() {
        let (dir, builder) = setup(&[MD5_PASSWORD, MD5_PASSWORD]);
        let report = Attack::run_blocking(builder.threads(2).build()).unwrap();

        assert_eq!(Some(Partitioning::ByHash), report.partitioning);
        assert_eq!(2, report.cracked_count());
        assert!(report
            .targets
            .iter()
            .all(|target| target.password.as_deref() == Some("password")));

        let potfile = fs::read_to_string(dir.path().join("test.pot")).unwrap();
        assert_eq!(1, potfile.lines().count());
    }

    #[test]
    fn test_partition_by_space_stops_other_shards() {
        let dir = tempfile::tempdir().unwrap();
        let hash_file = dir.path().join("hashes.txt");
        let wordlist = dir.path().join("words.txt");
        write_lines(&hash_file, &[MD5_PASSWORD]);

        let total = 4 * 3 * BATCH_SIZE;
        let mut words = vec!["password".to_owned()];
        words.extend((1..total).map(|n| format!("word{n}")));
        fs::write(&wordlist, words.join("\n")).unwrap();

        let config = AttackConfig::builder()
            .hash_file(&hash_file)
            .wordlist(&wordlist)
            .potfile(false)
            .session_dir(dir.path())
            .threads(4)
            .build();
        let report = Attack::run_blocking(config).unwrap();

        assert_eq!(Some(Partitioning::BySpace), report.partitioning);
        assert_eq!(Some("password"), password_of(&report, MD5_PASSWORD));
        assert!(report.stats.passwords_tried < total);
    }

    #[test]
    fn test_search_abandons_cracked_target() {
        let rules = RuleEngine::default();
        let stats = Statistics::new();
        let target = TargetHash::parse(MD5_UNKNOWN, HashTypeSelection::Auto);
        let found = Mutex::new(HashSet::from([target.raw_entry.clone()]));

        let search = Search {
            rules: &rules,
            stats: &stats,
            found: Some(&found),
            events: None,
        };

        let mut generator = IncrementalGenerator::new("abcdefghij", 4, 4);
        let (outcome, position) =
            search.run(&target, &mut generator, 0..3 * BATCH_SIZE, None, |_| {});

        assert!(matches!(outcome, Outcome::Abandoned));
        assert_eq!(BATCH_SIZE, position);
        assert_eq!(BATCH_SIZE, stats.passwords_tried());
    }

    #[test]
    fn test_search_samples_memory() {
        let rules = RuleEngine::default();
        let stats = Statistics::new();
        let target = TargetHash::parse(MD5_UNKNOWN, HashTypeSelection::Auto);

        let search = Search {
            rules: &rules,
            stats: &stats,
            found: None,
            events: None,
        };

        let mut checkpoints = Vec::new();
        let mut generator = IncrementalGenerator::new("abcdefghij", 5, 5);
        let (outcome, _) = search.run(
            &target,
            &mut generator,
            0..CHECKPOINT_INTERVAL + 1,
            None,
            |position| checkpoints.push(position),
        );

        assert!(matches!(outcome, Outcome::Exhausted));
        assert_eq!(vec![CHECKPOINT_INTERVAL], checkpoints);
        assert!(stats.peak_memory() > 0);
    }

    #[test]
    fn test_pwdump_input() {
        let dump = "Administrator:500:aad3b435b51404eeaad3b435b51404ee:\
                    0d107d09f5bbe40cade3de5c71e9e9b7:::";
        let (_dir, builder) = setup(&[dump]);
        let config = builder
            .input_format(InputFormat::Pwdump)
            .hash_type(HashTypeSelection::Fixed(HashType::Md5))
            .potfile(false)
            .build();
        let report = Attack::run_blocking(config).unwrap();

        assert_eq!(Some("letmein"), password_of(&report, MD5_LETMEIN));
        assert_eq!(
            Some("Administrator"),
            report.targets[0].username.as_deref()
        );
    }

    #[test]
    fn test_results_keep_usernames() {
        let entry = format!("alice:{MD5_HELLO}");
        let (_dir, builder) = setup(&[&entry]);
        let report = Attack::run_blocking(builder.potfile(false).build()).unwrap();

        assert_eq!(
            vec![CrackResult {
                username: Some("alice".to_owned()),
                hash: MD5_HELLO.to_owned(),
                password: "hello".to_owned(),
            }],
            report.results()
        );
    }

    #[test]
    fn test_rules() {
        let dir = tempfile::tempdir().unwrap();
        let hash_file = dir.path().join("hashes.txt");
        let wordlist = dir.path().join("words.txt");
        write_lines(&hash_file, &[MD5_PASSWORD]);
        write_lines(&wordlist, &["PASSWORD"]);

        let config = AttackConfig::builder()
            .hash_file(&hash_file)
            .wordlist(&wordlist)
            .potfile(false)
            .session_dir(dir.path())
            .rules(&["none", "lowercase"])
            .build();
        let report = Attack::run_blocking(config).unwrap();

        assert_eq!(Some("password"), password_of(&report, MD5_PASSWORD));
        assert_eq!(2, report.stats.passwords_tried);
    }

    #[test]
    fn test_skip_and_limit() {
        let (_dir, builder) = setup(&[MD5_LETMEIN]);

        // "letmein" is the fourth word
        let report = Attack::run_blocking(builder.clone().potfile(false).limit(3).build()).unwrap();
        assert_eq!(0, report.cracked_count());
        assert_eq!(3, report.stats.passwords_tried);

        let report =
            Attack::run_blocking(builder.clone().potfile(false).skip(2).limit(2).build()).unwrap();
        assert_eq!(1, report.cracked_count());
        assert_eq!(2, report.stats.passwords_tried);

        let report = Attack::run_blocking(builder.potfile(false).skip(100).build()).unwrap();
        assert_eq!(0, report.stats.passwords_tried);
    }

    #[test]
    fn test_resume_from_checkpoint() {
        let (dir, builder) = setup(&[MD5_PASSWORD]);
        let config = builder.potfile(false).build();

        let mut session = Session::open_in(
            dir.path(),
            &config.hash_file.to_string_lossy(),
            &session_key(&config, AttackMode::Wordlist),
        )
        .unwrap();
        session.set_progress(MD5_PASSWORD, 2);
        session.save().unwrap();

        let mut resumed = config.clone();
        resumed.resume = true;
        let report = Attack::run_blocking(resumed).unwrap();

        // "password" is before the checkpoint
        assert_eq!(0, report.cracked_count());
        assert_eq!(WORDS.len() as u64 - 2, report.stats.passwords_tried);
        // the session is cleared once the run is over
        assert!(!session.path().exists());

        let report = Attack::run_blocking(config).unwrap();
        assert_eq!(1, report.cracked_count());
    }

    #[test]
    fn test_resume_found_in_session() {
        let (dir, builder) = setup(&[MD5_UNKNOWN]);
        let config = builder.potfile(false).resume(true).build();

        let mut session = Session::open_in(
            dir.path(),
            &config.hash_file.to_string_lossy(),
            &session_key(&config, AttackMode::Wordlist),
        )
        .unwrap();
        session.record_found(MD5_UNKNOWN, "recovered");
        session.save().unwrap();

        let report = Attack::run_blocking(config).unwrap();
        assert_eq!(Some("recovered"), password_of(&report, MD5_UNKNOWN));
        assert_eq!(0, report.stats.passwords_tried);
    }

    #[test]
    fn test_mask_attack() {
        let (_dir, builder) = setup(&[MD5_123]);
        let report = Attack::run_blocking(builder.mask("?d?d?d").potfile(false).build()).unwrap();

        // the wordlist and the mask make a hybrid attack
        assert_eq!(AttackMode::Hybrid, report.mode);

        let (_dir, builder) = setup(&[MD5_123]);
        let report = Attack::run_blocking(
            builder
                .mask("?d?d?d")
                .attack_mode(AttackMode::Mask)
                .potfile(false)
                .build(),
        )
        .unwrap();

        assert_eq!(AttackMode::Mask, report.mode);
        assert_eq!(Some("123"), password_of(&report, MD5_123));
        assert_eq!(124, report.stats.passwords_tried);
    }

    #[test]
    fn test_hybrid_attack() {
        let hash = "482c811da5d5b4bc6d497ffa98491e38"; // password123
        let (_dir, builder) = setup(&[hash]);
        let report = Attack::run_blocking(builder.mask("?d?d?d").potfile(false).build()).unwrap();

        assert_eq!(Some("password123"), password_of(&report, hash));
    }

    #[test]
    fn test_incremental_attack() {
        let (_dir, builder) = setup(&[MD5_ABC]);
        let config = builder
            .attack_mode(AttackMode::Incremental)
            .charset("abc")
            .max_length(3)
            .potfile(false)
            .build();
        let report = Attack::run_blocking(config).unwrap();

        assert_eq!(Some("abc"), password_of(&report, MD5_ABC));
        // 3 + 9 candidates of length 1 and 2, then "aaa" to "abc"
        assert_eq!(12 + 6, report.stats.passwords_tried);
    }

    #[test]
    fn test_keyboard_walk_attack() {
        let (_dir, builder) = setup(&[MD5_QWERTY]);
        let config = builder
            .attack_mode(AttackMode::KeyboardWalk)
            .threads(3)
            .potfile(false)
            .build();
        let report = Attack::run_blocking(config).unwrap();

        assert_eq!(Some("qwerty"), password_of(&report, MD5_QWERTY));
    }

    #[test]
    fn test_markov_attack() {
        let dir = tempfile::tempdir().unwrap();
        let hash_file = dir.path().join("hashes.txt");
        let wordlist = dir.path().join("words.txt");
        write_lines(&hash_file, &[MD5_ABCD]);
        write_lines(&wordlist, &["abcd"; 5]);

        let config = AttackConfig::builder()
            .hash_file(&hash_file)
            .wordlist(&wordlist)
            .attack_mode(AttackMode::Markov)
            .markov_cap(10)
            .markov_seed(7)
            .potfile(false)
            .session_dir(dir.path())
            .build();
        let report = Attack::run_blocking(config).unwrap();

        assert_eq!(Some("abcd"), password_of(&report, MD5_ABCD));
    }

    #[test]
    fn test_missing_inputs() {
        let config = AttackConfig::builder().wordlist("words.txt").build();
        assert!(matches!(
            Attack::run_blocking(config),
            Err(BrutyfError::MissingInput { input: "a hash file", .. })
        ));

        let (_dir, builder) = setup(&[MD5_PASSWORD]);
        let config = builder
            .clone()
            .attack_mode(AttackMode::Mask)
            .potfile(false)
            .build();
        assert!(matches!(
            Attack::run_blocking(config),
            Err(BrutyfError::MissingInput { mode: "mask", .. })
        ));

        let config = builder
            .attack_mode(AttackMode::Combinator)
            .potfile(false)
            .build();
        assert!(matches!(
            Attack::run_blocking(config),
            Err(BrutyfError::MissingInput { mode: "combinator", .. })
        ));

        let config = AttackConfig::builder()
            .hash_file("does/not/exist.txt")
            .wordlist("words.txt")
            .potfile(false)
            .build();
        assert!(matches!(
            Attack::run_blocking(config),
            Err(BrutyfError::Open { .. })
        ));
    }

    #[test]
    fn test_unknown_hashes_are_not_searched() {
        let (_dir, builder) = setup(&["not a hash"]);
        let report = Attack::run_blocking(builder.potfile(false).build()).unwrap();

        assert_eq!(1, report.unsolved().len());
        assert_eq!(0, report.stats.passwords_tried);
        assert_eq!(0, report.stats.hashes_processed);
    }

    #[test]
    fn test_nonblocking_events() {
        let (_dir, builder) = setup(&[MD5_HELLO, MD5_UNKNOWN]);
        let handle = Attack::run_nonblocking(builder.potfile(false).build());

        let mut events = Vec::new();
        while let Some(event) = handle.recv() {
            events.push(event);
        }

        let report = handle.join().unwrap();
        assert_eq!(1, report.cracked_count());

        assert_eq!(Some(&Event::Phase(AttackPhase::SelectStrategy)), events.first());
        assert_eq!(Some(&Event::Phase(AttackPhase::Done)), events.last());
        assert!(events.contains(&Event::Found {
            hash: MD5_HELLO.to_owned(),
            password: "hello".to_owned(),
        }));
        assert!(events.contains(&Event::Exhausted {
            hash: MD5_UNKNOWN.to_owned(),
        }));
    }

    #[test]
    fn test_source_range() {
        let source = CandidateSource::Mask(MaskGenerator::new("?d?d"));

        assert_eq!(0..100, source.range(0, None));
        assert_eq!(10..30, source.range(10, Some(20)));
        assert_eq!(90..100, source.range(90, Some(20)));
        assert_eq!(100..100, source.range(200, None));
    }
}
