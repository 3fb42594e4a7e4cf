use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::{BufRead, BufReader, BufWriter},
    path::Path,
    sync::Arc,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{wordlist::open_wordlist, CandidateGenerator};
use crate::{
    error::{BrutyfError, BrutyfResult},
    DEFAULT_MARKOV_CAP, DEFAULT_MARKOV_LENGTH, DEFAULT_MARKOV_ORDER,
};

/// Marks the end of a password in the transition tables.
const END: &str = "\0";

/// The number of generation attempts before a candidate is given up.
const MAX_ATTEMPTS: usize = 100;

/// A character-level markov model trained on example passwords.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkovModel {
    order: usize,
    /// For each state of `order` characters, the frequency of the next character.
    chains: BTreeMap<String, BTreeMap<String, u64>>,
    /// The frequency of the first `order` characters.
    #[serde(rename = "startChars")]
    start_chars: BTreeMap<String, u64>,
}

impl Default for MarkovModel {
    fn default() -> Self {
        Self::new(DEFAULT_MARKOV_ORDER)
    }
}

impl MarkovModel {
    /// Creates an empty model. The order is at least 1.
    pub fn new(order: usize) -> Self {
        Self {
            order: order.max(1),
            chains: BTreeMap::new(),
            start_chars: BTreeMap::new(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// The number of known states.
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// The number of known starting states.
    pub fn start_count(&self) -> usize {
        self.start_chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty() || self.start_chars.is_empty()
    }

    /// Trains the model on one password.
    /// Passwords shorter than the order are ignored.
    pub fn train(&mut self, password: &str) {
        let chars: Vec<char> = password.trim().chars().collect();
        if chars.len() < self.order {
            return;
        }

        let start: String = chars[..self.order].iter().collect();
        *self.start_chars.entry(start).or_default() += 1;

        for i in 0..=chars.len() - self.order {
            let state: String = chars[i..i + self.order].iter().collect();
            let next = chars
                .get(i + self.order)
                .map_or_else(|| END.to_owned(), |c| c.to_string());

            *self
                .chains
                .entry(state)
                .or_default()
                .entry(next)
                .or_default() += 1;
        }
    }

    /// Trains the model on the first `limit` non blank lines of a wordlist.
    /// Returns the number of passwords used.
    pub fn train_from_file(&mut self, path: &Path, limit: usize) -> BrutyfResult<usize> {
        let mut reader = open_wordlist(path)?;
        let mut buf = Vec::new();
        let mut count = 0;

        while count < limit {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let password = line.trim();
            if password.is_empty() {
                continue;
            }

            self.train(password);
            count += 1;
        }

        debug!(
            "Trained on {count} passwords: {} states, {} starting states",
            self.chain_count(),
            self.start_count()
        );

        Ok(count)
    }

    /// Stores the model to disk.
    /// A `.json` path gets the JSON form, any other path the binary form.
    pub fn store(&self, path: &Path) -> BrutyfResult<()> {
        let file = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| BrutyfError::open(path, e))?;

        let buf_writer = BufWriter::with_capacity(1024 * 1024 * 16, file);

        if is_json(path) {
            serde_json::to_writer(buf_writer, self)?;
        } else {
            bincode::serialize_into(buf_writer, self).map_err(|_| BrutyfError::Serialize)?;
        }

        Ok(())
    }

    /// Loads a model from disk.
    pub fn load(path: &Path) -> BrutyfResult<Self> {
        let file = File::open(path).map_err(|e| BrutyfError::open(path, e))?;
        let buf_reader = BufReader::with_capacity(1024 * 1024 * 16, file);

        let mut model: MarkovModel = if is_json(path) {
            serde_json::from_reader(buf_reader)?
        } else {
            bincode::deserialize_from(buf_reader).map_err(|_| BrutyfError::Deserialize)?
        };
        model.order = model.order.max(1);

        Ok(model)
    }

    /// Draws a key with a probability proportional to its frequency.
    fn weighted<'a>(weights: &'a BTreeMap<String, u64>, rng: &mut StdRng) -> Option<&'a str> {
        let total: u64 = weights.values().sum();
        if total == 0 {
            return None;
        }

        let draw = rng.gen_range(1..=total);
        let mut cumulative = 0;

        for (key, weight) in weights {
            cumulative += weight;
            if draw <= cumulative {
                return Some(key.as_str());
            }
        }

        weights.keys().next().map(String::as_str)
    }

    /// Performs one random walk.
    /// Returns `None` if the walk is outside of `[min_length, max_length]`.
    fn walk(&self, rng: &mut StdRng, min_length: usize, max_length: usize) -> Option<String> {
        let mut password = Self::weighted(&self.start_chars, rng)?.to_owned();
        let mut state = password.clone();
        let mut length = password.chars().count();

        for _ in 0..max_length * 2 {
            let Some(transitions) = self.chains.get(&state) else {
                break;
            };

            let next = Self::weighted(transitions, rng)?;
            if next == END || length >= max_length {
                break;
            }

            password.push_str(next);
            length += 1;

            let skip = length.saturating_sub(self.order);
            state = password.chars().skip(skip).collect();
        }

        (min_length..=max_length)
            .contains(&length)
            .then_some(password)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Draws candidates from a markov model, up to a maximum number of candidates.
#[derive(Clone, Debug)]
pub struct MarkovGenerator {
    model: Arc<MarkovModel>,
    min_length: usize,
    max_length: usize,
    cap: u64,
    seed: Option<u64>,
    rng: StdRng,
    generated: u64,
}

impl MarkovGenerator {
    /// Creates a new markov generator with the default length window and cap.
    pub fn new(model: Arc<MarkovModel>) -> Self {
        Self {
            model,
            min_length: DEFAULT_MARKOV_LENGTH.0,
            max_length: DEFAULT_MARKOV_LENGTH.1,
            cap: DEFAULT_MARKOV_CAP,
            seed: None,
            rng: StdRng::from_entropy(),
            generated: 0,
        }
    }

    /// Sets the length window of the candidates.
    pub fn lengths(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length.max(min_length);

        self
    }

    /// Sets the maximum number of candidates.
    pub fn cap(mut self, cap: u64) -> Self {
        self.cap = cap;

        self
    }

    /// Makes the draws reproducible.
    /// The generator then restarts the same sequence on every reset.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);

        self
    }

    pub fn model(&self) -> &MarkovModel {
        &self.model
    }

    /// The maximum number of candidates.
    pub fn max_candidates(&self) -> u64 {
        self.cap
    }

    /// Draws one candidate, or `None` if the walk was rejected.
    pub fn generate(&mut self) -> Option<String> {
        self.model
            .walk(&mut self.rng, self.min_length, self.max_length)
    }

    /// Draws up to `count` distinct candidates, giving up after `10 * count` attempts.
    pub fn generate_multiple(&mut self, count: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for _ in 0..count.saturating_mul(10) {
            if candidates.len() == count {
                break;
            }

            if let Some(candidate) = self.generate() {
                if seen.insert(candidate.clone()) {
                    candidates.push(candidate);
                }
            }
        }

        candidates
    }
}

impl Iterator for MarkovGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.generated >= self.cap || self.model.is_empty() {
            return None;
        }

        self.generated += 1;
        (0..=MAX_ATTEMPTS).find_map(|_| self.generate())
    }
}

impl CandidateGenerator for MarkovGenerator {
    /// Markov candidates are random: only their maximum number is known.
    fn total_count(&self) -> Option<u64> {
        None
    }

    fn reset(&mut self) {
        self.generated = 0;

        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    fn seek(&mut self, index: u64) {
        self.reset();
        self.generated = index.min(self.cap);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use itertools::Itertools;

    use super::*;

    const TRAINING: [&str; 6] = ["password", "passw0rd", "pass1234", "letmein", "monkey", "dragon"];

    fn trained_model() -> MarkovModel {
        let mut model = MarkovModel::new(2);
        for password in TRAINING {
            model.train(password);
        }

        model
    }

    #[test]
    fn test_train_tables() {
        let mut model = MarkovModel::new(2);
        model.train("abc");
        model.train("abd");
        model.train("x");

        assert_eq!(1, model.start_count());
        assert_eq!(Some(&2), model.start_chars.get("ab"));
        assert_eq!(Some(&1), model.chains["ab"].get("c"));
        assert_eq!(Some(&1), model.chains["ab"].get("d"));
        assert_eq!(Some(&1), model.chains["bc"].get(END));
        assert_eq!(3, model.chain_count());
    }

    #[test]
    fn test_generate_respects_lengths() {
        let model = Arc::new(trained_model());
        let mut generator = MarkovGenerator::new(model).lengths(5, 8).cap(50).seed(42);

        let candidates = generator.by_ref().collect_vec();
        assert!(!candidates.is_empty());
        assert!(candidates.len() <= 50);
        assert!(candidates
            .iter()
            .all(|c| (5..=8).contains(&c.chars().count())));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let model = Arc::new(trained_model());
        let mut generator = MarkovGenerator::new(model.clone()).cap(20).seed(7);

        let first = generator.by_ref().collect_vec();
        generator.reset();
        let second = generator.collect_vec();
        let other = MarkovGenerator::new(model).cap(20).seed(7).collect_vec();

        assert_eq!(first, second);
        assert_eq!(first, other);
    }

    #[test]
    fn test_generate_multiple_distinct() {
        let model = Arc::new(trained_model());
        let mut generator = MarkovGenerator::new(model).seed(3);

        let candidates = generator.generate_multiple(5);
        assert!(candidates.len() <= 5);
        assert_eq!(
            candidates.len(),
            candidates.iter().collect::<HashSet<_>>().len()
        );
    }

    #[test]
    fn test_empty_model() {
        let mut generator = MarkovGenerator::new(Arc::new(MarkovModel::default()));
        assert_eq!(None, generator.next());
        assert_eq!(None, generator.total_count());
    }

    #[test]
    fn test_seek_consumes_cap() {
        let model = Arc::new(trained_model());
        let mut generator = MarkovGenerator::new(model).cap(10).seed(1);

        generator.seek(8);
        assert!(generator.by_ref().count() <= 2);
    }

    #[test]
    fn test_store_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = trained_model();

        model.store(&path).unwrap();
        let loaded = MarkovModel::load(&path).unwrap();
        assert_eq!(model, loaded);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(2, json["order"]);
        assert!(json["startChars"].is_object());
        assert!(json["chains"].is_object());
    }

    #[test]
    fn test_store_load_binary_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let model = trained_model();

        model.store(&path).unwrap();
        let loaded = MarkovModel::load(&path).unwrap();

        assert_eq!(
            bincode::serialize(&model).unwrap(),
            bincode::serialize(&loaded).unwrap()
        );

        let original = MarkovGenerator::new(Arc::new(model)).cap(30).seed(9).collect_vec();
        let reloaded = MarkovGenerator::new(Arc::new(loaded)).cap(30).seed(9).collect_vec();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_train_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.txt");
        fs::write(&path, TRAINING.join("\n\n")).unwrap();

        let mut model = MarkovModel::new(2);
        assert_eq!(3, model.train_from_file(&path, 3).unwrap());
        assert_eq!(1, model.start_count());

        let mut model = MarkovModel::new(2);
        assert_eq!(6, model.train_from_file(&path, 100).unwrap());
        assert_eq!(trained_model(), model);
    }
}
