use std::{fmt::Display, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::BrutyfError,
    export::OutputFormat,
    extract::InputFormat,
    generator::IncrementalGenerator,
    hash::HashType,
    DEFAULT_CHARSET, DEFAULT_MARKOV_CAP, DEFAULT_MARKOV_LENGTH, DEFAULT_MARKOV_ORDER,
    DEFAULT_MARKOV_TRAINING_LIMIT, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_WALK_LENGTH,
    MAX_THREADS,
};

/// The search strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    Wordlist,
    Mask,
    /// A wordlist combined with a mask.
    Hybrid,
    /// Two wordlists combined together.
    Combinator,
    Incremental,
    Markov,
    KeyboardWalk,
}

impl AttackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackMode::Wordlist => "wordlist",
            AttackMode::Mask => "mask",
            AttackMode::Hybrid => "hybrid",
            AttackMode::Combinator => "combinator",
            AttackMode::Incremental => "incremental",
            AttackMode::Markov => "markov",
            AttackMode::KeyboardWalk => "keyboard_walk",
        }
    }
}

impl Display for AttackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackMode {
    type Err = BrutyfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "wordlist" | "dictionary" => AttackMode::Wordlist,
            "mask" => AttackMode::Mask,
            "hybrid" => AttackMode::Hybrid,
            "combinator" => AttackMode::Combinator,
            "incremental" | "bruteforce" => AttackMode::Incremental,
            "markov" => AttackMode::Markov,
            "keyboard_walk" | "keyboard" | "walk" => AttackMode::KeyboardWalk,
            _ => {
                return Err(BrutyfError::Unrecognized {
                    kind: "attack mode",
                    value: s.to_owned(),
                })
            }
        };

        Ok(mode)
    }
}

/// The hash type of the targets: detected per entry, or forced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashTypeSelection {
    #[default]
    Auto,
    Fixed(HashType),
}

impl FromStr for HashTypeSelection {
    type Err = BrutyfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(HashTypeSelection::Auto)
        } else {
            s.parse().map(HashTypeSelection::Fixed)
        }
    }
}

impl TryFrom<String> for HashTypeSelection {
    type Error = BrutyfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashTypeSelection> for String {
    fn from(selection: HashTypeSelection) -> Self {
        match selection {
            HashTypeSelection::Auto => "auto".to_owned(),
            HashTypeSelection::Fixed(hash_type) => hash_type.to_string(),
        }
    }
}

/// All the parameters of an attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// The file containing the hashes. `-` or `stdin` reads the standard input.
    pub hash_file: PathBuf,
    /// The layout of the hash file.
    pub input_format: InputFormat,
    pub wordlist: Option<PathBuf>,
    /// The second wordlist of the combinator attack.
    pub wordlist2: Option<PathBuf>,
    pub mask: Option<String>,
    /// Forces the attack mode instead of inferring it from the inputs.
    pub attack_mode: Option<AttackMode>,
    pub threads: usize,
    pub hash_type: HashTypeSelection,
    pub rules: Vec<String>,
    pub potfile: bool,
    pub potfile_path: Option<PathBuf>,
    pub resume: bool,
    /// The number of candidates to skip.
    pub skip: u64,
    /// The maximum number of candidates to try after the skipped ones.
    pub limit: Option<u64>,
    /// The minimum length of incremental, markov and keyboard walk candidates.
    pub min_length: Option<usize>,
    /// The maximum length of incremental, markov and keyboard walk candidates.
    pub max_length: Option<usize>,
    /// The incremental charset, or the name of a preset.
    pub charset: String,
    /// The charsets bound to `?1` to `?4` in masks.
    pub custom_charsets: [Option<String>; 4],
    /// Puts the mask before the word in the hybrid attack.
    pub hybrid_prepend: bool,
    /// Joins the words of the combinator attack.
    pub separator: String,
    pub markov_order: usize,
    /// A trained markov model. Without it, the model is trained on the wordlist.
    pub markov_model: Option<PathBuf>,
    /// The maximum number of markov candidates.
    pub markov_cap: u64,
    pub markov_training_limit: usize,
    pub markov_seed: Option<u64>,
    /// Includes the shifted layout in keyboard walks.
    pub keyboard_shifted: bool,
    /// Where session checkpoints are stored, the temporary directory by default.
    pub session_dir: Option<PathBuf>,
    pub output_format: OutputFormat,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            hash_file: PathBuf::new(),
            input_format: InputFormat::Plain,
            wordlist: None,
            wordlist2: None,
            mask: None,
            attack_mode: None,
            threads: 1,
            hash_type: HashTypeSelection::Auto,
            rules: Vec::new(),
            potfile: true,
            potfile_path: None,
            resume: false,
            skip: 0,
            limit: None,
            min_length: None,
            max_length: None,
            charset: DEFAULT_CHARSET.to_owned(),
            custom_charsets: Default::default(),
            hybrid_prepend: false,
            separator: String::new(),
            markov_order: DEFAULT_MARKOV_ORDER,
            markov_model: None,
            markov_cap: DEFAULT_MARKOV_CAP,
            markov_training_limit: DEFAULT_MARKOV_TRAINING_LIMIT,
            markov_seed: None,
            keyboard_shifted: true,
            session_dir: None,
            output_format: OutputFormat::Text,
        }
    }
}

impl AttackConfig {
    pub fn builder() -> AttackConfigBuilder {
        AttackConfigBuilder::new()
    }

    /// The attack mode: the forced one, or hybrid, combinator, mask and wordlist
    /// depending on the inputs, in that order.
    pub fn resolve_mode(&self) -> AttackMode {
        if let Some(mode) = self.attack_mode {
            return mode;
        }

        match (&self.wordlist, &self.wordlist2, &self.mask) {
            (Some(_), _, Some(_)) => AttackMode::Hybrid,
            (Some(_), Some(_), None) => AttackMode::Combinator,
            (None, _, Some(_)) => AttackMode::Mask,
            _ => AttackMode::Wordlist,
        }
    }

    /// The length window of the candidates of `mode`.
    /// The minimum is at least 1 and the maximum at least the minimum.
    pub fn length_window(&self, mode: AttackMode) -> (usize, usize) {
        let (default_min, default_max) = match mode {
            AttackMode::Markov => DEFAULT_MARKOV_LENGTH,
            AttackMode::KeyboardWalk => DEFAULT_WALK_LENGTH,
            _ => (DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH),
        };

        let min = self.min_length.unwrap_or(default_min).max(1);
        let max = self.max_length.unwrap_or(default_max).max(min);

        (min, max)
    }

    /// The incremental charset, with preset names expanded.
    pub fn resolved_charset(&self) -> String {
        IncrementalGenerator::preset(&self.charset).unwrap_or_else(|| self.charset.clone())
    }
}

/// A builder for an attack configuration.
#[derive(Clone, Debug, Default)]
pub struct AttackConfigBuilder {
    config: AttackConfig,
}

impl AttackConfigBuilder {
    /// Creates a new AttackConfigBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, such as one loaded from a file.
    pub fn from_config(config: AttackConfig) -> Self {
        Self { config }
    }

    pub fn hash_file(mut self, hash_file: impl Into<PathBuf>) -> Self {
        self.config.hash_file = hash_file.into();

        self
    }

    pub fn wordlist(mut self, wordlist: impl Into<PathBuf>) -> Self {
        self.config.wordlist = Some(wordlist.into());

        self
    }

    /// Sets the second wordlist of the combinator attack.
    pub fn wordlist2(mut self, wordlist2: impl Into<PathBuf>) -> Self {
        self.config.wordlist2 = Some(wordlist2.into());

        self
    }

    pub fn mask(mut self, mask: &str) -> Self {
        self.config.mask = Some(mask.to_owned());

        self
    }

    /// Forces the attack mode.
    pub fn attack_mode(mut self, attack_mode: AttackMode) -> Self {
        self.config.attack_mode = Some(attack_mode);

        self
    }

    /// Sets the number of workers. It is clamped to `[1, MAX_THREADS]` when building.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;

        self
    }

    pub fn hash_type(mut self, hash_type: HashTypeSelection) -> Self {
        self.config.hash_type = hash_type;

        self
    }

    pub fn rules<S: AsRef<str>>(mut self, rules: &[S]) -> Self {
        self.config.rules = rules.iter().map(|rule| rule.as_ref().to_owned()).collect();

        self
    }

    /// Enables or disables the potfile.
    pub fn potfile(mut self, enabled: bool) -> Self {
        self.config.potfile = enabled;

        self
    }

    pub fn potfile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.potfile_path = Some(path.into());

        self
    }

    /// Resumes from the session checkpoint, if any.
    pub fn resume(mut self, resume: bool) -> Self {
        self.config.resume = resume;

        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.config.skip = skip;

        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.config.limit = Some(limit);

        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.config.min_length = Some(min_length);

        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.config.max_length = Some(max_length);

        self
    }

    /// Sets the incremental charset, either literally or by preset name.
    pub fn charset(mut self, charset: &str) -> Self {
        self.config.charset = charset.to_owned();

        self
    }

    /// Binds `charset` to the mask placeholder `?{slot}`, for a slot between 1 and 4.
    /// Other slots are ignored.
    pub fn custom_charset(mut self, slot: usize, charset: &str) -> Self {
        if let Some(custom) = slot
            .checked_sub(1)
            .and_then(|i| self.config.custom_charsets.get_mut(i))
        {
            *custom = Some(charset.to_owned());
        }

        self
    }

    pub fn hybrid_prepend(mut self, prepend: bool) -> Self {
        self.config.hybrid_prepend = prepend;

        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.config.separator = separator.to_owned();

        self
    }

    pub fn markov_order(mut self, order: usize) -> Self {
        self.config.markov_order = order;

        self
    }

    pub fn markov_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.markov_model = Some(path.into());

        self
    }

    pub fn markov_cap(mut self, cap: u64) -> Self {
        self.config.markov_cap = cap;

        self
    }

    pub fn markov_training_limit(mut self, limit: usize) -> Self {
        self.config.markov_training_limit = limit;

        self
    }

    pub fn markov_seed(mut self, seed: u64) -> Self {
        self.config.markov_seed = Some(seed);

        self
    }

    pub fn keyboard_shifted(mut self, shifted: bool) -> Self {
        self.config.keyboard_shifted = shifted;

        self
    }

    pub fn session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.session_dir = Some(dir.into());

        self
    }

    pub fn input_format(mut self, format: InputFormat) -> Self {
        self.config.input_format = format;

        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;

        self
    }

    /// Builds the configuration.
    pub fn build(mut self) -> AttackConfig {
        self.config.threads = self.config.threads.clamp(1, MAX_THREADS);
        self.config.markov_order = self.config.markov_order.max(1);

        self.config
    }
}
