use super::{
    advance, decode,
    mask::{ALL, DIGITS, LOWER, SPECIAL, UPPER},
    CandidateGenerator,
};

/// Enumerates every string over a charset, shortest first.
#[derive(Clone, Debug)]
pub struct IncrementalGenerator {
    charset: Vec<char>,
    min_length: usize,
    max_length: usize,
    length: usize,
    radices: Vec<usize>,
    digits: Vec<usize>,
    exhausted: bool,
}

impl IncrementalGenerator {
    /// Creates a new incremental generator.
    /// `min_length` is at least 1 and `max_length` at least `min_length`.
    pub fn new(charset: &str, min_length: usize, max_length: usize) -> Self {
        let min_length = min_length.max(1);
        let max_length = max_length.max(min_length);
        let charset: Vec<char> = charset.chars().collect();

        let mut generator = Self {
            exhausted: charset.is_empty(),
            charset,
            min_length,
            max_length,
            length: min_length,
            radices: Vec::new(),
            digits: Vec::new(),
        };
        generator.start_length(min_length);

        generator
    }

    /// Returns the charset of a preset name
    /// (`lower`, `upper`, `alpha`, `digits`, `alnum`, `special` or `all`).
    pub fn preset(name: &str) -> Option<String> {
        let charset = match name {
            "lower" => LOWER.to_owned(),
            "upper" => UPPER.to_owned(),
            "alpha" => format!("{LOWER}{UPPER}"),
            "digits" => DIGITS.to_owned(),
            "alnum" => format!("{LOWER}{UPPER}{DIGITS}"),
            "special" => SPECIAL.to_owned(),
            "all" => ALL.to_owned(),
            _ => return None,
        };

        Some(charset)
    }

    /// The names of the charset presets.
    pub fn presets() -> &'static [&'static str] {
        &["lower", "upper", "alpha", "digits", "alnum", "special", "all"]
    }

    /// The number of candidates of exactly `length` characters.
    pub fn combinations_for_length(&self, length: usize) -> Option<u64> {
        let length = u32::try_from(length).ok()?;
        (self.charset.len() as u64).checked_pow(length)
    }

    /// Jumps to the first candidate of `length` characters.
    /// Lengths outside of the configured window are ignored.
    pub fn skip_to_length(&mut self, length: usize) {
        if length < self.min_length || length > self.max_length || self.charset.is_empty() {
            return;
        }

        self.start_length(length);
        self.exhausted = false;
    }

    fn start_length(&mut self, length: usize) {
        self.length = length;
        self.radices = vec![self.charset.len(); length];
        self.digits = vec![0; length];
    }
}

impl Iterator for IncrementalGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let candidate = self.digits.iter().map(|&digit| self.charset[digit]).collect();

        if !advance(&mut self.digits, &self.radices) {
            if self.length == self.max_length {
                self.exhausted = true;
            } else {
                self.start_length(self.length + 1);
            }
        }

        Some(candidate)
    }
}

impl CandidateGenerator for IncrementalGenerator {
    fn total_count(&self) -> Option<u64> {
        (self.min_length..=self.max_length).try_fold(0u64, |acc, length| {
            acc.checked_add(self.combinations_for_length(length)?)
        })
    }

    fn reset(&mut self) {
        self.start_length(self.min_length);
        self.exhausted = self.charset.is_empty();
    }

    fn depth(&self) -> Option<usize> {
        Some(self.length)
    }

    fn seek(&mut self, mut index: u64) {
        self.reset();
        if self.exhausted {
            return;
        }

        for length in self.min_length..=self.max_length {
            match self.combinations_for_length(length) {
                Some(combinations) if index >= combinations => index -= combinations,
                // the index is within this length, possibly one too large to be counted
                _ => {
                    self.start_length(length);
                    self.exhausted = !decode(index, &mut self.digits, &self.radices);
                    return;
                }
            }
        }

        self.exhausted = true;
    }
}
