use std::{path::Path, sync::Arc};

use super::{wordlist::read_words, CandidateGenerator};
use crate::error::BrutyfResult;

/// Joins every word of a first list with every word of a second list.
#[derive(Clone, Debug)]
pub struct CombinatorGenerator {
    left: Arc<Vec<String>>,
    right: Arc<Vec<String>>,
    separator: String,
    left_index: usize,
    right_index: usize,
}

impl CombinatorGenerator {
    /// Creates a new combinator generator.
    pub fn new(left: Arc<Vec<String>>, right: Arc<Vec<String>>, separator: &str) -> Self {
        Self {
            left,
            right,
            separator: separator.to_owned(),
            left_index: 0,
            right_index: 0,
        }
    }

    /// Loads both wordlists in memory.
    pub fn from_files(left: &Path, right: &Path, separator: &str) -> BrutyfResult<Self> {
        Ok(Self::new(
            Arc::new(read_words(left)?),
            Arc::new(read_words(right)?),
            separator,
        ))
    }
}

impl Iterator for CombinatorGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let left = self.left.get(self.left_index)?;
        let right = self.right.get(self.right_index)?;
        let candidate = format!("{left}{}{right}", self.separator);

        self.right_index += 1;
        if self.right_index == self.right.len() {
            self.right_index = 0;
            self.left_index += 1;
        }

        Some(candidate)
    }
}

impl CandidateGenerator for CombinatorGenerator {
    fn total_count(&self) -> Option<u64> {
        (self.left.len() as u64).checked_mul(self.right.len() as u64)
    }

    fn reset(&mut self) {
        self.left_index = 0;
        self.right_index = 0;
    }

    fn seek(&mut self, index: u64) {
        self.reset();

        if self.right.is_empty() {
            return;
        }

        let right_len = self.right.len() as u64;
        self.left_index = usize::try_from(index / right_len).unwrap_or(usize::MAX);
        self.right_index = (index % right_len) as usize;
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn words(words: &[&str]) -> Arc<Vec<String>> {
        Arc::new(words.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn test_combinator_order() {
        let generator = CombinatorGenerator::new(words(&["x", "y"]), words(&["1", "2"]), "");

        assert_eq!(Some(4), generator.total_count());
        assert_eq!(vec!["x1", "x2", "y1", "y2"], generator.collect_vec());
    }

    #[test]
    fn test_combinator_separator() {
        let generator = CombinatorGenerator::new(words(&["big"]), words(&["cat", "dog"]), "-");
        assert_eq!(vec!["big-cat", "big-dog"], generator.collect_vec());
    }

    #[test]
    fn test_combinator_empty_side() {
        let mut generator = CombinatorGenerator::new(words(&["a"]), words(&[]), "");
        assert_eq!(Some(0), generator.total_count());
        assert_eq!(None, generator.next());
    }

    #[test]
    fn test_combinator_restart_and_seek() {
        let mut generator =
            CombinatorGenerator::new(words(&["a", "b", "c"]), words(&["1", "2"]), "");
        assert_eq!(6, generator.by_ref().count());

        generator.reset();
        assert_eq!(Some("a1".to_owned()), generator.next());

        generator.seek(3);
        assert_eq!(
            vec!["b2", "c1", "c2"],
            generator.by_ref().collect_vec()
        );

        generator.seek(6);
        assert_eq!(None, generator.next());
    }
}
