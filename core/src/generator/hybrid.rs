use std::{path::Path, sync::Arc};

use super::{mask::MaskGenerator, wordlist::read_words, CandidateGenerator};
use crate::error::BrutyfResult;

/// Appends (or prepends) every candidate of a mask to every word of a list.
/// Words are the outer loop.
#[derive(Clone, Debug)]
pub struct HybridGenerator {
    words: Arc<Vec<String>>,
    mask: MaskGenerator,
    prepend: bool,
    word_index: usize,
}

impl HybridGenerator {
    /// Creates a new hybrid generator.
    pub fn new(words: Arc<Vec<String>>, mask: MaskGenerator, prepend: bool) -> Self {
        Self {
            words,
            mask,
            prepend,
            word_index: 0,
        }
    }

    /// Loads the wordlist in memory.
    pub fn from_file(path: &Path, mask: MaskGenerator, prepend: bool) -> BrutyfResult<Self> {
        Ok(Self::new(Arc::new(read_words(path)?), mask, prepend))
    }
}

impl Iterator for HybridGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let word = self.words.get(self.word_index)?;

            match self.mask.next() {
                Some(part) if self.prepend => return Some(format!("{part}{word}")),
                Some(part) => return Some(format!("{word}{part}")),
                None => {
                    self.word_index += 1;
                    self.mask.reset();

                    if self.mask.total_count() == Some(0) {
                        self.word_index = self.words.len();
                    }
                }
            }
        }
    }
}

impl CandidateGenerator for HybridGenerator {
    fn total_count(&self) -> Option<u64> {
        (self.words.len() as u64).checked_mul(self.mask.total_count()?)
    }

    fn reset(&mut self) {
        self.word_index = 0;
        self.mask.reset();
    }

    fn depth(&self) -> Option<usize> {
        Some(self.word_index)
    }

    fn seek(&mut self, index: u64) {
        match self.mask.total_count() {
            Some(0) => self.word_index = self.words.len(),
            Some(mask_total) => {
                self.word_index = usize::try_from(index / mask_total).unwrap_or(usize::MAX);
                self.mask.seek(index % mask_total);
            }
            // a mask this large never wraps to the next word
            None => {
                self.word_index = 0;
                self.mask.seek(index);
            }
        }
    }
}
