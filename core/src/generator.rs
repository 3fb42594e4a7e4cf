//! Candidate generators, one per attack strategy.

pub mod combinator;
pub mod hybrid;
pub mod incremental;
pub mod keyboard;
pub mod markov;
pub mod mask;
pub mod wordlist;

pub use {
    combinator::CombinatorGenerator,
    hybrid::HybridGenerator,
    incremental::IncrementalGenerator,
    keyboard::KeyboardWalkGenerator,
    markov::{MarkovGenerator, MarkovModel},
    mask::MaskGenerator,
    wordlist::WordlistGenerator,
};

/// A lazy and restartable stream of password candidates.
pub trait CandidateGenerator: Iterator<Item = String> + Send {
    /// The exact number of candidates, when it can be computed ahead of time.
    fn total_count(&self) -> Option<u64>;

    /// Goes back to the first candidate.
    fn reset(&mut self);

    /// The current enumeration depth, such as the current brute-force length.
    fn depth(&self) -> Option<usize> {
        None
    }

    /// Positions the generator so that the next candidate is the one at `index`.
    /// Seeking past the end exhausts the generator.
    fn seek(&mut self, index: u64) {
        self.reset();

        for _ in 0..index {
            if self.next().is_none() {
                break;
            }
        }
    }
}

/// Increments a mixed-radix counter, the rightmost digit being the fastest.
/// Returns false when the counter wraps around, in which case every digit is back to 0.
pub fn advance(digits: &mut [usize], radices: &[usize]) -> bool {
    for (digit, &radix) in digits.iter_mut().zip(radices).rev() {
        *digit += 1;

        if *digit < radix {
            return true;
        }

        *digit = 0;
    }

    false
}

/// Writes the digits of `index` in the mixed-radix base `radices`.
/// Returns false if `index` cannot be represented with that many digits.
pub fn decode(mut index: u64, digits: &mut [usize], radices: &[usize]) -> bool {
    for (digit, &radix) in digits.iter_mut().zip(radices).rev() {
        if radix == 0 {
            return false;
        }

        let radix = radix as u64;
        *digit = (index % radix) as usize;
        index /= radix;
    }

    index == 0
}

/// The number of values of a mixed-radix counter, or `None` if it overflows.
pub fn cardinality(radices: &[usize]) -> Option<u64> {
    radices
        .iter()
        .try_fold(1u64, |acc, &radix| acc.checked_mul(radix as u64))
}
