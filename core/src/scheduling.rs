use std::ops::Range;

/// How the work of an attack is divided between the workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partitioning {
    /// Each worker exhausts the whole candidate space for its own share of the hashes.
    ByHash,
    /// Each worker tries every hash, but only over its own share of the candidate space.
    BySpace,
}

impl Partitioning {
    /// Splits by hash when there are enough hashes to keep every worker busy.
    pub fn choose(hashes: usize, workers: usize) -> Self {
        if hashes >= workers {
            Partitioning::ByHash
        } else {
            Partitioning::BySpace
        }
    }
}

/// An iterator over `parts` contiguous ranges covering `0..len`,
/// whose sizes differ by at most one.
#[derive(Clone, Debug)]
pub struct SplitIterator {
    range_start: u64,
    part_size: u64,
    remainder: u64,
    part_number: u64,
    parts: u64,
}

impl SplitIterator {
    /// Creates a new split iterator. There is always at least one part.
    pub fn new(len: u64, parts: usize) -> SplitIterator {
        let parts = parts.max(1) as u64;

        SplitIterator {
            range_start: 0,
            part_size: len / parts,
            remainder: len % parts,
            part_number: 0,
            parts,
        }
    }

    /// Creates a split iterator over `range` instead of `0..len`.
    pub fn over(range: Range<u64>, parts: usize) -> impl ExactSizeIterator<Item = Range<u64>> {
        let offset = range.start;

        SplitIterator::new(range.end.saturating_sub(range.start), parts)
            .map(move |part| part.start + offset..part.end + offset)
    }
}

impl Iterator for SplitIterator {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.part_number == self.parts {
            return None;
        }

        // the first parts absorb the remainder
        let part_size = if self.part_number < self.remainder {
            self.part_size + 1
        } else {
            self.part_size
        };

        let range_end = self.range_start + part_size;
        let range = self.range_start..range_end;
        self.range_start = range_end;

        self.part_number += 1;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.parts - self.part_number) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SplitIterator {}

/// Splits `items` in `parts` contiguous chunks whose sizes differ by at most one.
pub fn split_slice<T>(items: &[T], parts: usize) -> Vec<&[T]> {
    SplitIterator::new(items.len() as u64, parts)
        .map(|range| &items[range.start as usize..range.end as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_split_iterator_single_part() {
        let split_iterator = SplitIterator::new(201, 1);
        assert_eq!(1, split_iterator.len());
        assert_eq!(vec![0..201], split_iterator.collect_vec());
    }

    #[test]
    fn test_split_iterator_perfect_split() {
        let split_iterator = SplitIterator::new(300, 3);
        assert_eq!(3, split_iterator.len());

        for range in split_iterator {
            // no remainder, this should perfectly match
            assert_eq!(100, range.end - range.start);
        }
    }

    #[test]
    fn test_split_iterator_remainder() {
        let len = 1003;
        let ranges = SplitIterator::new(len, 4).collect_vec();

        assert_eq!(4, ranges.len());

        // the first parts should have one element more
        assert_eq!(
            vec![251, 251, 251, 250],
            ranges.iter().map(|range| range.end - range.start).collect_vec()
        );

        // no gap, no overlap
        assert_eq!(0, ranges.first().unwrap().start);
        assert_eq!(len, ranges.last().unwrap().end);
        assert!(ranges.windows(2).all(|pair| pair[0].end == pair[1].start));
    }

    #[test]
    fn test_split_iterator_more_parts_than_elements() {
        let ranges = SplitIterator::new(2, 4).collect_vec();
        assert_eq!(vec![0..1, 1..2, 2..2, 2..2], ranges);
    }

    #[test]
    fn test_split_iterator_zero_parts() {
        assert_eq!(vec![0..5], SplitIterator::new(5, 0).collect_vec());
    }

    #[test]
    fn test_split_over_range() {
        let ranges = SplitIterator::over(10..17, 3).collect_vec();
        assert_eq!(vec![10..13, 13..15, 15..17], ranges);
    }

    #[test]
    fn test_split_slice() {
        let hashes = (0..11).collect_vec();

        for workers in 1..=16 {
            let chunks = split_slice(&hashes, workers);
            assert_eq!(workers, chunks.len());

            let sizes = chunks.iter().map(|chunk| chunk.len()).collect_vec();
            assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
            assert_eq!(hashes, chunks.concat());
        }
    }

    #[test]
    fn test_partitioning_choice() {
        assert_eq!(Partitioning::ByHash, Partitioning::choose(8, 4));
        assert_eq!(Partitioning::ByHash, Partitioning::choose(4, 4));
        assert_eq!(Partitioning::BySpace, Partitioning::choose(1, 4));
    }
}
