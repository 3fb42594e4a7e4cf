use super::{advance, cardinality, decode, CandidateGenerator};

pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SPECIAL: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
pub const ALL: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// One position of a mask.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Slot {
    Literal(char),
    Charset(Vec<char>),
}

/// Enumerates every string matching a mask such as `?u?l?l?d`.
///
/// Placeholders are `?l`, `?u`, `?d`, `?s`, `?a` and the custom charsets `?1` to `?4`.
/// Any other character, including an unknown placeholder `?x`, is the literal `x`.
#[derive(Clone, Debug)]
pub struct MaskGenerator {
    slots: Vec<Slot>,
    radices: Vec<usize>,
    digits: Vec<usize>,
    total: Option<u64>,
    exhausted: bool,
}

impl MaskGenerator {
    /// Creates a new mask generator.
    pub fn new(mask: &str) -> Self {
        Self::with_custom_charsets(mask, &[])
    }

    /// Creates a new mask generator where `custom_charsets[i]` is bound to `?{i + 1}`.
    pub fn with_custom_charsets(mask: &str, custom_charsets: &[Option<String>]) -> Self {
        let mut slots = Vec::new();
        let mut chars = mask.chars();

        while let Some(c) = chars.next() {
            if c != '?' {
                slots.push(Slot::Literal(c));
                continue;
            }

            let Some(key) = chars.next() else {
                // trailing '?'
                slots.push(Slot::Literal('?'));
                break;
            };

            let charset = match key {
                'l' => Some(LOWER),
                'u' => Some(UPPER),
                'd' => Some(DIGITS),
                's' => Some(SPECIAL),
                'a' => Some(ALL),
                '1'..='4' => {
                    let slot = key as usize - '1' as usize;
                    custom_charsets
                        .get(slot)
                        .and_then(Option::as_deref)
                }
                _ => None,
            };

            match charset {
                Some(charset) => slots.push(Slot::Charset(charset.chars().collect())),
                None => slots.push(Slot::Literal(key)),
            }
        }

        let radices: Vec<usize> = slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Charset(chars) => Some(chars.len()),
                Slot::Literal(_) => None,
            })
            .collect();

        let total = cardinality(&radices);

        Self {
            digits: vec![0; radices.len()],
            exhausted: total == Some(0),
            slots,
            radices,
            total,
        }
    }

    /// The number of placeholders in the mask.
    pub fn placeholders(&self) -> usize {
        self.radices.len()
    }

    fn current(&self) -> String {
        let mut digits = self.digits.iter();

        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Literal(c) => *c,
                Slot::Charset(chars) => digits.next().map_or('?', |&digit| chars[digit]),
            })
            .collect()
    }
}

impl Iterator for MaskGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let candidate = self.current();
        self.exhausted = !advance(&mut self.digits, &self.radices);

        Some(candidate)
    }
}

impl CandidateGenerator for MaskGenerator {
    fn total_count(&self) -> Option<u64> {
        self.total
    }

    fn reset(&mut self) {
        self.digits.fill(0);
        self.exhausted = self.total == Some(0);
    }

    fn depth(&self) -> Option<usize> {
        Some(self.slots.len())
    }

    fn seek(&mut self, index: u64) {
        self.reset();

        if !self.exhausted {
            self.exhausted = !decode(index, &mut self.digits, &self.radices);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_mask_order() {
        let generator = MaskGenerator::with_custom_charsets("?1-?1", &[Some("ab".to_owned())]);

        assert_eq!(vec!["a-a", "a-b", "b-a", "b-b"], generator.collect_vec());
    }

    #[test]
    fn test_mask_total_matches_enumeration() {
        let mut generator = MaskGenerator::new("x?d?d");
        assert_eq!(Some(100), generator.total_count());

        let candidates = generator.by_ref().collect_vec();
        assert_eq!(100, candidates.len());
        assert_eq!(100, candidates.iter().collect::<HashSet<_>>().len());
        assert_eq!("x00", candidates[0]);
        assert_eq!("x01", candidates[1]);
        assert_eq!("x99", candidates[99]);
    }

    #[test]
    fn test_mask_literals_only() {
        let generator = MaskGenerator::new("abc");
        assert_eq!(Some(1), generator.total_count());
        assert_eq!(vec!["abc"], generator.collect_vec());
    }

    #[test]
    fn test_mask_unknown_placeholder_is_literal() {
        let generator = MaskGenerator::new("?x?1?");
        assert_eq!(0, generator.placeholders());
        assert_eq!(vec!["x1?"], generator.collect_vec());
    }

    #[test]
    fn test_mask_builtin_charsets() {
        assert_eq!(Some(26), MaskGenerator::new("?l").total_count());
        assert_eq!(Some(26), MaskGenerator::new("?u").total_count());
        assert_eq!(Some(26), MaskGenerator::new("?s").total_count());
        assert_eq!(Some(88 * 10), MaskGenerator::new("?a?d").total_count());
    }

    #[test]
    fn test_mask_empty_custom_charset() {
        let mut generator = MaskGenerator::with_custom_charsets("?1", &[Some(String::new())]);
        assert_eq!(Some(0), generator.total_count());
        assert_eq!(None, generator.next());
    }

    #[test]
    fn test_mask_reset() {
        let mut generator = MaskGenerator::new("?d");
        assert_eq!(10, generator.by_ref().count());

        generator.reset();
        assert_eq!(Some("0".to_owned()), generator.next());
    }

    #[test]
    fn test_mask_seek() {
        let mut generator = MaskGenerator::new("?l?d");

        generator.seek(27);
        assert_eq!(Some("c7".to_owned()), generator.next());

        generator.seek(259);
        assert_eq!(Some("z9".to_owned()), generator.next());
        assert_eq!(None, generator.next());

        generator.seek(260);
        assert_eq!(None, generator.next());
    }
}
