use std::collections::BTreeSet;

use super::CandidateGenerator;
use crate::DEFAULT_WALK_LENGTH;

const QWERTY: [&str; 4] = ["`1234567890-=", "qwertyuiop[]\\", "asdfghjkl;'", "zxcvbnm,./"];

const QWERTY_SHIFTED: [&str; 4] = ["~!@#$%^&*()_+", "QWERTYUIOP{}|", "ASDFGHJKL:\"", "ZXCVBNM<>?"];

const COMMON_PATTERNS: &[&str] = &[
    "qwerty", "qwert", "qwer", "asdf", "asdfgh", "zxcv", "zxcvbn", "qwertyuiop", "asdfghjkl",
    "zxcvbnm", "123456", "1234567890", "123456789", "12345678", "1234567", "12345", "0987654321",
    "987654321", "87654321", "7654321", "654321", "54321", "1qaz", "2wsx", "3edc", "4rfv", "5tgb",
    "6yhn", "7ujm", "8ik,", "9ol.", "0p;/", "1qaz2wsx", "2wsx3edc", "1qaz2wsx3edc",
    "1qaz2wsx3edc4rfv", "qazwsx", "qazwsxedc", "qazwsxedcrfv", "zaq1", "xsw2", "cde3", "vfr4",
    "bgt5", "nhy6", "mju7", ",ki8", ".lo9", "/;p0", "zaq12wsx", "zaq1xsw2", "qw12", "qwer1234",
    "asdf1234", "zxcv1234", "1q2w3e4r", "1q2w3e4r5t", "1q2w3e4r5t6y", "q1w2e3r4", "a1s2d3f4",
    "`1qa", "p0-=", "[];'", "zaq!", "qwerty123", "zxcvbnm123", "123qwe", "123asd", "123zxc",
    "qwe123", "asd123", "zxc123", "qwerqwer", "asdfasdf", "12341234", "123123",
];

const NUMPAD_PATTERNS: &[&str] = &[
    "789", "456", "123", "147", "258", "369", "7894561230", "1234567890", "0987654321", "741",
    "852", "963", "147852", "258369", "147258369", "159", "753", "951", "357", "1379", "7913",
    "2468", "8642", "123456", "654321", "789456123", "321654987", "78945612", "12345678",
    "14789632", "32147896",
];

/// Enumerates keyboard walks such as `qwerty`, `1qaz2wsx` or `zaq1xsw2`, sorted and deduplicated.
#[derive(Clone, Debug)]
pub struct KeyboardWalkGenerator {
    patterns: Vec<String>,
    index: usize,
}

impl Default for KeyboardWalkGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_WALK_LENGTH.0, DEFAULT_WALK_LENGTH.1, true)
    }
}

impl KeyboardWalkGenerator {
    /// Creates a new keyboard walk generator keeping the walks of `[min_length, max_length]` characters.
    /// The shifted layout is walked when `include_shifted` is true.
    pub fn new(min_length: usize, max_length: usize, include_shifted: bool) -> Self {
        let mut walks = BTreeSet::new();

        let rows: Vec<Vec<char>> = QWERTY.iter().map(|row| row.chars().collect()).collect();
        let shifted_rows: Vec<Vec<char>> =
            QWERTY_SHIFTED.iter().map(|row| row.chars().collect()).collect();

        for row in rows
            .iter()
            .chain(shifted_rows.iter().filter(|_| include_shifted))
        {
            add_row_walks(&mut walks, row, min_length, max_length);
        }

        add_column_walks(&mut walks, &rows, min_length);
        add_diagonal_walks(&mut walks, &rows, min_length);

        for pattern in COMMON_PATTERNS {
            walks.insert(pattern.to_string());
            walks.insert(pattern.to_uppercase());
            walks.insert(capitalize(pattern));
        }

        walks.extend(NUMPAD_PATTERNS.iter().map(|pattern| pattern.to_string()));

        let patterns = walks
            .into_iter()
            .filter(|walk| (min_length..=max_length).contains(&walk.chars().count()))
            .collect();

        Self { patterns, index: 0 }
    }

    /// All the walks, in enumeration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn capitalize(pattern: &str) -> String {
    let mut chars = pattern.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Inserts `walk` and its reverse.
fn insert_both_ways(walks: &mut BTreeSet<String>, walk: &[char]) {
    walks.insert(walk.iter().collect());
    walks.insert(walk.iter().rev().collect());
}

/// Every substring of a row, forward and reversed.
fn add_row_walks(walks: &mut BTreeSet<String>, row: &[char], min_length: usize, max_length: usize) {
    for start in 0..row.len() {
        let longest = max_length.min(row.len() - start);

        for length in min_length.max(1)..=longest {
            let walk = &row[start..start + length];
            walks.insert(walk.iter().collect());
        }
    }

    let reversed: Vec<char> = row.iter().rev().copied().collect();
    for start in 0..reversed.len() {
        let longest = max_length.min(reversed.len() - start);

        for length in min_length.max(1)..=longest {
            walks.insert(reversed[start..start + length].iter().collect());
        }
    }
}

/// Every column, top to bottom and bottom to top.
fn add_column_walks(walks: &mut BTreeSet<String>, rows: &[Vec<char>], min_length: usize) {
    let columns = rows.iter().map(Vec::len).max().unwrap_or_default();

    for col in 0..columns {
        let column: Vec<char> = rows.iter().filter_map(|row| row.get(col).copied()).collect();

        if column.len() >= min_length {
            insert_both_ways(walks, &column);
        }
    }
}

/// Every diagonal going down-right and down-left, both ways.
fn add_diagonal_walks(walks: &mut BTreeSet<String>, rows: &[Vec<char>], min_length: usize) {
    for start_row in 0..rows.len() {
        for start_col in 0..rows[start_row].len() {
            let down_right: Vec<char> = rows[start_row..]
                .iter()
                .enumerate()
                .map_while(|(i, row)| row.get(start_col + i).copied())
                .collect();

            if down_right.len() >= min_length {
                insert_both_ways(walks, &down_right);
            }

            let down_left: Vec<char> = rows[start_row..]
                .iter()
                .enumerate()
                .map_while(|(i, row)| {
                    start_col
                        .checked_sub(i)
                        .and_then(|col| row.get(col).copied())
                })
                .collect();

            if down_left.len() >= min_length {
                insert_both_ways(walks, &down_left);
            }
        }
    }
}

impl Iterator for KeyboardWalkGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let walk = self.patterns.get(self.index)?.clone();
        self.index += 1;

        Some(walk)
    }
}

impl CandidateGenerator for KeyboardWalkGenerator {
    fn total_count(&self) -> Option<u64> {
        Some(self.patterns.len() as u64)
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn seek(&mut self, index: u64) {
        self.index = usize::try_from(index).unwrap_or(usize::MAX);
    }
}
