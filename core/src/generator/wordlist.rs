use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tracing::warn;

use super::CandidateGenerator;
use crate::error::{BrutyfError, BrutyfResult};

const READER_CAPACITY: usize = 1024 * 1024;

/// A buffered reader over a wordlist.
pub type WordlistReader = Box<dyn BufRead + Send>;

/// Opens a wordlist, transparently decompressing `.gz` and `.bz2` files.
pub fn open_wordlist(path: &Path) -> BrutyfResult<WordlistReader> {
    let file = File::open(path).map_err(|e| BrutyfError::open(path, e))?;

    let reader: WordlistReader = match path.extension().and_then(|ext| ext.to_str()) {
        Some("gz") => Box::new(BufReader::with_capacity(
            READER_CAPACITY,
            GzDecoder::new(file),
        )),
        Some("bz2") => Box::new(BufReader::with_capacity(
            READER_CAPACITY,
            BzDecoder::new(file),
        )),
        _ => Box::new(BufReader::with_capacity(READER_CAPACITY, file)),
    };

    Ok(reader)
}

/// Reads the next line of `reader` into `buf`, without its line terminator.
/// Returns false at the end of the stream.
fn read_line(reader: &mut WordlistReader, buf: &mut Vec<u8>) -> std::io::Result<bool> {
    buf.clear();
    Ok(reader.read_until(b'\n', buf)? != 0)
}

fn decode_word(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).trim().to_owned()
}

/// Counts the lines of a wordlist.
pub fn count_lines(path: &Path) -> BrutyfResult<u64> {
    let mut reader = open_wordlist(path)?;
    let mut buf = Vec::new();
    let mut count = 0;

    while read_line(&mut reader, &mut buf)? {
        count += 1;
    }

    Ok(count)
}

/// Reads a whole wordlist in memory, one trimmed word per line.
pub fn read_words(path: &Path) -> BrutyfResult<Vec<String>> {
    let mut reader = open_wordlist(path)?;
    let mut buf = Vec::new();
    let mut words = Vec::new();

    while read_line(&mut reader, &mut buf)? {
        words.push(decode_word(&buf));
    }

    Ok(words)
}

/// Streams the lines of a wordlist file.
/// Candidate `i` is always line `i`, blank lines included.
pub struct WordlistGenerator {
    path: PathBuf,
    reader: Option<WordlistReader>,
    total: u64,
    buf: Vec<u8>,
}

impl WordlistGenerator {
    /// Opens a wordlist and counts its lines.
    pub fn new(path: impl Into<PathBuf>) -> BrutyfResult<Self> {
        let path = path.into();
        let total = count_lines(&path)?;

        Self::with_count(path, total)
    }

    /// Opens a wordlist whose lines were already counted.
    pub fn with_count(path: impl Into<PathBuf>, total: u64) -> BrutyfResult<Self> {
        let path = path.into();
        let reader = open_wordlist(&path)?;

        Ok(Self {
            path,
            reader: Some(reader),
            total,
            buf: Vec::new(),
        })
    }

    /// The path of the wordlist.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the next line into the internal buffer, closing the stream at its end.
    fn fill_buf(&mut self) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };

        match read_line(reader, &mut self.buf) {
            Ok(true) => true,
            Ok(false) => {
                self.reader = None;
                false
            }
            Err(e) => {
                warn!("Stopped reading {}: {e}", self.path.display());
                self.reader = None;
                false
            }
        }
    }
}

impl Iterator for WordlistGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.fill_buf().then(|| decode_word(&self.buf))
    }
}

impl CandidateGenerator for WordlistGenerator {
    fn total_count(&self) -> Option<u64> {
        Some(self.total)
    }

    fn reset(&mut self) {
        self.reader = match open_wordlist(&self.path) {
            Ok(reader) => Some(reader),
            Err(e) => {
                warn!("{e}");
                None
            }
        };
    }

    fn seek(&mut self, index: u64) {
        self.reset();

        for _ in 0..index {
            if !self.fill_buf() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use bzip2::{write::BzEncoder, Compression as BzCompression};
    use flate2::{write::GzEncoder, Compression};
    use itertools::Itertools;

    use super::*;

    const WORDS: &str = "alpha\r\nbeta\n\n  gamma  \ndelta";

    #[test]
    fn test_wordlist_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, WORDS).unwrap();

        let generator = WordlistGenerator::new(&path).unwrap();
        assert_eq!(Some(5), generator.total_count());
        assert_eq!(
            vec!["alpha", "beta", "", "gamma", "delta"],
            generator.collect_vec()
        );
    }

    #[test]
    fn test_wordlist_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt.gz");

        let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(WORDS.as_bytes()).unwrap();
        encoder.finish().unwrap();

        assert_eq!(5, count_lines(&path).unwrap());
        assert_eq!("gamma", read_words(&path).unwrap()[3]);
    }

    #[test]
    fn test_wordlist_bz2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt.bz2");

        let mut encoder = BzEncoder::new(fs::File::create(&path).unwrap(), BzCompression::best());
        encoder.write_all(WORDS.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let generator = WordlistGenerator::new(&path).unwrap();
        assert_eq!("delta", generator.last().unwrap());
    }

    #[test]
    fn test_wordlist_reset_and_seek() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, WORDS).unwrap();

        let mut generator = WordlistGenerator::new(&path).unwrap();
        assert_eq!(5, generator.by_ref().count());
        assert_eq!(None, generator.next());

        generator.reset();
        assert_eq!(Some("alpha".to_owned()), generator.next());

        generator.seek(3);
        assert_eq!(Some("gamma".to_owned()), generator.next());

        generator.seek(10);
        assert_eq!(None, generator.next());
    }

    #[test]
    fn test_wordlist_missing() {
        let result = WordlistGenerator::new("/this/wordlist/does/not/exist");
        assert!(matches!(result, Err(BrutyfError::Open { .. })));
    }
}
