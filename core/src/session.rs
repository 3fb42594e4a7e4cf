//! Checkpoints allowing a single-threaded attack to be resumed.

use std::{
    collections::BTreeMap,
    env,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use digest::Digest;
use md5::Md5;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BrutyfError, BrutyfResult};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionData {
    /// The number of candidates already tried, per hash entry.
    #[serde(default)]
    progress: BTreeMap<String, u64>,
    /// The passwords already found, per hash entry.
    #[serde(default)]
    found: BTreeMap<String, String>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.progress.is_empty() && self.found.is_empty()
    }
}

/// The checkpoint of an attack against a hash file with a given wordlist or strategy.
/// Repeated attacks with the same inputs share the same checkpoint.
#[derive(Clone, Debug)]
pub struct Session {
    path: PathBuf,
    data: SessionData,
}

impl Session {
    /// Opens the session of `hash_file` and `key` in the temporary directory.
    /// `key` is usually the wordlist path.
    pub fn open(hash_file: &str, key: &str) -> BrutyfResult<Self> {
        Self::open_in(&env::temp_dir(), hash_file, key)
    }

    /// Opens the session of `hash_file` and `key` in `dir`.
    pub fn open_in(dir: &Path, hash_file: &str, key: &str) -> BrutyfResult<Self> {
        let mut hasher = Md5::new();
        hasher.update(hash_file);
        hasher.update([0]);
        hasher.update(key);
        let digest = hex::encode(hasher.finalize());

        let path = dir.join(format!("brutyf_session_{digest}.json"));
        let data = Self::load(&path)?;

        Ok(Self { path, data })
    }

    fn load(path: &Path) -> BrutyfResult<SessionData> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SessionData::default()),
            Err(e) => return Err(BrutyfError::open(path, e)),
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!("Ignoring the corrupted session {}: {e}", path.display());
                Ok(SessionData::default())
            }
        }
    }

    /// Writes the checkpoint to disk.
    pub fn save(&self) -> BrutyfResult<()> {
        let file = File::create(&self.path).map_err(|e| BrutyfError::open(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.data)?;
        writer.flush()?;

        Ok(())
    }

    /// The number of candidates already tried for `entry`.
    pub fn get_progress(&self, entry: &str) -> u64 {
        self.data.progress.get(entry).copied().unwrap_or_default()
    }

    pub fn set_progress(&mut self, entry: &str, offset: u64) {
        self.data.progress.insert(entry.to_owned(), offset);
    }

    pub fn record_found(&mut self, entry: &str, password: &str) {
        self.data
            .found
            .insert(entry.to_owned(), password.to_owned());
    }

    pub fn is_already_found(&self, entry: &str) -> bool {
        self.data.found.contains_key(entry)
    }

    /// The password found for `entry` in a previous run.
    pub fn found(&self, entry: &str) -> Option<&str> {
        self.data.found.get(entry).map(String::as_str)
    }

    /// Forgets the checkpoint and deletes it from disk.
    pub fn clear(&mut self) -> BrutyfResult<()> {
        self.data = SessionData::default();

        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(BrutyfError::open(&self.path, e)),
            _ => Ok(()),
        }
    }

    /// Returns true if a non empty checkpoint is stored on disk.
    pub fn exists(&self) -> bool {
        self.path.exists() && !self.data.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        let mut session = Session::open_in(dir.path(), "hashes.txt", "words.txt").unwrap();
        assert!(!session.exists());
        assert_eq!(0, session.get_progress("h1"));

        session.set_progress("h1", 42);
        session.record_found("h2", "secret");
        session.save().unwrap();
        assert!(session.exists());

        let session = Session::open_in(dir.path(), "hashes.txt", "words.txt").unwrap();
        assert_eq!(42, session.get_progress("h1"));
        assert!(session.is_already_found("h2"));
        assert_eq!(Some("secret"), session.found("h2"));
        assert!(!session.is_already_found("h1"));
    }

    #[test]
    fn test_session_key() {
        let dir = tempfile::tempdir().unwrap();

        let first = Session::open_in(dir.path(), "hashes.txt", "a.txt").unwrap();
        let second = Session::open_in(dir.path(), "hashes.txt", "b.txt").unwrap();
        let third = Session::open_in(dir.path(), "hashes.txt", "a.txt").unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(first.path(), third.path());

        let joined = Session::open_in(dir.path(), "ab", "c").unwrap();
        let shifted = Session::open_in(dir.path(), "a", "bc").unwrap();
        assert_ne!(joined.path(), shifted.path());
    }

    #[test]
    fn test_session_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open_in(dir.path(), "h", "w").unwrap();
        session.set_progress("entry", 7);
        session.record_found("other", "pw");
        session.save().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(session.path()).unwrap()).unwrap();
        assert_eq!(7, json["progress"]["entry"]);
        assert_eq!("pw", json["found"]["other"]);
    }

    #[test]
    fn test_session_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open_in(dir.path(), "h", "w").unwrap();
        session.set_progress("entry", 1);
        session.save().unwrap();

        session.clear().unwrap();
        assert!(!session.exists());
        assert!(!session.path().exists());
        assert_eq!(0, session.get_progress("entry"));
    }

    #[test]
    fn test_session_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open_in(dir.path(), "h", "w").unwrap();
        fs::write(session.path(), "{ not json").unwrap();

        let session = Session::open_in(dir.path(), "h", "w").unwrap();
        assert!(!session.exists());
    }
}
