//! A durable `hash:password` cache shared across runs.

use std::{
    collections::HashMap,
    env,
    fs::{self, File},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{BrutyfError, BrutyfResult},
    POTFILE_NAME,
};

/// The cracked passwords of previous runs.
///
/// New entries are appended to the file, so it may hold several lines for the same hash.
/// The last one wins when loading.
#[derive(Clone, Debug)]
pub struct Potfile {
    path: PathBuf,
    cracked: HashMap<String, String>,
}

impl Potfile {
    /// The potfile in the home directory, or in the temporary directory if there is no home.
    pub fn default_path() -> PathBuf {
        env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
            .join(POTFILE_NAME)
    }

    /// Opens a potfile, loading its entries if it exists.
    pub fn open(path: impl Into<PathBuf>) -> BrutyfResult<Self> {
        let mut potfile = Self {
            path: path.into(),
            cracked: HashMap::new(),
        };
        potfile.load()?;

        Ok(potfile)
    }

    /// Opens the potfile at its default path.
    pub fn open_default() -> BrutyfResult<Self> {
        Self::open(Self::default_path())
    }

    /// Reloads the entries from disk.
    pub fn load(&mut self) -> BrutyfResult<()> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(BrutyfError::open(&self.path, e)),
        };

        for line in BufReader::new(file).lines() {
            let line = line?;

            if let Some((hash, password)) = line.split_once(':') {
                self.cracked.insert(hash.to_owned(), password.to_owned());
            }
        }

        debug!(
            "Loaded {} cracked hashes from {}",
            self.cracked.len(),
            self.path.display()
        );

        Ok(())
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.cracked.contains_key(hash)
    }

    pub fn get(&self, hash: &str) -> Option<&str> {
        self.cracked.get(hash).map(String::as_str)
    }

    /// Records a cracked hash, appending it to the file right away.
    pub fn add(&mut self, hash: &str, password: &str) -> BrutyfResult<()> {
        let mut file = File::options()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BrutyfError::open(&self.path, e))?;

        writeln!(file, "{hash}:{password}")?;
        self.cracked.insert(hash.to_owned(), password.to_owned());

        Ok(())
    }

    /// Returns the hashes that are not cracked yet.
    pub fn filter_out_known<S: AsRef<str> + Clone>(&self, hashes: &[S]) -> Vec<S> {
        hashes
            .iter()
            .filter(|hash| !self.contains(hash.as_ref()))
            .cloned()
            .collect()
    }

    /// Returns the password of every hash already cracked.
    pub fn already_cracked<S: AsRef<str>>(&self, hashes: &[S]) -> HashMap<String, String> {
        hashes
            .iter()
            .filter_map(|hash| {
                let hash = hash.as_ref();
                self.get(hash)
                    .map(|password| (hash.to_owned(), password.to_owned()))
            })
            .collect()
    }

    /// Rewrites the file with exactly one line per hash.
    pub fn compact(&self) -> BrutyfResult<()> {
        let mut content = String::new();
        for (hash, password) in &self.cracked {
            content.push_str(hash);
            content.push(':');
            content.push_str(password);
            content.push('\n');
        }

        fs::write(&self.path, content).map_err(|e| BrutyfError::open(&self.path, e))
    }

    /// Forgets every entry and deletes the file.
    pub fn clear(&mut self) -> BrutyfResult<()> {
        self.cracked.clear();

        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(BrutyfError::open(&self.path, e)),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.cracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cracked.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
