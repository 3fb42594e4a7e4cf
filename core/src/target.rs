use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    ctx::HashTypeSelection,
    error::{BrutyfError, BrutyfResult},
    extract::{extract_targets, InputFormat},
    hash::HashType,
};

/// A hash to crack, parsed from one line of a hash file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHash {
    /// The line this target was parsed from.
    pub raw_entry: String,
    pub hash: String,
    pub hash_type: HashType,
    pub salt: Option<String>,
    pub username: Option<String>,
    /// The recovered password, once cracked.
    pub password: Option<String>,
}

impl TargetHash {
    /// Parses a `hash`, `hash:salt`, `user:hash` or `user:hash:salt` entry.
    ///
    /// The entry is split on its first colon. When the left side looks like a known hash
    /// it is the hash and the right side is the salt. Otherwise the left side is a username
    /// and the right side is split again into a hash and an optional salt.
    pub fn parse(entry: &str, selection: HashTypeSelection) -> TargetHash {
        let raw_entry = entry.trim().to_owned();

        let (hash, salt, username) = match raw_entry.split_once(':') {
            Some((first, second)) if !first.is_empty() && !second.is_empty() => {
                if HashType::identify(first) != HashType::Unknown {
                    (first.to_owned(), Some(second.to_owned()), None)
                } else {
                    match second.split_once(':') {
                        Some((hash, salt)) => {
                            (hash.to_owned(), Some(salt.to_owned()), Some(first.to_owned()))
                        }
                        None => (second.to_owned(), None, Some(first.to_owned())),
                    }
                }
            }
            _ => (raw_entry.clone(), None, None),
        };

        let hash_type = match selection {
            HashTypeSelection::Fixed(hash_type) => hash_type,
            HashTypeSelection::Auto => {
                let base = HashType::identify(&hash);
                if salt.is_some() {
                    base.salted()
                } else {
                    base
                }
            }
        };

        TargetHash {
            raw_entry,
            hash,
            hash_type,
            salt,
            username,
            password: None,
        }
    }

    /// Checks if `candidate` is the password of this target.
    #[inline]
    pub fn verify(&self, candidate: &str) -> bool {
        self.hash_type
            .verify(candidate, &self.hash, self.salt.as_deref())
    }
}

/// Returns true if `path` designates the standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-" || path.as_os_str() == "stdin"
}

/// Reads the targets of a hash file laid out in `format`,
/// or of the standard input for `-` and `stdin`.
pub fn read_targets(
    path: &Path,
    selection: HashTypeSelection,
    format: InputFormat,
) -> BrutyfResult<Vec<TargetHash>> {
    let content = if is_stdin(path) {
        let mut content = String::new();
        io::stdin().lock().read_to_string(&mut content)?;
        content
    } else {
        fs::read_to_string(path).map_err(|e| BrutyfError::open(path, e))?
    };

    Ok(extract_targets(&content, format, selection))
}
