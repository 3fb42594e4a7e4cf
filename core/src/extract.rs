//! Extraction of hashes from credential dumps.
//!
//! Besides the native hash file syntax, a hash file can be a system password
//! database or the output of a dumping tool. Each line is turned into a target
//! with its username, and lines without a crackable hash are dropped.

use std::{fmt::Display, str::FromStr};

use base64::{engine::general_purpose, Engine};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ctx::HashTypeSelection, error::BrutyfError, hash::HashType, target::TargetHash};

lazy_static! {
    static ref SHADOW: Regex =
        Regex::new(r"^[^:]+:\$[0-9a-z]+\$[^:]+:[0-9]*:[0-9]*:[0-9]*:[0-9]*:[0-9]*:?").unwrap();
    static ref PASSWD: Regex = Regex::new(r"^[^:]+:x:[0-9]+:[0-9]+:").unwrap();
    static ref PWDUMP: Regex = Regex::new(r"(?i)^[^:]+:[0-9]+:[a-f0-9]{32}:[a-f0-9]{32}:::").unwrap();
    static ref HTPASSWD: Regex =
        Regex::new(r"^[^:]+:(\{[A-Z0-9]+\}[A-Za-z0-9+/=]+|\$apr1\$[^:]+|\$2[aby]\$[^:]+)$").unwrap();
}

/// The NT hash of the empty password, found on disabled accounts.
const EMPTY_NT_HASH: &str = "31d6cfe0d16ae931b73c59d7e0c089c0";

/// The layouts a hash file can have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// `hash`, `hash:salt`, `user:hash` or `user:hash:salt` per line.
    #[default]
    Plain,
    /// Detected from the first meaningful line.
    Auto,
    /// `/etc/shadow`.
    Shadow,
    /// Old style `/etc/passwd` holding the hashes.
    Passwd,
    /// Apache `.htpasswd`.
    Htpasswd,
    /// `user:rid:lm:nt:::` lines of pwdump and SAM dumps.
    Pwdump,
    /// `hash` or `user:hash`.
    Hashcat,
    John,
    /// The first column of each row that looks like a hash.
    Csv,
}

impl InputFormat {
    pub fn all() -> &'static [InputFormat] {
        &[
            InputFormat::Plain,
            InputFormat::Auto,
            InputFormat::Shadow,
            InputFormat::Passwd,
            InputFormat::Htpasswd,
            InputFormat::Pwdump,
            InputFormat::Hashcat,
            InputFormat::John,
            InputFormat::Csv,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Plain => "plain",
            InputFormat::Auto => "auto",
            InputFormat::Shadow => "shadow",
            InputFormat::Passwd => "passwd",
            InputFormat::Htpasswd => "htpasswd",
            InputFormat::Pwdump => "pwdump",
            InputFormat::Hashcat => "hashcat",
            InputFormat::John => "john",
            InputFormat::Csv => "csv",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InputFormat::Plain => "hash, hash:salt, user:hash or user:hash:salt",
            InputFormat::Auto => "Detect the format from the content",
            InputFormat::Shadow => "Linux /etc/shadow",
            InputFormat::Passwd => "Unix /etc/passwd (old style)",
            InputFormat::Htpasswd => "Apache .htpasswd",
            InputFormat::Pwdump => "Windows pwdump or SAM dump",
            InputFormat::Hashcat => "Hashcat format (hash or user:hash)",
            InputFormat::John => "John the Ripper format",
            InputFormat::Csv => "CSV with a hash column",
        }
    }
}

impl Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = BrutyfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sam" => Ok(InputFormat::Pwdump),
            tag => InputFormat::all()
                .iter()
                .find(|format| format.as_str() == tag)
                .copied()
                .ok_or_else(|| BrutyfError::Unrecognized {
                    kind: "input format",
                    value: s.to_owned(),
                }),
        }
    }
}

/// The lines worth parsing: neither blank nor comments.
fn meaningful_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Guesses the format of a dump from its first recognizable line.
/// Falls back to `Plain`.
pub fn detect_format(content: &str) -> InputFormat {
    for line in meaningful_lines(content) {
        if SHADOW.is_match(line) {
            return InputFormat::Shadow;
        }

        if PASSWD.is_match(line) {
            return InputFormat::Passwd;
        }

        if PWDUMP.is_match(line) {
            return InputFormat::Pwdump;
        }

        if HTPASSWD.is_match(line) {
            return InputFormat::Htpasswd;
        }

        if line.contains(',') && line.to_ascii_lowercase().contains("hash") {
            return InputFormat::Csv;
        }
    }

    InputFormat::Plain
}

/// Parses the targets of `content` laid out in `format`.
pub fn extract_targets(
    content: &str,
    format: InputFormat,
    selection: HashTypeSelection,
) -> Vec<TargetHash> {
    let format = match format {
        InputFormat::Auto => {
            let detected = detect_format(content);
            debug!("Detected the {detected} input format");
            detected
        }
        format => format,
    };

    if format == InputFormat::Plain {
        return content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| TargetHash::parse(line, selection))
            .collect();
    }

    let targets: Vec<TargetHash> = meaningful_lines(content)
        .filter_map(|line| {
            let mut target = match format {
                InputFormat::Shadow => parse_shadow(line),
                InputFormat::Passwd => parse_passwd(line),
                InputFormat::Htpasswd => parse_htpasswd(line),
                InputFormat::Pwdump => parse_pwdump(line),
                InputFormat::Csv => parse_csv(line),
                _ => Some(TargetHash::parse(line, selection)),
            }?;

            if let HashTypeSelection::Fixed(hash_type) = selection {
                target.hash_type = hash_type;
            }

            Some(target)
        })
        .collect();

    debug!("Extracted {} hashes from a {format} dump", targets.len());
    targets
}

/// A target whose hash and username come from a dump line.
fn dumped(line: &str, username: &str, hash: String, hash_type: HashType) -> TargetHash {
    TargetHash {
        raw_entry: line.to_owned(),
        hash,
        hash_type,
        salt: None,
        username: Some(username.to_owned()),
        password: None,
    }
}

fn parse_shadow(line: &str) -> Option<TargetHash> {
    let mut fields = line.split(':');
    let username = fields.next()?;
    let hash = fields.next()?;

    // locked or disabled accounts
    if matches!(hash, "" | "*" | "x") || hash.starts_with('!') {
        return None;
    }

    Some(dumped(line, username, hash.to_owned(), HashType::identify(hash)))
}

fn parse_passwd(line: &str) -> Option<TargetHash> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 7 || matches!(fields[1], "" | "x" | "*") {
        return None;
    }

    Some(dumped(
        line,
        fields[0],
        fields[1].to_owned(),
        HashType::identify(fields[1]),
    ))
}

fn parse_htpasswd(line: &str) -> Option<TargetHash> {
    let (username, hash) = line.split_once(':')?;

    // {SHA} is the base64 of the raw SHA1 digest
    if let Some(encoded) = hash.strip_prefix("{SHA}") {
        let digest = general_purpose::STANDARD.decode(encoded).ok()?;
        if digest.len() != 20 {
            return None;
        }

        return Some(dumped(line, username, hex::encode(digest), HashType::Sha1));
    }

    Some(dumped(line, username, hash.to_owned(), HashType::identify(hash)))
}

fn parse_pwdump(line: &str) -> Option<TargetHash> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 4 {
        return None;
    }

    let nt_hash = fields[3];
    if nt_hash.len() != 32 || nt_hash.eq_ignore_ascii_case(EMPTY_NT_HASH) {
        return None;
    }

    Some(dumped(line, fields[0], nt_hash.to_owned(), HashType::Ntlm))
}

fn parse_csv(line: &str) -> Option<TargetHash> {
    line.split(',')
        .map(|value| value.trim().trim_matches('"'))
        .find_map(|value| {
            let hash_type = HashType::identify(value);

            (hash_type != HashType::Unknown && !hash_type.is_salted()).then(|| TargetHash {
                raw_entry: line.to_owned(),
                hash: value.to_owned(),
                hash_type,
                salt: None,
                username: None,
                password: None,
            })
        })
}
