//! Hash classification and candidate verification.

use std::{fmt::Display, str::FromStr};

use digest::Digest;
use lazy_static::lazy_static;
use md4::Md4;
use md5::Md5;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::BrutyfError;

lazy_static! {
    static ref BCRYPT: Regex = Regex::new(r"^\$2[aby]\$[0-9]{2}\$[A-Za-z0-9./]{53}$").unwrap();
    static ref MYSQL5: Regex = Regex::new(r"^\*[A-Fa-f0-9]{40}$").unwrap();
    static ref HEX: Regex = Regex::new(r"^[A-Fa-f0-9]+$").unwrap();
}

/// All the supported hash algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashType {
    #[serde(rename = "bcrypt")]
    Bcrypt,
    #[serde(rename = "md5")]
    Md5,
    #[serde(rename = "sha1")]
    Sha1,
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha512")]
    Sha512,
    #[serde(rename = "ntlm")]
    Ntlm,
    /// MySQL before 4.1.
    #[serde(rename = "mysql")]
    MySql,
    /// MySQL 4.1 and later.
    #[serde(rename = "mysql5")]
    MySql5,
    #[serde(rename = "md5_salted")]
    Md5Salted,
    #[serde(rename = "sha1_salted")]
    Sha1Salted,
    #[serde(rename = "sha256_salted")]
    Sha256Salted,
    #[serde(rename = "sha512_salted")]
    Sha512Salted,
    #[serde(rename = "unknown")]
    Unknown,
}

/// A possible type for a hash, with a confidence between 0 and 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HashTypeCandidate {
    pub hash_type: HashType,
    pub confidence: u8,
}

/// Human readable information about a hash type.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct HashTypeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub length: usize,
    pub example: &'static str,
    pub security: &'static str,
}

impl HashType {
    /// The types that can be selected explicitly.
    pub fn all() -> &'static [HashType] {
        &[
            HashType::Bcrypt,
            HashType::Md5,
            HashType::Sha1,
            HashType::Sha256,
            HashType::Sha512,
            HashType::Ntlm,
            HashType::MySql,
            HashType::MySql5,
            HashType::Md5Salted,
            HashType::Sha1Salted,
            HashType::Sha256Salted,
            HashType::Sha512Salted,
        ]
    }

    /// Returns the canonical tag of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashType::Bcrypt => "bcrypt",
            HashType::Md5 => "md5",
            HashType::Sha1 => "sha1",
            HashType::Sha256 => "sha256",
            HashType::Sha512 => "sha512",
            HashType::Ntlm => "ntlm",
            HashType::MySql => "mysql",
            HashType::MySql5 => "mysql5",
            HashType::Md5Salted => "md5_salted",
            HashType::Sha1Salted => "sha1_salted",
            HashType::Sha256Salted => "sha256_salted",
            HashType::Sha512Salted => "sha512_salted",
            HashType::Unknown => "unknown",
        }
    }

    /// Classifies a hash string.
    ///
    /// A `hash:salt` string is classified as the salted variant of the left part.
    /// Otherwise bcrypt and MySQL5 are recognized by their shape, and everything
    /// else by the length of its hexadecimal digest. 32 hexadecimal characters are
    /// reported as MD5 even though NTLM has the same shape, see
    /// [`HashType::identify_with_confidence`].
    pub fn identify(hash: &str) -> HashType {
        let hash = hash.trim();

        if let Some((hash_part, _)) = hash.split_once(':') {
            let salted = Self::identify_base(hash_part).salted();
            if salted.is_salted() {
                return salted;
            }
        }

        if BCRYPT.is_match(hash) {
            return HashType::Bcrypt;
        }

        if MYSQL5.is_match(hash) {
            return HashType::MySql5;
        }

        Self::identify_base(hash)
    }

    fn identify_base(hash: &str) -> HashType {
        if !HEX.is_match(hash) {
            return HashType::Unknown;
        }

        match hash.len() {
            16 => HashType::MySql,
            32 => HashType::Md5,
            40 => HashType::Sha1,
            64 => HashType::Sha256,
            128 => HashType::Sha512,
            _ => HashType::Unknown,
        }
    }

    /// Returns every plausible type for a hash, most likely first.
    /// An unrecognizable hash yields a single `Unknown` entry with a confidence of 0.
    pub fn identify_with_confidence(hash: &str) -> Vec<HashTypeCandidate> {
        let hash = hash.trim();
        let candidate = |hash_type, confidence| HashTypeCandidate {
            hash_type,
            confidence,
        };

        if BCRYPT.is_match(hash) {
            return vec![candidate(HashType::Bcrypt, 100)];
        }

        if MYSQL5.is_match(hash) {
            return vec![candidate(HashType::MySql5, 100)];
        }

        let mut candidates = Vec::new();

        if let Some((hash_part, _)) = hash.split_once(':') {
            let salted = Self::identify_base(hash_part).salted();
            if salted.is_salted() {
                candidates.push(candidate(salted, 90));
            }
        }

        if HEX.is_match(hash) {
            match hash.len() {
                16 => candidates.push(candidate(HashType::MySql, 80)),
                32 => {
                    candidates.push(candidate(HashType::Md5, 60));
                    candidates.push(candidate(HashType::Ntlm, 40));
                }
                40 => candidates.push(candidate(HashType::Sha1, 90)),
                64 => candidates.push(candidate(HashType::Sha256, 90)),
                128 => candidates.push(candidate(HashType::Sha512, 90)),
                _ => (),
            }
        }

        if candidates.is_empty() {
            return vec![candidate(HashType::Unknown, 0)];
        }

        candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        candidates
    }

    /// Returns the salted variant of this type, or the type itself if it has none.
    pub fn salted(self) -> HashType {
        match self {
            HashType::Md5 => HashType::Md5Salted,
            HashType::Sha1 => HashType::Sha1Salted,
            HashType::Sha256 => HashType::Sha256Salted,
            HashType::Sha512 => HashType::Sha512Salted,
            other => other,
        }
    }

    /// Returns true if this type mixes a salt into the digest.
    pub fn is_salted(&self) -> bool {
        matches!(
            self,
            HashType::Md5Salted
                | HashType::Sha1Salted
                | HashType::Sha256Salted
                | HashType::Sha512Salted
        )
    }

    /// Checks if `candidate` produces `hash`.
    ///
    /// Salted types accept both `candidate + salt` and `salt + candidate`.
    /// Verifying against `Unknown` is always false.
    pub fn verify(&self, candidate: &str, hash: &str, salt: Option<&str>) -> bool {
        let hash = hash.trim();
        let salt = salt.unwrap_or_default();
        let candidate = candidate.as_bytes();

        match self {
            HashType::Bcrypt => bcrypt::verify(candidate, hash).unwrap_or(false),
            HashType::Md5 => hex_digest::<Md5>(&[candidate]).eq_ignore_ascii_case(hash),
            HashType::Sha1 => hex_digest::<Sha1>(&[candidate]).eq_ignore_ascii_case(hash),
            HashType::Sha256 => hex_digest::<Sha256>(&[candidate]).eq_ignore_ascii_case(hash),
            HashType::Sha512 => hex_digest::<Sha512>(&[candidate]).eq_ignore_ascii_case(hash),
            HashType::Ntlm => hex::encode(ntlm(candidate)).eq_ignore_ascii_case(hash),
            HashType::MySql => mysql_old_password(candidate).eq_ignore_ascii_case(hash),
            HashType::MySql5 => mysql5_password(candidate).eq_ignore_ascii_case(hash),
            HashType::Md5Salted => verify_salted::<Md5>(candidate, salt, hash),
            HashType::Sha1Salted => verify_salted::<Sha1>(candidate, salt, hash),
            HashType::Sha256Salted => verify_salted::<Sha256>(candidate, salt, hash),
            HashType::Sha512Salted => verify_salted::<Sha512>(candidate, salt, hash),
            HashType::Unknown => false,
        }
    }

    /// Hashes `password` with this algorithm.
    ///
    /// Salted types append `salt` to the password and return `digest:salt`, so that the
    /// output can be put in a hash file as is. Returns `None` for `Unknown`, for a salted
    /// type without salt and if bcrypt fails.
    pub fn generate(&self, password: &str, salt: Option<&str>) -> Option<String> {
        let password = password.as_bytes();

        let salted = |digest: fn(&[&[u8]]) -> String| {
            salt.map(|salt| format!("{}:{salt}", digest(&[password, salt.as_bytes()])))
        };

        match self {
            HashType::Bcrypt => bcrypt::hash(password, bcrypt::DEFAULT_COST).ok(),
            HashType::Md5 => Some(hex_digest::<Md5>(&[password])),
            HashType::Sha1 => Some(hex_digest::<Sha1>(&[password])),
            HashType::Sha256 => Some(hex_digest::<Sha256>(&[password])),
            HashType::Sha512 => Some(hex_digest::<Sha512>(&[password])),
            HashType::Ntlm => Some(hex::encode_upper(ntlm(password))),
            HashType::MySql => Some(mysql_old_password(password)),
            HashType::MySql5 => Some(mysql5_password(password)),
            HashType::Md5Salted => salted(hex_digest::<Md5>),
            HashType::Sha1Salted => salted(hex_digest::<Sha1>),
            HashType::Sha256Salted => salted(hex_digest::<Sha256>),
            HashType::Sha512Salted => salted(hex_digest::<Sha512>),
            HashType::Unknown => None,
        }
    }

    /// Hashes `password` with every unsalted algorithm.
    pub fn generate_all(password: &str) -> Vec<(HashType, String)> {
        HashType::all()
            .iter()
            .filter(|hash_type| !hash_type.is_salted())
            .filter_map(|&hash_type| {
                hash_type
                    .generate(password, None)
                    .map(|hash| (hash_type, hash))
            })
            .collect()
    }

    /// Returns human readable information about this type.
    pub fn info(&self) -> HashTypeInfo {
        let info = |name, description, length, example, security| HashTypeInfo {
            name,
            description,
            length,
            example,
            security,
        };

        match self {
            HashType::Bcrypt => info(
                "bcrypt",
                "Blowfish-based adaptive hash",
                60,
                "$2y$10$abcdefghijklmnopqrstuO...",
                "Strong (slow, salted)",
            ),
            HashType::Md5 => info(
                "MD5",
                "Message Digest 5",
                32,
                "5f4dcc3b5aa765d61d8327deb882cf99",
                "Weak (fast, unsalted)",
            ),
            HashType::Sha1 => info(
                "SHA-1",
                "Secure Hash Algorithm 1",
                40,
                "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8",
                "Weak (fast, unsalted)",
            ),
            HashType::Sha256 => info(
                "SHA-256",
                "Secure Hash Algorithm 256-bit",
                64,
                "5e884898da28047151d0e56f8dc62927...",
                "Medium (fast, unsalted)",
            ),
            HashType::Sha512 => info(
                "SHA-512",
                "Secure Hash Algorithm 512-bit",
                128,
                "b109f3bbbc244eb82441917ed06d618b...",
                "Medium (fast, unsalted)",
            ),
            HashType::Ntlm => info(
                "NTLM",
                "Windows NT LAN Manager",
                32,
                "8846F7EAEE8FB117AD06BDD830B7586C",
                "Weak (fast, unsalted)",
            ),
            HashType::MySql => info(
                "MySQL (old)",
                "MySQL pre-4.1 password hash",
                16,
                "5d2e19393cc5ef67",
                "Very Weak",
            ),
            HashType::MySql5 => info(
                "MySQL5",
                "MySQL 4.1+ password hash",
                41,
                "*2470C0C06DEE42FD1618BB99005ADCA2EC9D1E19",
                "Weak (double SHA1)",
            ),
            HashType::Md5Salted => info(
                "MD5 (salted)",
                "MD5 with salt appended/prepended",
                32,
                "5f4dcc3b5aa765d61d8327deb882cf99:salt",
                "Medium",
            ),
            HashType::Sha1Salted => info(
                "SHA-1 (salted)",
                "SHA-1 with salt appended/prepended",
                40,
                "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8:salt",
                "Medium",
            ),
            HashType::Sha256Salted => info(
                "SHA-256 (salted)",
                "SHA-256 with salt",
                64,
                "5e884898da28047151d0e56f8dc62927...:salt",
                "Medium",
            ),
            HashType::Sha512Salted => info(
                "SHA-512 (salted)",
                "SHA-512 with salt",
                128,
                "b109f3bbbc244eb82441917ed06d618b...:salt",
                "Medium",
            ),
            HashType::Unknown => info("Unknown", "Unrecognized hash format", 0, "", "Unknown"),
        }
    }
}

impl Display for HashType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashType {
    type Err = BrutyfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();

        HashType::all()
            .iter()
            .chain([&HashType::Unknown])
            .find(|hash_type| hash_type.as_str() == tag)
            .copied()
            .ok_or_else(|| BrutyfError::Unrecognized {
                kind: "hash type",
                value: s.to_owned(),
            })
    }
}

/// Hashes the concatenation of `parts` and returns the lowercase hexadecimal digest.
#[inline]
fn hex_digest<D: Digest>(parts: &[&[u8]]) -> String {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }

    hex::encode(hasher.finalize())
}

#[inline]
fn verify_salted<D: Digest>(candidate: &[u8], salt: &str, hash: &str) -> bool {
    let salt = salt.as_bytes();

    hex_digest::<D>(&[candidate, salt]).eq_ignore_ascii_case(hash)
        || hex_digest::<D>(&[salt, candidate]).eq_ignore_ascii_case(hash)
}

/// Hashes a password using NTLM, that is MD4 over its UTF-16LE encoding.
pub fn ntlm(password: &[u8]) -> [u8; 16] {
    let utf16_le: Vec<u8> = String::from_utf8_lossy(password)
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();

    let mut out = [0; 16];
    out.copy_from_slice(&Md4::digest(utf16_le));
    out
}

/// The pre-4.1 MySQL `PASSWORD()` function.
/// Spaces and tabs are ignored.
pub fn mysql_old_password(password: &[u8]) -> String {
    let mut nr: u32 = 1_345_345_333;
    let mut nr2: u32 = 0x1234_5671;
    let mut add: u32 = 7;

    for &c in password.iter().filter(|&&c| c != b' ' && c != b'\t') {
        let c = c as u32;
        nr ^= ((nr & 63).wrapping_add(add))
            .wrapping_mul(c)
            .wrapping_add(nr << 8);
        nr &= 0x7FFF_FFFF;
        nr2 = nr2.wrapping_add((nr2 << 8) ^ nr);
        nr2 &= 0x7FFF_FFFF;
        add = add.wrapping_add(c);
    }

    format!("{:08x}{:08x}", nr & 0x7FFF_FFFF, nr2 & 0x7FFF_FFFF)
}

/// The MySQL 4.1+ `PASSWORD()` function: `*` followed by the uppercase SHA1 of the raw SHA1.
pub fn mysql5_password(password: &[u8]) -> String {
    let inner = Sha1::digest(password);
    format!("*{}", hex::encode_upper(Sha1::digest(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MD5_PASSWORD: &str = "5f4dcc3b5aa765d61d8327deb882cf99";

    #[test]
    fn test_generate() {
        assert_eq!(Some(MD5_PASSWORD.to_owned()), HashType::Md5.generate("password", None));
        assert_eq!(
            Some("8846F7EAEE8FB117AD06BDD830B7586C".to_owned()),
            HashType::Ntlm.generate("password", None)
        );
        assert_eq!(
            Some("*2470C0C06DEE42FD1618BB99005ADCA2EC9D1E19".to_owned()),
            HashType::MySql5.generate("password", None)
        );
        assert_eq!(None, HashType::Unknown.generate("password", None));
    }

    #[test]
    fn test_generate_salted() {
        assert_eq!(None, HashType::Md5Salted.generate("password", None));

        let generated = HashType::Md5Salted.generate("password", Some("salt")).unwrap();
        assert_eq!("b305cadbb3bce54f3aa59c64fec00dea:salt", generated);

        let (hash, salt) = generated.split_once(':').unwrap();
        assert!(HashType::Md5Salted.verify("password", hash, Some(salt)));
    }

    #[test]
    fn test_generate_all() {
        let generated = HashType::generate_all("letmein");
        let types = generated.iter().map(|(hash_type, _)| *hash_type).collect::<Vec<_>>();

        assert_eq!(
            vec![
                HashType::Bcrypt,
                HashType::Md5,
                HashType::Sha1,
                HashType::Sha256,
                HashType::Sha512,
                HashType::Ntlm,
                HashType::MySql,
                HashType::MySql5,
            ],
            types
        );

        // bcrypt is only checked through its shape
        for (hash_type, hash) in generated.iter().skip(1) {
            assert!(hash_type.verify("letmein", hash, None), "{hash_type}");
        }
        assert_eq!(HashType::Bcrypt, HashType::identify(&generated[0].1));
    }

    #[test]
    fn test_identify_by_length() {
        assert_eq!(HashType::Md5, HashType::identify(MD5_PASSWORD));
        assert_eq!(
            HashType::Sha1,
            HashType::identify("5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8")
        );
        assert_eq!(HashType::MySql, HashType::identify("5d2e19393cc5ef67"));
        assert_eq!(HashType::Unknown, HashType::identify("not a hash"));
        assert_eq!(HashType::Unknown, HashType::identify("abc"));
    }

    #[test]
    fn test_identify_shapes() {
        let bcrypt = "$2y$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";
        assert_eq!(HashType::Bcrypt, HashType::identify(bcrypt));
        assert_eq!(
            HashType::MySql5,
            HashType::identify("*2470C0C06DEE42FD1618BB99005ADCA2EC9D1E19")
        );
    }

    #[test]
    fn test_identify_salted() {
        assert_eq!(
            HashType::Md5Salted,
            HashType::identify(&format!("{MD5_PASSWORD}:pepper"))
        );
        assert_eq!(
            HashType::Sha1Salted,
            HashType::identify("5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8:x")
        );
        assert_eq!(HashType::Unknown, HashType::identify("alice:bob"));
    }

    #[test]
    fn test_identify_with_confidence_ambiguous() {
        let candidates = HashType::identify_with_confidence(MD5_PASSWORD);

        assert_eq!(
            vec![
                HashTypeCandidate {
                    hash_type: HashType::Md5,
                    confidence: 60
                },
                HashTypeCandidate {
                    hash_type: HashType::Ntlm,
                    confidence: 40
                },
            ],
            candidates
        );
    }

    #[test]
    fn test_identify_with_confidence_unknown() {
        let candidates = HashType::identify_with_confidence("zzz");
        assert_eq!(1, candidates.len());
        assert_eq!(HashType::Unknown, candidates[0].hash_type);
        assert_eq!(0, candidates[0].confidence);
    }

    #[test]
    fn test_identify_with_confidence_sorted() {
        let candidates = HashType::identify_with_confidence(&format!("{MD5_PASSWORD}:salt"));
        assert_eq!(HashType::Md5Salted, candidates[0].hash_type);
        assert!(candidates
            .windows(2)
            .all(|pair| pair[0].confidence >= pair[1].confidence));
    }

    #[test]
    fn test_verify_md5() {
        assert!(HashType::Md5.verify("password", MD5_PASSWORD, None));
        assert!(HashType::Md5.verify("password", &MD5_PASSWORD.to_uppercase(), None));
        assert!(!HashType::Md5.verify("Password", MD5_PASSWORD, None));
    }

    #[test]
    fn test_verify_sha() {
        assert!(HashType::Sha1.verify(
            "password",
            "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8",
            None
        ));
        assert!(HashType::Sha256.verify(
            "password",
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
            None
        ));
        assert!(HashType::Sha512.verify(
            "password",
            "b109f3bbbc244eb82441917ed06d618b9008dd09b3befd1b5e07394c706a8bb980b1d7785e5976ec049b46df5f1326af5a2ea6d103fd07c95385ffab0cacbc86",
            None
        ));
    }

    #[test]
    fn test_verify_bcrypt() {
        let hash = bcrypt::hash("secret", 4).unwrap();

        assert_eq!(HashType::Bcrypt, HashType::identify(&hash));
        assert!(HashType::Bcrypt.verify("secret", &hash, None));
        assert!(!HashType::Bcrypt.verify("Secret", &hash, None));
        assert!(!HashType::Bcrypt.verify("", &hash, None));
    }

    #[test]
    fn test_ntlm() {
        let expected = [
            0x88u8, 0x46, 0xF7, 0xEA, 0xEE, 0x8F, 0xB1, 0x17, 0xAD, 0x06, 0xBD, 0xD8, 0x30, 0xB7,
            0x58, 0x6C,
        ];
        assert_eq!(expected, ntlm(b"password"));
        assert!(HashType::Ntlm.verify("password", "8846F7EAEE8FB117AD06BDD830B7586C", None));
        assert!(!HashType::Ntlm.verify("password", MD5_PASSWORD, None));
    }

    #[test]
    fn test_mysql_old_password() {
        assert_eq!("5d2e19393cc5ef67", mysql_old_password(b"password"));
        // whitespace is skipped
        assert_eq!("5d2e19393cc5ef67", mysql_old_password(b"pass word"));
        assert_eq!("5030573512345671", mysql_old_password(b""));
        assert!(HashType::MySql.verify("password", "5D2E19393CC5EF67", None));
    }

    #[test]
    fn test_mysql5_password() {
        assert_eq!(
            "*2470C0C06DEE42FD1618BB99005ADCA2EC9D1E19",
            mysql5_password(b"password")
        );
    }

    #[test]
    fn test_verify_salted_both_orders() {
        // md5("passwordsalt") and md5("saltpassword")
        let appended = "b305cadbb3bce54f3aa59c64fec00dea";
        let prepended = "67a1e09bb1f83f5007dc119c14d663aa";

        assert!(HashType::Md5Salted.verify("password", appended, Some("salt")));
        assert!(HashType::Md5Salted.verify("password", prepended, Some("salt")));
        assert!(!HashType::Md5Salted.verify("password", appended, Some("pepper")));
    }

    #[test]
    fn test_verify_unknown() {
        assert!(!HashType::Unknown.verify("", "", None));
        assert!(!HashType::Unknown.verify("password", MD5_PASSWORD, None));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(HashType::MySql5, "MySQL5".parse().unwrap());
        assert_eq!(HashType::Sha256Salted, "sha256_salted".parse().unwrap());
        assert!("md6".parse::<HashType>().is_err());
    }
}
