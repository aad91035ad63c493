//! SHA-family content hashing and hash validation.
//!
//! Digests are rendered as lowercase hex. Algorithm names are matched
//! case-insensitively with or without the dash (`sha256`, `SHA-256`).
//! An unrecognised name is not an error: it is logged and hashed with
//! SHA-256 instead, so callers that care must check [`HashAlgorithm::from_str`]
//! themselves.

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Name of the algorithm used when none is given.
pub const DEFAULT_ALGORITHM: &str = "sha256";

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Resolve `name`, falling back to SHA-256 with a warning.
    pub fn parse_lenient(name: &str) -> Self {
        match name.parse::<HashAlgorithm>() {
            Ok(algorithm) => algorithm,
            Err(UnknownAlgorithm(_)) => {
                tracing::warn!(
                    algorithm = name,
                    "Algorithm {name} not natively supported or mapped, defaulting to SHA-256"
                );
                HashAlgorithm::Sha256
            }
        }
    }

    /// Canonical lowercase name, as written into g_time stamps.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Hash `data` and return the lowercase hex digest.
    pub fn digest_hex(self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(data)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
            HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
        }
    }

    /// Hash everything `reader` yields without buffering it whole.
    pub fn digest_reader(self, reader: impl Read) -> io::Result<String> {
        match self {
            HashAlgorithm::Sha1 => stream_digest::<Sha1>(reader),
            HashAlgorithm::Sha256 => stream_digest::<Sha256>(reader),
            HashAlgorithm::Sha384 => stream_digest::<Sha384>(reader),
            HashAlgorithm::Sha512 => stream_digest::<Sha512>(reader),
        }
    }
}

fn stream_digest<D: Digest + io::Write>(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by the strict [`FromStr`] parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown hash algorithm: {}", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha384" | "sha-384" => Ok(HashAlgorithm::Sha384),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Compute the hex digest of `content` with the named algorithm.
///
/// Strings are hashed as their UTF-8 bytes.
pub fn compute_hash(content: impl AsRef<[u8]>, algorithm: &str) -> String {
    HashAlgorithm::parse_lenient(algorithm).digest_hex(content.as_ref())
}

/// Compute the SHA-256 hex digest of `content`.
pub fn compute_hash_default(content: impl AsRef<[u8]>) -> String {
    HashAlgorithm::Sha256.digest_hex(content.as_ref())
}

/// Check `content` against `expected_hash`.
///
/// Always recomputes with SHA-256; the algorithm that produced
/// `expected_hash` is not inferred. Use [`compute_hash`] with an explicit
/// algorithm for anything else.
pub fn validate(content: impl AsRef<[u8]>, expected_hash: &str) -> bool {
    compute_hash_default(content) == expected_hash
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn hashing_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512),
                                    algo in prop::sample::select(vec!["sha1", "sha256", "sha384", "sha512", "bogus"])) {
            prop_assert_eq!(compute_hash(&data, algo), compute_hash(&data, algo));
        }

        #[test]
        fn validate_accepts_own_digest(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let digest = compute_hash_default(&data);
            prop_assert!(validate(&data, &digest));
        }

        #[test]
        fn validate_rejects_other_content(a in ".{0,64}", b in ".{0,64}") {
            prop_assume!(a != b);
            prop_assert!(!validate(&a, &compute_hash_default(&b)));
        }
    }
}
