//! MCard: an immutable, content-addressed record.

use serde::{Deserialize, Serialize};

use crate::error::CardError;
use crate::gtime::GTime;
use crate::hash::{DEFAULT_ALGORITHM, HashAlgorithm};
use crate::interpreter::ContentTypeInterpreter;

/// Content plus the hash and g_time stamp that identify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MCard {
    content: Vec<u8>,
    hash: String,
    g_time: String,
    content_type: String,
    hash_function: String,
}

/// Serialisable view of an [`MCard`] with the content decoded as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MCardObject {
    pub hash: String,
    pub content: String,
    #[serde(rename = "g_time")]
    pub g_time: String,
    pub content_type: String,
    pub hash_function: String,
}

impl MCard {
    /// Hash and stamp `content` with `algorithm`.
    ///
    /// The algorithm name is lower-cased for both the stamp and
    /// `hash_function`, so the two always agree and a card rebuilt with
    /// [`MCard::from_data`] compares equal. Unknown names hash with SHA-256
    /// but are still recorded.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::EmptyContent`] for zero-length content.
    pub fn create(content: impl AsRef<[u8]>, algorithm: &str) -> Result<Self, CardError> {
        let content = content.as_ref();
        if content.is_empty() {
            return Err(CardError::EmptyContent);
        }

        let hash = HashAlgorithm::parse_lenient(algorithm).digest_hex(content);
        let g_time = GTime::stamp_now(algorithm);
        let content_type = ContentTypeInterpreter::quick_detect(content);

        Ok(Self {
            content: content.to_vec(),
            hash,
            g_time,
            content_type: content_type.to_string(),
            hash_function: algorithm.to_lowercase(),
        })
    }

    /// [`MCard::create`] with SHA-256.
    pub fn create_default(content: impl AsRef<[u8]>) -> Result<Self, CardError> {
        Self::create(content, DEFAULT_ALGORITHM)
    }

    /// Rebuild a card from stored fields without rehashing.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::GTime`] if `g_time` is not a three-part stamp.
    pub fn from_data(
        content: impl Into<Vec<u8>>,
        hash: impl Into<String>,
        g_time: impl Into<String>,
    ) -> Result<Self, CardError> {
        let content = content.into();
        let g_time = g_time.into();
        let hash_function = GTime::hash_algorithm(&g_time)?;
        let content_type = ContentTypeInterpreter::quick_detect(&content);

        Ok(Self {
            content,
            hash: hash.into(),
            g_time,
            content_type: content_type.to_string(),
            hash_function,
        })
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content decoded as UTF-8, with invalid sequences replaced.
    pub fn content_as_text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn g_time(&self) -> &str {
        &self.g_time
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn hash_function(&self) -> &str {
        &self.hash_function
    }

    /// Content size in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Recompute the digest with the stamp's algorithm and compare.
    pub fn verify(&self) -> bool {
        HashAlgorithm::parse_lenient(&self.hash_function).digest_hex(&self.content) == self.hash
    }

    pub fn to_object(&self) -> MCardObject {
        MCardObject {
            hash: self.hash.clone(),
            content: self.content_as_text(),
            g_time: self.g_time.clone(),
            content_type: self.content_type.clone(),
            hash_function: self.hash_function.clone(),
        }
    }
}
