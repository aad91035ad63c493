//! Duplicate and collision events raised when a hash is already stored.
//!
//! A duplicate is the same content arriving twice. A collision is different
//! content under the same hash; the event names the next, stronger algorithm
//! and the content's digest under it so the card can be re-stored.

use serde::{Deserialize, Serialize};

use crate::card::MCard;
use crate::error::CardError;
use crate::hash::{DEFAULT_ALGORITHM, compute_hash};

/// Algorithm upgrade path, weakest first.
pub const ALGORITHM_HIERARCHY: &[&str] = &["sha1", "sha224", "sha256", "sha384", "sha512", "custom"];

pub const DUPLICATE_EVENT_TYPE: &str = "duplicate";
pub const COLLISION_EVENT_TYPE: &str = "collision";

/// The algorithm after `current` in [`ALGORITHM_HIERARCHY`].
///
/// Unknown names and the last entry fall back to SHA-256.
pub fn next_hash_function(current: &str) -> &'static str {
    let current = current.to_lowercase();
    ALGORITHM_HIERARCHY
        .iter()
        .position(|name| *name == current)
        .and_then(|i| ALGORITHM_HIERARCHY.get(i + 1))
        .copied()
        .unwrap_or(DEFAULT_ALGORITHM)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub hash: String,
    pub duplicate_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub hash: String,
    pub first_g_time: String,
    /// The stored card's g_time; no new stamp is taken.
    pub collision_time: String,
    pub content_size: usize,
    pub upgraded_function: String,
    pub upgraded_hash: String,
}

impl DuplicationEvent {
    pub fn for_card(card: &MCard) -> Self {
        Self {
            event_type: DUPLICATE_EVENT_TYPE.to_string(),
            hash: card.hash().to_string(),
            duplicate_time: card.g_time().to_string(),
        }
    }
}

impl CollisionEvent {
    pub fn for_card(card: &MCard) -> Self {
        let upgraded_function = next_hash_function(card.hash_function());
        tracing::debug!(
            hash = card.hash(),
            from = card.hash_function(),
            to = upgraded_function,
            "hash collision, upgrading algorithm"
        );
        Self {
            event_type: COLLISION_EVENT_TYPE.to_string(),
            hash: card.hash().to_string(),
            first_g_time: card.g_time().to_string(),
            collision_time: card.g_time().to_string(),
            content_size: card.len(),
            upgraded_function: upgraded_function.to_string(),
            upgraded_hash: compute_hash(card.content(), upgraded_function),
        }
    }
}

/// Serialised [`DuplicationEvent`] for `card`.
///
/// # Errors
///
/// Returns [`CardError::Event`] if serialisation fails.
pub fn duplication_event(card: &MCard) -> Result<String, CardError> {
    Ok(serde_json::to_string(&DuplicationEvent::for_card(card))?)
}

/// Serialised [`CollisionEvent`] for `card`.
///
/// # Errors
///
/// Returns [`CardError::Event`] if serialisation fails.
pub fn collision_event(card: &MCard) -> Result<String, CardError> {
    Ok(serde_json::to_string(&CollisionEvent::for_card(card))?)
}
