//! Credential records.
//!
//! This module contains the types describing API keys held by a pool:
//! - [`Credential`] - Mutable record owned by the pool
//! - [`CredentialLease`] - Read-only copy handed to callers

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Credential
// ============================================================================

/// An API key plus its local usage-tracking state.
///
/// Records are owned by a credential pool. Only the pool flips
/// `exhausted`, and it never flips it back.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Positional identifier (`key-0`, `key-1`, ...).
    pub id: String,
    /// The secret key value.
    #[serde(skip_serializing, default)]
    pub key: String,
    /// How many times this credential was handed out.
    pub request_count: u64,
    /// Whether the key hit its quota and is excluded from selection.
    pub exhausted: bool,
}

impl Credential {
    /// Creates a fresh, eligible credential.
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            request_count: 0,
            exhausted: false,
        }
    }

    /// Returns true if this credential can be selected.
    pub fn is_eligible(&self) -> bool {
        !self.exhausted
    }

    /// Returns the key with everything but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        mask_key(&self.key)
    }

    /// Creates a lease for this credential.
    pub fn lease(&self) -> CredentialLease {
        CredentialLease {
            id: self.id.clone(),
            key: self.key.clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("key", &self.masked_key())
            .field("request_count", &self.request_count)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

// ============================================================================
// Credential Lease
// ============================================================================

/// A snapshot of a credential handed out for one attempt.
///
/// Holding a lease does not reserve the credential; it only tells the
/// caller which key to send and which id to report back on quota errors.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialLease {
    /// Identifier of the pooled credential.
    pub id: String,
    /// The secret key value.
    pub key: String,
}

impl fmt::Debug for CredentialLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialLease")
            .field("id", &self.id)
            .field("key", &mask_key(&self.key))
            .finish()
    }
}

/// Masks a key for display, keeping only its last four characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
