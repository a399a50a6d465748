//! Credential pool with quota tracking.
//!
//! The pool is the only owner of credential state. Callers get
//! [`CredentialLease`] copies and report quota hits back by id, so the
//! `exhausted` flags are only ever touched under the pool's lock.

use gemrelay_core::{Credential, CredentialLease};
use rand::seq::SliceRandom;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::RelayError;

/// A set of API credentials with random selection among eligible ones.
#[derive(Debug)]
pub struct CredentialPool {
    credentials: Mutex<Vec<Credential>>,
}

impl CredentialPool {
    /// Creates a pool from key values. Ids are positional (`key-0`, ...).
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| Credential::new(format!("key-{i}"), key))
            .collect();

        Self {
            credentials: Mutex::new(credentials),
        }
    }

    /// Locks the credential list.
    ///
    /// No code path panics while holding the lock, so a poisoned lock still
    /// guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<Credential>> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Picks a random credential among those not exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::PoolExhausted`] when no credential is eligible.
    pub fn acquire(&self) -> Result<CredentialLease, RelayError> {
        let mut credentials = self.lock();

        let eligible: Vec<usize> = credentials
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_eligible())
            .map(|(i, _)| i)
            .collect();

        let Some(&index) = eligible.choose(&mut rand::thread_rng()) else {
            return Err(RelayError::PoolExhausted);
        };

        let credential = &mut credentials[index];
        credential.request_count += 1;
        debug!(
            credential = %credential.id,
            eligible = eligible.len(),
            "Acquired credential"
        );

        Ok(credential.lease())
    }

    /// Marks a credential as exhausted.
    ///
    /// Returns true if the call changed state; marking an exhausted or
    /// unknown credential is a no-op.
    pub fn mark_exhausted(&self, id: &str) -> bool {
        let mut credentials = self.lock();

        match credentials.iter_mut().find(|c| c.id == id) {
            Some(credential) if !credential.exhausted => {
                credential.exhausted = true;
                true
            }
            _ => false,
        }
    }

    /// Returns the number of credentials.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the pool holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the number of credentials still eligible.
    pub fn available(&self) -> usize {
        self.lock().iter().filter(|c| c.is_eligible()).count()
    }

    /// Returns a copy of every credential record.
    pub fn snapshot(&self) -> Vec<Credential> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_eligible() {
        let pool = CredentialPool::new(["a", "b", "c"]);
        pool.mark_exhausted("key-1");

        for _ in 0..50 {
            let lease = pool.acquire().unwrap();
            assert_ne!(lease.id, "key-1");
        }
    }

    #[test]
    fn test_single_usable_credential_is_deterministic() {
        let pool = CredentialPool::new(["A", "B"]);
        pool.mark_exhausted("key-0");

        for _ in 0..20 {
            let lease = pool.acquire().unwrap();
            assert_eq!(lease.id, "key-1");
            assert_eq!(lease.key, "B");
        }
    }

    #[test]
    fn test_all_exhausted_fails() {
        let pool = CredentialPool::new(["a", "b"]);
        pool.mark_exhausted("key-1");
        pool.mark_exhausted("key-0");

        assert!(matches!(pool.acquire(), Err(RelayError::PoolExhausted)));
        assert!(matches!(pool.acquire(), Err(RelayError::PoolExhausted)));
    }

    #[test]
    fn test_empty_pool_fails() {
        let pool = CredentialPool::new(Vec::<String>::new());
        assert!(pool.is_empty());
        assert!(matches!(pool.acquire(), Err(RelayError::PoolExhausted)));
    }

    #[test]
    fn test_mark_exhausted_is_idempotent() {
        let pool = CredentialPool::new(["a", "b"]);

        assert!(pool.mark_exhausted("key-0"));
        let once = pool.snapshot();

        assert!(!pool.mark_exhausted("key-0"));
        assert_eq!(pool.snapshot(), once);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_mark_unknown_is_noop() {
        let pool = CredentialPool::new(["a"]);
        assert!(!pool.mark_exhausted("key-9"));
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_request_count_tracks_acquisitions() {
        let pool = CredentialPool::new(["only"]);
        for _ in 0..3 {
            pool.acquire().unwrap();
        }
        assert_eq!(pool.snapshot()[0].request_count, 3);
    }

    #[test]
    fn test_selection_reaches_every_eligible_credential() {
        let pool = CredentialPool::new(["a", "b", "c"]);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..500 {
            seen.insert(pool.acquire().unwrap().id);
        }

        assert_eq!(seen.len(), 3);
    }
}
