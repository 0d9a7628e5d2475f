//! Process-wide holder of the loaded key set with atomic replacement.

use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "metrics")]
use strongbox_metrics::{counter, crypto as crypto_metrics, gauge};

use crate::{
    error::Result,
    loader::{KeyLoader, KeySet},
    traits::SymmetricKey,
};

/// Shared, hot-swappable key set.
///
/// Readers take an `Arc` snapshot and keep using it for as long as they
/// like; a reload publishes a whole new [`KeySet`] in one swap, so nobody
/// ever observes a half-updated set. Keys themselves are never mutated.
#[derive(Debug, Default)]
pub struct KeyRing {
    current: RwLock<Arc<KeySet>>,
}

impl KeyRing {
    pub fn new(set: KeySet) -> Self {
        let ring = Self::default();
        ring.replace(set);
        ring
    }

    /// Build a ring from everything `loader` can load.
    pub fn load(loader: &KeyLoader) -> Result<Self> {
        Ok(Self::new(loader.load_all()?))
    }

    /// The currently published key set.
    pub fn snapshot(&self) -> Arc<KeySet> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Publish `set`, returning the set it replaced.
    pub fn replace(&self, set: KeySet) -> Arc<KeySet> {
        #[cfg(feature = "metrics")]
        gauge!(crypto_metrics::IDENTIFIERS_LOADED).set(set.len() as f64);

        let next = Arc::new(set);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Reload from `loader` and publish the result.
    ///
    /// On error the previously published set stays in place.
    pub fn reload(&self, loader: &KeyLoader) -> Result<usize> {
        let set = loader.load_all()?;
        let count = set.len();
        self.replace(set);

        #[cfg(feature = "metrics")]
        counter!(crypto_metrics::KEY_RELOADS_TOTAL).increment(1);

        #[cfg(feature = "tracing")]
        tracing::info!(identifiers = count, "key ring reloaded");

        Ok(count)
    }

    /// Encrypt with the current key for `identifier`.
    pub fn encrypt(&self, identifier: &str, plaintext: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        self.snapshot().key(identifier)?.encrypt(plaintext, extra)
    }

    /// Decrypt with every retained key for `identifier`.
    pub fn decrypt(&self, identifier: &str, envelope: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        self.snapshot().key(identifier)?.decrypt(envelope, extra)
    }
}
