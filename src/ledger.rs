//! Session-scoped chain-hash ledger.
//!
//! The ledger binds a session to the exact certificate chain observed at its
//! first handshake: one digest per chain depth, compared on every
//! renegotiation. A differing digest at a locked depth means the peer
//! swapped a certificate mid-session.

use crate::error::{Error, Result};
use std::fmt;

/// Number of bytes in a chain-locking digest (SHA-256).
pub const CHAIN_HASH_LEN: usize = 32;

/// Digest of one certificate's DER encoding, locking one chain depth.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChainHash([u8; CHAIN_HASH_LEN]);

impl ChainHash {
    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; CHAIN_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the digest bytes.
    pub const fn as_bytes(&self) -> &[u8; CHAIN_HASH_LEN] {
        &self.0
    }
}

impl From<[u8; CHAIN_HASH_LEN]> for ChainHash {
    fn from(bytes: [u8; CHAIN_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ChainHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainHash(")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// Outcome of comparing a presented hash against the locked chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    /// The presented hash equals the locked hash at this depth.
    Match,
    /// The presented hash differs from the locked hash at this depth.
    Mismatch,
    /// Nothing is locked at this depth yet.
    NoPriorRecord,
}

/// Ordered store of one locked hash per chain depth.
///
/// Owned exclusively by one [`crate::Session`] and dropped with it; there is
/// no shared or persistent ledger. Entries are recorded contiguously from
/// depth 0 and, once locked, never replaced: a renegotiation may compare
/// against an entry or (under the growth policy) append past the end, so the
/// ledger never holds two candidate hashes for one depth.
#[derive(Debug, Default)]
pub struct ChainHashLedger {
    locked: Vec<ChainHash>,
}

impl ChainHashLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of locked depths.
    pub fn len(&self) -> usize {
        self.locked.len()
    }

    /// Whether no depth has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.locked.is_empty()
    }

    /// Returns the locked hash at `depth`, if any.
    pub fn hash_at(&self, depth: usize) -> Option<&ChainHash> {
        self.locked.get(depth)
    }

    /// Records `hash` at `depth`.
    ///
    /// Depths lock contiguously from 0. An already-locked depth is left
    /// untouched; detection of a differing certificate is [`Self::compare`]'s
    /// job, the baseline itself is immutable.
    ///
    /// # Errors
    ///
    /// [`Error::DepthOutOfOrder`] when `depth` would leave a gap.
    pub fn remember(&mut self, depth: usize, hash: ChainHash) -> Result<()> {
        if depth > self.locked.len() {
            return Err(Error::DepthOutOfOrder {
                expected: self.locked.len(),
                depth,
            });
        }
        if depth == self.locked.len() {
            self.locked.push(hash);
        }
        Ok(())
    }

    /// Compares `hash` against the locked entry at `depth`.
    ///
    /// Pure: no state changes, regardless of outcome.
    pub fn compare(&self, depth: usize, hash: &ChainHash) -> CompareOutcome {
        match self.locked.get(depth) {
            Some(locked) if locked == hash => CompareOutcome::Match,
            Some(_) => CompareOutcome::Mismatch,
            None => CompareOutcome::NoPriorRecord,
        }
    }
}
