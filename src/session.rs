//! Per-connection verification session state.

use crate::error::{Error, Result};
use crate::identity::PeerIdentity;
use crate::ledger::{ChainHash, ChainHashLedger};

/// Lifecycle of a session's verification passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No verification pass has started yet.
    Init,
    /// A pass is in progress: certificates are being presented depth by depth.
    Verifying,
    /// The last pass accepted the full chain.
    Established,
    /// A check failed. Terminal: the peer must open a fresh connection.
    Rejected,
}

/// State for one TLS connection attempt, including its renegotiations.
///
/// Created when the handshake starts and dropped at connection teardown;
/// never shared between connections. The embedded [`ChainHashLedger`] is
/// what locks the certificate chain for the lifetime of the session.
///
/// A session is driven from a single execution context. If a transport ever
/// drives renegotiation concurrently with other session access, the caller
/// must serialize; the session provides no internal locking.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    established: bool,
    ledger: ChainHashLedger,
    /// Depths seen in the current pass; doubles as the next expected depth.
    pass_depths: usize,
    identity: Option<PeerIdentity>,
}

impl Session {
    /// Creates a fresh session with an empty ledger.
    pub fn new() -> Self {
        Self {
            state: SessionState::Init,
            established: false,
            ledger: ChainHashLedger::new(),
            pass_depths: 0,
            identity: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the first handshake has completed. Once set, every further
    /// pass is a renegotiation and is held against the locked chain.
    pub fn established(&self) -> bool {
        self.established
    }

    /// Identity extracted from the leaf certificate.
    ///
    /// Meaningful once the session is [`SessionState::Established`]; during a
    /// pass it reflects the leaf of that (not yet accepted) pass.
    pub fn peer_identity(&self) -> Option<&PeerIdentity> {
        self.identity.as_ref()
    }

    /// Read access to the chain-hash ledger.
    pub fn ledger(&self) -> &ChainHashLedger {
        &self.ledger
    }

    /// Records a certificate hash for chain locking.
    ///
    /// Must be called for every certificate in a verification pass, whether
    /// the certificate is ultimately accepted or not, so that rejected
    /// attempts stay observable. [`crate::Verifier::verify_cert`] does this
    /// itself; the entry point exists for callers hashing certificates
    /// through a different code path.
    ///
    /// # Errors
    ///
    /// [`Error::DepthOutOfOrder`] when `depth` would leave a gap in the
    /// ledger.
    pub fn remember_hash(&mut self, depth: usize, hash: ChainHash) -> Result<()> {
        self.ledger.remember(depth, hash)
    }

    /// Completes the current verification pass.
    ///
    /// On success the session is [`SessionState::Established`] and later
    /// passes count as renegotiations. A renegotiated pass must have
    /// re-presented every locked depth: a chain shorter than the baseline is
    /// treated as a substitution attempt and rejects the session.
    ///
    /// # Errors
    ///
    /// [`Error::SessionRejected`] on a rejected session,
    /// [`Error::InvalidHandshakeState`] when no pass is in progress,
    /// [`Error::ChainHashMismatch`] when a renegotiated chain came up short.
    pub fn complete_handshake(&mut self) -> Result<()> {
        match self.state {
            SessionState::Verifying => {}
            SessionState::Rejected => return Err(Error::SessionRejected),
            SessionState::Init | SessionState::Established => {
                return Err(Error::InvalidHandshakeState(
                    "complete_handshake requires a verification pass in progress",
                ))
            }
        }
        if self.established && self.pass_depths < self.ledger.len() {
            self.state = SessionState::Rejected;
            return Err(Error::ChainHashMismatch {
                depth: self.pass_depths,
            });
        }
        self.state = SessionState::Established;
        self.established = true;
        Ok(())
    }

    /// Opens a pass (at depth 0) or advances it, enforcing contiguous depth
    /// order. Any violation rejects the session.
    pub(crate) fn begin_depth(&mut self, depth: usize) -> Result<()> {
        match self.state {
            SessionState::Rejected => return Err(Error::SessionRejected),
            SessionState::Init | SessionState::Established => {
                if depth != 0 {
                    self.state = SessionState::Rejected;
                    return Err(Error::DepthOutOfOrder { expected: 0, depth });
                }
                self.state = SessionState::Verifying;
                self.pass_depths = 0;
            }
            SessionState::Verifying => {}
        }
        if depth != self.pass_depths {
            let expected = self.pass_depths;
            self.state = SessionState::Rejected;
            return Err(Error::DepthOutOfOrder { expected, depth });
        }
        self.pass_depths = depth + 1;
        Ok(())
    }

    pub(crate) fn reject(&mut self) {
        self.state = SessionState::Rejected;
    }

    pub(crate) fn set_identity(&mut self, identity: PeerIdentity) {
        self.identity = Some(identity);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
