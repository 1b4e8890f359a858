//! Error types for the verification core.

use thiserror::Error;

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while verifying a peer certificate chain.
///
/// Every variant is fatal to the current handshake attempt. The transport
/// only needs the reject signal; the finer-grained variants exist for
/// logging and audit at the boundary, not for flow control.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The certificate bytes could not be parsed as X.509.
    #[error("failed parsing peer certificate: {0}")]
    CertParse(String),

    /// A verification pass presented a different certificate at a depth
    /// locked by an earlier pass of the same session.
    ///
    /// This is the chain-lock defense firing against mid-session certificate
    /// substitution. Terminal for the session; must never be downgraded.
    #[error("certificate hash at depth {depth} differs from the locked chain")]
    ChainHashMismatch {
        /// Depth at which the presented hash differs.
        depth: usize,
    },

    /// A renegotiated chain reached a depth the first handshake never locked.
    #[error("renegotiated chain grew to unlocked depth {depth}")]
    RenegotiationChainGrowth {
        /// First depth with no locked baseline.
        depth: usize,
    },

    /// Certificates were presented out of depth order.
    ///
    /// Depths must be visited contiguously from 0 (leaf) upward within one
    /// pass; anything else is a programming error in the calling library.
    #[error("certificate at depth {depth} presented out of order (expected {expected})")]
    DepthOutOfOrder {
        /// Depth the session expected next.
        expected: usize,
        /// Depth actually presented.
        depth: usize,
    },

    /// The chain is deeper than the configured maximum.
    #[error("certificate depth {depth} exceeds the configured maximum of {max}")]
    MaxDepthExceeded {
        /// Depth of the offending certificate.
        depth: usize,
        /// Configured maximum depth.
        max: usize,
    },

    /// The certificate subject name could not be materialized.
    #[error("failed rendering certificate subject: {0}")]
    SubjectUnavailable(String),

    /// The configured username field is absent from the certificate.
    #[error("username field {0:?} not found in peer certificate")]
    UsernameFieldNotFound(String),

    /// The username field is present but its value is not decodable text.
    #[error("failed decoding username field {0:?} as text")]
    UsernameDecode(String),

    /// An `ext:`-prefixed username field was configured while extension
    /// lookup is disabled.
    ///
    /// This is surfaced instead of silently falling back to a subject
    /// lookup under the prefixed name.
    #[error("username field {0:?} requires extension lookup, which is disabled")]
    ExtensionLookupDisabled(String),

    /// The caller-provided username buffer cannot hold a terminated value.
    #[error("username buffer must hold at least one byte")]
    UsernameBufferTooSmall,

    /// The session was rejected by an earlier check; a fresh connection is
    /// required.
    #[error("session is rejected; certificate verification refused")]
    SessionRejected,

    /// A session lifecycle call arrived in the wrong state.
    #[error("invalid handshake state: {0}")]
    InvalidHandshakeState(&'static str),
}
