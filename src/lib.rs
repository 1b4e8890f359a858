#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

//! # tunnel-verify
//!
//! `tunnel-verify` is the per-certificate decision core of a TLS tunnel. For
//! every certificate a peer presents during a handshake it decides accept or
//! reject, locks the session to the certificate chain observed at the first
//! handshake (rejecting any renegotiation that substitutes a certificate at
//! a locked depth), and extracts the authorization identity from the leaf
//! certificate's subject or a named X.509 extension.
//!
//! The crate sits **above** a generic X.509/TLS library: ASN.1 parsing and
//! standard chain-of-trust validation (signatures, expiry, revocation) stay
//! with that library, which calls [`Verifier::verify_cert`] back once per
//! certificate, leaf first (depth 0), in strictly increasing depth order.
//! Library-specific certificate access goes through the [`X509Backend`]
//! trait; [`X509ParserBackend`] is the bundled implementation.
//!
//! All per-connection state lives in a [`Session`], which is owned by one
//! connection and dropped with it: the chain lock never persists across
//! connections.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tunnel_verify::{CertificateDer, Session, Verifier, VerifyPolicy, X509ParserBackend};
//!
//! # fn example(chain: Vec<CertificateDer<'static>>) -> tunnel_verify::Result<()> {
//! let verifier = Verifier::new(
//!     Arc::new(X509ParserBackend::new()),
//!     VerifyPolicy::new("CN").with_max_depth(8),
//! );
//!
//! let mut session = Session::new();
//! for (depth, cert) in chain.iter().enumerate() {
//!     verifier.verify_cert(&mut session, cert, depth)?;
//! }
//! session.complete_handshake()?;
//!
//! let identity = session.peer_identity().expect("leaf was verified");
//! println!("peer authenticated as {}", identity.username);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! * `logging` (default): emit decisions through the `log` crate
//! * `tracing`: emit decisions through `tracing` instead

pub mod backend;

mod error;
mod identity;
mod ledger;
mod observability;
mod policy;
mod prelude;
mod session;
mod verifier;
mod x509;

// Public re-exports
pub use backend::X509Backend;
pub use error::{Error, Result};
pub use identity::{IdentityExtractor, PeerIdentity, EXTENSION_PREFIX};
pub use ledger::{ChainHash, ChainHashLedger, CompareOutcome, CHAIN_HASH_LEN};
pub use policy::{RenegotiationGrowth, VerifyPolicy, DEFAULT_USERNAME_CAPACITY};
pub use session::{Session, SessionState};
pub use verifier::Verifier;
pub use x509::X509ParserBackend;

// The certificate handle type handed through the verification callbacks.
pub use rustls_pki_types::CertificateDer;
