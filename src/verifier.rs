//! Per-certificate verification policy orchestration.

use crate::backend::X509Backend;
use crate::error::{Error, Result};
use crate::identity::{IdentityExtractor, PeerIdentity};
use crate::ledger::CompareOutcome;
use crate::policy::{RenegotiationGrowth, VerifyPolicy};
use crate::prelude::{debug, error, warn};
use crate::session::Session;
use rustls_pki_types::CertificateDer;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Applies per-depth verification policy during a TLS handshake.
///
/// The surrounding TLS library must call [`Verifier::verify_cert`] once per
/// certificate of the peer chain, leaf first (depth 0), in strictly
/// increasing depth order, and [`Session::complete_handshake`] once the
/// chain is exhausted. The verifier layers application policy on top of the
/// library's standard chain-of-trust validation; it does not replace it.
///
/// One verifier serves any number of concurrent sessions; all per-connection
/// state lives in the [`Session`].
#[derive(Clone)]
pub struct Verifier {
    backend: Arc<dyn X509Backend>,
    extractor: IdentityExtractor,
    policy: VerifyPolicy,
}

impl Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").field("policy", &self.policy).finish()
    }
}

impl Verifier {
    /// Creates a verifier over `backend` applying `policy`.
    pub fn new(backend: Arc<dyn X509Backend>, policy: VerifyPolicy) -> Self {
        let extractor = IdentityExtractor::new(Arc::clone(&backend), policy.extension_lookup());
        Self {
            backend,
            extractor,
            policy,
        }
    }

    /// The identity extractor sharing this verifier's backend and
    /// extension-lookup configuration.
    pub fn extractor(&self) -> &IdentityExtractor {
        &self.extractor
    }

    /// The policy this verifier applies.
    pub fn policy(&self) -> &VerifyPolicy {
        &self.policy
    }

    /// Verifies one certificate of the peer chain.
    ///
    /// The certificate hash is recorded in the session ledger before any
    /// policy decision, so rejected certificates remain observable. On the
    /// first failing check the session transitions to
    /// [`crate::SessionState::Rejected`] and the error is returned; the
    /// caller must abort the handshake and not present further certificates.
    ///
    /// For the leaf (depth 0) the subject and the configured username field
    /// are extracted and stored as the session's [`PeerIdentity`]; failure to
    /// extract either is a rejection cause.
    ///
    /// # Errors
    ///
    /// Any [`Error`] documented on the error type; all are fatal to the
    /// current handshake attempt.
    pub fn verify_cert(
        &self,
        session: &mut Session,
        cert: &CertificateDer<'_>,
        depth: usize,
    ) -> Result<()> {
        session.begin_depth(depth)?;

        // Locking state is recorded for every certificate, accepted or not.
        let hash = self.backend.cert_digest(cert);
        if !session.established() {
            session.remember_hash(depth, hash)?;
        } else {
            match session.ledger().compare(depth, &hash) {
                CompareOutcome::Match => {}
                CompareOutcome::Mismatch => {
                    session.reject();
                    error!("peer certificate at depth {depth} differs from the locked chain, terminating session");
                    return Err(Error::ChainHashMismatch { depth });
                }
                CompareOutcome::NoPriorRecord => match self.policy.renegotiation_growth() {
                    RenegotiationGrowth::Reject => {
                        session.reject();
                        warn!("renegotiated chain grew to unlocked depth {depth}, rejecting");
                        return Err(Error::RenegotiationChainGrowth { depth });
                    }
                    RenegotiationGrowth::Extend => session.remember_hash(depth, hash)?,
                },
            }
        }

        if let Some(max) = self.policy.max_depth() {
            if depth > max {
                session.reject();
                warn!("certificate depth {depth} exceeds configured maximum {max}, rejecting");
                return Err(Error::MaxDepthExceeded { depth, max });
            }
        }

        if depth == 0 {
            let identity = match self.leaf_identity(cert) {
                Ok(identity) => identity,
                Err(e) => {
                    session.reject();
                    warn!("leaf identity extraction failed: {e}");
                    return Err(e);
                }
            };
            debug!("accepted leaf certificate, subject {:?}", identity.subject);
            session.set_identity(identity);
        } else {
            debug!("accepted chain certificate at depth {depth}");
        }

        Ok(())
    }

    fn leaf_identity(&self, cert: &CertificateDer<'_>) -> Result<PeerIdentity> {
        let subject = self.extractor.subject(cert)?;
        let mut buf = vec![0u8; self.policy.username_capacity()];
        let written = self
            .extractor
            .username(&mut buf, self.policy.username_field(), cert)?;
        let username = std::str::from_utf8(&buf[..written])
            .map_err(|_| Error::UsernameDecode(self.policy.username_field().to_owned()))?
            .to_owned();
        Ok(PeerIdentity { subject, username })
    }
}
