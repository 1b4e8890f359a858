//! Identity extraction from the peer's leaf certificate.

use crate::backend::X509Backend;
use crate::error::{Error, Result};
use rustls_pki_types::CertificateDer;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Field-name prefix selecting X.509-extension lookup instead of the
/// subject DN.
pub const EXTENSION_PREFIX: &str = "ext:";

/// Identity authenticated by the leaf certificate, handed to downstream
/// authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity {
    /// Canonical subject name rendering (`"C=.., O=.., CN=.."`).
    pub subject: String,
    /// Value of the configured username field.
    pub username: String,
}

/// Extracts subject and username fields from a single certificate.
///
/// Subject and extension fields are attacker-controlled input; the username
/// path therefore copies through a caller-bounded buffer and never writes an
/// unbounded length.
#[derive(Clone)]
pub struct IdentityExtractor {
    backend: Arc<dyn X509Backend>,
    extension_lookup: bool,
}

impl Debug for IdentityExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityExtractor")
            .field("extension_lookup", &self.extension_lookup)
            .finish()
    }
}

impl IdentityExtractor {
    /// Creates an extractor over `backend`.
    ///
    /// `extension_lookup` gates the `ext:` field-name prefix; see
    /// [`Self::username`].
    pub fn new(backend: Arc<dyn X509Backend>, extension_lookup: bool) -> Self {
        Self {
            backend,
            extension_lookup,
        }
    }

    /// Renders the certificate's subject name.
    ///
    /// The returned string is freshly allocated and exclusively owned by the
    /// caller; the extractor retains nothing from the certificate handle.
    ///
    /// # Errors
    ///
    /// [`Error::CertParse`] or [`Error::SubjectUnavailable`] when the subject
    /// cannot be materialized.
    pub fn subject(&self, cert: &CertificateDer<'_>) -> Result<String> {
        self.backend.subject(cert)
    }

    /// Copies the value of the named identity field into `buf`.
    ///
    /// Never writes past the buffer. The copy is always NUL-terminated, and
    /// a value longer than the buffer holds is truncated at a UTF-8
    /// character boundary. Truncation alone is not an error. Returns the
    /// number of value bytes written, terminator excluded.
    ///
    /// A `field` carrying the `ext:` prefix selects X.509-extension lookup,
    /// which must have been enabled at construction; a prefixed field while
    /// lookup is disabled fails with [`Error::ExtensionLookupDisabled`]
    /// rather than falling back to a subject lookup.
    ///
    /// # Errors
    ///
    /// [`Error::UsernameBufferTooSmall`] for an empty buffer,
    /// [`Error::UsernameFieldNotFound`] when the field is absent,
    /// [`Error::UsernameDecode`] when its value is not decodable text,
    /// [`Error::ExtensionLookupDisabled`] on the configuration mismatch
    /// above, and [`Error::CertParse`] for unparseable certificates.
    pub fn username(
        &self,
        buf: &mut [u8],
        field: &str,
        cert: &CertificateDer<'_>,
    ) -> Result<usize> {
        if buf.is_empty() {
            return Err(Error::UsernameBufferTooSmall);
        }
        let value = self.lookup(field, cert)?;
        Ok(copy_terminated(buf, &value))
    }

    fn lookup(&self, field: &str, cert: &CertificateDer<'_>) -> Result<String> {
        match field.strip_prefix(EXTENSION_PREFIX) {
            Some(ext_name) => {
                if !self.extension_lookup {
                    return Err(Error::ExtensionLookupDisabled(field.to_owned()));
                }
                self.backend
                    .extension_text(cert, ext_name)?
                    .ok_or_else(|| Error::UsernameFieldNotFound(field.to_owned()))
            }
            None => self
                .backend
                .subject_attribute(cert, field)?
                .ok_or_else(|| Error::UsernameFieldNotFound(field.to_owned())),
        }
    }
}

/// Copies `value` into `buf` (len >= 1), truncating at a character boundary
/// and reserving the last written byte for the NUL terminator. Returns the
/// count of value bytes written.
fn copy_terminated(buf: &mut [u8], value: &str) -> usize {
    let cap = buf.len() - 1;
    let mut end = value.len().min(cap);
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    buf[..end].copy_from_slice(&value.as_bytes()[..end]);
    buf[end] = 0;
    end
}
