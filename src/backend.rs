//! Backend capability interface over the underlying crypto library.
//!
//! The verification core never parses DER itself; everything it needs from a
//! certificate goes through [`X509Backend`]. One implementation exists per
//! underlying crypto library ([`crate::X509ParserBackend`] is the bundled
//! one), and the verifier, ledger and extractor depend only on the trait.

use crate::error::Result;
use crate::ledger::ChainHash;
use rustls_pki_types::CertificateDer;

/// Library-specific certificate operations consumed by the verification core.
///
/// Certificate handles are borrowed for the duration of a single call;
/// implementations must not retain them. Any caching of parsed state must be
/// scoped per certificate, never process-wide.
///
/// Implementations must be thread-safe: one backend instance is shared by
/// every session of a verifier.
pub trait X509Backend: Send + Sync {
    /// Renders the certificate subject as a canonical string
    /// (`"C=.., O=.., CN=.."`).
    ///
    /// The returned string is freshly allocated and owned by the caller.
    ///
    /// # Errors
    ///
    /// [`crate::Error::CertParse`] if the certificate cannot be parsed,
    /// [`crate::Error::SubjectUnavailable`] if the subject cannot be rendered.
    fn subject(&self, cert: &CertificateDer<'_>) -> Result<String>;

    /// Returns the value of the named subject DN attribute, or `None` when
    /// the attribute is absent.
    ///
    /// Attribute names are short or long form (`"CN"`, `"commonName"`, ...)
    /// or a dotted-decimal OID string. When the subject carries the attribute
    /// more than once, the first value wins.
    ///
    /// # Errors
    ///
    /// [`crate::Error::CertParse`] on parse failure,
    /// [`crate::Error::UsernameDecode`] when the attribute value is not text.
    fn subject_attribute(&self, cert: &CertificateDer<'_>, attr: &str) -> Result<Option<String>>;

    /// Returns the text value of the named X.509 extension, or `None` when
    /// the extension is absent.
    ///
    /// `"subjectAltName"` selects the first rfc822Name entry of the SAN;
    /// other extensions are named by dotted-decimal OID and must carry a
    /// single ASN.1 string value.
    ///
    /// # Errors
    ///
    /// [`crate::Error::CertParse`] on parse failure,
    /// [`crate::Error::UsernameDecode`] when the extension value cannot be
    /// decoded as text.
    fn extension_text(&self, cert: &CertificateDer<'_>, name: &str) -> Result<Option<String>>;

    /// Computes the chain-locking digest over the certificate's DER encoding.
    fn cert_digest(&self, cert: &CertificateDer<'_>) -> ChainHash;
}
