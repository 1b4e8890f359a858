//! Default backend over `x509-parser`.

use crate::backend::X509Backend;
use crate::error::{Error, Result};
use crate::ledger::{ChainHash, CHAIN_HASH_LEN};
use ring::digest;
use rustls_pki_types::CertificateDer;
use x509_parser::certificate::X509Certificate;
use x509_parser::nom::Err;
use x509_parser::prelude::GeneralName;

/// Dotted OID of the commonName attribute (2.5.4.3) and friends.
mod oid {
    pub(super) const COMMON_NAME: &str = "2.5.4.3";
    pub(super) const COUNTRY: &str = "2.5.4.6";
    pub(super) const LOCALITY: &str = "2.5.4.7";
    pub(super) const STATE_OR_PROVINCE: &str = "2.5.4.8";
    pub(super) const ORGANIZATION: &str = "2.5.4.10";
    pub(super) const ORGANIZATIONAL_UNIT: &str = "2.5.4.11";
    pub(super) const EMAIL_ADDRESS: &str = "1.2.840.113549.1.9.1";
}

/// [`X509Backend`] implementation backed by `x509-parser`, with SHA-256
/// chain digests.
///
/// Stateless: every call parses the handed certificate and drops the parse
/// when it returns. Nothing is cached process-wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct X509ParserBackend;

impl X509ParserBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

fn parse(der: &[u8]) -> Result<X509Certificate<'_>> {
    match x509_parser::parse_x509_certificate(der) {
        Ok((_, cert)) => Ok(cert),
        Err(Err::Incomplete(_)) => Err(Error::CertParse("truncated certificate".to_owned())),
        Err(Err::Error(e) | Err::Failure(e)) => Err(Error::CertParse(e.to_string())),
    }
}

/// Maps a DN attribute name (short or long form, or already a dotted OID)
/// to its dotted OID. Unknown non-OID names map to `None`.
fn attribute_oid(attr: &str) -> Option<&str> {
    match attr {
        "CN" | "commonName" => Some(oid::COMMON_NAME),
        "C" | "countryName" => Some(oid::COUNTRY),
        "L" | "localityName" => Some(oid::LOCALITY),
        "ST" | "stateOrProvinceName" => Some(oid::STATE_OR_PROVINCE),
        "O" | "organizationName" => Some(oid::ORGANIZATION),
        "OU" | "organizationalUnitName" => Some(oid::ORGANIZATIONAL_UNIT),
        "emailAddress" => Some(oid::EMAIL_ADDRESS),
        other if is_dotted_oid(other) => Some(other),
        _ => None,
    }
}

fn is_dotted_oid(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
}

/// Decodes a DER string value (UTF8String, IA5String, PrintableString).
fn decode_string_value(value: &[u8]) -> Option<String> {
    let (_, obj) = x509_parser::der_parser::parse_der(value).ok()?;
    obj.as_str().ok().map(str::to_owned)
}

impl X509Backend for X509ParserBackend {
    fn subject(&self, cert: &CertificateDer<'_>) -> Result<String> {
        let x509 = parse(cert.as_ref())?;
        Ok(x509.subject().to_string())
    }

    fn subject_attribute(&self, cert: &CertificateDer<'_>, attr: &str) -> Result<Option<String>> {
        let x509 = parse(cert.as_ref())?;
        let Some(wanted) = attribute_oid(attr) else {
            return Ok(None);
        };
        for rdn in x509.subject().iter() {
            for value in rdn.iter() {
                if value.attr_type().to_id_string() == wanted {
                    return match value.as_str() {
                        Ok(s) => Ok(Some(s.to_owned())),
                        Err(_) => Err(Error::UsernameDecode(attr.to_owned())),
                    };
                }
            }
        }
        Ok(None)
    }

    fn extension_text(&self, cert: &CertificateDer<'_>, name: &str) -> Result<Option<String>> {
        let x509 = parse(cert.as_ref())?;

        if name == "subjectAltName" {
            // The rfc822Name entry carries the username.
            let san = x509
                .subject_alternative_name()
                .map_err(|e| Error::CertParse(e.to_string()))?;
            if let Some(san) = san {
                for entry in &san.value.general_names {
                    if let GeneralName::RFC822Name(mail) = entry {
                        return Ok(Some((*mail).to_owned()));
                    }
                }
            }
            return Ok(None);
        }

        if !is_dotted_oid(name) {
            return Ok(None);
        }
        for ext in x509.extensions() {
            if ext.oid.to_id_string() == name {
                return match decode_string_value(ext.value) {
                    Some(s) => Ok(Some(s)),
                    None => Err(Error::UsernameDecode(name.to_owned())),
                };
            }
        }
        Ok(None)
    }

    fn cert_digest(&self, cert: &CertificateDer<'_>) -> ChainHash {
        let digest = digest::digest(&digest::SHA256, cert.as_ref());
        let mut bytes = [0u8; CHAIN_HASH_LEN];
        bytes.copy_from_slice(digest.as_ref());
        ChainHash::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, CustomExtension, DnType, KeyPair, SanType};

    const ACME_USERNAME_OID: &[u64] = &[1, 3, 6, 1, 4, 1, 28459, 1];

    fn leaf_params(cn: &str) -> CertificateParams {
        let mut params = CertificateParams::default();
        params.distinguished_name.push(DnType::CommonName, cn);
        params
            .distinguished_name
            .push(DnType::OrganizationName, "Acme Tunnels");
        params
    }

    fn issue(params: CertificateParams) -> CertificateDer<'static> {
        let key = KeyPair::generate().expect("key generation should succeed");
        let cert = params
            .self_signed(&key)
            .expect("self-signing should succeed");
        cert.der().clone()
    }

    #[test]
    fn subject_renders_dn() {
        let der = issue(leaf_params("alice"));
        let subject = X509ParserBackend::new().subject(&der).unwrap();
        assert!(subject.contains("CN=alice"), "got {subject:?}");
        assert!(subject.contains("O=Acme Tunnels"), "got {subject:?}");
    }

    #[test]
    fn subject_attribute_short_and_long_names() {
        let der = issue(leaf_params("alice"));
        let backend = X509ParserBackend::new();
        assert_eq!(
            backend.subject_attribute(&der, "CN").unwrap().as_deref(),
            Some("alice")
        );
        assert_eq!(
            backend
                .subject_attribute(&der, "commonName")
                .unwrap()
                .as_deref(),
            Some("alice")
        );
        assert_eq!(
            backend.subject_attribute(&der, "O").unwrap().as_deref(),
            Some("Acme Tunnels")
        );
        // Dotted-OID names address the same attributes.
        assert_eq!(
            backend
                .subject_attribute(&der, "2.5.4.3")
                .unwrap()
                .as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn absent_attribute_is_none() {
        let der = issue(leaf_params("alice"));
        let backend = X509ParserBackend::new();
        assert_eq!(backend.subject_attribute(&der, "OU").unwrap(), None);
        assert_eq!(backend.subject_attribute(&der, "no-such-attr").unwrap(), None);
    }

    #[test]
    fn san_email_extension() {
        let mut params = leaf_params("alice");
        params.subject_alt_names = vec![SanType::Rfc822Name(
            "alice@example.org".try_into().expect("valid rfc822 name"),
        )];
        let der = issue(params);

        let backend = X509ParserBackend::new();
        assert_eq!(
            backend
                .extension_text(&der, "subjectAltName")
                .unwrap()
                .as_deref(),
            Some("alice@example.org")
        );
    }

    #[test]
    fn custom_extension_by_dotted_oid() {
        let mut params = leaf_params("alice");
        // UTF8String "carol" as the extension value.
        let mut content = vec![0x0c, 0x05];
        content.extend_from_slice(b"carol");
        params
            .custom_extensions
            .push(CustomExtension::from_oid_content(ACME_USERNAME_OID, content));
        let der = issue(params);

        let backend = X509ParserBackend::new();
        assert_eq!(
            backend
                .extension_text(&der, "1.3.6.1.4.1.28459.1")
                .unwrap()
                .as_deref(),
            Some("carol")
        );
    }

    #[test]
    fn absent_extension_is_none() {
        let der = issue(leaf_params("alice"));
        let backend = X509ParserBackend::new();
        assert_eq!(backend.extension_text(&der, "subjectAltName").unwrap(), None);
        assert_eq!(
            backend.extension_text(&der, "1.3.6.1.4.1.28459.1").unwrap(),
            None
        );
    }

    #[test]
    fn digest_is_deterministic_and_content_bound() {
        let der_a = issue(leaf_params("alice"));
        let der_b = issue(leaf_params("alice"));
        let backend = X509ParserBackend::new();

        assert_eq!(backend.cert_digest(&der_a), backend.cert_digest(&der_a));
        // Distinct certificates (fresh keys) hash differently.
        assert_ne!(backend.cert_digest(&der_a), backend.cert_digest(&der_b));
    }

    #[test]
    fn garbage_der_is_a_parse_error() {
        let der = CertificateDer::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let backend = X509ParserBackend::new();
        assert!(matches!(backend.subject(&der), Err(Error::CertParse(_))));
        assert!(matches!(
            backend.subject_attribute(&der, "CN"),
            Err(Error::CertParse(_))
        ));
    }

    #[test]
    fn dotted_oid_recognition() {
        assert!(is_dotted_oid("2.5.4.3"));
        assert!(is_dotted_oid("1.3.6.1.4.1.28459.1"));
        assert!(!is_dotted_oid(""));
        assert!(!is_dotted_oid("CN"));
        assert!(!is_dotted_oid("2..5"));
        assert!(!is_dotted_oid("2.5."));
    }
}
