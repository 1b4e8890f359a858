//! Identity extraction against real DER certificates.

use rcgen::{CertificateParams, CustomExtension, DnType, KeyPair, SanType};
use rustls_pki_types::CertificateDer;
use std::sync::Arc;
use tunnel_verify::{Error, IdentityExtractor, X509ParserBackend};

const ACME_USERNAME_OID: &[u64] = &[1, 3, 6, 1, 4, 1, 28459, 1];

fn issue(params: CertificateParams) -> CertificateDer<'static> {
    let key = KeyPair::generate().expect("key generation should succeed");
    params
        .self_signed(&key)
        .expect("self-signing should succeed")
        .der()
        .clone()
}

fn cert_with_cn(cn: &str) -> CertificateDer<'static> {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, cn);
    issue(params)
}

fn extractor(extension_lookup: bool) -> IdentityExtractor {
    IdentityExtractor::new(Arc::new(X509ParserBackend::new()), extension_lookup)
}

#[test]
fn subject_is_owned_and_canonical() {
    let cert = cert_with_cn("alice");
    let subject = extractor(false).subject(&cert).unwrap();
    assert!(subject.contains("CN=alice"), "got {subject:?}");
}

#[test]
fn username_from_common_name() {
    let cert = cert_with_cn("alice");
    let mut buf = [0u8; 32];
    let n = extractor(false).username(&mut buf, "CN", &cert).unwrap();
    assert_eq!(&buf[..n], b"alice");
    assert_eq!(buf[n], 0);
}

#[test]
fn username_truncates_into_four_byte_buffer() {
    let cert = cert_with_cn("alice");

    // Canary bytes past the handed window must stay untouched.
    let mut buf = [0xAAu8; 6];
    let n = extractor(false)
        .username(&mut buf[..4], "CN", &cert)
        .unwrap();
    assert_eq!(n, 3);
    assert_eq!(&buf[..3], b"ali");
    assert_eq!(buf[3], 0);
    assert_eq!(&buf[4..], [0xAA, 0xAA]);
}

#[test]
fn absent_field_everywhere_is_not_found() {
    let cert = cert_with_cn("alice");
    let mut buf = [0u8; 32];

    let err = extractor(true)
        .username(&mut buf, "OU", &cert)
        .unwrap_err();
    assert!(matches!(err, Error::UsernameFieldNotFound(f) if f == "OU"));

    let err = extractor(true)
        .username(&mut buf, "ext:1.3.6.1.4.1.28459.1", &cert)
        .unwrap_err();
    assert!(matches!(err, Error::UsernameFieldNotFound(_)));
}

#[test]
fn extension_marker_fails_while_lookup_disabled() {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, "alice");
    params.subject_alt_names = vec![SanType::Rfc822Name(
        "alice@example.org".try_into().expect("valid rfc822 name"),
    )];
    let cert = issue(params);

    let mut buf = [0u8; 64];
    let err = extractor(false)
        .username(&mut buf, "ext:subjectAltName", &cert)
        .unwrap_err();
    assert!(matches!(err, Error::ExtensionLookupDisabled(_)));
}

#[test]
fn username_from_san_email_extension() {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, "alice");
    params.subject_alt_names = vec![SanType::Rfc822Name(
        "alice@example.org".try_into().expect("valid rfc822 name"),
    )];
    let cert = issue(params);

    let mut buf = [0u8; 64];
    let n = extractor(true)
        .username(&mut buf, "ext:subjectAltName", &cert)
        .unwrap();
    assert_eq!(&buf[..n], b"alice@example.org");
}

#[test]
fn username_from_custom_extension_by_oid() {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, "alice");
    // UTF8String "carol" as the extension value.
    let mut content = vec![0x0c, 0x05];
    content.extend_from_slice(b"carol");
    params
        .custom_extensions
        .push(CustomExtension::from_oid_content(ACME_USERNAME_OID, content));
    let cert = issue(params);

    let mut buf = [0u8; 64];
    let n = extractor(true)
        .username(&mut buf, "ext:1.3.6.1.4.1.28459.1", &cert)
        .unwrap();
    assert_eq!(&buf[..n], b"carol");
}
