use proptest::prelude::*;

use super::*;

fn secret(value: &str) -> WebhookSecret {
    WebhookSecret::new(value).unwrap()
}

fn signed_headers(header_name: &str, payload: &[u8], key: &[u8]) -> Headers {
    let header = format_signature_header(&compute_signature(payload, key).unwrap());
    [(header_name.to_string(), header)].into_iter().collect()
}

// ========================================================================
// Unit tests
// ========================================================================

#[test]
fn test_verify_accepts_matching_signature() {
    let body = br#"{"zen":"Keep it logically awesome."}"#;
    let headers = signed_headers("X-Hub-Signature-256", body, b"s3cret");
    assert!(verify(&headers, body, &secret("s3cret")));
}

#[test]
fn test_verify_header_name_is_case_insensitive() {
    let body = b"payload";
    for name in ["x-hub-signature-256", "X-HUB-SIGNATURE-256", "X-Hub-Signature-256"] {
        let headers = signed_headers(name, body, b"key");
        assert!(verify(&headers, body, &secret("key")), "header name {name}");
    }
}

#[test]
fn test_verify_rejects_missing_header() {
    assert!(!verify(&Headers::new(), b"payload", &secret("key")));
}

#[test]
fn test_verify_rejects_wrong_prefix() {
    let digest = hex::encode(compute_signature(b"payload", b"key").unwrap());
    let headers: Headers = [("x-hub-signature-256", format!("sha1={digest}"))]
        .into_iter()
        .collect();
    assert!(!verify(&headers, b"payload", &secret("key")));

    let headers: Headers = [("x-hub-signature-256", digest)].into_iter().collect();
    assert!(!verify(&headers, b"payload", &secret("key")));
}

#[test]
fn test_verify_rejects_wrong_secret() {
    let headers = signed_headers(HEADER_SIGNATURE, b"payload", b"right");
    assert!(!verify(&headers, b"payload", &secret("wrong")));
}

#[test]
fn test_verify_rejects_modified_body() {
    let headers = signed_headers(HEADER_SIGNATURE, b"original", b"key");
    assert!(!verify(&headers, b"originaL", &secret("key")));
}

#[test]
fn test_malformed_header_values_return_false() {
    for value in ["", "sha256=", "sha256=zz", "sha256=abc", "not-a-signature"] {
        assert!(!verify_signature(b"payload", value, b"key"), "value {value:?}");
    }
}

#[test]
fn test_uppercase_hex_is_rejected() {
    let digest = hex::encode_upper(compute_signature(b"payload", b"key").unwrap());
    assert!(!verify_signature(b"payload", &format!("sha256={digest}"), b"key"));
    assert_eq!(parse_signature_header(&format!("sha256={digest}")), None);
}

#[test]
fn test_mixed_case_hex_is_rejected() {
    let mut digest = hex::encode(compute_signature(b"payload", b"key").unwrap());
    let first_letter = digest.find(|c: char| c.is_ascii_alphabetic()).unwrap();
    digest[first_letter..].get_mut(..1).unwrap().make_ascii_uppercase();

    assert!(!verify_signature(b"payload", &format!("sha256={digest}"), b"key"));
}

#[test]
fn test_empty_secret_is_not_a_webhook_secret() {
    assert!(WebhookSecret::new("").is_none());
}

#[test]
fn test_secret_debug_is_redacted() {
    assert_eq!(format!("{:?}", secret("hunter2")), "WebhookSecret(<redacted>)");
}

#[test]
fn test_signature_is_32_bytes() {
    assert_eq!(compute_signature(b"anything", b"key").unwrap().len(), 32);
}

// ========================================================================
// Property-based tests
// ========================================================================

proptest! {
    #[test]
    fn prop_sign_verify_roundtrip(payload: Vec<u8>, key in proptest::collection::vec(any::<u8>(), 1..64)) {
        let header = format_signature_header(&compute_signature(&payload, &key).unwrap());
        prop_assert!(verify_signature(&payload, &header, &key));
    }

    #[test]
    fn prop_flipping_one_body_byte_fails(
        payload in proptest::collection::vec(any::<u8>(), 1..256),
        index: prop::sample::Index,
        key in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let header = format_signature_header(&compute_signature(&payload, &key).unwrap());
        let mut tampered = payload.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= 0x01;
        prop_assert!(!verify_signature(&tampered, &header, &key));
    }

    #[test]
    fn prop_flipping_one_secret_byte_fails(
        payload: Vec<u8>,
        key in proptest::collection::vec(any::<u8>(), 1..64),
        index: prop::sample::Index,
    ) {
        let header = format_signature_header(&compute_signature(&payload, &key).unwrap());
        let mut other = key.clone();
        let i = index.index(other.len());
        other[i] ^= 0x80;
        prop_assert!(!verify_signature(&payload, &header, &other));
    }

    #[test]
    fn prop_arbitrary_headers_never_panic(header: String, payload: Vec<u8>) {
        let _ = verify_signature(&payload, &header, b"key");
    }
}
