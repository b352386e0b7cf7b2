mod test_utils;

use contact_relay::{
    auth::csrf::{constant_time_eq, CsrfService},
    errors::{CsrfError, TokenPart},
};
use test_utils::{csrf_config, test_config, TEST_CSRF_SECRET};

const NOW: i64 = 1_700_000_000_000;
const ONE_HOUR_MS: i64 = 60 * 60 * 1000;

fn service() -> CsrfService {
    CsrfService::new(TEST_CSRF_SECRET)
}

#[test]
fn issued_token_verifies() {
    let csrf = service();
    let token = csrf.issue_at(NOW);

    assert_eq!(csrf.verify_at(Some(&token), NOW), Ok(()));
    assert_eq!(csrf.verify_at(Some(&token), NOW + ONE_HOUR_MS), Ok(()));
}

#[test]
fn token_has_timestamp_and_unpadded_base64url_signature() {
    let token = service().issue_at(NOW);
    let (timestamp, signature) = token.split_once('.').expect("two parts");

    assert_eq!(timestamp, NOW.to_string());
    assert_eq!(signature.len(), 43);
    assert!(!signature.contains(['+', '/', '=']));
}

#[test]
fn same_timestamp_gives_same_token() {
    let csrf = service();
    assert_eq!(csrf.issue_at(NOW), csrf.issue_at(NOW));
    assert_ne!(csrf.issue_at(NOW), csrf.issue_at(NOW + 1));
}

#[test]
fn token_older_than_an_hour_is_expired() {
    let csrf = service();
    let token = csrf.issue_at(NOW - ONE_HOUR_MS - 1);

    assert_eq!(csrf.verify_at(Some(&token), NOW), Err(CsrfError::Expired));
}

#[test]
fn expiry_is_checked_before_signature() {
    let csrf = service();
    let token = format!("{}.not-a-real-signature", NOW - 2 * ONE_HOUR_MS);

    assert_eq!(csrf.verify_at(Some(&token), NOW), Err(CsrfError::Expired));
}

#[test]
fn missing_or_empty_token_is_rejected() {
    let csrf = service();

    assert_eq!(csrf.verify_at(None, NOW), Err(CsrfError::MissingToken));
    assert_eq!(csrf.verify_at(Some(""), NOW), Err(CsrfError::MissingToken));
}

#[test]
fn wrong_number_of_parts_is_malformed() {
    let csrf = service();

    for token in ["1700000000000", "1700000000000.abc.def", "a.b.c.d"] {
        assert_eq!(
            csrf.verify_at(Some(token), NOW),
            Err(CsrfError::MalformedToken(TokenPart::Format)),
            "token: {token}"
        );
    }
}

#[test]
fn non_numeric_timestamp_is_malformed() {
    let csrf = service();

    for token in ["not-a-number.signature", ".signature", "12ab.signature"] {
        assert_eq!(
            csrf.verify_at(Some(token), NOW),
            Err(CsrfError::MalformedToken(TokenPart::Timestamp)),
            "token: {token}"
        );
    }
}

#[test]
fn altered_signature_is_rejected() {
    let csrf = service();
    let token = csrf.issue_at(NOW);
    let (timestamp, signature) = token.split_once('.').unwrap();

    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}.{}", timestamp, chars.into_iter().collect::<String>());

    assert_eq!(csrf.verify_at(Some(&tampered), NOW), Err(CsrfError::InvalidSignature));
}

#[test]
fn altered_timestamp_is_rejected() {
    let csrf = service();
    let token = csrf.issue_at(NOW);
    let signature = token.split_once('.').unwrap().1;
    let moved = format!("{}.{}", NOW + 1000, signature);

    assert_eq!(csrf.verify_at(Some(&moved), NOW + 1000), Err(CsrfError::InvalidSignature));
}

#[test]
fn token_from_another_secret_is_rejected() {
    let other = CsrfService::new("another_secret_that_is_also_long_enough_99");
    let token = other.issue_at(NOW);

    assert_eq!(service().verify_at(Some(&token), NOW), Err(CsrfError::InvalidSignature));
}

#[test]
fn client_messages_match_failure() {
    assert_eq!(CsrfError::MissingToken.to_string(), "Missing CSRF token");
    assert_eq!(CsrfError::Expired.to_string(), "CSRF token expired");
    assert_eq!(CsrfError::InvalidSignature.to_string(), "Invalid CSRF token");
    assert_eq!(
        CsrfError::MalformedToken(TokenPart::Format).to_string(),
        "Invalid CSRF token format"
    );
    assert_eq!(
        CsrfError::MalformedToken(TokenPart::Timestamp).to_string(),
        "Invalid CSRF token timestamp"
    );
}

#[test]
fn constant_time_eq_compares_content_and_length() {
    assert!(constant_time_eq(b"", b""));
    assert!(constant_time_eq(b"signature", b"signature"));
    assert!(!constant_time_eq(b"signature", b"signaturf"));
    assert!(!constant_time_eq(b"signature", b"Signature"));
    assert!(!constant_time_eq(b"short", b"longer"));
}

#[test]
fn debug_output_hides_key() {
    let debug = format!("{:?}", service());
    assert!(!debug.contains(TEST_CSRF_SECRET));
    assert!(debug.contains("REDACTED"));
}

#[test]
fn service_exists_only_with_a_configured_secret() {
    assert!(CsrfService::from_config(&test_config()).is_none());
    assert!(CsrfService::from_config(&csrf_config()).is_some());

    let blank = contact_relay::settings::AppConfig {
        csrf_secret: Some("   ".to_string()),
        ..test_config()
    };
    assert!(CsrfService::from_config(&blank).is_none());
}

#[test]
fn any_secret_length_signs_tokens() {
    for secret in ["k", "a-secret-well-beyond-the-sha256-block-size-of-sixty-four-bytes-0123456789"] {
        let csrf = CsrfService::new(secret);
        let token = csrf.issue_at(NOW);
        assert_eq!(csrf.verify_at(Some(&token), NOW), Ok(()));
    }
}
