//! Integration tests for signed-params.
//!
//! These tests exercise the public API end to end: signing, verifying,
//! tamper detection, configuration loading and codec properties.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use signed_params::codec;
use signed_params::error::EncodeErrorKind;
use signed_params::config::Settings;
use signed_params::signature::hex_digest;
use signed_params::{DigestAlgorithm, FixedClock, ForgeryKind, Signer, SigningError, Value};

const SECRET: &str = "0123456789abcdef0123456789abcdef";
const NOW: i64 = 1329942896;

fn signer_at(now: i64) -> Signer<FixedClock> {
    Signer::new(SECRET).with_clock(FixedClock(now))
}

#[test]
fn test_transaction_fixture() {
    let token = signer_at(NOW)
        .sign(json!({
            "account": {"account_code": "123"},
            "transaction": {"amount_in_cents": 5000, "currency": "USD"},
        }))
        .unwrap();

    let (digest, canonical) = token.split_once('|').unwrap();
    assert_eq!(
        canonical,
        "account[account_code]=123&timestamp=1329942896&transaction[amount_in_cents]=5000&transaction[currency]=USD"
    );
    assert_eq!(
        digest,
        hex_digest(DigestAlgorithm::Sha1, SECRET.as_bytes(), canonical)
    );
    assert_eq!(digest, "5dcbd65498c62c552a6f78edfb117cada8cb4f00");
}

#[test]
fn test_verify_fixture_window() {
    let token = "c595b8093d7c1549fff7c418dcda80a310b35bc2|account[account_code]=112358132134&timestamp=1329942996";

    let data = signer_at(NOW).verify(token).unwrap();
    assert_eq!(
        data.get_path(&["account", "account_code"])
            .and_then(Value::as_str),
        Some("112358132134")
    );

    let err = signer_at(1329946597).verify(token).unwrap_err();
    assert!(err.is_too_old());
    assert!(err.is_forgery());
}

#[test]
fn test_round_trip_adds_timestamp() {
    let input = json!({
        "account": {"account_code": "acct-1", "first_name": "Zo\u{eb}", "email": "z@example.com"},
        "subscription": {"plan_code": "gold", "quantity": 3, "add_ons": ["a", "b"]},
        "billing_info": {"address1": "1 Main St & 2nd", "zip": "94110"},
    });
    let signer = signer_at(NOW);
    let data = signer.verify(&signer.sign(input).unwrap()).unwrap();

    assert_eq!(
        data.to_json(),
        json!({
            "account": {"account_code": "acct-1", "first_name": "Zo\u{eb}", "email": "z@example.com"},
            "subscription": {"plan_code": "gold", "quantity": "3", "add_ons": ["a", "b"]},
            "billing_info": {"address1": "1 Main St & 2nd", "zip": "94110"},
            "timestamp": "1329942896",
        })
    );
}

#[test]
fn test_tampering_any_character_is_detected() {
    let signer = signer_at(NOW);
    let token = signer
        .sign(json!({"account": {"account_code": "123"}, "amount": 10}))
        .unwrap();

    for (idx, original) in token.char_indices() {
        if original == '|' {
            continue;
        }
        let replacement = if original == '0' { '1' } else { '0' };
        let mut tampered = token.clone();
        tampered.replace_range(idx..idx + original.len_utf8(), &replacement.to_string());

        let err = signer.verify(&tampered).unwrap_err();
        assert!(
            matches!(
                err,
                SigningError::Forgery {
                    kind: ForgeryKind::SignatureMismatch
                }
            ),
            "tampered token accepted or misreported at {}: {}",
            idx,
            err
        );
    }
}

#[test]
fn test_appended_or_truncated_payload_rejected() {
    let signer = signer_at(NOW);
    let token = signer.sign(json!({"a": "1"})).unwrap();

    assert!(signer.verify(&format!("{}&admin=1", token)).unwrap_err().is_forgery());
    assert!(signer.verify(&token[..token.len() - 1]).unwrap_err().is_forgery());
    assert!(signer
        .verify(token.split('|').next().unwrap())
        .unwrap_err()
        .is_forgery());
}

#[test]
fn test_verify_fully_escaped_wire_keys() {
    let canonical = "account%5Baccount_code%5D=112358132134&timestamp=1329942996";
    let digest = hex_digest(DigestAlgorithm::Sha1, SECRET.as_bytes(), canonical);

    let data = signer_at(NOW)
        .verify(&format!("{}|{}", digest, canonical))
        .unwrap();
    assert_eq!(
        data.to_json(),
        json!({"account": {"account_code": "112358132134"}, "timestamp": "1329942996"})
    );
}

#[test]
fn test_sign_rejects_empty_keys() {
    let signer = signer_at(NOW);
    for payload in [json!({"": "lost"}), json!({"a": {"": "x"}})] {
        let err = signer.sign(payload).unwrap_err();
        assert!(
            matches!(
                err,
                SigningError::Encode {
                    kind: EncodeErrorKind::EmptyKey { .. }
                }
            ),
            "unexpected error: {}",
            err
        );
    }
}

#[test]
fn test_secret_sensitivity() {
    let data = json!({"account": {"account_code": "123"}});
    let a = signer_at(NOW).sign(data.clone()).unwrap();
    let b = Signer::new("another secret")
        .with_clock(FixedClock(NOW))
        .sign(data)
        .unwrap();

    assert_ne!(a.split('|').next(), b.split('|').next());
    assert_eq!(a.split('|').nth(1), b.split('|').nth(1));

    let wrong = Signer::new("another secret").with_clock(FixedClock(NOW));
    assert!(wrong.verify(&a).unwrap_err().is_forgery());
}

#[test]
fn test_unconfigured_signer() {
    let signer = Signer::unconfigured();
    assert!(matches!(
        signer.sign(json!({"a": "1"})),
        Err(SigningError::Config { .. })
    ));
    assert!(matches!(
        signer.verify("deadbeef|a=1"),
        Err(SigningError::Config { .. })
    ));
}

#[test]
fn test_signer_from_settings_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let key_path = temp_dir.path().join("private.key");
    std::fs::write(&key_path, format!("{}\n", SECRET)).expect("Failed to write key");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&key_path, std::fs::Permissions::from_mode(0o600))
            .expect("Failed to set key permissions");
    }

    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[signing]\nprivate_key_path = \"{}\"\n\n[logging]\nlevel = \"warn\"\n",
            key_path.display()
        ),
    )
    .expect("Failed to write config");

    let settings = Settings::load(&config_path).expect("Failed to load settings");
    let signer = Signer::from_config(&settings.signing)
        .expect("Failed to build signer")
        .with_clock(FixedClock(NOW));

    assert!(signer.is_configured());
    assert_eq!(
        signer.sign(json!({"account": {"account_code": "123"}})).unwrap(),
        "1934b44c3fba8b6da31c16032f07ecaa24496267|account[account_code]=123&timestamp=1329942896"
    );
}

#[test]
fn test_settings_without_key_fail_at_call_time() {
    let settings = Settings::from_toml("[signing]\nalgorithm = \"sha256\"\n").unwrap();
    let signer = Signer::from_config(&settings.signing).unwrap();
    assert!(!signer.is_configured());
    assert!(signer.sign(json!({})).unwrap_err().is_config());
}

#[test]
fn test_missing_config_file() {
    let err = Settings::load("/nonexistent/signed-params/config.toml").unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
#[allow(deprecated)]
fn test_legacy_helpers_match_sign() {
    let signer = signer_at(NOW);
    assert_eq!(
        signer.sign_subscription("gold", Some("123")).unwrap(),
        signer
            .sign(json!({
                "account": {"account_code": "123"},
                "subscription": {"plan_code": "gold"},
            }))
            .unwrap()
    );

    let token = signer.sign_transaction(5000, None, Some("123")).unwrap();
    let params = Value::from(json!({"signature": token}));
    let data = signer.verify_transaction(&params).unwrap();
    assert_eq!(
        data.get_path(&["transaction", "currency"]),
        Some(&Value::from("USD"))
    );
}

#[test]
fn test_concurrent_verification() {
    let signer = std::sync::Arc::new(signer_at(NOW));
    let token = signer.sign(json!({"a": "1"})).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let signer = std::sync::Arc::clone(&signer);
            let token = token.clone();
            std::thread::spawn(move || signer.verify(&token).is_ok())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

/// Keys that never collide with the reserved timestamp key. Brackets are
/// left out: inside a name they read back as path structure.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_ &=%+]{0,8}".prop_filter("reserved", |k| k != "timestamp")
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    "[ -~\u{e9}\u{20ac}]{0,12}".prop_map(Value::Scalar)
}

/// Nested values the decoder rebuilds exactly: no empty containers and no
/// sequences of mappings.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = scalar_strategy();
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(scalar_strategy(), 1..4).prop_map(Value::Sequence),
            prop::collection::btree_map(key_strategy(), inner, 1..4).prop_map(Value::Mapping),
        ]
    })
}

fn payload_strategy() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 1..5)
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(payload in payload_strategy()) {
        let value = Value::Mapping(payload);
        let encoded = codec::encode(&value).unwrap();
        prop_assert_eq!(codec::decode(&encoded).unwrap(), value);
    }

    #[test]
    fn prop_sign_then_verify(payload in payload_strategy()) {
        let signer = signer_at(NOW);
        let token = signer.sign(Value::Mapping(payload.clone())).unwrap();
        let data = signer.verify(&token).unwrap();

        let mut expected = payload;
        expected.insert("timestamp".to_string(), Value::from(NOW));
        prop_assert_eq!(data, Value::Mapping(expected));
    }
}
