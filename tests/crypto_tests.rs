//! Integration tests for the MultiVault crypto module.

use multivault::crypto::{
    combine_with_second_factor, derive_kek, generate_dek, generate_salt, unwrap_key, wrap_key,
    DataKey, Kek, DEK_LEN, FACTOR_RESPONSE_LEN, KEK_LEN, SALT_LEN, WRAPPED_DEK_LEN,
};
use multivault::errors::VaultError;

// A small work factor keeps these tests fast; the policy floor only
// applies to real vaults.
const TEST_ITERATIONS: u32 = 1_000;

// ---------------------------------------------------------------------------
// KEK derivation (PBKDF2-HMAC-SHA256)
// ---------------------------------------------------------------------------

#[test]
fn derive_kek_same_inputs_same_output() {
    let salt = generate_salt();

    let kek1 = derive_kek("my-secure-passphrase", &salt, TEST_ITERATIONS).expect("derive 1");
    let kek2 = derive_kek("my-secure-passphrase", &salt, TEST_ITERATIONS).expect("derive 2");

    assert_eq!(
        kek1.as_bytes(),
        kek2.as_bytes(),
        "same password + salt + iterations must produce the same KEK"
    );
}

#[test]
fn derive_kek_different_passwords_different_keys() {
    let salt = generate_salt();

    let kek1 = derive_kek("password-one", &salt, TEST_ITERATIONS).expect("derive 1");
    let kek2 = derive_kek("password-two", &salt, TEST_ITERATIONS).expect("derive 2");

    assert_ne!(kek1.as_bytes(), kek2.as_bytes());
}

#[test]
fn derive_kek_single_salt_byte_changes_output() {
    let salt = [0x42u8; SALT_LEN];
    let mut tweaked = salt;
    tweaked[SALT_LEN - 1] ^= 0x01;

    let kek1 = derive_kek("pw", &salt, TEST_ITERATIONS).expect("derive 1");
    let kek2 = derive_kek("pw", &tweaked, TEST_ITERATIONS).expect("derive 2");

    assert_ne!(
        kek1.as_bytes(),
        kek2.as_bytes(),
        "a single differing salt byte must change the KEK"
    );
}

#[test]
fn derive_kek_iteration_count_changes_output() {
    let salt = [0x42u8; SALT_LEN];

    let kek1 = derive_kek("pw", &salt, TEST_ITERATIONS).expect("derive 1");
    let kek2 = derive_kek("pw", &salt, TEST_ITERATIONS + 1).expect("derive 2");

    assert_ne!(kek1.as_bytes(), kek2.as_bytes());
}

// ---------------------------------------------------------------------------
// Key wrap / unwrap (AES-256-KW)
// ---------------------------------------------------------------------------

#[test]
fn wrap_unwrap_roundtrip_with_derived_kek() {
    let salt = generate_salt();
    let kek = derive_kek("hunter2hunter2", &salt, TEST_ITERATIONS).expect("derive");
    let dek = generate_dek();

    let wrapped = wrap_key(&kek, &dek).expect("wrap");
    assert_eq!(wrapped.len(), WRAPPED_DEK_LEN);

    let recovered = unwrap_key(&kek, &wrapped).expect("unwrap");
    assert_eq!(recovered.as_bytes(), dek.as_bytes());
}

#[test]
fn unwrap_with_different_kek_always_fails() {
    let dek = DataKey::new([0x5Au8; DEK_LEN]);

    // Try a batch of wrong keys; every single one must fail closed.
    for i in 1..=16u8 {
        let right = Kek::new([0u8; KEK_LEN]);
        let mut wrong_bytes = [0u8; KEK_LEN];
        wrong_bytes[(i as usize) % KEK_LEN] = i;
        let wrong = Kek::new(wrong_bytes);

        let wrapped = wrap_key(&right, &dek).expect("wrap");
        let result = unwrap_key(&wrong, &wrapped);
        assert!(
            matches!(result, Err(VaultError::AuthenticationFailed)),
            "wrong KEK #{i} must fail"
        );
    }
}

#[test]
fn every_wrapped_byte_is_integrity_protected() {
    let kek = Kek::new([0x77u8; KEK_LEN]);
    let dek = DataKey::new([0x88u8; DEK_LEN]);
    let wrapped = wrap_key(&kek, &dek).expect("wrap");

    for position in 0..WRAPPED_DEK_LEN {
        let mut tampered = wrapped;
        tampered[position] ^= 0x01;
        assert!(
            unwrap_key(&kek, &tampered).is_err(),
            "flipping byte {position} must be detected"
        );
    }
}

// ---------------------------------------------------------------------------
// Second-factor combination
// ---------------------------------------------------------------------------

#[test]
fn second_factor_changes_the_effective_kek() {
    let salt = generate_salt();
    let dek = generate_dek();

    let kek = derive_kek("password-only", &salt, TEST_ITERATIONS).expect("derive");
    let wrapped_password_only = wrap_key(&kek, &dek).expect("wrap");

    let mut combined = derive_kek("password-only", &salt, TEST_ITERATIONS).expect("derive");
    combine_with_second_factor(&mut combined, &[0xD7u8; FACTOR_RESPONSE_LEN]);
    let wrapped_combined = wrap_key(&combined, &dek).expect("wrap");

    // Without the factor response the combined wrap must be opaque.
    assert_ne!(wrapped_password_only, wrapped_combined);
    assert!(unwrap_key(&kek, &wrapped_combined).is_err());
    assert_eq!(
        unwrap_key(&combined, &wrapped_combined)
            .expect("unwrap")
            .as_bytes(),
        dek.as_bytes()
    );
}

#[test]
fn second_factor_leaves_trailing_kek_bytes_untouched() {
    let mut kek = Kek::new([0x10u8; KEK_LEN]);
    combine_with_second_factor(&mut kek, &[0x01u8; FACTOR_RESPONSE_LEN]);

    assert_eq!(&kek.as_bytes()[..FACTOR_RESPONSE_LEN], &[0x11u8; 20]);
    assert_eq!(
        &kek.as_bytes()[FACTOR_RESPONSE_LEN..],
        &[0x10u8; KEK_LEN - FACTOR_RESPONSE_LEN]
    );
}

// ---------------------------------------------------------------------------
// End-to-end: password -> KEK -> wrapped DEK -> unwrap
// ---------------------------------------------------------------------------

#[test]
fn full_key_hierarchy_pipeline() {
    // Step 1: a vault-wide DEK and a per-user salt.
    let dek = generate_dek();
    let salt = generate_salt();

    // Step 2: derive the user's KEK and wrap the DEK.
    let kek = derive_kek("Sup3rSecret!", &salt, TEST_ITERATIONS).expect("derive");
    let wrapped = wrap_key(&kek, &dek).expect("wrap");

    // Step 3: later, the same credential unwraps the same DEK.
    let again = derive_kek("Sup3rSecret!", &salt, TEST_ITERATIONS).expect("derive again");
    let recovered = unwrap_key(&again, &wrapped).expect("unwrap");
    assert_eq!(recovered.as_bytes(), dek.as_bytes());

    // Step 4: a typo does not.
    let wrong = derive_kek("Sup3rSecret?", &salt, TEST_ITERATIONS).expect("derive wrong");
    assert!(unwrap_key(&wrong, &wrapped).is_err());
}
