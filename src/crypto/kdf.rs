//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every user credential is stretched into a 32-byte Key Encryption Key
//! (KEK) with a per-user random salt and a vault-wide iteration count
//! (the work factor stored in the vault header).  The derivation is
//! deliberately slow; callers should run it off any interactive thread.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::crypto::keys::Kek;
use crate::errors::{Result, VaultError};

/// Length of the per-user salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived KEK in bytes (256 bits, for AES-256-KW).
pub const KEK_LEN: usize = 32;

/// Minimum safe PBKDF2 iteration count.
///
/// Vault policies below this floor are rejected at creation time.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Maximum accepted PBKDF2 iteration count.
pub const MAX_KDF_ITERATIONS: u32 = 1_000_000;

/// Derive a 32-byte KEK from a password, salt, and iteration count.
///
/// The derivation is pure: the same password + salt + iterations always
/// produce the same KEK, and any differing input byte changes the output.
/// Only `iterations == 0` is rejected — enforcing the policy floor is the
/// caller's job, since authentication must honour whatever work factor
/// the vault was created with.
pub fn derive_kek(password: &str, salt: &[u8; SALT_LEN], iterations: u32) -> Result<Kek> {
    if iterations == 0 {
        return Err(VaultError::CryptoFailure(
            "PBKDF2 iteration count must be at least 1".into(),
        ));
    }

    let mut kek = [0u8; KEK_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut kek);

    Ok(Kek::new(kek))
}
