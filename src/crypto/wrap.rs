//! AES-256-KW key wrapping (RFC 3394 / NIST SP 800-38F).
//!
//! The vault's DEK is wrapped with each user's KEK.  The wrapped output
//! is 40 bytes: the 32-byte DEK plus an 8-byte integrity block, so a
//! wrong KEK or a tampered slot makes `unwrap_key` fail closed — there
//! is no way to unwrap garbage silently.
//!
//! Wrapping is deterministic (no IV), which keeps key-slot bytes stable
//! across saves as long as the credential does not change.

use aes_kw::KekAes256;
use zeroize::Zeroize;

use crate::crypto::keys::{DataKey, Kek, DEK_LEN};
use crate::errors::{Result, VaultError};

/// Size of a wrapped DEK in bytes (32-byte key + 8-byte integrity block).
pub const WRAPPED_DEK_LEN: usize = DEK_LEN + 8;

/// Size of a second-factor challenge response in bytes (HMAC-SHA1).
pub const FACTOR_RESPONSE_LEN: usize = 20;

/// Wrap the DEK with a KEK using AES-256-KW.
///
/// Deterministic: the same KEK + DEK always produce the same 40 bytes.
pub fn wrap_key(kek: &Kek, dek: &DataKey) -> Result<[u8; WRAPPED_DEK_LEN]> {
    let cipher = kw_cipher(kek)?;

    let mut wrapped = [0u8; WRAPPED_DEK_LEN];
    cipher
        .wrap(dek.as_bytes(), &mut wrapped)
        .map_err(|e| VaultError::CryptoFailure(format!("key wrap failed: {e}")))?;

    Ok(wrapped)
}

/// Unwrap a DEK using a KEK, verifying the integrity block.
///
/// Fails with the uniform [`VaultError::AuthenticationFailed`] for any
/// wrong KEK or altered ciphertext — deterministically, every time.
pub fn unwrap_key(kek: &Kek, wrapped: &[u8; WRAPPED_DEK_LEN]) -> Result<DataKey> {
    let cipher = kw_cipher(kek)?;

    let mut dek_bytes = [0u8; DEK_LEN];
    if cipher.unwrap(wrapped, &mut dek_bytes).is_err() {
        dek_bytes.zeroize();
        return Err(VaultError::AuthenticationFailed);
    }

    let dek = DataKey::new(dek_bytes);
    dek_bytes.zeroize();
    Ok(dek)
}

fn kw_cipher(kek: &Kek) -> Result<KekAes256> {
    KekAes256::try_from(&kek.as_bytes()[..])
        .map_err(|e| VaultError::CryptoFailure(format!("KEK init failed: {e}")))
}

/// Combine a KEK with a second-factor challenge response in place.
///
/// XORs the 20-byte response into the leading bytes of the KEK; the
/// trailing 12 bytes are untouched.  Both the password and the factor
/// device are then required to reproduce the final KEK.  XOR is its own
/// inverse, so enrollment and authentication use the same call.
pub fn combine_with_second_factor(kek: &mut Kek, response: &[u8; FACTOR_RESPONSE_LEN]) {
    let bytes = kek.as_bytes_mut();
    for (kek_byte, response_byte) in bytes.iter_mut().zip(response.iter()) {
        *kek_byte ^= response_byte;
    }
}
