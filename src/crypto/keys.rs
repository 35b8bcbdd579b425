//! Key material wrappers and secure random generation.
//!
//! `Kek` (Key Encryption Key) and `DataKey` (Data Encryption Key, DEK)
//! wrap their 32 raw bytes and zero them when dropped, so key material
//! cannot linger in memory after use.  The free functions generate
//! cryptographically secure random material for salts, keys, and
//! second-factor challenges.

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::kdf::{KEK_LEN, SALT_LEN};

/// Length of the Data Encryption Key in bytes (256 bits).
pub const DEK_LEN: usize = 32;

/// Length of a per-user second-factor challenge in bytes.
pub const USER_CHALLENGE_LEN: usize = 32;

/// A Key Encryption Key derived from a user credential.
///
/// Wraps/unwraps the vault DEK and nothing else.  Zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Kek {
    bytes: [u8; KEK_LEN],
}

impl Kek {
    /// Create a `Kek` from raw derived bytes.
    pub fn new(bytes: [u8; KEK_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to feed the AES-KW cipher).
    pub fn as_bytes(&self) -> &[u8; KEK_LEN] {
        &self.bytes
    }

    /// Mutable access for in-place second-factor combination.
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; KEK_LEN] {
        &mut self.bytes
    }
}

/// The vault's Data Encryption Key.
///
/// Generated once at vault creation and never serialized in the clear;
/// each key slot stores an independently wrapped copy of the same DEK.
/// Zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DataKey {
    bytes: [u8; DEK_LEN],
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataKey").finish_non_exhaustive()
    }
}

impl DataKey {
    /// Create a `DataKey` from raw bytes.
    pub fn new(bytes: [u8; DEK_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; DEK_LEN] {
        &self.bytes
    }
}

/// Generate `n` cryptographically secure random bytes.
pub fn generate_random(n: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Generate a random 32-byte salt for key derivation.
///
/// Each key slot must have its own salt so two users with the same
/// password still derive different KEKs.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Generate a fresh random DEK.  Called exactly once per vault.
pub fn generate_dek() -> DataKey {
    let mut bytes = [0u8; DEK_LEN];
    rand::rng().fill_bytes(&mut bytes);
    let dek = DataKey::new(bytes);
    bytes.zeroize();
    dek
}

/// Generate a random per-user second-factor challenge.
pub fn generate_challenge() -> [u8; USER_CHALLENGE_LEN] {
    let mut challenge = [0u8; USER_CHALLENGE_LEN];
    rand::rng().fill_bytes(&mut challenge);
    challenge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_random_respects_length() {
        assert_eq!(generate_random(0).len(), 0);
        assert_eq!(generate_random(17).len(), 17);
    }

    #[test]
    fn fresh_keys_differ() {
        // Two fresh DEKs colliding would mean the RNG is broken.
        let a = generate_dek();
        let b = generate_dek();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn fresh_salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
