//! AES-256-GCM authenticated encryption for the bulk payload.
//!
//! The vault's account data is encrypted under the DEK with a 12-byte
//! IV that is stored next to the ciphertext in the file (see the
//! payload layout in `vault::manager`).  The IV is passed in explicitly
//! so the caller controls where it lives on disk; it must be fresh for
//! every encryption under the same key.
//!
//! Layout of the returned ciphertext: [ ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::crypto::keys::DataKey;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM IV in bytes.
pub const IV_LEN: usize = 12;

/// Size of the payload salt stored in front of the IV.
///
/// Not consumed by this module; part of the on-disk payload contract.
pub const PAYLOAD_SALT_LEN: usize = 32;

/// Encrypt `plaintext` under the DEK with the given IV.
pub fn encrypt(dek: &DataKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(dek.as_bytes())
        .map_err(|e| VaultError::CryptoFailure(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|e| VaultError::CryptoFailure(format!("encryption error: {e}")))
}

/// Decrypt data produced by [`encrypt`], verifying the auth tag.
pub fn decrypt(dek: &DataKey, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(dek.as_bytes())
        .map_err(|_| VaultError::DecryptionFailed)?;

    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| VaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::DEK_LEN;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let dek = DataKey::new([0xAB; DEK_LEN]);
        let iv = [0x01; IV_LEN];
        let plaintext = b"account records";

        let ciphertext = encrypt(&dek, &iv, plaintext).unwrap();
        // Ciphertext carries a 16-byte tag.
        assert_eq!(ciphertext.len(), plaintext.len() + 16);

        let recovered = decrypt(&dek, &iv, &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let dek = DataKey::new([0x11; DEK_LEN]);
        let wrong = DataKey::new([0x22; DEK_LEN]);
        let iv = [0x01; IV_LEN];

        let ciphertext = encrypt(&dek, &iv, b"data").unwrap();
        assert!(decrypt(&wrong, &iv, &ciphertext).is_err());
    }

    #[test]
    fn decrypt_with_wrong_iv_fails() {
        let dek = DataKey::new([0x11; DEK_LEN]);
        let ciphertext = encrypt(&dek, &[0x01; IV_LEN], b"data").unwrap();
        assert!(decrypt(&dek, &[0x02; IV_LEN], &ciphertext).is_err());
    }

    #[test]
    fn decrypt_with_corrupted_ciphertext_fails() {
        let dek = DataKey::new([0x33; DEK_LEN]);
        let iv = [0x04; IV_LEN];
        let mut ciphertext = encrypt(&dek, &iv, b"data").unwrap();
        ciphertext[0] ^= 0xFF;
        assert!(decrypt(&dek, &iv, &ciphertext).is_err());
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        // A freshly created vault has an empty payload.
        let dek = DataKey::new([0x55; DEK_LEN]);
        let iv = [0x06; IV_LEN];
        let ciphertext = encrypt(&dek, &iv, &[]).unwrap();
        assert_eq!(decrypt(&dek, &iv, &ciphertext).unwrap(), Vec::<u8>::new());
    }
}
