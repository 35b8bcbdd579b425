//! Cryptographic primitives for MultiVault.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key-encryption-key derivation (`kdf`)
//! - AES-256-KW authenticated key wrapping and second-factor
//!   combination (`wrap`)
//! - AES-256-GCM payload encryption and decryption (`encryption`)
//! - Zeroizing key wrappers and secure random generation (`keys`)
//! - Password-history hashing for reuse prevention (`history`)
//!
//! Everything here is pure and stateless: no function retains key
//! material, and all of them are safe to call from any thread.

pub mod encryption;
pub mod history;
pub mod kdf;
pub mod keys;
pub mod wrap;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_kek, wrap_key, unwrap_key, ...};
pub use encryption::{decrypt, encrypt, IV_LEN, PAYLOAD_SALT_LEN};
pub use history::{hash_password, is_password_reused, push_history, PasswordHistoryEntry};
pub use kdf::{derive_kek, KEK_LEN, MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS, SALT_LEN};
pub use keys::{
    generate_challenge, generate_dek, generate_random, generate_salt, DataKey, Kek, DEK_LEN,
    USER_CHALLENGE_LEN,
};
pub use wrap::{
    combine_with_second_factor, unwrap_key, wrap_key, FACTOR_RESPONSE_LEN, WRAPPED_DEK_LEN,
};
