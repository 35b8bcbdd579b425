//! Password-history hashing for reuse prevention.
//!
//! Each key slot keeps a FIFO ring of previous-password hashes so a
//! user cannot rotate back to a recent password.  Entries store a
//! PBKDF2-HMAC-SHA512 hash under a per-entry random salt; comparison is
//! constant-time.  The iteration count is higher than KEK derivation
//! because these hashes are pure storage — they are never derived on
//! the authentication path.

use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::kdf::SALT_LEN;
use crate::crypto::keys::generate_salt;

/// Length of a stored password hash in bytes.
pub const HISTORY_HASH_LEN: usize = 48;

/// PBKDF2-HMAC-SHA512 iteration count for history hashes.
pub const HISTORY_ITERATIONS: u32 = 600_000;

/// Serialized size of one history entry: 8 (timestamp) + 32 (salt) + 48 (hash).
pub const HISTORY_ENTRY_LEN: usize = 8 + SALT_LEN + HISTORY_HASH_LEN;

/// One previous-password record.  The hash is zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PasswordHistoryEntry {
    /// When the password was set (Unix epoch seconds).
    #[zeroize(skip)]
    pub timestamp: i64,

    /// Per-entry random salt.
    #[zeroize(skip)]
    pub salt: [u8; SALT_LEN],

    /// PBKDF2-HMAC-SHA512 hash of the password.
    pub hash: [u8; HISTORY_HASH_LEN],
}

/// Hash a password into a fresh history entry with a random salt.
pub fn hash_password(password: &str) -> PasswordHistoryEntry {
    let salt = generate_salt();
    let hash = hash_with_salt(password, &salt);

    PasswordHistoryEntry {
        timestamp: Utc::now().timestamp(),
        salt,
        hash,
    }
}

/// Check whether `password` matches any entry in `history`.
///
/// Re-derives the hash under every entry's salt and compares in
/// constant time, so the comparison leaks nothing about stored hashes.
pub fn is_password_reused(password: &str, history: &[PasswordHistoryEntry]) -> bool {
    let mut reused = false;
    for entry in history {
        let mut candidate = hash_with_salt(password, &entry.salt);
        // Accumulate instead of early-returning; cost is dominated by
        // the derivations anyway.
        reused |= bool::from(candidate.ct_eq(&entry.hash));
        candidate.zeroize();
    }
    reused
}

/// Append an entry, evicting the oldest while over `depth` (FIFO).
pub fn push_history(history: &mut Vec<PasswordHistoryEntry>, entry: PasswordHistoryEntry, depth: u32) {
    if depth == 0 {
        return;
    }
    history.push(entry);
    while history.len() > depth as usize {
        history.remove(0);
    }
}

fn hash_with_salt(password: &str, salt: &[u8; SALT_LEN]) -> [u8; HISTORY_HASH_LEN] {
    let mut hash = [0u8; HISTORY_HASH_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, HISTORY_ITERATIONS, &mut hash);
    hash
}
