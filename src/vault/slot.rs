//! Key slots: the per-user unit of the multi-user architecture.
//!
//! Each enrolled user owns one slot holding their KDF salt and their
//! independently wrapped copy of the vault DEK.  Removing a user
//! deactivates the slot and zero-fills it in place; the roster never
//! shrinks, so slot indices stay stable across saves.

use serde::Serialize;

use crate::crypto::{PasswordHistoryEntry, SALT_LEN, USER_CHALLENGE_LEN, WRAPPED_DEK_LEN};
use crate::errors::{Result, VaultError};
use crate::vault::codec::Reader;

/// Maximum username length in bytes (UTF-8).
pub const MAX_USERNAME_LEN: usize = 255;

/// User role for vault access control.
///
/// A closed set checked explicitly at each operation's entry:
/// administrators manage the roster, standard users do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    StandardUser,
    Administrator,
}

impl UserRole {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::StandardUser => 0,
            Self::Administrator => 1,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::StandardUser),
            1 => Ok(Self::Administrator),
            other => Err(VaultError::InvalidFormat(format!(
                "unknown user role {other}"
            ))),
        }
    }
}

/// One user's key slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySlot {
    /// Inactive slots are zero-filled placeholders awaiting reuse.
    pub active: bool,

    /// Unique username, matched exactly during authentication.
    pub username: String,

    /// Per-user random salt for KEK derivation.
    pub salt: [u8; SALT_LEN],

    /// The vault DEK wrapped under this user's KEK (AES-256-KW).
    pub wrapped_dek: [u8; WRAPPED_DEK_LEN],

    /// The user's role.
    pub role: UserRole,

    /// Force a password change on next login (temporary passwords).
    pub must_change_password: bool,

    /// When the password was last changed (Unix seconds); 0 marks a
    /// temporary password that the user has not yet replaced.
    pub password_changed_at: i64,

    /// Last successful login (Unix seconds); 0 if never.
    pub last_login_at: i64,

    /// Whether this user has enrolled a second-factor device.
    pub second_factor_enrolled: bool,

    /// Per-user second-factor challenge; zeroed unless enrolled.
    pub second_factor_challenge: [u8; USER_CHALLENGE_LEN],

    /// Hashes of previous passwords, oldest first.
    pub password_history: Vec<PasswordHistoryEntry>,
}

impl KeySlot {
    /// An inactive, zero-filled slot.
    pub fn empty() -> Self {
        Self {
            active: false,
            username: String::new(),
            salt: [0u8; SALT_LEN],
            wrapped_dek: [0u8; WRAPPED_DEK_LEN],
            role: UserRole::StandardUser,
            must_change_password: false,
            password_changed_at: 0,
            last_login_at: 0,
            second_factor_enrolled: false,
            second_factor_challenge: [0u8; USER_CHALLENGE_LEN],
            password_history: Vec::new(),
        }
    }

    /// Deactivate the slot, zero-filling every field so no credential
    /// material of the removed user survives in the header.
    pub fn deactivate(&mut self) {
        *self = Self::empty();
    }

    /// Clear second-factor enrollment (used by admin password reset:
    /// the administrator does not hold the user's device).
    pub fn clear_second_factor(&mut self) {
        self.second_factor_enrolled = false;
        self.second_factor_challenge = [0u8; USER_CHALLENGE_LEN];
    }

    pub(crate) fn serialize(&self, buf: &mut Vec<u8>) {
        buf.push(self.active as u8);
        debug_assert!(self.username.len() <= MAX_USERNAME_LEN);
        buf.push(self.username.len() as u8);
        buf.extend_from_slice(self.username.as_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.wrapped_dek);
        buf.push(self.role.as_u8());
        buf.push(self.must_change_password as u8);
        buf.extend_from_slice(&self.password_changed_at.to_le_bytes());
        buf.extend_from_slice(&self.last_login_at.to_le_bytes());
        buf.push(self.second_factor_enrolled as u8);
        buf.extend_from_slice(&self.second_factor_challenge);
        debug_assert!(self.password_history.len() <= u8::MAX as usize);
        buf.push(self.password_history.len() as u8);
        for entry in &self.password_history {
            buf.extend_from_slice(&entry.timestamp.to_le_bytes());
            buf.extend_from_slice(&entry.salt);
            buf.extend_from_slice(&entry.hash);
        }
    }

    pub(crate) fn deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        let active = reader.bool()?;

        let username_len = reader.u8()? as usize;
        let username = String::from_utf8(reader.bytes(username_len)?.to_vec())
            .map_err(|_| VaultError::InvalidFormat("username is not valid UTF-8".into()))?;

        let salt = reader.array()?;
        let wrapped_dek = reader.array()?;
        let role = UserRole::from_u8(reader.u8()?)?;
        let must_change_password = reader.bool()?;
        let password_changed_at = reader.i64()?;
        let last_login_at = reader.i64()?;
        let second_factor_enrolled = reader.bool()?;
        let second_factor_challenge = reader.array()?;

        let history_len = reader.u8()? as usize;
        let mut password_history = Vec::with_capacity(history_len);
        for _ in 0..history_len {
            password_history.push(PasswordHistoryEntry {
                timestamp: reader.i64()?,
                salt: reader.array()?,
                hash: reader.array()?,
            });
        }

        Ok(Self {
            active,
            username,
            salt,
            wrapped_dek,
            role,
            must_change_password,
            password_changed_at,
            last_login_at,
            second_factor_enrolled,
            second_factor_challenge,
            password_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slot() -> KeySlot {
        KeySlot {
            active: true,
            username: "alice".into(),
            salt: [0x11; SALT_LEN],
            wrapped_dek: [0x22; WRAPPED_DEK_LEN],
            role: UserRole::Administrator,
            must_change_password: true,
            password_changed_at: 1_700_000_000,
            last_login_at: 1_700_000_100,
            second_factor_enrolled: true,
            second_factor_challenge: [0x33; USER_CHALLENGE_LEN],
            password_history: vec![PasswordHistoryEntry {
                timestamp: 1_699_999_999,
                salt: [0x44; SALT_LEN],
                hash: [0x55; 48],
            }],
        }
    }

    #[test]
    fn serialize_roundtrip() {
        let slot = sample_slot();
        let mut buf = Vec::new();
        slot.serialize(&mut buf);

        let mut reader = Reader::new(&buf);
        let decoded = KeySlot::deserialize(&mut reader).unwrap();
        assert_eq!(reader.pos(), buf.len());
        assert_eq!(decoded, slot);
    }

    #[test]
    fn deactivate_zero_fills() {
        let mut slot = sample_slot();
        slot.deactivate();

        assert!(!slot.active);
        assert!(slot.username.is_empty());
        assert_eq!(slot.wrapped_dek, [0u8; WRAPPED_DEK_LEN]);
        assert_eq!(slot.salt, [0u8; SALT_LEN]);
        assert!(slot.password_history.is_empty());
        assert!(!slot.second_factor_enrolled);
    }

    #[test]
    fn truncated_slot_rejected() {
        let slot = sample_slot();
        let mut buf = Vec::new();
        slot.serialize(&mut buf);
        buf.truncate(buf.len() - 10);

        let mut reader = Reader::new(&buf);
        assert!(KeySlot::deserialize(&mut reader).is_err());
    }

    #[test]
    fn bad_role_byte_rejected() {
        let mut buf = Vec::new();
        sample_slot().serialize(&mut buf);
        // Role byte sits after active(1) + len(1) + username(5) + salt(32) + wrapped(40).
        buf[1 + 1 + 5 + SALT_LEN + WRAPPED_DEK_LEN] = 9;

        let mut reader = Reader::new(&buf);
        assert!(KeySlot::deserialize(&mut reader).is_err());
    }
}
