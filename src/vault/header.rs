//! The multi-user (version 2) vault header.
//!
//! Security policy plus the full key-slot roster.  This structure is
//! what the error-corrected container in `format` protects: losing it
//! means losing every user's authentication material, which is why the
//! FEC floor exists.

use crate::errors::{Result, VaultError};
use crate::vault::codec::Reader;
use crate::vault::policy::VaultSecurityPolicy;
use crate::vault::slot::{KeySlot, UserRole};

/// Maximum number of key slots per vault (matches LUKS2).
pub const MAX_KEY_SLOTS: usize = 32;

/// Security policy and key slots for one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultHeaderV2 {
    pub policy: VaultSecurityPolicy,
    pub slots: Vec<KeySlot>,
}

impl VaultHeaderV2 {
    pub fn new(policy: VaultSecurityPolicy) -> Self {
        Self {
            policy,
            slots: Vec::new(),
        }
    }

    /// Index of the active slot with exactly this username.
    pub fn find_active_slot(&self, username: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.active && slot.username == username)
    }

    /// Number of active administrator slots.
    ///
    /// The engine refuses any roster change that would drive this to
    /// zero while the vault is open.
    pub fn active_admin_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.active && slot.role == UserRole::Administrator)
            .count()
    }

    /// First inactive slot available for reuse.
    pub fn free_slot_index(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.active)
    }

    /// Iterate over active slots.
    pub fn active_slots(&self) -> impl Iterator<Item = &KeySlot> {
        self.slots.iter().filter(|slot| slot.active)
    }

    pub(crate) fn serialize(&self) -> Result<Vec<u8>> {
        if self.slots.len() > MAX_KEY_SLOTS {
            return Err(VaultError::MaxUsersReached);
        }

        let mut buf = Vec::with_capacity(4096);
        self.policy.serialize(&mut buf);
        buf.push(self.slots.len() as u8);
        for slot in &self.slots {
            slot.serialize(&mut buf);
        }
        Ok(buf)
    }

    pub(crate) fn deserialize(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let policy = VaultSecurityPolicy::deserialize(&mut reader)?;

        let slot_count = reader.u8()? as usize;
        if slot_count > MAX_KEY_SLOTS {
            return Err(VaultError::InvalidFormat(format!(
                "slot count {slot_count} exceeds maximum {MAX_KEY_SLOTS}"
            )));
        }

        let mut slots = Vec::with_capacity(slot_count);
        for _ in 0..slot_count {
            slots.push(KeySlot::deserialize(&mut reader)?);
        }

        if reader.pos() != data.len() {
            return Err(VaultError::InvalidFormat(
                "trailing bytes after last key slot".into(),
            ));
        }

        Ok(Self { policy, slots })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{SALT_LEN, USER_CHALLENGE_LEN, WRAPPED_DEK_LEN};

    fn slot(username: &str, role: UserRole, active: bool) -> KeySlot {
        KeySlot {
            active,
            username: username.into(),
            salt: [1; SALT_LEN],
            wrapped_dek: [2; WRAPPED_DEK_LEN],
            role,
            must_change_password: false,
            password_changed_at: 100,
            last_login_at: 200,
            second_factor_enrolled: false,
            second_factor_challenge: [0; USER_CHALLENGE_LEN],
            password_history: Vec::new(),
        }
    }

    fn sample_header() -> VaultHeaderV2 {
        let mut header = VaultHeaderV2::new(VaultSecurityPolicy::default());
        header.slots.push(slot("admin", UserRole::Administrator, true));
        header.slots.push(slot("bob", UserRole::StandardUser, true));
        header.slots.push(KeySlot::empty());
        header
    }

    #[test]
    fn serialize_roundtrip() {
        let header = sample_header();
        let bytes = header.serialize().unwrap();
        let decoded = VaultHeaderV2::deserialize(&bytes).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn lookup_skips_inactive_slots() {
        let mut header = sample_header();
        assert_eq!(header.find_active_slot("bob"), Some(1));

        header.slots[1].deactivate();
        assert_eq!(header.find_active_slot("bob"), None);
        // The freed slot is now available for reuse.
        assert_eq!(header.free_slot_index(), Some(1));
    }

    #[test]
    fn admin_count_ignores_inactive_admins() {
        let mut header = sample_header();
        header.slots.push(slot("root", UserRole::Administrator, false));
        assert_eq!(header.active_admin_count(), 1);
    }

    #[test]
    fn trailing_garbage_rejected() {
        let mut bytes = sample_header().serialize().unwrap();
        bytes.push(0xFF);
        assert!(VaultHeaderV2::deserialize(&bytes).is_err());
    }

    #[test]
    fn oversized_slot_count_rejected() {
        let mut header = VaultHeaderV2::new(VaultSecurityPolicy::default());
        for _ in 0..=MAX_KEY_SLOTS {
            header.slots.push(KeySlot::empty());
        }
        assert!(header.serialize().is_err());
    }
}
