//! Vault-wide security policy.
//!
//! The policy is fixed by the administrator at vault creation and
//! applies uniformly to every user: one minimum password length, one
//! key-derivation work factor, one second-factor requirement.  Uniform
//! enforcement is what prevents per-user security downgrades.

use crate::crypto::{MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::format::fec::MAX_REDUNDANCY;
use crate::vault::codec::Reader;

/// Size of the shared second-factor challenge in bytes.
pub const POLICY_CHALLENGE_LEN: usize = 64;

/// Hard floor for the minimum-password-length setting.
pub const MIN_PASSWORD_LENGTH_FLOOR: u32 = 8;

/// Ceiling for the minimum-password-length setting.
pub const MIN_PASSWORD_LENGTH_CEILING: u32 = 128;

/// Maximum number of previous passwords remembered per user.
pub const MAX_HISTORY_DEPTH: u32 = 24;

/// Serialized policy size: 1 + 4 + 4 + 1 + 4 + 64.
pub(crate) const POLICY_SERIALIZED_LEN: usize = 78;

/// Admin-controlled security settings, one per vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSecurityPolicy {
    /// If true, every user must combine a second-factor response into
    /// their KEK.  Cannot be changed after creation.
    pub require_second_factor: bool,

    /// Minimum password length in characters for all users.
    pub min_password_length: u32,

    /// PBKDF2 work factor for KEK derivation.
    pub kdf_iterations: u32,

    /// Stored header-FEC redundancy preference in percent.  Encoding
    /// always uses at least 20% regardless of this value.
    pub fec_redundancy_percent: u8,

    /// How many previous passwords to remember per user; 0 disables
    /// reuse checking.
    pub password_history_depth: u32,

    /// Shared second-factor challenge, generated at vault creation.
    /// All zero when `require_second_factor` is false.
    pub second_factor_challenge: [u8; POLICY_CHALLENGE_LEN],
}

impl Default for VaultSecurityPolicy {
    fn default() -> Self {
        Self {
            require_second_factor: false,
            min_password_length: 12,
            kdf_iterations: MIN_KDF_ITERATIONS,
            fec_redundancy_percent: 20,
            password_history_depth: 5,
            second_factor_challenge: [0u8; POLICY_CHALLENGE_LEN],
        }
    }
}

impl VaultSecurityPolicy {
    /// Validate the policy invariants.
    ///
    /// Called at vault creation; a vault is never written with a policy
    /// that fails these checks.
    pub fn validate(&self) -> Result<()> {
        if self.min_password_length < MIN_PASSWORD_LENGTH_FLOOR
            || self.min_password_length > MIN_PASSWORD_LENGTH_CEILING
        {
            return Err(VaultError::WeakPolicy(format!(
                "minimum password length must be between {MIN_PASSWORD_LENGTH_FLOOR} and {MIN_PASSWORD_LENGTH_CEILING}"
            )));
        }
        if self.kdf_iterations < MIN_KDF_ITERATIONS || self.kdf_iterations > MAX_KDF_ITERATIONS {
            return Err(VaultError::WeakPolicy(format!(
                "KDF iterations must be between {MIN_KDF_ITERATIONS} and {MAX_KDF_ITERATIONS}"
            )));
        }
        if self.fec_redundancy_percent > MAX_REDUNDANCY {
            return Err(VaultError::WeakPolicy(format!(
                "FEC redundancy must not exceed {MAX_REDUNDANCY}%"
            )));
        }
        if self.password_history_depth > MAX_HISTORY_DEPTH {
            return Err(VaultError::WeakPolicy(format!(
                "password history depth must not exceed {MAX_HISTORY_DEPTH}"
            )));
        }

        let challenge_present = self.second_factor_challenge.iter().any(|&b| b != 0);
        if self.require_second_factor && !challenge_present {
            return Err(VaultError::WeakPolicy(
                "second factor required but no challenge present".into(),
            ));
        }
        if !self.require_second_factor && challenge_present {
            return Err(VaultError::WeakPolicy(
                "challenge present but second factor not required".into(),
            ));
        }

        Ok(())
    }

    pub(crate) fn serialize(&self, buf: &mut Vec<u8>) {
        buf.push(self.require_second_factor as u8);
        buf.extend_from_slice(&self.min_password_length.to_le_bytes());
        buf.extend_from_slice(&self.kdf_iterations.to_le_bytes());
        buf.push(self.fec_redundancy_percent);
        buf.extend_from_slice(&self.password_history_depth.to_le_bytes());
        buf.extend_from_slice(&self.second_factor_challenge);
    }

    pub(crate) fn deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            require_second_factor: reader.bool()?,
            min_password_length: reader.u32()?,
            kdf_iterations: reader.u32()?,
            fec_redundancy_percent: reader.u8()?,
            password_history_depth: reader.u32()?,
            second_factor_challenge: reader.array()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        VaultSecurityPolicy::default().validate().unwrap();
    }

    #[test]
    fn low_iteration_count_rejected() {
        let policy = VaultSecurityPolicy {
            kdf_iterations: MIN_KDF_ITERATIONS - 1,
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(VaultError::WeakPolicy(_))
        ));
    }

    #[test]
    fn second_factor_flag_requires_challenge() {
        let policy = VaultSecurityPolicy {
            require_second_factor: true,
            ..Default::default()
        };
        assert!(policy.validate().is_err());

        let mut with_challenge = policy;
        with_challenge.second_factor_challenge = [0xA5; POLICY_CHALLENGE_LEN];
        with_challenge.validate().unwrap();
    }

    #[test]
    fn stray_challenge_without_flag_rejected() {
        let policy = VaultSecurityPolicy {
            second_factor_challenge: [1u8; POLICY_CHALLENGE_LEN],
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn serialize_roundtrip() {
        let policy = VaultSecurityPolicy {
            require_second_factor: true,
            min_password_length: 10,
            kdf_iterations: 250_000,
            fec_redundancy_percent: 35,
            password_history_depth: 12,
            second_factor_challenge: [0x42; POLICY_CHALLENGE_LEN],
        };

        let mut buf = Vec::new();
        policy.serialize(&mut buf);
        assert_eq!(buf.len(), POLICY_SERIALIZED_LEN);

        let mut reader = Reader::new(&buf);
        let decoded = VaultSecurityPolicy::deserialize(&mut reader).unwrap();
        assert_eq!(decoded, policy);
    }
}
