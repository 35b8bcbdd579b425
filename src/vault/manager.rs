//! The vault authentication engine.
//!
//! `VaultManager` owns everything that exists only while a vault is
//! open: the parsed header, the encrypted bulk payload, the one
//! unwrapped DEK, and the current session.  It moves through three
//! states:
//!
//! ```text
//! Closed ──open/create──▶ Open/Unauthenticated ──authenticate──▶ Open/Authenticated
//!    ▲                                                                │
//!    └────────────────────────── close ──────────────────────────────┘
//! ```
//!
//! One manager per vault file; callers serialize access.  The DEK is
//! never handed out by reference — only sessions and decrypted payload
//! bytes leave this type, and the DEK is zeroed on close, on
//! authentication failure, and on drop.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{
    self, combine_with_second_factor, derive_kek, encryption, unwrap_key, wrap_key, DataKey,
    FACTOR_RESPONSE_LEN, IV_LEN, PAYLOAD_SALT_LEN, SALT_LEN, WRAPPED_DEK_LEN,
};
use crate::errors::{Result, VaultError};
use crate::factor::{FactorOutcome, SecondFactorProvider};
use crate::format;
use crate::io;
use crate::vault::policy::POLICY_CHALLENGE_LEN;
use crate::vault::slot::MAX_USERNAME_LEN;
use crate::vault::{
    KeySlot, UserInfo, UserRole, UserSession, VaultHeaderV2, VaultSecurityPolicy, MAX_KEY_SLOTS,
};

/// Fixed salt for the unknown-username dummy derivation.
///
/// Deriving against this salt (with the vault's real iteration count)
/// keeps the failure path for an unknown user as expensive as the
/// failure path for a wrong password, so response timing does not leak
/// which usernames exist.
const DUMMY_SALT: [u8; SALT_LEN] = [0x6D; SALT_LEN];

/// The encrypted bulk payload as stored after the header:
/// salt (32) + IV (12) + AES-256-GCM ciphertext.
struct EncryptedPayload {
    salt: [u8; PAYLOAD_SALT_LEN],
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

/// Handle to one vault file and its open-state.
pub struct VaultManager {
    path: PathBuf,
    header: Option<VaultHeaderV2>,
    payload: Option<EncryptedPayload>,
    dek: Option<DataKey>,
    session: Option<UserSession>,
    dirty: bool,
}

impl VaultManager {
    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a brand-new vault file at `path` with a single
    /// administrator slot, and leave it open and authenticated.
    ///
    /// Generates the DEK, derives the admin KEK, wraps the DEK into the
    /// admin slot, encrypts an empty payload, and writes the file.
    pub fn create(
        path: &Path,
        admin_username: &str,
        admin_password: &str,
        mut policy: VaultSecurityPolicy,
    ) -> Result<Self> {
        if path.exists() {
            return Err(VaultError::VaultAlreadyExists(path.to_path_buf()));
        }

        // The shared challenge is vault-local randomness; generate it
        // here rather than expecting the caller to.
        if policy.require_second_factor && policy.second_factor_challenge.iter().all(|&b| b == 0) {
            let random = crypto::generate_random(POLICY_CHALLENGE_LEN);
            policy.second_factor_challenge.copy_from_slice(&random);
        }
        policy.validate()?;

        validate_username(admin_username)?;
        check_password_length(&policy, admin_password)?;

        let dek = crypto::generate_dek();
        let salt = crypto::generate_salt();
        let kek = derive_kek(admin_password, &salt, policy.kdf_iterations)?;
        let wrapped_dek = wrap_key(&kek, &dek)?;

        let mut admin_slot = KeySlot::empty();
        admin_slot.active = true;
        admin_slot.username = admin_username.to_string();
        admin_slot.salt = salt;
        admin_slot.wrapped_dek = wrapped_dek;
        admin_slot.role = UserRole::Administrator;
        // The admin chose this password; no forced change.
        admin_slot.must_change_password = false;
        admin_slot.password_changed_at = now();

        if policy.password_history_depth > 0 {
            crypto::push_history(
                &mut admin_slot.password_history,
                crypto::hash_password(admin_password),
                policy.password_history_depth,
            );
        }

        let requires_enrollment = policy.require_second_factor;

        let mut header = VaultHeaderV2::new(policy);
        header.slots.push(admin_slot);

        let payload = seal_payload(&dek, &[])?;

        let session = UserSession {
            username: admin_username.to_string(),
            role: UserRole::Administrator,
            must_change_password: false,
            requires_second_factor_enrollment: requires_enrollment,
            started_at: now(),
        };

        let manager = Self {
            path: path.to_path_buf(),
            header: Some(header),
            payload: Some(payload),
            dek: Some(dek),
            session: Some(session),
            dirty: false,
        };
        manager.write_to_disk()?;

        info!(username = admin_username, "vault created");
        Ok(manager)
    }

    /// Open an existing vault file: parse the header (with FEC
    /// recovery) and hold the encrypted payload.  No session yet.
    pub fn open(path: &Path) -> Result<Self> {
        let data = io::read_file(path)?;

        // Route legacy single-user vaults to the external migration
        // path before attempting a full parse.
        if format::detect_version(&data)? == format::VERSION_V1 {
            return Err(VaultError::LegacyVault);
        }

        let (header, payload_offset) = format::read_header(&data)?;
        let payload = split_payload(&data[payload_offset..])?;

        info!(
            path = %path.display(),
            slots = header.active_slots().count(),
            "vault opened, awaiting authentication"
        );

        Ok(Self {
            path: path.to_path_buf(),
            header: Some(header),
            payload: Some(payload),
            dek: None,
            session: None,
            dirty: false,
        })
    }

    /// Close the vault, overwriting the DEK and dropping the session.
    pub fn close(&mut self) {
        // DataKey zeroizes on drop.
        self.dek = None;
        self.session = None;
        self.header = None;
        self.payload = None;
        self.dirty = false;
        info!("vault closed");
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Authenticate a user against their key slot.
    ///
    /// All credential failures return the uniform
    /// [`VaultError::AuthenticationFailed`]; an unknown username costs
    /// a full dummy derivation so it is not distinguishable from a
    /// wrong password by timing.
    pub fn authenticate(
        &mut self,
        username: &str,
        password: &str,
        factor: Option<&dyn SecondFactorProvider>,
    ) -> Result<UserSession> {
        // Drop any previous session's key material first.
        self.session = None;
        self.dek = None;

        let header = self.header.as_mut().ok_or(VaultError::VaultNotOpen)?;

        let iterations = header.policy.kdf_iterations;
        let require_second_factor = header.policy.require_second_factor;

        let Some(slot_index) = header.find_active_slot(username) else {
            // Dummy path: same derivation, same combine, same unwrap
            // shape as the real path, unconditionally.
            let mut kek = derive_kek(password, &DUMMY_SALT, iterations)?;
            if require_second_factor {
                combine_with_second_factor(&mut kek, &[0u8; FACTOR_RESPONSE_LEN]);
            }
            let _ = unwrap_key(&kek, &[0u8; WRAPPED_DEK_LEN]);
            debug!("authentication failed");
            return Err(VaultError::AuthenticationFailed);
        };

        let slot = &header.slots[slot_index];
        let mut kek = derive_kek(password, &slot.salt, iterations)?;

        if slot.second_factor_enrolled {
            let response = challenge_device(factor, &slot.second_factor_challenge)?;
            combine_with_second_factor(&mut kek, &response);
        }

        let dek = match unwrap_key(&kek, &slot.wrapped_dek) {
            Ok(dek) => dek,
            Err(_) => {
                debug!("authentication failed");
                return Err(VaultError::AuthenticationFailed);
            }
        };

        let session = UserSession {
            username: username.to_string(),
            role: slot.role,
            must_change_password: slot.must_change_password,
            requires_second_factor_enrollment: require_second_factor
                && !slot.second_factor_enrolled,
            started_at: now(),
        };

        // End-to-end check: the unwrapped DEK must actually open the
        // payload.  The plaintext is discarded immediately.
        {
            let payload = self.payload.as_ref().ok_or(VaultError::VaultNotOpen)?;
            let plaintext =
                Zeroizing::new(encryption::decrypt(&dek, &payload.iv, &payload.ciphertext)?);
            drop(plaintext);
        }

        header.slots[slot_index].last_login_at = now();
        self.dirty = true;

        self.dek = Some(dek);
        self.session = Some(session.clone());

        info!(username, role = ?session.role, "user authenticated");
        Ok(session)
    }

    // ------------------------------------------------------------------
    // User management (administrator operations)
    // ------------------------------------------------------------------

    /// Add a user with a temporary password.  Administrator only.
    ///
    /// The new slot wraps the vault's *existing* DEK, so the new user
    /// opens the same data as everyone else.  The account is flagged
    /// `must_change_password` until its owner picks a real password.
    pub fn add_user(&mut self, username: &str, password: &str, role: UserRole) -> Result<()> {
        self.require_admin()?;
        validate_username(username)?;

        let dek = self.dek.as_ref().ok_or(VaultError::VaultNotOpen)?;
        let header = self.header.as_mut().ok_or(VaultError::VaultNotOpen)?;

        if header.find_active_slot(username).is_some() {
            return Err(VaultError::DuplicateUser(username.to_string()));
        }
        check_password_length(&header.policy, password)?;

        let slot_index = match header.free_slot_index() {
            Some(index) => index,
            None if header.slots.len() < MAX_KEY_SLOTS => header.slots.len(),
            None => return Err(VaultError::MaxUsersReached),
        };

        let salt = crypto::generate_salt();
        let kek = derive_kek(password, &salt, header.policy.kdf_iterations)?;
        let wrapped_dek = wrap_key(&kek, dek)?;

        let mut slot = KeySlot::empty();
        slot.active = true;
        slot.username = username.to_string();
        slot.salt = salt;
        slot.wrapped_dek = wrapped_dek;
        slot.role = role;
        slot.must_change_password = true;
        // 0 marks a temporary password the owner has not replaced yet.
        slot.password_changed_at = 0;

        if header.policy.password_history_depth > 0 {
            crypto::push_history(
                &mut slot.password_history,
                crypto::hash_password(password),
                header.policy.password_history_depth,
            );
        }

        if slot_index < header.slots.len() {
            header.slots[slot_index] = slot;
        } else {
            header.slots.push(slot);
        }
        self.dirty = true;

        info!(username, ?role, slot = slot_index, "user added");
        Ok(())
    }

    /// Remove (deactivate) a user.  Administrator only.
    ///
    /// Refuses self-removal and refuses to remove the last active
    /// administrator: either would risk locking the vault forever.
    pub fn remove_user(&mut self, username: &str) -> Result<()> {
        let caller = self.require_admin()?;
        if caller == username {
            return Err(VaultError::SelfRemovalNotAllowed);
        }

        let header = self.header.as_mut().ok_or(VaultError::VaultNotOpen)?;
        let slot_index = header
            .find_active_slot(username)
            .ok_or_else(|| VaultError::UserNotFound(username.to_string()))?;

        if header.slots[slot_index].role == UserRole::Administrator
            && header.active_admin_count() <= 1
        {
            return Err(VaultError::LastAdministrator);
        }

        header.slots[slot_index].deactivate();
        self.dirty = true;

        info!(username, "user removed");
        Ok(())
    }

    /// Change a user's password, proving knowledge of the old one.
    ///
    /// Allowed for the user themselves or for an administrator who
    /// knows the old password (an administrator without it uses
    /// [`Self::admin_reset_password`]).
    pub fn change_password(
        &mut self,
        username: &str,
        old_password: &str,
        new_password: &str,
        factor: Option<&dyn SecondFactorProvider>,
    ) -> Result<()> {
        let session = self.session.as_ref().ok_or(VaultError::VaultNotOpen)?;
        let is_self = session.username == username;
        if !is_self && !session.is_admin() {
            return Err(VaultError::PermissionDenied);
        }

        let header = self.header.as_mut().ok_or(VaultError::VaultNotOpen)?;
        let slot_index = header
            .find_active_slot(username)
            .ok_or_else(|| VaultError::UserNotFound(username.to_string()))?;

        check_password_length(&header.policy, new_password)?;
        let history_depth = header.policy.password_history_depth;
        let iterations = header.policy.kdf_iterations;

        let slot = &header.slots[slot_index];
        if history_depth > 0 && crypto::is_password_reused(new_password, &slot.password_history) {
            return Err(VaultError::PasswordReused);
        }

        // Proof of knowledge: the old credential must unwrap the DEK.
        let mut old_kek = derive_kek(old_password, &slot.salt, iterations)?;
        let response = if slot.second_factor_enrolled {
            let response = challenge_device(factor, &slot.second_factor_challenge)?;
            combine_with_second_factor(&mut old_kek, &response);
            Some(response)
        } else {
            None
        };
        let dek = unwrap_key(&old_kek, &slot.wrapped_dek)?;

        // Re-wrap the same DEK under the new credential with a fresh
        // salt.  The enrolled challenge (and thus the device response)
        // is preserved across password changes.
        let new_salt = crypto::generate_salt();
        let mut new_kek = derive_kek(new_password, &new_salt, iterations)?;
        if let Some(response) = &response {
            combine_with_second_factor(&mut new_kek, response);
        }
        let new_wrapped = wrap_key(&new_kek, &dek)?;

        let slot = &mut header.slots[slot_index];
        slot.salt = new_salt;
        slot.wrapped_dek = new_wrapped;
        slot.must_change_password = false;
        slot.password_changed_at = now();
        if history_depth > 0 {
            crypto::push_history(
                &mut slot.password_history,
                crypto::hash_password(new_password),
                history_depth,
            );
        }
        self.dirty = true;

        if is_self {
            if let Some(session) = self.session.as_mut() {
                session.must_change_password = false;
            }
        }

        info!(username, "password changed");
        Ok(())
    }

    /// Reset another user's password to a temporary one without the old
    /// password.  Administrator only; never for the caller's own slot.
    ///
    /// Clears password history and second-factor enrollment: the
    /// administrator does not hold the user's device, so the slot
    /// reverts to password-only until the user re-enrolls.
    pub fn admin_reset_password(&mut self, username: &str, new_temp_password: &str) -> Result<()> {
        let caller = self.require_admin()?;
        if caller == username {
            // Resetting your own slot would bypass proof of knowledge;
            // administrators change their own password normally.
            return Err(VaultError::PermissionDenied);
        }

        let dek = self.dek.as_ref().ok_or(VaultError::VaultNotOpen)?;
        let header = self.header.as_mut().ok_or(VaultError::VaultNotOpen)?;
        let slot_index = header
            .find_active_slot(username)
            .ok_or_else(|| VaultError::UserNotFound(username.to_string()))?;
        check_password_length(&header.policy, new_temp_password)?;

        let new_salt = crypto::generate_salt();
        let new_kek = derive_kek(new_temp_password, &new_salt, header.policy.kdf_iterations)?;
        let new_wrapped = wrap_key(&new_kek, dek)?;

        let slot = &mut header.slots[slot_index];
        slot.salt = new_salt;
        slot.wrapped_dek = new_wrapped;
        slot.must_change_password = true;
        slot.password_changed_at = 0;
        slot.password_history.clear();
        slot.clear_second_factor();
        self.dirty = true;

        info!(username, "password reset to temporary");
        Ok(())
    }

    /// Enroll a second-factor device for the current user.
    ///
    /// The user proves their password, a fresh per-user challenge is
    /// generated, and the DEK is re-wrapped under the combined KEK so
    /// both factors are required from now on.
    pub fn enroll_second_factor(
        &mut self,
        password: &str,
        provider: &dyn SecondFactorProvider,
    ) -> Result<()> {
        let session = self.session.as_ref().ok_or(VaultError::VaultNotOpen)?;
        let username = session.username.clone();

        let header = self.header.as_mut().ok_or(VaultError::VaultNotOpen)?;
        let slot_index = header
            .find_active_slot(&username)
            .ok_or_else(|| VaultError::UserNotFound(username.clone()))?;

        let slot = &header.slots[slot_index];
        if slot.second_factor_enrolled {
            return Err(VaultError::SecondFactorAlreadyEnrolled);
        }

        // Proof of knowledge before binding a new factor to the slot.
        let mut kek = derive_kek(password, &slot.salt, header.policy.kdf_iterations)?;
        let dek = unwrap_key(&kek, &slot.wrapped_dek)?;

        let challenge = crypto::generate_challenge();
        let response = match provider.respond(&challenge) {
            FactorOutcome::Response(response) => response,
            FactorOutcome::NotPresent => return Err(VaultError::SecondFactorUnavailable),
            FactorOutcome::Failed => return Err(VaultError::SecondFactorFailed),
        };
        combine_with_second_factor(&mut kek, &response);
        let wrapped = wrap_key(&kek, &dek)?;

        let slot = &mut header.slots[slot_index];
        slot.wrapped_dek = wrapped;
        slot.second_factor_challenge = challenge;
        slot.second_factor_enrolled = true;
        self.dirty = true;

        if let Some(session) = self.session.as_mut() {
            session.requires_second_factor_enrollment = false;
        }

        info!(username, "second factor enrolled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Payload
    // ------------------------------------------------------------------

    /// Decrypt and return the bulk payload plaintext.
    ///
    /// The buffer zeroizes itself when dropped; the DEK never leaves
    /// the manager.
    pub fn decrypt_payload(&self) -> Result<Zeroizing<Vec<u8>>> {
        let dek = self.dek.as_ref().ok_or(VaultError::VaultNotOpen)?;
        let payload = self.payload.as_ref().ok_or(VaultError::VaultNotOpen)?;

        let plaintext = encryption::decrypt(dek, &payload.iv, &payload.ciphertext)?;
        Ok(Zeroizing::new(plaintext))
    }

    /// Encrypt `payload_plaintext` under the DEK and persist the whole
    /// vault file (header + payload) atomically.
    pub fn save(&mut self, payload_plaintext: &[u8]) -> Result<()> {
        let dek = self.dek.as_ref().ok_or(VaultError::VaultNotOpen)?;

        self.payload = Some(seal_payload(dek, payload_plaintext)?);
        self.write_to_disk()?;
        self.dirty = false;

        debug!(bytes = payload_plaintext.len(), "vault saved");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Roster of active users for the front-end.
    pub fn list_users(&self) -> Result<Vec<UserInfo>> {
        let header = self.header.as_ref().ok_or(VaultError::VaultNotOpen)?;
        Ok(header.active_slots().map(UserInfo::from).collect())
    }

    /// The current session, if a user is authenticated.
    pub fn current_session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    /// The parsed header, if the vault is open.
    pub fn header(&self) -> Option<&VaultHeaderV2> {
        self.header.as_ref()
    }

    /// Whether in-memory state differs from what is on disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Path of the backing vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    /// Check the current session holds the administrator role and
    /// return the caller's username.
    fn require_admin(&self) -> Result<String> {
        let session = self.session.as_ref().ok_or(VaultError::VaultNotOpen)?;
        if !session.is_admin() {
            return Err(VaultError::PermissionDenied);
        }
        Ok(session.username.clone())
    }

    fn write_to_disk(&self) -> Result<()> {
        let header = self.header.as_ref().ok_or(VaultError::VaultNotOpen)?;
        let payload = self.payload.as_ref().ok_or(VaultError::VaultNotOpen)?;

        let mut bytes = format::write_header(header, header.policy.fec_redundancy_percent)?;
        bytes.extend_from_slice(&payload.salt);
        bytes.extend_from_slice(&payload.iv);
        bytes.extend_from_slice(&payload.ciphertext);

        io::write_file(&self.path, &bytes)
    }
}

// ----------------------------------------------------------------------
// Free helpers
// ----------------------------------------------------------------------

fn now() -> i64 {
    Utc::now().timestamp()
}

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(VaultError::InvalidUsername(
            "username cannot be empty".into(),
        ));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(VaultError::InvalidUsername(format!(
            "username cannot exceed {MAX_USERNAME_LEN} bytes"
        )));
    }
    Ok(())
}

fn check_password_length(policy: &VaultSecurityPolicy, password: &str) -> Result<()> {
    if (password.chars().count() as u32) < policy.min_password_length {
        return Err(VaultError::WeakPassword {
            min: policy.min_password_length,
        });
    }
    Ok(())
}

/// Ask the provider to answer `challenge`, mapping device states to
/// their error kinds.
fn challenge_device(
    factor: Option<&dyn SecondFactorProvider>,
    challenge: &[u8],
) -> Result<[u8; FACTOR_RESPONSE_LEN]> {
    let provider = factor.ok_or(VaultError::SecondFactorUnavailable)?;
    match provider.respond(challenge) {
        FactorOutcome::Response(response) => Ok(response),
        FactorOutcome::NotPresent => Err(VaultError::SecondFactorUnavailable),
        FactorOutcome::Failed => Err(VaultError::SecondFactorFailed),
    }
}

/// Encrypt a payload under the DEK with a fresh salt and IV.
fn seal_payload(dek: &DataKey, plaintext: &[u8]) -> Result<EncryptedPayload> {
    let mut salt = [0u8; PAYLOAD_SALT_LEN];
    salt.copy_from_slice(&crypto::generate_random(PAYLOAD_SALT_LEN));
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&crypto::generate_random(IV_LEN));

    let ciphertext = encryption::encrypt(dek, &iv, plaintext)?;
    Ok(EncryptedPayload {
        salt,
        iv,
        ciphertext,
    })
}

/// Split the post-header region into salt, IV, and ciphertext.
fn split_payload(data: &[u8]) -> Result<EncryptedPayload> {
    if data.len() < PAYLOAD_SALT_LEN + IV_LEN {
        return Err(VaultError::InvalidFormat(
            "file too small to hold the payload envelope".into(),
        ));
    }

    let mut salt = [0u8; PAYLOAD_SALT_LEN];
    salt.copy_from_slice(&data[..PAYLOAD_SALT_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&data[PAYLOAD_SALT_LEN..PAYLOAD_SALT_LEN + IV_LEN]);

    Ok(EncryptedPayload {
        salt,
        iv,
        ciphertext: data[PAYLOAD_SALT_LEN + IV_LEN..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a manager in a hand-crafted open state, bypassing disk.
    fn manager_with(header: VaultHeaderV2, session: UserSession) -> VaultManager {
        let dek = crypto::generate_dek();
        let payload = seal_payload(&dek, &[]).unwrap();
        VaultManager {
            path: PathBuf::from("unused.vault"),
            header: Some(header),
            payload: Some(payload),
            dek: Some(dek),
            session: Some(session),
            dirty: false,
        }
    }

    fn active_slot(username: &str, role: UserRole) -> KeySlot {
        let mut slot = KeySlot::empty();
        slot.active = true;
        slot.username = username.to_string();
        slot.role = role;
        slot
    }

    fn admin_session(username: &str) -> UserSession {
        UserSession {
            username: username.to_string(),
            role: UserRole::Administrator,
            must_change_password: false,
            requires_second_factor_enrollment: false,
            started_at: 0,
        }
    }

    #[test]
    fn last_administrator_guard_catches_detached_admin_session() {
        // A session can outlive its roster slot (removed from another
        // handle).  Even then, the sole remaining administrator must be
        // unremovable, or the vault is stranded without admins.
        let mut header = VaultHeaderV2::new(VaultSecurityPolicy::default());
        header.slots.push(active_slot("admin", UserRole::Administrator));
        header.slots.push(active_slot("bob", UserRole::StandardUser));

        let mut manager = manager_with(header, admin_session("ghost"));

        assert!(matches!(
            manager.remove_user("admin"),
            Err(VaultError::LastAdministrator)
        ));

        // Standard users stay removable.
        manager.remove_user("bob").unwrap();
    }

    #[test]
    fn operations_require_an_open_vault() {
        let mut manager = VaultManager {
            path: PathBuf::from("unused.vault"),
            header: None,
            payload: None,
            dek: None,
            session: None,
            dirty: false,
        };

        assert!(matches!(
            manager.authenticate("admin", "pw", None),
            Err(VaultError::VaultNotOpen)
        ));
        assert!(matches!(
            manager.add_user("x", "longenough", UserRole::StandardUser),
            Err(VaultError::VaultNotOpen)
        ));
        assert!(matches!(manager.list_users(), Err(VaultError::VaultNotOpen)));
        assert!(matches!(
            manager.save(b"data"),
            Err(VaultError::VaultNotOpen)
        ));
    }

    #[test]
    fn close_discards_key_material_and_session() {
        let mut header = VaultHeaderV2::new(VaultSecurityPolicy::default());
        header.slots.push(active_slot("admin", UserRole::Administrator));
        let mut manager = manager_with(header, admin_session("admin"));

        manager.close();

        assert!(manager.current_session().is_none());
        assert!(manager.header().is_none());
        assert!(matches!(
            manager.decrypt_payload(),
            Err(VaultError::VaultNotOpen)
        ));
    }
}
